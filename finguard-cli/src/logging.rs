use tracing_subscriber::EnvFilter;

/// Log to stderr, filtered by `FINGUARD_LOG` (default `warn`)
pub fn init_logging() {
    let filter = EnvFilter::try_from_env("FINGUARD_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    // a second init (tests) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
