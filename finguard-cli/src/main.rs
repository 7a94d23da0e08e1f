use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod auth;
mod backend;
mod commands;
mod config;
mod logging;
mod state;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("FINGUARD_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(name = "finguard", version = VERSION, about = "Transaction categorization and recurring-payment detection")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Suggest categories for a transaction description
    Suggest {
        description: String,

        /// Number of candidates (default: matcher.top_n)
        #[arg(long)]
        top: Option<usize>,
    },

    /// Confirm a category for a description and learn from it
    Accept {
        description: String,
        category: String,

        /// Date of the transaction (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Turn down a suggested category
    Reject { description: String, category: String },

    /// Batch auto-categorize a transaction history
    Categorize {
        /// Transaction CSV (default: ~/.finguard/transactions.csv)
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Send applied categories back to the backend
        #[arg(long)]
        push: bool,
    },

    /// Detect recurring payments and refresh the cache
    Recurring {
        #[arg(long, conflicts_with = "remote")]
        csv: Option<PathBuf>,

        /// Fetch the history from the backend instead of a CSV
        #[arg(long)]
        remote: bool,
    },

    /// Show payments expected soon, from the recurring cache
    Upcoming {
        /// Look-ahead window (default: general.alert_horizon_days)
        #[arg(long)]
        days: Option<i64>,
    },

    /// Re-run recurring detection periodically
    Watch {
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Rescan period (default: general.rescan_minutes)
        #[arg(long)]
        every_minutes: Option<u64>,
    },

    /// Fetch transactions from the backend into a local CSV
    Sync {
        /// Output path (default: ~/.finguard/transactions.csv)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Save the backend API token
    Login {
        /// Prompted for on stdin when omitted
        #[arg(long)]
        token: Option<String>,
    },

    /// Remove the saved API token
    Logout,

    /// Forget all learned keywords and merchant patterns
    Clear,

    /// Manage ~/.finguard/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,

    /// Print the effective config
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging();
    let cli = Cli::parse();

    if let Command::Config { command } = &cli.command {
        return match command {
            ConfigCommand::Init => config::init_config(),
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                println!("# {}\n", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg)?);
                Ok(())
            }
        };
    }

    let cfg = config::load_config()?;
    let mut svc = commands::open_service(&cfg)?;

    match cli.command {
        Command::Suggest { description, top } => commands::suggest(&svc, &description, top)?,
        Command::Accept {
            description,
            category,
            date,
        } => {
            let date = match date {
                Some(d) => d,
                None => cfg.today()?,
            };
            commands::accept(&mut svc, &description, &category, date)?;
        }
        Command::Reject {
            description,
            category,
        } => commands::reject(&mut svc, &description, &category)?,
        Command::Categorize { csv, push } => commands::categorize(&mut svc, &cfg, csv, push).await?,
        Command::Recurring { csv, remote } => commands::recurring(&mut svc, &cfg, csv, remote).await?,
        Command::Upcoming { days } => commands::upcoming(&svc, &cfg, days)?,
        Command::Watch { csv, every_minutes } => {
            commands::watch(&mut svc, &cfg, csv, every_minutes).await?
        }
        Command::Sync { out } => commands::sync(&svc, &cfg, out).await?,
        Command::Login { token } => auth::login(&mut svc, token)?,
        Command::Logout => auth::logout(&mut svc)?,
        Command::Clear => commands::clear(&mut svc)?,
        Command::Config { .. } => {}
    }

    Ok(())
}
