use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use finguard_core::{AlertStatus, PaymentAlert, RecurringPattern, Suggestion, SuggestionSource, Transaction};
use finguard_ingest::{parse_transactions_csv, write_transactions_csv};
use finguard_store::{CategorizationService, FileStore, KeyValueStore};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::auth::require_token;
use crate::backend::BackendClient;
use crate::config::Config;
use crate::state;

pub type Service = CategorizationService<FileStore>;

pub fn open_service(cfg: &Config) -> Result<Service> {
    let path = state::store_path()?;
    let store = FileStore::open(&path).with_context(|| format!("open store {}", path.display()))?;
    info!(path = %store.path().display(), "opened store");
    CategorizationService::open(
        store,
        cfg.dictionary(),
        cfg.matcher.clone(),
        cfg.recurrence.clone(),
    )
}

/// `--csv`, or the file written by `sync`
fn resolve_csv(csv: Option<PathBuf>) -> Result<PathBuf> {
    let path = match csv {
        Some(p) => p,
        None => state::transactions_path()?,
    };
    if !path.exists() {
        bail!(
            "CSV not found: {} (pass --csv <path> or run: finguard sync)",
            path.display()
        );
    }
    Ok(path)
}

fn load_history(path: &Path) -> Result<Vec<Transaction>> {
    parse_transactions_csv(path).with_context(|| format!("parsing {}", path.display()))
}

fn source_label(s: &Suggestion) -> &'static str {
    match s.source {
        SuggestionSource::Merchant => "merchant",
        SuggestionSource::Keywords => "keywords",
    }
}

pub fn suggest<S: KeyValueStore>(svc: &CategorizationService<S>, description: &str, top: Option<usize>) -> Result<()> {
    let n = top.unwrap_or(svc.matcher().settings().top_n);
    let suggestions = svc.suggest_top(description, n);
    if suggestions.is_empty() {
        println!("No suggestion for {:?}", description);
        let known: Vec<&str> = svc.matcher().dictionary().categories().collect();
        println!("Known categories: {}", known.join(", "));
        println!("Teach one with: finguard accept {:?} <category>", description);
        return Ok(());
    }
    for (i, s) in suggestions.iter().enumerate() {
        println!(
            "{}. {} | confidence={:.0}% | score={:.1} | via {}",
            i + 1,
            s.category,
            s.confidence,
            s.score,
            source_label(s)
        );
    }
    Ok(())
}

pub fn accept<S: KeyValueStore>(
    svc: &mut CategorizationService<S>,
    description: &str,
    category: &str,
    date: NaiveDate,
) -> Result<()> {
    if svc.accept(description, category, date)? {
        println!("Learned: {:?} -> {}", description, category);
    } else {
        println!("Description too short to learn from: {:?}", description);
    }
    Ok(())
}

pub fn reject<S: KeyValueStore>(svc: &mut CategorizationService<S>, description: &str, category: &str) -> Result<()> {
    if svc.reject(description, category)? {
        println!("Lowered confidence: {:?} -> {}", description, category);
    } else {
        println!("Nothing learned for {:?} -> {}", description, category);
    }
    Ok(())
}

pub async fn categorize(svc: &mut Service, cfg: &Config, csv: Option<PathBuf>, push: bool) -> Result<()> {
    let path = resolve_csv(csv)?;
    let txns = load_history(&path)?;
    let out = svc.auto_categorize(&txns)?;

    let uncategorized = txns.iter().filter(|t| !t.is_categorized()).count();
    println!("Parsed {} transactions from {}", txns.len(), path.display());
    println!(
        "Uncategorized: {} | applied: {} | review: {} | unmatched: {}\n",
        uncategorized,
        out.applied().count(),
        out.needs_review().count(),
        out.unmatched.len()
    );

    for r in &out.results {
        println!(
            "[{}] {} -> {} ({:.0}%)",
            if r.applied { "applied" } else { "review" },
            r.transaction_id,
            r.suggestion.category,
            r.suggestion.confidence
        );
    }

    if push {
        let token = require_token(svc)?;
        let client = BackendClient::new(&cfg.backend.base_url, &token)?;
        let mut pushed = 0;
        for r in out.applied() {
            client
                .update_category(&r.transaction_id, &r.suggestion.category)
                .await?;
            pushed += 1;
        }
        println!("\nPushed {} category updates to {}", pushed, cfg.backend.base_url);
    }
    Ok(())
}

fn print_patterns(patterns: &[RecurringPattern]) {
    for p in patterns {
        println!(
            "[{}] {} | ${:.2} | every {:.1}d | confidence={:.2} | count={} | next {} | ${:.2}/yr",
            p.frequency.as_str(),
            p.merchant,
            p.avg_amount,
            p.avg_interval_days,
            p.confidence,
            p.occurrence_count,
            p.next_expected.date,
            p.annualized_amount()
        );
    }
}

fn print_alerts(alerts: &[PaymentAlert]) {
    if alerts.is_empty() {
        println!("No payments expected");
        return;
    }
    for a in alerts {
        let when = match a.status {
            AlertStatus::Overdue => format!("overdue by {}d", -a.days_until),
            AlertStatus::Due => "due today".to_string(),
            AlertStatus::Upcoming => format!("in {}d", a.days_until),
        };
        println!(
            "{} | {} | ${:.2} | {} | {}",
            a.expected,
            a.merchant,
            a.estimated_amount,
            when,
            a.frequency.as_str()
        );
    }
}

pub async fn recurring(svc: &mut Service, cfg: &Config, csv: Option<PathBuf>, remote: bool) -> Result<()> {
    let txns = if remote {
        let token = require_token(svc)?;
        let client = BackendClient::new(&cfg.backend.base_url, &token)?;
        client.fetch_transactions().await?
    } else {
        load_history(&resolve_csv(csv)?)?
    };

    let today = cfg.today()?;
    let detected = svc.refresh_recurring(&txns, today)?;
    println!(
        "Scanned {} transactions, found {} recurring patterns\n",
        txns.len(),
        detected.len()
    );
    print_patterns(&detected);
    Ok(())
}

pub fn upcoming<S: KeyValueStore>(svc: &CategorizationService<S>, cfg: &Config, days: Option<i64>) -> Result<()> {
    let today = cfg.today()?;
    let horizon = days.unwrap_or(cfg.general.alert_horizon_days);
    let cache = svc.cached_recurring(today)?;
    match cache.updated {
        Some(d) => println!("Recurring cache updated {}\n", d),
        None => println!("Recurring cache is empty. Run: finguard recurring\n"),
    }
    print_alerts(&svc.upcoming_payments(today, horizon)?);
    Ok(())
}

fn rescan(svc: &mut Service, cfg: &Config, path: &Path) -> Result<()> {
    let txns = load_history(path)?;
    let today = cfg.today()?;
    let detected = svc.refresh_recurring(&txns, today)?;
    info!(patterns = detected.len(), "rescan complete");
    let alerts = svc.upcoming_payments(today, cfg.general.alert_horizon_days)?;
    println!("== {} ({} patterns) ==", today, detected.len());
    print_alerts(&alerts);
    Ok(())
}

/// Rescan the history file on a timer until interrupted
pub async fn watch(svc: &mut Service, cfg: &Config, csv: Option<PathBuf>, every_minutes: Option<u64>) -> Result<()> {
    let path = resolve_csv(csv)?;
    let minutes = every_minutes.unwrap_or(cfg.general.rescan_minutes).max(1);
    println!("Watching {} every {} min (Ctrl-C to stop)\n", path.display(), minutes);

    let mut tick = tokio::time::interval(Duration::from_secs(minutes * 60));
    loop {
        tokio::select! {
            _ = tick.tick() => {
                if let Err(e) = rescan(svc, cfg, &path) {
                    warn!(error = %e, "rescan failed");
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

pub async fn sync(svc: &Service, cfg: &Config, out: Option<PathBuf>) -> Result<()> {
    let token = require_token(svc)?;
    let client = BackendClient::new(&cfg.backend.base_url, &token)?;
    let txns = client.fetch_transactions().await?;
    let path = match out {
        Some(p) => p,
        None => state::transactions_path()?,
    };
    write_transactions_csv(&path, &txns)?;
    println!("Fetched {} transactions into {}", txns.len(), path.display());
    Ok(())
}

pub fn clear<S: KeyValueStore>(svc: &mut CategorizationService<S>) -> Result<()> {
    svc.clear_learned()?;
    println!("Cleared learned keywords and merchant patterns");
    Ok(())
}
