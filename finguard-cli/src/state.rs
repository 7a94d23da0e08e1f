use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$FINGUARD_HOME`, or `~/.finguard`
pub fn finguard_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("FINGUARD_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".finguard"))
}

pub fn ensure_finguard_home() -> Result<PathBuf> {
    let dir = finguard_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn store_path() -> Result<PathBuf> {
    Ok(ensure_finguard_home()?.join("store.json"))
}

/// Where `sync` writes the fetched history and other commands read it by default
pub fn transactions_path() -> Result<PathBuf> {
    Ok(ensure_finguard_home()?.join("transactions.csv"))
}
