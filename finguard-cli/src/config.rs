use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use finguard_core::{CategoryDictionary, MatcherSettings, RecurrenceSettings};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::state::ensure_finguard_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralSection,
    pub backend: BackendSection,
    pub matcher: MatcherSettings,
    pub recurrence: RecurrenceSettings,
    /// Extra keyword patterns per category, merged into the built-in dictionary
    pub categories: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSection {
    /// IANA timezone used to decide what "today" is
    pub timezone: String,
    /// Look-ahead window for `upcoming`
    pub alert_horizon_days: i64,
    /// Rescan period for `watch`
    pub rescan_minutes: u64,
}

impl Default for GeneralSection {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            alert_horizon_days: 7,
            rescan_minutes: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSection {
    pub base_url: String,
}

impl Default for BackendSection {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
        }
    }
}

impl Config {
    pub fn timezone(&self) -> Result<Tz> {
        self.general
            .timezone
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid timezone in config: {}", self.general.timezone))
    }

    /// Current date in the configured timezone
    pub fn today(&self) -> Result<NaiveDate> {
        Ok(Utc::now().with_timezone(&self.timezone()?).date_naive())
    }

    /// Built-in dictionary extended with the `[categories]` table
    pub fn dictionary(&self) -> CategoryDictionary {
        let extra = self
            .categories
            .iter()
            .fold(CategoryDictionary::empty(), |dict, (category, patterns)| {
                dict.with_category(category.clone(), patterns)
            });
        CategoryDictionary::default().merge(extra)
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_finguard_home()?.join("config.toml"))
}

pub fn parse_config(s: &str) -> Result<Config> {
    toml::from_str(s).context("parse config.toml")
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}
