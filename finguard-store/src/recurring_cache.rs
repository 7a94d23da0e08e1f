//! Cached copy of detected recurring patterns.
//!
//! Detection is authoritative; the cache only lets alerts render without
//! the full history at hand. Patterns whose last occurrence is more than
//! six months old are evicted.

use anyhow::{Context, Result};
use chrono::{Months, NaiveDate};
use finguard_core::RecurringPattern;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::kv::KeyValueStore;
use crate::learned::read_json;

pub const RECURRING_CACHE_KEY: &str = "finguard.recurring.cache";

/// Months after the last occurrence before a cached pattern is dropped
pub const STALE_AFTER_MONTHS: u32 = 6;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecurringCache {
    pub updated: Option<NaiveDate>,
    pub patterns: Vec<RecurringPattern>,
}

impl RecurringCache {
    pub fn load(store: &dyn KeyValueStore) -> Result<Self> {
        Ok(read_json(store, RECURRING_CACHE_KEY)?.unwrap_or_default())
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<()> {
        let json = serde_json::to_string(self).context("serialize recurring cache")?;
        store.set(RECURRING_CACHE_KEY, &json)
    }

    /// Merge a fresh detection run: re-detected groups are replaced, others
    /// are kept until they go stale.
    pub fn refresh(&mut self, detected: Vec<RecurringPattern>, today: NaiveDate) {
        self.patterns
            .retain(|old| !detected.iter().any(|p| p.group_key == old.group_key));
        self.patterns.extend(detected);
        self.evict_stale(today);
        self.patterns.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then_with(|| a.group_key.cmp(&b.group_key))
        });
        self.updated = Some(today);
    }

    /// Drop patterns last seen more than six months before `today`
    pub fn evict_stale(&mut self, today: NaiveDate) -> usize {
        let Some(cutoff) = today.checked_sub_months(Months::new(STALE_AFTER_MONTHS)) else {
            return 0;
        };
        let before = self.patterns.len();
        self.patterns.retain(|p| p.last_seen >= cutoff);
        let evicted = before - self.patterns.len();
        if evicted > 0 {
            debug!(evicted, %cutoff, "evicted stale recurring patterns");
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;
    use finguard_core::{Frequency, NextOccurrence};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn pattern(key: &str, last_seen: NaiveDate, confidence: f64) -> RecurringPattern {
        RecurringPattern {
            group_key: key.to_string(),
            merchant: key.split('|').next().unwrap().to_string(),
            frequency: Frequency::Monthly,
            avg_interval_days: 30.0,
            avg_amount: 10.0,
            confidence,
            occurrence_count: 3,
            first_seen: last_seen - chrono::Duration::days(60),
            last_seen,
            next_expected: NextOccurrence {
                date: last_seen + chrono::Duration::days(30),
                estimated_amount: 10.0,
            },
            transactions: Vec::new(),
        }
    }

    #[test]
    fn test_refresh_replaces_and_keeps() {
        let mut cache = RecurringCache::default();
        cache.refresh(
            vec![pattern("hulu|10", d(2026, 1, 1), 0.8), pattern("gym|40", d(2026, 1, 3), 0.9)],
            d(2026, 1, 5),
        );
        cache.refresh(vec![pattern("hulu|10", d(2026, 2, 1), 0.95)], d(2026, 2, 2));

        assert_eq!(cache.patterns.len(), 2);
        assert_eq!(cache.patterns[0].group_key, "hulu|10");
        assert_eq!(cache.patterns[0].last_seen, d(2026, 2, 1));
        assert_eq!(cache.updated, Some(d(2026, 2, 2)));
    }

    #[test]
    fn test_six_month_eviction() {
        let mut cache = RecurringCache {
            updated: None,
            patterns: vec![
                pattern("old|10", d(2025, 8, 31), 0.9),
                pattern("edge|10", d(2025, 9, 15), 0.9),
                pattern("new|10", d(2026, 3, 1), 0.9),
            ],
        };
        assert_eq!(cache.evict_stale(d(2026, 3, 15)), 1);
        let keys: Vec<_> = cache.patterns.iter().map(|p| p.group_key.as_str()).collect();
        assert_eq!(keys, vec!["edge|10", "new|10"]);
    }

    #[test]
    fn test_save_and_load() {
        let mut store = MemoryStore::new();
        assert_eq!(RecurringCache::load(&store).unwrap(), RecurringCache::default());

        let mut cache = RecurringCache::default();
        cache.refresh(vec![pattern("hulu|10", d(2026, 1, 1), 0.8)], d(2026, 1, 5));
        cache.save(&mut store).unwrap();
        assert_eq!(RecurringCache::load(&store).unwrap(), cache);
    }
}
