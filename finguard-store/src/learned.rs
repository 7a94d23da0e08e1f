//! Persisted learning state: keyword weights and merchant patterns

use anyhow::{Context, Result};
use finguard_core::{MerchantPattern, UserWordWeights};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::kv::KeyValueStore;

pub const WORD_WEIGHTS_KEY: &str = "finguard.categorization.word_weights";
pub const MERCHANT_PATTERNS_KEY: &str = "finguard.categorization.merchant_patterns";

/// Read a JSON value; missing keys and corrupt values both yield `None`
pub(crate) fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(v) => Ok(Some(v)),
        Err(e) => {
            warn!(key, error = %e, "ignoring unreadable stored value");
            Ok(None)
        }
    }
}

pub fn load_word_weights(store: &dyn KeyValueStore) -> Result<UserWordWeights> {
    Ok(read_json(store, WORD_WEIGHTS_KEY)?.unwrap_or_default())
}

pub fn load_merchant_patterns(store: &dyn KeyValueStore) -> Result<Vec<MerchantPattern>> {
    Ok(read_json(store, MERCHANT_PATTERNS_KEY)?.unwrap_or_default())
}

pub fn save_learned<'a>(
    store: &mut dyn KeyValueStore,
    weights: &UserWordWeights,
    merchants: impl IntoIterator<Item = &'a MerchantPattern>,
) -> Result<()> {
    let merchants: Vec<&MerchantPattern> = merchants.into_iter().collect();
    let weights_json = serde_json::to_string(weights).context("serialize word weights")?;
    let merchants_json = serde_json::to_string(&merchants).context("serialize merchant patterns")?;
    // one batch so weights and merchants never disagree on disk
    store.set_many(&[
        (WORD_WEIGHTS_KEY, weights_json.as_str()),
        (MERCHANT_PATTERNS_KEY, merchants_json.as_str()),
    ])
}

pub fn clear_learned(store: &mut dyn KeyValueStore) -> Result<()> {
    store.remove_many(&[WORD_WEIGHTS_KEY, MERCHANT_PATTERNS_KEY])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;
    use chrono::NaiveDate;

    #[test]
    fn test_save_and_load() {
        let mut store = MemoryStore::new();
        let mut weights = UserWordWeights::new();
        weights.record("Coffee", &["bluebottle".to_string()]);
        let pattern = MerchantPattern {
            merchant_key: "blue bottle".to_string(),
            category: "Coffee".to_string(),
            confidence: 0.6,
            occurrence_count: 2,
            last_seen: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        };

        save_learned(&mut store, &weights, [&pattern]).unwrap();
        assert_eq!(load_word_weights(&store).unwrap(), weights);
        assert_eq!(load_merchant_patterns(&store).unwrap(), vec![pattern]);

        clear_learned(&mut store).unwrap();
        assert!(load_word_weights(&store).unwrap().is_empty());
        assert!(load_merchant_patterns(&store).unwrap().is_empty());
    }

    /// Counts writes; `set` fails so only batched writes succeed
    #[derive(Default)]
    struct BatchOnlyStore {
        inner: MemoryStore,
        batches: usize,
    }

    impl KeyValueStore for BatchOnlyStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            anyhow::bail!("single-key write")
        }

        fn remove(&mut self, key: &str) -> Result<()> {
            self.inner.remove(key)
        }

        fn set_many(&mut self, entries: &[(&str, &str)]) -> Result<()> {
            self.batches += 1;
            self.inner.set_many(entries)
        }
    }

    #[test]
    fn test_learned_state_written_in_one_batch() {
        let mut store = BatchOnlyStore::default();
        let mut weights = UserWordWeights::new();
        weights.record("Coffee", &["roasters".to_string()]);
        save_learned(&mut store, &weights, Vec::<&MerchantPattern>::new()).unwrap();
        assert_eq!(store.batches, 1);
        assert_eq!(load_word_weights(&store).unwrap(), weights);
        assert!(store.get(MERCHANT_PATTERNS_KEY).unwrap().is_some());
    }

    #[test]
    fn test_corrupt_value_is_empty() {
        let mut store = MemoryStore::new();
        store.set(WORD_WEIGHTS_KEY, "[[[").unwrap();
        assert!(load_word_weights(&store).unwrap().is_empty());
    }

    #[test]
    fn test_weights_json_shape() {
        let mut store = MemoryStore::new();
        let mut weights = UserWordWeights::new();
        weights.record("Coffee", &["roasters".to_string()]);
        save_learned(&mut store, &weights, Vec::<&MerchantPattern>::new()).unwrap();
        assert_eq!(
            store.get(WORD_WEIGHTS_KEY).unwrap().as_deref(),
            Some(r#"{"Coffee":{"roasters":1}}"#)
        );
    }
}
