//! The categorization service: one matcher, one detector and the store they
//! persist into. Every learning event is written through immediately.

use anyhow::Result;
use chrono::NaiveDate;
use finguard_core::{
    upcoming, AutoCategorization, CategoryDictionary, MatcherSettings, PatternMatcher,
    PaymentAlert, RecurrenceDetector, RecurrenceSettings, RecurringPattern, Suggestion,
    Transaction,
};
use tracing::info;

use crate::kv::KeyValueStore;
use crate::learned::{clear_learned, load_merchant_patterns, load_word_weights, save_learned};
use crate::recurring_cache::RecurringCache;

pub const AUTH_TOKEN_KEY: &str = "finguard.auth.token";

pub struct CategorizationService<S: KeyValueStore> {
    store: S,
    matcher: PatternMatcher,
    detector: RecurrenceDetector,
}

impl<S: KeyValueStore> CategorizationService<S> {
    /// Build the service and restore learned state from `store`
    pub fn open(
        store: S,
        dictionary: CategoryDictionary,
        matcher_settings: MatcherSettings,
        recurrence_settings: RecurrenceSettings,
    ) -> Result<Self> {
        let weights = load_word_weights(&store)?;
        let merchants = load_merchant_patterns(&store)?;
        info!(
            keywords = weights.len(),
            merchants = merchants.len(),
            "restored learned categorization state"
        );
        let matcher = PatternMatcher::new(dictionary, matcher_settings).with_learned(weights, merchants);
        Ok(Self {
            store,
            matcher,
            detector: RecurrenceDetector::new(recurrence_settings),
        })
    }

    pub fn with_defaults(store: S) -> Result<Self> {
        Self::open(
            store,
            CategoryDictionary::default(),
            MatcherSettings::default(),
            RecurrenceSettings::default(),
        )
    }

    pub fn matcher(&self) -> &PatternMatcher {
        &self.matcher
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn persist_learned(&mut self) -> Result<()> {
        save_learned(
            &mut self.store,
            self.matcher.weights(),
            self.matcher.merchant_patterns(),
        )
    }

    pub fn suggest(&self, description: &str) -> Option<Suggestion> {
        self.matcher.suggest(description)
    }

    pub fn suggest_top(&self, description: &str, n: usize) -> Vec<Suggestion> {
        self.matcher.suggest_top(description, n)
    }

    /// The user accepted `category` for `description`
    pub fn accept(&mut self, description: &str, category: &str, date: NaiveDate) -> Result<bool> {
        if !self.matcher.learn(description, category, date) {
            return Ok(false);
        }
        self.persist_learned()?;
        Ok(true)
    }

    /// The user turned a suggestion down
    pub fn reject(&mut self, description: &str, category: &str) -> Result<bool> {
        if !self.matcher.reject(description, category) {
            return Ok(false);
        }
        self.persist_learned()?;
        Ok(true)
    }

    pub fn auto_categorize(&mut self, transactions: &[Transaction]) -> Result<AutoCategorization> {
        let out = self.matcher.auto_categorize(transactions);
        if out.applied().next().is_some() {
            self.persist_learned()?;
        }
        Ok(out)
    }

    /// Forget learned weights and merchant patterns
    pub fn clear_learned(&mut self) -> Result<()> {
        self.matcher.clear();
        clear_learned(&mut self.store)
    }

    /// Re-run detection over the full history and refresh the cache
    pub fn refresh_recurring(
        &mut self,
        transactions: &[Transaction],
        today: NaiveDate,
    ) -> Result<Vec<RecurringPattern>> {
        let detected = self.detector.detect(transactions);
        let mut cache = RecurringCache::load(&self.store)?;
        cache.refresh(detected.clone(), today);
        cache.save(&mut self.store)?;
        Ok(detected)
    }

    /// Cached patterns with stale entries dropped
    pub fn cached_recurring(&self, today: NaiveDate) -> Result<RecurringCache> {
        let mut cache = RecurringCache::load(&self.store)?;
        cache.evict_stale(today);
        Ok(cache)
    }

    pub fn upcoming_payments(&self, today: NaiveDate, horizon_days: i64) -> Result<Vec<PaymentAlert>> {
        let cache = self.cached_recurring(today)?;
        Ok(upcoming(&cache.patterns, today, horizon_days))
    }

    pub fn auth_token(&self) -> Result<Option<String>> {
        Ok(self.store.get(AUTH_TOKEN_KEY)?.filter(|t| !t.trim().is_empty()))
    }

    pub fn set_auth_token(&mut self, token: &str) -> Result<()> {
        self.store.set(AUTH_TOKEN_KEY, token.trim())
    }

    pub fn clear_auth_token(&mut self) -> Result<()> {
        self.store.remove(AUTH_TOKEN_KEY)
    }
}
