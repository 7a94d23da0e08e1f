//! Category suggestion from description text.
//!
//! Scoring combines the static [`CategoryDictionary`] with what the user has
//! taught us: per-category keyword frequencies and per-merchant patterns.
//! Nothing here fails; unmatched input simply yields no suggestion.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::dictionary::CategoryDictionary;
use crate::normalize::{extract_keywords, merchant_key};
use crate::settings::MatcherSettings;
use crate::transaction::Transaction;

/// Category -> keyword -> number of accepted transactions containing it.
///
/// Only grows; entries are removed solely by [`UserWordWeights::clear`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserWordWeights(BTreeMap<String, BTreeMap<String, u32>>);

impl UserWordWeights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment every keyword under `category`
    pub fn record(&mut self, category: &str, keywords: &[String]) {
        if keywords.is_empty() {
            return;
        }
        let table = self.0.entry(category.to_string()).or_default();
        for kw in keywords {
            *table.entry(kw.clone()).or_insert(0) += 1;
        }
    }

    pub fn frequency(&self, category: &str, keyword: &str) -> u32 {
        self.0
            .get(category)
            .and_then(|t| t.get(keyword))
            .copied()
            .unwrap_or(0)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of (category, keyword) entries
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }
}

/// What we have learned about one merchant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantPattern {
    pub merchant_key: String,
    pub category: String,
    /// 0.0 - 1.0
    pub confidence: f64,
    pub occurrence_count: u32,
    pub last_seen: NaiveDate,
}

/// Where a suggestion came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuggestionSource {
    #[serde(rename = "merchant")]
    Merchant,
    #[serde(rename = "keywords")]
    Keywords,
}

/// A candidate category for a description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub category: String,
    /// Aggregate keyword score, dictionary hits plus learned weights
    pub score: f64,
    /// Percent, 0 - 100
    pub confidence: f64,
    pub source: SuggestionSource,
}

/// Outcome of batch categorization for one transaction
#[derive(Debug, Clone, PartialEq)]
pub struct CategorizedTransaction {
    pub transaction_id: String,
    pub suggestion: Suggestion,
    /// True when confidence cleared the auto-apply threshold and the choice was learned
    pub applied: bool,
}

/// Result of [`PatternMatcher::auto_categorize`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AutoCategorization {
    pub results: Vec<CategorizedTransaction>,
    /// Uncategorized transactions with no suggestion at all
    pub unmatched: Vec<String>,
}

impl AutoCategorization {
    pub fn applied(&self) -> impl Iterator<Item = &CategorizedTransaction> {
        self.results.iter().filter(|r| r.applied)
    }

    pub fn needs_review(&self) -> impl Iterator<Item = &CategorizedTransaction> {
        self.results.iter().filter(|r| !r.applied)
    }
}

/// Suggests categories and learns from the user's choices
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    dictionary: CategoryDictionary,
    settings: MatcherSettings,
    weights: UserWordWeights,
    merchants: BTreeMap<String, MerchantPattern>,
}

impl Default for PatternMatcher {
    fn default() -> Self {
        Self::new(CategoryDictionary::default(), MatcherSettings::default())
    }
}

impl PatternMatcher {
    pub fn new(dictionary: CategoryDictionary, settings: MatcherSettings) -> Self {
        Self {
            dictionary,
            settings,
            weights: UserWordWeights::new(),
            merchants: BTreeMap::new(),
        }
    }

    /// Restore previously persisted learning state
    pub fn with_learned(
        mut self,
        weights: UserWordWeights,
        merchants: impl IntoIterator<Item = MerchantPattern>,
    ) -> Self {
        self.weights = weights;
        self.merchants = merchants
            .into_iter()
            .map(|p| (p.merchant_key.clone(), p))
            .collect();
        self
    }

    pub fn settings(&self) -> &MatcherSettings {
        &self.settings
    }

    pub fn dictionary(&self) -> &CategoryDictionary {
        &self.dictionary
    }

    pub fn weights(&self) -> &UserWordWeights {
        &self.weights
    }

    pub fn merchant_patterns(&self) -> impl Iterator<Item = &MerchantPattern> {
        self.merchants.values()
    }

    pub fn merchant_pattern(&self, description: &str) -> Option<&MerchantPattern> {
        self.merchants.get(&merchant_key(description))
    }

    fn is_too_short(&self, description: &str) -> bool {
        description.trim().chars().count() < self.settings.min_description_len
    }

    fn to_percent(&self, score: f64) -> f64 {
        (score * self.settings.confidence_scale).clamp(0.0, 100.0)
    }

    /// Aggregate score for every category with a positive score, best first
    fn score_keywords(&self, keywords: &[String]) -> Vec<(String, f64)> {
        let mut scores: BTreeMap<&str, f64> = BTreeMap::new();

        for (category, patterns) in self.dictionary.iter() {
            let mut score = 0.0;
            for kw in keywords {
                for pattern in patterns {
                    if kw.contains(pattern.as_str()) || pattern.contains(kw.as_str()) {
                        score += 1.0;
                    }
                }
            }
            if score > 0.0 {
                *scores.entry(category).or_insert(0.0) += score;
            }
        }

        for category in self.weights.categories() {
            let learned: u32 = keywords
                .iter()
                .map(|kw| self.weights.frequency(category, kw))
                .sum();
            if learned > 0 {
                *scores.entry(category).or_insert(0.0) +=
                    self.settings.learned_weight_multiplier * learned as f64;
            }
        }

        let mut ranked: Vec<(String, f64)> = scores
            .into_iter()
            .map(|(c, s)| (c.to_string(), s))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }

    /// The learned merchant pattern for `description`, if it is trusted
    fn trusted_merchant(&self, description: &str) -> Option<&MerchantPattern> {
        self.merchant_pattern(description)
            .filter(|p| p.confidence >= self.settings.merchant_min_confidence)
    }

    /// Best category for a description, or `None` when nothing clears `min_score`
    /// and no trusted merchant pattern applies
    pub fn suggest(&self, description: &str) -> Option<Suggestion> {
        self.suggest_top(description, 1).into_iter().next()
    }

    /// Up to `n` candidates ranked by confidence, then by keyword score.
    ///
    /// A trusted merchant pattern lifts its category to the pattern's
    /// confidence when that is higher than the keyword confidence; `score`
    /// always stays the aggregate keyword score.
    pub fn suggest_top(&self, description: &str, n: usize) -> Vec<Suggestion> {
        if n == 0 || self.is_too_short(description) {
            return Vec::new();
        }

        let keywords = extract_keywords(description);
        let ranked = self.score_keywords(&keywords);

        let mut out: Vec<Suggestion> = ranked
            .iter()
            .filter(|(_, score)| *score >= self.settings.min_score)
            .map(|(category, score)| Suggestion {
                category: category.clone(),
                score: *score,
                confidence: self.to_percent(*score),
                source: SuggestionSource::Keywords,
            })
            .collect();

        if let Some(p) = self.trusted_merchant(description) {
            let confidence = (p.confidence * 100.0).clamp(0.0, 100.0);
            match out.iter_mut().find(|s| s.category == p.category) {
                Some(s) => {
                    if confidence > s.confidence {
                        s.confidence = confidence;
                        s.source = SuggestionSource::Merchant;
                    }
                }
                None => {
                    let score = ranked
                        .iter()
                        .find(|(c, _)| *c == p.category)
                        .map_or(0.0, |(_, s)| *s);
                    out.push(Suggestion {
                        category: p.category.clone(),
                        score,
                        confidence,
                        source: SuggestionSource::Merchant,
                    });
                }
            }
        }

        out.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then_with(|| b.score.total_cmp(&a.score))
                .then_with(|| a.category.cmp(&b.category))
        });
        out.truncate(n);

        debug!(description, candidates = out.len(), "suggested categories");
        out
    }

    /// Record that `description` was accepted under `category`.
    ///
    /// Returns false (and changes nothing) for descriptions that are too short
    /// or an empty category.
    pub fn learn(&mut self, description: &str, category: &str, seen: NaiveDate) -> bool {
        let category = category.trim();
        if category.is_empty() || self.is_too_short(description) {
            return false;
        }

        let keywords = extract_keywords(description);
        self.weights.record(category, &keywords);

        let key = merchant_key(description);
        if !key.is_empty() {
            let s = &self.settings;
            match self.merchants.get_mut(&key) {
                Some(p) if p.category == category => {
                    p.occurrence_count += 1;
                    p.confidence =
                        (p.confidence + s.merchant_learning_rate * (1.0 - p.confidence)).clamp(0.0, 1.0);
                    p.last_seen = p.last_seen.max(seen);
                }
                Some(p) => {
                    debug!(merchant = %key, from = %p.category, to = category, "merchant reassigned");
                    p.category = category.to_string();
                    p.occurrence_count = 1;
                    p.confidence = s.merchant_initial_confidence.clamp(0.0, 1.0);
                    p.last_seen = seen;
                }
                None => {
                    self.merchants.insert(
                        key.clone(),
                        MerchantPattern {
                            merchant_key: key,
                            category: category.to_string(),
                            confidence: s.merchant_initial_confidence.clamp(0.0, 1.0),
                            occurrence_count: 1,
                            last_seen: seen,
                        },
                    );
                }
            }
        }
        true
    }

    /// The user turned down `category` for `description`.
    ///
    /// Only the merchant pattern is penalized; keyword weights never shrink.
    /// Returns true when a pattern was changed or dropped.
    pub fn reject(&mut self, description: &str, category: &str) -> bool {
        if self.is_too_short(description) {
            return false;
        }
        let key = merchant_key(description);
        let Some(p) = self.merchants.get_mut(&key) else {
            return false;
        };
        if p.category != category.trim() {
            return false;
        }
        p.confidence = (p.confidence * self.settings.merchant_reject_decay).clamp(0.0, 1.0);
        if p.confidence < self.settings.merchant_drop_below {
            debug!(merchant = %key, "merchant pattern dropped after rejection");
            self.merchants.remove(&key);
        }
        true
    }

    /// Suggest categories for every uncategorized transaction and apply the
    /// confident ones, learning from each applied choice.
    pub fn auto_categorize(&mut self, transactions: &[Transaction]) -> AutoCategorization {
        let mut out = AutoCategorization::default();
        for txn in transactions.iter().filter(|t| !t.is_categorized()) {
            let Some(suggestion) = self.suggest(&txn.description) else {
                out.unmatched.push(txn.id.clone());
                continue;
            };
            let applied = suggestion.confidence >= self.settings.auto_apply_threshold;
            if applied {
                self.learn(&txn.description, &suggestion.category, txn.date);
            }
            out.results.push(CategorizedTransaction {
                transaction_id: txn.id.clone(),
                suggestion,
                applied,
            });
        }
        debug!(
            applied = out.applied().count(),
            review = out.needs_review().count(),
            unmatched = out.unmatched.len(),
            "auto-categorization pass"
        );
        out
    }

    /// Forget everything learned from the user
    pub fn clear(&mut self) {
        self.weights.clear();
        self.merchants.clear();
    }
}
