//! Heuristic tunables.
//!
//! None of these numbers are calibrated against labeled data; they are
//! exposed so they can be adjusted from `config.toml` without a rebuild.

use serde::{Deserialize, Serialize};

/// Knobs for category suggestion and learning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherSettings {
    /// Descriptions shorter than this are ignored entirely
    pub min_description_len: usize,
    /// Minimum aggregate score for a suggestion
    pub min_score: f64,
    /// Percent confidence = min(score * confidence_scale, 100)
    pub confidence_scale: f64,
    /// Each learned keyword hit adds multiplier * frequency
    pub learned_weight_multiplier: f64,
    /// Number of candidates returned by `suggest_top` when the caller has no preference
    pub top_n: usize,
    /// Merchant patterns at or above this confidence short-circuit keyword scoring
    pub merchant_min_confidence: f64,
    /// Confidence given to a merchant pattern on first sighting
    pub merchant_initial_confidence: f64,
    /// Fraction of the remaining gap to 1.0 gained on each confirmation
    pub merchant_learning_rate: f64,
    /// Multiplier applied to a merchant pattern's confidence on rejection
    pub merchant_reject_decay: f64,
    /// Merchant patterns below this confidence are forgotten
    pub merchant_drop_below: f64,
    /// Percent confidence at which batch categorization applies a suggestion
    pub auto_apply_threshold: f64,
}

impl Default for MatcherSettings {
    fn default() -> Self {
        Self {
            min_description_len: 3,
            min_score: 1.0,
            confidence_scale: 10.0,
            learned_weight_multiplier: 2.0,
            top_n: 3,
            merchant_min_confidence: 0.6,
            merchant_initial_confidence: 0.5,
            merchant_learning_rate: 0.2,
            merchant_reject_decay: 0.5,
            merchant_drop_below: 0.1,
            auto_apply_threshold: 70.0,
        }
    }
}

/// Inclusive range of day gaps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBand {
    pub min: i64,
    pub max: i64,
}

impl DayBand {
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, days: i64) -> bool {
        days >= self.min && days <= self.max
    }
}

/// Knobs for recurring-transaction detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecurrenceSettings {
    /// Groups with fewer transactions are never recurring
    pub min_occurrences: usize,
    /// Width of the amount bucket in currency units
    pub amount_bucket: f64,
    /// Share of gaps that must fall in a band to classify the group
    pub band_share: f64,
    /// Maximum relative deviation of any amount from the group average
    pub amount_tolerance: f64,
    /// Confidence blend weights
    pub interval_weight: f64,
    pub amount_weight: f64,
    pub occurrence_weight: f64,
    /// Occurrence count at which the occurrence factor saturates
    pub occurrence_saturation: usize,
    pub weekly: DayBand,
    pub biweekly: DayBand,
    pub monthly: DayBand,
}

impl Default for RecurrenceSettings {
    fn default() -> Self {
        Self {
            min_occurrences: 3,
            amount_bucket: 10.0,
            band_share: 0.7,
            amount_tolerance: 0.10,
            interval_weight: 0.4,
            amount_weight: 0.4,
            occurrence_weight: 0.2,
            occurrence_saturation: 6,
            weekly: DayBand::new(5, 9),
            biweekly: DayBand::new(12, 16),
            monthly: DayBand::new(25, 35),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_fill_defaults() {
        let json = r#"{"min_occurrences": 4, "monthly": {"min": 27, "max": 33}}"#;
        let s: RecurrenceSettings = serde_json::from_str(json).unwrap();
        assert_eq!(s.min_occurrences, 4);
        assert_eq!(s.monthly, DayBand::new(27, 33));
        assert_eq!(s.weekly, DayBand::new(5, 9));
        assert_eq!(s.amount_tolerance, 0.10);
    }

    #[test]
    fn test_day_band_inclusive() {
        let band = DayBand::new(25, 35);
        assert!(band.contains(25));
        assert!(band.contains(35));
        assert!(!band.contains(36));
    }
}
