//! Recurring-transaction detection.
//!
//! Transactions are grouped by merchant key and amount bucket. A group is
//! recurring when its day gaps mostly fall into one frequency band and its
//! amounts stay within tolerance of their average. Detection is a pure
//! function of the input; re-running it on the same history gives the same
//! patterns in the same order.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::normalize::merchant_key;
use crate::settings::{DayBand, RecurrenceSettings};
use crate::transaction::Transaction;

/// Detected cadence of a recurring group
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Frequency {
    #[serde(rename = "weekly")]
    Weekly,
    #[serde(rename = "biweekly")]
    Biweekly,
    #[serde(rename = "monthly")]
    Monthly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Weekly => "weekly",
            Frequency::Biweekly => "biweekly",
            Frequency::Monthly => "monthly",
        }
    }

    /// Occurrences per year, for annualized cost estimates
    pub fn per_year(&self) -> f64 {
        match self {
            Frequency::Weekly => 52.0,
            Frequency::Biweekly => 26.0,
            Frequency::Monthly => 12.0,
        }
    }
}

/// Predicted next occurrence of a recurring group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NextOccurrence {
    pub date: NaiveDate,
    pub estimated_amount: f64,
}

/// A group of transactions that repeats on a regular schedule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurringPattern {
    /// Merchant key and amount bucket, `"netflix|10"`
    pub group_key: String,
    pub merchant: String,
    pub frequency: Frequency,
    pub avg_interval_days: f64,
    /// Average absolute amount
    pub avg_amount: f64,
    /// 0.0 - 1.0
    pub confidence: f64,
    pub occurrence_count: usize,
    pub first_seen: NaiveDate,
    pub last_seen: NaiveDate,
    pub next_expected: NextOccurrence,
    /// Supporting transactions, oldest first
    pub transactions: Vec<Transaction>,
}

impl RecurringPattern {
    /// Expected yearly spend at the detected cadence
    pub fn annualized_amount(&self) -> f64 {
        self.avg_amount * self.frequency.per_year()
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation over mean; 0 for constant input
fn coefficient_of_variation(values: &[f64]) -> f64 {
    let m = mean(values);
    if values.is_empty() || m == 0.0 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt() / m.abs()
}

/// Groups a transaction history and reports recurring patterns
#[derive(Debug, Clone, Default)]
pub struct RecurrenceDetector {
    settings: RecurrenceSettings,
}

impl RecurrenceDetector {
    pub fn new(settings: RecurrenceSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &RecurrenceSettings {
        &self.settings
    }

    /// Lower edge of the amount bucket a transaction falls in
    pub fn amount_bucket(&self, amount: f64) -> f64 {
        let width = if self.settings.amount_bucket > 0.0 {
            self.settings.amount_bucket
        } else {
            1.0
        };
        (amount.abs() / width).floor() * width
    }

    /// Grouping key: normalized merchant plus amount bucket
    pub fn group_key(&self, txn: &Transaction) -> String {
        format!(
            "{}|{}",
            merchant_key(&txn.description),
            self.amount_bucket(txn.amount)
        )
    }

    /// Run detection over the full history
    pub fn detect(&self, transactions: &[Transaction]) -> Vec<RecurringPattern> {
        let mut groups: BTreeMap<String, Vec<&Transaction>> = BTreeMap::new();
        for txn in transactions {
            if !txn.amount.is_finite() {
                debug!(id = %txn.id, amount = txn.amount, "skipping non-finite amount");
                continue;
            }
            groups.entry(self.group_key(txn)).or_default().push(txn);
        }

        let candidates = groups
            .values()
            .filter(|g| g.len() >= self.settings.min_occurrences.max(2))
            .count();

        let mut patterns: Vec<RecurringPattern> = groups
            .into_iter()
            .filter(|(_, g)| g.len() >= self.settings.min_occurrences.max(2))
            .filter_map(|(key, g)| self.analyze_group(key, g))
            .collect();

        patterns.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then_with(|| a.group_key.cmp(&b.group_key))
        });

        info!(
            transactions = transactions.len(),
            candidates,
            recurring = patterns.len(),
            "recurrence detection finished"
        );
        patterns
    }

    /// Band with the largest share of gaps, if that share clears `band_share`
    pub fn classify_intervals(&self, gaps: &[i64]) -> Option<Frequency> {
        if gaps.is_empty() {
            return None;
        }
        let bands: [(Frequency, DayBand); 3] = [
            (Frequency::Weekly, self.settings.weekly),
            (Frequency::Biweekly, self.settings.biweekly),
            (Frequency::Monthly, self.settings.monthly),
        ];

        let mut best: Option<(Frequency, f64)> = None;
        for (freq, band) in bands {
            let hits = gaps.iter().filter(|g| band.contains(**g)).count();
            let share = hits as f64 / gaps.len() as f64;
            if share >= self.settings.band_share && best.is_none_or(|(_, s)| share > s) {
                best = Some((freq, share));
            }
        }
        best.map(|(f, _)| f)
    }

    fn analyze_group(&self, key: String, mut group: Vec<&Transaction>) -> Option<RecurringPattern> {
        group.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));

        let gaps: Vec<i64> = group
            .windows(2)
            .map(|w| (w[1].date - w[0].date).num_days())
            .collect();

        let Some(frequency) = self.classify_intervals(&gaps) else {
            debug!(group = %key, ?gaps, "no consistent interval");
            return None;
        };

        let amounts: Vec<f64> = group.iter().map(|t| t.abs_amount()).collect();
        let avg_amount = mean(&amounts);
        if !avg_amount.is_finite() || avg_amount <= 0.0 {
            return None;
        }
        let max_deviation = amounts
            .iter()
            .map(|a| (a - avg_amount).abs() / avg_amount)
            .fold(0.0_f64, f64::max);
        if max_deviation > self.settings.amount_tolerance {
            debug!(group = %key, max_deviation, "amounts too inconsistent");
            return None;
        }

        let gap_values: Vec<f64> = gaps.iter().map(|g| *g as f64).collect();
        let avg_interval_days = mean(&gap_values);
        let confidence = self.confidence(&gap_values, &amounts, group.len());

        let first = group.first()?;
        let last = group.last()?;
        let next_date = last
            .date
            .checked_add_signed(Duration::days(avg_interval_days.round() as i64))?;

        debug!(group = %key, frequency = frequency.as_str(), confidence, "recurring group");

        Some(RecurringPattern {
            merchant: merchant_key(&last.description),
            group_key: key,
            frequency,
            avg_interval_days,
            avg_amount,
            confidence,
            occurrence_count: group.len(),
            first_seen: first.date,
            last_seen: last.date,
            next_expected: NextOccurrence {
                date: next_date,
                estimated_amount: avg_amount,
            },
            transactions: group.into_iter().cloned().collect(),
        })
    }

    /// Blend interval regularity, amount regularity and occurrence count
    fn confidence(&self, gaps: &[f64], amounts: &[f64], count: usize) -> f64 {
        let s = &self.settings;
        let interval_score = (1.0 - coefficient_of_variation(gaps)).clamp(0.0, 1.0);
        let amount_score = (1.0 - coefficient_of_variation(amounts)).clamp(0.0, 1.0);
        let occurrence_score = if s.occurrence_saturation == 0 {
            1.0
        } else {
            (count as f64 / s.occurrence_saturation as f64).min(1.0)
        };
        let blended = s.interval_weight * interval_score
            + s.amount_weight * amount_score
            + s.occurrence_weight * occurrence_score;
        if blended.is_finite() {
            blended.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}
