//! Upcoming-payment alerts derived from recurring patterns

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::recurrence::{Frequency, RecurringPattern};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AlertStatus {
    /// Expected date has passed without a matching transaction
    #[serde(rename = "overdue")]
    Overdue,
    /// Expected today
    #[serde(rename = "due")]
    Due,
    #[serde(rename = "upcoming")]
    Upcoming,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentAlert {
    pub group_key: String,
    pub merchant: String,
    pub frequency: Frequency,
    pub expected: NaiveDate,
    pub estimated_amount: f64,
    /// Negative when overdue
    pub days_until: i64,
    pub status: AlertStatus,
    pub confidence: f64,
}

/// Alerts for patterns expected within `horizon_days` of `today`.
///
/// Overdue patterns are reported for at most one interval past their expected
/// date; after that the pattern is assumed to have stopped.
pub fn upcoming(patterns: &[RecurringPattern], today: NaiveDate, horizon_days: i64) -> Vec<PaymentAlert> {
    let mut alerts: Vec<PaymentAlert> = patterns
        .iter()
        .filter_map(|p| {
            let expected = p.next_expected.date;
            let days_until = (expected - today).num_days();
            let status = match days_until {
                d if d < 0 && -d <= p.avg_interval_days.round() as i64 => AlertStatus::Overdue,
                d if d < 0 => return None,
                0 => AlertStatus::Due,
                d if d <= horizon_days => AlertStatus::Upcoming,
                _ => return None,
            };
            Some(PaymentAlert {
                group_key: p.group_key.clone(),
                merchant: p.merchant.clone(),
                frequency: p.frequency,
                expected,
                estimated_amount: p.next_expected.estimated_amount,
                days_until,
                status,
                confidence: p.confidence,
            })
        })
        .collect();

    alerts.sort_by(|a, b| {
        a.expected
            .cmp(&b.expected)
            .then_with(|| a.merchant.cmp(&b.merchant))
    });
    alerts
}
