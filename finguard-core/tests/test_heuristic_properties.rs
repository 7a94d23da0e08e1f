use chrono::{Duration, NaiveDate};
use finguard_core::{
    merchant_key, Frequency, PatternMatcher,
    RecurrenceDetector, Transaction, TransactionKind,
};

fn expense(id: usize, date: NaiveDate, desc: &str, amount: f64) -> Transaction {
    Transaction::new(format!("t-{id}"), date, desc, amount, TransactionKind::Expense)
}

fn jan(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
}

/// Short descriptions never produce a suggestion and never touch learned state.
#[test]
fn test_short_descriptions_are_ignored() {
    let mut matcher = PatternMatcher::default();
    matcher.learn("Trader Joes Market", "Groceries", jan(2));
    let before = matcher.weights().clone();
    let merchants_before = matcher.merchant_patterns().count();

    for desc in ["", " ", "a", "ab", "  ab  "] {
        assert!(matcher.suggest(desc).is_none(), "suggested for {desc:?}");
        assert!(matcher.suggest_top(desc, 3).is_empty());
        assert!(!matcher.learn(desc, "Groceries", jan(3)));
    }

    assert_eq!(matcher.weights(), &before);
    assert_eq!(matcher.merchant_patterns().count(), merchants_before);
}

/// Accepting the same merchant repeatedly never lowers its score or confidence.
#[test]
fn test_consistent_labeling_is_monotonic() {
    let mut matcher = PatternMatcher::default();
    let desc = "Blue Bottle Roasters Oakland";

    let mut last_score = 0.0;
    let mut last_conf = 0.0;
    for i in 1..=8 {
        matcher.learn(desc, "Coffee", jan(i));
        let s = matcher
            .suggest_top(desc, 5)
            .into_iter()
            .find(|s| s.category == "Coffee")
            .expect("learned category should be suggested");
        assert!(s.score > last_score);
        assert!(s.confidence >= last_conf);
        last_score = s.score;
        last_conf = s.confidence;
    }
    assert_eq!(matcher.suggest(desc).unwrap().category, "Coffee");
}

/// Four identical charges 30 days apart are monthly with high confidence.
#[test]
fn test_monthly_subscription_detected() {
    let txns: Vec<Transaction> = (0..4)
        .map(|i| expense(i, jan(10) + Duration::days(30 * i as i64), "NETFLIX.COM 4821", -15.49))
        .collect();

    let patterns = RecurrenceDetector::default().detect(&txns);
    assert_eq!(patterns.len(), 1);
    let p = &patterns[0];
    assert_eq!(p.frequency, Frequency::Monthly);
    assert!(p.confidence > 0.8, "confidence {}", p.confidence);
    assert!(p.confidence <= 1.0);
    assert_eq!(p.avg_interval_days, 30.0);
    assert_eq!(p.occurrence_count, 4);
    assert_eq!(p.next_expected.date, txns[3].date + Duration::days(30));
    assert!((p.next_expected.estimated_amount - 15.49).abs() < 1e-9);
    assert_eq!(p.transactions.len(), 4);
}

/// Amounts more than 10% away from the mean disqualify the group.
#[test]
fn test_inconsistent_amounts_rejected() {
    // same 50-bucket; 59 is ~10.6% above the 53.33 mean
    let txns = vec![
        expense(0, jan(1), "City Water Dept", 50.0),
        expense(1, jan(31), "City Water Dept", 51.0),
        expense(2, jan(31) + Duration::days(30), "City Water Dept", 59.0),
    ];
    assert!(RecurrenceDetector::default().detect(&txns).is_empty());

    let steady = vec![
        expense(0, jan(1), "City Water Dept", 50.0),
        expense(1, jan(31), "City Water Dept", 51.0),
        expense(2, jan(31) + Duration::days(30), "City Water Dept", 52.0),
    ];
    assert_eq!(RecurrenceDetector::default().detect(&steady).len(), 1);
}

/// Gaps outside every band never produce a pattern.
#[test]
fn test_irregular_gaps_rejected() {
    let gaps = [2_i64, 21, 45, 3, 60, 19, 11, 40];
    let mut date = jan(1);
    let mut txns = vec![expense(0, date, "Corner Deli", 12.0)];
    for (i, g) in gaps.iter().enumerate() {
        date += Duration::days(*g);
        txns.push(expense(i + 1, date, "Corner Deli", 12.0));
    }
    assert!(RecurrenceDetector::default().detect(&txns).is_empty());
}

/// Weekly gaps mixed with random ones below the 70% bar are dropped silently.
#[test]
fn test_mixed_weekly_and_random_rejected() {
    let gaps = [7_i64, 7, 20, 45, 3];
    let mut date = jan(1);
    let mut txns = vec![expense(0, date, "Farmers Stand", 30.0)];
    for (i, g) in gaps.iter().enumerate() {
        date += Duration::days(*g);
        txns.push(expense(i + 1, date, "Farmers Stand", 30.0));
    }
    assert!(RecurrenceDetector::default().detect(&txns).is_empty());
}

#[test]
fn test_merchant_key_idempotent_over_corpus() {
    let corpus = [
        "ACH DEBIT COMCAST CABLE 8831",
        "CHECK 1042",
        "TRANSFER TO SAVINGS - ONLINE",
        "POS PURCHASE TARGET T-1234",
        "Payroll ACME Corp 0001",
        "credit",
        "---",
        "AMAZON.COM*MK1234 AMZN.COM/BILL",
        "Café Olé 3321",
    ];
    for desc in corpus {
        let key = merchant_key(desc);
        assert_eq!(merchant_key(&key), key, "{desc:?}");
    }
}

#[test]
fn test_detection_is_idempotent() {
    let mut txns: Vec<Transaction> = (0..6)
        .map(|i| expense(i, jan(3) + Duration::days(7 * i as i64), "Gym Flex", 25.0))
        .collect();
    txns.extend((0..4).map(|i| {
        expense(10 + i, jan(5) + Duration::days(30 * i as i64), "Spotify USA", 10.99)
    }));

    let detector = RecurrenceDetector::default();
    let first = detector.detect(&txns);
    assert_eq!(first.len(), 2);
    assert_eq!(detector.detect(&txns), first);
    assert_eq!(first[0].frequency, Frequency::Weekly);
}
