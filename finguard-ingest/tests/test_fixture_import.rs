use chrono::NaiveDate;
use finguard_core::{Frequency, RecurrenceDetector, TransactionKind};
use finguard_ingest::{parse_transactions_csv, write_transactions_csv};
use std::path::PathBuf;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("transactions.csv")
}

#[test]
fn test_parse_fixture() {
    let txns = parse_transactions_csv(fixture_path()).expect("fixture should parse");
    // one row has a broken date
    assert_eq!(txns.len(), 11);

    let first = &txns[0];
    assert_eq!(first.id, "n1");
    assert_eq!(first.date, NaiveDate::from_ymd_opt(2025, 1, 5).unwrap());
    assert_eq!(first.category, "Entertainment");
    assert!(first.is_expense());

    let shell = txns.iter().find(|t| t.id == "g1").unwrap();
    assert_eq!(shell.date, NaiveDate::from_ymd_opt(2025, 2, 9).unwrap());

    let tj = txns.last().unwrap();
    assert_eq!(tj.amount, -1204.10);
    assert_eq!(tj.kind, TransactionKind::Expense);
    assert_eq!(tj.id, "row-0012");
    assert!(!tj.is_categorized());
}

#[test]
fn test_fixture_recurring_groups() {
    let txns = parse_transactions_csv(fixture_path()).unwrap();
    let patterns = RecurrenceDetector::default().detect(&txns);
    assert_eq!(patterns.len(), 2);

    let netflix = patterns.iter().find(|p| p.merchant == "netflix com").unwrap();
    assert_eq!(netflix.frequency, Frequency::Monthly);

    let payroll = patterns.iter().find(|p| p.merchant == "deposit payroll").unwrap();
    assert_eq!(payroll.frequency, Frequency::Biweekly);
    assert_eq!(
        payroll.next_expected.date,
        NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
    );
}

#[test]
fn test_write_then_read_back() {
    let txns = parse_transactions_csv(fixture_path()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("nested").join("export.csv");
    write_transactions_csv(&out, &txns).unwrap();
    let reread = parse_transactions_csv(&out).unwrap();
    assert_eq!(reread, txns);
}

#[test]
fn test_missing_file_is_error() {
    assert!(parse_transactions_csv("/definitely/not/here.csv").is_err());
}
