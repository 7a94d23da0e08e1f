//! Parse transaction CSV exports into typed transactions.
//!
//! Columns are located by header name (case-insensitive), so both the
//! backend's export (`id,description,amount,date,category,type`) and typical
//! bank downloads (`Date,Description,Amount,...`) load without configuration.
//! Only date, description and amount are required.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use csv::StringRecord;
use finguard_core::{Transaction, TransactionKind};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

const DATE_HEADERS: &[&str] = &["date", "transaction date", "posted date", "posting date"];
const DESCRIPTION_HEADERS: &[&str] = &["description", "memo", "name", "payee", "merchant"];
const AMOUNT_HEADERS: &[&str] = &["amount", "value"];
const KIND_HEADERS: &[&str] = &["type", "kind", "transaction type"];
const CATEGORY_HEADERS: &[&str] = &["category"];
const ID_HEADERS: &[&str] = &["id", "transaction id", "reference"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y", "%d.%m.%Y"];

/// Column positions resolved from a header row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub date: usize,
    pub description: usize,
    pub amount: usize,
    pub kind: Option<usize>,
    pub category: Option<usize>,
    pub id: Option<usize>,
}

fn find_column(headers: &StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.contains(&h.trim().to_lowercase().as_str()))
}

impl ColumnMap {
    pub fn from_headers(headers: &StringRecord) -> Result<Self> {
        let Some(date) = find_column(headers, DATE_HEADERS) else {
            bail!("no date column in header: {:?}", headers);
        };
        let Some(description) = find_column(headers, DESCRIPTION_HEADERS) else {
            bail!("no description column in header: {:?}", headers);
        };
        let Some(amount) = find_column(headers, AMOUNT_HEADERS) else {
            bail!("no amount column in header: {:?}", headers);
        };
        Ok(Self {
            date,
            description,
            amount,
            kind: find_column(headers, KIND_HEADERS),
            category: find_column(headers, CATEGORY_HEADERS),
            id: find_column(headers, ID_HEADERS),
        })
    }
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
}

/// Accepts `-1,204.10`, `$15.49` and accounting-style `(15.49)`
pub fn parse_amount(s: &str) -> Option<f64> {
    let s = s.trim();
    let (negative, body) = match s.strip_prefix('(').and_then(|b| b.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, s),
    };
    let cleaned: String = body.chars().filter(|c| *c != ',' && *c != '$').collect();
    if cleaned.is_empty() {
        return None;
    }
    let value: f64 = cleaned.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(if negative { -value.abs() } else { value })
}

fn field<'a>(record: &'a StringRecord, idx: Option<usize>) -> &'a str {
    idx.and_then(|i| record.get(i)).unwrap_or("").trim()
}

/// Parse a transaction CSV file, skipping rows that cannot be read
pub fn parse_transactions_csv(path: impl AsRef<Path>) -> Result<Vec<Transaction>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let txns = parse_transactions_reader(file).with_context(|| format!("parsing {}", path.display()))?;
    info!(path = %path.display(), count = txns.len(), "loaded transactions");
    Ok(txns)
}

/// Parse transaction CSV from any reader
pub fn parse_transactions_reader<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    let columns = ColumnMap::from_headers(rdr.headers()?)?;
    let mut txns = Vec::new();

    for (row, result) in rdr.records().enumerate() {
        let record = result?;

        let Some(date) = parse_date(field(&record, Some(columns.date))) else {
            debug!(row, "skipping row with unparseable date");
            continue;
        };
        let Some(amount) = parse_amount(field(&record, Some(columns.amount))) else {
            debug!(row, "skipping row with unparseable amount");
            continue;
        };
        let description = field(&record, Some(columns.description));
        if description.is_empty() {
            debug!(row, "skipping row without description");
            continue;
        }

        let kind = TransactionKind::parse(field(&record, columns.kind)).unwrap_or(if amount < 0.0 {
            TransactionKind::Expense
        } else {
            TransactionKind::Income
        });

        let id = match field(&record, columns.id) {
            "" => format!("row-{:04}", row + 1),
            id => id.to_string(),
        };

        txns.push(
            Transaction::new(id, date, description, amount, kind)
                .with_category(field(&record, columns.category)),
        );
    }

    Ok(txns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_formats() {
        assert_eq!(parse_amount("-15.49"), Some(-15.49));
        assert_eq!(parse_amount("$1,204.10"), Some(1204.10));
        assert_eq!(parse_amount("(15.49)"), Some(-15.49));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("abc"), None);
    }

    #[test]
    fn test_non_finite_amounts_rejected() {
        for s in ["NaN", "nan", "inf", "-inf", "(infinity)", "1e999"] {
            assert_eq!(parse_amount(s), None, "{s}");
        }

        let csv = "date,description,amount\n\
                   2025-01-01,Gym Flex,NaN\n\
                   2025-01-31,Gym Flex,inf\n\
                   2025-03-02,Gym Flex,-29.00\n";
        let txns = parse_transactions_reader(csv.as_bytes()).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].amount, -29.0);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 2, 9).unwrap();
        assert_eq!(parse_date("2025-02-09"), Some(expected));
        assert_eq!(parse_date("02/09/2025"), Some(expected));
        assert_eq!(parse_date("09.02.2025"), Some(expected));
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn test_column_map_aliases() {
        let headers = StringRecord::from(vec!["Posted Date", "Payee", "Amount", "Memo"]);
        let map = ColumnMap::from_headers(&headers).unwrap();
        assert_eq!(map.date, 0);
        assert_eq!(map.description, 1);
        assert_eq!(map.amount, 2);
        assert_eq!(map.kind, None);
        assert_eq!(map.id, None);
    }

    #[test]
    fn test_missing_required_column() {
        let headers = StringRecord::from(vec!["Date", "Amount"]);
        assert!(ColumnMap::from_headers(&headers).is_err());
    }

    #[test]
    fn test_kind_inferred_from_sign() {
        let csv = "date,description,amount\n2025-01-01,Refund Co,12.00\n2025-01-02,Coffee Shop,-4.50\n";
        let txns = parse_transactions_reader(csv.as_bytes()).unwrap();
        assert_eq!(txns.len(), 2);
        assert!(txns[0].is_income());
        assert!(txns[1].is_expense());
        assert_eq!(txns[0].id, "row-0001");
    }
}
