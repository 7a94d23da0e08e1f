//! Write transactions back out as CSV (the backend's column layout)

use anyhow::{Context, Result};
use finguard_core::Transaction;
use std::io::Write;
use std::path::Path;

pub fn write_transactions<W: Write>(writer: W, txns: &[Transaction]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for txn in txns {
        wtr.serialize(txn).context("serialize transaction")?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_transactions_csv(path: impl AsRef<Path>, txns: &[Transaction]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let file = std::fs::File::create(path).with_context(|| format!("write {}", path.display()))?;
    write_transactions(file, txns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use finguard_core::TransactionKind;

    #[test]
    fn test_header_layout() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        let txns = vec![
            Transaction::new("n1", date, "NETFLIX.COM", -15.49, TransactionKind::Expense)
                .with_category("Entertainment"),
        ];
        let mut buf = Vec::new();
        write_transactions(&mut buf, &txns).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("id,description,amount,date,category,type"));
        assert_eq!(lines.next(), Some("n1,NETFLIX.COM,-15.49,2025-01-05,Entertainment,expense"));
    }
}
