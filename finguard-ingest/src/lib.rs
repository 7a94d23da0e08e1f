//! finguard-ingest: loading and saving transaction history as CSV

pub mod parser;
pub mod writer;

pub use parser::{parse_transactions_csv, parse_transactions_reader, ColumnMap};
pub use writer::{write_transactions, write_transactions_csv};
