//! Transaction records as served by the backend and cached by the client

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single transaction from the user's history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Backend identifier
    pub id: String,
    /// Free-text description as it appears on the statement
    pub description: String,
    /// Signed amount; the sign convention depends on the source, use `kind`
    pub amount: f64,
    /// Date of the transaction (YYYY-MM-DD)
    pub date: NaiveDate,
    /// Category name, empty when uncategorized
    #[serde(default)]
    pub category: String,
    /// Income or expense
    #[serde(rename = "type")]
    pub kind: TransactionKind,
}

/// Direction of money flow
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    #[serde(rename = "income")]
    Income,
    #[serde(rename = "expense")]
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    /// Parse the backend's lowercase type field
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" | "credit" => Some(TransactionKind::Income),
            "expense" | "debit" => Some(TransactionKind::Expense),
            _ => None,
        }
    }
}

impl Transaction {
    /// Create an uncategorized transaction
    pub fn new(
        id: impl Into<String>,
        date: NaiveDate,
        description: impl Into<String>,
        amount: f64,
        kind: TransactionKind,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            amount,
            date,
            category: String::new(),
            kind,
        }
    }

    /// Set the category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    pub fn is_categorized(&self) -> bool {
        !self.category.trim().is_empty()
    }

    /// Get the absolute amount
    pub fn abs_amount(&self) -> f64 {
        self.amount.abs()
    }
}
