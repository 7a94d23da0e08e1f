//! finguard-core: transaction model and the categorization / recurrence heuristics

pub mod alerts;
pub mod dictionary;
pub mod matcher;
pub mod normalize;
pub mod recurrence;
pub mod settings;
pub mod transaction;

pub use alerts::{upcoming, AlertStatus, PaymentAlert};
pub use dictionary::CategoryDictionary;
pub use matcher::{
    AutoCategorization, CategorizedTransaction, MerchantPattern, PatternMatcher, Suggestion,
    SuggestionSource, UserWordWeights,
};
pub use normalize::{extract_keywords, merchant_key};
pub use recurrence::{Frequency, NextOccurrence, RecurrenceDetector, RecurringPattern};
pub use settings::{DayBand, MatcherSettings, RecurrenceSettings};
pub use transaction::{Transaction, TransactionKind};
