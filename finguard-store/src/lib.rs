//! finguard-store: local persistence for learned categorization state and
//! the recurring-pattern cache

pub mod kv;
pub mod learned;
pub mod recurring_cache;
pub mod service;

pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use recurring_cache::RecurringCache;
pub use service::CategorizationService;
