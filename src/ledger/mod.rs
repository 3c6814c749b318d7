//! Transaction ledger subsystem.
//!
//! # Data Flow
//! ```text
//! caller / scheduler
//!     → store.rs (upsert, update, lookup within a network scope)
//!     → storage.rs (durable map: network key → ordered transactions)
//! ```
//!
//! # Design Decisions
//! - Hash identity is case-insensitive; stored casing is preserved
//! - Insertion order is preserved; updates replace in place
//! - Last write wins per hash; callers serialize per hash if they need more

pub mod storage;
pub mod store;

pub use storage::{open_storage, JsonFileStorage, MemoryStorage, StorageError, TransactionStorage};
pub use store::{LedgerError, LedgerResult, TransactionLedger};
