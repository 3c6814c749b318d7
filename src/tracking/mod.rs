//! Transaction tracking subsystem.
//!
//! # Data Flow
//! ```text
//! TransactionInfo (pending)
//!     → engine.rs (fetch receipts / finalization phase for the kind)
//!     → classifier.rs (pure status transition)
//!     → scheduler.rs (persist changes, sleep, repeat until completed)
//! ```
//!
//! # Invariants
//! - `completed` never goes back to `false`
//! - `failed` implies `completed`
//! - Infrastructure faults never mark a transaction failed

pub mod classifier;
pub mod engine;
pub mod error;
pub mod scheduler;
pub mod types;

pub use engine::ReconciliationEngine;
pub use error::{TrackError, TrackResult};
pub use scheduler::{CompletionScheduler, TrackerHandle};
pub use types::{Party, StatusInfo, TokenAmount, TransactionInfo, TransactionKind};
