//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Receipt fetch:
//!     → ChainClient enforces a per-call timeout and walks failover providers
//!     → On infrastructure failure: retries.rs retries with backoff.rs delays
//!     → Semantic failures (reverts) return immediately, never retried
//! ```

pub mod backoff;
pub mod retries;

pub use backoff::{calculate_backoff, Backoff};
pub use retries::retry_with_backoff;
