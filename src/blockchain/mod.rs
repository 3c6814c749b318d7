//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! TrackerConfig (l1 / l2 RPC settings)
//!     → client.rs (per-layer RPC with failover and timeouts)
//!     → receipts.rs (ReceiptProvider over both layers)
//!     → events.rs (NewPriorityRequest decoding from L1 receipts)
//!     → finalization.rs (withdrawal phase query, supplied by the embedder)
//! ```
//!
//! # Error Model
//! - Every fetch returns [`FetchError`]
//! - Only `FetchError::Reverted` describes the transaction; the rest is
//!   infrastructure and gets retried

pub mod client;
pub mod events;
pub mod finalization;
pub mod receipts;
pub mod types;

pub use client::ChainClient;
pub use events::{decode_first, priority_request_hash, DecodeError, NewPriorityRequest};
pub use finalization::{FinalizationStatusSource, WithdrawalPhase, WithdrawalStatus};
pub use receipts::{BridgeRpc, ReceiptProvider};
pub use types::{FetchError, FetchResult, Layer, LogEntry, Receipt, ReceiptStatus};
