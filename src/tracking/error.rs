//! Tracking error taxonomy.

use thiserror::Error;

use crate::blockchain::events::DecodeError;
use crate::blockchain::types::FetchError;
use crate::ledger::LedgerError;

/// Errors surfaced by the engine and the scheduler.
#[derive(Debug, Error)]
pub enum TrackError {
    /// Infrastructure fault while fetching chain state.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Chain state the transaction depends on does not exist.
    #[error("not found: {0}")]
    NotFound(#[from] DecodeError),

    /// The stored hash is not a 32-byte hex value.
    #[error("invalid transaction hash '{0}'")]
    InvalidHash(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl TrackError {
    /// Only infrastructure faults are worth another round.
    pub fn is_retryable(&self) -> bool {
        match self {
            TrackError::Fetch(e) => e.is_retryable(),
            _ => false,
        }
    }
}

/// Result type for tracking operations.
pub type TrackResult<T> = Result<T, TrackError>;
