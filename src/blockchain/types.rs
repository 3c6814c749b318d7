//! Chain-facing types and error definitions.

use alloy::primitives::{Address, Bytes, TxHash, B256};
use alloy::rpc::types::TransactionReceipt;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Which side of the bridge a hash or address lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// Base chain.
    L1,
    /// Rollup chain.
    L2,
}

impl Layer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::L1 => "l1",
            Layer::L2 => "l2",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by receipt and finalization-status fetches.
///
/// Only [`FetchError::Reverted`] says something about the transaction itself;
/// every other variant is an infrastructure fault and must be retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Transport-level failure (connection refused, DNS, TLS).
    #[error("Connection error: {0}")]
    Connection(String),

    /// The node answered with an error.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Connected chain does not match configuration.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// The provider reports the transaction itself as reverted or dropped.
    #[error("Transaction reverted: {0}")]
    Reverted(TxHash),
}

impl FetchError {
    /// True when the error is a definitive statement about the transaction.
    pub fn is_semantic(&self) -> bool {
        matches!(self, FetchError::Reverted(_))
    }

    /// True when another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        !self.is_semantic()
    }
}

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Execution status carried by a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptStatus {
    Success,
    Reverted,
}

/// One event log as `(address, topics, data)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
}

/// The parts of a transaction receipt the tracker looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub transaction_hash: TxHash,
    pub block_number: Option<u64>,
    pub status: ReceiptStatus,
    pub logs: Vec<LogEntry>,
}

impl Receipt {
    pub fn succeeded(&self) -> bool {
        self.status == ReceiptStatus::Success
    }
}

impl From<&TransactionReceipt> for Receipt {
    fn from(receipt: &TransactionReceipt) -> Self {
        let logs = receipt
            .inner
            .logs()
            .iter()
            .map(|log| LogEntry {
                address: log.inner.address,
                topics: log.inner.data.topics().to_vec(),
                data: log.inner.data.data.clone(),
            })
            .collect();

        Self {
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            status: if receipt.status() {
                ReceiptStatus::Success
            } else {
                ReceiptStatus::Reverted
            },
            logs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_serde() {
        assert_eq!(serde_json::to_string(&Layer::L1).unwrap(), "\"l1\"");
        let layer: Layer = serde_json::from_str("\"l2\"").unwrap();
        assert_eq!(layer, Layer::L2);
    }

    #[test]
    fn test_only_reverts_are_semantic() {
        assert!(FetchError::Reverted(TxHash::ZERO).is_semantic());
        assert!(FetchError::Timeout(10).is_retryable());
        assert!(FetchError::Connection("refused".into()).is_retryable());
        assert!(FetchError::Rpc("header not found".into()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = FetchError::Timeout(10);
        assert_eq!(err.to_string(), "RPC timeout after 10 seconds");

        let err = FetchError::ChainMismatch {
            expected: 324,
            actual: 1,
        };
        assert!(err.to_string().contains("324"));
    }
}
