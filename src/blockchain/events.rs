//! Event schemas and log decoding.

use alloy::primitives::TxHash;
use alloy::sol;
use alloy::sol_types::SolEvent;
use thiserror::Error;

use crate::blockchain::types::LogEntry;

sol! {
    /// Transaction the rollup will execute for an L1 priority request.
    #[derive(Debug, PartialEq, Eq)]
    struct L2CanonicalTransaction {
        uint256 txType;
        uint256 from;
        uint256 to;
        uint256 gasLimit;
        uint256 gasPerPubdataByteLimit;
        uint256 maxFeePerGas;
        uint256 maxPriorityFeePerGas;
        uint256 paymaster;
        uint256 nonce;
        uint256 value;
        uint256[4] reserved;
        bytes data;
        bytes signature;
        uint256[] factoryDeps;
        bytes paymasterInput;
        bytes reservedDynamic;
    }

    /// Emitted by the rollup's L1 contract when a deposit is queued for L2.
    #[derive(Debug, PartialEq, Eq)]
    event NewPriorityRequest(
        uint256 txId,
        bytes32 txHash,
        uint64 expirationTimestamp,
        L2CanonicalTransaction transaction,
        bytes[] factoryDeps
    );
}

/// Log scanning failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("no log decodes as {event}")]
    NotFound { event: &'static str },
}

/// Decode the first log entry that matches `E`, scanning in order.
///
/// Entries that fail to decode are skipped.
pub fn decode_first<E: SolEvent>(logs: &[LogEntry]) -> Result<E, DecodeError> {
    logs.iter()
        .find_map(|log| E::decode_raw_log(log.topics.iter().copied(), &log.data).ok())
        .ok_or(DecodeError::NotFound { event: E::SIGNATURE })
}

/// L2 hash announced by the first `NewPriorityRequest` in the logs.
pub fn priority_request_hash(logs: &[LogEntry]) -> Result<TxHash, DecodeError> {
    decode_first::<NewPriorityRequest>(logs).map(|event| event.txHash)
}
