//! Withdrawal finalization status.
//!
//! The bridge protocol layer decides whether an L2 withdrawal has been proven
//! and finalized on L1. This crate only consumes that decision.

use alloy::primitives::TxHash;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::blockchain::types::FetchResult;

/// Withdrawal lifecycle phase as reported by the bridge protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WithdrawalPhase {
    /// Finalized on L1; funds released.
    Finalized,
    /// Finalization was attempted on L1 and failed.
    FinalizeFailed,
    /// Proof available; the user can finalize.
    ReadyToFinalize,
    /// Any other phase (L2_PENDING, L2_INCLUDED, FINALIZING, ...).
    Other(String),
}

impl WithdrawalPhase {
    pub fn as_str(&self) -> &str {
        match self {
            WithdrawalPhase::Finalized => "FINALIZED",
            WithdrawalPhase::FinalizeFailed => "FINALIZE_FAILED",
            WithdrawalPhase::ReadyToFinalize => "READY_TO_FINALIZE",
            WithdrawalPhase::Other(phase) => phase,
        }
    }
}

impl From<&str> for WithdrawalPhase {
    fn from(phase: &str) -> Self {
        match phase {
            "FINALIZED" => WithdrawalPhase::Finalized,
            "FINALIZE_FAILED" => WithdrawalPhase::FinalizeFailed,
            "READY_TO_FINALIZE" => WithdrawalPhase::ReadyToFinalize,
            other => WithdrawalPhase::Other(other.to_string()),
        }
    }
}

impl From<String> for WithdrawalPhase {
    fn from(phase: String) -> Self {
        WithdrawalPhase::from(phase.as_str())
    }
}

impl From<WithdrawalPhase> for String {
    fn from(phase: WithdrawalPhase) -> Self {
        phase.as_str().to_string()
    }
}

impl fmt::Display for WithdrawalPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answer of a finalization-status query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalStatus {
    pub l2_tx_hash: TxHash,
    pub phase: WithdrawalPhase,
}

/// Bridge protocol query for withdrawal finalization.
#[async_trait]
pub trait FinalizationStatusSource: Send + Sync {
    async fn withdrawal_status(&self, l2_hash: TxHash) -> FetchResult<WithdrawalStatus>;
}
