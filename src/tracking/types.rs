//! Tracked transaction records.
//!
//! The JSON shape (camelCase, `type` for the kind) is the persisted layout and
//! must stay stable across releases.

use alloy::primitives::{Address, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::blockchain::types::Layer;
use crate::config::EstimateConfig;

/// What a bridge action does. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// L1 → L2.
    Deposit,
    /// L2 → L1, finalized by an explicit L1 step.
    Withdrawal,
    /// L2 → L2.
    Transfer,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdrawal => "withdrawal",
            TransactionKind::Transfer => "transfer",
        }
    }

    /// Layer the originating transaction hash belongs to.
    pub fn source_layer(&self) -> Layer {
        match self {
            TransactionKind::Deposit => Layer::L1,
            TransactionKind::Withdrawal | TransactionKind::Transfer => Layer::L2,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Amount and token identity. Opaque to the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAmount {
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
    pub amount: U256,
}

/// One side of a bridge action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub address: Address,
    pub destination: Layer,
}

/// Mutable outcome of a tracked transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusInfo {
    /// Counterpart-chain hash once known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_transaction_hash: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_complete_timestamp: Option<DateTime<Utc>>,

    /// Withdrawal only: proof is available and the user can finalize.
    #[serde(default)]
    pub withdrawal_finalization_available: bool,

    #[serde(default)]
    pub failed: bool,

    /// Terminal marker.
    pub completed: bool,
}

/// The unit of tracking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInfo {
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub token: TokenAmount,
    pub from: Party,
    pub to: Party,
    /// Originating hash, stored with the casing it was registered with.
    pub transaction_hash: String,
    pub timestamp: DateTime<Utc>,
    pub info: StatusInfo,
}

impl TransactionInfo {
    /// Build a fresh, pending record.
    ///
    /// `expected_complete_timestamp` is derived from `timestamp` and the
    /// configured delay for the kind.
    pub fn new(
        kind: TransactionKind,
        token: TokenAmount,
        from: Party,
        to: Party,
        transaction_hash: impl Into<String>,
        timestamp: DateTime<Utc>,
        estimates: &EstimateConfig,
    ) -> Self {
        let expected_complete_timestamp = estimates
            .delay_for(kind)
            .and_then(|delay| chrono::Duration::from_std(delay).ok())
            .map(|delay| timestamp + delay);

        Self {
            kind,
            token,
            from,
            to,
            transaction_hash: transaction_hash.into(),
            timestamp,
            info: StatusInfo {
                expected_complete_timestamp,
                ..StatusInfo::default()
            },
        }
    }

    /// Case-insensitive identity check.
    pub fn has_hash(&self, hash: &str) -> bool {
        self.transaction_hash.eq_ignore_ascii_case(hash)
    }

    pub fn is_completed(&self) -> bool {
        self.info.completed
    }

    /// Whether `account` started this transaction or receives this withdrawal.
    pub fn involves(&self, account: &Address) -> bool {
        self.from.address == *account
            || (self.kind == TransactionKind::Withdrawal && self.to.address == *account)
    }

    /// Same record with a new outcome. Identity fields are untouched.
    pub fn with_info(&self, info: StatusInfo) -> Self {
        Self {
            info,
            ..self.clone()
        }
    }
}
