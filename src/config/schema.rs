//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the tracker.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::tracking::types::TransactionKind;

/// Root configuration for the bridge status tracker.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TrackerConfig {
    /// Network scope selection.
    pub network: NetworkConfig,

    /// Per-kind polling intervals and concurrency bound.
    pub polling: PollingConfig,

    /// Retry configuration for L1 receipt fetches.
    pub retries: RetryConfig,

    /// Base chain RPC settings.
    pub l1: ChainConfig,

    /// Rollup chain RPC settings.
    pub l2: ChainConfig,

    /// Ledger persistence settings.
    pub storage: StorageConfig,

    /// Expected completion delays stamped on new transactions.
    pub estimates: EstimateConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Network scope configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Network key the ledger starts in (e.g. "mainnet", "sepolia").
    pub key: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            key: "mainnet".to_string(),
        }
    }
}

/// Polling configuration for the completion scheduler.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Delay between deposit rounds in milliseconds.
    pub deposit_interval_ms: u64,

    /// Delay between withdrawal rounds in milliseconds.
    pub withdrawal_interval_ms: u64,

    /// Delay between transfer rounds in milliseconds.
    pub transfer_interval_ms: u64,

    /// Maximum L2 receipt lookups and finalization queries in flight across
    /// all trackers. L1 deposit waits are not counted. Read once at startup.
    pub max_concurrent_rounds: usize,
}

impl PollingConfig {
    /// Delay between two rounds for the given kind.
    pub fn interval_for(&self, kind: TransactionKind) -> Duration {
        let ms = match kind {
            TransactionKind::Deposit => self.deposit_interval_ms,
            TransactionKind::Withdrawal => self.withdrawal_interval_ms,
            TransactionKind::Transfer => self.transfer_interval_ms,
        };
        Duration::from_millis(ms)
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            deposit_interval_ms: 15_000,
            withdrawal_interval_ms: 30_000,
            transfer_interval_ms: 2_000,
            max_concurrent_rounds: 16,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts (first call included).
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            max_delay_ms: 5_000,
        }
    }
}

/// Chain RPC configuration, one per layer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    pub failover_urls: Vec<String>,

    /// Expected chain ID (1 for Ethereum mainnet, 324 for ZKsync Era).
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Receipt polling interval while waiting for inclusion, in milliseconds.
    pub receipt_poll_interval_ms: u64,

    /// Upper bound on a single wait for a receipt, in seconds.
    pub receipt_wait_timeout_secs: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 1,
            rpc_timeout_secs: 10,
            receipt_poll_interval_ms: 4_000,
            receipt_wait_timeout_secs: 120,
        }
    }
}

/// Ledger persistence configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding every network scope. In-memory only when unset.
    pub path: Option<String>,
}

/// Expected completion delays.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EstimateConfig {
    /// Expected deposit completion delay in seconds.
    pub deposit_delay_secs: u64,

    /// Expected withdrawal completion delay in seconds.
    pub withdrawal_delay_secs: u64,
}

impl EstimateConfig {
    /// Expected delay for the given kind, if the kind has one.
    pub fn delay_for(&self, kind: TransactionKind) -> Option<Duration> {
        match kind {
            TransactionKind::Deposit => Some(Duration::from_secs(self.deposit_delay_secs)),
            TransactionKind::Withdrawal => Some(Duration::from_secs(self.withdrawal_delay_secs)),
            TransactionKind::Transfer => None,
        }
    }
}

impl Default for EstimateConfig {
    fn default() -> Self {
        Self {
            deposit_delay_secs: 15,
            withdrawal_delay_secs: 5 * 60,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
