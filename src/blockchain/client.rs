//! Chain RPC client with timeout and failover.
//!
//! # Responsibilities
//! - Connect to a primary JSON-RPC endpoint plus failovers
//! - Query chain id, head block and transaction receipts
//! - Map transport faults, node errors and timeouts onto [`FetchError`]

use alloy::primitives::TxHash;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::transports::{RpcError, TransportError};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::blockchain::types::{FetchError, FetchResult, Layer, Receipt};
use crate::config::ChainConfig;

/// RPC client for one side of the bridge.
#[derive(Clone)]
pub struct ChainClient {
    layer: Layer,
    /// Primary provider first, then failovers.
    providers: Vec<Arc<dyn Provider + Send + Sync>>,
    config: ChainConfig,
    timeout_duration: Duration,
}

impl ChainClient {
    /// Create a new client.
    ///
    /// Fails only when the primary URL does not parse. Invalid failover URLs are
    /// skipped with a warning.
    pub async fn new(layer: Layer, config: ChainConfig) -> FetchResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let mut providers = Vec::new();

        let primary_url: url::Url = config.rpc_url.parse().map_err(|e| {
            FetchError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        providers.push(Arc::new(ProviderBuilder::new().connect_http(primary_url))
            as Arc<dyn Provider + Send + Sync>);

        for url_str in &config.failover_urls {
            if let Ok(url) = url_str.parse() {
                providers.push(Arc::new(ProviderBuilder::new().connect_http(url))
                    as Arc<dyn Provider + Send + Sync>);
            } else {
                tracing::warn!(%layer, url = %url_str, "Ignoring invalid failover RPC URL");
            }
        }

        let client = Self {
            layer,
            providers,
            config: config.clone(),
            timeout_duration,
        };

        // Chain verification failure is not fatal; the node may come up later.
        match client.verify_chain_id().await {
            Ok(()) => {
                tracing::info!(
                    %layer,
                    rpc_url = %config.rpc_url,
                    chain_id = config.chain_id,
                    "Chain client initialized"
                );
            }
            Err(e) => {
                tracing::warn!(
                    %layer,
                    error = %e,
                    "Chain client initialized but chain verification failed"
                );
            }
        }

        Ok(client)
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> FetchResult<()> {
        let chain_id = self.get_chain_id().await?;
        if chain_id != self.config.chain_id {
            return Err(FetchError::ChainMismatch {
                expected: self.config.chain_id,
                actual: chain_id,
            });
        }
        Ok(())
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> FetchResult<u64> {
        let mut last_err = FetchError::Rpc("no providers configured".to_string());
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, provider.get_chain_id()).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => {
                    tracing::warn!(layer = %self.layer, provider_idx = i, error = %e, "RPC error, trying next provider");
                    last_err = classify_transport_error(e);
                }
                Err(_) => {
                    tracing::warn!(layer = %self.layer, provider_idx = i, "RPC timeout, trying next provider");
                    last_err = FetchError::Timeout(self.config.rpc_timeout_secs);
                }
            }
        }
        Err(last_err)
    }

    /// Get the latest block number.
    pub async fn get_block_number(&self) -> FetchResult<u64> {
        let mut last_err = FetchError::Rpc("no providers configured".to_string());
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, provider.get_block_number()).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => {
                    tracing::warn!(layer = %self.layer, provider_idx = i, error = %e, "RPC error");
                    last_err = classify_transport_error(e);
                }
                Err(_) => {
                    tracing::warn!(layer = %self.layer, provider_idx = i, "RPC timeout");
                    last_err = FetchError::Timeout(self.config.rpc_timeout_secs);
                }
            }
        }
        Err(last_err)
    }

    /// Get a transaction receipt by hash. `None` while the transaction is not mined.
    pub async fn get_transaction_receipt(&self, tx_hash: TxHash) -> FetchResult<Option<Receipt>> {
        let mut last_err = FetchError::Rpc("no providers configured".to_string());
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, provider.get_transaction_receipt(tx_hash)).await {
                Ok(Ok(result)) => return Ok(result.as_ref().map(Receipt::from)),
                Ok(Err(e)) => {
                    tracing::warn!(layer = %self.layer, provider_idx = i, error = %e, "RPC error");
                    last_err = classify_transport_error(e);
                }
                Err(_) => {
                    tracing::warn!(layer = %self.layer, provider_idx = i, "RPC timeout");
                    last_err = FetchError::Timeout(self.config.rpc_timeout_secs);
                }
            }
        }
        Err(last_err)
    }

    /// Check if the chain is reachable.
    pub async fn is_healthy(&self) -> bool {
        self.get_block_number().await.is_ok()
    }

    pub fn layer(&self) -> Layer {
        self.layer
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Interval between receipt polls while waiting for inclusion.
    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.config.receipt_poll_interval_ms)
    }

    /// Default upper bound on a single receipt wait.
    pub fn receipt_wait_timeout(&self) -> Duration {
        Duration::from_secs(self.config.receipt_wait_timeout_secs)
    }
}

/// Transport faults are connection problems; anything else came back from the node.
fn classify_transport_error(e: TransportError) -> FetchError {
    match e {
        RpcError::Transport(kind) => FetchError::Connection(kind.to_string()),
        other => FetchError::Rpc(other.to_string()),
    }
}

impl std::fmt::Debug for ChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainClient")
            .field("layer", &self.layer)
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.config.chain_id)
            .field("providers", &self.providers.len())
            .finish()
    }
}
