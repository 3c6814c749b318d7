//! Receipt fetching across both layers.

use alloy::primitives::TxHash;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{interval, timeout, MissedTickBehavior};

use crate::blockchain::client::ChainClient;
use crate::blockchain::types::{FetchError, FetchResult, Layer, Receipt};
use crate::config::TrackerConfig;

/// Source of transaction receipts for either layer.
#[async_trait]
pub trait ReceiptProvider: Send + Sync {
    /// Receipt if the transaction is mined, `None` otherwise.
    async fn get_transaction_receipt(&self, hash: TxHash, layer: Layer) -> FetchResult<Option<Receipt>>;

    /// Block until the transaction is mined or `wait` elapses.
    ///
    /// `None` uses the provider's default bound.
    async fn wait_for_transaction_receipt(
        &self,
        hash: TxHash,
        layer: Layer,
        wait: Option<Duration>,
    ) -> FetchResult<Receipt>;
}

/// Alloy-backed [`ReceiptProvider`] over one L1 and one L2 client.
#[derive(Debug, Clone)]
pub struct BridgeRpc {
    l1: ChainClient,
    l2: ChainClient,
}

impl BridgeRpc {
    pub fn new(l1: ChainClient, l2: ChainClient) -> Self {
        Self { l1, l2 }
    }

    /// Build both clients from configuration.
    pub async fn connect(config: &TrackerConfig) -> FetchResult<Self> {
        let l1 = ChainClient::new(Layer::L1, config.l1.clone()).await?;
        let l2 = ChainClient::new(Layer::L2, config.l2.clone()).await?;
        Ok(Self::new(l1, l2))
    }

    pub fn client(&self, layer: Layer) -> &ChainClient {
        match layer {
            Layer::L1 => &self.l1,
            Layer::L2 => &self.l2,
        }
    }
}

#[async_trait]
impl ReceiptProvider for BridgeRpc {
    async fn get_transaction_receipt(&self, hash: TxHash, layer: Layer) -> FetchResult<Option<Receipt>> {
        self.client(layer).get_transaction_receipt(hash).await
    }

    async fn wait_for_transaction_receipt(
        &self,
        hash: TxHash,
        layer: Layer,
        wait: Option<Duration>,
    ) -> FetchResult<Receipt> {
        let client = self.client(layer);
        let wait = wait.unwrap_or_else(|| client.receipt_wait_timeout());

        let result = timeout(wait, async {
            let mut ticker = interval(client.receipt_poll_interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                match client.get_transaction_receipt(hash).await? {
                    Some(receipt) => return Ok(receipt),
                    None => tracing::debug!(%layer, tx_hash = %hash, "Receipt not available yet"),
                }
            }
        })
        .await;

        match result {
            Ok(receipt) => receipt,
            Err(_) => Err(FetchError::Timeout(wait.as_secs())),
        }
    }
}
