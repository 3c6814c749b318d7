//! Startup orchestration.
//!
//! Wires storage, RPC clients, engine and scheduler into a [`BridgeTracker`].
//! Subsystems initialize in order and any failure is returned to the caller.

use alloy::primitives::Address;
use arc_swap::ArcSwap;
use chrono::Utc;
use notify::RecommendedWatcher;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::blockchain::finalization::FinalizationStatusSource;
use crate::blockchain::receipts::{BridgeRpc, ReceiptProvider};
use crate::blockchain::types::FetchError;
use crate::config::watcher::{spawn_reloader, ConfigWatcher};
use crate::config::TrackerConfig;
use crate::ledger::{open_storage, StorageError, TransactionLedger, TransactionStorage};
use crate::lifecycle::shutdown::Shutdown;
use crate::tracking::engine::{parse_hash, ReconciliationEngine};
use crate::tracking::{
    CompletionScheduler, Party, TokenAmount, TrackResult, TrackerHandle, TransactionInfo,
    TransactionKind,
};

/// Fatal errors while building a tracker.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("RPC setup failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("storage setup failed: {0}")]
    Storage(#[from] StorageError),
}

/// Entry point for embedders: register bridge actions and track them.
pub struct BridgeTracker {
    config: Arc<ArcSwap<TrackerConfig>>,
    ledger: Arc<TransactionLedger>,
    scheduler: CompletionScheduler,
    shutdown: Shutdown,
}

impl BridgeTracker {
    /// Build a tracker over explicit collaborators.
    pub fn new(
        config: TrackerConfig,
        storage: Arc<dyn TransactionStorage>,
        receipts: Arc<dyn ReceiptProvider>,
        finalization: Arc<dyn FinalizationStatusSource>,
    ) -> Self {
        let ledger = Arc::new(TransactionLedger::new(storage, config.network.key.clone()));
        let engine = Arc::new(
            ReconciliationEngine::new(receipts, finalization, &config.retries)
                .with_fetch_limit(config.polling.max_concurrent_rounds),
        );
        let config = Arc::new(ArcSwap::from_pointee(config));
        let scheduler = CompletionScheduler::new(engine, ledger.clone(), config.clone());

        tracing::info!(network = %ledger.network(), "Bridge tracker ready");

        Self {
            config,
            ledger,
            scheduler,
            shutdown: Shutdown::new(),
        }
    }

    /// Open configured storage and connect both RPC layers.
    pub async fn connect(
        config: TrackerConfig,
        finalization: Arc<dyn FinalizationStatusSource>,
    ) -> Result<Self, StartupError> {
        let storage = open_storage(&config.storage)?;
        let rpc = BridgeRpc::connect(&config).await?;
        tracing::info!(
            l1_chain_id = config.l1.chain_id,
            l2_chain_id = config.l2.chain_id,
            "RPC clients connected"
        );
        Ok(Self::new(config, storage, Arc::new(rpc), finalization))
    }

    pub fn ledger(&self) -> &Arc<TransactionLedger> {
        &self.ledger
    }

    pub fn scheduler(&self) -> &CompletionScheduler {
        &self.scheduler
    }

    /// Shared configuration; stores here are seen by running trackers.
    pub fn config_handle(&self) -> &Arc<ArcSwap<TrackerConfig>> {
        &self.config
    }

    pub fn shutdown_handle(&self) -> &Shutdown {
        &self.shutdown
    }

    /// Record a freshly submitted bridge action in the current network.
    pub fn register(
        &self,
        kind: TransactionKind,
        token: TokenAmount,
        from: Party,
        to: Party,
        transaction_hash: impl Into<String>,
    ) -> TrackResult<TransactionInfo> {
        let transaction_hash = transaction_hash.into();
        parse_hash(&transaction_hash)?;

        let tx = TransactionInfo::new(
            kind,
            token,
            from,
            to,
            transaction_hash,
            Utc::now(),
            &self.config.load().estimates,
        );
        self.ledger.save_transaction(tx.clone())?;
        tracing::info!(tx_hash = %tx.transaction_hash, kind = %kind, "Registered transaction");
        Ok(tx)
    }

    pub async fn wait_for_completion(&self, tx: TransactionInfo) -> TrackResult<TransactionInfo> {
        self.scheduler.wait_for_completion(tx).await
    }

    /// Track `tx` in the background until terminal or [`shutdown`](Self::shutdown).
    pub fn track(&self, tx: TransactionInfo) -> TrackerHandle {
        self.scheduler.spawn(tx, &self.shutdown)
    }

    /// Restart trackers for every incomplete transaction in the current network.
    pub fn resume_pending(&self) -> TrackResult<Vec<TrackerHandle>> {
        self.scheduler.resume_pending(&self.shutdown)
    }

    /// Switch the visible network. Running trackers keep writing to the
    /// network they started in.
    pub fn switch_network(&self, network: impl Into<String>) {
        self.ledger.switch_network(network);
    }

    pub fn set_account(&self, account: Address) {
        self.ledger.set_account(account);
    }

    pub fn clear_account(&self) {
        self.ledger.clear_account();
    }

    /// Reload settings when `path` changes.
    ///
    /// Polling intervals, retries and estimates apply to the next round.
    /// `network`, `l1`, `l2`, `storage`, `observability` and
    /// `polling.max_concurrent_rounds` are fixed at construction.
    ///
    /// The returned watcher must be kept alive for reloads to continue.
    pub fn watch_config(&self, path: &Path) -> Result<(RecommendedWatcher, JoinHandle<()>), notify::Error> {
        let (watcher, updates) = ConfigWatcher::new(path);
        let watcher = watcher.run()?;
        let reloader = spawn_reloader(self.config.clone(), updates);
        Ok((watcher, reloader))
    }

    /// Stop every background tracker.
    pub fn shutdown(&self) {
        self.shutdown.trigger();
    }
}

impl std::fmt::Debug for BridgeTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeTracker")
            .field("ledger", &self.ledger)
            .field("shutdown", &self.shutdown.is_triggered())
            .finish()
    }
}
