//! Completion scheduler.
//!
//! Polls the engine for one transaction until it reaches a terminal state,
//! writing every change back to the ledger scope the transaction belongs to.

use arc_swap::ArcSwap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::Instrument;

use crate::config::TrackerConfig;
use crate::ledger::TransactionLedger;
use crate::lifecycle::shutdown::{stop_requested, Shutdown};
use crate::observability::metrics;
use crate::resilience::Backoff;
use crate::tracking::engine::ReconciliationEngine;
use crate::tracking::error::TrackResult;
use crate::tracking::types::TransactionInfo;

/// Outcome of a spawned tracker: `None` when stopped by shutdown.
pub type TrackerHandle = JoinHandle<Option<TrackResult<TransactionInfo>>>;

/// Runs completion loops for tracked transactions.
#[derive(Clone)]
pub struct CompletionScheduler {
    engine: Arc<ReconciliationEngine>,
    ledger: Arc<TransactionLedger>,
    /// Read every round: intervals and retry policy follow reloads.
    config: Arc<ArcSwap<TrackerConfig>>,
}

/// Keeps the active-tracker gauge right when a loop is dropped mid-flight.
struct ActiveTracker;

impl ActiveTracker {
    fn start() -> Self {
        metrics::record_tracker_started();
        Self
    }
}

impl Drop for ActiveTracker {
    fn drop(&mut self) {
        metrics::record_tracker_stopped();
    }
}

impl CompletionScheduler {
    pub fn new(
        engine: Arc<ReconciliationEngine>,
        ledger: Arc<TransactionLedger>,
        config: Arc<ArcSwap<TrackerConfig>>,
    ) -> Self {
        Self {
            engine,
            ledger,
            config,
        }
    }

    /// Poll until `tx` is terminal, in the ledger's current network scope.
    ///
    /// Infrastructure faults are logged and retried on the next round. There
    /// is no internal timeout: drop the future to stop tracking.
    pub async fn wait_for_completion(&self, tx: TransactionInfo) -> TrackResult<TransactionInfo> {
        let network = self.ledger.network();
        self.wait_for_completion_in(&network, tx).await
    }

    /// Same as [`wait_for_completion`](Self::wait_for_completion) for an explicit scope.
    pub async fn wait_for_completion_in(
        &self,
        network: &str,
        tx: TransactionInfo,
    ) -> TrackResult<TransactionInfo> {
        if tx.is_completed() {
            return Ok(tx);
        }

        let span = tracing::info_span!(
            "tracker",
            network,
            tx_hash = %tx.transaction_hash,
            kind = %tx.kind,
        );
        self.poll_until_terminal(network, tx).instrument(span).await
    }

    async fn poll_until_terminal(
        &self,
        network: &str,
        mut tx: TransactionInfo,
    ) -> TrackResult<TransactionInfo> {
        let _active = ActiveTracker::start();
        tracing::info!("Tracking transaction");

        loop {
            let backoff = Backoff::from(&self.config.load().retries);
            let advanced = self.engine.advance_with(&tx, backoff).await;

            match advanced {
                Ok(next) => {
                    if next.info != tx.info {
                        self.ledger.save_transaction_in(network, next.clone())?;
                        metrics::record_round(tx.kind, "changed");
                    } else {
                        metrics::record_round(tx.kind, "unchanged");
                    }
                    tx = next;
                }
                Err(e) if e.is_retryable() => {
                    tracing::warn!(error = %e, "Status round failed, retrying next round");
                    metrics::record_round(tx.kind, "retry");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Tracking stopped");
                    metrics::record_round(tx.kind, "error");
                    return Err(e);
                }
            }

            if tx.is_completed() {
                tracing::info!(failed = tx.info.failed, "Transaction reached terminal state");
                metrics::record_terminal(tx.kind, tx.info.failed);
                return Ok(tx);
            }

            let interval = self.config.load().polling.interval_for(tx.kind);
            tracing::debug!(?interval, "Transaction pending");
            sleep(interval).await;
        }
    }

    /// Track `tx` on a background task until terminal or shutdown.
    ///
    /// Dropping every [`Shutdown`] handle without triggering leaves the
    /// tracker running.
    pub fn spawn(&self, tx: TransactionInfo, shutdown: &Shutdown) -> TrackerHandle {
        let scheduler = self.clone();
        let network = self.ledger.network();
        let mut stop = shutdown.subscribe();
        let stopped = shutdown.is_triggered();
        tokio::spawn(async move {
            if stopped {
                return None;
            }
            tokio::select! {
                result = scheduler.wait_for_completion_in(&network, tx) => Some(result),
                _ = stop_requested(&mut stop) => {
                    tracing::info!(network = %network, "Tracker received shutdown signal");
                    None
                }
            }
        })
    }

    /// Spawn a tracker for every incomplete transaction of the current scope.
    pub fn resume_pending(&self, shutdown: &Shutdown) -> TrackResult<Vec<TrackerHandle>> {
        let pending = self.ledger.pending_transactions()?;
        tracing::info!(
            network = %self.ledger.network(),
            count = pending.len(),
            "Resuming pending transactions"
        );
        Ok(pending
            .into_iter()
            .map(|tx| self.spawn(tx, shutdown))
            .collect())
    }

    pub fn ledger(&self) -> &Arc<TransactionLedger> {
        &self.ledger
    }
}
