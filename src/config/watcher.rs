//! Configuration file watcher for hot reload.

use arc_swap::ArcSwap;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::loader::load_config;
use crate::config::schema::{ChainConfig, TrackerConfig};

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<TrackerConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<TrackerConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file in a background thread.
    ///
    /// The returned watcher must be kept alive for events to flow.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!("Config file change detected, reloading...");
                        match load_config(&path) {
                            Ok(new_config) => {
                                let _ = tx.send(new_config);
                            }
                            Err(e) => {
                                tracing::error!(
                                    "Failed to reload config: {}. Keeping current configuration.",
                                    e
                                );
                            }
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

/// Apply every received configuration to the shared handle until the
/// sending side closes.
pub fn spawn_reloader(
    shared: Arc<ArcSwap<TrackerConfig>>,
    mut updates: mpsc::UnboundedReceiver<TrackerConfig>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(config) = updates.recv().await {
            tracing::info!(
                deposit_interval_ms = config.polling.deposit_interval_ms,
                withdrawal_interval_ms = config.polling.withdrawal_interval_ms,
                transfer_interval_ms = config.polling.transfer_interval_ms,
                "Applying reloaded configuration"
            );
            let fixed = restart_required(&shared.load(), &config);
            if !fixed.is_empty() {
                tracing::warn!(
                    sections = ?fixed,
                    "Reloaded configuration changes settings that only apply after a restart"
                );
            }
            shared.store(Arc::new(config));
        }
        tracing::debug!("Config update channel closed");
    })
}

/// Settings that differ between `current` and `next` but are only read when
/// the tracker is built.
pub fn restart_required(current: &TrackerConfig, next: &TrackerConfig) -> Vec<&'static str> {
    let chain_changed = |a: &ChainConfig, b: &ChainConfig| {
        a.rpc_url != b.rpc_url
            || a.failover_urls != b.failover_urls
            || a.chain_id != b.chain_id
            || a.rpc_timeout_secs != b.rpc_timeout_secs
            || a.receipt_poll_interval_ms != b.receipt_poll_interval_ms
            || a.receipt_wait_timeout_secs != b.receipt_wait_timeout_secs
    };

    let mut fixed = Vec::new();
    if current.network.key != next.network.key {
        fixed.push("network");
    }
    if current.polling.max_concurrent_rounds != next.polling.max_concurrent_rounds {
        fixed.push("polling.max_concurrent_rounds");
    }
    if chain_changed(&current.l1, &next.l1) {
        fixed.push("l1");
    }
    if chain_changed(&current.l2, &next.l2) {
        fixed.push("l2");
    }
    if current.storage.path != next.storage.path {
        fixed.push("storage");
    }
    if current.observability.log_level != next.observability.log_level {
        fixed.push("observability");
    }
    fixed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reloader_swaps_config() {
        let shared = Arc::new(ArcSwap::from_pointee(TrackerConfig::default()));
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = spawn_reloader(shared.clone(), rx);

        let mut updated = TrackerConfig::default();
        updated.polling.transfer_interval_ms = 250;
        tx.send(updated).unwrap();
        drop(tx);
        handle.await.unwrap();

        assert_eq!(shared.load().polling.transfer_interval_ms, 250);
    }

    #[test]
    fn test_live_settings_need_no_restart() {
        let current = TrackerConfig::default();
        let mut next = TrackerConfig::default();
        next.polling.deposit_interval_ms = 1_000;
        next.retries.max_attempts = 7;
        next.estimates.withdrawal_delay_secs = 60;

        assert!(restart_required(&current, &next).is_empty());
    }

    #[test]
    fn test_construction_settings_are_reported() {
        let current = TrackerConfig::default();
        let mut next = TrackerConfig::default();
        next.polling.max_concurrent_rounds = 4;
        next.l2.chain_id = 324;
        next.storage.path = Some("/var/lib/bridge/transactions.json".to_string());

        assert_eq!(
            restart_required(&current, &next),
            vec!["polling.max_concurrent_rounds", "l2", "storage"]
        );
    }
}
