//! Network-scoped transaction ledger.

use alloy::primitives::Address;
use arc_swap::{ArcSwap, ArcSwapOption};
use dashmap::mapref::one::RefMut;
use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::ledger::storage::{StorageError, TransactionStorage};
use crate::observability::metrics;
use crate::tracking::types::TransactionInfo;

/// Ledger failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Transaction not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Tracked transactions, partitioned by network key.
///
/// Every scope is loaded from storage on first use and cached. Mutations of a
/// scope hold that scope's map entry for the whole read-modify-write, so two
/// writers on the same network never interleave. Storage is written before
/// the cache, so a failed write leaves the scope as it was.
pub struct TransactionLedger {
    storage: Arc<dyn TransactionStorage>,
    scopes: DashMap<String, Vec<TransactionInfo>>,
    network: ArcSwap<String>,
    account: ArcSwapOption<Address>,
}

impl TransactionLedger {
    pub fn new(storage: Arc<dyn TransactionStorage>, network: impl Into<String>) -> Self {
        Self {
            storage,
            scopes: DashMap::new(),
            network: ArcSwap::from_pointee(network.into()),
            account: ArcSwapOption::empty(),
        }
    }

    /// Currently visible network key.
    pub fn network(&self) -> String {
        String::clone(&self.network.load())
    }

    /// Swap the visible scope. Other scopes stay in storage.
    pub fn switch_network(&self, network: impl Into<String>) {
        let network = network.into();
        tracing::info!(network = %network, "Switching ledger network");
        self.network.store(Arc::new(network));
    }

    /// Signed-in account used by [`user_transactions`](Self::user_transactions).
    pub fn account(&self) -> Option<Address> {
        self.account.load().as_deref().copied()
    }

    pub fn set_account(&self, account: Address) {
        self.account.store(Some(Arc::new(account)));
    }

    pub fn clear_account(&self) {
        self.account.store(None);
    }

    /// All transactions of the current scope, in insertion order.
    pub fn saved_transactions(&self) -> LedgerResult<Vec<TransactionInfo>> {
        self.saved_transactions_in(&self.network())
    }

    pub fn saved_transactions_in(&self, network: &str) -> LedgerResult<Vec<TransactionInfo>> {
        self.read_scope(network, |scope| scope.to_vec())
    }

    /// Transactions the signed-in account sent, plus withdrawals it receives.
    ///
    /// Empty when nobody is signed in.
    pub fn user_transactions(&self) -> LedgerResult<Vec<TransactionInfo>> {
        let Some(account) = self.account() else {
            return Ok(Vec::new());
        };
        self.read_scope(&self.network(), |scope| {
            scope.iter().filter(|tx| tx.involves(&account)).cloned().collect()
        })
    }

    /// Incomplete transactions of the current scope.
    pub fn pending_transactions(&self) -> LedgerResult<Vec<TransactionInfo>> {
        self.read_scope(&self.network(), |scope| {
            scope.iter().filter(|tx| !tx.is_completed()).cloned().collect()
        })
    }

    /// Case-insensitive lookup in the current scope.
    pub fn get_transaction(&self, hash: &str) -> LedgerResult<Option<TransactionInfo>> {
        self.get_transaction_in(&self.network(), hash)
    }

    pub fn get_transaction_in(&self, network: &str, hash: &str) -> LedgerResult<Option<TransactionInfo>> {
        self.read_scope(network, |scope| scope.iter().find(|tx| tx.has_hash(hash)).cloned())
    }

    /// Upsert by hash in the current scope: replace in place or append.
    pub fn save_transaction(&self, tx: TransactionInfo) -> LedgerResult<()> {
        self.save_transaction_in(&self.network(), tx)
    }

    pub fn save_transaction_in(&self, network: &str, tx: TransactionInfo) -> LedgerResult<()> {
        self.mutate_scope(network, |scope| {
            match scope.iter_mut().find(|existing| existing.has_hash(&tx.transaction_hash)) {
                Some(existing) => {
                    tracing::debug!(network, tx_hash = %tx.transaction_hash, "Replacing transaction");
                    *existing = tx;
                }
                None => {
                    tracing::debug!(network, tx_hash = %tx.transaction_hash, kind = %tx.kind, "Appending transaction");
                    scope.push(tx);
                }
            }
            Ok(())
        })
    }

    /// Replace the record matching `hash` in the current scope, keeping its position.
    pub fn update_transaction_data(&self, hash: &str, tx: TransactionInfo) -> LedgerResult<TransactionInfo> {
        self.update_transaction_data_in(&self.network(), hash, tx)
    }

    pub fn update_transaction_data_in(
        &self,
        network: &str,
        hash: &str,
        tx: TransactionInfo,
    ) -> LedgerResult<TransactionInfo> {
        self.mutate_scope(network, |scope| {
            let existing = scope
                .iter_mut()
                .find(|existing| existing.has_hash(hash))
                .ok_or_else(|| LedgerError::NotFound(hash.to_string()))?;
            *existing = tx.clone();
            Ok(tx)
        })
    }

    fn scope_entry(&self, network: &str) -> LedgerResult<RefMut<'_, String, Vec<TransactionInfo>>> {
        let entry = self
            .scopes
            .entry(network.to_string())
            .or_try_insert_with(|| self.storage.load(network))?;
        Ok(entry)
    }

    fn read_scope<R>(&self, network: &str, f: impl FnOnce(&[TransactionInfo]) -> R) -> LedgerResult<R> {
        if let Some(scope) = self.scopes.get(network) {
            return Ok(f(scope.value()));
        }
        let scope = self.scope_entry(network)?;
        Ok(f(scope.value()))
    }

    fn mutate_scope<R>(
        &self,
        network: &str,
        f: impl FnOnce(&mut Vec<TransactionInfo>) -> LedgerResult<R>,
    ) -> LedgerResult<R> {
        let mut scope = self.scope_entry(network)?;
        let mut next = scope.value().clone();
        let out = f(&mut next)?;

        self.storage.store(network, &next)?;
        metrics::record_ledger_size(network, next.len());
        *scope.value_mut() = next;
        Ok(out)
    }
}

impl std::fmt::Debug for TransactionLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionLedger")
            .field("network", &self.network())
            .field("cached_scopes", &self.scopes.len())
            .finish()
    }
}
