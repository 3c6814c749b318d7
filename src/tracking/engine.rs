//! Reconciliation engine.
//!
//! Advances one transaction by one step: fetch what the kind needs, hand it
//! to the classifier, return the new record. Infrastructure faults come back
//! as errors for the scheduler to retry; reverts become terminal failures.

use alloy::primitives::TxHash;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Semaphore, SemaphorePermit};

use crate::blockchain::finalization::FinalizationStatusSource;
use crate::blockchain::receipts::ReceiptProvider;
use crate::blockchain::types::{FetchError, Layer, Receipt};
use crate::config::RetryConfig;
use crate::observability::metrics;
use crate::resilience::{retry_with_backoff, Backoff};
use crate::tracking::classifier::{self, DepositL1, WithdrawalReceipt};
use crate::tracking::error::{TrackError, TrackResult};
use crate::tracking::types::{StatusInfo, TransactionInfo, TransactionKind};

/// Drives receipt fetches and classification per transaction kind.
#[derive(Clone)]
pub struct ReconciliationEngine {
    receipts: Arc<dyn ReceiptProvider>,
    finalization: Arc<dyn FinalizationStatusSource>,
    backoff: Backoff,
    /// Bound on one L1 receipt wait; `None` defers to the provider.
    receipt_wait: Option<Duration>,
    /// Limits single lookups in flight. L1 waits are not counted.
    fetch_permits: Option<Arc<Semaphore>>,
}

impl ReconciliationEngine {
    pub fn new(
        receipts: Arc<dyn ReceiptProvider>,
        finalization: Arc<dyn FinalizationStatusSource>,
        retries: &RetryConfig,
    ) -> Self {
        Self {
            receipts,
            finalization,
            backoff: Backoff::from(retries),
            receipt_wait: None,
            fetch_permits: None,
        }
    }

    /// Allow at most `permits` L2 receipt lookups and finalization queries at once.
    pub fn with_fetch_limit(mut self, permits: usize) -> Self {
        self.fetch_permits = Some(Arc::new(Semaphore::new(permits.max(1))));
        self
    }

    pub fn with_receipt_wait(mut self, wait: Duration) -> Self {
        self.receipt_wait = Some(wait);
        self
    }

    /// Advance `tx` by one step.
    ///
    /// Completed transactions are returned unchanged.
    pub async fn advance(&self, tx: &TransactionInfo) -> TrackResult<TransactionInfo> {
        self.advance_with(tx, self.backoff).await
    }

    /// [`advance`](Self::advance) with an explicit L1 retry policy.
    pub async fn advance_with(&self, tx: &TransactionInfo, backoff: Backoff) -> TrackResult<TransactionInfo> {
        if tx.is_completed() {
            return Ok(tx.clone());
        }

        let source = parse_hash(&tx.transaction_hash)?;
        let info = match tx.kind {
            TransactionKind::Deposit => self.deposit_status(source, &tx.info, backoff).await?,
            TransactionKind::Withdrawal => self.withdrawal_status(source, &tx.info).await?,
            TransactionKind::Transfer => self.transfer_status(source, &tx.info).await?,
        };

        if info != tx.info {
            tracing::debug!(
                tx_hash = %tx.transaction_hash,
                kind = %tx.kind,
                completed = info.completed,
                failed = info.failed,
                finalization_available = info.withdrawal_finalization_available,
                "Transaction status changed"
            );
        }
        Ok(tx.with_info(info))
    }

    async fn deposit_status(
        &self,
        l1_hash: TxHash,
        info: &StatusInfo,
        backoff: Backoff,
    ) -> TrackResult<StatusInfo> {
        let receipts = &self.receipts;
        let wait = self.receipt_wait;
        let fetched = retry_with_backoff(
            backoff,
            move || receipts.wait_for_transaction_receipt(l1_hash, Layer::L1, wait),
            FetchError::is_retryable,
            |attempt, e| {
                tracing::warn!(tx_hash = %l1_hash, attempt, error = %e, "L1 receipt fetch failed, retrying");
                metrics::record_fetch_retry(Layer::L1);
            },
        )
        .await;

        let l1 = match fetched {
            Ok(receipt) => receipt,
            Err(e) if e.is_semantic() => {
                tracing::info!(tx_hash = %l1_hash, error = %e, "Deposit failed on L1");
                return Ok(classifier::failed(info));
            }
            Err(e) => return Err(e.into()),
        };

        match classifier::inspect_deposit_l1(&l1)? {
            DepositL1::Reverted => {
                tracing::info!(tx_hash = %l1_hash, "Deposit reverted on L1");
                Ok(classifier::failed(info))
            }
            DepositL1::Queued(l2_hash) => {
                let l2 = match self.fetch_l2(l2_hash).await {
                    Ok(l2) => l2,
                    Err(e) if e.is_semantic() => return Ok(classifier::failed(info)),
                    Err(e) => return Err(e.into()),
                };
                Ok(classifier::classify_deposit(info, l2_hash, l2.as_ref()))
            }
        }
    }

    async fn withdrawal_status(&self, l2_hash: TxHash, info: &StatusInfo) -> TrackResult<StatusInfo> {
        let l2 = match self.fetch_l2(l2_hash).await {
            Ok(l2) => l2,
            Err(e) if e.is_semantic() => {
                return Ok(StatusInfo {
                    withdrawal_finalization_available: false,
                    ..classifier::failed(info)
                })
            }
            Err(e) => return Err(e.into()),
        };

        match classifier::inspect_withdrawal_receipt(info, l2.as_ref()) {
            WithdrawalReceipt::Pending => Ok(info.clone()),
            WithdrawalReceipt::Failed(out) => {
                tracing::info!(tx_hash = %l2_hash, "Withdrawal failed on L2");
                Ok(out)
            }
            WithdrawalReceipt::Included => {
                let queried = {
                    let _permit = self.fetch_permit().await;
                    self.finalization.withdrawal_status(l2_hash).await
                };
                let status = match queried {
                    Ok(status) => status,
                    Err(e) if e.is_semantic() => {
                        tracing::info!(tx_hash = %l2_hash, error = %e, "Withdrawal finalization reverted");
                        return Ok(StatusInfo {
                            withdrawal_finalization_available: false,
                            ..classifier::failed(info)
                        });
                    }
                    Err(e) => return Err(e.into()),
                };
                tracing::debug!(tx_hash = %l2_hash, phase = %status.phase, "Withdrawal phase");
                Ok(classifier::classify_withdrawal_phase(info, &status.phase))
            }
        }
    }

    async fn transfer_status(&self, l2_hash: TxHash, info: &StatusInfo) -> TrackResult<StatusInfo> {
        match self.fetch_l2(l2_hash).await {
            Ok(l2) => Ok(classifier::classify_transfer(info, l2.as_ref())),
            Err(e) if e.is_semantic() => Ok(classifier::failed(info)),
            Err(e) => Err(e.into()),
        }
    }

    /// Single L2 receipt lookup; the scheduler's next round is the retry.
    async fn fetch_l2(&self, hash: TxHash) -> Result<Option<Receipt>, FetchError> {
        let _permit = self.fetch_permit().await;
        self.receipts.get_transaction_receipt(hash, Layer::L2).await
    }

    async fn fetch_permit(&self) -> Option<SemaphorePermit<'_>> {
        // Never closed.
        match &self.fetch_permits {
            Some(permits) => permits.acquire().await.ok(),
            None => None,
        }
    }
}

pub(crate) fn parse_hash(hash: &str) -> TrackResult<TxHash> {
    hash.parse::<TxHash>()
        .map_err(|_| TrackError::InvalidHash(hash.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hash_accepts_mixed_case() {
        let upper = format!("0x{}", "AB".repeat(32));
        let lower = format!("0x{}", "ab".repeat(32));
        assert_eq!(parse_hash(&upper).unwrap(), parse_hash(&lower).unwrap());
    }

    #[test]
    fn test_parse_hash_rejects_short_values() {
        assert!(matches!(parse_hash("0xdead"), Err(TrackError::InvalidHash(_))));
    }
}
