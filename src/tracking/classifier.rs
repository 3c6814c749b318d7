//! Status classification.
//!
//! Pure functions from already-fetched chain data to a new [`StatusInfo`].
//! "Unchanged" results are returned as a clone of the input.

use alloy::primitives::TxHash;

use crate::blockchain::events::{priority_request_hash, DecodeError};
use crate::blockchain::finalization::WithdrawalPhase;
use crate::blockchain::types::Receipt;
use crate::tracking::types::StatusInfo;

/// What the L1 receipt of a deposit says.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepositL1 {
    Reverted,
    /// Accepted on L1; the rollup will execute this L2 hash.
    Queued(TxHash),
}

/// What the L2 receipt of a withdrawal says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WithdrawalReceipt {
    Pending,
    Failed(StatusInfo),
    /// Included successfully; the finalization phase decides the rest.
    Included,
}

/// Terminal failure.
pub fn failed(info: &StatusInfo) -> StatusInfo {
    StatusInfo {
        failed: true,
        completed: true,
        ..info.clone()
    }
}

/// Inspect a deposit's L1 receipt. Logs are only scanned for successful receipts.
pub fn inspect_deposit_l1(l1: &Receipt) -> Result<DepositL1, DecodeError> {
    if !l1.succeeded() {
        return Ok(DepositL1::Reverted);
    }
    priority_request_hash(&l1.logs).map(DepositL1::Queued)
}

/// A deposit completes once its L2 transaction has a receipt.
///
/// The L2 receipt status is not inspected.
pub fn classify_deposit(info: &StatusInfo, l2_hash: TxHash, l2: Option<&Receipt>) -> StatusInfo {
    match l2 {
        None => info.clone(),
        Some(_) => StatusInfo {
            to_transaction_hash: Some(l2_hash.to_string()),
            completed: true,
            ..info.clone()
        },
    }
}

pub fn inspect_withdrawal_receipt(info: &StatusInfo, l2: Option<&Receipt>) -> WithdrawalReceipt {
    match l2 {
        None => WithdrawalReceipt::Pending,
        Some(receipt) if !receipt.succeeded() => WithdrawalReceipt::Failed(StatusInfo {
            withdrawal_finalization_available: false,
            ..failed(info)
        }),
        Some(_) => WithdrawalReceipt::Included,
    }
}

pub fn classify_withdrawal_phase(info: &StatusInfo, phase: &WithdrawalPhase) -> StatusInfo {
    let (completed, failed, finalization_available) = match phase {
        WithdrawalPhase::Finalized => (true, false, false),
        WithdrawalPhase::FinalizeFailed => (true, true, false),
        WithdrawalPhase::ReadyToFinalize => (false, false, true),
        WithdrawalPhase::Other(_) => return info.clone(),
    };
    StatusInfo {
        completed,
        failed,
        withdrawal_finalization_available: finalization_available,
        ..info.clone()
    }
}

/// A transfer is terminal as soon as it has a receipt.
pub fn classify_transfer(info: &StatusInfo, l2: Option<&Receipt>) -> StatusInfo {
    match l2 {
        None => info.clone(),
        Some(receipt) => StatusInfo {
            completed: true,
            failed: !receipt.succeeded(),
            ..info.clone()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::events::tests::priority_request_log;
    use crate::blockchain::types::{LogEntry, ReceiptStatus};
    use alloy::primitives::{Address, Bytes, B256};

    fn receipt(status: ReceiptStatus, logs: Vec<LogEntry>) -> Receipt {
        Receipt {
            transaction_hash: B256::repeat_byte(0x01),
            block_number: Some(100),
            status,
            logs,
        }
    }

    fn pending() -> StatusInfo {
        StatusInfo::default()
    }

    #[test]
    fn test_deposit_success_flow() {
        let l2_hash = B256::repeat_byte(0xaa);
        let l1 = receipt(ReceiptStatus::Success, vec![priority_request_log(l2_hash)]);

        let stage = inspect_deposit_l1(&l1).unwrap();
        assert_eq!(stage, DepositL1::Queued(l2_hash));

        // L2 not executed yet
        assert_eq!(classify_deposit(&pending(), l2_hash, None), pending());

        let l2 = receipt(ReceiptStatus::Success, Vec::new());
        let done = classify_deposit(&pending(), l2_hash, Some(&l2));
        assert_eq!(done.to_transaction_hash, Some(l2_hash.to_string()));
        assert!(done.completed);
        assert!(!done.failed);
    }

    #[test]
    fn test_deposit_revert_skips_log_scan() {
        // Reverted receipt without any logs must not report NotFound.
        let l1 = receipt(ReceiptStatus::Reverted, Vec::new());
        assert_eq!(inspect_deposit_l1(&l1), Ok(DepositL1::Reverted));

        let out = failed(&pending());
        assert!(out.failed && out.completed);
    }

    #[test]
    fn test_deposit_without_priority_request() {
        let unrelated = LogEntry {
            address: Address::ZERO,
            topics: vec![B256::repeat_byte(0x42)],
            data: Bytes::new(),
        };
        let l1 = receipt(ReceiptStatus::Success, vec![unrelated]);
        assert!(matches!(
            inspect_deposit_l1(&l1),
            Err(DecodeError::NotFound { .. })
        ));
    }

    #[test]
    fn test_deposit_l2_revert_still_completes() {
        let l2_hash = B256::repeat_byte(0xcc);
        let l2 = receipt(ReceiptStatus::Reverted, Vec::new());
        let out = classify_deposit(&pending(), l2_hash, Some(&l2));
        assert!(out.completed);
        assert!(!out.failed);
    }

    #[test]
    fn test_withdrawal_receipt_failure_is_terminal() {
        let info = StatusInfo {
            withdrawal_finalization_available: true,
            ..pending()
        };
        let l2 = receipt(ReceiptStatus::Reverted, Vec::new());
        match inspect_withdrawal_receipt(&info, Some(&l2)) {
            WithdrawalReceipt::Failed(out) => {
                assert!(out.failed);
                assert!(out.completed);
                assert!(!out.withdrawal_finalization_available);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(inspect_withdrawal_receipt(&info, None), WithdrawalReceipt::Pending);
    }

    #[test]
    fn test_withdrawal_phases() {
        let ready = classify_withdrawal_phase(&pending(), &WithdrawalPhase::ReadyToFinalize);
        assert_eq!((ready.completed, ready.failed, ready.withdrawal_finalization_available), (false, false, true));

        let finalized = classify_withdrawal_phase(&ready, &WithdrawalPhase::Finalized);
        assert_eq!(
            (finalized.completed, finalized.failed, finalized.withdrawal_finalization_available),
            (true, false, false)
        );

        let finalize_failed = classify_withdrawal_phase(&ready, &WithdrawalPhase::FinalizeFailed);
        assert_eq!(
            (finalize_failed.completed, finalize_failed.failed, finalize_failed.withdrawal_finalization_available),
            (true, true, false)
        );

        let other = classify_withdrawal_phase(&ready, &WithdrawalPhase::Other("FINALIZING".into()));
        assert_eq!(other, ready);
    }

    #[test]
    fn test_transfer() {
        assert_eq!(classify_transfer(&pending(), None), pending());

        let ok = classify_transfer(&pending(), Some(&receipt(ReceiptStatus::Success, Vec::new())));
        assert!(ok.completed && !ok.failed);

        let reverted = classify_transfer(&pending(), Some(&receipt(ReceiptStatus::Reverted, Vec::new())));
        assert!(reverted.completed && reverted.failed);
    }

    #[test]
    fn test_failed_implies_completed() {
        let l2_reverted = receipt(ReceiptStatus::Reverted, Vec::new());
        let mut outcomes = vec![
            failed(&pending()),
            classify_transfer(&pending(), Some(&l2_reverted)),
            classify_withdrawal_phase(&pending(), &WithdrawalPhase::FinalizeFailed),
        ];
        if let WithdrawalReceipt::Failed(out) = inspect_withdrawal_receipt(&pending(), Some(&l2_reverted)) {
            outcomes.push(out);
        }
        assert_eq!(outcomes.len(), 4);
        for out in outcomes {
            assert!(!out.failed || out.completed, "{:?}", out);
        }
    }
}
