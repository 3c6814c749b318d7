//! Ledger persistence and network scoping across restarts.

use std::sync::Arc;

use alloy::primitives::Address;
use bridge_status::blockchain::{Layer, ReceiptStatus};
use bridge_status::ledger::{JsonFileStorage, LedgerError, TransactionStorage};
use bridge_status::TransactionKind;

mod common;
use common::*;

fn open(path: &std::path::Path) -> Arc<dyn TransactionStorage> {
    Arc::new(JsonFileStorage::open(path).unwrap())
}

#[tokio::test(start_paused = true)]
async fn test_pending_transactions_resume_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("transactions.json");
    let l2 = hash(0x21);

    // First run: registered, never mined.
    {
        let tracker = tracker(MockChain::new(), MockFinalization::new(), open(&path));
        tracker
            .register(
                TransactionKind::Transfer,
                eth(1),
                party(0x0a, Layer::L2),
                party(0x0b, Layer::L2),
                l2.to_string(),
            )
            .unwrap();
        let handle = tracker.resume_pending().unwrap().remove(0);
        tokio::time::sleep(std::time::Duration::from_secs(10)).await;
        tracker.shutdown();
        assert!(handle.await.unwrap().is_none());
    }

    // Second run: the chain has caught up.
    let chain = MockChain::new();
    chain.script_l2(l2, vec![Ok(Some(receipt(l2, ReceiptStatus::Success, vec![])))]);
    let tracker = tracker(chain, MockFinalization::new(), open(&path));

    let handles = tracker.resume_pending().unwrap();
    assert_eq!(handles.len(), 1);
    for handle in handles {
        assert!(handle.await.unwrap().unwrap().unwrap().info.completed);
    }
    drop(tracker);

    let reopened = JsonFileStorage::open(&path).unwrap();
    let stored = reopened.load("mainnet").unwrap();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].info.completed);
}

#[tokio::test(start_paused = true)]
async fn test_network_switch_mid_flight_persists_to_original_scope() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("transactions.json");
    let l2 = hash(0x22);
    let chain = MockChain::new();
    chain.script_l2(
        l2,
        vec![Ok(None), Ok(None), Ok(Some(receipt(l2, ReceiptStatus::Success, vec![])))],
    );
    let tracker = tracker(chain, MockFinalization::new(), open(&path));

    let tx = tracker
        .register(
            TransactionKind::Transfer,
            eth(1),
            party(0x0a, Layer::L2),
            party(0x0b, Layer::L2),
            l2.to_string(),
        )
        .unwrap();
    let handle = tracker.track(tx);
    tracker.switch_network("sepolia");

    handle.await.unwrap().unwrap().unwrap();

    let ledger = tracker.ledger();
    assert!(ledger.saved_transactions().unwrap().is_empty());
    let mainnet = ledger.saved_transactions_in("mainnet").unwrap();
    assert!(mainnet[0].info.completed);

    let reopened = JsonFileStorage::open(&path).unwrap();
    assert!(reopened.load("sepolia").unwrap().is_empty());
    assert!(reopened.load("mainnet").unwrap()[0].info.completed);
}

#[test]
fn test_user_transactions_follow_account_and_network() {
    let dir = tempfile::tempdir().unwrap();
    let tracker = tracker(
        MockChain::new(),
        MockFinalization::new(),
        open(&dir.path().join("transactions.json")),
    );
    let me = 0x0a;
    let other = 0x0c;

    let register = |kind, from: u8, to: u8, h: u8| {
        tracker
            .register(kind, eth(1), party(from, Layer::L2), party(to, Layer::L1), hash(h).to_string())
            .unwrap()
    };
    register(TransactionKind::Deposit, me, me, 0x31);
    register(TransactionKind::Withdrawal, other, me, 0x32);
    register(TransactionKind::Transfer, other, me, 0x33);

    // Signed out: nothing is visible.
    assert!(tracker.ledger().user_transactions().unwrap().is_empty());

    tracker.set_account(Address::repeat_byte(me));
    let mine: Vec<_> = tracker
        .ledger()
        .user_transactions()
        .unwrap()
        .into_iter()
        .map(|tx| tx.kind)
        .collect();
    assert_eq!(mine, vec![TransactionKind::Deposit, TransactionKind::Withdrawal]);

    tracker.switch_network("sepolia");
    assert!(tracker.ledger().user_transactions().unwrap().is_empty());

    tracker.switch_network("mainnet");
    tracker.clear_account();
    assert!(tracker.ledger().user_transactions().unwrap().is_empty());
    assert_eq!(tracker.ledger().saved_transactions().unwrap().len(), 3);
}

#[test]
fn test_update_unknown_transaction_is_not_found() {
    let tracker = tracker(
        MockChain::new(),
        MockFinalization::new(),
        Arc::new(bridge_status::ledger::MemoryStorage::new()),
    );
    let tx = tracker
        .register(
            TransactionKind::Transfer,
            eth(1),
            party(0x0a, Layer::L2),
            party(0x0b, Layer::L2),
            hash(0x41).to_string(),
        )
        .unwrap();

    let err = tracker
        .ledger()
        .update_transaction_data(&hash(0x42).to_string(), tx)
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(_)));
}
