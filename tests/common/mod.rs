//! Shared utilities for integration testing.

#![allow(dead_code)]

use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use alloy::sol_types::SolEvent;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bridge_status::blockchain::events::{L2CanonicalTransaction, NewPriorityRequest};
use bridge_status::blockchain::{
    FetchError, FetchResult, FinalizationStatusSource, Layer, LogEntry, Receipt, ReceiptProvider,
    ReceiptStatus, WithdrawalPhase, WithdrawalStatus,
};
use bridge_status::ledger::TransactionStorage;
use bridge_status::tracking::{Party, TokenAmount};
use bridge_status::{BridgeTracker, TrackerConfig};

/// Per-hash response queue. The last entry repeats once the rest are used.
struct Script<T>(Mutex<HashMap<TxHash, VecDeque<T>>>);

impl<T: Clone> Script<T> {
    fn new() -> Self {
        Self(Mutex::new(HashMap::new()))
    }

    fn set(&self, hash: TxHash, responses: Vec<T>) {
        self.0.lock().unwrap().insert(hash, responses.into());
    }

    fn next(&self, hash: &TxHash) -> Option<T> {
        let mut scripts = self.0.lock().unwrap();
        let queue = scripts.get_mut(hash)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

/// Programmable L1/L2 receipt source.
///
/// Unscripted L1 waits time out; unscripted L2 lookups report "not mined".
pub struct MockChain {
    l1: Script<FetchResult<Receipt>>,
    l2: Script<FetchResult<Option<Receipt>>>,
    pub l1_waits: AtomicUsize,
    pub l2_lookups: AtomicUsize,
}

impl MockChain {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            l1: Script::new(),
            l2: Script::new(),
            l1_waits: AtomicUsize::new(0),
            l2_lookups: AtomicUsize::new(0),
        })
    }

    pub fn script_l1(&self, hash: TxHash, responses: Vec<FetchResult<Receipt>>) {
        self.l1.set(hash, responses);
    }

    pub fn script_l2(&self, hash: TxHash, responses: Vec<FetchResult<Option<Receipt>>>) {
        self.l2.set(hash, responses);
    }

    pub fn l1_waits(&self) -> usize {
        self.l1_waits.load(Ordering::SeqCst)
    }

    pub fn l2_lookups(&self) -> usize {
        self.l2_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReceiptProvider for MockChain {
    async fn get_transaction_receipt(&self, hash: TxHash, layer: Layer) -> FetchResult<Option<Receipt>> {
        assert_eq!(layer, Layer::L2, "L1 receipts are only awaited");
        self.l2_lookups.fetch_add(1, Ordering::SeqCst);
        self.l2.next(&hash).unwrap_or(Ok(None))
    }

    async fn wait_for_transaction_receipt(
        &self,
        hash: TxHash,
        layer: Layer,
        wait: Option<Duration>,
    ) -> FetchResult<Receipt> {
        assert_eq!(layer, Layer::L1, "L2 receipts are only looked up");
        self.l1_waits.fetch_add(1, Ordering::SeqCst);
        match self.l1.next(&hash) {
            Some(response) => response,
            None => Err(FetchError::Timeout(wait.map_or(120, |w| w.as_secs()))),
        }
    }
}

/// Programmable withdrawal phase source.
pub struct MockFinalization {
    phases: Script<FetchResult<WithdrawalPhase>>,
    pub calls: AtomicUsize,
}

impl MockFinalization {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            phases: Script::new(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn script(&self, l2_hash: TxHash, phases: Vec<FetchResult<WithdrawalPhase>>) {
        self.phases.set(l2_hash, phases);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FinalizationStatusSource for MockFinalization {
    async fn withdrawal_status(&self, l2_hash: TxHash) -> FetchResult<WithdrawalStatus> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let phase = self
            .phases
            .next(&l2_hash)
            .unwrap_or_else(|| Ok(WithdrawalPhase::Other("PROCESSING".to_string())))?;
        Ok(WithdrawalStatus { l2_tx_hash: l2_hash, phase })
    }
}

pub fn hash(byte: u8) -> TxHash {
    B256::repeat_byte(byte)
}

pub fn receipt(hash: TxHash, status: ReceiptStatus, logs: Vec<LogEntry>) -> Receipt {
    Receipt {
        transaction_hash: hash,
        block_number: Some(19_000_000),
        status,
        logs,
    }
}

/// Successful L1 deposit receipt announcing `l2_hash`.
pub fn deposit_receipt(l1_hash: TxHash, l2_hash: TxHash) -> Receipt {
    receipt(l1_hash, ReceiptStatus::Success, vec![priority_request_log(l2_hash)])
}

pub fn priority_request_log(l2_hash: TxHash) -> LogEntry {
    let event = NewPriorityRequest {
        txId: U256::from(42),
        txHash: l2_hash,
        expirationTimestamp: 1_750_000_000,
        transaction: L2CanonicalTransaction {
            txType: U256::from(255),
            from: U256::from(0x0a),
            to: U256::from(0x0b),
            gasLimit: U256::from(500_000),
            gasPerPubdataByteLimit: U256::from(800),
            maxFeePerGas: U256::from(250_000_000u64),
            maxPriorityFeePerGas: U256::ZERO,
            paymaster: U256::ZERO,
            nonce: U256::from(42),
            value: U256::from(1_000_000_000_000_000u64),
            reserved: [U256::ZERO; 4],
            data: Bytes::new(),
            signature: Bytes::new(),
            factoryDeps: Vec::new(),
            paymasterInput: Bytes::new(),
            reservedDynamic: Bytes::new(),
        },
        factoryDeps: Vec::new(),
    };
    let data = event.encode_log_data();
    LogEntry {
        address: Address::repeat_byte(0x32),
        topics: data.topics().to_vec(),
        data: data.data,
    }
}

pub fn eth(amount: u64) -> TokenAmount {
    TokenAmount {
        address: Address::ZERO,
        symbol: "ETH".to_string(),
        decimals: 18,
        amount: U256::from(amount),
    }
}

pub fn party(byte: u8, destination: Layer) -> Party {
    Party {
        address: Address::repeat_byte(byte),
        destination,
    }
}

pub fn tracker(
    chain: Arc<MockChain>,
    finalization: Arc<MockFinalization>,
    storage: Arc<dyn TransactionStorage>,
) -> BridgeTracker {
    BridgeTracker::new(TrackerConfig::default(), storage, chain, finalization)
}
