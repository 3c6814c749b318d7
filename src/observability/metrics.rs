//! Metrics collection.
//!
//! # Metrics
//! - `bridge_status_rounds_total` (counter): advancement rounds by kind, outcome
//! - `bridge_status_terminal_total` (counter): terminal transitions by kind, result
//! - `bridge_status_fetch_retries_total` (counter): backoff retries by layer
//! - `bridge_status_ledger_transactions` (gauge): records per network scope
//! - `bridge_status_active_trackers` (gauge): running completion loops

use metrics::{counter, gauge};

use crate::blockchain::types::Layer;
use crate::tracking::types::TransactionKind;

/// Record the outcome of one advancement round.
pub fn record_round(kind: TransactionKind, outcome: &'static str) {
    counter!("bridge_status_rounds_total", "kind" => kind.as_str(), "outcome" => outcome)
        .increment(1);
}

/// Record a transaction reaching a terminal state.
pub fn record_terminal(kind: TransactionKind, failed: bool) {
    let result = if failed { "failed" } else { "succeeded" };
    counter!("bridge_status_terminal_total", "kind" => kind.as_str(), "result" => result)
        .increment(1);
}

/// Record a retried receipt fetch.
pub fn record_fetch_retry(layer: Layer) {
    counter!("bridge_status_fetch_retries_total", "layer" => layer.as_str()).increment(1);
}

/// Record the size of a ledger scope after a write.
pub fn record_ledger_size(network: &str, len: usize) {
    gauge!("bridge_status_ledger_transactions", "network" => network.to_string()).set(len as f64);
}

/// Track running completion loops.
pub fn record_tracker_started() {
    gauge!("bridge_status_active_trackers").increment(1.0);
}

pub fn record_tracker_stopped() {
    gauge!("bridge_status_active_trackers").decrement(1.0);
}
