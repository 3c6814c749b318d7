//! Bridge transaction status tracker.
//!
//! Follows deposits (L1 → L2), withdrawals (L2 → L1) and L2 transfers from
//! submission to a terminal state, persisting every status change per network.
//!
//! # Architecture Overview
//!
//! ```text
//!     register()            ┌──────────────┐   save    ┌──────────────┐
//!   ───────────────────────▶│  lifecycle   │──────────▶│    ledger    │
//!                           │BridgeTracker │           │ (per network)│
//!                           └──────┬───────┘           └──────▲───────┘
//!                                  │ wait / spawn             │ changes
//!                                  ▼                          │
//!                           ┌──────────────┐  advance  ┌──────┴───────┐
//!                           │  scheduler   │──────────▶│    engine    │
//!                           └──────────────┘           └──────┬───────┘
//!                                                             │
//!                                  ┌──────────────────────────┼─────────┐
//!                                  ▼                          ▼         ▼
//!                           ┌──────────────┐          ┌────────────┐ ┌─────────┐
//!                           │  classifier  │          │ blockchain │ │finaliz- │
//!                           │   (pure)     │          │ L1/L2 RPC  │ │ ation   │
//!                           └──────────────┘          └────────────┘ └─────────┘
//!
//!   Cross-cutting: config (TOML + hot reload), observability (tracing,
//!   metrics), resilience (backoff / retry)
//! ```

// Core subsystems
pub mod blockchain;
pub mod ledger;
pub mod tracking;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::TrackerConfig;
pub use ledger::TransactionLedger;
pub use lifecycle::{BridgeTracker, Shutdown, StartupError};
pub use tracking::{
    CompletionScheduler, ReconciliationEngine, StatusInfo, TrackError, TransactionInfo,
    TransactionKind,
};
