//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters and gauges via the `metrics` facade)
//!
//! Consumers:
//!     → Log aggregation (stdout of the embedding process)
//!     → Whatever metrics recorder the embedding process installs
//! ```
//!
//! # Design Decisions
//! - Structured fields (tx_hash, kind, network) on every tracker event
//! - The library never installs a metrics exporter itself
//! - Metrics are cheap no-ops when no recorder is installed

pub mod logging;
pub mod metrics;
