//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Storage → RPC clients → Engine → Scheduler → BridgeTracker
//!
//! Shutdown (shutdown.rs):
//!     trigger() → every spawned tracker's select! resolves → tasks end
//! ```
//!
//! # Design Decisions
//! - Trackers persist after every change, so stopping mid-flight loses nothing
//! - Pending transactions are resumed explicitly, not on construction

pub mod shutdown;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{BridgeTracker, StartupError};
