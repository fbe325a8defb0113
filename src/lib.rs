//! Balance Exporter Library
//!
//! Periodically queries builder node rewards (over ssh) or wallet balances
//! (over JSON-RPC) and republishes the latest values as a Prometheus text
//! exposition document.

// Public modules - these are the API surface
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod providers;
pub mod traits;
pub mod tracker;
pub mod utils;

// Re-export commonly used items for easier access
pub use config::{ExporterConfig, Profile};
pub use error::{ExporterError, Result};
pub use models::{BalanceResult, Snapshot, Target, TargetKind};
pub use providers::{
    DispatchAdapter, HttpRpcTransport, RpcAdapter, ShellAdapter, SshCommandRunner,
};
pub use traits::{CommandOutput, CommandRunner, RpcTransport, SourceAdapter};
pub use tracker::{Aggregator, ExpositionLayout, RefreshScheduler, SchedulerState, SnapshotCache};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
