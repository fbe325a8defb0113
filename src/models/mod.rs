//! Data models for the exporter

pub mod balance;
pub mod snapshot;
pub mod target;

// Re-export for convenience
pub use balance::BalanceResult;
pub use snapshot::Snapshot;
pub use target::{RpcTarget, ShellTarget, Target, TargetKind};
