//! Refresh-and-serve engine: aggregation, scheduling and the snapshot cache

pub mod aggregator;
pub mod cache;
pub mod exposition;
pub mod scheduler;

// Re-export for convenience
pub use aggregator::Aggregator;
pub use cache::SnapshotCache;
pub use exposition::{ExpositionLayout, MetricSpec};
pub use scheduler::{RefreshScheduler, SchedulerState};
