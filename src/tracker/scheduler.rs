use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::error::{ExporterError, Result};
use crate::models::Target;
use crate::tracker::aggregator::Aggregator;
use crate::tracker::cache::SnapshotCache;

/// Whether a refresh pass is currently in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Refreshing,
}

impl SchedulerState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => SchedulerState::Refreshing,
            _ => SchedulerState::Idle,
        }
    }
}

/// Drives the aggregator on a fixed interval and publishes every completed
/// pass to the cache.
pub struct RefreshScheduler {
    aggregator: Arc<Aggregator>,
    targets: Arc<Vec<Target>>,
    cache: SnapshotCache,
    interval: Duration,
    state: AtomicU8,
    completed: AtomicU64,
}

impl RefreshScheduler {
    /// Create a new scheduler
    pub fn new(
        aggregator: Arc<Aggregator>,
        targets: Vec<Target>,
        cache: SnapshotCache,
        interval: Duration,
    ) -> Self {
        Self {
            aggregator,
            targets: Arc::new(targets),
            cache,
            interval,
            state: AtomicU8::new(SchedulerState::Idle as u8),
            completed: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> SchedulerState {
        SchedulerState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Number of passes published so far
    pub fn completed_cycles(&self) -> u64 {
        self.completed.load(Ordering::SeqCst)
    }

    /// Run one pass and publish it.
    ///
    /// The pass runs on its own task so a panic inside an adapter is contained
    /// like any other cycle failure: logged, and the previous snapshot stays
    /// live.
    pub async fn refresh_once(&self) -> Result<()> {
        self.state.store(SchedulerState::Refreshing as u8, Ordering::SeqCst);

        let aggregator = self.aggregator.clone();
        let targets = self.targets.clone();
        let outcome = tokio::spawn(async move { aggregator.run(&targets).await })
            .await
            .unwrap_or_else(|e| Err(ExporterError::RefreshAborted(e.to_string())));

        self.state.store(SchedulerState::Idle as u8, Ordering::SeqCst);

        match outcome {
            Ok(snapshot) => {
                self.cache.store(snapshot);
                self.completed.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            Err(e) => {
                error!("Failed to update metrics: {}", e);
                Err(e)
            }
        }
    }

    /// Run the first pass before anything is served
    pub async fn prime(&self) {
        info!("Generating initial metrics for {} targets", self.targets.len());
        // Failures are already logged; the sentinel stays in place
        let _ = self.refresh_once().await;
    }

    /// Sleep for the interval after each pass, forever
    pub async fn run(&self) {
        loop {
            info!("Sleeping for {}s...", self.interval.as_secs());
            tokio::time::sleep(self.interval).await;
            let _ = self.refresh_once().await;
        }
    }

    /// Run the loop on a background task
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }
}
