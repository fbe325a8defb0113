use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::error::Result;
use crate::models::{BalanceResult, Snapshot, Target};
use crate::traits::SourceAdapter;
use crate::tracker::exposition::ExpositionLayout;

/// Runs one full pass over all targets and renders the result
pub struct Aggregator {
    adapter: Arc<dyn SourceAdapter>,
    layout: ExpositionLayout,
    concurrency: usize,
    last_check: AtomicI64,
}

impl Aggregator {
    /// Create a new aggregator that queries targets one at a time
    pub fn new(adapter: Arc<dyn SourceAdapter>, layout: ExpositionLayout) -> Self {
        Self {
            adapter,
            layout,
            concurrency: 1,
            last_check: AtomicI64::new(0),
        }
    }

    /// Query up to `concurrency` targets at once. Result order still follows
    /// target order.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Query every target, one result per target in input order
    pub async fn collect(&self, targets: &[Target]) -> Vec<BalanceResult> {
        let queries: Vec<_> = targets.iter().map(|target| self.query_one(target)).collect();
        stream::iter(queries)
            .buffered(self.concurrency)
            .collect()
            .await
    }

    async fn query_one(&self, target: &Target) -> BalanceResult {
        info!("Checking {}", target);
        let result = self.adapter.query(target).await;
        if let Some(err) = &result.error {
            warn!("Check failed for {}: {}", target.name, err);
        }
        result
    }

    /// Run a full pass and render it into a snapshot
    pub async fn run(&self, targets: &[Target]) -> Result<Snapshot> {
        let started = Instant::now();

        if targets.is_empty() {
            warn!("No targets configured");
        }

        let results = self.collect(targets).await;
        let generated_at = self.next_timestamp();
        let rendered = self.layout.render(&results, generated_at.timestamp())?;

        for (spec, total) in self.layout.metrics.iter().zip(self.layout.totals(&results)) {
            info!("Total {}: {:.6}", spec.metric, total);
        }
        let failed = results.iter().filter(|r| !r.success).count();
        info!(
            "Refreshed {} targets ({} failed) in {:?}",
            results.len(),
            failed,
            started.elapsed()
        );

        Ok(Snapshot::new(rendered, generated_at))
    }

    /// Current time, clamped so it never goes below the previous pass
    fn next_timestamp(&self) -> DateTime<Utc> {
        let now = Utc::now();
        let previous = self.last_check.fetch_max(now.timestamp(), Ordering::SeqCst);
        if now.timestamp() >= previous {
            now
        } else {
            DateTime::from_timestamp(previous, 0).unwrap_or(now)
        }
    }
}
