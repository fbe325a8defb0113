use async_trait::async_trait;

use crate::models::{BalanceResult, Target};

/// Core trait for querying the balances of one target.
///
/// Implementations never return an error: every failure is folded into a
/// `BalanceResult` with `success == false` and zeroed values.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Query a single target
    async fn query(&self, target: &Target) -> BalanceResult;

    /// Metric labels every result from this adapter carries
    fn metrics(&self) -> &[&'static str];
}
