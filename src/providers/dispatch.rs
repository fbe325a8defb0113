use std::sync::Arc;

use async_trait::async_trait;
use tracing::error;

use crate::error::ExporterError;
use crate::models::{BalanceResult, Target, TargetKind};
use crate::traits::SourceAdapter;

/// Routes each target to the adapter for its kind
pub struct DispatchAdapter {
    shell: Option<Arc<dyn SourceAdapter>>,
    rpc: Option<Arc<dyn SourceAdapter>>,
    metrics: Vec<&'static str>,
}

impl DispatchAdapter {
    /// Create a dispatcher with no adapters
    pub fn new() -> Self {
        Self {
            shell: None,
            rpc: None,
            metrics: Vec::new(),
        }
    }

    /// Handle shell targets with `adapter`
    pub fn with_shell(mut self, adapter: Arc<dyn SourceAdapter>) -> Self {
        self.merge_metrics(adapter.metrics());
        self.shell = Some(adapter);
        self
    }

    /// Handle RPC targets with `adapter`
    pub fn with_rpc(mut self, adapter: Arc<dyn SourceAdapter>) -> Self {
        self.merge_metrics(adapter.metrics());
        self.rpc = Some(adapter);
        self
    }

    fn merge_metrics(&mut self, metrics: &[&'static str]) {
        for metric in metrics {
            if !self.metrics.contains(metric) {
                self.metrics.push(*metric);
            }
        }
    }
}

impl Default for DispatchAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceAdapter for DispatchAdapter {
    async fn query(&self, target: &Target) -> BalanceResult {
        let adapter = match target.kind {
            TargetKind::Shell(_) => self.shell.as_ref(),
            TargetKind::Rpc(_) => self.rpc.as_ref(),
        };

        match adapter {
            Some(adapter) => adapter.query(target).await,
            None => {
                let err = ExporterError::UnsupportedTarget {
                    target: target.name.clone(),
                    kind: target.kind.tag(),
                };
                error!("{}", err);
                BalanceResult::failed(&target.name, &self.metrics, err)
            }
        }
    }

    fn metrics(&self) -> &[&'static str] {
        &self.metrics
    }
}
