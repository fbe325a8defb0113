use std::collections::BTreeMap;

/// Metric label for the native ETH balance
pub const ETH: &str = "eth";

/// Metric label for the sITX token balance
pub const SITX: &str = "sitx";

/// Outcome of querying one target during one refresh cycle
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceResult {
    pub target_name: String,
    pub values: BTreeMap<String, f64>,
    pub success: bool,
    pub error: Option<String>,
}

impl BalanceResult {
    /// Create a successful result. Expected metrics missing from `values` are
    /// filled with zero.
    pub fn succeeded(
        target_name: impl Into<String>,
        metrics: &[&str],
        values: BTreeMap<String, f64>,
    ) -> Self {
        let mut values = values;
        for metric in metrics {
            values.entry((*metric).to_string()).or_insert(0.0);
        }

        Self {
            target_name: target_name.into(),
            values,
            success: true,
            error: None,
        }
    }

    /// Create a failed result with every expected metric at zero
    pub fn failed(target_name: impl Into<String>, metrics: &[&str], error: impl ToString) -> Self {
        Self {
            target_name: target_name.into(),
            values: metrics.iter().map(|m| ((*m).to_string(), 0.0)).collect(),
            success: false,
            error: Some(error.to_string()),
        }
    }

    /// Value for a metric, zero when absent
    pub fn value(&self, metric: &str) -> f64 {
        self.values.get(metric).copied().unwrap_or(0.0)
    }
}
