//! Text exposition rendering.
//!
//! Rendering is a pure function of the collected results, the layout and the
//! timestamp, so two renders of the same results differ only in the
//! `last_check` line.

use std::fmt::Write;

use crate::error::Result;
use crate::models::balance::{ETH, SITX};
use crate::models::BalanceResult;
use crate::utils::escape_label_value;

/// One per-target gauge and its running total
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSpec {
    /// Label of the value inside a `BalanceResult`
    pub metric: &'static str,
    pub name: String,
    pub help: String,
    pub total_name: String,
    pub total_help: String,
}

/// Metric names and help texts of one exporter profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpositionLayout {
    /// Label key carrying the target name, e.g. `node`
    pub target_label: &'static str,
    pub metrics: Vec<MetricSpec>,
    pub success_name: String,
    pub success_help: String,
    pub last_check_name: String,
    pub last_check_help: String,
}

impl ExpositionLayout {
    /// Layout for builder node reward balances read over ssh
    pub fn reward() -> Self {
        let prefix = "intmax_builder_reward";
        Self {
            target_label: "node",
            metrics: vec![
                MetricSpec {
                    metric: ETH,
                    name: format!("{prefix}_eth"),
                    help: "Pending ETH reward balance on builder node".to_string(),
                    total_name: format!("{prefix}_total_eth"),
                    total_help: "Total pending ETH rewards across all nodes".to_string(),
                },
                MetricSpec {
                    metric: SITX,
                    name: format!("{prefix}_sitx"),
                    help: "Pending sITX reward balance on builder node".to_string(),
                    total_name: format!("{prefix}_total_sitx"),
                    total_help: "Total pending sITX rewards across all nodes".to_string(),
                },
            ],
            success_name: format!("{prefix}_check_success"),
            success_help: "Whether the last balance check succeeded".to_string(),
            last_check_name: format!("{prefix}_last_check"),
            last_check_help: "Timestamp of last reward check".to_string(),
        }
    }

    /// Layout for wallet balances read over JSON-RPC
    pub fn wallet() -> Self {
        let prefix = "intmax_wallet";
        Self {
            target_label: "address",
            metrics: vec![
                MetricSpec {
                    metric: SITX,
                    name: format!("{prefix}_sitx"),
                    help: "Wallet sITX token balance on Scroll".to_string(),
                    total_name: format!("{prefix}_sitx_total"),
                    total_help: "Total sITX balance across all wallets".to_string(),
                },
                MetricSpec {
                    metric: ETH,
                    name: format!("{prefix}_eth"),
                    help: "Wallet ETH balance on Scroll (for gas)".to_string(),
                    total_name: format!("{prefix}_eth_total"),
                    total_help: "Total ETH balance across all wallets".to_string(),
                },
            ],
            success_name: format!("{prefix}_check_success"),
            success_help: "Whether the last wallet balance check succeeded".to_string(),
            last_check_name: format!("{prefix}_last_check"),
            last_check_help: "Timestamp of last wallet balance check".to_string(),
        }
    }

    /// Sum of every metric across `results`, in layout order. An empty
    /// result set sums to positive zero.
    pub fn totals(&self, results: &[BalanceResult]) -> Vec<f64> {
        self.metrics
            .iter()
            .map(|spec| results.iter().fold(0.0, |acc, r| acc + r.value(spec.metric)))
            .collect()
    }

    /// Render the full exposition document. Every family is written as one
    /// contiguous group: its preamble, then its samples.
    pub fn render(&self, results: &[BalanceResult], last_check: i64) -> Result<String> {
        let mut out = String::new();

        if results.is_empty() {
            writeln!(out, "# No targets configured")?;
        }

        for spec in &self.metrics {
            write_preamble(&mut out, &spec.name, &spec.help)?;
            for result in results {
                self.write_sample(&mut out, &spec.name, result, result.value(spec.metric))?;
            }
        }

        write_preamble(&mut out, &self.success_name, &self.success_help)?;
        for result in results {
            self.write_sample(&mut out, &self.success_name, result, u8::from(result.success))?;
        }

        for (spec, total) in self.metrics.iter().zip(self.totals(results)) {
            write_preamble(&mut out, &spec.total_name, &spec.total_help)?;
            writeln!(out, "{} {}", spec.total_name, total)?;
        }

        write_preamble(&mut out, &self.last_check_name, &self.last_check_help)?;
        writeln!(out, "{} {}", self.last_check_name, last_check)?;

        Ok(out)
    }

    fn write_sample(
        &self,
        out: &mut String,
        name: &str,
        result: &BalanceResult,
        value: impl std::fmt::Display,
    ) -> std::fmt::Result {
        writeln!(
            out,
            "{}{{{}=\"{}\"}} {}",
            name,
            self.target_label,
            escape_label_value(&result.target_name),
            value
        )
    }
}

fn write_preamble(out: &mut String, name: &str, help: &str) -> std::fmt::Result {
    writeln!(out, "# HELP {} {}", name, help)?;
    writeln!(out, "# TYPE {} gauge", name)
}
