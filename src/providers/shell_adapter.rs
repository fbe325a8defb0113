use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::error::ExporterError;
use crate::models::balance::{ETH, SITX};
use crate::models::{BalanceResult, Target, TargetKind};
use crate::traits::{CommandRunner, SourceAdapter};
use crate::utils::{base_units_to_amount, truncate_string};

/// Default bound on a whole remote command, connection included.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(120);

const SHELL_METRICS: &[&str] = &[ETH, SITX];

/// How a captured number is turned into an amount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// Already a decimal amount
    Decimal,
    /// Integer base units, scaled by 10^18
    BaseUnits,
}

/// One probe over the raw command output
#[derive(Debug)]
pub struct ExtractionRule {
    pub metric: &'static str,
    pub pattern: Regex,
    /// Token that must appear somewhere in the output for the rule to apply
    pub requires: Option<&'static str>,
    pub extraction: Extraction,
}

impl ExtractionRule {
    fn new(
        metric: &'static str,
        pattern: &str,
        requires: Option<&'static str>,
        extraction: Extraction,
    ) -> Self {
        Self {
            metric,
            pattern: Regex::new(pattern).expect("Invalid extraction pattern"),
            requires,
            extraction,
        }
    }

    /// Amount captured by this rule, if it applies to `text`
    pub fn apply(&self, text: &str) -> Option<f64> {
        if let Some(token) = self.requires {
            if !text.contains(token) {
                return None;
            }
        }

        let raw = self.pattern.captures(text)?.get(1)?.as_str();
        match self.extraction {
            Extraction::Decimal => match raw.parse::<f64>() {
                Ok(amount) => Some(amount),
                Err(e) => {
                    warn!("Unparsable {} amount {:?}: {}", self.metric, raw, e);
                    None
                }
            },
            Extraction::BaseUnits => match raw.parse::<u128>() {
                Ok(units) => Some(base_units_to_amount(units)),
                Err(e) => {
                    warn!("Unparsable {} base units {:?}: {}", self.metric, raw, e);
                    None
                }
            },
        }
    }
}

/// Probes for the balance CLI output, in evaluation order. A later rule
/// overrides an earlier one for the same metric, so the NATIVE base-unit
/// amount wins over a plain `ETH:` line.
pub static BALANCE_RULES: Lazy<Vec<ExtractionRule>> = Lazy::new(|| {
    vec![
        ExtractionRule::new(ETH, r"ETH:\s*([0-9]+\.?[0-9]*)", None, Extraction::Decimal),
        ExtractionRule::new(ETH, r"Amount:\s*([0-9]+)", Some("NATIVE"), Extraction::BaseUnits),
        ExtractionRule::new(SITX, r"[sS]ITX:\s*([0-9]+\.?[0-9]*)", None, Extraction::Decimal),
    ]
});

/// Run every rule over `text` and collect the metrics that matched
pub fn extract_balances(text: &str, rules: &[ExtractionRule]) -> BTreeMap<String, f64> {
    let mut values = BTreeMap::new();
    for rule in rules {
        if let Some(amount) = rule.apply(text) {
            values.insert(rule.metric.to_string(), amount);
        }
    }
    values
}

/// Source adapter that reads balances from the free-text output of a remote
/// command.
pub struct ShellAdapter {
    runner: Arc<dyn CommandRunner>,
    command_timeout: Duration,
}

impl ShellAdapter {
    /// Create a new shell adapter
    pub fn new(runner: Arc<dyn CommandRunner>, command_timeout: Duration) -> Self {
        Self {
            runner,
            command_timeout,
        }
    }
}

#[async_trait]
impl SourceAdapter for ShellAdapter {
    async fn query(&self, target: &Target) -> BalanceResult {
        let shell = match &target.kind {
            TargetKind::Shell(shell) => shell,
            other => {
                let err = ExporterError::UnsupportedTarget {
                    target: target.name.clone(),
                    kind: other.tag(),
                };
                error!("{}", err);
                return BalanceResult::failed(&target.name, SHELL_METRICS, err);
            }
        };

        info!("Connecting to {}...", shell.ssh_target);

        let output = match timeout(self.command_timeout, self.runner.run(shell)).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                error!("SSH error for {}: {}", shell.ssh_target, e);
                return BalanceResult::failed(&target.name, SHELL_METRICS, e);
            }
            Err(_) => {
                let err = ExporterError::CommandTimeout {
                    target: shell.ssh_target.clone(),
                    timeout: self.command_timeout,
                };
                error!("SSH timeout for {}", shell.ssh_target);
                return BalanceResult::failed(&target.name, SHELL_METRICS, err);
            }
        };

        let text = output.combined();
        debug!("Output: {}", truncate_string(&text, 500));

        let values = extract_balances(&text, &BALANCE_RULES);

        if !output.succeeded() {
            if values.is_empty() {
                let err = ExporterError::CommandFailed {
                    target: shell.ssh_target.clone(),
                    status: output.status(),
                };
                error!("{}", err);
                return BalanceResult::failed(&target.name, SHELL_METRICS, err);
            }
            warn!(
                "Remote command for {} exited with {}, using parsed balances",
                shell.ssh_target,
                output.status()
            );
        }

        let result = BalanceResult::succeeded(&target.name, SHELL_METRICS, values);
        info!("  ETH: {}, sITX: {}", result.value(ETH), result.value(SITX));
        result
    }

    fn metrics(&self) -> &[&'static str] {
        SHELL_METRICS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::models::ShellTarget;
    use crate::traits::CommandOutput;

    struct FakeRunner {
        output: CommandOutput,
        delay: Duration,
    }

    impl FakeRunner {
        fn printing(stdout: &str) -> Self {
            Self {
                output: CommandOutput {
                    stdout: stdout.to_string(),
                    stderr: String::new(),
                    exit_code: Some(0),
                },
                delay: Duration::ZERO,
            }
        }
    }

    #[async_trait]
    impl CommandRunner for FakeRunner {
        async fn run(&self, _target: &ShellTarget) -> Result<CommandOutput> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            Ok(self.output.clone())
        }
    }

    struct BrokenRunner;

    #[async_trait]
    impl CommandRunner for BrokenRunner {
        async fn run(&self, target: &ShellTarget) -> Result<CommandOutput> {
            Err(ExporterError::CommandSpawn {
                target: target.ssh_target.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "ssh not found"),
            })
        }
    }

    fn node() -> Target {
        Target::shell("node-1", "builder@10.0.0.1", "/opt/intmax2/cli", "/opt/keys/spend")
    }

    fn adapter(runner: impl CommandRunner + 'static) -> ShellAdapter {
        ShellAdapter::new(Arc::new(runner), Duration::from_secs(5))
    }

    #[test]
    fn test_decimal_probes() {
        let values = extract_balances("ETH: 1.5 sITX: 2", &BALANCE_RULES);
        assert_eq!(values.get(ETH), Some(&1.5));
        assert_eq!(values.get(SITX), Some(&2.0));
    }

    #[test]
    fn test_native_amount_overrides_eth_line() {
        let text = "ETH: 9.75\nToken 0\n  Type: NATIVE\n  Amount: 5000000000000000000\n";
        let values = extract_balances(text, &BALANCE_RULES);
        assert_eq!(values.get(ETH), Some(&5.0));
    }

    #[test]
    fn test_amount_ignored_without_native_marker() {
        let text = "Type: ERC20\nAmount: 5000000000000000000\nETH: 0.25";
        let values = extract_balances(text, &BALANCE_RULES);
        assert_eq!(values.get(ETH), Some(&0.25));
    }

    #[test]
    fn test_uppercase_sitx_label() {
        let values = extract_balances("SITX: 12.5", &BALANCE_RULES);
        assert_eq!(values.get(SITX), Some(&12.5));
        assert!(values.get(ETH).is_none());
    }

    #[test]
    fn test_first_eth_match_wins() {
        let values = extract_balances("ETH: 1.0\nETH: 2.0", &BALANCE_RULES);
        assert_eq!(values.get(ETH), Some(&1.0));
    }

    #[tokio::test]
    async fn test_query_parses_output() {
        let result = adapter(FakeRunner::printing("ETH: 1.5 sITX: 2")).query(&node()).await;
        assert!(result.success);
        assert_eq!(result.target_name, "node-1");
        assert_eq!(result.value(ETH), 1.5);
        assert_eq!(result.value(SITX), 2.0);
    }

    #[tokio::test]
    async fn test_query_without_tokens_is_zero_success() {
        let result = adapter(FakeRunner::printing("Balance: nothing to see"))
            .query(&node())
            .await;
        assert!(result.success);
        assert!(result.error.is_none());
        assert_eq!(result.value(ETH), 0.0);
        assert_eq!(result.value(SITX), 0.0);
    }

    #[tokio::test]
    async fn test_query_timeout_fails_target() {
        let runner = FakeRunner {
            delay: Duration::from_secs(30),
            ..FakeRunner::printing("ETH: 1.0")
        };
        let adapter = ShellAdapter::new(Arc::new(runner), Duration::from_millis(20));

        let result = adapter.query(&node()).await;
        assert!(!result.success);
        assert!(result.error.as_deref().unwrap().contains("timed out"));
        assert_eq!(result.value(ETH), 0.0);
        assert_eq!(result.value(SITX), 0.0);
    }

    #[tokio::test]
    async fn test_query_spawn_error_fails_target() {
        let result = adapter(BrokenRunner).query(&node()).await;
        assert!(!result.success);
        assert!(result.error.is_some());
    }

    #[tokio::test]
    async fn test_nonzero_exit_with_balances_is_success() {
        let runner = FakeRunner {
            output: CommandOutput {
                stdout: String::new(),
                stderr: "warning: stale cache\nsITX: 3".to_string(),
                exit_code: Some(1),
            },
            delay: Duration::ZERO,
        };

        let result = adapter(runner).query(&node()).await;
        assert!(result.success);
        assert_eq!(result.value(SITX), 3.0);
    }

    #[tokio::test]
    async fn test_nonzero_exit_without_balances_fails() {
        let runner = FakeRunner {
            output: CommandOutput {
                stdout: String::new(),
                stderr: "Permission denied (publickey).".to_string(),
                exit_code: Some(255),
            },
            delay: Duration::ZERO,
        };

        let result = adapter(runner).query(&node()).await;
        assert!(!result.success);
        assert!(result.error.as_deref().unwrap().contains("exit code 255"));
    }

    #[tokio::test]
    async fn test_rpc_target_is_rejected() {
        let result = adapter(FakeRunner::printing("ETH: 1"))
            .query(&Target::rpc("0xabc"))
            .await;
        assert!(!result.success);
        assert_eq!(result.value(ETH), 0.0);
    }
}
