use async_trait::async_trait;

use crate::error::Result;
use crate::models::ShellTarget;

/// Captured result of a finished remote command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    /// Standard output followed by standard error
    pub fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }

    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Human readable exit status
    pub fn status(&self) -> String {
        match self.exit_code {
            Some(code) => format!("exit code {}", code),
            None => "signal".to_string(),
        }
    }
}

/// Runs the balance command for a node and captures its output.
///
/// Timeouts are enforced by the caller.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, target: &ShellTarget) -> Result<CommandOutput>;
}
