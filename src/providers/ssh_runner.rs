use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{ExporterError, Result};
use crate::models::ShellTarget;
use crate::traits::{CommandOutput, CommandRunner};

/// Default ssh connection establishment timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs the node balance CLI over ssh.
pub struct SshCommandRunner {
    ssh_key_path: Option<PathBuf>,
    connect_timeout: Duration,
    remote_binary: Option<String>,
}

impl SshCommandRunner {
    /// Create a new runner
    pub fn new(ssh_key_path: Option<PathBuf>, connect_timeout: Duration) -> Self {
        Self {
            ssh_key_path,
            connect_timeout,
            remote_binary: None,
        }
    }

    /// Use an explicit remote binary instead of deriving it from the CLI dir
    pub fn with_remote_binary(mut self, remote_binary: Option<String>) -> Self {
        self.remote_binary = remote_binary;
        self
    }

    /// Path of the prebuilt CLI on the node. The checkout keeps the crate in
    /// `<repo>/cli` and the release binary in `<repo>/target/release`.
    pub fn binary_path(&self, target: &ShellTarget) -> String {
        match &self.remote_binary {
            Some(binary) => binary.clone(),
            None => target.cli_dir.replace("/cli", "/target/release/intmax2-cli"),
        }
    }

    /// Shell script executed on the node. It runs from the CLI dir so the
    /// CLI picks up its `.env`.
    pub fn remote_script(&self, target: &ShellTarget) -> String {
        format!(
            "cd {} && SPEND_KEY=$(cat {}) && {} balance --private-key \"$SPEND_KEY\" 2>&1",
            target.cli_dir,
            target.spend_key_file,
            self.binary_path(target)
        )
    }

    /// Build the local ssh invocation
    pub fn build_command(&self, target: &ShellTarget) -> Command {
        let mut cmd = Command::new("ssh");
        cmd.arg("-o")
            .arg(format!("ConnectTimeout={}", self.connect_timeout.as_secs()))
            .arg("-o")
            .arg("StrictHostKeyChecking=accept-new")
            .arg("-o")
            .arg("BatchMode=yes");

        if let Some(key) = self.ssh_key_path.as_ref().filter(|p| p.exists()) {
            cmd.arg("-i").arg(key);
        }

        cmd.arg(&target.ssh_target)
            .arg(self.remote_script(target))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl CommandRunner for SshCommandRunner {
    async fn run(&self, target: &ShellTarget) -> Result<CommandOutput> {
        debug!("Running balance command on {}", target.ssh_target);

        let output = self
            .build_command(target)
            .output()
            .await
            .map_err(|source| ExporterError::CommandSpawn {
                target: target.ssh_target.clone(),
                source,
            })?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        })
    }
}
