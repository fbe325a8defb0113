//! Environment-driven configuration.
//!
//! Everything is read once at startup. Values come from the process
//! environment, optionally seeded from a `.env` file by the binary.

use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::error::{ExporterError, Result};
use crate::models::Target;
use crate::providers::json_rpc::DEFAULT_RPC_TIMEOUT;
use crate::providers::rpc_adapter::DEFAULT_SITX_CONTRACT;
use crate::providers::shell_adapter::DEFAULT_COMMAND_TIMEOUT;
use crate::providers::ssh_runner::DEFAULT_CONNECT_TIMEOUT;
use crate::tracker::ExpositionLayout;

pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(3600);
pub const DEFAULT_SSH_KEY_PATH: &str = "/root/.ssh/id_ed25519";
pub const DEFAULT_RPC_URL: &str = "https://rpc.scroll.io";

/// Which of the two exporters this process runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Builder node rewards, read over ssh
    Reward,
    /// Wallet balances, read over JSON-RPC
    Wallet,
}

impl Profile {
    pub fn default_port(&self) -> u16 {
        match self {
            Profile::Reward => 9102,
            Profile::Wallet => 9101,
        }
    }

    pub fn layout(&self) -> ExpositionLayout {
        match self {
            Profile::Reward => ExpositionLayout::reward(),
            Profile::Wallet => ExpositionLayout::wallet(),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Profile::Reward => "INTMAX Reward Balance Exporter",
            Profile::Wallet => "INTMAX Wallet Balance Exporter",
        }
    }
}

impl FromStr for Profile {
    type Err = ExporterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reward" | "rewards" => Ok(Profile::Reward),
            "wallet" | "wallets" => Ok(Profile::Wallet),
            other => Err(ExporterError::UnknownProfile(other.to_string())),
        }
    }
}

/// Settings for ssh-queried nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellSettings {
    pub ssh_key_path: Option<PathBuf>,
    pub connect_timeout: Duration,
    pub command_timeout: Duration,
    pub remote_binary: Option<String>,
}

/// Settings for RPC-queried wallets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcSettings {
    pub url: String,
    pub token_contract: String,
    pub call_timeout: Duration,
}

/// Full exporter configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExporterConfig {
    pub profile: Profile,
    pub listen_addr: SocketAddr,
    pub update_interval: Duration,
    pub concurrency: usize,
    pub targets: Vec<Target>,
    pub shell: ShellSettings,
    pub rpc: RpcSettings,
}

impl ExporterConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let profile = match get("EXPORTER_PROFILE") {
            Some(value) => value.parse()?,
            None => Profile::Reward,
        };

        let port: u16 = parse_or(&get, "PORT", profile.default_port())?;
        let ip: IpAddr = parse_or(&get, "LISTEN_ADDR", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?;

        let targets = match profile {
            Profile::Reward => parse_node_targets(&get("NODES_CONFIG").unwrap_or_default()),
            Profile::Wallet => parse_wallet_targets(&get("WALLET_ADDRESSES").unwrap_or_default()),
        };

        let shell = ShellSettings {
            ssh_key_path: Some(PathBuf::from(
                get("SSH_KEY_PATH").unwrap_or_else(|| DEFAULT_SSH_KEY_PATH.to_string()),
            )),
            connect_timeout: seconds_or(&get, "SSH_CONNECT_TIMEOUT", DEFAULT_CONNECT_TIMEOUT)?,
            command_timeout: seconds_or(&get, "COMMAND_TIMEOUT", DEFAULT_COMMAND_TIMEOUT)?,
            remote_binary: get("REMOTE_BINARY"),
        };

        let rpc = RpcSettings {
            url: get("SCROLL_RPC_URL").unwrap_or_else(|| DEFAULT_RPC_URL.to_string()),
            token_contract: get("SITX_CONTRACT")
                .unwrap_or_else(|| DEFAULT_SITX_CONTRACT.to_string()),
            call_timeout: seconds_or(&get, "RPC_TIMEOUT", DEFAULT_RPC_TIMEOUT)?,
        };

        Ok(Self {
            profile,
            listen_addr: SocketAddr::new(ip, port),
            update_interval: seconds_or(&get, "UPDATE_INTERVAL", DEFAULT_UPDATE_INTERVAL)?,
            concurrency: parse_or(&get, "REFRESH_CONCURRENCY", 1usize)?.max(1),
            targets,
            shell,
            rpc,
        })
    }

    /// Display names of the configured targets
    pub fn target_names(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.name.as_str()).collect()
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ExporterError::InvalidConfig {
            key: key.to_string(),
            value,
            reason: e.to_string(),
        }),
    }
}

fn seconds_or<G>(get: &G, key: &str, default: Duration) -> Result<Duration>
where
    G: Fn(&str) -> Option<String>,
{
    parse_or(get, key, default.as_secs()).map(Duration::from_secs)
}

/// Parse `name:user@host:cli_dir:spend_key_file` entries separated by commas.
///
/// The key file path keeps any further `:` characters. Malformed entries and
/// duplicate names are skipped with a warning.
pub fn parse_node_targets(raw: &str) -> Vec<Target> {
    let mut seen = HashSet::new();
    let mut targets = Vec::new();

    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let parts: Vec<&str> = entry.splitn(4, ':').collect();
        if parts.len() < 4 || parts[..3].iter().any(|p| p.trim().is_empty()) {
            warn!("Skipping malformed node entry: {}", entry);
            continue;
        }

        let name = parts[0].trim();
        if !seen.insert(name.to_string()) {
            warn!("Skipping duplicate node name: {}", name);
            continue;
        }

        targets.push(Target::shell(name, parts[1].trim(), parts[2].trim(), parts[3].trim()));
    }

    targets
}

/// Parse comma-separated wallet addresses
pub fn parse_wallet_targets(raw: &str) -> Vec<Target> {
    let mut seen = HashSet::new();
    raw.split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .filter(|a| {
            let fresh = seen.insert(a.to_string());
            if !fresh {
                warn!("Skipping duplicate wallet address: {}", a);
            }
            fresh
        })
        .map(Target::rpc)
        .collect()
}
