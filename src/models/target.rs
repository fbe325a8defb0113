use std::fmt;

/// Connection parameters for a node queried over ssh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellTarget {
    /// `user@host` passed straight to ssh
    pub ssh_target: String,
    /// Directory holding the CLI checkout and its `.env`
    pub cli_dir: String,
    /// Remote path of the file containing the spend key
    pub spend_key_file: String,
}

/// Connection parameters for a wallet queried over JSON-RPC
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcTarget {
    pub address: String,
}

/// Kind-specific parameters of a target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetKind {
    Shell(ShellTarget),
    Rpc(RpcTarget),
}

impl TargetKind {
    /// Short tag used in logs and errors
    pub fn tag(&self) -> &'static str {
        match self {
            TargetKind::Shell(_) => "shell",
            TargetKind::Rpc(_) => "rpc",
        }
    }
}

/// One monitored entity, fixed for the lifetime of the process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub name: String,
    pub kind: TargetKind,
}

impl Target {
    /// Create a node target reached over ssh
    pub fn shell(
        name: impl Into<String>,
        ssh_target: impl Into<String>,
        cli_dir: impl Into<String>,
        spend_key_file: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: TargetKind::Shell(ShellTarget {
                ssh_target: ssh_target.into(),
                cli_dir: cli_dir.into(),
                spend_key_file: spend_key_file.into(),
            }),
        }
    }

    /// Create a wallet target; the address doubles as the display name
    pub fn rpc(address: impl Into<String>) -> Self {
        let address = address.into();
        Self {
            name: address.clone(),
            kind: TargetKind::Rpc(RpcTarget { address }),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.kind.tag())
    }
}
