//! Error types for the exporter.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for library functions
pub type Result<T> = std::result::Result<T, ExporterError>;

/// Main error type for the exporter.
#[derive(Error, Debug)]
pub enum ExporterError {
    // Configuration errors
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidConfig { key: String, value: String, reason: String },

    #[error("Unknown exporter profile: {0}")]
    UnknownProfile(String),

    // Remote command errors
    #[error("Failed to spawn remote command for {target}: {source}")]
    CommandSpawn {
        target: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Remote command for {target} timed out after {timeout:?}")]
    CommandTimeout { target: String, timeout: Duration },

    #[error("Remote command for {target} exited with {status} and produced no balances")]
    CommandFailed { target: String, status: String },

    // RPC errors
    #[error("RPC call {method} failed: {reason}")]
    Rpc { method: String, reason: String },

    #[error("RPC call {method} returned no result")]
    RpcMissingResult { method: String },

    #[error("Invalid hex quantity {value:?}: {reason}")]
    InvalidHex { value: String, reason: String },

    // Adapter routing
    #[error("No adapter configured for {kind} target {target}")]
    UnsupportedTarget { target: String, kind: &'static str },

    // Rendering
    #[error("Failed to render exposition document: {0}")]
    Render(#[from] std::fmt::Error),

    #[error("Refresh task aborted: {0}")]
    RefreshAborted(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
