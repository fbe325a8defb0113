//! Core traits for the exporter

pub mod command_runner;
pub mod rpc_transport;
pub mod source_adapter;

// Re-export for convenience
pub use command_runner::{CommandOutput, CommandRunner};
pub use rpc_transport::RpcTransport;
pub use source_adapter::SourceAdapter;
