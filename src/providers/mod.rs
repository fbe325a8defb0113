//! Source adapters and the collaborators they drive

pub mod dispatch;
pub mod json_rpc;
pub mod rpc_adapter;
pub mod shell_adapter;
pub mod ssh_runner;

// Re-export for convenience
pub use dispatch::DispatchAdapter;
pub use json_rpc::HttpRpcTransport;
pub use rpc_adapter::RpcAdapter;
pub use shell_adapter::ShellAdapter;
pub use ssh_runner::SshCommandRunner;
