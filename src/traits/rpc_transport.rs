use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Transport for JSON-RPC 2.0 calls against a single endpoint
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Send one call and return the decoded response envelope
    async fn call(&self, method: &str, params: Value) -> Result<Value>;
}
