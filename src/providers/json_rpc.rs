use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{ExporterError, Result};
use crate::traits::RpcTransport;

/// Default per-call timeout for JSON-RPC requests.
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// JSON-RPC 2.0 request envelope
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub params: Value,
    pub id: u64,
}

impl<'a> JsonRpcRequest<'a> {
    pub fn new(method: &'a str, params: Value, id: u64) -> Self {
        Self {
            jsonrpc: "2.0",
            method,
            params,
            id,
        }
    }
}

/// JSON-RPC over HTTPS POST
pub struct HttpRpcTransport {
    client: Client,
    url: String,
    next_id: AtomicU64,
}

impl HttpRpcTransport {
    /// Create a new transport with a per-call timeout
    pub fn new(url: String, call_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(call_timeout)
            .build()
            .map_err(|e| ExporterError::Rpc {
                method: "client".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            url,
            next_id: AtomicU64::new(1),
        })
    }
}

#[async_trait]
impl RpcTransport for HttpRpcTransport {
    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest::new(method, params, id);
        let rpc_err = |reason: String| ExporterError::Rpc {
            method: method.to_string(),
            reason,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| rpc_err(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(rpc_err(format!("HTTP status {}", status)));
        }

        let body: Value = response.json().await.map_err(|e| rpc_err(e.to_string()))?;
        debug!("RPC {} #{} -> {}", method, id, body);
        Ok(body)
    }
}
