use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::error::{ExporterError, Result};
use crate::models::balance::{ETH, SITX};
use crate::models::{BalanceResult, Target, TargetKind};
use crate::traits::{RpcTransport, SourceAdapter};
use crate::utils::{abi_encode_address, base_units_to_amount, hex_to_u128};

/// `balanceOf(address)` selector
pub const BALANCE_OF_SELECTOR: &str = "0x70a08231";

/// Default sITX token contract on Scroll.
pub const DEFAULT_SITX_CONTRACT: &str = "0xc0579287f3CDE6BF796BE6E2bB61DbB06DA85024";

const RPC_METRICS: &[&str] = &[ETH, SITX];

/// Source adapter that reads native and token balances over JSON-RPC.
///
/// A metric whose call fails degrades to zero; the target itself is still
/// reported as successful.
pub struct RpcAdapter {
    transport: Arc<dyn RpcTransport>,
    token_contract: String,
}

impl RpcAdapter {
    /// Create a new RPC adapter
    pub fn new(transport: Arc<dyn RpcTransport>, token_contract: String) -> Self {
        Self {
            transport,
            token_contract,
        }
    }

    /// Call `method` and decode the `result` hex quantity
    async fn fetch_quantity(&self, method: &str, params: Value) -> Result<u128> {
        let response = self.transport.call(method, params).await?;

        if let Some(err) = response.get("error") {
            warn!("RPC {} returned error object: {}", method, err);
        }

        let result = response
            .get("result")
            .and_then(Value::as_str)
            .ok_or_else(|| ExporterError::RpcMissingResult {
                method: method.to_string(),
            })?;

        hex_to_u128(result)
    }

    /// Native balance in base units
    pub async fn native_balance(&self, address: &str) -> Result<u128> {
        self.fetch_quantity("eth_getBalance", json!([address, "latest"]))
            .await
    }

    /// Token balance in base units
    pub async fn token_balance(&self, address: &str) -> Result<u128> {
        let data = format!("{}{}", BALANCE_OF_SELECTOR, abi_encode_address(address));
        self.fetch_quantity(
            "eth_call",
            json!([{ "to": self.token_contract, "data": data }, "latest"]),
        )
        .await
    }

    fn amount_or_zero(address: &str, metric: &str, units: Result<u128>) -> f64 {
        match units {
            Ok(units) => base_units_to_amount(units),
            Err(e) => {
                warn!("{} balance for {} degraded to 0: {}", metric, address, e);
                0.0
            }
        }
    }
}

#[async_trait]
impl SourceAdapter for RpcAdapter {
    async fn query(&self, target: &Target) -> BalanceResult {
        let address = match &target.kind {
            TargetKind::Rpc(rpc) => rpc.address.as_str(),
            other => {
                let err = ExporterError::UnsupportedTarget {
                    target: target.name.clone(),
                    kind: other.tag(),
                };
                error!("{}", err);
                return BalanceResult::failed(&target.name, RPC_METRICS, err);
            }
        };

        let eth = Self::amount_or_zero(address, ETH, self.native_balance(address).await);
        info!("  ETH: {:.6}", eth);

        let sitx = Self::amount_or_zero(address, SITX, self.token_balance(address).await);
        info!("  sITX: {:.6}", sitx);

        let mut values = BTreeMap::new();
        values.insert(ETH.to_string(), eth);
        values.insert(SITX.to_string(), sitx);
        BalanceResult::succeeded(&target.name, RPC_METRICS, values)
    }

    fn metrics(&self) -> &[&'static str] {
        RPC_METRICS
    }
}
