use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use minefaucet_core::constants::RECEIPT_POLL_MS;
use minefaucet_core::{Address, ChainError, ClaimRecord, TxHash};
use minefaucet_lifecycle::{ChainReader, ChainWriter, TxOutcome};

use crate::types::{RpcClaimRecord, RpcFaucetInfo, RpcReceipt};

/// Failures that carry meaning past the transport layer.
///
/// Everything else a call can fail with (connection refused, timeouts, a body
/// that is not JSON) stays a plain `anyhow` error and maps to
/// [`ChainError::Unavailable`].
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The node answered with a JSON-RPC `error` object.
    #[error("{message}")]
    Rpc { code: i64, message: String },

    #[error("{0}")]
    Malformed(String),
}

/// Timing knobs for [`FaucetRpcClient`].
#[derive(Debug, Clone)]
pub struct RpcClientConfig {
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
    /// Delay between `faucet_getReceipt` polls while a claim is pending.
    pub receipt_poll: Duration,
}

impl Default for RpcClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(15),
            receipt_poll: Duration::from_millis(RECEIPT_POLL_MS),
        }
    }
}

/// JSON-RPC 2.0 client for a faucet node.
///
/// Plain HTTP POST with serde_json; the node exposes the `faucet_*` methods.
pub struct FaucetRpcClient {
    url: String,
    client: reqwest::Client,
    config: RpcClientConfig,
}

impl FaucetRpcClient {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        Self::with_config(url, RpcClientConfig::default())
    }

    pub fn with_config(url: &str, config: RpcClientConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            url: url.to_string(),
            client,
            config,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Call a JSON-RPC method and return the `result` field.
    async fn call(&self, method: &str, params: Value) -> anyhow::Result<Value> {
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let resp = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("connecting to node at {}", self.url))?;

        let mut json: Value = resp.json().await.context("parsing RPC response")?;

        if let Some(err) = json.get("error") {
            let code = err["code"].as_i64().unwrap_or_default();
            let message = err["message"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| err.to_string());
            return Err(WireError::Rpc { code, message }.into());
        }

        Ok(json.get_mut("result").map(Value::take).unwrap_or(Value::Null))
    }

    /// `faucet_getClaimRecord`. `None` for an address that never claimed.
    pub async fn get_claim_record(&self, address: &Address) -> anyhow::Result<Option<ClaimRecord>> {
        let result = self
            .call("faucet_getClaimRecord", json!([address.to_hex()]))
            .await?;

        if result.is_null() {
            return Ok(None);
        }

        let rec: RpcClaimRecord = serde_json::from_value(result)
            .map_err(|e| WireError::Malformed(format!("claim record: {e}")))?;
        Ok(Some(rec.into_record()?))
    }

    /// `faucet_claim`. Broadcasts the claim and returns its transaction hash.
    pub async fn claim(&self, address: &Address) -> anyhow::Result<TxHash> {
        let result = self.call("faucet_claim", json!([address.to_hex()])).await?;
        let hex = result
            .as_str()
            .ok_or_else(|| WireError::Malformed(format!("expected tx hash, got {result}")))?;
        let hash = TxHash::from_hex(hex).map_err(|e| WireError::Malformed(e.to_string()))?;
        Ok(hash)
    }

    /// `faucet_getReceipt`. `None` while the transaction is still pending.
    pub async fn get_receipt(&self, hash: &TxHash) -> anyhow::Result<Option<TxOutcome>> {
        let result = self.call("faucet_getReceipt", json!([hash.to_hex()])).await?;

        if result.is_null() {
            return Ok(None);
        }

        let receipt: RpcReceipt = serde_json::from_value(result)
            .map_err(|e| WireError::Malformed(format!("receipt: {e}")))?;
        match receipt.status.as_str() {
            "confirmed" => Ok(Some(TxOutcome::Confirmed)),
            "reverted" => Ok(Some(TxOutcome::Reverted {
                reason: receipt
                    .reason
                    .unwrap_or_else(|| "transaction reverted".to_string()),
            })),
            other => Err(WireError::Malformed(format!("unknown receipt status {other:?}")).into()),
        }
    }

    /// `faucet_getInfo`.
    pub async fn get_info(&self) -> anyhow::Result<RpcFaucetInfo> {
        let result = self.call("faucet_getInfo", json!([])).await?;
        let info = serde_json::from_value(result)
            .map_err(|e| WireError::Malformed(format!("faucet info: {e}")))?;
        Ok(info)
    }
}

// ── Chain ports ──────────────────────────────────────────────────────────────

/// Classify a failed call. `rejecting` marks calls whose RPC errors are the
/// contract refusing the request rather than the node being unreachable.
fn to_chain_error(err: anyhow::Error, rejecting: bool) -> ChainError {
    match err.downcast_ref::<WireError>() {
        Some(WireError::Rpc { message, .. }) if rejecting => ChainError::Rejected(message.clone()),
        Some(WireError::Rpc { code, message }) => {
            ChainError::Unavailable(format!("node error {code}: {message}"))
        }
        Some(WireError::Malformed(m)) => ChainError::Malformed(m.clone()),
        None => ChainError::Unavailable(format!("{err:#}")),
    }
}

#[async_trait]
impl ChainReader for FaucetRpcClient {
    async fn claim_record(&self, address: &Address) -> Result<Option<ClaimRecord>, ChainError> {
        self.get_claim_record(address)
            .await
            .map_err(|e| to_chain_error(e, false))
    }
}

#[async_trait]
impl ChainWriter for FaucetRpcClient {
    async fn submit_claim(&self, address: &Address) -> Result<TxHash, ChainError> {
        self.claim(address).await.map_err(|e| to_chain_error(e, true))
    }

    /// Poll until the node reports a settled receipt.
    ///
    /// Transport errors are retried: once broadcast, the transaction settles
    /// whether or not the node is reachable right now.
    async fn wait_for_receipt(&self, hash: &TxHash) -> Result<TxOutcome, ChainError> {
        loop {
            match self.get_receipt(hash).await {
                Ok(Some(outcome)) => return Ok(outcome),
                Ok(None) => debug!(%hash, "receipt pending"),
                Err(e) => match to_chain_error(e, false) {
                    ChainError::Unavailable(reason) => {
                        warn!(%hash, %reason, "receipt poll failed; retrying")
                    }
                    fatal => return Err(fatal),
                },
            }
            tokio::time::sleep(self.config.receipt_poll).await;
        }
    }
}
