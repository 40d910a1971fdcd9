//! JSON-RPC client with timeout, failover and error handling.
//!
//! # Responsibilities
//! - Send JSON-RPC 2.0 requests to the primary endpoint, then each failover
//! - Bound every request with the configured timeout
//! - Decode typed results; surface node-side errors without failover

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::chain::types::{
    ChainConfig, ChainError, ChainResult, EpochInfo, LatestBlockhash, SignatureInfo,
    SignatureStatus,
};
use crate::codec::Address;
use crate::observability::metrics;

#[derive(Debug, Deserialize)]
struct RpcEnvelope<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Wrapper for results returned as `{ context, value }`.
#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

/// Solana JSON-RPC client wrapper with failover support.
#[derive(Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    /// Primary endpoint first, then failovers.
    endpoints: Vec<url::Url>,
    config: ChainConfig,
    timeout_duration: Duration,
    next_id: Arc<AtomicU64>,
}

impl RpcClient {
    /// Create a new RPC client.
    ///
    /// Fails only if the primary URL cannot be parsed; invalid failover URLs
    /// are skipped with a warning.
    pub fn new(config: ChainConfig) -> ChainResult<Self> {
        let primary = config.effective_rpc_url();
        let primary_url: url::Url = primary
            .parse()
            .map_err(|e| ChainError::Rpc(format!("Invalid RPC URL '{}': {}", primary, e)))?;

        let mut endpoints = vec![primary_url];
        for url_str in &config.failover_urls {
            match url_str.parse() {
                Ok(url) => endpoints.push(url),
                Err(_) => tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL"),
            }
        }

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ChainError::Rpc(format!("HTTP client: {}", e)))?;

        tracing::info!(
            rpc_url = %primary,
            network = %config.network,
            failovers = endpoints.len() - 1,
            "RPC client initialized"
        );

        Ok(Self {
            http,
            endpoints,
            timeout_duration: Duration::from_secs(config.rpc_timeout_secs),
            config,
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    /// Issue one JSON-RPC call, failing over on transport errors and timeouts.
    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> ChainResult<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        for (i, endpoint) in self.endpoints.iter().enumerate() {
            let fut = async {
                let response = self
                    .http
                    .post(endpoint.clone())
                    .json(&body)
                    .send()
                    .await?
                    .error_for_status()?;
                response.json::<RpcEnvelope<T>>().await
            };

            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(envelope)) => {
                    if let Some(err) = envelope.error {
                        metrics::record_rpc_error(method);
                        return Err(ChainError::Rpc(format!(
                            "{} failed ({}): {}",
                            method, err.code, err.message
                        )));
                    }
                    return envelope.result.ok_or_else(|| {
                        ChainError::InvalidResponse(format!("{} returned no result", method))
                    });
                }
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, method, error = %e, "RPC error, trying next endpoint");
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, method, "RPC timeout, trying next endpoint");
                }
            }
        }

        metrics::record_rpc_error(method);
        Err(ChainError::Rpc(format!("All RPC endpoints failed for {}", method)))
    }

    fn commitment(&self) -> Value {
        json!({ "commitment": self.config.commitment.as_str() })
    }

    /// Balance in lamports.
    pub async fn get_balance(&self, address: &Address) -> ChainResult<u64> {
        let res: WithContext<u64> = self
            .call("getBalance", json!([address.as_str(), self.commitment()]))
            .await?;
        Ok(res.value)
    }

    /// Latest blockhash and the last block height it is valid for.
    pub async fn get_latest_blockhash(&self) -> ChainResult<LatestBlockhash> {
        let res: WithContext<LatestBlockhash> = self
            .call("getLatestBlockhash", json!([self.commitment()]))
            .await?;
        Ok(res.value)
    }

    /// Statuses for the given signatures, `None` where unknown to the node.
    pub async fn get_signature_statuses(
        &self,
        signatures: &[&str],
    ) -> ChainResult<Vec<Option<SignatureStatus>>> {
        let res: WithContext<Vec<Option<SignatureStatus>>> = self
            .call(
                "getSignatureStatuses",
                json!([signatures, { "searchTransactionHistory": false }]),
            )
            .await?;
        Ok(res.value)
    }

    pub async fn get_block_height(&self) -> ChainResult<u64> {
        self.call("getBlockHeight", json!([self.commitment()])).await
    }

    pub async fn get_slot(&self) -> ChainResult<u64> {
        self.call("getSlot", json!([self.commitment()])).await
    }

    pub async fn get_epoch_info(&self) -> ChainResult<EpochInfo> {
        self.call("getEpochInfo", json!([self.commitment()])).await
    }

    /// Most recent signatures touching `address`, newest first.
    pub async fn get_signatures_for_address(
        &self,
        address: &Address,
        limit: usize,
    ) -> ChainResult<Vec<SignatureInfo>> {
        self.call(
            "getSignaturesForAddress",
            json!([address.as_str(), {
                "limit": limit,
                "commitment": self.config.commitment.as_str(),
            }]),
        )
        .await
    }

    /// Full transaction by signature; `None` if the node does not know it.
    pub async fn get_transaction(&self, signature: &str) -> ChainResult<Option<Value>> {
        self.call(
            "getTransaction",
            json!([signature, {
                "commitment": self.config.commitment.as_str(),
                "maxSupportedTransactionVersion": 0,
                "encoding": "json",
            }]),
        )
        .await
        .or_else(|e| match e {
            // `result: null` means not found.
            ChainError::InvalidResponse(_) => Ok(None),
            other => Err(other),
        })
    }

    /// Ask a faucet-enabled node for lamports. Returns the airdrop signature.
    pub async fn request_airdrop(&self, address: &Address, lamports: u64) -> ChainResult<String> {
        self.call(
            "requestAirdrop",
            json!([address.as_str(), lamports, self.commitment()]),
        )
        .await
    }

    /// Check if the node is reachable.
    pub async fn is_healthy(&self) -> bool {
        let healthy = self.get_slot().await.is_ok();
        metrics::record_rpc_health(healthy);
        healthy
    }

    /// The primary endpoint.
    pub fn primary_url(&self) -> &url::Url {
        &self.endpoints[0]
    }

    /// Get the configuration.
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient")
            .field("rpc_url", &self.endpoints[0].as_str())
            .field("network", &self.config.network)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}
