//! Read/write gateway to the chain used by the wallet orchestrators.
//!
//! # Responsibilities
//! - Balance queries in display units
//! - Transfer construction against a fresh blockhash
//! - Confirmation polling bounded by the blockhash expiry height
//! - Best-effort telemetry and history reads that never fail the caller

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;
use uuid::Uuid;

use crate::chain::client::RpcClient;
use crate::chain::transaction::UnsignedTransaction;
use crate::chain::types::{
    lamports_to_sol, sol_to_lamports, ChainConfig, ChainError, ChainResult, Cluster,
    NetworkStatus, PendingTransaction, SignatureInfo,
};
use crate::codec::Address;
use crate::resilience::backoff::poll_delay;

/// Default page size for history reads.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Chain operations the orchestrators depend on.
#[async_trait]
pub trait Chain: Send + Sync {
    /// Balance in display units.
    async fn get_balance(&self, address: &Address) -> ChainResult<f64>;

    /// Build an unsigned transfer anchored at a fresh blockhash.
    async fn build_transfer(
        &self,
        from: &Address,
        to: &Address,
        amount: f64,
    ) -> ChainResult<PendingTransaction>;

    /// Poll until the signature lands or the blockhash expires.
    ///
    /// Any RPC or execution error yields `false`.
    async fn confirm_transaction(
        &self,
        signature: &str,
        blockhash: &str,
        last_valid_block_height: u64,
    ) -> bool;
}

/// [`Chain`] backed by a JSON-RPC node.
#[derive(Debug, Clone)]
pub struct ChainGateway {
    client: RpcClient,
}

impl ChainGateway {
    pub fn new(config: ChainConfig) -> ChainResult<Self> {
        Ok(Self {
            client: RpcClient::new(config)?,
        })
    }

    pub fn client(&self) -> &RpcClient {
        &self.client
    }

    pub fn network(&self) -> Cluster {
        self.client.config().network
    }

    /// Slot, block height and epoch, or `None` if any read fails.
    pub async fn network_status(&self) -> Option<NetworkStatus> {
        let result = tokio::try_join!(
            self.client.get_slot(),
            self.client.get_block_height(),
            self.client.get_epoch_info(),
        );

        match result {
            Ok((slot, block_height, epoch_info)) => Some(NetworkStatus {
                slot,
                block_height,
                epoch: epoch_info.epoch,
                network: self.network(),
                rpc_url: rpc_origin(self.client.primary_url().as_str()),
            }),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch network status");
                None
            }
        }
    }

    /// Recent signatures for `address`; empty on any failure.
    pub async fn recent_transactions(&self, address: &Address, limit: usize) -> Vec<SignatureInfo> {
        match self.client.get_signatures_for_address(address, limit).await {
            Ok(signatures) => signatures,
            Err(e) => {
                tracing::warn!(address = %address, error = %e, "Failed to fetch transactions");
                Vec::new()
            }
        }
    }

    /// Transaction details; `None` if unknown or on failure.
    pub async fn transaction_details(&self, signature: &str) -> Option<serde_json::Value> {
        match self.client.get_transaction(signature).await {
            Ok(tx) => tx,
            Err(e) => {
                tracing::warn!(signature, error = %e, "Failed to fetch transaction");
                None
            }
        }
    }

    /// Devnet faucet request. Returns the signature, or `None` off devnet or on failure.
    pub async fn request_airdrop(&self, address: &Address, amount: f64) -> Option<String> {
        match self.try_airdrop(address, amount).await {
            Ok(signature) => Some(signature),
            Err(ChainError::NotAvailable(reason)) => {
                tracing::warn!(network = %self.network(), "{}", reason);
                None
            }
            Err(e) => {
                tracing::error!(address = %address, error = %e, "Airdrop failed");
                None
            }
        }
    }

    async fn try_airdrop(&self, address: &Address, amount: f64) -> ChainResult<String> {
        if self.network() != Cluster::Devnet {
            return Err(ChainError::NotAvailable(
                "Airdrop only available on devnet".to_string(),
            ));
        }
        let lamports = sol_to_lamports(amount)?;
        let signature = self.client.request_airdrop(address, lamports).await?;

        let latest = self.client.get_latest_blockhash().await?;
        let confirmed = self
            .confirm_transaction(&signature, &latest.blockhash, latest.last_valid_block_height)
            .await;
        tracing::info!(address = %address, signature = %signature, confirmed, "Airdrop requested");
        Ok(signature)
    }
}

#[async_trait]
impl Chain for ChainGateway {
    async fn get_balance(&self, address: &Address) -> ChainResult<f64> {
        let lamports = self.client.get_balance(address).await?;
        Ok(lamports_to_sol(lamports))
    }

    async fn build_transfer(
        &self,
        from: &Address,
        to: &Address,
        amount: f64,
    ) -> ChainResult<PendingTransaction> {
        let lamports = sol_to_lamports(amount)?;
        let latest = self.client.get_latest_blockhash().await?;
        let transaction = UnsignedTransaction::transfer(
            from,
            to,
            lamports,
            &latest.blockhash,
            latest.last_valid_block_height,
        )?;

        let pending = PendingTransaction {
            attempt_id: Uuid::new_v4(),
            transaction,
            blockhash: latest.blockhash,
            last_valid_block_height: latest.last_valid_block_height,
        };

        tracing::debug!(
            attempt_id = %pending.attempt_id,
            from = %from,
            to = %to,
            lamports,
            last_valid_block_height = pending.last_valid_block_height,
            "Built transfer"
        );
        Ok(pending)
    }

    async fn confirm_transaction(
        &self,
        signature: &str,
        blockhash: &str,
        last_valid_block_height: u64,
    ) -> bool {
        let config = self.client.config();
        let commitment = config.commitment;
        let base = Duration::from_millis(config.confirm_poll_base_ms);
        let max = Duration::from_millis(config.confirm_poll_max_ms);
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            match self.client.get_signature_statuses(&[signature]).await {
                Ok(statuses) => {
                    if let Some(Some(status)) = statuses.into_iter().next() {
                        if let Some(err) = status.err {
                            tracing::warn!(signature, error = %err, "Transaction failed on-chain");
                            return false;
                        }
                        if status.satisfies(commitment) {
                            tracing::debug!(signature, slot = status.slot, "Transaction confirmed");
                            return true;
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(signature, error = %e, "Error confirming transaction");
                    return false;
                }
            }

            match self.client.get_block_height().await {
                Ok(height) if height > last_valid_block_height => {
                    tracing::warn!(
                        signature,
                        blockhash,
                        block_height = height,
                        last_valid_block_height,
                        "Blockhash expired before confirmation"
                    );
                    return false;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(signature, error = %e, "Error confirming transaction");
                    return false;
                }
            }

            sleep(poll_delay(attempt, base, max)).await;
        }
    }
}

/// Scheme + host + port of an RPC URL, or `"unknown"`.
pub fn rpc_origin(rpc_url: &str) -> String {
    match url::Url::parse(rpc_url) {
        Ok(url) => match url.origin() {
            origin @ url::Origin::Tuple(..) => origin.ascii_serialization(),
            url::Origin::Opaque(_) => "unknown".to_string(),
        },
        Err(_) => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_origin() {
        assert_eq!(
            rpc_origin("https://api.devnet.solana.com/?api-key=secret"),
            "https://api.devnet.solana.com"
        );
        assert_eq!(rpc_origin("http://127.0.0.1:8899/rpc"), "http://127.0.0.1:8899");
        assert_eq!(rpc_origin("not a url"), "unknown");
    }

    #[tokio::test]
    async fn test_network_status_unreachable_is_none() {
        let gateway = ChainGateway::new(ChainConfig {
            rpc_url: Some("http://127.0.0.1:1".to_string()),
            rpc_timeout_secs: 1,
            ..ChainConfig::default()
        })
        .unwrap();
        assert!(gateway.network_status().await.is_none());
    }

    #[tokio::test]
    async fn test_build_transfer_validates_before_rpc() {
        let gateway = ChainGateway::new(ChainConfig {
            rpc_url: Some("http://127.0.0.1:1".to_string()),
            rpc_timeout_secs: 1,
            ..ChainConfig::default()
        })
        .unwrap();
        let a = Address::from_bytes([1; 32]);
        let b = Address::from_bytes([2; 32]);
        let result = gateway.build_transfer(&a, &b, -1.0).await;
        assert!(matches!(result, Err(ChainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_airdrop_off_devnet_is_none() {
        let gateway = ChainGateway::new(ChainConfig {
            network: Cluster::MainnetBeta,
            rpc_url: Some("http://127.0.0.1:1".to_string()),
            rpc_timeout_secs: 1,
            ..ChainConfig::default()
        })
        .unwrap();
        let a = Address::from_bytes([1; 32]);
        assert!(gateway.request_airdrop(&a, 1.0).await.is_none());
    }
}
