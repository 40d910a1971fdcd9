//! Payment submission.
//!
//! Inputs are validated before any network call. The extension path
//! signs, broadcasts and confirms in one call; the deep-link path hands
//! the transaction to the wallet app and reports a pending result.

use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::chain::types::sol_to_lamports;
use crate::chain::Chain;
use crate::codec::Address;
use crate::observability::metrics;
use crate::wallet::channel::{SignOutcome, SigningChannel};
use crate::wallet::{WalletError, WalletResult};

/// Outcome of a payment attempt.
///
/// `success` means the wallet broadcast the transaction. `confirmed`
/// reports the follow-up confirmation poll and is absent when no poll ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResult {
    pub signature: String,
    pub success: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub pending: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed: Option<bool>,
}

impl TransactionResult {
    fn broadcast(signature: String, confirmed: bool) -> Self {
        Self { signature, success: true, pending: false, confirmed: Some(confirmed) }
    }

    fn pending() -> Self {
        Self { signature: String::new(), success: false, pending: true, confirmed: None }
    }
}

pub struct PaymentOrchestrator {
    chain: Arc<dyn Chain>,
    channel: Arc<dyn SigningChannel>,
}

fn required_address(raw: &str, role: &str) -> WalletResult<Address> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(WalletError::Validation(format!("Invalid {} wallet address", role)));
    }
    Address::parse(raw)
        .map_err(|e| WalletError::Validation(format!("Invalid {} wallet address: {}", role, e)))
}

impl PaymentOrchestrator {
    pub fn new(chain: Arc<dyn Chain>, channel: Arc<dyn SigningChannel>) -> Self {
        Self { chain, channel }
    }

    /// Transfer `amount` SOL from `from` to `to`.
    pub async fn send_payment(&self, from: &str, to: &str, amount: f64) -> WalletResult<TransactionResult> {
        let from = required_address(from, "sender")?;
        let to = required_address(to, "recipient")?;
        if sol_to_lamports(amount).is_err() {
            return Err(WalletError::Validation(
                "Invalid payment amount: must be at least one lamport".to_string(),
            ));
        }

        let channel = self.channel.kind().as_str();
        let result = self.submit(&from, &to, amount).await;
        match &result {
            Ok(r) if r.pending => metrics::record_payment(channel, "pending"),
            Ok(_) => metrics::record_payment(channel, "broadcast"),
            Err(WalletError::UserRejected) => metrics::record_payment(channel, "rejected"),
            Err(_) => metrics::record_payment(channel, "failed"),
        }
        result
    }

    async fn submit(&self, from: &Address, to: &Address, amount: f64) -> WalletResult<TransactionResult> {
        let pending = self
            .chain
            .build_transfer(from, to, amount)
            .await
            .map_err(|e| match WalletError::from(e) {
                WalletError::Validation(message) => WalletError::Validation(message),
                other => WalletError::PaymentFailed(other.to_string()),
            })?;

        info!(
            attempt_id = %pending.attempt_id,
            from = %from,
            to = %to,
            amount,
            "Submitting payment"
        );

        let outcome = self.channel.sign(&pending).await.map_err(|e| match e {
            WalletError::UserRejected => WalletError::UserRejected,
            WalletError::PaymentFailed(message) => WalletError::PaymentFailed(message),
            other => WalletError::PaymentFailed(other.to_string()),
        })?;

        match outcome {
            SignOutcome::Pending { .. } => {
                info!(attempt_id = %pending.attempt_id, "Awaiting wallet app signature");
                Ok(TransactionResult::pending())
            }
            SignOutcome::Submitted { signature } => {
                let confirmed = self
                    .chain
                    .confirm_transaction(&signature, &pending.blockhash, pending.last_valid_block_height)
                    .await;
                if confirmed {
                    info!(attempt_id = %pending.attempt_id, signature = %signature, "Payment confirmed");
                } else {
                    warn!(
                        attempt_id = %pending.attempt_id,
                        signature = %signature,
                        "Payment broadcast but not confirmed"
                    );
                }
                Ok(TransactionResult::broadcast(signature, confirmed))
            }
        }
    }
}
