//! Chain-specific types and error definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::chain::transaction::UnsignedTransaction;

// Re-export ChainConfig from config module to avoid duplication
pub use crate::config::schema::ChainConfig;

/// Base units (lamports) per display token.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Errors that can occur during chain operations.
#[derive(Debug, Error)]
pub enum ChainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// The node answered with something we could not interpret.
    #[error("Invalid RPC response: {0}")]
    InvalidResponse(String),

    /// Caller supplied a malformed amount or address.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation is not offered on the configured network.
    #[error("Not available: {0}")]
    NotAvailable(String),
}

/// Result type for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;

/// Cluster the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Cluster {
    #[default]
    Devnet,
    Testnet,
    MainnetBeta,
}

impl Cluster {
    /// Public RPC endpoint for the cluster.
    pub fn default_rpc_url(self) -> &'static str {
        match self {
            Cluster::Devnet => "https://api.devnet.solana.com",
            Cluster::Testnet => "https://api.testnet.solana.com",
            Cluster::MainnetBeta => "https://api.mainnet-beta.solana.com",
        }
    }

    /// Name used in deep-link `cluster` parameters.
    pub fn as_str(self) -> &'static str {
        match self {
            Cluster::Devnet => "devnet",
            Cluster::Testnet => "testnet",
            Cluster::MainnetBeta => "mainnet-beta",
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Cluster {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "devnet" => Ok(Cluster::Devnet),
            "testnet" => Ok(Cluster::Testnet),
            "mainnet-beta" | "mainnet" => Ok(Cluster::MainnetBeta),
            other => Err(ChainError::Validation(format!("unknown network '{}'", other))),
        }
    }
}

/// Commitment level requested from the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }
}

/// Unsigned transfer plus the blockhash window it is valid in.
///
/// Created per payment attempt, consumed once by a signing channel.
#[derive(Debug, Clone)]
pub struct PendingTransaction {
    /// Correlates log lines for one payment attempt.
    pub attempt_id: Uuid,
    pub transaction: UnsignedTransaction,
    pub blockhash: String,
    pub last_valid_block_height: u64,
}

/// Result of `getLatestBlockhash`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestBlockhash {
    pub blockhash: String,
    pub last_valid_block_height: u64,
}

/// One entry of `getSignatureStatuses`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureStatus {
    pub slot: u64,
    pub confirmations: Option<u64>,
    pub err: Option<serde_json::Value>,
    pub confirmation_status: Option<Commitment>,
}

impl SignatureStatus {
    /// True once the status has reached at least `commitment`.
    pub fn satisfies(&self, commitment: Commitment) -> bool {
        match self.confirmation_status {
            Some(status) => status >= commitment,
            // Old nodes omit the field; `confirmations: null` means rooted.
            None => self.confirmations.is_none(),
        }
    }
}

/// Result of `getEpochInfo`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpochInfo {
    pub epoch: u64,
    pub slot_index: u64,
    pub slots_in_epoch: u64,
    pub absolute_slot: u64,
    #[serde(default)]
    pub block_height: Option<u64>,
}

/// Entry of `getSignaturesForAddress`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureInfo {
    pub signature: String,
    pub slot: u64,
    #[serde(default)]
    pub err: Option<serde_json::Value>,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub block_time: Option<i64>,
    #[serde(default)]
    pub confirmation_status: Option<Commitment>,
}

/// Best-effort snapshot of the chain tip.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStatus {
    pub slot: u64,
    pub block_height: u64,
    pub epoch: u64,
    pub network: Cluster,
    /// Origin of the RPC endpoint, never the full URL.
    pub rpc_url: String,
}

/// Convert a display amount to lamports, rejecting non-finite input and
/// anything that rounds to zero lamports.
pub fn sol_to_lamports(amount: f64) -> ChainResult<u64> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ChainError::Validation(format!(
            "amount must be a finite positive number, got {}",
            amount
        )));
    }
    let lamports = (amount * LAMPORTS_PER_SOL as f64).round();
    if lamports > u64::MAX as f64 {
        return Err(ChainError::Validation(format!("amount {} is too large", amount)));
    }
    if lamports < 1.0 {
        return Err(ChainError::Validation(format!(
            "amount {} is smaller than one lamport",
            amount
        )));
    }
    Ok(lamports as u64)
}

/// Convert lamports to display units.
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}
