//! Wallet connection and payment subsystem.
//!
//! # Data Flow
//! ```text
//! connect:  ConnectionOrchestrator
//!     → SigningChannel::connect (extension call | deep-link launch)
//!     → Chain::get_balance → SessionStore::set → Connected
//!
//! callback: deep link re-entry → deeplink.rs (parse + validate key)
//!     → Chain::get_balance → SessionStore::set → Connected
//!
//! pay:      PaymentOrchestrator
//!     → validate inputs → Chain::build_transfer
//!     → SigningChannel::sign (extension | deep link)
//!     → Chain::confirm_transaction (extension path only)
//! ```
//!
//! # Design Decisions
//! - The signing channel is chosen once at startup from the platform
//! - Connection state lives in an explicit `WalletContext`, not a global
//! - Only the connection orchestrator writes the session store
//! - Untrusted strings become addresses only through the codec

pub mod channel;
pub mod connection;
pub mod context;
pub mod deeplink;
pub mod detector;
pub mod payment;
pub mod providers;
pub mod runtime;

use thiserror::Error;

use crate::chain::ChainError;
use crate::codec::CodecError;
use crate::session::SessionError;

pub use channel::{DeepLinkChannel, ExtensionChannel, SigningChannel};
pub use connection::ConnectionOrchestrator;
pub use context::{ConnectionState, FailureReason, WalletContext, WalletSession};
pub use payment::{PaymentOrchestrator, TransactionResult};
pub use providers::{find_provider, WalletProviderDescriptor, WALLET_PROVIDERS};
pub use runtime::WalletRuntime;

/// Errors surfaced by wallet actions.
#[derive(Debug, Error)]
pub enum WalletError {
    /// Malformed address or amount; never retried automatically.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The wallet was reachable but the call failed.
    #[error("{provider} error: {message}")]
    Provider { provider: String, message: String },

    /// No extension / app for the wallet; the install page was opened.
    #[error("{provider} is not installed")]
    NotInstalled { provider: String },

    /// The user declined in the wallet UI.
    #[error("Request rejected by user")]
    UserRejected,

    /// Network or node unavailable; safe to retry.
    #[error(transparent)]
    Rpc(ChainError),

    /// Any other failure during a payment attempt.
    #[error("Failed to send transaction: {0}")]
    PaymentFailed(String),

    #[error(transparent)]
    Storage(#[from] SessionError),
}

impl WalletError {
    /// Whether the caller may offer a plain retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WalletError::Rpc(_))
    }

    pub(crate) fn provider(name: &str, message: impl Into<String>) -> Self {
        WalletError::Provider {
            provider: name.to_string(),
            message: message.into(),
        }
    }
}

impl From<ChainError> for WalletError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::Validation(message) => WalletError::Validation(message),
            other => WalletError::Rpc(other),
        }
    }
}

impl From<CodecError> for WalletError {
    fn from(err: CodecError) -> Self {
        WalletError::Validation(format!("invalid address: {}", err))
    }
}

/// Result type for wallet actions.
pub type WalletResult<T> = Result<T, WalletError>;
