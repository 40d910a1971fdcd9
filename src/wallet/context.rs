//! Explicit wallet connection state.

use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::codec::Address;
use crate::config::AppConfig;
use crate::wallet::providers::WalletProviderDescriptor;
use crate::wallet::WalletError;

/// Why the last connection attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    UserRejected,
    ProviderError,
    NotInstalled,
    Rpc,
    InvalidCallback,
}

impl From<&WalletError> for FailureReason {
    fn from(err: &WalletError) -> Self {
        match err {
            WalletError::UserRejected => FailureReason::UserRejected,
            WalletError::NotInstalled { .. } => FailureReason::NotInstalled,
            WalletError::Rpc(_) => FailureReason::Rpc,
            _ => FailureReason::ProviderError,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum ConnectionState {
    #[default]
    Idle,
    Connecting,
    /// Deep link launched; waiting for the wallet to call back.
    AwaitingCallback,
    Connected,
    Failed(FailureReason),
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Idle => write!(f, "idle"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::AwaitingCallback => write!(f, "awaiting_callback"),
            ConnectionState::Connected => write!(f, "connected"),
            ConnectionState::Failed(reason) => write!(f, "failed ({:?})", reason),
        }
    }
}

/// A connected wallet. `balance` may be stale.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSession {
    pub public_key: Address,
    pub balance: f64,
}

/// Configuration plus current state, passed to every orchestrator call.
#[derive(Debug, Clone)]
pub struct WalletContext {
    pub config: AppConfig,
    state: ConnectionState,
    session: Option<WalletSession>,
    provider: Option<&'static WalletProviderDescriptor>,
}

impl WalletContext {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            state: ConnectionState::Idle,
            session: None,
            provider: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn session(&self) -> Option<&WalletSession> {
        self.session.as_ref()
    }

    /// Wallet used for the current or last connection, if known.
    pub fn provider(&self) -> Option<&'static WalletProviderDescriptor> {
        self.provider
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub(crate) fn transition(&mut self, to: ConnectionState) {
        if self.state != to {
            debug!(from = %self.state, to = %to, "Wallet state transition");
        }
        self.state = to;
    }

    /// A new attempt drops any previous in-memory session.
    pub(crate) fn begin(&mut self, provider: &'static WalletProviderDescriptor) {
        self.session = None;
        self.provider = Some(provider);
        self.transition(ConnectionState::Connecting);
    }

    pub(crate) fn connected(&mut self, session: WalletSession) {
        self.session = Some(session);
        self.transition(ConnectionState::Connected);
    }

    pub(crate) fn fail(&mut self, reason: FailureReason) {
        self.session = None;
        self.transition(ConnectionState::Failed(reason));
    }

    pub(crate) fn reset(&mut self) {
        self.session = None;
        self.provider = None;
        self.transition(ConnectionState::Idle);
    }
}
