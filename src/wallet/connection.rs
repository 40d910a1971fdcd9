//! Connect, callback, restore and disconnect.
//!
//! # Responsibilities
//! - Drive `WalletContext` through its states
//! - Fetch the balance for a newly approved address
//! - Sole writer of the persisted session
//!
//! Restore reads only the session store and the chain; it never triggers
//! extension detection or a wallet prompt.
//!
//! The persisted address is the last wallet the user approved. A failed or
//! abandoned reconnect clears the in-memory session but leaves that entry,
//! so the next restore brings the previous wallet back. Only `disconnect`
//! deletes it.

use std::sync::Arc;
use tracing::{info, warn};

use crate::chain::Chain;
use crate::codec::Address;
use crate::observability::metrics;
use crate::session::SessionStore;
use crate::wallet::channel::{ConnectOutcome, SigningChannel};
use crate::wallet::context::{ConnectionState, FailureReason, WalletContext, WalletSession};
use crate::wallet::deeplink::{parse_connect_callback, CallbackError};
use crate::wallet::providers::WalletProviderDescriptor;
use crate::wallet::{WalletError, WalletResult};

pub struct ConnectionOrchestrator {
    chain: Arc<dyn Chain>,
    store: Box<dyn SessionStore>,
    channel: Arc<dyn SigningChannel>,
}

impl ConnectionOrchestrator {
    pub fn new(
        chain: Arc<dyn Chain>,
        store: Box<dyn SessionStore>,
        channel: Arc<dyn SigningChannel>,
    ) -> Self {
        Self { chain, store, channel }
    }

    /// Start a connection with the given wallet.
    ///
    /// Returns the session when the wallet approved synchronously, `None`
    /// when a deep link was launched or the install page was opened.
    pub async fn connect(
        &self,
        ctx: &mut WalletContext,
        provider: &'static WalletProviderDescriptor,
    ) -> WalletResult<Option<WalletSession>> {
        ctx.begin(provider);
        info!(provider = provider.name, channel = self.channel.kind().as_str(), "Connecting wallet");

        let outcome = match self.channel.connect(provider).await {
            Ok(outcome) => outcome,
            Err(e) => return Err(self.fail(ctx, provider, e)),
        };

        match outcome {
            ConnectOutcome::Approved(address) => {
                let session = match self.establish(ctx, address).await {
                    Ok(session) => session,
                    Err(e) => return Err(self.fail(ctx, provider, e)),
                };
                metrics::record_connect(provider.name, "connected");
                Ok(Some(session))
            }
            ConnectOutcome::AwaitingCallback { .. } => {
                ctx.transition(ConnectionState::AwaitingCallback);
                metrics::record_connect(provider.name, "awaiting_callback");
                Ok(None)
            }
            ConnectOutcome::InstallRedirect { .. } => {
                ctx.reset();
                metrics::record_connect(provider.name, "install_redirect");
                Ok(None)
            }
        }
    }

    /// Complete a deep-link connection from the callback URL.
    ///
    /// URLs without a key are ignored. An invalid key fails a pending
    /// connection. Neither touches the session store.
    pub async fn handle_callback(&self, ctx: &mut WalletContext, url: &str) -> Option<WalletSession> {
        let address = match parse_connect_callback(url) {
            Ok(address) => address,
            Err(CallbackError::InvalidKey(e)) => {
                warn!(error = %e, "Rejected wallet callback with invalid public key");
                if ctx.state() == ConnectionState::AwaitingCallback {
                    ctx.fail(FailureReason::InvalidCallback);
                }
                return None;
            }
            Err(e) => {
                info!(error = %e, "Ignoring callback URL");
                return None;
            }
        };

        match self.establish(ctx, address).await {
            Ok(session) => {
                let name = ctx.provider().map(|p| p.name).unwrap_or("unknown");
                metrics::record_connect(name, "connected");
                Some(session)
            }
            Err(e) => {
                warn!(error = %e, "Failed to complete wallet callback");
                ctx.fail(FailureReason::from(&e));
                None
            }
        }
    }

    /// Rebuild the session from storage at startup.
    ///
    /// A failed balance read still restores the connection with a zero
    /// balance; a stored but unreadable entry is treated as absent.
    pub async fn restore(&self, ctx: &mut WalletContext) -> Option<WalletSession> {
        let stored = match self.store.get(&ctx.config.session_key).await {
            Ok(stored) => stored?,
            Err(e) => {
                warn!(error = %e, "Failed to read stored session");
                return None;
            }
        };

        let balance = match self.chain.get_balance(&stored).await {
            Ok(balance) => balance,
            Err(e) => {
                warn!(address = %stored, error = %e, "Balance unavailable during restore");
                0.0
            }
        };

        info!(address = %stored, "Restored wallet session");
        let session = WalletSession { public_key: stored, balance };
        ctx.connected(session.clone());
        Some(session)
    }

    /// Forget the session. Always ends `Idle`.
    pub async fn disconnect(&self, ctx: &mut WalletContext) {
        self.channel.disconnect(ctx.provider()).await;
        if let Err(e) = self.store.delete(&ctx.config.session_key).await {
            warn!(error = %e, "Failed to delete stored session");
        }
        ctx.reset();
        info!("Wallet disconnected");
    }

    /// Persist an address entered or obtained outside a connect flow.
    pub async fn save_wallet_address(&self, ctx: &WalletContext, address: &str) -> WalletResult<Address> {
        let address = address.trim();
        if address.is_empty() {
            return Err(WalletError::Validation("wallet address is required".to_string()));
        }
        let address = Address::parse(address)?;
        self.store.set(&ctx.config.session_key, &address).await?;
        Ok(address)
    }

    async fn establish(&self, ctx: &mut WalletContext, address: Address) -> WalletResult<WalletSession> {
        let balance = self.chain.get_balance(&address).await?;

        if let Err(e) = self.store.set(&ctx.config.session_key, &address).await {
            warn!(address = %address, error = %e, "Failed to persist session");
        }

        info!(address = %address, balance, "Wallet connected");
        let session = WalletSession { public_key: address, balance };
        ctx.connected(session.clone());
        Ok(session)
    }

    fn fail(
        &self,
        ctx: &mut WalletContext,
        provider: &WalletProviderDescriptor,
        err: WalletError,
    ) -> WalletError {
        let reason = FailureReason::from(&err);
        warn!(provider = provider.name, error = %err, "Wallet connection failed");
        metrics::record_connect(provider.name, "failed");
        ctx.fail(reason);
        err
    }
}
