//! Signing channels: injected extension (web) or deep link (mobile).
//!
//! One channel is selected at startup from the platform; orchestrators
//! only see the [`SigningChannel`] trait.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::chain::{Cluster, PendingTransaction};
use crate::codec::Address;
use crate::config::AppConfig;
use crate::wallet::deeplink::{build_connect_url, build_sign_url, Linker};
use crate::wallet::detector::{ProviderCallError, ProviderDetector};
use crate::wallet::providers::{find_provider, WalletProviderDescriptor};
use crate::wallet::{WalletError, WalletResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Extension,
    DeepLink,
}

impl ChannelKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChannelKind::Extension => "extension",
            ChannelKind::DeepLink => "deep_link",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// The wallet approved and returned its address.
    Approved(Address),
    /// The wallet app was launched; the answer arrives as a callback.
    AwaitingCallback { url: String },
    /// The wallet app is missing; its install page was opened.
    InstallRedirect { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignOutcome {
    /// Signed and broadcast.
    Submitted { signature: String },
    /// Handed to the wallet app; the signature arrives as a callback.
    Pending { url: String },
}

#[async_trait]
pub trait SigningChannel: Send + Sync {
    fn kind(&self) -> ChannelKind;

    async fn connect(&self, provider: &'static WalletProviderDescriptor) -> WalletResult<ConnectOutcome>;

    /// Best-effort; failures are logged only.
    async fn disconnect(&self, provider: Option<&'static WalletProviderDescriptor>);

    async fn sign(&self, pending: &PendingTransaction) -> WalletResult<SignOutcome>;
}

fn map_call_error(provider: &str, err: ProviderCallError) -> WalletError {
    if err.is_user_rejection() {
        WalletError::UserRejected
    } else {
        WalletError::provider(provider, err.message)
    }
}

/// Browser extension channel.
pub struct ExtensionChannel {
    detector: ProviderDetector,
    priority: Vec<String>,
    linker: Arc<dyn Linker>,
}

impl ExtensionChannel {
    pub fn new(detector: ProviderDetector, priority: Vec<String>, linker: Arc<dyn Linker>) -> Self {
        Self { detector, priority, linker }
    }
}

#[async_trait]
impl SigningChannel for ExtensionChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Extension
    }

    async fn connect(&self, provider: &'static WalletProviderDescriptor) -> WalletResult<ConnectOutcome> {
        if provider.extension.is_none() {
            return Err(WalletError::provider(
                provider.name,
                "not available as a browser extension",
            ));
        }

        let Some(injected) = self.detector.detect(provider) else {
            info!(provider = provider.name, "Extension not detected, opening install page");
            if let Err(e) = self.linker.open_url(provider.install_url).await {
                warn!(provider = provider.name, error = %e, "Failed to open install page");
            }
            return Err(WalletError::NotInstalled {
                provider: provider.name.to_string(),
            });
        };

        let public_key = injected
            .connect()
            .await
            .map_err(|e| map_call_error(provider.name, e))?;

        let address = Address::parse(&public_key).map_err(|e| {
            WalletError::provider(provider.name, format!("returned an invalid public key: {}", e))
        })?;
        Ok(ConnectOutcome::Approved(address))
    }

    async fn disconnect(&self, provider: Option<&'static WalletProviderDescriptor>) {
        let injected = match provider {
            Some(descriptor) => self.detector.detect(descriptor).map(|p| (descriptor, p)),
            None => self.detector.detect_first(&self.priority),
        };
        if let Some((descriptor, injected)) = injected {
            if let Err(e) = injected.disconnect().await {
                warn!(provider = descriptor.name, error = %e, "Extension disconnect failed");
            }
        }
    }

    async fn sign(&self, pending: &PendingTransaction) -> WalletResult<SignOutcome> {
        let (descriptor, injected) = self
            .detector
            .detect_first(&self.priority)
            .ok_or_else(|| WalletError::PaymentFailed("no wallet extension found".to_string()))?;

        debug!(
            attempt_id = %pending.attempt_id,
            provider = descriptor.name,
            "Requesting extension signature"
        );
        let signature = injected
            .sign_and_send_transaction(&pending.transaction)
            .await
            .map_err(|e| map_call_error(descriptor.name, e))?;
        Ok(SignOutcome::Submitted { signature })
    }
}

/// Deep-link channel to a wallet app.
pub struct DeepLinkChannel {
    linker: Arc<dyn Linker>,
    app: AppConfig,
    cluster: Cluster,
}

impl DeepLinkChannel {
    pub fn new(linker: Arc<dyn Linker>, app: AppConfig, cluster: Cluster) -> Self {
        Self { linker, app, cluster }
    }

    async fn open(&self, provider: &str, url: &str) -> WalletResult<()> {
        self.linker
            .open_url(url)
            .await
            .map_err(|e| WalletError::provider(provider, format!("failed to open link: {}", e)))
    }
}

#[async_trait]
impl SigningChannel for DeepLinkChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::DeepLink
    }

    async fn connect(&self, provider: &'static WalletProviderDescriptor) -> WalletResult<ConnectOutcome> {
        let app_url = format!("{}://", provider.uri_scheme);
        if !self.linker.can_open_url(&app_url).await {
            info!(provider = provider.name, "Wallet app not installed, opening install page");
            self.open(provider.name, provider.install_url).await?;
            return Ok(ConnectOutcome::InstallRedirect {
                url: provider.install_url.to_string(),
            });
        }

        let url = build_connect_url(provider, &self.app, self.cluster)
            .map_err(|e| WalletError::provider(provider.name, format!("bad connect URL: {}", e)))?;
        self.open(provider.name, &url).await?;
        Ok(ConnectOutcome::AwaitingCallback { url })
    }

    async fn disconnect(&self, _provider: Option<&'static WalletProviderDescriptor>) {}

    async fn sign(&self, pending: &PendingTransaction) -> WalletResult<SignOutcome> {
        let name = self.app.signing_provider.as_str();
        let sign_base = find_provider(name)
            .and_then(|p| p.sign_url)
            .ok_or_else(|| WalletError::provider(name, "does not support deep-link signing"))?;

        let url = build_sign_url(sign_base, &pending.transaction.to_base64(), &self.app.app_scheme)
            .map_err(|e| WalletError::provider(name, format!("bad sign URL: {}", e)))?;

        debug!(attempt_id = %pending.attempt_id, provider = name, "Handing transaction to wallet app");
        self.open(name, &url).await?;
        Ok(SignOutcome::Pending { url })
    }
}
