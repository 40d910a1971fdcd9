//! Wires the wallet subsystem from configuration.

use std::sync::Arc;
use tracing::info;

use crate::chain::{Chain, ChainGateway};
use crate::config::{Platform, WalletConfig};
use crate::session::open_session_store;
use crate::wallet::channel::{DeepLinkChannel, ExtensionChannel, SigningChannel};
use crate::wallet::connection::ConnectionOrchestrator;
use crate::wallet::context::WalletContext;
use crate::wallet::deeplink::Linker;
use crate::wallet::detector::{ProviderDetector, ProviderHost};
use crate::wallet::payment::PaymentOrchestrator;
use crate::wallet::WalletResult;

/// Everything a wallet front end needs, built once at startup.
pub struct WalletRuntime {
    pub context: WalletContext,
    pub connection: ConnectionOrchestrator,
    pub payment: PaymentOrchestrator,
    pub gateway: Arc<ChainGateway>,
}

/// Pick the signing channel for a platform.
pub fn select_channel(
    config: &WalletConfig,
    host: Arc<dyn ProviderHost>,
    linker: Arc<dyn Linker>,
) -> Arc<dyn SigningChannel> {
    match config.app.platform {
        Platform::Web => Arc::new(ExtensionChannel::new(
            ProviderDetector::new(host),
            config.app.provider_priority.clone(),
            linker,
        )),
        Platform::Mobile => Arc::new(DeepLinkChannel::new(
            linker,
            config.app.clone(),
            config.chain.network,
        )),
    }
}

impl WalletRuntime {
    pub fn new(
        config: &WalletConfig,
        host: Arc<dyn ProviderHost>,
        linker: Arc<dyn Linker>,
    ) -> WalletResult<Self> {
        let gateway = Arc::new(ChainGateway::new(config.chain.clone())?);
        let chain: Arc<dyn Chain> = gateway.clone();
        let channel = select_channel(config, host, linker);
        let store = open_session_store(config.app.platform, &config.storage)?;

        info!(
            platform = ?config.app.platform,
            channel = channel.kind().as_str(),
            network = config.chain.network.as_str(),
            "Wallet runtime ready"
        );

        Ok(Self {
            context: WalletContext::new(config.app.clone()),
            connection: ConnectionOrchestrator::new(chain.clone(), store, channel.clone()),
            payment: PaymentOrchestrator::new(chain, channel),
            gateway,
        })
    }
}
