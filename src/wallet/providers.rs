//! Static catalog of supported wallets.

use serde::Serialize;

/// Injected-extension family a wallet belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionFlag {
    /// `isPhantom`, found at `phantom.solana` or `solana`.
    Phantom,
    /// `isSolflare`, found at `solflare`.
    Solflare,
}

/// How a wallet's connect link is shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkStyle {
    /// `/ul/v1/connect?app_url=…&redirect_link=…&cluster=…`, answers with a callback.
    UniversalLink,
    /// Opens the dapp inside the wallet's browser; no callback.
    DappBrowser,
}

/// One catalog entry. Read-only configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletProviderDescriptor {
    pub name: &'static str,
    pub icon_glyph: &'static str,
    pub uri_scheme: &'static str,
    pub connect_base_url: &'static str,
    pub popular: bool,
    pub install_url: &'static str,
    pub sign_url: Option<&'static str>,
    pub link_style: LinkStyle,
    pub extension: Option<ExtensionFlag>,
}

pub static WALLET_PROVIDERS: [WalletProviderDescriptor; 5] = [
    WalletProviderDescriptor {
        name: "Phantom",
        icon_glyph: "👻",
        uri_scheme: "phantom",
        connect_base_url: "https://phantom.app/ul/v1/connect",
        popular: true,
        install_url: "https://phantom.app/download",
        sign_url: Some("https://phantom.app/ul/v1/signAndSendTransaction"),
        link_style: LinkStyle::UniversalLink,
        extension: Some(ExtensionFlag::Phantom),
    },
    WalletProviderDescriptor {
        name: "Solflare",
        icon_glyph: "🔥",
        uri_scheme: "solflare",
        connect_base_url: "https://solflare.com/ul/v1/connect",
        popular: true,
        install_url: "https://solflare.com/download",
        sign_url: Some("https://solflare.com/ul/v1/signAndSendTransaction"),
        link_style: LinkStyle::UniversalLink,
        extension: Some(ExtensionFlag::Solflare),
    },
    WalletProviderDescriptor {
        name: "MetaMask",
        icon_glyph: "🦊",
        uri_scheme: "metamask",
        connect_base_url: "https://metamask.app.link/dapp/soltix.app",
        popular: true,
        install_url: "https://metamask.io/download/",
        sign_url: None,
        link_style: LinkStyle::DappBrowser,
        extension: None,
    },
    WalletProviderDescriptor {
        name: "Backpack",
        icon_glyph: "🎒",
        uri_scheme: "backpack",
        connect_base_url: "https://backpack.app/ul/v1/connect",
        popular: false,
        install_url: "https://backpack.app/downloads",
        sign_url: Some("https://backpack.app/ul/v1/signAndSendTransaction"),
        link_style: LinkStyle::UniversalLink,
        extension: None,
    },
    WalletProviderDescriptor {
        name: "Glow",
        icon_glyph: "✨",
        uri_scheme: "glow",
        connect_base_url: "glow://connect",
        popular: false,
        install_url: "https://glow.app/download",
        sign_url: None,
        link_style: LinkStyle::UniversalLink,
        extension: None,
    },
];

/// Case-insensitive lookup by name.
pub fn find_provider(name: &str) -> Option<&'static WalletProviderDescriptor> {
    WALLET_PROVIDERS
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
}

pub fn popular_providers() -> impl Iterator<Item = &'static WalletProviderDescriptor> {
    WALLET_PROVIDERS.iter().filter(|p| p.popular)
}
