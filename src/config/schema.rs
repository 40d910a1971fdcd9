//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the wallet
//! client. All types derive Serde traits for deserialization from TOML.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::chain::types::{Cluster, Commitment};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WalletConfig {
    /// Dapp identity, platform and wallet preferences.
    pub app: AppConfig,

    /// Chain RPC settings.
    pub chain: ChainConfig,

    /// Session persistence settings.
    pub storage: StorageConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Runtime environment; selects the signing channel and session store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Browser with injected extension wallets.
    Web,
    /// Native app using deep-link round trips.
    #[default]
    Mobile,
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "web" => Ok(Platform::Web),
            "mobile" | "ios" | "android" => Ok(Platform::Mobile),
            other => Err(format!("unknown platform '{}'", other)),
        }
    }
}

/// Dapp and wallet preferences.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Public URL identifying the dapp to wallets.
    pub app_url: String,

    /// URI scheme deep-link callbacks return to (e.g. `soltix://onConnect`).
    pub app_scheme: String,

    pub platform: Platform,

    /// Storage key holding the connected address.
    pub session_key: String,

    /// Wallet used for deep-link signing.
    pub signing_provider: String,

    /// Extension lookup order when several are injected.
    pub provider_priority: Vec<String>,

    /// Schemes the console linker reports as launchable.
    pub installed_schemes: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_url: "https://soltix.app".to_string(),
            app_scheme: "soltix".to_string(),
            platform: Platform::Mobile,
            session_key: "soltix_wallet_address".to_string(),
            signing_provider: "Phantom".to_string(),
            provider_priority: vec!["Phantom".to_string(), "Solflare".to_string()],
            installed_schemes: Vec::new(),
        }
    }
}

/// Chain RPC configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Target cluster.
    pub network: Cluster,

    /// JSON-RPC endpoint URL. Defaults to the cluster's public endpoint.
    pub rpc_url: Option<String>,

    /// Failover JSON-RPC endpoint URLs.
    pub failover_urls: Vec<String>,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Commitment used for reads and confirmation.
    pub commitment: Commitment,

    /// First delay between confirmation polls in milliseconds.
    pub confirm_poll_base_ms: u64,

    /// Ceiling for the confirmation poll delay in milliseconds.
    pub confirm_poll_max_ms: u64,
}

impl ChainConfig {
    /// Configured RPC URL or the cluster default.
    pub fn effective_rpc_url(&self) -> String {
        self.rpc_url
            .clone()
            .unwrap_or_else(|| self.network.default_rpc_url().to_string())
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            network: Cluster::Devnet,
            rpc_url: None,
            failover_urls: Vec::new(),
            rpc_timeout_secs: 10,
            commitment: Commitment::Confirmed,
            confirm_poll_base_ms: 500,
            confirm_poll_max_ms: 4000,
        }
    }
}

/// Session persistence configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for session files. Defaults to the platform data dir.
    pub dir: Option<PathBuf>,

    /// Device key for the mobile store. Must live outside `dir`.
    /// Defaults to `<config dir>/soltix-keys/device.key`.
    pub key_file: Option<PathBuf>,

    /// On web, whether a storage backend exists at all.
    pub web_storage_available: bool,
}

impl StorageConfig {
    /// Configured directory, else `<data dir>/soltix`.
    pub fn resolved_dir(&self) -> Option<PathBuf> {
        self.dir
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join("soltix")))
    }

    pub fn resolved_key_file(&self) -> Option<PathBuf> {
        self.key_file.clone().or_else(|| {
            dirs::config_dir().map(|d| d.join("soltix-keys").join("device.key"))
        })
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: None,
            key_file: None,
            web_storage_available: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of human-readable output.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WalletConfig::default();
        assert_eq!(config.app.platform, Platform::Mobile);
        assert_eq!(config.app.session_key, "soltix_wallet_address");
        assert_eq!(config.chain.network, Cluster::Devnet);
        assert_eq!(config.chain.effective_rpc_url(), "https://api.devnet.solana.com");
        assert!(config.storage.web_storage_available);
    }

    #[test]
    fn test_partial_toml() {
        let config: WalletConfig = toml::from_str(
            r#"
            [app]
            platform = "web"

            [chain]
            network = "mainnet-beta"
            rpc_url = "https://rpc.example.com"
            "#,
        )
        .unwrap();
        assert_eq!(config.app.platform, Platform::Web);
        assert_eq!(config.app.app_scheme, "soltix");
        assert_eq!(config.chain.network, Cluster::MainnetBeta);
        assert_eq!(config.chain.effective_rpc_url(), "https://rpc.example.com");
        assert_eq!(config.chain.rpc_timeout_secs, 10);
    }
}
