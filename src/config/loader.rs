//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::WalletConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Network override (`devnet`, `testnet`, `mainnet-beta`).
pub const NETWORK_ENV_VAR: &str = "SOLTIX_NETWORK";
/// RPC URL override.
pub const RPC_URL_ENV_VAR: &str = "SOLTIX_RPC_URL";
/// Platform override (`web`, `mobile`).
pub const PLATFORM_ENV_VAR: &str = "SOLTIX_PLATFORM";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { var: &'static str, message: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { var, message } => write!(f, "Invalid {}: {}", var, message),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load, apply environment overrides and validate configuration.
///
/// Without a path, starts from defaults.
pub fn load_config(path: Option<&Path>) -> Result<WalletConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        }
        None => WalletConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply `SOLTIX_*` overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut WalletConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(network) = lookup(NETWORK_ENV_VAR) {
        config.chain.network = network.parse().map_err(|e: crate::chain::ChainError| {
            ConfigError::Env {
                var: NETWORK_ENV_VAR,
                message: e.to_string(),
            }
        })?;
    }
    if let Some(rpc_url) = lookup(RPC_URL_ENV_VAR) {
        config.chain.rpc_url = Some(rpc_url);
    }
    if let Some(platform) = lookup(PLATFORM_ENV_VAR) {
        config.app.platform = platform.parse().map_err(|message| ConfigError::Env {
            var: PLATFORM_ENV_VAR,
            message,
        })?;
    }
    Ok(())
}
