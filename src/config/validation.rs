//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check URLs parse and timeouts are positive
//! - Check wallet names refer to catalog entries
//! - Check the session key and device key location suit every storage backend
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: WalletConfig → Result<(), Vec<ValidationError>>

use std::fmt;

use crate::config::schema::WalletConfig;
use crate::session::is_valid_key;
use crate::wallet::providers::find_provider;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &WalletConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if url::Url::parse(&config.app.app_url).is_err() {
        errors.push(ValidationError::new("app.app_url", "not a valid URL"));
    }

    let scheme = &config.app.app_scheme;
    if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.') {
        errors.push(ValidationError::new(
            "app.app_scheme",
            "must be non-empty and contain only letters, digits, '-' or '.'",
        ));
    }

    if !is_valid_key(&config.app.session_key) {
        errors.push(ValidationError::new(
            "app.session_key",
            "must be non-empty, use only letters, digits, '.', '-' or '_', and not start with '.'",
        ));
    }

    match find_provider(&config.app.signing_provider) {
        Some(provider) if provider.sign_url.is_some() => {}
        Some(_) => errors.push(ValidationError::new(
            "app.signing_provider",
            format!("{} does not support deep-link signing", config.app.signing_provider),
        )),
        None => errors.push(ValidationError::new(
            "app.signing_provider",
            format!("unknown wallet '{}'", config.app.signing_provider),
        )),
    }

    for name in &config.app.provider_priority {
        match find_provider(name) {
            Some(provider) if provider.extension.is_some() => {}
            _ => errors.push(ValidationError::new(
                "app.provider_priority",
                format!("'{}' is not an extension wallet", name),
            )),
        }
    }

    let rpc_url = config.chain.effective_rpc_url();
    if url::Url::parse(&rpc_url).is_err() {
        errors.push(ValidationError::new("chain.rpc_url", format!("invalid URL '{}'", rpc_url)));
    }
    for failover in &config.chain.failover_urls {
        if url::Url::parse(failover).is_err() {
            errors.push(ValidationError::new(
                "chain.failover_urls",
                format!("invalid URL '{}'", failover),
            ));
        }
    }

    if config.chain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("chain.rpc_timeout_secs", "must be greater than 0"));
    }
    if config.chain.confirm_poll_base_ms == 0 {
        errors.push(ValidationError::new("chain.confirm_poll_base_ms", "must be greater than 0"));
    }
    if config.chain.confirm_poll_base_ms > config.chain.confirm_poll_max_ms {
        errors.push(ValidationError::new(
            "chain.confirm_poll_max_ms",
            "must be at least confirm_poll_base_ms",
        ));
    }

    let storage = &config.storage;
    if let (Some(dir), Some(key_file)) = (storage.resolved_dir(), storage.resolved_key_file()) {
        if key_file.starts_with(&dir) {
            errors.push(ValidationError::new(
                "storage.key_file",
                "must not be inside the session directory",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&WalletConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = WalletConfig::default();
        config.app.app_scheme = "sol tix".to_string();
        config.app.signing_provider = "MetaMask".to_string();
        config.app.provider_priority.push("Glow".to_string());
        config.chain.rpc_timeout_secs = 0;
        config.chain.confirm_poll_base_ms = 5000;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "app.app_scheme",
                "app.signing_provider",
                "app.provider_priority",
                "chain.rpc_timeout_secs",
                "chain.confirm_poll_max_ms",
            ]
        );
    }

    #[test]
    fn test_bad_urls() {
        let mut config = WalletConfig::default();
        config.chain.rpc_url = Some("nope".to_string());
        config.chain.failover_urls.push("also nope".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].to_string().starts_with("chain.rpc_url"));
    }

    #[test]
    fn test_session_key_alphabet() {
        for bad in ["", "   ", "../wallet", "my key", ".hidden", "a/b"] {
            let mut config = WalletConfig::default();
            config.app.session_key = bad.to_string();
            let errors = validate_config(&config).unwrap_err();
            assert_eq!(errors[0].field, "app.session_key", "{bad:?} accepted");
        }

        let mut config = WalletConfig::default();
        config.app.session_key = "soltix.wallet-address_v2".to_string();
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_key_file_inside_session_dir() {
        let mut config = WalletConfig::default();
        config.storage.dir = Some("/var/lib/soltix".into());
        config.storage.key_file = Some("/var/lib/soltix/device.key".into());
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "storage.key_file");

        config.storage.key_file = Some("/etc/soltix/device.key".into());
        assert_eq!(validate_config(&config), Ok(()));
    }
}
