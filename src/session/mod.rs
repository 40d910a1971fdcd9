//! Session persistence subsystem.
//!
//! # Data Flow
//! ```text
//! Platform (from config, fixed at startup)
//!     → Web:    local.rs  (plain key/value file, no-op when unavailable)
//!     → Mobile: secure.rs (ChaCha20-Poly1305 sealed entries, key kept apart)
//!     → Box<dyn SessionStore> owned by the connection orchestrator
//! ```
//!
//! # Constraints
//! - Exactly one backend is active per process
//! - Values are canonical addresses; anything else read back is discarded
//! - Callers treat storage as best-effort

pub mod local;
pub mod secure;

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::codec::Address;
use crate::config::{Platform, StorageConfig};

pub use local::LocalStorage;
pub use secure::SecureStorage;

/// Errors from a storage backend.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage encryption error: {0}")]
    Encryption(String),

    #[error("corrupt storage entry: {0}")]
    Corrupt(String),

    #[error("invalid storage key '{0}'")]
    InvalidKey(String),

    #[error("device key location rejected: {0}")]
    KeyLocation(String),
}

/// Result type for storage operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Persistence of the connected wallet address.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stored address, or `None` if absent or unreadable as an address.
    async fn get(&self, key: &str) -> SessionResult<Option<Address>>;

    async fn set(&self, key: &str, address: &Address) -> SessionResult<()>;

    async fn delete(&self, key: &str) -> SessionResult<()>;
}

/// Open the backend for `platform`.
pub fn open_session_store(
    platform: Platform,
    config: &StorageConfig,
) -> SessionResult<Box<dyn SessionStore>> {
    let dir = config.resolved_dir();
    let store: Box<dyn SessionStore> = match platform {
        Platform::Web => match dir {
            Some(dir) if config.web_storage_available => Box::new(LocalStorage::new(dir)),
            _ => {
                tracing::info!("Web storage unavailable; session persistence disabled");
                Box::new(LocalStorage::unavailable())
            }
        },
        Platform::Mobile => {
            let dir = dir.unwrap_or_else(|| PathBuf::from(".soltix"));
            let key_file = config
                .resolved_key_file()
                .unwrap_or_else(|| PathBuf::from(".soltix-keys").join("device.key"));
            Box::new(SecureStorage::new(dir, key_file)?)
        }
    };
    Ok(store)
}

/// Key alphabet accepted by native secure stores: `[A-Za-z0-9._-]`, no
/// leading dot.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
}

/// Re-validate a raw stored value; tampered or stale values read as absent.
pub(crate) fn parse_stored(key: &str, raw: &str) -> Option<Address> {
    match Address::parse(raw) {
        Ok(address) => Some(address),
        Err(e) => {
            tracing::warn!(key, error = %e, "Discarding invalid stored address");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_platform_selects_backend() {
        let dir = tempfile::tempdir().unwrap();
        let keys = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            dir: Some(dir.path().to_path_buf()),
            key_file: Some(keys.path().join("device.key")),
            web_storage_available: true,
        };
        let address = Address::from_bytes([3; 32]);

        for platform in [Platform::Web, Platform::Mobile] {
            let store = open_session_store(platform, &config).unwrap();
            store.set("wallet", &address).await.unwrap();
            assert_eq!(store.get("wallet").await.unwrap(), Some(address.clone()));
            store.delete("wallet").await.unwrap();
            assert_eq!(store.get("wallet").await.unwrap(), None);
        }
    }

    #[tokio::test]
    async fn test_web_without_storage_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            dir: Some(dir.path().to_path_buf()),
            web_storage_available: false,
            ..Default::default()
        };
        let store = open_session_store(Platform::Web, &config).unwrap();
        let address = Address::from_bytes([3; 32]);

        store.set("wallet", &address).await.unwrap();
        assert_eq!(store.get("wallet").await.unwrap(), None);
        store.delete("wallet").await.unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_mobile_key_stays_out_of_entry_dir() {
        let dir = tempfile::tempdir().unwrap();
        let keys = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            dir: Some(dir.path().to_path_buf()),
            key_file: Some(keys.path().join("device.key")),
            ..Default::default()
        };
        let store = open_session_store(Platform::Mobile, &config).unwrap();
        store.set("wallet", &Address::from_bytes([3; 32])).await.unwrap();

        assert!(keys.path().join("device.key").exists());
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["wallet.sealed".to_string()]);
    }

    #[test]
    fn test_key_alphabet() {
        assert!(is_valid_key("soltix_wallet_address"));
        assert!(is_valid_key("app-1.session"));
        for key in ["", ".hidden", "a/b", "../up", "with space", "ключ"] {
            assert!(!is_valid_key(key), "{key:?} accepted");
        }
    }

    #[test]
    fn test_mobile_rejects_key_inside_entry_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            dir: Some(dir.path().to_path_buf()),
            key_file: Some(dir.path().join("device.key")),
            ..Default::default()
        };
        assert!(matches!(
            open_session_store(Platform::Mobile, &config),
            Err(SessionError::KeyLocation(_))
        ));
    }
}
