//! Encrypted at-rest storage for native platforms.
//!
//! # Security
//! - Each entry is sealed with ChaCha20-Poly1305 under a per-device key
//! - The storage key name is bound as associated data, so entries cannot be
//!   swapped between keys
//! - The device key lives in its own file outside the entry directory and
//!   is zeroized after use
//! - A copy of the entry directory reveals no address without that key

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use zeroize::Zeroizing;

use crate::codec::Address;
use crate::session::{is_valid_key, parse_stored, SessionError, SessionResult, SessionStore};

const ENTRY_EXTENSION: &str = "sealed";
const SEAL_VERSION: u32 = 1;
const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

#[derive(Debug, Serialize, Deserialize)]
struct SealedEntry {
    version: u32,
    nonce: String,
    ciphertext: String,
}

#[derive(Debug, Clone)]
pub struct SecureStorage {
    dir: PathBuf,
    key_file: PathBuf,
}

impl SecureStorage {
    /// Entries go to `dir`, the device key to `key_file`.
    ///
    /// Fails if `key_file` sits inside `dir`.
    pub fn new(dir: PathBuf, key_file: PathBuf) -> SessionResult<Self> {
        if key_file.starts_with(&dir) {
            return Err(SessionError::KeyLocation(format!(
                "{} is inside the entry directory {}",
                key_file.display(),
                dir.display()
            )));
        }
        Ok(Self { dir, key_file })
    }

    fn entry_path(&self, key: &str) -> SessionResult<PathBuf> {
        if !is_valid_key(key) {
            return Err(SessionError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.{}", key, ENTRY_EXTENSION)))
    }

    /// Load the device key, creating it on first use.
    async fn device_key(&self) -> SessionResult<Zeroizing<[u8; KEY_LEN]>> {
        let path = &self.key_file;
        match fs::read(path).await {
            Ok(bytes) => {
                let bytes = Zeroizing::new(bytes);
                let key: [u8; KEY_LEN] = bytes.as_slice().try_into().map_err(|_| {
                    SessionError::Corrupt(format!("{} has wrong length", path.display()))
                })?;
                Ok(Zeroizing::new(key))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let mut key = Zeroizing::new([0u8; KEY_LEN]);
                OsRng.fill_bytes(&mut key[..]);
                write_private(path, &key[..]).await?;
                tracing::debug!(path = %path.display(), "Created device storage key");
                Ok(key)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn seal(key: &[u8; KEY_LEN], aad: &str, plaintext: &[u8]) -> SessionResult<SealedEntry> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let cipher = ChaCha20Poly1305::new(Key::from_slice(key));
        let ciphertext = cipher
            .encrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: plaintext,
                    aad: aad.as_bytes(),
                },
            )
            .map_err(|e| SessionError::Encryption(e.to_string()))?;

        Ok(SealedEntry {
            version: SEAL_VERSION,
            nonce: BASE64.encode(nonce),
            ciphertext: BASE64.encode(ciphertext),
        })
    }

    fn unseal(key: &[u8; KEY_LEN], aad: &str, entry: &SealedEntry) -> SessionResult<Zeroizing<Vec<u8>>> {
        if entry.version != SEAL_VERSION {
            return Err(SessionError::Corrupt(format!(
                "unsupported entry version {}",
                entry.version
            )));
        }
        let nonce = BASE64
            .decode(&entry.nonce)
            .map_err(|e| SessionError::Corrupt(format!("invalid nonce encoding: {}", e)))?;
        if nonce.len() != NONCE_LEN {
            return Err(SessionError::Corrupt(format!(
                "invalid nonce length: expected {}, found {}",
                NONCE_LEN,
                nonce.len()
            )));
        }
        let ciphertext = BASE64
            .decode(&entry.ciphertext)
            .map_err(|e| SessionError::Corrupt(format!("invalid ciphertext encoding: {}", e)))?;

        let cipher = ChaCha20Poly1305::new(Key::from_slice(key));
        let plaintext = cipher
            .decrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: &ciphertext,
                    aad: aad.as_bytes(),
                },
            )
            .map_err(|_| SessionError::Encryption("entry authentication failed".into()))?;
        Ok(Zeroizing::new(plaintext))
    }
}

#[async_trait]
impl SessionStore for SecureStorage {
    async fn get(&self, key: &str) -> SessionResult<Option<Address>> {
        let path = self.entry_path(key)?;
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let entry: SealedEntry = serde_json::from_slice(&bytes)
            .map_err(|e| SessionError::Corrupt(format!("{}: {}", path.display(), e)))?;

        let device_key = self.device_key().await?;
        let plaintext = Self::unseal(&device_key, key, &entry)?;
        let raw = std::str::from_utf8(&plaintext)
            .map_err(|_| SessionError::Corrupt("entry is not UTF-8".into()))?;
        Ok(parse_stored(key, raw))
    }

    async fn set(&self, key: &str, address: &Address) -> SessionResult<()> {
        let path = self.entry_path(key)?;
        let device_key = self.device_key().await?;
        let entry = Self::seal(&device_key, key, address.as_str().as_bytes())?;
        let bytes = serde_json::to_vec(&entry).map_err(|e| SessionError::Corrupt(e.to_string()))?;
        write_private(&path, &bytes).await
    }

    async fn delete(&self, key: &str) -> SessionResult<()> {
        let path = self.entry_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Write via a temp file and rename, owner-only on unix.
async fn write_private(path: &Path, bytes: &[u8]) -> SessionResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes).await?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600)).await?;
    }
    fs::rename(&tmp, path).await?;
    Ok(())
}
