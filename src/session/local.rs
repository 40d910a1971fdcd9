//! Browser-style key/value storage.
//!
//! One JSON object per directory, values stored in plain text. When no
//! backend exists (server-side render, storage disabled) every operation is
//! a successful no-op.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::fs;

use crate::codec::Address;
use crate::session::{parse_stored, SessionError, SessionResult, SessionStore};

const STORAGE_FILE: &str = "local_storage.json";

#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: Option<PathBuf>,
}

impl LocalStorage {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            path: Some(dir.join(STORAGE_FILE)),
        }
    }

    /// Storage that silently stores nothing.
    pub fn unavailable() -> Self {
        Self { path: None }
    }

    pub fn is_available(&self) -> bool {
        self.path.is_some()
    }

    async fn load(&self, path: &PathBuf) -> SessionResult<BTreeMap<String, String>> {
        match fs::read(path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| SessionError::Corrupt(format!("{}: {}", path.display(), e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, path: &PathBuf, map: &BTreeMap<String, String>) -> SessionResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(map)
            .map_err(|e| SessionError::Corrupt(e.to_string()))?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, bytes).await?;
        fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for LocalStorage {
    async fn get(&self, key: &str) -> SessionResult<Option<Address>> {
        let Some(path) = &self.path else {
            return Ok(None);
        };
        let map = self.load(path).await?;
        Ok(map.get(key).and_then(|raw| parse_stored(key, raw)))
    }

    async fn set(&self, key: &str, address: &Address) -> SessionResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let mut map = self.load(path).await?;
        map.insert(key.to_string(), address.to_string());
        self.save(path, &map).await
    }

    async fn delete(&self, key: &str) -> SessionResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let mut map = self.load(path).await?;
        if map.remove(key).is_some() {
            self.save(path, &map).await?;
        }
        Ok(())
    }
}
