//! File salt store
//!
//! Keeps salts as base64 strings in a JSON file in the user's data directory.
//! Salts are not secret, so the file is stored in the clear.

use async_trait::async_trait;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::SaltStore;
use crate::crypto::Salt;
use crate::error::{Result, VaultError};

/// File format for persistent storage
#[derive(Debug, Default, Serialize, Deserialize)]
struct SaltFile {
    version: u32,
    salts: BTreeMap<String, String>,
}

/// JSON-file backed salt store
pub struct FileSaltStore {
    /// Path to `salts.json`
    path: PathBuf,
    /// In-memory copy of the file
    cache: RwLock<BTreeMap<String, Salt>>,
}

impl FileSaltStore {
    /// Open (or create) the store in `dir`, loading any existing salts
    pub async fn open(dir: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(dir).await?;

        let store = Self {
            path: dir.join("salts.json"),
            cache: RwLock::new(BTreeMap::new()),
        };
        store.load().await?;

        debug!("Salt store initialized at: {:?}", store.path);
        Ok(store)
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<()> {
        if !self.path.exists() {
            debug!("No existing salt file found");
            return Ok(());
        }

        let contents = tokio::fs::read_to_string(&self.path).await?;
        let file: SaltFile = serde_json::from_str(&contents)?;

        let mut cache = self.cache.write().await;
        for (id, encoded) in file.salts {
            match Salt::from_base64(&encoded) {
                Ok(salt) => {
                    cache.insert(id, salt);
                }
                Err(_) => warn!("Ignoring malformed salt for id: {}", id),
            }
        }

        debug!("Loaded {} salts from storage", cache.len());
        Ok(())
    }

    async fn save(&self, cache: &BTreeMap<String, Salt>) -> Result<()> {
        let file = SaltFile {
            version: 1,
            salts: cache
                .iter()
                .map(|(id, salt)| (id.clone(), salt.to_base64()))
                .collect(),
        };

        let contents = serde_json::to_string_pretty(&file)?;

        // Write atomically using a temp file
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;

        debug!("Saved {} salts to storage", cache.len());
        Ok(())
    }
}

/// Default data directory shared by the salt store and settings
pub fn default_data_dir() -> Result<PathBuf> {
    ProjectDirs::from("com", "symbia-labs", "zk-vault")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| VaultError::StorageError("Could not determine data directory".to_string()))
}

#[async_trait]
impl SaltStore for FileSaltStore {
    async fn get_salt(&self, id: &str) -> Result<Option<Salt>> {
        Ok(self.cache.read().await.get(id).copied())
    }

    async fn set_salt(&self, id: &str, salt: Salt) -> Result<()> {
        let mut cache = self.cache.write().await;
        cache.insert(id.to_string(), salt);
        self.save(&cache).await?;

        debug!("Stored salt for: {}", id);
        Ok(())
    }

    async fn remove_salt(&self, id: &str) -> Result<()> {
        let mut cache = self.cache.write().await;

        if cache.remove(id).is_some() {
            self.save(&cache).await?;
            debug!("Removed salt for: {}", id);
        }

        Ok(())
    }

    async fn list_ids(&self) -> Result<Vec<String>> {
        Ok(self.cache.read().await.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::generate_salt;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_store_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSaltStore::open(temp_dir.path()).await.unwrap();
        let salt = generate_salt();

        store.set_salt("user:alice", salt).await.unwrap();

        assert_eq!(store.get_salt("user:alice").await.unwrap(), Some(salt));
        assert_eq!(store.get_salt("user:bob").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_persistence() {
        let temp_dir = TempDir::new().unwrap();
        let salt = generate_salt();

        {
            let store = FileSaltStore::open(temp_dir.path()).await.unwrap();
            store.set_salt("item-1", salt).await.unwrap();
        }

        {
            let store = FileSaltStore::open(temp_dir.path()).await.unwrap();
            assert_eq!(store.get_salt("item-1").await.unwrap(), Some(salt));
            assert_eq!(store.list_ids().await.unwrap(), vec!["item-1".to_string()]);
        }
    }

    #[tokio::test]
    async fn test_remove_persists() {
        let temp_dir = TempDir::new().unwrap();

        {
            let store = FileSaltStore::open(temp_dir.path()).await.unwrap();
            store.set_salt("a", generate_salt()).await.unwrap();
            store.set_salt("b", generate_salt()).await.unwrap();
            store.remove_salt("a").await.unwrap();
        }

        let store = FileSaltStore::open(temp_dir.path()).await.unwrap();
        assert_eq!(store.list_ids().await.unwrap(), vec!["b".to_string()]);
    }

    #[tokio::test]
    async fn test_salts_written_as_base64() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSaltStore::open(temp_dir.path()).await.unwrap();
        let salt = generate_salt();
        store.set_salt("user", salt).await.unwrap();

        let contents = std::fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&contents).unwrap();

        assert_eq!(value["version"], 1);
        assert_eq!(value["salts"]["user"], salt.to_base64());
    }

    #[tokio::test]
    async fn test_malformed_entries_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let salt = generate_salt();
        let contents = serde_json::json!({
            "version": 1,
            "salts": { "good": salt.to_base64(), "bad": "c2hvcnQ=" }
        });
        std::fs::write(temp_dir.path().join("salts.json"), contents.to_string()).unwrap();

        let store = FileSaltStore::open(temp_dir.path()).await.unwrap();
        assert_eq!(store.get_salt("good").await.unwrap(), Some(salt));
        assert_eq!(store.get_salt("bad").await.unwrap(), None);
    }
}
