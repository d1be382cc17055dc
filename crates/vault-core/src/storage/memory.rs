//! In-memory salt store, lost when the process exits

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::SaltStore;
use crate::crypto::Salt;
use crate::error::Result;

/// Volatile salt store backed by a `HashMap`
#[derive(Debug, Default)]
pub struct MemorySaltStore {
    salts: RwLock<HashMap<String, Salt>>,
}

impl MemorySaltStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SaltStore for MemorySaltStore {
    async fn get_salt(&self, id: &str) -> Result<Option<Salt>> {
        Ok(self.salts.read().await.get(id).copied())
    }

    async fn set_salt(&self, id: &str, salt: Salt) -> Result<()> {
        self.salts.write().await.insert(id.to_string(), salt);
        Ok(())
    }

    async fn remove_salt(&self, id: &str) -> Result<()> {
        self.salts.write().await.remove(id);
        Ok(())
    }

    async fn list_ids(&self) -> Result<Vec<String>> {
        Ok(self.salts.read().await.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::generate_salt;

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = MemorySaltStore::new();
        let salt = generate_salt();

        assert_eq!(store.get_salt("user-1").await.unwrap(), None);

        store.set_salt("user-1", salt).await.unwrap();
        assert_eq!(store.get_salt("user-1").await.unwrap(), Some(salt));
        assert_eq!(store.list_ids().await.unwrap(), vec!["user-1".to_string()]);

        store.remove_salt("user-1").await.unwrap();
        assert_eq!(store.get_salt("user-1").await.unwrap(), None);

        // Removing twice is fine
        store.remove_salt("user-1").await.unwrap();
    }

    #[tokio::test]
    async fn test_set_replaces() {
        let store = MemorySaltStore::new();
        let first = generate_salt();
        let second = generate_salt();

        store.set_salt("item", first).await.unwrap();
        store.set_salt("item", second).await.unwrap();

        assert_eq!(store.get_salt("item").await.unwrap(), Some(second));
    }
}
