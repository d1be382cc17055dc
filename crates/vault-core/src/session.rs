//! Unlock session
//!
//! Holds the master password for one unlock, read-only, and caches derived
//! keys per salt so that loading many records costs one key derivation per
//! distinct salt rather than one per record.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::codec::{ExportFile, PlaintextRecord, VaultCodec};
use crate::crypto::{CryptoProvider, DerivedKey, MasterPassword, Salt, SystemCrypto};
use crate::error::{Result, VaultError};
use crate::item::{DecryptedVaultItem, VaultItem};
use crate::storage::SaltStore;

/// One item that could not be opened during a batch load
#[derive(Debug)]
pub struct ItemFailure {
    pub id: Uuid,
    pub error: VaultError,
}

/// Result of loading many items: what opened, and what was skipped
#[derive(Debug, Default)]
pub struct BatchLoad {
    pub items: Vec<DecryptedVaultItem>,
    pub failures: Vec<ItemFailure>,
}

impl BatchLoad {
    /// Items whose title, username or url contains `query`, ignoring case
    pub fn search(&self, query: &str) -> Vec<&DecryptedVaultItem> {
        let query = query.to_lowercase();
        self.items
            .iter()
            .filter(|item| {
                item.title.to_lowercase().contains(&query)
                    || item.data.username.to_lowercase().contains(&query)
                    || item
                        .data
                        .url
                        .as_deref()
                        .is_some_and(|url| url.to_lowercase().contains(&query))
            })
            .collect()
    }
}

/// Secrets held while the session is unlocked
struct Unlocked {
    password: Arc<MasterPassword>,
    /// Derived keys by salt
    keys: HashMap<Salt, DerivedKey>,
}

/// Unlocked vault for one user
pub struct UnlockSession<P = SystemCrypto> {
    /// Session ID for logging
    session_id: Uuid,
    /// Owner of the items opened through this session
    user_id: String,
    codec: VaultCodec<P>,
    salts: Arc<dyn SaltStore>,
    /// `None` once locked; password and keys are dropped (and zeroed) together
    state: RwLock<Option<Unlocked>>,
    /// Auto-lock deadline; `None` never expires
    expires_at: Option<Instant>,
}

impl<P: CryptoProvider> UnlockSession<P> {
    /// Start a session with the master password the user just typed
    pub fn unlock(
        password: MasterPassword,
        codec: VaultCodec<P>,
        salts: Arc<dyn SaltStore>,
        user_id: &str,
        timeout: Option<Duration>,
    ) -> Self {
        let session_id = Uuid::new_v4();
        info!("Unlocked session {} for user {}", session_id, user_id);

        Self {
            session_id,
            user_id: user_id.to_string(),
            codec,
            salts,
            state: RwLock::new(Some(Unlocked {
                password: Arc::new(password),
                keys: HashMap::new(),
            })),
            expires_at: timeout.map(|t| Instant::now() + t),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn codec(&self) -> &VaultCodec<P> {
        &self.codec
    }

    /// Whether the auto-lock deadline has passed
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Time left before auto-lock; `None` if the session never expires
    pub fn remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub async fn is_locked(&self) -> bool {
        self.state.read().await.is_none()
    }

    /// Forget the password and every cached key
    pub async fn lock(&self) {
        *self.state.write().await = None;
        info!("Locked session {}", self.session_id);
    }

    /// Number of derived keys currently cached
    pub async fn cached_keys(&self) -> usize {
        self.state
            .read()
            .await
            .as_ref()
            .map_or(0, |unlocked| unlocked.keys.len())
    }

    /// Lock on the first use past the deadline
    async fn check_expiry(&self) -> Result<()> {
        if !self.is_expired() {
            return Ok(());
        }

        if !self.is_locked().await {
            debug!("Session {} expired", self.session_id);
            self.lock().await;
        }
        Err(VaultError::SessionExpired)
    }

    async fn password(&self) -> Result<Arc<MasterPassword>> {
        self.check_expiry().await?;

        self.state
            .read()
            .await
            .as_ref()
            .map(|unlocked| unlocked.password.clone())
            .ok_or(VaultError::SessionLocked)
    }

    /// Key for a salt, derived once per session
    ///
    /// A key derived while the session is locked is discarded, never cached.
    pub async fn key_for(&self, salt: &Salt) -> Result<DerivedKey> {
        self.check_expiry().await?;

        let password = {
            let state = self.state.read().await;
            let unlocked = state.as_ref().ok_or(VaultError::SessionLocked)?;
            if let Some(key) = unlocked.keys.get(salt) {
                return Ok(key.clone());
            }
            unlocked.password.clone()
        };

        let key = self.codec.derive_key(password.expose(), salt)?;

        let mut state = self.state.write().await;
        match state.as_mut() {
            Some(unlocked) if Arc::ptr_eq(&unlocked.password, &password) => {
                unlocked.keys.insert(*salt, key.clone());
                debug!("Cached key for salt in session {}", self.session_id);
                Ok(key)
            }
            _ => Err(VaultError::SessionLocked),
        }
    }

    /// Encrypt a record into a new vault item
    ///
    /// The record gets a fresh salt, which is also written to the salt store
    /// under the item id.
    pub async fn seal_item(
        &self,
        title: &str,
        tags: Vec<String>,
        record: &PlaintextRecord,
    ) -> Result<VaultItem> {
        let salt = self.codec.generate_salt();
        let key = self.key_for(&salt).await?;
        let encrypted = self.codec.encrypt_record_with_key(record, &key, &salt)?;

        let item = VaultItem::new(&self.user_id, title, tags, encrypted)?;
        self.salts.set_salt(&item.id.to_string(), salt).await?;

        info!("Sealed vault item {}", item.id);
        Ok(item)
    }

    /// Re-encrypt an existing item with new secret fields
    pub async fn reseal_item(&self, item: &mut VaultItem, record: &PlaintextRecord) -> Result<()> {
        let salt = self.codec.generate_salt();
        let key = self.key_for(&salt).await?;
        let encrypted = self.codec.encrypt_record_with_key(record, &key, &salt)?;

        item.replace_record(encrypted);
        self.salts.set_salt(&item.id.to_string(), salt).await?;

        info!("Resealed vault item {}", item.id);
        Ok(())
    }

    /// Decrypt one item
    pub async fn open_item(&self, item: &VaultItem) -> Result<DecryptedVaultItem> {
        let encrypted = item.to_record(self.salts.as_ref()).await?;
        let salt = encrypted.decode_salt()?;
        let key = self.key_for(&salt).await?;

        let data = self.codec.decrypt_record_with_key(&encrypted, &key)?;
        Ok(DecryptedVaultItem::from_item(item, data))
    }

    /// Decrypt many items, skipping (and logging) the ones that fail
    ///
    /// Fails as a whole only when the session itself is unusable, including
    /// when it locks or expires partway through.
    pub async fn load_items(&self, items: &[VaultItem]) -> Result<BatchLoad> {
        self.password().await?;

        let mut batch = BatchLoad::default();
        for item in items {
            match self.open_item(item).await {
                Ok(decrypted) => batch.items.push(decrypted),
                Err(error @ (VaultError::SessionLocked | VaultError::SessionExpired)) => {
                    warn!("Session {} unusable during batch load", self.session_id);
                    return Err(error);
                }
                Err(error) => {
                    warn!("Skipping vault item {}: {}", item.id, error);
                    batch.failures.push(ItemFailure { id: item.id, error });
                }
            }
        }

        info!(
            "Loaded {} vault items ({} skipped)",
            batch.items.len(),
            batch.failures.len()
        );
        Ok(batch)
    }

    /// Export records under the session password
    pub async fn export(&self, records: &[PlaintextRecord]) -> Result<ExportFile> {
        let password = self.password().await?;
        self.codec.export_bundle(records, password.expose())
    }

    /// Export items; unlike [`Self::load_items`] any unreadable item aborts
    pub async fn export_items(&self, items: &[VaultItem]) -> Result<ExportFile> {
        let mut records = Vec::with_capacity(items.len());
        for item in items {
            records.push(self.open_item(item).await?.data);
        }
        self.export(&records).await
    }

    /// Import an export file under the session password
    pub async fn import(&self, json: &str) -> Result<Vec<PlaintextRecord>> {
        let password = self.password().await?;
        self.codec.import_bundle(json, password.expose())
    }
}
