//! Vault item types
//!
//! A `VaultItem` is the row the storage layer persists: display metadata in
//! the clear plus one encrypted record. Only `PlaintextRecord` fields are
//! secret.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::codec::{EncryptedRecord, PlaintextRecord};
use crate::crypto::Salt;
use crate::error::{Result, VaultError};
use crate::storage::SaltStore;

/// Longest accepted title, in characters
pub const MAX_TITLE_LEN: usize = 100;

/// Longest accepted tag, in characters
pub const MAX_TAG_LEN: usize = 50;

/// Stored vault item (encrypted)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultItem {
    /// Unique identifier
    pub id: Uuid,

    /// Owning user
    pub user_id: String,

    /// Display title, stored in the clear
    pub title: String,

    /// Base64 ciphertext, tag excluded
    pub encrypted_data: String,

    /// Base64 nonce
    pub iv: String,

    /// Base64 authentication tag
    pub auth_tag: String,

    /// Base64 salt; absent on rows written before salts travelled with items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,

    /// Tags for categorization
    #[serde(default)]
    pub tags: Vec<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VaultItem {
    /// Create a new item around an encrypted record
    pub fn new(
        user_id: &str,
        title: &str,
        tags: Vec<String>,
        record: EncryptedRecord,
    ) -> Result<Self> {
        let title = title.trim();
        validate_metadata(title, &tags)?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            encrypted_data: record.encrypted_data,
            iv: record.iv,
            auth_tag: record.auth_tag,
            salt: Some(record.salt),
            tags,
            created_at: now,
            updated_at: now,
        })
    }

    /// Swap in a re-encrypted record
    pub fn replace_record(&mut self, record: EncryptedRecord) {
        self.encrypted_data = record.encrypted_data;
        self.iv = record.iv;
        self.auth_tag = record.auth_tag;
        self.salt = Some(record.salt);
        self.updated_at = Utc::now();
    }

    /// Update title and tags
    pub fn update_metadata(&mut self, title: &str, tags: Vec<String>) -> Result<()> {
        let title = title.trim();
        validate_metadata(title, &tags)?;

        self.title = title.to_string();
        self.tags = tags;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Build the wire record using an explicit salt
    pub fn record_with_salt(&self, salt: &Salt) -> EncryptedRecord {
        EncryptedRecord {
            encrypted_data: self.encrypted_data.clone(),
            iv: self.iv.clone(),
            auth_tag: self.auth_tag.clone(),
            salt: salt.to_base64(),
        }
    }

    /// Resolve the salt and build the wire record
    ///
    /// Lookup order: the item's own salt, then the store under the item id,
    /// then the store under the owning user id.
    pub async fn to_record(&self, salts: &dyn SaltStore) -> Result<EncryptedRecord> {
        if let Some(salt) = &self.salt {
            return Ok(EncryptedRecord {
                encrypted_data: self.encrypted_data.clone(),
                iv: self.iv.clone(),
                auth_tag: self.auth_tag.clone(),
                salt: salt.clone(),
            });
        }

        if let Some(salt) = salts.get_salt(&self.id.to_string()).await? {
            return Ok(self.record_with_salt(&salt));
        }

        if let Some(salt) = salts.get_salt(&self.user_id).await? {
            debug!("Item {} falls back to the account salt", self.id);
            return Ok(self.record_with_salt(&salt));
        }

        Err(VaultError::MissingSalt(self.id.to_string()))
    }
}

/// Decrypted vault item - the secret part is zeroed when dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptedVaultItem {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub tags: Vec<String>,
    pub data: PlaintextRecord,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DecryptedVaultItem {
    pub(crate) fn from_item(item: &VaultItem, data: PlaintextRecord) -> Self {
        Self {
            id: item.id,
            user_id: item.user_id.clone(),
            title: item.title.clone(),
            tags: item.tags.clone(),
            data,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

fn validate_metadata(title: &str, tags: &[String]) -> Result<()> {
    if title.is_empty() {
        return Err(VaultError::InvalidInput("Title is required".to_string()));
    }

    if title.chars().count() > MAX_TITLE_LEN {
        return Err(VaultError::InvalidInput(format!(
            "Title cannot exceed {} characters",
            MAX_TITLE_LEN
        )));
    }

    if tags.iter().any(|tag| tag.chars().count() > MAX_TAG_LEN) {
        return Err(VaultError::InvalidInput(format!(
            "Tags cannot exceed {} characters",
            MAX_TAG_LEN
        )));
    }

    Ok(())
}
