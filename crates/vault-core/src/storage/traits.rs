//! Storage trait definitions

use crate::crypto::Salt;
use crate::error::Result;
use async_trait::async_trait;

/// Explicit home for salts that are not carried by the record itself
///
/// Ids are opaque to the store: callers use a user id for an account-wide
/// salt or a record id for a per-record one.
#[async_trait]
pub trait SaltStore: Send + Sync {
    /// Look up the salt stored under `id`
    async fn get_salt(&self, id: &str) -> Result<Option<Salt>>;

    /// Store (or replace) the salt for `id`
    async fn set_salt(&self, id: &str, salt: Salt) -> Result<()>;

    /// Remove the salt for `id`; removing a missing id is not an error
    async fn remove_salt(&self, id: &str) -> Result<()>;

    /// All ids with a stored salt
    async fn list_ids(&self) -> Result<Vec<String>>;
}
