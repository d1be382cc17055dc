//! Secure memory handling with automatic zeroization

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length in bytes of an AES-256 key
pub const KEY_LEN: usize = 32;

/// Key derived from a master password and salt - automatically zeroed when dropped
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LEN],
}

impl DerivedKey {
    /// Create a derived key from raw bytes
    pub fn new(key: [u8; KEY_LEN]) -> Self {
        Self { key }
    }

    /// Get the key bytes (use carefully - avoid copying)
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.key
    }

    /// Create from a slice (must be exactly 32 bytes)
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        let key: [u8; KEY_LEN] = slice.try_into().ok()?;
        Some(Self { key })
    }
}

impl Clone for DerivedKey {
    fn clone(&self) -> Self {
        Self { key: self.key }
    }
}

impl PartialEq for DerivedKey {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for DerivedKey {}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Master password held for the length of a session - zeroed when dropped
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct MasterPassword {
    value: String,
}

impl MasterPassword {
    /// Wrap a password typed by the user
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Get the password (use carefully)
    pub fn expose(&self) -> &str {
        &self.value
    }

    /// Whether the password is empty
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl From<&str> for MasterPassword {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for MasterPassword {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Debug for MasterPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterPassword")
            .field("value", &"[REDACTED]")
            .finish()
    }
}
