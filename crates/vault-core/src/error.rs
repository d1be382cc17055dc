//! Error types for vault-core

use thiserror::Error;

/// Result type alias for vault operations
pub type Result<T> = std::result::Result<T, VaultError>;

/// Message shown for every decryption failure, whatever the cause
pub const DECRYPTION_FAILED: &str = "Failed to decrypt data - invalid password or corrupted data";

/// Message shown when an export file carries an unknown or missing version
pub const UNSUPPORTED_EXPORT_VERSION: &str = "Unsupported export file version";

/// Vault error types
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Key derivation failed: {0}")]
    KeyDerivationError(String),

    #[error("Failed to encrypt data: {0}")]
    EncryptionError(String),

    /// Wrong password, tampered ciphertext and truncated input all collapse here
    #[error("{}", DECRYPTION_FAILED)]
    DecryptionError,

    #[error("{0}")]
    ImportError(String),

    #[error("No salt available for item {0}")]
    MissingSalt(String),

    #[error("Vault is locked - unlock with the master password first")]
    SessionLocked,

    #[error("Session expired - unlock with the master password again")]
    SessionExpired,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    GeneratorError(String),

    #[error("Clipboard error: {0}")]
    ClipboardError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decryption_message_is_generic() {
        assert_eq!(VaultError::DecryptionError.to_string(), DECRYPTION_FAILED);
    }

    #[test]
    fn test_import_message_passthrough() {
        let err = VaultError::ImportError(UNSUPPORTED_EXPORT_VERSION.to_string());
        assert_eq!(err.to_string(), "Unsupported export file version");
    }
}
