//! # vault-core
//!
//! Client-side envelope for a zero-knowledge password vault:
//! - PBKDF2-HMAC-SHA256 key derivation from the master password
//! - AES-256-GCM record encryption with a detached authentication tag
//! - Encrypted, versioned bulk export/import
//! - Unlock sessions with per-salt key caching and explicit salt storage
//!
//! The server side only ever sees [`EncryptedRecord`]s and [`ExportFile`]s.

pub mod clipboard;
pub mod codec;
pub mod crypto;
pub mod error;
pub mod generator;
pub mod item;
pub mod session;
pub mod settings;
pub mod storage;

pub use clipboard::{Clipboard, ClipboardGuard};
pub use codec::{EncryptedRecord, ExportBundle, ExportFile, PlaintextRecord, VaultCodec, EXPORT_VERSION};
pub use crypto::{
    derive_key, generate_salt, CryptoProvider, DerivedKey, KeyDerivation, KeyDerivationParams,
    MasterPassword, Salt, SystemCrypto,
};
pub use error::{Result, VaultError};
pub use generator::{calculate_strength, generate_password, PasswordOptions, StrengthReport};
pub use item::{DecryptedVaultItem, VaultItem};
pub use session::{BatchLoad, ItemFailure, UnlockSession};
pub use settings::{Settings, SettingsManager};
pub use storage::{FileSaltStore, MemorySaltStore, SaltStore};
