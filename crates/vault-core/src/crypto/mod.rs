//! Cryptographic primitives for the vault envelope
//!
//! This module provides:
//! - AES-256-GCM authenticated encryption with a detached tag
//! - PBKDF2-HMAC-SHA256 key derivation from the master password
//! - The injectable `CryptoProvider` capability
//! - Secure memory handling with zeroize

pub mod encoding;
mod encryption;
mod key_derivation;
mod provider;
mod secure_memory;

pub use encryption::{decrypt, encrypt, EncryptedData};
pub use key_derivation::{
    derive_key, generate_salt, KeyDerivation, KeyDerivationParams, Salt, DEFAULT_ITERATIONS,
    SALT_LEN,
};
pub use provider::{CryptoProvider, SystemCrypto, NONCE_LEN, TAG_LEN};
pub use secure_memory::{DerivedKey, MasterPassword, KEY_LEN};
