//! Injected cryptography capability
//!
//! Everything the envelope needs from the platform (randomness, PBKDF2 and
//! the AES-256-GCM primitive) goes through [`CryptoProvider`], so callers can
//! substitute a test double without touching global state.

use std::sync::Arc;

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use pbkdf2::pbkdf2_hmac;
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;

use super::DerivedKey;
use crate::error::{Result, VaultError};

/// AES-GCM nonce length in bytes
pub const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length in bytes
pub const TAG_LEN: usize = 16;

/// CSPRNG + KDF + AEAD capability
pub trait CryptoProvider: Send + Sync {
    /// Fill `dest` with cryptographically secure random bytes
    fn fill_random(&self, dest: &mut [u8]);

    /// PBKDF2-HMAC-SHA256 into `out`
    fn derive_pbkdf2_sha256(&self, password: &[u8], salt: &[u8], iterations: u32, out: &mut [u8]);

    /// AES-256-GCM encrypt without associated data; returns `ciphertext || tag`
    fn seal(&self, key: &DerivedKey, nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> Result<Vec<u8>>;

    /// AES-256-GCM decrypt of `ciphertext || tag`; the tag is checked before
    /// any plaintext is returned
    fn open(
        &self,
        key: &DerivedKey,
        nonce: &[u8; NONCE_LEN],
        ciphertext_with_tag: &[u8],
    ) -> Result<Vec<u8>>;
}

/// Operating-system backed provider (`OsRng`, `pbkdf2`, `aes-gcm`)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCrypto;

impl CryptoProvider for SystemCrypto {
    fn fill_random(&self, dest: &mut [u8]) {
        OsRng.fill_bytes(dest);
    }

    fn derive_pbkdf2_sha256(&self, password: &[u8], salt: &[u8], iterations: u32, out: &mut [u8]) {
        pbkdf2_hmac::<Sha256>(password, salt, iterations, out);
    }

    fn seal(&self, key: &DerivedKey, nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
        let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
            .map_err(|e| VaultError::EncryptionError(e.to_string()))?;

        cipher
            .encrypt(Nonce::from_slice(nonce), plaintext)
            .map_err(|e| VaultError::EncryptionError(e.to_string()))
    }

    fn open(
        &self,
        key: &DerivedKey,
        nonce: &[u8; NONCE_LEN],
        ciphertext_with_tag: &[u8],
    ) -> Result<Vec<u8>> {
        let cipher =
            Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| VaultError::DecryptionError)?;

        cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext_with_tag)
            .map_err(|_| VaultError::DecryptionError)
    }
}

impl<P: CryptoProvider + ?Sized> CryptoProvider for Arc<P> {
    fn fill_random(&self, dest: &mut [u8]) {
        (**self).fill_random(dest)
    }

    fn derive_pbkdf2_sha256(&self, password: &[u8], salt: &[u8], iterations: u32, out: &mut [u8]) {
        (**self).derive_pbkdf2_sha256(password, salt, iterations, out)
    }

    fn seal(&self, key: &DerivedKey, nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
        (**self).seal(key, nonce, plaintext)
    }

    fn open(
        &self,
        key: &DerivedKey,
        nonce: &[u8; NONCE_LEN],
        ciphertext_with_tag: &[u8],
    ) -> Result<Vec<u8>> {
        (**self).open(key, nonce, ciphertext_with_tag)
    }
}
