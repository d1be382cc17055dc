//! AES-256-GCM authenticated encryption
//!
//! The cipher emits `ciphertext || tag`; stored records keep the two apart:
//! - IV: 12 bytes (96 bits) - standard for GCM
//! - Auth tag: 16 bytes (128 bits), the last 16 bytes of the cipher output
//! - Ciphertext: variable length, same as the plaintext

use super::provider::{CryptoProvider, NONCE_LEN, TAG_LEN};
use super::DerivedKey;
use crate::error::{Result, VaultError};

/// Encrypted data with IV and auth tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedData {
    /// Initialization vector (12 bytes for GCM)
    pub iv: [u8; NONCE_LEN],
    /// Authentication tag (16 bytes)
    pub auth_tag: [u8; TAG_LEN],
    /// Encrypted ciphertext, tag excluded
    pub ciphertext: Vec<u8>,
}

/// Encrypt plaintext using AES-256-GCM under a fresh random IV
pub fn encrypt<P: CryptoProvider + ?Sized>(
    provider: &P,
    plaintext: &[u8],
    key: &DerivedKey,
) -> Result<EncryptedData> {
    let mut iv = [0u8; NONCE_LEN];
    provider.fill_random(&mut iv);

    let mut ciphertext = provider.seal(key, &iv, plaintext)?;

    if ciphertext.len() < TAG_LEN {
        return Err(VaultError::EncryptionError(
            "Ciphertext too short".to_string(),
        ));
    }

    let tag_start = ciphertext.len() - TAG_LEN;
    let mut auth_tag = [0u8; TAG_LEN];
    auth_tag.copy_from_slice(&ciphertext[tag_start..]);
    ciphertext.truncate(tag_start);

    Ok(EncryptedData {
        iv,
        auth_tag,
        ciphertext,
    })
}

/// Decrypt ciphertext using AES-256-GCM
///
/// The tag is re-appended after the ciphertext, mirroring the split in
/// [`encrypt`]. Any failure is reported as the generic decryption error.
pub fn decrypt<P: CryptoProvider + ?Sized>(
    provider: &P,
    encrypted: &EncryptedData,
    key: &DerivedKey,
) -> Result<Vec<u8>> {
    let mut ciphertext_with_tag = Vec::with_capacity(encrypted.ciphertext.len() + TAG_LEN);
    ciphertext_with_tag.extend_from_slice(&encrypted.ciphertext);
    ciphertext_with_tag.extend_from_slice(&encrypted.auth_tag);

    provider
        .open(key, &encrypted.iv, &ciphertext_with_tag)
        .map_err(|_| VaultError::DecryptionError)
}
