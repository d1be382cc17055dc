//! Password-based key derivation using PBKDF2-HMAC-SHA256

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use super::encoding;
use super::provider::{CryptoProvider, SystemCrypto};
use super::secure_memory::{DerivedKey, KEY_LEN};
use crate::error::{Result, VaultError};

/// Salt length in bytes
pub const SALT_LEN: usize = 16;

/// PBKDF2 rounds used by export format 1.0 and every stored record
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Random per-record salt; not secret
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Salt([u8; SALT_LEN]);

impl Salt {
    /// Wrap raw salt bytes
    pub fn from_bytes(bytes: [u8; SALT_LEN]) -> Self {
        Self(bytes)
    }

    /// Create from a slice (must be exactly 16 bytes)
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        let bytes: [u8; SALT_LEN] = slice.try_into().map_err(|_| {
            VaultError::KeyDerivationError(format!(
                "Invalid salt length: expected {}, got {}",
                SALT_LEN,
                slice.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    /// Parse the base64 wire form
    pub fn from_base64(value: &str) -> Result<Self> {
        let bytes = encoding::decode(value)
            .ok_or_else(|| VaultError::KeyDerivationError("Invalid salt encoding".to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Base64 wire form
    pub fn to_base64(&self) -> String {
        encoding::encode(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8; SALT_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for Salt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Salt").field(&self.to_base64()).finish()
    }
}

/// Parameters for PBKDF2 key derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDerivationParams {
    /// PBKDF2 rounds (default: 100,000)
    pub iterations: u32,
}

impl Default for KeyDerivationParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

/// Turns a master password and salt into an AES-256 key
#[derive(Debug, Clone, Default)]
pub struct KeyDerivation<P = SystemCrypto> {
    provider: P,
    params: KeyDerivationParams,
}

impl<P: CryptoProvider> KeyDerivation<P> {
    /// Create a key derivation context over the given provider
    pub fn new(provider: P, params: KeyDerivationParams) -> Self {
        Self { provider, params }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn params(&self) -> KeyDerivationParams {
        self.params
    }

    /// Generate a fresh random salt from the provider's CSPRNG
    pub fn generate_salt(&self) -> Salt {
        let mut bytes = [0u8; SALT_LEN];
        self.provider.fill_random(&mut bytes);
        Salt(bytes)
    }

    /// Derive a 256-bit key from a password and a 16-byte salt
    ///
    /// Deterministic: the same password and salt always give the same key.
    /// Any password, including the empty one, is accepted; only a salt of the
    /// wrong length is an error.
    pub fn derive(&self, password: &str, salt: &[u8]) -> Result<DerivedKey> {
        let salt = Salt::from_slice(salt)?;

        if self.params.iterations == 0 {
            return Err(VaultError::KeyDerivationError(
                "Iteration count must be non-zero".to_string(),
            ));
        }

        let mut out = [0u8; KEY_LEN];
        self.provider.derive_pbkdf2_sha256(
            password.as_bytes(),
            salt.as_bytes(),
            self.params.iterations,
            &mut out,
        );

        let key = DerivedKey::new(out);
        out.zeroize();
        Ok(key)
    }
}

/// Generate a cryptographically secure random salt
pub fn generate_salt() -> Salt {
    KeyDerivation::<SystemCrypto>::default().generate_salt()
}

/// Derive a 256-bit key from a password using PBKDF2-HMAC-SHA256
///
/// # Arguments
/// * `password` - The user's master password
/// * `salt` - 16 salt bytes (use `generate_salt()` to create one)
/// * `params` - Optional key derivation parameters
pub fn derive_key(
    password: &str,
    salt: &[u8],
    params: Option<KeyDerivationParams>,
) -> Result<DerivedKey> {
    KeyDerivation::new(SystemCrypto, params.unwrap_or_default()).derive(password, salt)
}
