//! Single vault record encryption

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::crypto::{
    decrypt, encoding, encrypt, CryptoProvider, DerivedKey, EncryptedData, KeyDerivation,
    KeyDerivationParams, Salt, SystemCrypto, NONCE_LEN, TAG_LEN,
};
use crate::error::{Result, VaultError};

/// Sensitive fields of one vault entry - zeroed when dropped
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct PlaintextRecord {
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PlaintextRecord {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            url: None,
            notes: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

impl std::fmt::Debug for PlaintextRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaintextRecord")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("url", &self.url)
            .field("notes", &self.notes.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Persisted/transmitted form of a record; every field is standard base64
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedRecord {
    /// Ciphertext only, tag excluded
    pub encrypted_data: String,
    /// 12-byte nonce
    pub iv: String,
    /// 16-byte AES-GCM tag
    pub auth_tag: String,
    /// 16-byte salt needed to rederive the key
    pub salt: String,
}

impl EncryptedRecord {
    /// Encode raw cipher output and the salt it was keyed with
    pub fn from_parts(data: &EncryptedData, salt: &Salt) -> Self {
        Self {
            encrypted_data: encoding::encode(&data.ciphertext),
            iv: encoding::encode(&data.iv),
            auth_tag: encoding::encode(&data.auth_tag),
            salt: salt.to_base64(),
        }
    }

    /// Decode into raw parts; malformed fields are reported as the generic
    /// decryption error
    pub fn to_parts(&self) -> Result<(EncryptedData, Salt)> {
        Ok((self.cipher_data()?, self.decode_salt()?))
    }

    /// Decode the salt field
    pub fn decode_salt(&self) -> Result<Salt> {
        Salt::from_base64(&self.salt).map_err(|_| VaultError::DecryptionError)
    }

    fn cipher_data(&self) -> Result<EncryptedData> {
        let ciphertext = encoding::decode(&self.encrypted_data).ok_or(VaultError::DecryptionError)?;
        let iv = encoding::decode_array::<NONCE_LEN>(&self.iv).ok_or(VaultError::DecryptionError)?;
        let auth_tag =
            encoding::decode_array::<TAG_LEN>(&self.auth_tag).ok_or(VaultError::DecryptionError)?;

        Ok(EncryptedData {
            iv,
            auth_tag,
            ciphertext,
        })
    }
}

/// Encrypts and decrypts vault records and export bundles
///
/// Stateless: every call owns its salt, nonce and key, so a codec can be
/// shared freely between threads.
#[derive(Debug, Clone, Default)]
pub struct VaultCodec<P = SystemCrypto> {
    kdf: KeyDerivation<P>,
}

impl VaultCodec<SystemCrypto> {
    /// Codec over the operating system provider with the default parameters
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: CryptoProvider> VaultCodec<P> {
    /// Codec over a custom provider and key derivation parameters
    pub fn with_provider(provider: P, params: KeyDerivationParams) -> Self {
        Self {
            kdf: KeyDerivation::new(provider, params),
        }
    }

    pub fn key_derivation(&self) -> &KeyDerivation<P> {
        &self.kdf
    }

    pub fn generate_salt(&self) -> Salt {
        self.kdf.generate_salt()
    }

    /// Derive the key for a salt
    pub fn derive_key(&self, password: &str, salt: &Salt) -> Result<DerivedKey> {
        self.kdf.derive(password, salt.as_bytes())
    }

    /// Encrypt a record under a fresh salt and a fresh nonce
    pub fn encrypt_record(&self, record: &PlaintextRecord, password: &str) -> Result<EncryptedRecord> {
        let salt = self.generate_salt();
        let key = self.derive_key(password, &salt)?;
        self.encrypt_record_with_key(record, &key, &salt)
    }

    /// Decrypt a record, rederiving the key from the record's own salt
    pub fn decrypt_record(&self, enc: &EncryptedRecord, password: &str) -> Result<PlaintextRecord> {
        let salt = enc.decode_salt()?;
        let key = self.derive_key(password, &salt)?;
        self.decrypt_record_with_key(enc, &key)
    }

    /// Encrypt with an already derived key; `salt` must be the salt `key` was
    /// derived from. The nonce is still fresh per call.
    pub fn encrypt_record_with_key(
        &self,
        record: &PlaintextRecord,
        key: &DerivedKey,
        salt: &Salt,
    ) -> Result<EncryptedRecord> {
        self.seal_json(record, key, salt)
    }

    /// Decrypt with an already derived key
    pub fn decrypt_record_with_key(
        &self,
        enc: &EncryptedRecord,
        key: &DerivedKey,
    ) -> Result<PlaintextRecord> {
        self.open_json(enc, key)
    }

    pub(crate) fn seal_json<T: Serialize + ?Sized>(
        &self,
        value: &T,
        key: &DerivedKey,
        salt: &Salt,
    ) -> Result<EncryptedRecord> {
        let plaintext = Zeroizing::new(
            serde_json::to_vec(value).map_err(|e| VaultError::EncryptionError(e.to_string()))?,
        );

        let data = encrypt(self.kdf.provider(), &plaintext, key)?;
        debug!("Sealed {} byte payload", plaintext.len());

        Ok(EncryptedRecord::from_parts(&data, salt))
    }

    pub(crate) fn open_json<T: DeserializeOwned>(
        &self,
        enc: &EncryptedRecord,
        key: &DerivedKey,
    ) -> Result<T> {
        let (data, _) = enc.to_parts()?;
        let plaintext = Zeroizing::new(decrypt(self.kdf.provider(), &data, key)?);

        serde_json::from_slice(&plaintext).map_err(|_| VaultError::DecryptionError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DECRYPTION_FAILED;

    fn codec() -> VaultCodec {
        VaultCodec::with_provider(SystemCrypto, KeyDerivationParams { iterations: 1_000 })
    }

    fn sample() -> PlaintextRecord {
        PlaintextRecord::new("alice", "S3cret!").with_url("example.com")
    }

    /// Flip the lowest bit of the first decoded byte of a base64 field
    fn flip_bit(field: &mut String, index: usize) {
        let mut bytes = encoding::decode(field).unwrap();
        bytes[index] ^= 0x01;
        *field = encoding::encode(&bytes);
    }

    #[test]
    fn test_record_roundtrip() {
        let codec = codec();
        let record = sample().with_notes("recovery codes: 1234");

        let encrypted = codec.encrypt_record(&record, "master").unwrap();
        let decrypted = codec.decrypt_record(&encrypted, "master").unwrap();

        assert_eq!(decrypted, record);
    }

    #[test]
    fn test_wire_field_lengths() {
        let encrypted = codec().encrypt_record(&sample(), "master").unwrap();
        let (data, salt) = encrypted.to_parts().unwrap();

        assert_eq!(data.iv.len(), 12);
        assert_eq!(data.auth_tag.len(), 16);
        assert_eq!(salt.as_bytes().len(), 16);

        let plaintext_len = serde_json::to_vec(&sample()).unwrap().len();
        assert_eq!(data.ciphertext.len(), plaintext_len);
    }

    #[test]
    fn test_wire_uses_camel_case() {
        let encrypted = codec().encrypt_record(&sample(), "master").unwrap();
        let json = serde_json::to_value(&encrypted).unwrap();

        for key in ["encryptedData", "iv", "authTag", "salt"] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
    }

    #[test]
    fn test_optional_fields_omitted() {
        let json = serde_json::to_value(PlaintextRecord::new("bob", "pw")).unwrap();
        assert!(json.get("url").is_none());
        assert!(json.get("notes").is_none());
    }

    #[test]
    fn test_wrong_password_fails() {
        let codec = codec();
        let encrypted = codec.encrypt_record(&sample(), "master").unwrap();

        let err = codec.decrypt_record(&encrypted, "Master").unwrap_err();
        assert!(matches!(err, VaultError::DecryptionError));
        assert_eq!(err.to_string(), DECRYPTION_FAILED);
    }

    #[test]
    fn test_single_bit_tamper_detected_everywhere() {
        let codec = codec();
        let original = codec.encrypt_record(&sample(), "master").unwrap();

        let tamperers: [fn(&mut EncryptedRecord); 6] = [
            |r| flip_bit(&mut r.encrypted_data, 0),
            |r| flip_bit(&mut r.iv, 0),
            |r| flip_bit(&mut r.iv, 11),
            |r| flip_bit(&mut r.auth_tag, 0),
            |r| flip_bit(&mut r.auth_tag, 15),
            |r| flip_bit(&mut r.salt, 0),
        ];

        for tamper in tamperers {
            let mut record = original.clone();
            tamper(&mut record);
            assert!(matches!(
                codec.decrypt_record(&record, "master"),
                Err(VaultError::DecryptionError)
            ));
        }
    }

    #[test]
    fn test_malformed_fields_fail_generically() {
        let codec = codec();
        let original = codec.encrypt_record(&sample(), "master").unwrap();

        let mut bad_iv = original.clone();
        bad_iv.iv = encoding::encode(&[0u8; 8]);

        let mut bad_tag = original.clone();
        bad_tag.auth_tag = "###".to_string();

        let mut bad_salt = original.clone();
        bad_salt.salt = encoding::encode(&[0u8; 4]);

        let mut empty = original.clone();
        empty.encrypted_data = String::new();

        for record in [bad_iv, bad_tag, bad_salt, empty] {
            assert!(matches!(
                codec.decrypt_record(&record, "master"),
                Err(VaultError::DecryptionError)
            ));
        }
    }

    #[test]
    fn test_fresh_salt_and_nonce_per_call() {
        let codec = codec();
        let record = sample();

        let first = codec.encrypt_record(&record, "master").unwrap();
        let second = codec.encrypt_record(&record, "master").unwrap();

        assert_ne!(first.iv, second.iv);
        assert_ne!(first.salt, second.salt);
        assert_ne!(first.encrypted_data, second.encrypted_data);
    }

    #[test]
    fn test_non_record_payload_rejected() {
        let codec = codec();
        let salt = codec.generate_salt();
        let key = codec.derive_key("master", &salt).unwrap();

        let sealed = codec
            .seal_json(&serde_json::json!({ "version": "1.0", "items": [] }), &key, &salt)
            .unwrap();

        assert!(matches!(
            codec.decrypt_record_with_key(&sealed, &key),
            Err(VaultError::DecryptionError)
        ));
    }

    #[test]
    fn test_with_key_matches_password_path() {
        let codec = codec();
        let salt = codec.generate_salt();
        let key = codec.derive_key("master", &salt).unwrap();

        let encrypted = codec.encrypt_record_with_key(&sample(), &key, &salt).unwrap();
        assert_eq!(encrypted.salt, salt.to_base64());

        let decrypted = codec.decrypt_record(&encrypted, "master").unwrap();
        assert_eq!(decrypted, sample());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let debug = format!("{:?}", sample().with_notes("pin 0000"));
        assert!(debug.contains("alice"));
        assert!(!debug.contains("S3cret!"));
        assert!(!debug.contains("pin 0000"));
    }
}
