//! Command implementations
//!
//! Every command takes its inputs as strings and returns what should be
//! printed, so `main` owns all terminal and file I/O.

use anyhow::{Context, Result};
use serde_json::json;
use tracing::info;

use vault_core::generator::{check_common_patterns, generate_suggestions};
use vault_core::{
    calculate_strength, generate_salt, CryptoProvider, EncryptedRecord, PasswordOptions,
    PlaintextRecord, VaultCodec,
};

/// A fresh base64 salt
pub fn salt() -> String {
    generate_salt().to_base64()
}

/// Encrypt one record and render the wire JSON
pub fn encrypt<P: CryptoProvider>(
    codec: &VaultCodec<P>,
    record: &PlaintextRecord,
    master: &str,
) -> Result<String> {
    let encrypted = codec.encrypt_record(record, master)?;
    Ok(serde_json::to_string_pretty(&encrypted)?)
}

/// Decrypt one wire-format record and render the plaintext JSON
pub fn decrypt<P: CryptoProvider>(codec: &VaultCodec<P>, input: &str, master: &str) -> Result<String> {
    let encrypted: EncryptedRecord =
        serde_json::from_str(input).context("Input is not an encrypted record")?;
    let record = codec.decrypt_record(&encrypted, master)?;
    Ok(serde_json::to_string_pretty(&record)?)
}

/// Encrypt a JSON array of records into an export file
pub fn export<P: CryptoProvider>(codec: &VaultCodec<P>, input: &str, master: &str) -> Result<String> {
    let records: Vec<PlaintextRecord> =
        serde_json::from_str(input).context("Input is not a JSON array of records")?;
    let file = codec.export_bundle(&records, master)?;
    info!("Exported {} records", records.len());
    Ok(file.to_json()?)
}

/// Decrypt an export file into a JSON array of records
pub fn import<P: CryptoProvider>(codec: &VaultCodec<P>, input: &str, master: &str) -> Result<String> {
    let records = codec.import_bundle(input, master)?;
    Ok(serde_json::to_string_pretty(&records)?)
}

/// One generated password per line
pub fn generate(options: &PasswordOptions, count: usize) -> Result<String> {
    Ok(generate_suggestions(options, count)?.join("\n"))
}

/// Strength report and common-pattern warnings as JSON
pub fn strength(password: &str) -> Result<String> {
    let report = calculate_strength(password);
    let patterns = check_common_patterns(password);

    Ok(serde_json::to_string_pretty(&json!({
        "score": report.score,
        "description": report.description,
        "feedback": report.feedback,
        "commonPatterns": patterns,
    }))?)
}
