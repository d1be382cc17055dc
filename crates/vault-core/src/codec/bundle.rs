//! Encrypted bulk export/import
//!
//! An export file is a JSON envelope `{version, encryptedData, iv, authTag,
//! salt}` whose decrypted payload is
//! `{version, exportDate, itemCount, items: [...]}`.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::record::{EncryptedRecord, PlaintextRecord, VaultCodec};
use crate::crypto::CryptoProvider;
use crate::error::{Result, VaultError, UNSUPPORTED_EXPORT_VERSION};

/// The only export format version this crate reads or writes
pub const EXPORT_VERSION: &str = "1.0";

/// Standalone, self-describing export file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportFile {
    pub version: String,
    #[serde(flatten)]
    pub record: EncryptedRecord,
}

impl ExportFile {
    /// Parse an export file, checking the version before anything else
    pub fn parse(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| VaultError::ImportError(format!("Invalid export file: {}", e)))?;

        if value.get("version").and_then(Value::as_str) != Some(EXPORT_VERSION) {
            return Err(VaultError::ImportError(
                UNSUPPORTED_EXPORT_VERSION.to_string(),
            ));
        }

        // Missing cipher fields means a damaged file, same as a bad tag
        serde_json::from_value(value).map_err(|_| VaultError::DecryptionError)
    }

    /// Pretty-printed JSON, the form written to disk
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Decrypted export payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportBundle {
    pub version: String,
    pub export_date: String,
    pub item_count: usize,
    #[serde(deserialize_with = "null_as_empty")]
    pub items: Vec<PlaintextRecord>,
}

/// `"items": null` reads as an empty list
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<PlaintextRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<PlaintextRecord>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportPayload<'a> {
    version: &'a str,
    export_date: String,
    item_count: usize,
    items: &'a [PlaintextRecord],
}

impl<P: CryptoProvider> VaultCodec<P> {
    /// Encrypt many records into one export file under a fresh salt and nonce
    pub fn export_bundle(&self, records: &[PlaintextRecord], password: &str) -> Result<ExportFile> {
        let payload = ExportPayload {
            version: EXPORT_VERSION,
            export_date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            item_count: records.len(),
            items: records,
        };

        let salt = self.generate_salt();
        let key = self.derive_key(password, &salt)?;
        let record = self.seal_json(&payload, &key, &salt)?;

        info!("Exported {} vault items", records.len());
        Ok(ExportFile {
            version: EXPORT_VERSION.to_string(),
            record,
        })
    }

    /// Decrypt an export file and return the whole payload
    pub fn open_bundle(&self, json: &str, password: &str) -> Result<ExportBundle> {
        let file = ExportFile::parse(json)?;
        let salt = file.record.decode_salt()?;
        let key = self.derive_key(password, &salt)?;

        let bundle: ExportBundle = self.open_json(&file.record, &key)?;
        debug!(
            "Opened export from {:?} declaring {} items",
            bundle.export_date, bundle.item_count
        );
        Ok(bundle)
    }

    /// Decrypt an export file into its records, in export order
    pub fn import_bundle(&self, json: &str, password: &str) -> Result<Vec<PlaintextRecord>> {
        let items = self.open_bundle(json, password)?.items;
        info!("Imported {} vault items", items.len());
        Ok(items)
    }
}
