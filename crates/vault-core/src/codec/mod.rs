//! Vault record and export bundle codec

mod bundle;
mod record;

pub use bundle::{ExportBundle, ExportFile, EXPORT_VERSION};
pub use record::{EncryptedRecord, PlaintextRecord, VaultCodec};
