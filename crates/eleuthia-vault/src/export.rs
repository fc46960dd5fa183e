// SPDX-FileCopyrightText: 2026 Eleuthia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encrypted export and backup restore.
//!
//! Export hands out the stored cipher record verbatim. Nothing here ever
//! decrypts; there is no plaintext export path.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use eleuthia_core::EleuthiaError;
use tracing::info;

use crate::model::{CipherPayload, IV_LEN};
use crate::store::VaultStore;

/// Length of the GCM authentication tag appended to every ciphertext.
const TAG_LEN: usize = 16;

/// A downloadable encrypted backup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    /// The stored `{iv, ct}` JSON.
    pub contents: String,
}

impl ExportFile {
    /// Write the file into `dir`, returning its full path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, EleuthiaError> {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, self.contents.as_bytes()).map_err(EleuthiaError::persistence)?;
        Ok(path)
    }
}

/// `ELEUTHIA-encrypted-YYYY-MM-DD.json`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("ELEUTHIA-encrypted-{}.json", date.format("%Y-%m-%d"))
}

/// Package the currently stored cipher record as an export file.
pub async fn export_encrypted(
    store: &VaultStore,
    date: NaiveDate,
) -> Result<ExportFile, EleuthiaError> {
    let contents = store
        .read_cipher_raw()
        .await?
        .ok_or(EleuthiaError::VaultNotFound)?;
    let file = ExportFile {
        file_name: export_file_name(date),
        contents,
    };
    info!(file = %file.file_name, "encrypted export prepared");
    Ok(file)
}

/// Parse an encrypted backup file.
///
/// Both `iv` and `ct` must be present and base64; the nonce must be 12 bytes
/// and the ciphertext at least one tag long. Whether it decrypts is only
/// known at the next unlock.
pub fn parse_backup(contents: &str) -> Result<CipherPayload, EleuthiaError> {
    let invalid = || {
        EleuthiaError::Validation("not a valid ELEUTHIA encrypted backup".to_string())
    };
    let payload: CipherPayload = serde_json::from_str(contents).map_err(|_| invalid())?;
    if payload.iv.len() != IV_LEN || payload.ciphertext.len() < TAG_LEN {
        return Err(invalid());
    }
    Ok(payload)
}
