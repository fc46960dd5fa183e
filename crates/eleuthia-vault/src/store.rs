// SPDX-FileCopyrightText: 2026 Eleuthia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence boundary: the metadata and cipher records in a key-value store.
//!
//! Callers write meta before cipher. Meta without a cipher reads as "no
//! vault"; the reverse order could leave a cipher nobody can derive a key for.

use std::sync::Arc;

use eleuthia_config::model::StorageConfig;
use eleuthia_core::{EleuthiaError, KeyValueStore};

use crate::model::{CipherPayload, Snapshot, VaultMeta};

/// Logical record keys used by one vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultKeys {
    pub meta: String,
    pub cipher: String,
    pub snapshots: String,
}

impl Default for VaultKeys {
    fn default() -> Self {
        Self {
            meta: "eleu.meta".to_string(),
            cipher: "eleu.vault".to_string(),
            snapshots: "eleu.snapshots".to_string(),
        }
    }
}

impl From<&StorageConfig> for VaultKeys {
    fn from(config: &StorageConfig) -> Self {
        Self {
            meta: config.meta_key.clone(),
            cipher: config.cipher_key.clone(),
            snapshots: config.snapshots_key.clone(),
        }
    }
}

/// Typed access to the vault's records.
///
/// Reads return `Ok(None)` for absent records. A record that is present but
/// does not parse is reported as [`EleuthiaError::AuthenticationFailure`]:
/// a damaged vault looks the same as a wrong passphrase.
#[derive(Clone)]
pub struct VaultStore {
    backend: Arc<dyn KeyValueStore>,
    keys: VaultKeys,
}

impl std::fmt::Debug for VaultStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultStore")
            .field("backend", &self.backend.name())
            .field("keys", &self.keys)
            .finish()
    }
}

impl VaultStore {
    pub fn new(backend: Arc<dyn KeyValueStore>, keys: VaultKeys) -> Self {
        Self { backend, keys }
    }

    pub fn keys(&self) -> &VaultKeys {
        &self.keys
    }

    /// The underlying key-value store.
    pub fn backend(&self) -> &Arc<dyn KeyValueStore> {
        &self.backend
    }

    pub async fn read_meta(&self) -> Result<Option<VaultMeta>, EleuthiaError> {
        self.read_json(&self.keys.meta).await
    }

    pub async fn write_meta(&self, meta: &VaultMeta) -> Result<(), EleuthiaError> {
        self.write_json(&self.keys.meta, meta).await
    }

    pub async fn read_cipher(&self) -> Result<Option<CipherPayload>, EleuthiaError> {
        self.read_json(&self.keys.cipher).await
    }

    /// The stored cipher record exactly as persisted, without parsing.
    pub async fn read_cipher_raw(&self) -> Result<Option<String>, EleuthiaError> {
        self.backend.get(&self.keys.cipher).await
    }

    pub async fn write_cipher(&self, payload: &CipherPayload) -> Result<(), EleuthiaError> {
        self.write_json(&self.keys.cipher, payload).await
    }

    pub async fn delete_cipher(&self) -> Result<(), EleuthiaError> {
        self.backend.delete(&self.keys.cipher).await
    }

    /// A vault exists iff both records are present.
    pub async fn exists(&self) -> Result<bool, EleuthiaError> {
        let meta = self.backend.get(&self.keys.meta).await?;
        let cipher = self.backend.get(&self.keys.cipher).await?;
        Ok(meta.is_some() && cipher.is_some())
    }

    /// Remove the cipher, then the metadata. Snapshots are left alone.
    pub async fn clear_all(&self) -> Result<(), EleuthiaError> {
        self.backend.delete(&self.keys.cipher).await?;
        self.backend.delete(&self.keys.meta).await
    }

    /// All stored snapshots in stored order. An absent record is an empty list.
    pub async fn read_snapshots(&self) -> Result<Vec<Snapshot>, EleuthiaError> {
        Ok(self
            .read_json(&self.keys.snapshots)
            .await?
            .unwrap_or_default())
    }

    pub async fn write_snapshots(&self, snapshots: &[Snapshot]) -> Result<(), EleuthiaError> {
        self.write_json(&self.keys.snapshots, &snapshots).await
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>, EleuthiaError> {
        match self.backend.get(key).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|_| EleuthiaError::AuthenticationFailure),
            None => Ok(None),
        }
    }

    async fn write_json<T: serde::Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), EleuthiaError> {
        let raw = serde_json::to_string(value)
            .map_err(|e| EleuthiaError::Internal(format!("failed to serialize {key}: {e}")))?;
        self.backend.set(key, &raw).await
    }
}
