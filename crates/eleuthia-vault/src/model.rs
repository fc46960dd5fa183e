// SPDX-FileCopyrightText: 2026 Eleuthia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault records and their JSON wire shapes.
//!
//! `VaultMeta` and `CipherPayload` are what the key-value store sees. The
//! `VaultDocument` and its entries only exist in memory while unlocked and
//! inside the ciphertext.

use serde::{Deserialize, Serialize};

/// Current `VaultMeta` format version.
pub const META_VERSION: u32 = 1;

/// Length of an AES-GCM nonce in bytes.
pub const IV_LEN: usize = 12;

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// A fresh entry id (`e_<uuid>`).
pub fn new_entry_id() -> String {
    format!("e_{}", uuid::Uuid::new_v4().simple())
}

/// A fresh snapshot id (`snap_<uuid>`).
pub fn new_snapshot_id() -> String {
    format!("snap_{}", uuid::Uuid::new_v4().simple())
}

/// Public key-derivation parameters, stored in clear next to the cipher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultMeta {
    #[serde(with = "b64")]
    pub salt: Vec<u8>,
    pub iterations: u32,
    #[serde(rename = "ver")]
    pub version: u32,
}

/// The entire current vault document, encrypted.
///
/// `ciphertext` carries the 16-byte GCM tag at its end. `iv` is kept as a
/// vector so a damaged record still parses and fails at decryption.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherPayload {
    #[serde(with = "b64")]
    pub iv: Vec<u8>,
    #[serde(rename = "ct", with = "b64")]
    pub ciphertext: Vec<u8>,
}

impl std::fmt::Debug for CipherPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherPayload")
            .field("iv_len", &self.iv.len())
            .field("ct_len", &self.ciphertext.len())
            .finish()
    }
}

/// A single credential.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub updated_at: i64,
}

impl Entry {
    /// A new entry with a generated id and no optional fields.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: new_entry_id(),
            title: title.into(),
            username: None,
            password: None,
            url: None,
            notes: None,
            updated_at: 0,
        }
    }

    /// Hostname parsed from `url`, if it is an absolute URL with a host.
    pub fn hostname(&self) -> Option<String> {
        hostname_of(self.url.as_deref()?)
    }

    /// Whether the entry carries a non-empty password.
    pub fn has_password(&self) -> bool {
        self.password.as_deref().is_some_and(|p| !p.is_empty())
    }
}

impl std::fmt::Debug for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entry")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("url", &self.url)
            .field("notes", &self.notes)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Hostname of an absolute URL, lowercased. `None` for anything unparsable.
pub fn hostname_of(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url.trim()).ok()?;
    parsed
        .host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_ascii_lowercase())
}

/// The decrypted vault: an ordered list of entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultDocument {
    pub entries: Vec<Entry>,
    pub updated_at: i64,
}

impl VaultDocument {
    /// An empty document stamped with the current time.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            updated_at: now_millis(),
        }
    }

    /// Look up an entry by id.
    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }
}

/// A named copy of a past `CipherPayload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub id: String,
    pub name: String,
    pub created_at: i64,
    pub payload: CipherPayload,
}

/// Standard base64 (with padding) for byte fields.
mod b64 {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.trim())
            .map_err(serde::de::Error::custom)
    }
}
