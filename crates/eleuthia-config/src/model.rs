// SPDX-FileCopyrightText: 2026 Eleuthia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Eleuthia vault.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Eleuthia configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EleuthiaConfig {
    /// Key derivation and session settings.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Storage backend and record key settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// Key derivation and session configuration.
///
/// `kdf_iterations` and `salt_len` only apply when a vault is created. An
/// existing vault always unlocks with the parameters stored in its metadata.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// PBKDF2-HMAC-SHA256 iteration count for new vaults (default: 250000).
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// Salt length in bytes for new vaults (default: 16).
    #[serde(default = "default_salt_len")]
    pub salt_len: usize,

    /// Lifetime of a tab-session token in seconds (default: 12 hours).
    #[serde(default = "default_tab_session_ttl_secs")]
    pub tab_session_ttl_secs: u64,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            kdf_iterations: default_kdf_iterations(),
            salt_len: default_salt_len(),
            tab_session_ttl_secs: default_tab_session_ttl_secs(),
        }
    }
}

fn default_kdf_iterations() -> u32 {
    250_000
}

fn default_salt_len() -> usize {
    16
}

fn default_tab_session_ttl_secs() -> u64 {
    12 * 60 * 60
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// User the key-value records are scoped to.
    #[serde(default = "default_user_id")]
    pub user_id: String,

    /// Record key holding the vault metadata (salt, iterations, version).
    #[serde(default = "default_meta_key")]
    pub meta_key: String,

    /// Record key holding the encrypted vault document.
    #[serde(default = "default_cipher_key")]
    pub cipher_key: String,

    /// Record key holding encrypted snapshots.
    #[serde(default = "default_snapshots_key")]
    pub snapshots_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            user_id: default_user_id(),
            meta_key: default_meta_key(),
            cipher_key: default_cipher_key(),
            snapshots_key: default_snapshots_key(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_local_dir()
        .map(|d| d.join("eleuthia/eleuthia.db").display().to_string())
        .unwrap_or_else(|| "eleuthia.db".to_string())
}

fn default_user_id() -> String {
    "local".to_string()
}

fn default_meta_key() -> String {
    "eleu.meta".to_string()
}

fn default_cipher_key() -> String {
    "eleu.vault".to_string()
}

fn default_snapshots_key() -> String {
    "eleu.snapshots".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
