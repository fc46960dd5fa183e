// SPDX-FileCopyrightText: 2026 Eleuthia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./eleuthia.toml` > `~/.config/eleuthia/eleuthia.toml` > `/etc/eleuthia/eleuthia.toml`
//! with environment variable overrides via `ELEUTHIA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::EleuthiaConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/eleuthia/eleuthia.toml";

/// Configuration file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "eleuthia.toml";

/// Path of the per-user XDG configuration file, if a config dir is known.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("eleuthia/eleuthia.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/eleuthia/eleuthia.toml` (system-wide)
/// 3. `~/.config/eleuthia/eleuthia.toml` (user XDG config)
/// 4. `./eleuthia.toml` (local directory)
/// 5. `ELEUTHIA_*` environment variables
pub fn load_config() -> Result<EleuthiaConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<EleuthiaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(EleuthiaConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<EleuthiaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(EleuthiaConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(EleuthiaConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Create the environment variable provider.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `ELEUTHIA_VAULT_KDF_ITERATIONS` must map to
/// `vault.kdf_iterations`, not `vault.kdf.iterations`.
/// `ELEUTHIA_PASSPHRASE` and `ELEUTHIA_ENTRY_PASSWORD` are secrets read by the
/// CLI itself and are ignored here.
fn env_provider() -> Env {
    Env::prefixed("ELEUTHIA_")
        .ignore(&["passphrase", "entry_password"])
        .map(|key| {
            let mapped = key
                .as_str()
                .replacen("vault_", "vault.", 1)
                .replacen("storage_", "storage.", 1)
                .replacen("log_", "log.", 1);
            mapped.into()
        })
}
