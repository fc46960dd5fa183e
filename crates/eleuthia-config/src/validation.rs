// SPDX-FileCopyrightText: 2026 Eleuthia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as minimum KDF rigor and distinct record keys.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::EleuthiaConfig;

/// Smallest salt accepted for newly created vaults.
pub const MIN_SALT_LEN: usize = 16;

/// Log levels accepted by `log.level`.
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &EleuthiaConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.vault.kdf_iterations < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "vault.kdf_iterations must be at least 1, got {}",
                config.vault.kdf_iterations
            ),
        });
    }

    if config.vault.salt_len < MIN_SALT_LEN {
        errors.push(ConfigError::Validation {
            message: format!(
                "vault.salt_len must be at least {MIN_SALT_LEN} bytes, got {}",
                config.vault.salt_len
            ),
        });
    }

    if config.vault.tab_session_ttl_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "vault.tab_session_ttl_secs must be greater than 0".to_string(),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.storage.user_id.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.user_id must not be empty".to_string(),
        });
    }

    // Record keys must be non-empty and pairwise distinct, otherwise the
    // cipher could overwrite the metadata.
    let keys = [
        ("storage.meta_key", &config.storage.meta_key),
        ("storage.cipher_key", &config.storage.cipher_key),
        ("storage.snapshots_key", &config.storage.snapshots_key),
    ];
    let mut seen = HashSet::new();
    for (name, value) in keys {
        if value.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("{name} must not be empty"),
            });
        } else if !seen.insert(value.as_str()) {
            errors.push(ConfigError::Validation {
                message: format!("{name} `{value}` duplicates another storage key"),
            });
        }
    }

    if !LOG_LEVELS.contains(&config.log.level.to_ascii_lowercase().as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log.level `{}` is not one of: {}",
                config.log.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
