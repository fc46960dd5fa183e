// SPDX-FileCopyrightText: 2026 Eleuthia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `eleuthia status` command implementation.
//!
//! Reports whether a vault exists and its public KDF parameters. Never
//! prompts for the passphrase.

use std::io::Write;

use eleuthia_config::model::EleuthiaConfig;
use eleuthia_core::EleuthiaError;
use eleuthia_vault::VaultManager;
use serde::Serialize;

use crate::entries::io_err;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub vault_exists: bool,
    pub kdf_iterations: Option<u32>,
    pub salt_len: Option<usize>,
    pub snapshots: usize,
    pub database_path: String,
    pub user_id: String,
}

/// Gather status without touching key material.
pub async fn collect_status(
    config: &EleuthiaConfig,
    manager: &VaultManager,
) -> Result<StatusResponse, EleuthiaError> {
    let store = manager.gate().store();
    let meta = store.read_meta().await?;
    let vault_exists = manager.gate().vault_exists().await?;
    let snapshots = store.read_snapshots().await?.len();
    Ok(StatusResponse {
        vault_exists,
        kdf_iterations: meta.as_ref().map(|m| m.iterations),
        salt_len: meta.as_ref().map(|m| m.salt.len()),
        snapshots,
        database_path: config.storage.database_path.clone(),
        user_id: config.storage.user_id.clone(),
    })
}

/// Run the `eleuthia status` command.
pub async fn run_status(
    config: &EleuthiaConfig,
    manager: &VaultManager,
    json: bool,
    out: &mut dyn Write,
) -> Result<(), EleuthiaError> {
    let status = collect_status(config, manager).await?;

    if json {
        let text = serde_json::to_string_pretty(&status)
            .map_err(|e| EleuthiaError::Internal(format!("failed to encode status: {e}")))?;
        writeln!(out, "{text}").map_err(io_err)?;
        return Ok(());
    }

    if status.vault_exists {
        writeln!(out, "Vault:      present").map_err(io_err)?;
    } else {
        writeln!(out, "Vault:      not created (run `eleuthia init`)").map_err(io_err)?;
    }
    if let Some(iterations) = status.kdf_iterations {
        writeln!(out, "KDF:        PBKDF2-SHA256, {iterations} iterations").map_err(io_err)?;
    }
    writeln!(out, "Snapshots:  {}", status.snapshots).map_err(io_err)?;
    writeln!(out, "Database:   {}", status.database_path).map_err(io_err)?;
    writeln!(out, "User:       {}", status.user_id).map_err(io_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use eleuthia_test_utils::TestVault;

    #[tokio::test]
    async fn status_of_missing_vault() {
        let vault = TestVault::builder().build().await.unwrap();
        let status = collect_status(&EleuthiaConfig::default(), &vault.manager)
            .await
            .unwrap();
        assert!(!status.vault_exists);
        assert_eq!(status.kdf_iterations, None);
        assert_eq!(status.snapshots, 0);
    }

    #[tokio::test]
    async fn status_json_reports_kdf_parameters() {
        let vault = TestVault::builder().created().build().await.unwrap();
        let mut buf = Vec::new();
        run_status(&EleuthiaConfig::default(), &vault.manager, true, &mut buf)
            .await
            .unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["vault_exists"], true);
        assert_eq!(value["kdf_iterations"], 1000);
        assert_eq!(value["salt_len"], 16);
    }
}
