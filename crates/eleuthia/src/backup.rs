// SPDX-FileCopyrightText: 2026 Eleuthia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `eleuthia export`, `restore-backup` and `snapshot` command implementation.
//!
//! These commands move ciphertext only. The vault never has to be unlocked,
//! though the caller verifies the passphrase before invoking them.

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use eleuthia_core::EleuthiaError;
use eleuthia_vault::VaultManager;

use crate::entries::io_err;

fn require_confirmation(yes: bool, action: &str) -> Result<(), EleuthiaError> {
    if yes {
        Ok(())
    } else {
        Err(EleuthiaError::Validation(format!(
            "{action} replaces the current vault; pass --yes to confirm"
        )))
    }
}

fn format_millis(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| ms.to_string())
}

/// Write the encrypted backup file into `dir`.
pub async fn run_export(
    manager: &VaultManager,
    dir: &Path,
    out: &mut dyn Write,
) -> Result<(), EleuthiaError> {
    let file = manager.export_encrypted(Utc::now().date_naive()).await?;
    let path = file.write_to(dir)?;
    writeln!(out, "Exported encrypted vault to {}", path.display()).map_err(io_err)?;
    Ok(())
}

/// Replace the stored ciphertext with a backup file.
pub async fn run_restore_backup(
    manager: &VaultManager,
    path: &Path,
    yes: bool,
    out: &mut dyn Write,
) -> Result<(), EleuthiaError> {
    require_confirmation(yes, "restoring a backup")?;
    let contents = std::fs::read_to_string(path).map_err(|e| {
        EleuthiaError::Validation(format!("cannot read {}: {e}", path.display()))
    })?;
    manager.restore_backup(&contents).await?;
    writeln!(out, "Backup restored; the vault is locked.").map_err(io_err)?;
    Ok(())
}

pub async fn run_snapshot_create(
    manager: &VaultManager,
    name: Option<&str>,
    out: &mut dyn Write,
) -> Result<(), EleuthiaError> {
    let snapshot = manager.create_snapshot(name).await?;
    writeln!(out, "Created snapshot {} ({})", snapshot.name, snapshot.id).map_err(io_err)?;
    Ok(())
}

pub async fn run_snapshot_list(
    manager: &VaultManager,
    out: &mut dyn Write,
) -> Result<(), EleuthiaError> {
    let snapshots = manager.list_snapshots().await?;
    if snapshots.is_empty() {
        writeln!(out, "No snapshots.").map_err(io_err)?;
        return Ok(());
    }
    for snapshot in &snapshots {
        writeln!(
            out,
            "{}  {}  {}",
            snapshot.id,
            format_millis(snapshot.created_at),
            snapshot.name
        )
        .map_err(io_err)?;
    }
    Ok(())
}

pub async fn run_snapshot_restore(
    manager: &VaultManager,
    id: &str,
    yes: bool,
    out: &mut dyn Write,
) -> Result<(), EleuthiaError> {
    require_confirmation(yes, "restoring a snapshot")?;
    manager.restore_snapshot(id).await?;
    writeln!(out, "Snapshot {id} restored; the vault is locked.").map_err(io_err)?;
    Ok(())
}

pub async fn run_snapshot_delete(
    manager: &VaultManager,
    id: &str,
    out: &mut dyn Write,
) -> Result<(), EleuthiaError> {
    if manager.delete_snapshot(id).await? {
        writeln!(out, "Deleted snapshot {id}").map_err(io_err)?;
    } else {
        writeln!(out, "No snapshot with id {id}").map_err(io_err)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use eleuthia_test_utils::{TEST_PASSPHRASE, TestVault};
    use eleuthia_vault::Entry;

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[tokio::test]
    async fn export_then_restore_round_trips_file() {
        let vault = TestVault::builder().created().build().await.unwrap();
        vault.manager.upsert_entry(Entry::new("Keep")).await.unwrap();
        let dir = tempfile::tempdir().unwrap();

        let mut buf = Vec::new();
        run_export(&vault.manager, dir.path(), &mut buf).await.unwrap();
        assert!(output(buf).contains("ELEUTHIA-encrypted-"));

        let file = std::fs::read_dir(dir.path())
            .unwrap()
            .next()
            .unwrap()
            .unwrap()
            .path();

        vault.manager.upsert_entry(Entry::new("Drop")).await.unwrap();
        let mut buf = Vec::new();
        run_restore_backup(&vault.manager, &file, true, &mut buf)
            .await
            .unwrap();
        assert!(!vault.gate.is_unlocked());

        vault.relock_with(TEST_PASSPHRASE).await.unwrap();
        let titles: Vec<_> = vault
            .manager
            .entries()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, ["Keep"]);
    }

    #[tokio::test]
    async fn restore_requires_confirmation() {
        let vault = TestVault::builder().created().build().await.unwrap();
        let before = vault.stored_cipher().await;
        let mut buf = Vec::new();
        let err = run_restore_backup(&vault.manager, Path::new("missing.json"), false, &mut buf)
            .await
            .unwrap_err();
        assert!(matches!(err, EleuthiaError::Validation(_)));
        assert_eq!(vault.stored_cipher().await, before);
        assert!(vault.gate.is_unlocked());
    }

    #[tokio::test]
    async fn snapshot_commands() {
        let vault = TestVault::builder().created().build().await.unwrap();

        let mut buf = Vec::new();
        run_snapshot_list(&vault.manager, &mut buf).await.unwrap();
        assert_eq!(output(buf), "No snapshots.\n");

        let mut buf = Vec::new();
        run_snapshot_create(&vault.manager, Some("before import"), &mut buf)
            .await
            .unwrap();
        assert!(output(buf).starts_with("Created snapshot before import (snap_"));

        let id = vault.manager.list_snapshots().await.unwrap()[0].id.clone();
        let mut buf = Vec::new();
        run_snapshot_list(&vault.manager, &mut buf).await.unwrap();
        assert!(output(buf).contains("before import"));

        let mut buf = Vec::new();
        run_snapshot_delete(&vault.manager, &id, &mut buf).await.unwrap();
        assert_eq!(output(buf), format!("Deleted snapshot {id}\n"));
        assert!(vault.manager.list_snapshots().await.unwrap().is_empty());
    }

    #[test]
    fn millis_format_as_utc() {
        assert_eq!(format_millis(0), "1970-01-01 00:00:00 UTC");
    }
}
