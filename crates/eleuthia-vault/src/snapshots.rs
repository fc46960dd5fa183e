// SPDX-FileCopyrightText: 2026 Eleuthia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Named snapshots of the encrypted vault.
//!
//! A snapshot is a copy of the cipher record at some point in time. Taking
//! and restoring one never decrypts anything.

use eleuthia_core::EleuthiaError;
use tracing::info;

use crate::model::{Snapshot, new_snapshot_id, now_millis};
use crate::session::SessionGate;
use crate::store::VaultStore;

/// Name used when a snapshot is created without one.
pub const DEFAULT_SNAPSHOT_NAME: &str = "Snapshot";

/// Copy the current cipher record into a new snapshot.
pub async fn create_snapshot(
    store: &VaultStore,
    name: Option<&str>,
) -> Result<Snapshot, EleuthiaError> {
    let payload = store
        .read_cipher()
        .await?
        .ok_or(EleuthiaError::VaultNotFound)?;

    let name = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_SNAPSHOT_NAME);
    let snapshot = Snapshot {
        id: new_snapshot_id(),
        name: name.to_string(),
        created_at: now_millis(),
        payload,
    };

    let mut all = store.read_snapshots().await?;
    all.insert(0, snapshot.clone());
    store.write_snapshots(&all).await?;

    info!(id = %snapshot.id, name = %snapshot.name, "snapshot created");
    Ok(snapshot)
}

/// All snapshots, newest first.
pub async fn list_snapshots(store: &VaultStore) -> Result<Vec<Snapshot>, EleuthiaError> {
    let mut all = store.read_snapshots().await?;
    all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(all)
}

/// Overwrite the vault cipher with snapshot `id` and lock the gate.
pub async fn restore_snapshot(gate: &SessionGate, id: &str) -> Result<(), EleuthiaError> {
    let snapshot = gate
        .store()
        .read_snapshots()
        .await?
        .into_iter()
        .find(|s| s.id == id)
        .ok_or_else(|| EleuthiaError::Validation(format!("no snapshot with id `{id}`")))?;

    gate.replace_cipher(&snapshot.payload).await?;
    info!(id, "snapshot restored");
    Ok(())
}

/// Remove snapshot `id`. Returns whether it existed.
pub async fn delete_snapshot(store: &VaultStore, id: &str) -> Result<bool, EleuthiaError> {
    let mut all = store.read_snapshots().await?;
    let before = all.len();
    all.retain(|s| s.id != id);
    if all.len() == before {
        return Ok(false);
    }
    store.write_snapshots(&all).await?;
    info!(id, "snapshot deleted");
    Ok(true)
}
