// SPDX-FileCopyrightText: 2026 Eleuthia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entry CRUD, search, import and backup operations over an unlocked vault.
//!
//! Every mutation re-encrypts the whole document and persists it before the
//! in-memory copy changes. A failed write leaves the session as it was and
//! surfaces as [`EleuthiaError::Persistence`].

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use eleuthia_core::EleuthiaError;
use tracing::{debug, info};

use crate::export::{self, ExportFile};
use crate::import;
use crate::model::{Entry, Snapshot, VaultDocument, new_entry_id, now_millis};
use crate::session::SessionGate;
use crate::snapshots;

/// Optional narrowing applied after the text query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    /// Keep only entries whose URL host equals this (case-insensitive).
    pub site: Option<String>,
    /// Keep only entries with a non-empty password.
    pub require_password: bool,
}

/// Operations on the vault behind a [`SessionGate`].
#[derive(Debug, Clone)]
pub struct VaultManager {
    gate: Arc<SessionGate>,
}

impl VaultManager {
    pub fn new(gate: Arc<SessionGate>) -> Self {
        Self { gate }
    }

    pub fn gate(&self) -> &Arc<SessionGate> {
        &self.gate
    }

    /// Entries matching `query` and `filters`, in document order.
    ///
    /// The query is a case-insensitive substring over title, username, URL
    /// and notes. A blank query matches everything.
    pub async fn search(
        &self,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<Entry>, EleuthiaError> {
        let needle = query.trim().to_lowercase();
        let site = filters.site.as_deref().map(str::to_lowercase);

        self.gate
            .read(|doc| {
                doc.entries
                    .iter()
                    .filter(|e| matches_query(e, &needle))
                    .filter(|e| match &site {
                        Some(site) => e.hostname().as_deref() == Some(site.as_str()),
                        None => true,
                    })
                    .filter(|e| !filters.require_password || e.has_password())
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .await
    }

    /// Sorted hostnames of every entry with a parsable URL.
    pub async fn list_sites(&self) -> Result<BTreeSet<String>, EleuthiaError> {
        self.gate
            .read(|doc| {
                doc.entries
                    .iter()
                    .filter_map(Entry::hostname)
                    .collect::<BTreeSet<_>>()
            })
            .await
    }

    pub async fn entries(&self) -> Result<Vec<Entry>, EleuthiaError> {
        self.gate.read(|doc| doc.entries.clone()).await
    }

    pub async fn get_entry(&self, id: &str) -> Result<Option<Entry>, EleuthiaError> {
        self.gate.read(|doc| doc.get(id).cloned()).await
    }

    /// A copy of the whole decrypted document.
    pub async fn document(&self) -> Result<VaultDocument, EleuthiaError> {
        self.gate.read(VaultDocument::clone).await
    }

    /// Replace the entry with the same id in place, or prepend a new one.
    ///
    /// An empty id gets a generated one. Returns the stored entry.
    pub async fn upsert_entry(&self, mut entry: Entry) -> Result<Entry, EleuthiaError> {
        if entry.title.trim().is_empty() {
            return Err(EleuthiaError::Validation(
                "entry title must not be empty".to_string(),
            ));
        }
        if entry.id.trim().is_empty() {
            entry.id = new_entry_id();
        }

        let now = now_millis();
        entry.updated_at = now;
        let stored = self
            .gate
            .mutate(move |doc| {
                match doc.entries.iter_mut().find(|e| e.id == entry.id) {
                    Some(slot) => *slot = entry.clone(),
                    None => doc.entries.insert(0, entry.clone()),
                }
                doc.updated_at = now;
                Ok(entry)
            })
            .await?;

        debug!(id = %stored.id, "entry saved");
        Ok(stored)
    }

    /// Remove entry `id` and persist. Returns whether it existed.
    pub async fn delete_entry(&self, id: &str) -> Result<bool, EleuthiaError> {
        let now = now_millis();
        let removed = self
            .gate
            .mutate(|doc| {
                let before = doc.entries.len();
                doc.entries.retain(|e| e.id != id);
                doc.updated_at = now;
                Ok(doc.entries.len() != before)
            })
            .await?;

        debug!(id, removed, "entry deleted");
        Ok(removed)
    }

    /// Import a CSV export, prepending the parsed entries in one write.
    ///
    /// Returns the number of imported entries. An empty batch writes nothing.
    pub async fn import_csv(&self, text: &str) -> Result<usize, EleuthiaError> {
        if !self.gate.is_unlocked() {
            return Err(EleuthiaError::Locked);
        }
        let now = now_millis();
        let batch = import::parse_csv(text, now)?;
        if batch.is_empty() {
            info!(count = 0, "CSV import: nothing to import");
            return Ok(0);
        }

        let count = self
            .gate
            .mutate(move |doc| {
                let count = batch.len();
                doc.entries.splice(0..0, batch);
                doc.updated_at = now;
                Ok(count)
            })
            .await?;

        info!(count, "CSV import complete");
        Ok(count)
    }

    /// The stored ciphertext as a dated export file.
    pub async fn export_encrypted(&self, date: NaiveDate) -> Result<ExportFile, EleuthiaError> {
        export::export_encrypted(self.gate.store(), date).await
    }

    /// Replace the stored cipher with an encrypted backup and lock.
    pub async fn restore_backup(&self, contents: &str) -> Result<(), EleuthiaError> {
        let payload = export::parse_backup(contents)?;
        self.gate.replace_cipher(&payload).await
    }

    pub async fn create_snapshot(&self, name: Option<&str>) -> Result<Snapshot, EleuthiaError> {
        snapshots::create_snapshot(self.gate.store(), name).await
    }

    pub async fn list_snapshots(&self) -> Result<Vec<Snapshot>, EleuthiaError> {
        snapshots::list_snapshots(self.gate.store()).await
    }

    pub async fn restore_snapshot(&self, id: &str) -> Result<(), EleuthiaError> {
        snapshots::restore_snapshot(&self.gate, id).await
    }

    pub async fn delete_snapshot(&self, id: &str) -> Result<bool, EleuthiaError> {
        snapshots::delete_snapshot(self.gate.store(), id).await
    }
}

fn matches_query(entry: &Entry, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    [
        Some(entry.title.as_str()),
        entry.username.as_deref(),
        entry.url.as_deref(),
        entry.notes.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(needle))
}
