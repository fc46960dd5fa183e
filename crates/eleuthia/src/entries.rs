// SPDX-FileCopyrightText: 2026 Eleuthia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entry commands: list, search, sites, add, show, delete, import.

use std::io::Write;
use std::path::Path;

use eleuthia_core::EleuthiaError;
use eleuthia_vault::{Entry, SearchFilters, VaultManager};

/// Environment variable consulted for an entry password before prompting.
pub const ENTRY_PASSWORD_ENV_VAR: &str = "ELEUTHIA_ENTRY_PASSWORD";

const MASK: &str = "••••••••";

pub(crate) fn io_err(e: std::io::Error) -> EleuthiaError {
    EleuthiaError::Internal(format!("failed to write output: {e}"))
}

/// Field values for `add`.
#[derive(Debug, Default)]
pub struct EntryFields {
    pub id: Option<String>,
    pub title: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub url: Option<String>,
    pub notes: Option<String>,
}

fn write_row(out: &mut dyn Write, entry: &Entry) -> std::io::Result<()> {
    let host = entry.hostname().unwrap_or_else(|| "-".to_string());
    let user = entry.username.as_deref().unwrap_or("-");
    let pass = if entry.has_password() { MASK } else { "-" };
    writeln!(out, "{}  {}  {}  {}  {}", entry.id, entry.title, host, user, pass)
}

/// Print every entry, newest first. Passwords are always masked.
pub async fn run_list(manager: &VaultManager, out: &mut dyn Write) -> Result<(), EleuthiaError> {
    let entries = manager.entries().await?;
    if entries.is_empty() {
        writeln!(out, "Vault is empty.").map_err(io_err)?;
        return Ok(());
    }
    for entry in &entries {
        write_row(out, entry).map_err(io_err)?;
    }
    Ok(())
}

/// Print entries matching `query` and `filters`.
pub async fn run_search(
    manager: &VaultManager,
    query: &str,
    filters: &SearchFilters,
    out: &mut dyn Write,
) -> Result<(), EleuthiaError> {
    let hits = manager.search(query, filters).await?;
    if hits.is_empty() {
        writeln!(out, "No matching entries.").map_err(io_err)?;
        return Ok(());
    }
    for entry in &hits {
        write_row(out, entry).map_err(io_err)?;
    }
    Ok(())
}

/// Print the distinct site hostnames, sorted.
pub async fn run_sites(manager: &VaultManager, out: &mut dyn Write) -> Result<(), EleuthiaError> {
    for site in manager.list_sites().await? {
        writeln!(out, "{site}").map_err(io_err)?;
    }
    Ok(())
}

/// Create or replace an entry.
pub async fn run_add(
    manager: &VaultManager,
    fields: EntryFields,
    out: &mut dyn Write,
) -> Result<(), EleuthiaError> {
    let entry = Entry {
        id: fields.id.unwrap_or_default(),
        title: fields.title,
        username: fields.username,
        password: fields.password,
        url: fields.url,
        notes: fields.notes,
        updated_at: 0,
    };
    let saved = manager.upsert_entry(entry).await?;
    writeln!(out, "Saved {} ({})", saved.title, saved.id).map_err(io_err)?;
    Ok(())
}

/// Print one entry. The password is shown only with `reveal`.
pub async fn run_show(
    manager: &VaultManager,
    id: &str,
    reveal: bool,
    out: &mut dyn Write,
) -> Result<(), EleuthiaError> {
    let entry = manager
        .get_entry(id)
        .await?
        .ok_or_else(|| EleuthiaError::Validation(format!("no entry with id {id}")))?;

    let password = match (&entry.password, reveal) {
        (Some(p), true) if !p.is_empty() => p.as_str(),
        (Some(p), false) if !p.is_empty() => MASK,
        _ => "-",
    };
    let rows = [
        ("id", entry.id.as_str()),
        ("title", entry.title.as_str()),
        ("username", entry.username.as_deref().unwrap_or("-")),
        ("password", password),
        ("url", entry.url.as_deref().unwrap_or("-")),
        ("notes", entry.notes.as_deref().unwrap_or("-")),
    ];
    for (label, value) in rows {
        writeln!(out, "{label:<9} {value}").map_err(io_err)?;
    }
    Ok(())
}

/// Delete an entry by id.
pub async fn run_delete(
    manager: &VaultManager,
    id: &str,
    out: &mut dyn Write,
) -> Result<(), EleuthiaError> {
    if manager.delete_entry(id).await? {
        writeln!(out, "Deleted {id}").map_err(io_err)?;
    } else {
        writeln!(out, "No entry with id {id}").map_err(io_err)?;
    }
    Ok(())
}

/// Import a browser-style CSV export.
pub async fn run_import(
    manager: &VaultManager,
    path: &Path,
    out: &mut dyn Write,
) -> Result<(), EleuthiaError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        EleuthiaError::Validation(format!("cannot read {}: {e}", path.display()))
    })?;
    let count = manager.import_csv(&text).await?;
    writeln!(out, "Imported {count} entries").map_err(io_err)?;
    Ok(())
}
