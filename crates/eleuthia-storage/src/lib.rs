// SPDX-FileCopyrightText: 2026 Eleuthia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user key-value storage backends for the Eleuthia vault.
//!
//! Two implementations of [`KeyValueStore`](eleuthia_core::KeyValueStore):
//! - [`MemoryStore`] keeps records in a process-local map (tests, ephemeral use).
//! - [`SqliteStore`] persists records in a `user_storage` table through
//!   `tokio-rusqlite`'s single background thread, with embedded migrations.
//!
//! Both only ever see opaque strings; the vault hands them ciphertext.

pub mod memory;
pub mod migrations;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
