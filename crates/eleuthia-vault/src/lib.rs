// SPDX-FileCopyrightText: 2026 Eleuthia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Passphrase-protected credential vault.
//!
//! A passphrase is stretched with PBKDF2-HMAC-SHA256 into an AES-256-GCM key
//! that encrypts one JSON document holding every entry. The key-value store
//! only ever receives the public KDF parameters and ciphertext:
//!
//! - [`SessionGate`] owns the key and plaintext while unlocked.
//! - [`VaultManager`] edits, searches, imports and exports through the gate.
//! - [`VaultStore`] maps the vault records onto a [`KeyValueStore`](eleuthia_core::KeyValueStore).

pub mod crypto;
pub mod export;
pub mod import;
pub mod kdf;
pub mod manager;
pub mod model;
pub mod prompt;
pub mod session;
pub mod snapshots;
pub mod store;

pub use export::ExportFile;
pub use manager::{SearchFilters, VaultManager};
pub use model::{CipherPayload, Entry, Snapshot, VaultDocument, VaultMeta};
pub use prompt::{get_new_passphrase, get_passphrase};
pub use session::{SessionGate, SessionState, TabSession};
pub use store::{VaultKeys, VaultStore};
