// SPDX-FileCopyrightText: 2026 Eleuthia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key-value store trait for the per-user storage collaborator.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::EleuthiaError;
use crate::types::StorageEvent;

/// A per-user, authenticated key-value store holding opaque strings.
///
/// Implementations must make each `set`/`delete` atomic per key: a reader
/// never observes a half-written value. No cross-key atomicity is required.
/// The store only ever receives ciphertext and public KDF parameters from
/// the vault.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Returns the human-readable name of this store backend.
    fn name(&self) -> &str;

    /// Reads the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, EleuthiaError>;

    /// Writes `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), EleuthiaError>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), EleuthiaError>;

    /// Subscribes to change notifications for every key in this store.
    fn subscribe(&self) -> broadcast::Receiver<StorageEvent>;
}
