// SPDX-FileCopyrightText: 2026 Eleuthia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring from configuration to a ready vault stack.

use std::sync::Arc;

use eleuthia_config::model::EleuthiaConfig;
use eleuthia_core::{EleuthiaError, KeyValueStore};
use eleuthia_storage::SqliteStore;
use eleuthia_vault::{SessionGate, VaultKeys, VaultManager, VaultStore, prompt};
use tracing::debug;

/// The config, gate and manager for one CLI invocation.
pub struct App {
    pub config: EleuthiaConfig,
    pub gate: Arc<SessionGate>,
    pub manager: VaultManager,
}

impl App {
    /// Open the SQLite store named by `config`.
    pub async fn open(config: EleuthiaConfig) -> Result<Self, EleuthiaError> {
        let store = SqliteStore::from_config(&config.storage).await?;
        debug!(path = %config.storage.database_path, "store ready");
        Ok(Self::with_backend(config, Arc::new(store)))
    }

    /// Assemble the stack over any key-value store.
    pub fn with_backend(config: EleuthiaConfig, backend: Arc<dyn KeyValueStore>) -> Self {
        let store = VaultStore::new(backend, VaultKeys::from(&config.storage));
        let gate = Arc::new(SessionGate::new(store, config.vault.clone()));
        let manager = VaultManager::new(gate.clone());
        Self {
            config,
            gate,
            manager,
        }
    }

    /// Prompt for the passphrase and unlock.
    pub async fn unlock(&self) -> Result<(), EleuthiaError> {
        let passphrase = prompt::get_passphrase()?;
        self.gate.unlock(&passphrase).await.map(|_| ())
    }

    /// Prompt for the passphrase and prove it decrypts the vault, without
    /// unlocking. Used for commands that only move ciphertext around.
    pub async fn authorize(&self) -> Result<(), EleuthiaError> {
        let passphrase = prompt::get_passphrase()?;
        self.gate.authorize_tab(&passphrase).await.map(|_| ())
    }
}
