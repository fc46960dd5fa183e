// SPDX-FileCopyrightText: 2026 Eleuthia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end vault testing.
//!
//! `TestVault` assembles a gate and manager over a fresh store with a cheap
//! KDF, optionally backed by a temp SQLite database.

use std::sync::Arc;

use eleuthia_config::model::VaultConfig;
use eleuthia_core::{EleuthiaError, KeyValueStore, UserId};
use eleuthia_storage::{MemoryStore, SqliteStore};
use eleuthia_vault::{SessionGate, VaultKeys, VaultManager, VaultStore};
use secrecy::SecretString;

/// Passphrase used by [`TestVaultBuilder::created`].
pub const TEST_PASSPHRASE: &str = "correct-horse";

/// KDF iterations used by default in tests.
const TEST_ITERATIONS: u32 = 1_000;

enum Backend {
    Memory,
    Sqlite,
    Custom(Arc<dyn KeyValueStore>),
}

/// Builder for creating test vaults with configurable options.
pub struct TestVaultBuilder {
    backend: Backend,
    config: VaultConfig,
    create: bool,
}

impl TestVaultBuilder {
    fn new() -> Self {
        Self {
            backend: Backend::Memory,
            config: VaultConfig {
                kdf_iterations: TEST_ITERATIONS,
                ..VaultConfig::default()
            },
            create: false,
        }
    }

    /// Back the vault with a temp-file SQLite database.
    pub fn with_sqlite(mut self) -> Self {
        self.backend = Backend::Sqlite;
        self
    }

    /// Back the vault with a caller-supplied store (e.g. a [`FailingStore`](crate::FailingStore)).
    pub fn with_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.backend = Backend::Custom(store);
        self
    }

    /// Override the vault configuration.
    pub fn with_config(mut self, config: VaultConfig) -> Self {
        self.config = config;
        self
    }

    /// Create a vault protected by [`TEST_PASSPHRASE`] during build; the
    /// harness starts unlocked.
    pub fn created(mut self) -> Self {
        self.create = true;
        self
    }

    /// Build the harness.
    pub async fn build(self) -> Result<TestVault, EleuthiaError> {
        let temp_dir = tempfile::TempDir::new().map_err(EleuthiaError::persistence)?;

        let backend: Arc<dyn KeyValueStore> = match self.backend {
            Backend::Memory => Arc::new(MemoryStore::new()),
            Backend::Sqlite => Arc::new(
                SqliteStore::open(
                    temp_dir.path().join("test.db"),
                    UserId("test-user".to_string()),
                )
                .await?,
            ),
            Backend::Custom(store) => store,
        };

        let store = VaultStore::new(backend.clone(), VaultKeys::default());
        let gate = Arc::new(SessionGate::new(store, self.config));
        let manager = VaultManager::new(gate.clone());

        if self.create {
            let pass = passphrase(TEST_PASSPHRASE);
            gate.create(&pass, &pass).await?;
        }

        Ok(TestVault {
            backend,
            gate,
            manager,
            _temp_dir: temp_dir,
        })
    }
}

/// A vault stack over a throwaway store.
pub struct TestVault {
    /// The key-value store the vault writes to.
    pub backend: Arc<dyn KeyValueStore>,
    /// The session gate.
    pub gate: Arc<SessionGate>,
    /// The manager over `gate`.
    pub manager: VaultManager,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestVault {
    /// Create a new builder for configuring the harness.
    pub fn builder() -> TestVaultBuilder {
        TestVaultBuilder::new()
    }

    /// The raw stored cipher record, if any.
    pub async fn stored_cipher(&self) -> Option<String> {
        let key = self.gate.store().keys().cipher.clone();
        self.backend.get(&key).await.ok().flatten()
    }

    /// Lock, then unlock again with `pass`.
    pub async fn relock_with(&self, pass: &str) -> Result<(), EleuthiaError> {
        self.gate.lock().await;
        self.gate.unlock(&passphrase(pass)).await.map(|_| ())
    }
}

/// Wrap a test passphrase.
pub fn passphrase(s: &str) -> SecretString {
    SecretString::from(s.to_string())
}
