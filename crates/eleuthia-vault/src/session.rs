// SPDX-FileCopyrightText: 2026 Eleuthia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session gate: the only holder of the derived key and decrypted document.
//!
//! ```text
//! Locked --unlock--> Unlocking --ok--> Unlocked --lock--> Locked
//! Locked --create--> CreatingVault --ok--> Unlocked
//! ```
//!
//! A failed transition returns to the state it started from. All transitions
//! and mutations are serialized by one async mutex.
//!
//! A [`TabSession`] is a short-lived token that lets a front-end skip the
//! passphrase prompt. It never grants access to content on its own; only a
//! successful decrypt puts the gate in `Unlocked`.

use std::sync::Mutex as StdMutex;

use chrono::{DateTime, TimeDelta, Utc};
use eleuthia_config::model::VaultConfig;
use eleuthia_core::EleuthiaError;
use secrecy::{ExposeSecret, SecretString};
use strum::{Display, EnumString};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::crypto;
use crate::kdf::{self, DerivedKey};
use crate::model::{CipherPayload, META_VERSION, VaultDocument, VaultMeta};
use crate::store::VaultStore;

/// Observable gate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum SessionState {
    Locked,
    Unlocking,
    CreatingVault,
    Unlocked,
}

/// Proof that the passphrase decrypted the vault earlier in this session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabSession {
    id: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl TabSession {
    fn issue(ttl_secs: u64) -> Self {
        let issued_at = Utc::now();
        let ttl = i64::try_from(ttl_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX);
        Self {
            id: uuid::Uuid::new_v4().simple().to_string(),
            issued_at,
            expires_at: issued_at
                .checked_add_signed(ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Key and plaintext, held only while unlocked.
pub(crate) struct UnlockedVault {
    pub(crate) key: DerivedKey,
    pub(crate) document: VaultDocument,
}

impl std::fmt::Debug for UnlockedVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnlockedVault")
            .field("key", &"[REDACTED]")
            .field("entries", &self.document.entries.len())
            .finish()
    }
}

/// Gates access to the decrypted vault.
pub struct SessionGate {
    store: VaultStore,
    config: VaultConfig,
    unlocked: Mutex<Option<UnlockedVault>>,
    state: watch::Sender<SessionState>,
    tab: StdMutex<Option<TabSession>>,
}

impl std::fmt::Debug for SessionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGate")
            .field("store", &self.store)
            .field("state", &self.state())
            .finish()
    }
}

impl SessionGate {
    /// A locked gate over `store`. `config` supplies creation parameters and
    /// the tab-session lifetime; unlock always uses the stored parameters.
    pub fn new(store: VaultStore, config: VaultConfig) -> Self {
        let (state, _) = watch::channel(SessionState::Locked);
        Self {
            store,
            config,
            unlocked: Mutex::new(None),
            state,
            tab: StdMutex::new(None),
        }
    }

    pub fn store(&self) -> &VaultStore {
        &self.store
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Receive every state transition.
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn is_unlocked(&self) -> bool {
        self.state() == SessionState::Unlocked
    }

    pub async fn vault_exists(&self) -> Result<bool, EleuthiaError> {
        self.store.exists().await
    }

    /// Derive the key from `passphrase` and decrypt the stored vault.
    ///
    /// Fails with [`EleuthiaError::VaultNotFound`] if either record is absent
    /// and with [`EleuthiaError::AuthenticationFailure`] for a wrong
    /// passphrase or damaged vault. On failure the gate keeps its prior state.
    pub async fn unlock(&self, passphrase: &SecretString) -> Result<TabSession, EleuthiaError> {
        let mut unlocked = self.unlocked.lock().await;
        let prior = self.state();
        self.state.send_replace(SessionState::Unlocking);

        match self.open_stored(passphrase).await {
            Ok(vault) => {
                debug!(entries = vault.document.entries.len(), "vault unlocked");
                *unlocked = Some(vault);
                self.state.send_replace(SessionState::Unlocked);
                Ok(self.issue_tab_session())
            }
            Err(e) => {
                if matches!(e, EleuthiaError::AuthenticationFailure) {
                    warn!("unlock failed: invalid passphrase or corrupted vault");
                }
                self.state.send_replace(prior);
                Err(e)
            }
        }
    }

    /// Create a new vault protected by `passphrase` and unlock it.
    ///
    /// Refuses with [`EleuthiaError::Validation`] when a vault already
    /// exists; use [`create_replacing`](Self::create_replacing) to overwrite.
    pub async fn create(
        &self,
        passphrase: &SecretString,
        confirm: &SecretString,
    ) -> Result<TabSession, EleuthiaError> {
        check_new_passphrase(passphrase, confirm)?;
        self.create_vault(passphrase, false).await
    }

    /// Create a new vault, overwriting any existing one.
    pub async fn create_replacing(
        &self,
        passphrase: &SecretString,
        confirm: &SecretString,
    ) -> Result<TabSession, EleuthiaError> {
        check_new_passphrase(passphrase, confirm)?;
        self.create_vault(passphrase, true).await
    }

    /// The existence check and the writes happen under the session mutex, so
    /// concurrent creates cannot both see "no vault".
    async fn create_vault(
        &self,
        passphrase: &SecretString,
        replace: bool,
    ) -> Result<TabSession, EleuthiaError> {
        let mut unlocked = self.unlocked.lock().await;
        if !replace && self.store.exists().await? {
            return Err(EleuthiaError::Validation(
                "a vault already exists; confirm replacement to overwrite it".to_string(),
            ));
        }

        let prior = self.state();
        self.state.send_replace(SessionState::CreatingVault);
        if replace && unlocked.take().is_some() {
            // The old key must not write over the new vault.
            self.revoke_tab_session();
        }

        match self.write_new_vault(passphrase, replace).await {
            Ok(vault) => {
                *unlocked = Some(vault);
                self.state.send_replace(SessionState::Unlocked);
                info!(iterations = self.config.kdf_iterations, "vault created");
                Ok(self.issue_tab_session())
            }
            Err(e) => {
                let restored = if replace { SessionState::Locked } else { prior };
                self.state.send_replace(restored);
                Err(e)
            }
        }
    }

    async fn write_new_vault(
        &self,
        passphrase: &SecretString,
        replace: bool,
    ) -> Result<UnlockedVault, EleuthiaError> {
        let salt = kdf::generate_salt(self.config.salt_len)?;
        let key = kdf::derive_key(
            passphrase.expose_secret().as_bytes(),
            &salt,
            self.config.kdf_iterations,
        )?;
        let document = VaultDocument::empty();
        let payload = crypto::encrypt(&key, &document)?;

        let meta = VaultMeta {
            salt,
            iterations: self.config.kdf_iterations,
            version: META_VERSION,
        };
        // Old cipher out, then meta, then cipher: a failure at any step leaves
        // either the old vault or "no vault", never a salt that fits no cipher.
        if replace {
            self.store.delete_cipher().await?;
        }
        self.store.write_meta(&meta).await?;
        self.store.write_cipher(&payload).await?;

        Ok(UnlockedVault { key, document })
    }

    /// Drop the key and document. Storage is untouched.
    pub async fn lock(&self) {
        let mut unlocked = self.unlocked.lock().await;
        if unlocked.take().is_some() {
            info!("vault locked");
        }
        self.state.send_replace(SessionState::Locked);
    }

    /// Check that `passphrase` decrypts the stored vault without changing state.
    pub async fn reverify(&self, passphrase: &SecretString) -> Result<(), EleuthiaError> {
        self.open_stored(passphrase).await.map(|_| ())
    }

    /// Verify `passphrase` and issue a tab session without unlocking.
    pub async fn authorize_tab(
        &self,
        passphrase: &SecretString,
    ) -> Result<TabSession, EleuthiaError> {
        self.reverify(passphrase).await?;
        Ok(self.issue_tab_session())
    }

    /// Whether `token` is the live tab session and has not expired.
    pub fn skip_prompt(&self, token: &TabSession) -> bool {
        let Ok(current) = self.tab.lock() else {
            return false;
        };
        current
            .as_ref()
            .is_some_and(|t| t.id == token.id && !t.is_expired_at(Utc::now()))
    }

    pub fn revoke_tab_session(&self) {
        if let Ok(mut current) = self.tab.lock() {
            *current = None;
        }
    }

    /// Delete the vault records, lock, and revoke the tab session.
    pub async fn clear_vault(&self) -> Result<(), EleuthiaError> {
        let mut unlocked = self.unlocked.lock().await;
        self.store.clear_all().await?;
        unlocked.take();
        self.state.send_replace(SessionState::Locked);
        self.revoke_tab_session();
        info!("vault cleared");
        Ok(())
    }

    /// Overwrite the stored cipher with `payload` and lock.
    ///
    /// The caller has confirmed the replacement; the restored vault must be
    /// unlocked again before use.
    pub async fn replace_cipher(&self, payload: &CipherPayload) -> Result<(), EleuthiaError> {
        let mut unlocked = self.unlocked.lock().await;
        if self.store.read_meta().await?.is_none() {
            return Err(EleuthiaError::VaultNotFound);
        }
        self.store.write_cipher(payload).await?;
        unlocked.take();
        self.state.send_replace(SessionState::Locked);
        info!("vault cipher replaced; locked");
        Ok(())
    }

    /// Run `f` against the unlocked document.
    pub(crate) async fn read<R>(
        &self,
        f: impl FnOnce(&VaultDocument) -> R,
    ) -> Result<R, EleuthiaError> {
        let unlocked = self.unlocked.lock().await;
        let vault = unlocked.as_ref().ok_or(EleuthiaError::Locked)?;
        Ok(f(&vault.document))
    }

    /// Apply `f` to a copy of the document, encrypt the copy, persist it, and
    /// only then make it the in-memory document.
    ///
    /// If `f` or the write fails the in-memory document is unchanged.
    pub(crate) async fn mutate<R>(
        &self,
        f: impl FnOnce(&mut VaultDocument) -> Result<R, EleuthiaError>,
    ) -> Result<R, EleuthiaError> {
        let mut unlocked = self.unlocked.lock().await;
        let vault = unlocked.as_mut().ok_or(EleuthiaError::Locked)?;

        let mut draft = vault.document.clone();
        let out = f(&mut draft)?;
        let payload = crypto::encrypt(&vault.key, &draft)?;
        self.store.write_cipher(&payload).await?;

        vault.document = draft;
        debug!(entries = vault.document.entries.len(), "vault persisted");
        Ok(out)
    }

    async fn open_stored(&self, passphrase: &SecretString) -> Result<UnlockedVault, EleuthiaError> {
        let meta = self.store.read_meta().await?;
        let cipher = self.store.read_cipher().await?;
        let (Some(meta), Some(cipher)) = (meta, cipher) else {
            return Err(EleuthiaError::VaultNotFound);
        };

        let key = kdf::derive_key(
            passphrase.expose_secret().as_bytes(),
            &meta.salt,
            meta.iterations,
        )?;
        let document = crypto::decrypt(&key, &cipher)?;
        Ok(UnlockedVault { key, document })
    }

    fn issue_tab_session(&self) -> TabSession {
        let session = TabSession::issue(self.config.tab_session_ttl_secs);
        if let Ok(mut current) = self.tab.lock() {
            *current = Some(session.clone());
        }
        session
    }
}

fn check_new_passphrase(
    passphrase: &SecretString,
    confirm: &SecretString,
) -> Result<(), EleuthiaError> {
    if passphrase.expose_secret().is_empty() {
        return Err(EleuthiaError::Validation(
            "passphrase must not be empty".to_string(),
        ));
    }
    if passphrase.expose_secret() != confirm.expose_secret() {
        return Err(EleuthiaError::Validation(
            "passphrases do not match".to_string(),
        ));
    }
    Ok(())
}
