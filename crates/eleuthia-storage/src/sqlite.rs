// SPDX-FileCopyrightText: 2026 Eleuthia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed key-value store scoped to a single user.
//!
//! All access is serialized through tokio-rusqlite's single background thread.
//! Each `set` is one `INSERT .. ON CONFLICT` statement, so a record is either
//! fully replaced or untouched.

use std::path::Path;

use async_trait::async_trait;
use eleuthia_config::model::StorageConfig;
use eleuthia_core::{EleuthiaError, KeyValueStore, StorageEvent, UserId};
use rusqlite::{params, OptionalExtension};
use tokio::sync::broadcast;
use tracing::debug;

use crate::migrations;

/// Capacity of the change-event channel. Slow subscribers see `Lagged`.
const EVENT_CAPACITY: usize = 64;

fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> EleuthiaError {
    EleuthiaError::persistence(e)
}

/// A [`KeyValueStore`] persisting records in the `user_storage` table.
pub struct SqliteStore {
    conn: tokio_rusqlite::Connection,
    user: UserId,
    events: broadcast::Sender<StorageEvent>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and run pending migrations.
    ///
    /// Missing parent directories are created.
    pub async fn open(path: impl AsRef<Path>, user: UserId) -> Result<Self, EleuthiaError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(EleuthiaError::persistence)?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(EleuthiaError::persistence)?;
        let store = Self::init(conn, user).await?;
        debug!(path = %path.display(), user = %store.user, "SQLite store opened");
        Ok(store)
    }

    /// Open a private in-memory database. Records vanish when the store drops.
    pub async fn open_in_memory(user: UserId) -> Result<Self, EleuthiaError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(EleuthiaError::persistence)?;
        Self::init(conn, user).await
    }

    /// Open the database named by a storage configuration section.
    pub async fn from_config(config: &StorageConfig) -> Result<Self, EleuthiaError> {
        Self::open(&config.database_path, UserId(config.user_id.clone())).await
    }

    async fn init(conn: tokio_rusqlite::Connection, user: UserId) -> Result<Self, EleuthiaError> {
        conn.call(|conn| -> Result<Result<(), EleuthiaError>, rusqlite::Error> {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA busy_timeout = 5000;",
            )?;
            Ok(migrations::run_migrations(conn))
        })
        .await
        .map_err(map_tr_err)??;

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self { conn, user, events })
    }

    /// The user this store is scoped to.
    pub fn user(&self) -> &UserId {
        &self.user
    }

    /// All keys stored for this user, sorted.
    pub async fn keys(&self) -> Result<Vec<String>, EleuthiaError> {
        let user = self.user.0.clone();
        self.conn
            .call(move |conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt =
                    conn.prepare("SELECT key FROM user_storage WHERE user_id = ?1 ORDER BY key")?;
                let rows = stmt.query_map(params![user], |row| row.get(0))?;
                rows.collect()
            })
            .await
            .map_err(map_tr_err)
    }

    /// Checkpoint the WAL so the main database file is self-contained.
    pub async fn close(&self) -> Result<(), EleuthiaError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    fn publish(&self, key: &str, value: Option<String>, previous: Option<String>) {
        // Sending fails only when nobody is subscribed.
        let _ = self.events.send(StorageEvent {
            key: key.to_string(),
            value,
            previous,
        });
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, EleuthiaError> {
        let user = self.user.0.clone();
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
                conn.query_row(
                    "SELECT value FROM user_storage WHERE user_id = ?1 AND key = ?2",
                    params![user, key],
                    |row| row.get(0),
                )
                .optional()
            })
            .await
            .map_err(map_tr_err)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), EleuthiaError> {
        let user = self.user.0.clone();
        let owned_key = key.to_string();
        let owned_value = value.to_string();
        let previous = self
            .conn
            .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
                let tx = conn.transaction()?;
                let previous: Option<String> = tx
                    .query_row(
                        "SELECT value FROM user_storage WHERE user_id = ?1 AND key = ?2",
                        params![user, owned_key],
                        |row| row.get(0),
                    )
                    .optional()?;
                tx.execute(
                    "INSERT INTO user_storage (user_id, key, value) VALUES (?1, ?2, ?3)
                     ON CONFLICT (user_id, key) DO UPDATE SET
                        value = excluded.value,
                        updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                    params![user, owned_key, owned_value],
                )?;
                tx.commit()?;
                Ok(previous)
            })
            .await
            .map_err(map_tr_err)?;

        debug!(key, bytes = value.len(), "record written");
        self.publish(key, Some(value.to_string()), previous);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), EleuthiaError> {
        let user = self.user.0.clone();
        let owned_key = key.to_string();
        let previous = self
            .conn
            .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
                let tx = conn.transaction()?;
                let previous: Option<String> = tx
                    .query_row(
                        "SELECT value FROM user_storage WHERE user_id = ?1 AND key = ?2",
                        params![user, owned_key],
                        |row| row.get(0),
                    )
                    .optional()?;
                tx.execute(
                    "DELETE FROM user_storage WHERE user_id = ?1 AND key = ?2",
                    params![user, owned_key],
                )?;
                tx.commit()?;
                Ok(previous)
            })
            .await
            .map_err(map_tr_err)?;

        if previous.is_some() {
            debug!(key, "record deleted");
            self.publish(key, None, previous);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn alice() -> UserId {
        UserId("alice".into())
    }

    #[tokio::test]
    async fn set_get_round_trip_in_memory() {
        let store = SqliteStore::open_in_memory(alice()).await.unwrap();
        assert_eq!(store.get("eleu.vault").await.unwrap(), None);

        store.set("eleu.vault", "{\"iv\":\"x\"}").await.unwrap();
        assert_eq!(
            store.get("eleu.vault").await.unwrap().as_deref(),
            Some("{\"iv\":\"x\"}")
        );
    }

    #[tokio::test]
    async fn set_replaces_existing_value() {
        let store = SqliteStore::open_in_memory(alice()).await.unwrap();
        let mut rx = store.subscribe();

        store.set("k", "one").await.unwrap();
        store.set("k", "two").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("two"));
        assert_eq!(store.keys().await.unwrap(), vec!["k".to_string()]);

        let _ = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(second.previous.as_deref(), Some("one"));
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let store = SqliteStore::open_in_memory(alice()).await.unwrap();
        store.set("k", "v").await.unwrap();
        let mut rx = store.subscribe();

        store.delete("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(rx.recv().await.unwrap().is_delete());

        // Deleting again is a silent no-op.
        store.delete("k").await.unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn records_are_scoped_per_user() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("shared.db");

        let a = SqliteStore::open(&path, alice()).await.unwrap();
        a.set("eleu.meta", "alice-meta").await.unwrap();
        a.close().await.unwrap();

        let b = SqliteStore::open(&path, UserId("bob".into())).await.unwrap();
        assert_eq!(b.get("eleu.meta").await.unwrap(), None);
        b.set("eleu.meta", "bob-meta").await.unwrap();

        assert_eq!(a.get("eleu.meta").await.unwrap().as_deref(), Some("alice-meta"));
    }

    #[tokio::test]
    async fn records_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/dir/eleuthia.db");

        {
            let store = SqliteStore::open(&path, alice()).await.unwrap();
            store.set("eleu.vault", "ciphertext").await.unwrap();
            store.close().await.unwrap();
        }

        let reopened = SqliteStore::open(&path, alice()).await.unwrap();
        assert_eq!(
            reopened.get("eleu.vault").await.unwrap().as_deref(),
            Some("ciphertext")
        );
    }

    #[tokio::test]
    async fn from_config_uses_configured_path_and_user() {
        let dir = tempdir().unwrap();
        let config = StorageConfig {
            database_path: dir.path().join("cfg.db").display().to_string(),
            user_id: "carol".into(),
            ..StorageConfig::default()
        };

        let store = SqliteStore::from_config(&config).await.unwrap();
        assert_eq!(store.user().0, "carol");
        assert_eq!(store.name(), "sqlite");
        assert!(dir.path().join("cfg.db").exists());
    }
}
