// SPDX-FileCopyrightText: 2026 Eleuthia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory key-value store.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use eleuthia_core::{EleuthiaError, KeyValueStore, StorageEvent};
use tokio::sync::broadcast;

/// Capacity of the change-event channel. Slow subscribers see `Lagged`.
const EVENT_CAPACITY: usize = 64;

/// A [`KeyValueStore`] backed by a `HashMap` behind an `RwLock`.
pub struct MemoryStore {
    records: RwLock<HashMap<String, String>>,
    events: broadcast::Sender<StorageEvent>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            records: RwLock::new(HashMap::new()),
            events,
        }
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
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

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> EleuthiaError {
    EleuthiaError::persistence("memory store lock poisoned")
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, EleuthiaError> {
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), EleuthiaError> {
        let previous = {
            let mut records = self.records.write().map_err(|_| poisoned())?;
            records.insert(key.to_string(), value.to_string())
        };
        self.publish(key, Some(value.to_string()), previous);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), EleuthiaError> {
        let previous = {
            let mut records = self.records.write().map_err(|_| poisoned())?;
            records.remove(key)
        };
        if previous.is_some() {
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

    #[tokio::test]
    async fn get_missing_key_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("eleu.meta").await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn set_then_get_returns_value() {
        let store = MemoryStore::new();
        store.set("eleu.meta", "{\"ver\":1}").await.unwrap();
        assert_eq!(
            store.get("eleu.meta").await.unwrap().as_deref(),
            Some("{\"ver\":1}")
        );
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn set_overwrites_and_reports_previous() {
        let store = MemoryStore::new();
        let mut rx = store.subscribe();

        store.set("k", "one").await.unwrap();
        store.set("k", "two").await.unwrap();

        let first = rx.recv().await.unwrap();
        assert_eq!(first.previous, None);
        let second = rx.recv().await.unwrap();
        assert_eq!(second.value.as_deref(), Some("two"));
        assert_eq!(second.previous.as_deref(), Some("one"));
    }

    #[tokio::test]
    async fn delete_removes_and_emits_event() {
        let store = MemoryStore::new();
        store.set("k", "v").await.unwrap();
        let mut rx = store.subscribe();

        store.delete("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);

        let event = rx.recv().await.unwrap();
        assert!(event.is_delete());
        assert_eq!(event.previous.as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn delete_missing_key_is_silent() {
        let store = MemoryStore::new();
        let mut rx = store.subscribe();
        store.delete("absent").await.unwrap();
        assert!(rx.try_recv().is_err());
    }
}
