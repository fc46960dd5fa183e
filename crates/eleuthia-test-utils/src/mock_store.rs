// SPDX-FileCopyrightText: 2026 Eleuthia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock key-value store for failure-path testing.
//!
//! `FailingStore` delegates to a [`MemoryStore`] but can be switched to
//! reject writes, reads, or both, so persistence failures can be exercised
//! without a real backend.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use eleuthia_core::{EleuthiaError, KeyValueStore, StorageEvent};
use eleuthia_storage::MemoryStore;
use tokio::sync::broadcast;

/// A store whose operations fail while the corresponding switch is on.
#[derive(Default)]
pub struct FailingStore {
    inner: MemoryStore,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    writes: AtomicUsize,
    write_budget: Mutex<Option<usize>>,
}

impl FailingStore {
    /// Create a store that behaves normally until told otherwise.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set`/`delete` fail (or succeed again).
    ///
    /// Turning failures off also clears any [`fail_writes_after`](Self::fail_writes_after) budget.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
        if !fail && let Ok(mut budget) = self.write_budget.lock() {
            *budget = None;
        }
    }

    /// Let the next `n` writes through, then fail every write after them.
    pub fn fail_writes_after(&self, n: usize) {
        if let Ok(mut budget) = self.write_budget.lock() {
            *budget = Some(n);
        }
    }

    /// Make every subsequent `get` fail (or succeed again).
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Number of writes that reached the inner store.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_write(&self, op: &str) -> Result<(), EleuthiaError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::injected(op));
        }
        if let Ok(mut budget) = self.write_budget.lock()
            && let Some(remaining) = budget.as_mut()
        {
            if *remaining == 0 {
                return Err(Self::injected(op));
            }
            *remaining -= 1;
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn injected(op: &str) -> EleuthiaError {
        EleuthiaError::persistence(format!("injected {op} failure"))
    }
}

#[async_trait]
impl KeyValueStore for FailingStore {
    fn name(&self) -> &str {
        "failing-mock"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, EleuthiaError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::injected("read"));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), EleuthiaError> {
        self.check_write("write")?;
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<(), EleuthiaError> {
        self.check_write("delete")?;
        self.inner.delete(key).await
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.inner.subscribe()
    }
}
