// SPDX-FileCopyrightText: 2026 Eleuthia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end integration tests for the complete Eleuthia vault stack.
//!
//! Each test creates an isolated TestVault over its own store. Tests are
//! independent and order-insensitive.

use std::sync::Arc;

use eleuthia_core::{EleuthiaError, ErrorKind, KeyValueStore};
use eleuthia_test_utils::{FailingStore, TEST_PASSPHRASE, TestVault, passphrase};
use eleuthia_vault::{CipherPayload, Entry, SearchFilters, SessionState};

fn bank_entry() -> Entry {
    Entry {
        id: "e1".into(),
        title: "Bank".into(),
        username: Some("me".into()),
        password: Some("x".into()),
        url: Some("https://bank.example".into()),
        notes: None,
        updated_at: 0,
    }
}

async fn stored_payload(vault: &TestVault) -> CipherPayload {
    let raw = vault.stored_cipher().await.unwrap();
    serde_json::from_str(&raw).unwrap()
}

// ---- Scenario A: create then unlock ----

#[tokio::test]
async fn test_create_then_unlock_yields_empty_document() {
    let vault = TestVault::builder().build().await.unwrap();
    let pass = passphrase(TEST_PASSPHRASE);
    vault.gate.create(&pass, &pass).await.unwrap();
    vault.gate.lock().await;
    assert_eq!(vault.gate.state(), SessionState::Locked);

    vault.gate.unlock(&pass).await.unwrap();
    let doc = vault.manager.document().await.unwrap();
    assert!(doc.entries.is_empty());
    assert!(doc.updated_at > 0);
}

// ---- Scenario B: wrong passphrase ----

#[tokio::test]
async fn test_wrong_passphrase_is_generic_failure_and_stays_locked() {
    let vault = TestVault::builder().created().build().await.unwrap();
    vault.gate.lock().await;

    let err = vault
        .gate
        .unlock(&passphrase("wrong-horse"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthenticationFailure);
    assert_eq!(
        err.user_message(),
        EleuthiaError::AuthenticationFailure.user_message()
    );
    assert_eq!(vault.gate.state(), SessionState::Locked);
    assert!(matches!(
        vault.manager.entries().await,
        Err(EleuthiaError::Locked)
    ));
}

// ---- Scenario C: upsert then search ----

#[tokio::test]
async fn test_upsert_then_search_and_sites() {
    let vault = TestVault::builder().created().build().await.unwrap();
    vault.manager.upsert_entry(bank_entry()).await.unwrap();

    let hits = vault
        .manager
        .search("bank", &SearchFilters::default())
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "e1");
    assert_eq!(hits[0].username.as_deref(), Some("me"));

    let sites = vault.manager.list_sites().await.unwrap();
    assert!(sites.contains("bank.example"));
}

// ---- Scenario D: CSV import ----

#[tokio::test]
async fn test_csv_import_single_row() {
    let vault = TestVault::builder().created().build().await.unwrap();
    let csv = "Name,URL,Username,Password\nMail,https://mail.example,alice,pw1\n";

    let count = vault.manager.import_csv(csv).await.unwrap();
    assert_eq!(count, 1);

    let entries = vault.manager.entries().await.unwrap();
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.title, "Mail");
    assert_eq!(entry.url.as_deref(), Some("https://mail.example"));
    assert_eq!(entry.username.as_deref(), Some("alice"));
    assert_eq!(entry.password.as_deref(), Some("pw1"));
    assert!(entry.id.starts_with("e_"));
}

// ---- Scenario E: delete re-encrypts ----

#[tokio::test]
async fn test_delete_removes_entry_and_reencrypts() {
    let vault = TestVault::builder().created().build().await.unwrap();
    vault.manager.upsert_entry(bank_entry()).await.unwrap();
    let before = stored_payload(&vault).await;

    assert!(vault.manager.delete_entry("e1").await.unwrap());

    let hits = vault
        .manager
        .search("bank", &SearchFilters::default())
        .await
        .unwrap();
    assert!(hits.is_empty());
    let after = stored_payload(&vault).await;
    assert_ne!(before.iv, after.iv);
}

// ---- Durability across sessions ----

#[tokio::test]
async fn test_sqlite_vault_survives_relock() {
    let vault = TestVault::builder()
        .with_sqlite()
        .created()
        .build()
        .await
        .unwrap();
    vault.manager.upsert_entry(bank_entry()).await.unwrap();

    vault.relock_with(TEST_PASSPHRASE).await.unwrap();
    let entry = vault.manager.get_entry("e1").await.unwrap().unwrap();
    assert_eq!(entry.title, "Bank");
    assert!(entry.updated_at > 0);
}

#[tokio::test]
async fn test_store_holds_no_plaintext() {
    let vault = TestVault::builder().created().build().await.unwrap();
    vault.manager.upsert_entry(bank_entry()).await.unwrap();

    let keys = vault.gate.store().keys().clone();
    for key in [&keys.meta, &keys.cipher] {
        let raw = vault.backend.get(key).await.unwrap().unwrap();
        assert!(!raw.contains("Bank"));
        assert!(!raw.contains(TEST_PASSPHRASE));
    }
}

// ---- Backups and snapshots ----

#[tokio::test]
async fn test_backup_restore_locks_and_reverts() {
    let vault = TestVault::builder().created().build().await.unwrap();
    vault.manager.upsert_entry(bank_entry()).await.unwrap();
    let today = chrono::NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
    let backup = vault.manager.export_encrypted(today).await.unwrap();
    assert_eq!(backup.file_name, "ELEUTHIA-encrypted-2026-03-01.json");

    vault.manager.delete_entry("e1").await.unwrap();
    vault.manager.restore_backup(&backup.contents).await.unwrap();
    assert_eq!(vault.gate.state(), SessionState::Locked);

    vault.relock_with(TEST_PASSPHRASE).await.unwrap();
    assert!(vault.manager.get_entry("e1").await.unwrap().is_some());
}

#[tokio::test]
async fn test_malformed_backup_is_rejected_without_change() {
    let vault = TestVault::builder().created().build().await.unwrap();
    let before = vault.stored_cipher().await;

    let err = vault
        .manager
        .restore_backup(r#"{"iv":"AAAA"}"#)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(vault.stored_cipher().await, before);
    assert!(vault.gate.is_unlocked());
}

#[tokio::test]
async fn test_snapshot_restore_reverts_to_capture() {
    let vault = TestVault::builder().created().build().await.unwrap();
    vault.manager.upsert_entry(bank_entry()).await.unwrap();
    let snapshot = vault.manager.create_snapshot(Some("one")).await.unwrap();

    vault.manager.upsert_entry(Entry::new("Later")).await.unwrap();
    vault.manager.restore_snapshot(&snapshot.id).await.unwrap();
    assert!(!vault.gate.is_unlocked());

    vault.relock_with(TEST_PASSPHRASE).await.unwrap();
    let titles: Vec<_> = vault
        .manager
        .entries()
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.title)
        .collect();
    assert_eq!(titles, ["Bank"]);
}

// ---- Failure injection ----

#[tokio::test]
async fn test_import_with_failing_store_keeps_previous_state() {
    let store = Arc::new(FailingStore::new());
    let vault = TestVault::builder()
        .with_store(store.clone())
        .created()
        .build()
        .await
        .unwrap();
    vault.manager.upsert_entry(bank_entry()).await.unwrap();

    store.fail_writes(true);
    let err = vault
        .manager
        .import_csv("name,url,username,password\nX,https://x.example,u,p\n")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Persistence);
    assert_eq!(vault.manager.entries().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_destroy_clears_vault_records() {
    let vault = TestVault::builder().created().build().await.unwrap();
    vault.manager.create_snapshot(None).await.unwrap();

    vault.gate.clear_vault().await.unwrap();
    assert!(!vault.gate.vault_exists().await.unwrap());
    assert_eq!(vault.gate.state(), SessionState::Locked);

    let err = vault
        .gate
        .unlock(&passphrase(TEST_PASSPHRASE))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::VaultNotFound);
}

#[tokio::test]
async fn test_failed_replace_leaves_no_half_vault() {
    let store = Arc::new(FailingStore::new());
    let vault = TestVault::builder()
        .with_store(store.clone())
        .created()
        .build()
        .await
        .unwrap();

    // Old cipher deleted and new meta written, then the cipher write fails.
    store.fail_writes_after(2);
    let err = vault
        .gate
        .create_replacing(&passphrase("new-horse"), &passphrase("new-horse"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Persistence);
    assert_eq!(vault.gate.state(), SessionState::Locked);
    assert!(!vault.gate.vault_exists().await.unwrap());

    let err = vault
        .gate
        .unlock(&passphrase(TEST_PASSPHRASE))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::VaultNotFound);

    // Creating again is allowed once the store recovers.
    store.fail_writes(false);
    let pass = passphrase("new-horse");
    vault.gate.create(&pass, &pass).await.unwrap();
    vault.relock_with("new-horse").await.unwrap();
}

// ---- Serialised mutations ----

#[tokio::test]
async fn test_concurrent_upserts_both_persist() {
    let vault = TestVault::builder()
        .with_sqlite()
        .created()
        .build()
        .await
        .unwrap();

    let (a, b) = tokio::join!(
        vault.manager.upsert_entry(Entry::new("Alpha")),
        vault.manager.upsert_entry(Entry::new("Beta")),
    );
    a.unwrap();
    b.unwrap();

    vault.relock_with(TEST_PASSPHRASE).await.unwrap();
    let mut titles: Vec<_> = vault
        .manager
        .entries()
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.title)
        .collect();
    titles.sort();
    assert_eq!(titles, ["Alpha", "Beta"]);
}

#[tokio::test]
async fn test_concurrent_creates_yield_one_vault() {
    let vault = TestVault::builder().with_sqlite().build().await.unwrap();
    let first = passphrase("first-horse");
    let second = passphrase("second-horse");

    let (a, b) = tokio::join!(
        vault.gate.create(&first, &first),
        vault.gate.create(&second, &second),
    );
    assert_ne!(a.is_ok(), b.is_ok());
    let winner = if a.is_ok() { "first-horse" } else { "second-horse" };
    let refused = if a.is_ok() { b } else { a };
    assert_eq!(refused.unwrap_err().kind(), ErrorKind::Validation);

    vault.relock_with(winner).await.unwrap();
    assert!(vault.manager.entries().await.unwrap().is_empty());
}
