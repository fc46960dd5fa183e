// SPDX-FileCopyrightText: 2026 Eleuthia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Eleuthia integration tests.
//!
//! Provides store mocks and a vault harness for fast, deterministic,
//! CI-runnable tests.
//!
//! # Components
//!
//! - [`FailingStore`] - In-memory store whose writes can be made to fail on demand
//! - [`TestVault`] - Gate + manager over a fresh store with low KDF cost

pub mod harness;
pub mod mock_store;

pub use harness::{passphrase, TestVault, TestVaultBuilder, TEST_PASSPHRASE};
pub use mock_store::FailingStore;
