// SPDX-FileCopyrightText: 2026 Eleuthia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions for the external collaborators of the vault.

pub mod store;

pub use store::KeyValueStore;
