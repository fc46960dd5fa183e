// SPDX-FileCopyrightText: 2026 Eleuthia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Eleuthia credential vault.
//!
//! This crate provides the error taxonomy, the key-value store trait the
//! vault persists through, and the small set of types shared by store
//! implementations.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{EleuthiaError, ErrorKind, AUTH_FAILURE_MESSAGE};
pub use traits::KeyValueStore;
pub use types::{StorageEvent, UserId};
