// SPDX-FileCopyrightText: 2026 Eleuthia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the store trait and its implementations.

use serde::{Deserialize, Serialize};

/// Identifier of the user a key-value store is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A change to a single key, broadcast to store subscribers.
///
/// `value` is `None` when the key was deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    pub value: Option<String>,
    pub previous: Option<String>,
}

impl StorageEvent {
    /// Returns `true` if this event removed the key.
    pub fn is_delete(&self) -> bool {
        self.value.is_none()
    }
}
