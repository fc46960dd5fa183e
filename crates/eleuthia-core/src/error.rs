// SPDX-FileCopyrightText: 2026 Eleuthia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Eleuthia vault.
//!
//! Every crypto or storage failure is converted into one of these variants at
//! the session/manager boundary before it reaches a front-end. None of the
//! messages may carry secret material.

use strum::{Display, EnumString};
use thiserror::Error;

/// The generic message shown for any failed decryption.
///
/// A wrong passphrase and a corrupted or tampered vault are deliberately
/// reported with the same text.
pub const AUTH_FAILURE_MESSAGE: &str = "invalid passphrase or corrupted vault";

/// The primary error type used across all Eleuthia crates.
#[derive(Debug, Error)]
pub enum EleuthiaError {
    /// Vault metadata or ciphertext is absent. Front-ends should offer vault
    /// creation rather than asking for the passphrase again.
    #[error("vault not found -- create a vault first")]
    VaultNotFound,

    /// Decryption or authentication of the vault failed.
    #[error("{}", AUTH_FAILURE_MESSAGE)]
    AuthenticationFailure,

    /// Local input was rejected before touching storage or crypto.
    #[error("validation error: {0}")]
    Validation(String),

    /// The storage collaborator failed to read or write a record.
    #[error("not saved: storage error: {source}")]
    Persistence {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The operation requires an unlocked vault.
    #[error("vault is locked")]
    Locked,

    /// Configuration errors (invalid TOML, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors (CSPRNG failure, cipher construction).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Coarse classification of [`EleuthiaError`] for front-ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum ErrorKind {
    VaultNotFound,
    AuthenticationFailure,
    Validation,
    Persistence,
    Locked,
    Config,
    Internal,
}

impl EleuthiaError {
    /// Wrap any storage-layer error as a persistence failure.
    pub fn persistence<E>(source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Persistence {
            source: source.into(),
        }
    }

    /// Returns the coarse kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::VaultNotFound => ErrorKind::VaultNotFound,
            Self::AuthenticationFailure => ErrorKind::AuthenticationFailure,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Persistence { .. } => ErrorKind::Persistence,
            Self::Locked => ErrorKind::Locked,
            Self::Config(_) => ErrorKind::Config,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// The message a front-end should show for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::VaultNotFound => "No vault found. Create one first.".to_string(),
            Self::AuthenticationFailure => {
                let mut msg = AUTH_FAILURE_MESSAGE.to_string();
                if let Some(first) = msg.get_mut(0..1) {
                    first.make_ascii_uppercase();
                }
                msg.push('.');
                msg
            }
            Self::Validation(message) => message.clone(),
            Self::Persistence { .. } => {
                "Your change may not have been saved. Try again.".to_string()
            }
            Self::Locked => "The vault is locked. Unlock it first.".to_string(),
            Self::Config(message) => format!("Configuration problem: {message}"),
            Self::Internal(_) => "Something went wrong. Try again.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failure_display_is_the_shared_message() {
        assert_eq!(
            EleuthiaError::AuthenticationFailure.to_string(),
            AUTH_FAILURE_MESSAGE
        );
        assert_eq!(
            EleuthiaError::AuthenticationFailure.user_message(),
            "Invalid passphrase or corrupted vault."
        );
    }

    #[test]
    fn persistence_kind_hides_the_source() {
        let err = EleuthiaError::persistence("disk full");
        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert!(!err.user_message().contains("disk full"));
    }
}
