// SPDX-FileCopyrightText: 2026 Eleuthia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PBKDF2-HMAC-SHA256 key derivation from a passphrase.
//!
//! Derivation is a pure function of `(passphrase, salt, iterations)`. A wrong
//! input never fails here; it yields a different key that later fails
//! authenticated decryption. Keys are never compared directly.

use std::num::NonZeroU32;

use eleuthia_core::EleuthiaError;
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

/// Length of a derived AES-256 key in bytes.
pub const KEY_LEN: usize = 32;

/// Smallest salt accepted when creating a vault.
pub const MIN_SALT_LEN: usize = 16;

/// A 256-bit key derived from the vault passphrase.
///
/// Zeroized on drop. Deliberately implements neither `PartialEq` nor any
/// serialization trait.
pub struct DerivedKey(Zeroizing<[u8; KEY_LEN]>);

impl DerivedKey {
    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    #[cfg(test)]
    pub(crate) fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(Zeroizing::new(bytes))
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Derive a 32-byte key from `passphrase` with PBKDF2-HMAC-SHA256.
///
/// `iterations == 0` can only come from a damaged metadata record and is
/// reported as [`EleuthiaError::AuthenticationFailure`].
pub fn derive_key(
    passphrase: &[u8],
    salt: &[u8],
    iterations: u32,
) -> Result<DerivedKey, EleuthiaError> {
    let iterations = NonZeroU32::new(iterations).ok_or(EleuthiaError::AuthenticationFailure)?;

    let mut output = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        salt,
        passphrase,
        output.as_mut(),
    );
    Ok(DerivedKey(output))
}

/// Generate a random salt of `len` bytes (never fewer than [`MIN_SALT_LEN`]).
pub fn generate_salt(len: usize) -> Result<Vec<u8>, EleuthiaError> {
    let rng = SystemRandom::new();
    let mut salt = vec![0u8; len.max(MIN_SALT_LEN)];
    rng.fill(&mut salt)
        .map_err(|_| EleuthiaError::Internal("failed to generate random salt".to_string()))?;
    Ok(salt)
}
