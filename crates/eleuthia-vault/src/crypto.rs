// SPDX-FileCopyrightText: 2026 Eleuthia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM encryption of the vault document.
//!
//! Every call to [`seal`] generates a fresh random 96-bit nonce via the system
//! CSPRNG. Nonce reuse would be catastrophic for GCM security.
//!
//! Decryption fails closed: a wrong key, a bad nonce, truncated or modified
//! ciphertext, and plaintext that is not a vault document all produce the
//! same [`EleuthiaError::AuthenticationFailure`].

use eleuthia_core::EleuthiaError;
use ring::aead::{AES_256_GCM, Aad, LessSafeKey, Nonce, UnboundKey};
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

use crate::kdf::DerivedKey;
use crate::model::{CipherPayload, IV_LEN, VaultDocument};

fn cipher_key(key: &DerivedKey) -> Result<LessSafeKey, EleuthiaError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key.as_bytes())
        .map_err(|_| EleuthiaError::Internal("failed to create AES-256-GCM key".to_string()))?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypt `plaintext` under a fresh random nonce.
///
/// Returns `(ciphertext_with_tag, nonce)`.
pub fn seal(key: &DerivedKey, plaintext: &[u8]) -> Result<(Vec<u8>, [u8; IV_LEN]), EleuthiaError> {
    let key = cipher_key(key)?;

    let rng = SystemRandom::new();
    let mut nonce_bytes = [0u8; IV_LEN];
    rng.fill(&mut nonce_bytes)
        .map_err(|_| EleuthiaError::Internal("failed to generate random nonce".to_string()))?;

    let mut in_out = plaintext.to_vec();
    key.seal_in_place_append_tag(
        Nonce::assume_unique_for_key(nonce_bytes),
        Aad::empty(),
        &mut in_out,
    )
    .map_err(|_| EleuthiaError::Internal("AES-256-GCM encryption failed".to_string()))?;

    Ok((in_out, nonce_bytes))
}

/// Decrypt and authenticate `ciphertext` (tag appended).
///
/// The plaintext is returned in a zeroizing buffer.
pub fn open(
    key: &DerivedKey,
    nonce: &[u8],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>, EleuthiaError> {
    let nonce: [u8; IV_LEN] = nonce
        .try_into()
        .map_err(|_| EleuthiaError::AuthenticationFailure)?;
    let key = cipher_key(key)?;

    let mut in_out = Zeroizing::new(ciphertext.to_vec());
    let len = key
        .open_in_place(Nonce::assume_unique_for_key(nonce), Aad::empty(), &mut in_out)
        .map_err(|_| EleuthiaError::AuthenticationFailure)?
        .len();
    in_out.truncate(len);
    Ok(in_out)
}

/// Serialize `document` to JSON and encrypt it.
pub fn encrypt(key: &DerivedKey, document: &VaultDocument) -> Result<CipherPayload, EleuthiaError> {
    let plaintext = Zeroizing::new(
        serde_json::to_vec(document)
            .map_err(|e| EleuthiaError::Internal(format!("failed to serialize vault: {e}")))?,
    );
    let (ciphertext, iv) = seal(key, &plaintext)?;
    Ok(CipherPayload {
        iv: iv.to_vec(),
        ciphertext,
    })
}

/// Decrypt `payload` and parse the vault document.
pub fn decrypt(key: &DerivedKey, payload: &CipherPayload) -> Result<VaultDocument, EleuthiaError> {
    let plaintext = open(key, &payload.iv, &payload.ciphertext)?;
    serde_json::from_slice(&plaintext).map_err(|_| EleuthiaError::AuthenticationFailure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Entry;
    use proptest::prelude::*;

    fn random_key() -> DerivedKey {
        let mut bytes = [0u8; 32];
        SystemRandom::new().fill(&mut bytes).unwrap();
        DerivedKey::from_bytes(bytes)
    }

    fn sample_document() -> VaultDocument {
        let mut entry = Entry::new("Bank");
        entry.username = Some("me".into());
        entry.password = Some("x".into());
        entry.url = Some("https://bank.example".into());
        entry.updated_at = 10;
        VaultDocument {
            entries: vec![entry],
            updated_at: 11,
        }
    }

    fn is_auth_failure(result: Result<VaultDocument, EleuthiaError>) -> bool {
        matches!(result, Err(EleuthiaError::AuthenticationFailure))
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let key = random_key();
        let doc = sample_document();
        let payload = encrypt(&key, &doc).unwrap();
        assert_eq!(decrypt(&key, &payload).unwrap(), doc);
    }

    #[test]
    fn ciphertext_carries_the_tag() {
        let key = random_key();
        let (ciphertext, _) = seal(&key, b"hello").unwrap();
        assert_eq!(ciphertext.len(), 5 + 16);
    }

    #[test]
    fn nonces_never_repeat() {
        let key = random_key();
        let doc = sample_document();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..256 {
            let payload = encrypt(&key, &doc).unwrap();
            assert!(seen.insert(payload.iv), "nonce reused");
        }
    }

    #[test]
    fn wrong_key_fails() {
        let payload = encrypt(&random_key(), &sample_document()).unwrap();
        assert!(is_auth_failure(decrypt(&random_key(), &payload)));
    }

    #[test]
    fn truncated_ciphertext_fails() {
        let key = random_key();
        let mut payload = encrypt(&key, &sample_document()).unwrap();
        payload.ciphertext.truncate(payload.ciphertext.len() - 1);
        assert!(is_auth_failure(decrypt(&key, &payload)));

        payload.ciphertext.truncate(4);
        assert!(is_auth_failure(decrypt(&key, &payload)));
    }

    #[test]
    fn wrong_iv_length_fails() {
        let key = random_key();
        let mut payload = encrypt(&key, &sample_document()).unwrap();
        payload.iv.push(0);
        assert!(is_auth_failure(decrypt(&key, &payload)));
        payload.iv.truncate(8);
        assert!(is_auth_failure(decrypt(&key, &payload)));
    }

    #[test]
    fn authentic_non_document_plaintext_fails() {
        let key = random_key();
        let (ciphertext, iv) = seal(&key, b"[1, 2, 3]").unwrap();
        let payload = CipherPayload {
            iv: iv.to_vec(),
            ciphertext,
        };
        assert!(is_auth_failure(decrypt(&key, &payload)));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn any_single_byte_flip_fails(index in any::<prop::sample::Index>(), bit in 0u8..8) {
            let key = random_key();
            let mut payload = encrypt(&key, &sample_document()).unwrap();
            let total = payload.iv.len() + payload.ciphertext.len();
            let i = index.index(total);
            if i < payload.iv.len() {
                payload.iv[i] ^= 1 << bit;
            } else {
                payload.ciphertext[i - IV_LEN] ^= 1 << bit;
            }
            prop_assert!(is_auth_failure(decrypt(&key, &payload)));
        }

        #[test]
        fn roundtrip_for_arbitrary_entries(
            title in ".{1,32}",
            notes in proptest::option::of(".{0,64}"),
            stamp in any::<i64>(),
        ) {
            let key = random_key();
            let mut entry = Entry::new(title);
            entry.notes = notes;
            entry.updated_at = stamp;
            let doc = VaultDocument { entries: vec![entry], updated_at: stamp };
            let payload = encrypt(&key, &doc).unwrap();
            prop_assert_eq!(decrypt(&key, &payload).unwrap(), doc);
        }
    }
}
