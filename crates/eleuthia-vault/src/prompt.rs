// SPDX-FileCopyrightText: 2026 Eleuthia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Passphrase acquisition via TTY prompt or the ELEUTHIA_PASSPHRASE environment variable.

use eleuthia_core::EleuthiaError;
use secrecy::SecretString;

/// The environment variable name for providing the vault passphrase.
pub const PASSPHRASE_ENV_VAR: &str = "ELEUTHIA_PASSPHRASE";

fn from_env() -> Option<SecretString> {
    std::env::var(PASSPHRASE_ENV_VAR)
        .ok()
        .filter(|p| !p.is_empty())
        .map(SecretString::from)
}

fn stdin_is_terminal() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stdin())
}

fn read_hidden(label: &str) -> Result<SecretString, EleuthiaError> {
    eprint!("{label}: ");
    rpassword::read_password()
        .map(SecretString::from)
        .map_err(|e| EleuthiaError::Validation(format!("failed to read passphrase: {e}")))
}

fn no_source() -> EleuthiaError {
    EleuthiaError::Validation(format!(
        "no passphrase provided; set {PASSPHRASE_ENV_VAR} or run interactively"
    ))
}

/// Get the vault passphrase.
///
/// Priority:
/// 1. `ELEUTHIA_PASSPHRASE` (scripts, CI)
/// 2. Interactive TTY prompt via `rpassword`
pub fn get_passphrase() -> Result<SecretString, EleuthiaError> {
    if let Some(passphrase) = from_env() {
        return Ok(passphrase);
    }
    if stdin_is_terminal() {
        return read_hidden("ELEUTHIA passphrase");
    }
    Err(no_source())
}

/// Get a new passphrase and its confirmation, for vault creation.
///
/// The environment variable is used for both. Equality and emptiness are
/// checked by the session gate, not here.
pub fn get_new_passphrase() -> Result<(SecretString, SecretString), EleuthiaError> {
    if let (Some(first), Some(confirm)) = (from_env(), from_env()) {
        return Ok((first, confirm));
    }
    if stdin_is_terminal() {
        let first = read_hidden("New ELEUTHIA passphrase")?;
        let confirm = read_hidden("Confirm passphrase")?;
        return Ok((first, confirm));
    }
    Err(no_source())
}

/// Read a secret entry field (e.g. a password) without echo.
///
/// Returns `None` when stdin is not a terminal or the input is empty.
pub fn read_secret_field(label: &str) -> Result<Option<String>, EleuthiaError> {
    if !stdin_is_terminal() {
        return Ok(None);
    }
    eprint!("{label}: ");
    let value = rpassword::read_password()
        .map_err(|e| EleuthiaError::Validation(format!("failed to read {label}: {e}")))?;
    Ok((!value.is_empty()).then_some(value))
}
