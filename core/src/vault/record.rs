//! Stored record envelopes.
//!
//! A slot value takes one of two forms:
//!
//! - `ENCRYPTED:<saltHex>:<ivHex>:<cipherHex>`: the JSON record sealed by
//!   [`SecureVault::encrypt`].
//! - `<hex(json)>`: the legacy unprotected form. Anyone with the file has the
//!   secret. Only written when the caller explicitly opts out of a password.

use rand_core::{CryptoRng, RngCore};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;
use zeroize::Zeroizing;

use crate::config::ENCRYPTED_PREFIX;
use crate::error::{CoreError, Result};
use crate::vault::SecureVault;

/// `true` if the stored value is password-protected.
pub fn is_encrypted(stored: &str) -> bool {
    stored.starts_with(ENCRYPTED_PREFIX)
}

/// Serialize `record` and wrap it for storage.
pub fn seal_record<T: Serialize, R: RngCore + CryptoRng>(
    vault: &SecureVault,
    record: &T,
    password: Option<&str>,
    rng: &mut R,
) -> Result<String> {
    let json = Zeroizing::new(serde_json::to_vec(record)?);
    match password {
        Some(password) => {
            let blob = vault.encrypt(&json, password, rng)?;
            Ok(format!("{ENCRYPTED_PREFIX}{blob}"))
        }
        None => {
            warn!("storing record without password protection");
            Ok(hex::encode(json.as_slice()))
        }
    }
}

/// Unwrap a stored value and deserialize it.
///
/// Protected values need `password`; without one the result is
/// [`CoreError::Authentication`]. Legacy values ignore `password`.
pub fn open_record<T: DeserializeOwned>(
    vault: &SecureVault,
    stored: &str,
    password: Option<&str>,
) -> Result<T> {
    let plaintext = match stored.strip_prefix(ENCRYPTED_PREFIX) {
        Some(blob) => {
            let password = password.ok_or(CoreError::Authentication)?;
            vault.decrypt(blob, password)?
        }
        None => Zeroizing::new(
            hex::decode(stored.trim())
                .map_err(|e| CoreError::Serialization(format!("legacy record: {e}")))?,
        ),
    };
    Ok(serde_json::from_slice(&plaintext)?)
}
