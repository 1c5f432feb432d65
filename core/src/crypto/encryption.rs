//! # AES-256-GCM Encryption
//!
//! Authenticated encryption for everything the vault writes to disk.
//!
//! The vault stores the salt, nonce and ciphertext as separate hex fields,
//! so unlike a packed `nonce || ciphertext` buffer these functions take the
//! nonce explicitly. The caller generates it. A fresh random 96-bit nonce
//! per encryption is the only supported strategy; GCM under a repeated
//! (key, nonce) pair leaks the XOR of the plaintexts and lets an attacker
//! forge tags. Since every vault encryption also draws a fresh salt, and
//! therefore a fresh key, nonce collisions would need a salt collision too.
//!
//! Errors are deliberately uninformative. A wrong key and a flipped bit both
//! come back as [`CoreError::Authentication`].

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};

use crate::config::{AES_KEY_LENGTH, AES_NONCE_LENGTH, AES_TAG_LENGTH};
use crate::error::{CoreError, Result};

/// Encrypt `plaintext` under `key` and `nonce`.
///
/// Returns the ciphertext with the 16-byte GCM tag appended.
///
/// # Example
///
/// ```
/// use civic_core::crypto::encryption::{decrypt, encrypt};
///
/// let key = [0x42u8; 32];
/// let nonce = [0x24u8; 12];
/// let sealed = encrypt(&key, &nonce, b"seed words").unwrap();
/// assert_eq!(decrypt(&key, &nonce, &sealed).unwrap(), b"seed words");
/// ```
pub fn encrypt(
    key: &[u8; AES_KEY_LENGTH],
    nonce: &[u8; AES_NONCE_LENGTH],
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|_| CoreError::Validation("invalid AES key length".into()))?;
    cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|_| CoreError::Validation("encryption failed".into()))
}

/// Decrypt ciphertext produced by [`encrypt`].
///
/// Any failure, including a ciphertext too short to hold a tag, is
/// [`CoreError::Authentication`]. Partial plaintext is never returned.
pub fn decrypt(
    key: &[u8; AES_KEY_LENGTH],
    nonce: &[u8; AES_NONCE_LENGTH],
    ciphertext: &[u8],
) -> Result<Vec<u8>> {
    if ciphertext.len() < AES_TAG_LENGTH {
        return Err(CoreError::Authentication);
    }
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| CoreError::Authentication)?;
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CoreError::Authentication)
}
