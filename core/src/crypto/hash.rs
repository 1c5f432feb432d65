//! # Hashing Utilities
//!
//! Every hash function the wallet core touches, in one place. The set is
//! dictated by the standards we have to interoperate with, not by taste:
//!
//! - **SHA-256**: BIP-39 checksums, key fingerprints, the DID hash and the
//!   Bitcoin placeholder codec.
//! - **HMAC-SHA512**: BIP-32 master and child key derivation.
//! - **Keccak-256**: Ethereum addresses. Note this is the original Keccak
//!   padding, not NIST SHA3-256. Mixing them up produces addresses that look
//!   fine and receive nothing.
//! - **BLAKE3**: the Kaspa and Monero placeholder codecs.
//!
//! All functions return fixed-size arrays. Callers that need a `Vec` can
//! call `.to_vec()` themselves.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha512};
use sha3::Keccak256;

/// HMAC-SHA512, the BIP-32 workhorse.
pub type HmacSha512 = Hmac<Sha512>;

/// Compute the SHA-256 digest of `data`.
///
/// # Example
///
/// ```
/// use civic_core::crypto::sha256;
///
/// let hash = sha256(b"civicverse");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA-256 rendered as lowercase hex. The DID derivation hashes the hex
/// string of the public key, so this is the form it wants.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Compute `HMAC-SHA512(key, data)`.
///
/// HMAC accepts keys of any length, so `new_from_slice` never fails here.
pub fn hmac_sha512(key: &[u8], data: &[u8]) -> [u8; 64] {
    let mut out = [0u8; 64];
    if let Ok(mut mac) = HmacSha512::new_from_slice(key) {
        mac.update(data);
        out.copy_from_slice(&mac.finalize().into_bytes());
    }
    out
}

/// Compute the Keccak-256 digest of `data` (Ethereum flavour).
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute the BLAKE3 digest of `data`.
pub fn blake3_hash(data: &[u8]) -> [u8; 32] {
    *blake3::hash(data).as_bytes()
}
