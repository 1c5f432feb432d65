//! # Cryptographic Primitives
//!
//! Thin, typed wrappers over audited implementations. Nothing in here
//! invents a construction:
//!
//! - **Ed25519** (`ed25519-dalek`) for identity signatures.
//! - **AES-256-GCM** (`aes-gcm`) for secrets at rest.
//! - **SHA-256, HMAC-SHA512, Keccak-256, BLAKE3** for derivation and
//!   address formatting.
//!
//! secp256k1 arithmetic lives with the key tree in [`crate::wallet`], and
//! password-based key derivation lives with the vault.

pub mod encryption;
pub mod hash;
pub mod keys;

pub use hash::{blake3_hash, hmac_sha512, keccak256, sha256, sha256_hex};
pub use keys::{IdentityKeypair, IdentityPublicKey, IdentitySignature};
