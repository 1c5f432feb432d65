//! # Vault Module: Secrets at Rest
//!
//! Everything that touches disk goes through here. Identity records, wallet
//! backups and sealed recovery shares are all JSON documents wrapped by the
//! vault and written to a [`SecretStore`] slot.
//!
//! ```text
//! secure_vault.rs   PBKDF2 key derivation, password hashes, AES-256-GCM blobs
//! record.rs         ENCRYPTED:/legacy envelopes around serialized records
//! store.rs          SecretStore trait, in-memory and sled backends
//! ```
//!
//! The vault never decides *whether* something should be encrypted. Callers
//! pass `Some(password)` or an explicit `None`, and `None` is logged.

pub mod record;
pub mod secure_vault;
pub mod store;

pub use record::{is_encrypted, open_record, seal_record};
pub use secure_vault::{derive_key, SecureVault};
pub use store::{MemoryStore, SecretStore, SledStore};
