//! # Identity Module
//!
//! Self-sovereign identity for CivicVerse. Each device holds one identity:
//! an Ed25519 keypair named by a `did:civic:` DID derived from its public
//! key.
//!
//! 1. **DID**: the identifier scheme and W3C DID document rendering.
//! 2. **Manager**: create, restore, verify and delete the stored identity.
//!
//! The identity key is generated randomly, not derived from the wallet's
//! recovery phrase. Losing the vault record loses the identity for good:
//! social recovery shares the wallet phrase only, and a fresh identity has
//! a different DID.

pub mod did;
pub mod manager;

pub use did::{did_hash, parse_did, CivicDid, DidDocument, VerificationMethod};
pub use manager::{Identity, IdentityManager};
