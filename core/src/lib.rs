// Copyright (c) 2026 CivicVerse Contributors. MIT License.
// See LICENSE for details.

//! # Civic Core: Identity and Wallet Library
//!
//! Everything a CivicVerse device needs to hold its own keys: a recovery
//! phrase, the wallets derived from it, a self-sovereign identity, and an
//! encrypted place to keep all of it. Nothing here talks to a network.
//!
//! ## Architecture
//!
//! ```text
//! phrase ──► seed ──► master key ──► child keys ──► chain addresses
//!                                                        │
//! identity (Ed25519 + DID) ─────────┐                    │
//!                                   ▼                    ▼
//!                                vault (PBKDF2 + AES-256-GCM) ──► store
//!                                   ▲
//! social recovery (Shamir) ─────────┘
//! ```
//!
//! - **wallet**: BIP-39 phrases, BIP-32 key tree, per-chain addresses and
//!   the stored wallet backup.
//! - **identity**: the device identity, its `did:civic:` name and DID
//!   document.
//! - **vault**: password hashing, authenticated encryption and the
//!   storage backends.
//! - **recovery**: splitting secrets among guardians.
//! - **crypto**: hash functions, Ed25519 and AES-GCM wrappers.
//! - **config**: constants and tunables.
//!
//! Derivation is a pure function of its inputs. Randomness is always
//! passed in by the caller, so tests can seed it.

pub mod config;
pub mod crypto;
pub mod error;
pub mod identity;
pub mod recovery;
pub mod vault;
pub mod wallet;

pub use error::{CoreError, Result};
pub use identity::{Identity, IdentityManager};
pub use recovery::{Guardian, RecoveryShare, SocialRecoveryCoordinator};
pub use vault::{MemoryStore, SecretStore, SecureVault, SledStore};
pub use wallet::{
    generate_mnemonic, generate_wallet_addresses, validate_mnemonic, Chain, ChainAddress,
    Mnemonic, Wallet, WalletManager, WordCount,
};
