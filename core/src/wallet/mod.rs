//! # Wallet Module: Deterministic Key Derivation
//!
//! One recovery phrase, every chain:
//!
//! ```text
//! mnemonic.rs   recovery phrase generation & validation (BIP-39)
//! seed.rs       phrase → 64-byte seed (BIP-39 PBKDF2)
//! keytree.rs    master & child keys over secp256k1 (BIP-32)
//! chains.rs     coin-type registry, BIP-44 paths, address codecs
//! manager.rs    wallet backup lifecycle in the vault
//! ```
//!
//! Everything except `manager` is a pure function of its inputs. The same
//! phrase, passphrase, account, change and index always give the same key
//! and the same address.

pub mod chains;
pub mod keytree;
pub mod manager;
pub mod mnemonic;
pub mod seed;

pub use chains::{
    coin_type, derive_address, generate_wallet_addresses, AddressCodec, Chain, ChainAddress,
};
pub use keytree::{ChildNumber, DerivationPath, ExtendedKey};
pub use manager::{Wallet, WalletManager};
pub use mnemonic::{entropy_to_mnemonic, generate_mnemonic, validate_mnemonic, Mnemonic, WordCount};
pub use seed::{mnemonic_to_seed, phrase_to_seed, Seed};
