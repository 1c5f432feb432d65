//! # Core Configuration & Constants
//!
//! Every magic number in the wallet core lives here. Derivation constants
//! are fixed by BIP-32/39/44 and changing them silently forks every wallet
//! ever created, so treat the first half of this file as frozen.
//!
//! The tunables at the bottom (vault iterations, storage slots, DID method)
//! have `Default`-backed config structs so tests and embedders can override
//! them without touching the constants.

// ---------------------------------------------------------------------------
// Recovery Phrase (BIP-39)
// ---------------------------------------------------------------------------

/// Number of words in the BIP-39 wordlist. 2^11, one word per 11-bit group.
pub const WORDLIST_SIZE: usize = 2048;

/// Bits encoded by each mnemonic word.
pub const BITS_PER_WORD: usize = 11;

/// PBKDF2 rounds for mnemonic → seed. Fixed by BIP-39, do not tune.
pub const SEED_PBKDF2_ROUNDS: u32 = 2048;

/// Salt prefix for mnemonic → seed. The optional passphrase is appended.
pub const SEED_SALT_PREFIX: &str = "mnemonic";

/// Seed length in bytes (PBKDF2-HMAC-SHA512 output).
pub const SEED_LENGTH: usize = 64;

// ---------------------------------------------------------------------------
// Key Tree (BIP-32 / BIP-44)
// ---------------------------------------------------------------------------

/// HMAC key for the master node. Yes, it says Bitcoin. Every secp256k1
/// wallet on earth uses this string, including the Ethereum ones.
pub const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";

/// Offset added to an index to mark it hardened (2^31).
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// BIP-44 purpose field.
pub const BIP44_PURPOSE: u32 = 44;

/// Length of a compressed SEC1 secp256k1 public key.
pub const COMPRESSED_PUBKEY_LENGTH: usize = 33;

/// Length of a chain code and of a private key.
pub const CHAIN_CODE_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Coin Types (SLIP-44 registry + custom)
// ---------------------------------------------------------------------------

pub const COIN_TYPE_BTC: u32 = 0;
pub const COIN_TYPE_ETH: u32 = 60;

/// Custom allocation. Not the SLIP-44 value for Kaspa.
pub const COIN_TYPE_KASPA: u32 = 111;

/// Custom allocation. Not the SLIP-44 value for Monero.
pub const COIN_TYPE_MONERO: u32 = 128;

// ---------------------------------------------------------------------------
// Secure Vault
// ---------------------------------------------------------------------------

/// PBKDF2-HMAC-SHA256 iterations for password-derived keys.
pub const VAULT_PBKDF2_ITERATIONS: u32 = 100_000;

/// Salt length for vault key derivation and password hashes.
pub const VAULT_SALT_LENGTH: usize = 16;

/// AES-256-GCM key length in bytes.
pub const AES_KEY_LENGTH: usize = 32;

/// AES-256-GCM nonce length in bytes. 96 bits, the only sane GCM nonce size.
pub const AES_NONCE_LENGTH: usize = 12;

/// AES-256-GCM authentication tag length in bytes.
pub const AES_TAG_LENGTH: usize = 16;

/// Prefix marking a stored record as password-protected.
pub const ENCRYPTED_PREFIX: &str = "ENCRYPTED:";

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// DID method used for identities minted by this crate.
pub const DEFAULT_DID_METHOD: &str = "civic";

/// Number of hex characters of SHA-256(publicKeyHex) kept in the DID.
pub const DID_HASH_HEX_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Storage Slots
// ---------------------------------------------------------------------------

/// Store key holding the (possibly encrypted) identity record.
pub const IDENTITY_SLOT: &str = "civicverse:identity";

/// Store key holding the bare DID, readable without decryption.
pub const DID_SLOT: &str = "civicverse:did";

/// Store key holding the wallet backup.
pub const WALLET_SLOT: &str = "civicverse:wallet";

// ---------------------------------------------------------------------------
// Runtime Configuration
// ---------------------------------------------------------------------------

/// Tunables for [`crate::vault::SecureVault`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultConfig {
    /// PBKDF2 iteration count used for every key derivation and password
    /// hash. Records written with one count can only be read back with the
    /// same count.
    pub pbkdf2_iterations: u32,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            pbkdf2_iterations: VAULT_PBKDF2_ITERATIONS,
        }
    }
}

/// Tunables for [`crate::identity::IdentityManager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityConfig {
    /// DID method segment, e.g. `civic` in `did:civic:...`.
    pub did_method: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            did_method: DEFAULT_DID_METHOD.to_string(),
        }
    }
}
