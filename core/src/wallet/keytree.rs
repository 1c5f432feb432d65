//! # Hierarchical Key Derivation (BIP-32 over secp256k1)
//!
//! ```text
//! seed ──HMAC-SHA512("Bitcoin seed")──► master (IL = key, IR = chain code)
//!
//! child(parent, i):
//!   i ≥ 2^31  data = 0x00 ‖ parent_priv ‖ ser32(i)     (hardened)
//!   i < 2^31  data = ser_P(parent_pub)  ‖ ser32(i)     (normal)
//!   I = HMAC-SHA512(parent_chain_code, data)
//!   child_priv = (IL + parent_priv) mod n
//!   child_chain_code = IR
//! ```
//!
//! Scalar arithmetic is done by `k256`, so reduction mod n is exact and
//! constant time. We only ever derive private children. There is no
//! public-only (xpub) derivation path in the wallet.
//!
//! ## Degenerate indices
//!
//! BIP-32 says that if IL ≥ n or the child key is zero, the index is invalid
//! and the caller should move on to the next one. The odds are below 2^-127
//! but the rule is implemented anyway: [`ExtendedKey::child`] walks forward
//! inside the same (normal or hardened) range and records the index it
//! actually used.
//!
//! ## Fingerprints
//!
//! `parent_fingerprint` is the first four bytes of SHA-256 over the parent's
//! compressed public key. Standard BIP-32 uses HASH160 here, so these
//! fingerprints will not match other wallets' xpub metadata. Keys and chain
//! codes are unaffected.

use std::fmt;
use std::str::FromStr;

use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::elliptic_curve::PrimeField;
use k256::{FieldBytes, Scalar, SecretKey};
use tracing::debug;
use zeroize::{Zeroize, Zeroizing};

use crate::config::{CHAIN_CODE_LENGTH, COMPRESSED_PUBKEY_LENGTH, HARDENED_OFFSET, MASTER_HMAC_KEY};
use crate::crypto::{hmac_sha512, sha256};
use crate::error::{CoreError, Result};
use crate::wallet::seed::Seed;

// ---------------------------------------------------------------------------
// Child numbers and paths
// ---------------------------------------------------------------------------

/// One step of a derivation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChildNumber {
    /// Index without the hardened bit, always `< 2^31`.
    pub index: u32,
    pub hardened: bool,
}

impl ChildNumber {
    pub fn normal(index: u32) -> Result<Self> {
        Self::new(index, false)
    }

    pub fn hardened(index: u32) -> Result<Self> {
        Self::new(index, true)
    }

    fn new(index: u32, hardened: bool) -> Result<Self> {
        if index >= HARDENED_OFFSET {
            return Err(CoreError::Validation(format!(
                "child index {index} must be below 2^31"
            )));
        }
        Ok(Self { index, hardened })
    }

    /// The 32-bit value fed to `ser32`, hardened bit included.
    pub fn raw(self) -> u32 {
        if self.hardened {
            self.index | HARDENED_OFFSET
        } else {
            self.index
        }
    }

    /// Inverse of [`raw`](Self::raw).
    pub fn from_raw(raw: u32) -> Self {
        Self {
            index: raw & !HARDENED_OFFSET,
            hardened: raw >= HARDENED_OFFSET,
        }
    }
}

impl fmt::Display for ChildNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hardened {
            write!(f, "{}'", self.index)
        } else {
            write!(f, "{}", self.index)
        }
    }
}

/// A parsed derivation path such as `m/44'/60'/0'/0/0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DerivationPath(Vec<ChildNumber>);

impl DerivationPath {
    /// `m/44'/coin'/account'/change/index`.
    pub fn bip44(coin_type: u32, account: u32, change: u32, index: u32) -> Result<Self> {
        Ok(Self(vec![
            ChildNumber::hardened(crate::config::BIP44_PURPOSE)?,
            ChildNumber::hardened(coin_type)?,
            ChildNumber::hardened(account)?,
            ChildNumber::normal(change)?,
            ChildNumber::normal(index)?,
        ]))
    }

    pub fn steps(&self) -> &[ChildNumber] {
        &self.0
    }

    pub fn is_master(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<ChildNumber>> for DerivationPath {
    fn from(steps: Vec<ChildNumber>) -> Self {
        Self(steps)
    }
}

impl FromStr for DerivationPath {
    type Err = CoreError;

    /// Accepts `m`, `m/0`, `m/44'/0'`, `m/44h/0H` and so on. Whitespace is
    /// not tolerated anywhere.
    fn from_str(s: &str) -> Result<Self> {
        let mut segments = s.split('/');
        if segments.next() != Some("m") {
            return Err(CoreError::Validation(format!(
                "derivation path must start with 'm': {s}"
            )));
        }

        let mut steps = Vec::new();
        for segment in segments {
            if segment.is_empty() {
                return Err(CoreError::Validation(format!("empty segment in path: {s}")));
            }
            let (digits, hardened) = match segment.strip_suffix(['\'', 'h', 'H']) {
                Some(rest) => (rest, true),
                None => (segment, false),
            };
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(CoreError::Validation(format!(
                    "invalid path segment '{segment}' in {s}"
                )));
            }
            let index: u32 = digits.parse().map_err(|_| {
                CoreError::Validation(format!("path segment '{segment}' out of range"))
            })?;
            steps.push(ChildNumber::new(index, hardened)?);
        }
        Ok(Self(steps))
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for step in &self.0 {
            write!(f, "/{step}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ExtendedKey
// ---------------------------------------------------------------------------

/// A node in the key tree: private key, compressed public key and chain
/// code, plus position metadata.
///
/// The private key is a `k256::SecretKey`, which zeroizes itself. The chain
/// code is wiped in `Drop`.
#[derive(Clone)]
pub struct ExtendedKey {
    secret: SecretKey,
    public_key: [u8; COMPRESSED_PUBKEY_LENGTH],
    chain_code: [u8; CHAIN_CODE_LENGTH],
    depth: u8,
    child_number: u32,
    parent_fingerprint: [u8; 4],
}

impl ExtendedKey {
    /// Derive the master node from a seed.
    pub fn master(seed: &Seed) -> Result<Self> {
        Self::master_from_bytes(seed.as_bytes())
    }

    /// Same as [`master`](Self::master) for seeds held as plain bytes. BIP-32
    /// allows 16 to 64 byte seeds; the test vectors use 16.
    pub fn master_from_bytes(seed: &[u8]) -> Result<Self> {
        if !(16..=64).contains(&seed.len()) {
            return Err(CoreError::Validation(format!(
                "seed must be 16..=64 bytes, got {}",
                seed.len()
            )));
        }

        let i = Zeroizing::new(hmac_sha512(MASTER_HMAC_KEY, seed));
        let (il, ir) = i.split_at(32);

        // IL = 0 or IL ≥ n: the seed itself is unusable, nothing to retry.
        let secret = SecretKey::from_slice(il)
            .map_err(|_| CoreError::Derivation("seed yields an invalid master key".into()))?;

        let mut chain_code = [0u8; CHAIN_CODE_LENGTH];
        chain_code.copy_from_slice(ir);

        Ok(Self::from_parts(secret, chain_code, 0, 0, [0u8; 4]))
    }

    /// Derive the child at `raw_index` (hardened bit included).
    ///
    /// If the index is degenerate the next one in the same range is tried.
    /// The returned key's [`child_number`](Self::child_number) tells which
    /// index was used.
    pub fn child(&self, raw_index: u32) -> Result<Self> {
        let hardened = raw_index >= HARDENED_OFFSET;

        let depth = self
            .depth
            .checked_add(1)
            .ok_or_else(|| CoreError::Derivation("maximum tree depth reached".into()))?;

        let parent_scalar: Scalar = *self.secret.to_nonzero_scalar();
        let fingerprint = self.fingerprint();

        let mut index = raw_index;
        loop {
            let mut data = Zeroizing::new(Vec::with_capacity(37));
            if hardened {
                data.push(0x00);
                data.extend_from_slice(&self.secret.to_bytes());
            } else {
                data.extend_from_slice(&self.public_key);
            }
            data.extend_from_slice(&index.to_be_bytes());

            let i = Zeroizing::new(hmac_sha512(&self.chain_code, &data));
            let (il, ir) = i.split_at(32);

            if let Some(secret) = tweak(il, &parent_scalar) {
                let mut chain_code = [0u8; CHAIN_CODE_LENGTH];
                chain_code.copy_from_slice(ir);
                debug!(depth, index, "derived child key");
                return Ok(Self::from_parts(secret, chain_code, depth, index, fingerprint));
            }

            debug!(index, "degenerate child index, trying next");
            index = next_in_range(index).ok_or_else(|| {
                CoreError::Derivation(format!("no valid child key after index {raw_index}"))
            })?;
        }
    }

    /// Fold [`child`](Self::child) over every step of `path`.
    pub fn derive(&self, path: &DerivationPath) -> Result<Self> {
        path.steps()
            .iter()
            .try_fold(self.clone(), |key, step| key.child(step.raw()))
    }

    /// Parse `path` and derive it. Only meaningful on a master key.
    pub fn derive_path(&self, path: &str) -> Result<Self> {
        self.derive(&path.parse()?)
    }

    fn from_parts(
        secret: SecretKey,
        chain_code: [u8; CHAIN_CODE_LENGTH],
        depth: u8,
        child_number: u32,
        parent_fingerprint: [u8; 4],
    ) -> Self {
        let mut public_key = [0u8; COMPRESSED_PUBKEY_LENGTH];
        public_key.copy_from_slice(secret.public_key().to_encoded_point(true).as_bytes());
        Self {
            secret,
            public_key,
            chain_code,
            depth,
            child_number,
            parent_fingerprint,
        }
    }

    // -- accessors ---------------------------------------------------------

    /// Raw 32-byte private key. Wrapped so the copy is wiped too.
    pub fn private_key(&self) -> Zeroizing<[u8; 32]> {
        let mut out = Zeroizing::new([0u8; 32]);
        out.copy_from_slice(&self.secret.to_bytes());
        out
    }

    pub fn private_key_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.secret.to_bytes()))
    }

    /// Compressed SEC1 public key (33 bytes, `02`/`03` prefix).
    pub fn public_key(&self) -> &[u8; COMPRESSED_PUBKEY_LENGTH] {
        &self.public_key
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key)
    }

    /// Uncompressed SEC1 public key (65 bytes, `04` prefix).
    pub fn uncompressed_public_key(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out.copy_from_slice(self.secret.public_key().to_encoded_point(false).as_bytes());
        out
    }

    pub fn chain_code(&self) -> &[u8; CHAIN_CODE_LENGTH] {
        &self.chain_code
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Index used to derive this key, hardened bit included. Zero for master.
    pub fn child_number(&self) -> u32 {
        self.child_number
    }

    pub fn parent_fingerprint(&self) -> [u8; 4] {
        self.parent_fingerprint
    }

    /// This key's own fingerprint, i.e. what its children record.
    pub fn fingerprint(&self) -> [u8; 4] {
        let digest = sha256(&self.public_key);
        [digest[0], digest[1], digest[2], digest[3]]
    }
}

/// `parse256(IL) + parent (mod n)` as a secret key, or `None` when
/// `IL >= n` or the sum is zero.
fn tweak(il: &[u8], parent: &Scalar) -> Option<SecretKey> {
    let il_scalar: Option<Scalar> = Scalar::from_repr(FieldBytes::clone_from_slice(il)).into();
    il_scalar
        .map(|t| t + parent)
        .and_then(|sum| SecretKey::from_bytes(&sum.to_repr()).ok())
}

/// The index after `index` without leaving its range (normal or hardened).
fn next_in_range(index: u32) -> Option<u32> {
    if index == HARDENED_OFFSET - 1 || index == u32::MAX {
        None
    } else {
        Some(index + 1)
    }
}

impl Drop for ExtendedKey {
    fn drop(&mut self) {
        self.chain_code.zeroize();
    }
}

impl fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedKey")
            .field("public_key", &self.public_key_hex())
            .field("depth", &self.depth)
            .field("child_number", &ChildNumber::from_raw(self.child_number))
            .field("parent_fingerprint", &hex::encode(self.parent_fingerprint))
            .finish_non_exhaustive()
    }
}

impl PartialEq for ExtendedKey {
    /// Same position, same public key, same chain code. Private keys are not
    /// compared directly; they determine the public key anyway.
    fn eq(&self, other: &Self) -> bool {
        self.public_key == other.public_key
            && self.chain_code == other.chain_code
            && self.depth == other.depth
            && self.child_number == other.child_number
    }
}

impl Eq for ExtendedKey {}
