//! # Chain Registry & Address Derivation
//!
//! Maps chain symbols to BIP-44 coin types and turns leaf keys into address
//! strings. Every chain lives at `m/44'/coin'/account'/change/index`.
//!
//! | Chain  | Coin type | Codec                                           |
//! |--------|-----------|-------------------------------------------------|
//! | BTC    | 0         | bech32 `bc` over SHA-256(pubkey)[..20]           |
//! | ETH    | 60        | `0x` + hex(Keccak-256(uncompressed)[12..])       |
//! | KASPA  | 111       | `kaspa:` + hex(BLAKE3(pubkey)[..25])             |
//! | MONERO | 128       | `4` + base58(pubkey ‖ BLAKE3(pubkey)[..4])       |
//!
//! Only the ETH codec produces addresses another wallet would recognise.
//! The others are stand-ins with the right shape: BTC lacks HASH160 and the
//! witness version, Kaspa and Monero use neither their real hash nor their
//! real encoding, and Monero would need ed25519 spend/view keys anyway.
//! Each codec sits behind [`AddressCodec`] so a standard one can replace it
//! without touching derivation.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use bech32::{Bech32, Hrp};
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use crate::config::{COIN_TYPE_BTC, COIN_TYPE_ETH, COIN_TYPE_KASPA, COIN_TYPE_MONERO};
use crate::crypto::{blake3_hash, keccak256, sha256};
use crate::error::{CoreError, Result};
use crate::wallet::keytree::{DerivationPath, ExtendedKey};
use crate::wallet::mnemonic::Mnemonic;
use crate::wallet::seed::mnemonic_to_seed;

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

/// Supported chains, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Chain {
    Btc,
    Eth,
    Kaspa,
    Monero,
}

impl Chain {
    pub const ALL: [Chain; 4] = [Chain::Btc, Chain::Eth, Chain::Kaspa, Chain::Monero];

    pub fn symbol(self) -> &'static str {
        match self {
            Chain::Btc => "BTC",
            Chain::Eth => "ETH",
            Chain::Kaspa => "KASPA",
            Chain::Monero => "MONERO",
        }
    }

    pub fn coin_type(self) -> u32 {
        match self {
            Chain::Btc => COIN_TYPE_BTC,
            Chain::Eth => COIN_TYPE_ETH,
            Chain::Kaspa => COIN_TYPE_KASPA,
            Chain::Monero => COIN_TYPE_MONERO,
        }
    }

    /// The codec that formats this chain's addresses.
    pub fn codec(self) -> &'static dyn AddressCodec {
        match self {
            Chain::Btc => &BtcCodec,
            Chain::Eth => &EthCodec,
            Chain::Kaspa => &KaspaCodec,
            Chain::Monero => &MoneroCodec,
        }
    }
}

impl FromStr for Chain {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Chain::ALL
            .into_iter()
            .find(|c| c.symbol().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::UnsupportedChain(s.to_string()))
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Coin type for a chain symbol, case-insensitive.
pub fn coin_type(symbol: &str) -> Result<u32> {
    symbol.parse::<Chain>().map(Chain::coin_type)
}

// ---------------------------------------------------------------------------
// Codecs
// ---------------------------------------------------------------------------

/// Turns a derived leaf key into an address string for one chain.
pub trait AddressCodec: Send + Sync {
    fn encode(&self, key: &ExtendedKey) -> Result<String>;
}

pub struct BtcCodec;
pub struct EthCodec;
pub struct KaspaCodec;
pub struct MoneroCodec;

const BTC_HRP: &str = "bc";

impl AddressCodec for BtcCodec {
    fn encode(&self, key: &ExtendedKey) -> Result<String> {
        let digest = sha256(key.public_key());
        let hrp = Hrp::parse(BTC_HRP)
            .map_err(|e| CoreError::Derivation(format!("bad address prefix: {e}")))?;
        bech32::encode::<Bech32>(hrp, &digest[..20])
            .map_err(|e| CoreError::Derivation(format!("bech32 encoding failed: {e}")))
    }
}

impl AddressCodec for EthCodec {
    fn encode(&self, key: &ExtendedKey) -> Result<String> {
        let uncompressed = key.uncompressed_public_key();
        let digest = keccak256(&uncompressed[1..]);
        Ok(format!("0x{}", hex::encode(&digest[12..])))
    }
}

impl AddressCodec for KaspaCodec {
    fn encode(&self, key: &ExtendedKey) -> Result<String> {
        let digest = blake3_hash(key.public_key());
        Ok(format!("kaspa:{}", hex::encode(&digest[..25])))
    }
}

impl AddressCodec for MoneroCodec {
    fn encode(&self, key: &ExtendedKey) -> Result<String> {
        let pubkey = key.public_key();
        let checksum = blake3_hash(pubkey);
        let mut payload = Vec::with_capacity(pubkey.len() + 4);
        payload.extend_from_slice(pubkey);
        payload.extend_from_slice(&checksum[..4]);
        Ok(format!("4{}", bs58::encode(payload).into_string()))
    }
}

// ---------------------------------------------------------------------------
// ChainAddress
// ---------------------------------------------------------------------------

/// One derived address plus the key material behind it.
///
/// Serializes without the private key.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainAddress {
    pub chain: Chain,
    pub address: String,
    pub public_key: String,
    pub path: String,
    #[serde(skip)]
    private_key: Zeroizing<String>,
}

impl ChainAddress {
    /// Hex-encoded secp256k1 private key of the leaf.
    pub fn private_key(&self) -> &str {
        &self.private_key
    }
}

impl fmt::Debug for ChainAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainAddress")
            .field("chain", &self.chain)
            .field("address", &self.address)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl PartialEq for ChainAddress {
    fn eq(&self, other: &Self) -> bool {
        self.chain == other.chain
            && self.address == other.address
            && self.public_key == other.public_key
            && self.path == other.path
    }
}

impl Eq for ChainAddress {}

/// Derive the address at `m/44'/coin'/account'/change/index` for `chain`.
pub fn derive_address(
    master: &ExtendedKey,
    chain: Chain,
    account: u32,
    change: u32,
    index: u32,
) -> Result<ChainAddress> {
    let path = DerivationPath::bip44(chain.coin_type(), account, change, index)?;
    let leaf = master.derive(&path)?;
    let address = chain.codec().encode(&leaf)?;

    debug!(chain = %chain, path = %path, "derived chain address");

    Ok(ChainAddress {
        chain,
        address,
        public_key: leaf.public_key_hex(),
        path: path.to_string(),
        private_key: leaf.private_key_hex(),
    })
}

/// One address per supported chain at `(account, 0, 0)`.
///
/// The seed and master key are derived once and shared across chains.
pub fn generate_wallet_addresses(
    mnemonic: &Mnemonic,
    account: u32,
) -> Result<BTreeMap<Chain, ChainAddress>> {
    let seed = mnemonic_to_seed(mnemonic, "")?;
    let master = ExtendedKey::master(&seed)?;
    Chain::ALL
        .into_iter()
        .map(|chain| Ok((chain, derive_address(&master, chain, account, 0, 0)?)))
        .collect()
}
