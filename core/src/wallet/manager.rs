//! # Wallet Manager
//!
//! A non-custodial wallet bound to an identity DID. The wallet itself is
//! nothing more than a recovery phrase; every address is re-derived from it
//! on load. What gets stored is a backup of `{mnemonic, civicId}`, sealed
//! by the vault under the user's password (or, by explicit opt-out, in the
//! legacy hex form).
//!
//! The backup is the only stored copy of the phrase, so a new wallet is
//! never written over an existing one; [`WalletManager::delete`] has to run
//! first.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::WALLET_SLOT;
use crate::error::{CoreError, Result};
use crate::vault::{open_record, seal_record, SecretStore, SecureVault};
use crate::wallet::chains::{generate_wallet_addresses, Chain, ChainAddress};
use crate::wallet::mnemonic::{generate_mnemonic, Mnemonic, WordCount};

/// Account index used for the wallet's addresses.
const DEFAULT_ACCOUNT: u32 = 0;

/// Persisted form of a wallet.
#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
struct WalletRecord {
    mnemonic: String,
    civic_id: String,
}

// ---------------------------------------------------------------------------
// Wallet
// ---------------------------------------------------------------------------

/// An unlocked wallet: the phrase plus one address per supported chain.
pub struct Wallet {
    civic_id: String,
    mnemonic: Mnemonic,
    addresses: BTreeMap<Chain, ChainAddress>,
}

impl Wallet {
    fn from_mnemonic(civic_id: String, mnemonic: Mnemonic) -> Result<Self> {
        let addresses = generate_wallet_addresses(&mnemonic, DEFAULT_ACCOUNT)?;
        Ok(Self {
            civic_id,
            mnemonic,
            addresses,
        })
    }

    /// DID of the identity this wallet is bound to.
    pub fn civic_id(&self) -> &str {
        &self.civic_id
    }

    pub fn address(&self, chain: Chain) -> Result<&ChainAddress> {
        self.addresses
            .get(&chain)
            .ok_or_else(|| CoreError::UnsupportedChain(chain.to_string()))
    }

    pub fn all_addresses(&self) -> &BTreeMap<Chain, ChainAddress> {
        &self.addresses
    }

    /// The recovery phrase. This is the only way to recover funds if the
    /// vault is lost, and the easiest way to lose them if it leaks.
    pub fn export_mnemonic(&self) -> &Mnemonic {
        warn!(civic_id = %self.civic_id, "recovery phrase exported");
        &self.mnemonic
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("civic_id", &self.civic_id)
            .field("addresses", &self.addresses)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// WalletManager
// ---------------------------------------------------------------------------

/// Creates, restores and deletes the wallet backup in a [`SecretStore`].
#[derive(Clone)]
pub struct WalletManager {
    store: Arc<dyn SecretStore>,
    vault: SecureVault,
}

impl WalletManager {
    pub fn new(store: Arc<dyn SecretStore>, vault: SecureVault) -> Self {
        Self { store, vault }
    }

    /// Generate a fresh 12-word wallet for `identity_did` and store its
    /// backup. Fails with [`CoreError::Validation`] if a backup exists.
    pub fn create<R: RngCore + CryptoRng>(
        &self,
        identity_did: &str,
        password: Option<&str>,
        rng: &mut R,
    ) -> Result<Wallet> {
        let generated = generate_mnemonic(WordCount::Twelve, rng);
        let mnemonic = Mnemonic::parse(generated.phrase())
            .map_err(|e| CoreError::Integrity(format!("generated mnemonic rejected: {e}")))?;
        self.store_wallet(identity_did, mnemonic, password, rng)
    }

    /// Bind an existing recovery phrase to `identity_did` and store it.
    /// Same no-overwrite rule as [`create`](Self::create).
    pub fn import<R: RngCore + CryptoRng>(
        &self,
        identity_did: &str,
        phrase: &str,
        password: Option<&str>,
        rng: &mut R,
    ) -> Result<Wallet> {
        let mnemonic = Mnemonic::parse(phrase)?;
        self.store_wallet(identity_did, mnemonic, password, rng)
    }

    /// Load the stored backup and re-derive every address.
    pub fn restore(&self, password: Option<&str>) -> Result<Wallet> {
        let stored = self
            .store
            .get(WALLET_SLOT)?
            .ok_or_else(|| CoreError::NotFound("wallet".into()))?;
        let record: WalletRecord = open_record(&self.vault, &stored, password)?;

        let mnemonic = Mnemonic::parse(&record.mnemonic)
            .map_err(|_| CoreError::Integrity("stored recovery phrase is invalid".into()))?;
        let wallet = Wallet::from_mnemonic(record.civic_id.clone(), mnemonic)?;

        info!(civic_id = %wallet.civic_id, "wallet restored");
        Ok(wallet)
    }

    pub fn exists(&self) -> Result<bool> {
        self.store.contains(WALLET_SLOT)
    }

    /// Remove the backup. Irreversible: without the phrase written down
    /// elsewhere, the funds are gone.
    pub fn delete(&self) -> Result<()> {
        self.store.remove(WALLET_SLOT)?;
        warn!("wallet backup deleted");
        Ok(())
    }

    fn ensure_vacant(&self) -> Result<()> {
        if self.exists()? {
            return Err(CoreError::Validation(
                "a wallet already exists; delete it first".into(),
            ));
        }
        Ok(())
    }

    fn store_wallet<R: RngCore + CryptoRng>(
        &self,
        identity_did: &str,
        mnemonic: Mnemonic,
        password: Option<&str>,
        rng: &mut R,
    ) -> Result<Wallet> {
        self.ensure_vacant()?;
        let wallet = Wallet::from_mnemonic(identity_did.to_string(), mnemonic)?;

        let record = WalletRecord {
            mnemonic: wallet.mnemonic.phrase().to_string(),
            civic_id: wallet.civic_id.clone(),
        };
        let sealed = seal_record(&self.vault, &record, password, rng)?;
        self.store.put(WALLET_SLOT, &sealed)?;

        info!(
            civic_id = %wallet.civic_id,
            protected = password.is_some(),
            "wallet stored"
        );
        Ok(wallet)
    }
}
