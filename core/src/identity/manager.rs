//! # Identity Manager
//!
//! Lifecycle of the device's Civic identity:
//!
//! ```text
//! NonExistent ──create──► Stored ──restore──► Restored (in memory)
//!      ▲                    │
//!      └──────delete────────┘
//! ```
//!
//! The stored record is `{did, publicKey, privateKey, createdAt,
//! passwordHash?}`. With a password it is sealed by the vault and carries a
//! salted password hash; without one it is written in the legacy hex form
//! and a warning is logged. The bare DID is also written to its own slot so
//! [`IdentityManager::exists`] and [`IdentityManager::stored_did`] never need
//! the password.
//!
//! There is at most one identity per store. [`IdentityManager::create`]
//! refuses to run while one exists; it has to be deleted first. The record
//! and the DID slot are written and removed together in one batch.
//!
//! Restoring re-checks everything it can: the password hash, the full DID
//! (method included) against the stored public key, and the public key
//! against the private key. A record that fails either key check is
//! reported as [`CoreError::Integrity`] and left untouched.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::{IdentityConfig, DID_SLOT, IDENTITY_SLOT};
use crate::crypto::keys::{IdentityKeypair, IdentityPublicKey, IdentitySignature};
use crate::error::{CoreError, Result};
use crate::identity::did::{CivicDid, DidDocument};
use crate::vault::{open_record, seal_record, SecretStore, SecureVault};

/// Persisted form of an identity.
#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IdentityRecord {
    pub(crate) did: String,
    pub(crate) public_key: String,
    pub(crate) private_key: String,
    /// Milliseconds since the Unix epoch.
    pub(crate) created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) password_hash: Option<String>,
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// An unlocked identity: DID plus the Ed25519 keypair behind it.
#[derive(Clone)]
pub struct Identity {
    did: CivicDid,
    keypair: IdentityKeypair,
    created_at: DateTime<Utc>,
}

impl Identity {
    pub fn did(&self) -> &CivicDid {
        &self.did
    }

    pub fn public_key(&self) -> IdentityPublicKey {
        self.keypair.public_key()
    }

    pub fn public_key_hex(&self) -> String {
        self.keypair.public_key_hex()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Deterministic Ed25519 signature over the UTF-8 bytes of `message`.
    pub fn sign_message(&self, message: &str) -> IdentitySignature {
        self.keypair.sign(message.as_bytes())
    }

    pub fn verify_message(&self, message: &str, signature: &IdentitySignature) -> bool {
        self.keypair.verify(message.as_bytes(), signature)
    }

    pub fn did_document(&self) -> DidDocument {
        self.did.to_did_document(&self.keypair.public_key())
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("did", &self.did.to_string())
            .field("public_key", &self.public_key_hex())
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// IdentityManager
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct IdentityManager {
    store: Arc<dyn SecretStore>,
    vault: SecureVault,
    config: IdentityConfig,
}

impl IdentityManager {
    pub fn new(store: Arc<dyn SecretStore>, vault: SecureVault, config: IdentityConfig) -> Self {
        Self {
            store,
            vault,
            config,
        }
    }

    /// Mint a new identity and store it.
    ///
    /// Fails with [`CoreError::Validation`] if an identity is already
    /// stored; call [`delete`](Self::delete) first to replace it.
    ///
    /// `password: None` stores the private key in the reversible legacy
    /// encoding. Only do that if the store itself is protected.
    pub fn create<R: RngCore + CryptoRng>(
        &self,
        password: Option<&str>,
        rng: &mut R,
    ) -> Result<Identity> {
        if self.store.contains(IDENTITY_SLOT)? || self.exists()? {
            return Err(CoreError::Validation(
                "an identity already exists; delete it first".into(),
            ));
        }

        let keypair = IdentityKeypair::generate(rng);
        let did = CivicDid::with_method(&self.config.did_method, &keypair.public_key());
        let created_at = Utc::now();

        let password_hash = password
            .map(|p| self.vault.hash_password(p, rng))
            .transpose()?;
        let record = IdentityRecord {
            did: did.to_string(),
            public_key: keypair.public_key_hex(),
            private_key: keypair.secret_key_hex().to_string(),
            created_at: created_at.timestamp_millis(),
            password_hash,
        };

        let sealed = seal_record(&self.vault, &record, password, rng)?;
        self.store.put_all(&[
            (IDENTITY_SLOT, sealed.as_str()),
            (DID_SLOT, record.did.as_str()),
        ])?;

        info!(did = %did, protected = password.is_some(), "identity created");
        Ok(Identity {
            did,
            keypair,
            created_at: truncate_to_millis(created_at),
        })
    }

    /// Load and verify the stored identity.
    pub fn restore(&self, password: Option<&str>) -> Result<Identity> {
        let stored = self
            .store
            .get(IDENTITY_SLOT)?
            .ok_or_else(|| CoreError::NotFound("identity".into()))?;
        let record: IdentityRecord = open_record(&self.vault, &stored, password)?;

        if let Some(hash) = &record.password_hash {
            let password = password.ok_or(CoreError::Authentication)?;
            if !self.vault.verify_password(password, hash) {
                return Err(CoreError::Authentication);
            }
        }

        let identity = verify_record(&record, &self.config.did_method)?;
        info!(did = %identity.did, "identity restored");
        Ok(identity)
    }

    /// `true` if an identity is stored. Reads the DID slot only.
    pub fn exists(&self) -> Result<bool> {
        self.store.contains(DID_SLOT)
    }

    /// The stored DID, readable without the password.
    pub fn stored_did(&self) -> Result<Option<String>> {
        self.store.get(DID_SLOT)
    }

    /// Remove the identity record and the DID slot. There is no undo; the
    /// identity key exists nowhere else.
    pub fn delete(&self) -> Result<()> {
        self.store.remove_all(&[IDENTITY_SLOT, DID_SLOT])?;
        warn!("identity deleted");
        Ok(())
    }
}

/// Rebuild an [`Identity`] from a decoded record, checking that the DID,
/// public key and private key all agree. The DID must be exactly the one
/// `did_method` and the public key produce.
fn verify_record(record: &IdentityRecord, did_method: &str) -> Result<Identity> {
    let public_key = IdentityPublicKey::from_hex(&record.public_key)
        .map_err(|_| CoreError::Integrity("stored public key is malformed".into()))?;

    let did = CivicDid::with_method(did_method, &public_key);
    if did.to_string() != record.did {
        return Err(CoreError::Integrity(
            "DID does not match stored public key".into(),
        ));
    }

    let keypair = IdentityKeypair::from_secret_hex(&record.private_key)
        .map_err(|_| CoreError::Integrity("stored private key is malformed".into()))?;
    if keypair.public_key() != public_key {
        return Err(CoreError::Integrity(
            "private key does not match stored public key".into(),
        ));
    }

    let created_at = Utc
        .timestamp_millis_opt(record.created_at)
        .single()
        .ok_or_else(|| CoreError::Integrity("stored creation time is out of range".into()))?;

    Ok(Identity {
        did,
        keypair,
        created_at,
    })
}

fn truncate_to_millis(t: DateTime<Utc>) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(t.timestamp_millis())
        .single()
        .unwrap_or(t)
}
