//! # DID (Decentralized Identifier)
//!
//! Civic identities are named by a self-certifying DID:
//!
//! ```text
//! did:<method>:<first 32 hex chars of SHA-256(publicKeyHex)>
//! ```
//!
//! Note the hash input is the lowercase *hex string* of the Ed25519 public
//! key, not the raw 32 bytes. Existing identities were minted that way and
//! changing it would change every DID.
//!
//! The identifier is a hash, so the public key cannot be recovered from the
//! DID. Anything that needs the key (the DID document, integrity checks)
//! carries it alongside.
//!
//! ## DID Document
//!
//! [`CivicDid::to_did_document`] produces a W3C DID Core v1.0 document with a
//! single `Ed25519VerificationKey2020` method, referenced from both
//! `authentication` and `assertionMethod`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_DID_METHOD, DID_HASH_HEX_LENGTH};
use crate::crypto::keys::IdentityPublicKey;
use crate::crypto::sha256_hex;
use crate::error::{CoreError, Result};

/// Context URI for the W3C DID Core specification.
const DID_CONTEXT: &str = "https://www.w3.org/ns/did/v1";

/// Context URI for the Ed25519 verification key suite.
const ED25519_CONTEXT: &str = "https://w3id.org/security/suites/ed25519-2020/v1";

/// Verification method type for Ed25519 public keys.
const VERIFICATION_KEY_TYPE: &str = "Ed25519VerificationKey2020";

// ---------------------------------------------------------------------------
// CivicDid
// ---------------------------------------------------------------------------

/// A parsed `did:<method>:<id>` string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CivicDid {
    method: String,
    id: String,
}

impl CivicDid {
    /// Derive the DID for `public_key` under the default `civic` method.
    pub fn from_public_key(public_key: &IdentityPublicKey) -> Self {
        Self::with_method(DEFAULT_DID_METHOD, public_key)
    }

    /// Derive the DID for `public_key` under `method`.
    pub fn with_method(method: &str, public_key: &IdentityPublicKey) -> Self {
        Self {
            method: method.to_string(),
            id: did_hash(&public_key.to_hex()),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Method-specific identifier (the hash part).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// `true` if the method-specific id is the one `public_key` derives to.
    /// The method is not compared.
    pub fn matches(&self, public_key: &IdentityPublicKey) -> bool {
        self.id == did_hash(&public_key.to_hex())
    }

    /// W3C DID document for this DID and its key.
    ///
    /// The caller is responsible for passing the key the DID was derived
    /// from; use [`matches`](Self::matches) first if unsure.
    pub fn to_did_document(&self, public_key: &IdentityPublicKey) -> DidDocument {
        let did_string = self.to_string();
        let key_id = format!("{did_string}#key-1");

        DidDocument {
            context: vec![DID_CONTEXT.to_string(), ED25519_CONTEXT.to_string()],
            id: did_string.clone(),
            verification_method: vec![VerificationMethod {
                id: key_id.clone(),
                type_: VERIFICATION_KEY_TYPE.to_string(),
                controller: did_string,
                public_key_multibase: public_key.to_multibase(),
            }],
            authentication: vec![key_id.clone()],
            assertion_method: vec![key_id],
            created: Utc::now(),
        }
    }
}

impl fmt::Display for CivicDid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "did:{}:{}", self.method, self.id)
    }
}

impl FromStr for CivicDid {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let (method, id) = parse_did(s)?;
        Ok(Self {
            method: method.to_string(),
            id: id.to_string(),
        })
    }
}

/// First 32 hex characters of SHA-256 over `public_key_hex`.
pub fn did_hash(public_key_hex: &str) -> String {
    let mut digest = sha256_hex(public_key_hex.as_bytes());
    digest.truncate(DID_HASH_HEX_LENGTH);
    digest
}

/// Split `did:<method>:<id>` into `(method, id)`.
///
/// The method must be non-empty lowercase alphanumerics (DID Core syntax);
/// the id must be non-empty and free of whitespace.
pub fn parse_did(did: &str) -> Result<(&str, &str)> {
    let mut parts = did.splitn(3, ':');
    let (Some(scheme), Some(method), Some(id)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(CoreError::Validation(format!(
            "DID must have the form did:<method>:<id>, got '{did}'"
        )));
    };

    if scheme != "did" {
        return Err(CoreError::Validation(format!(
            "expected 'did' prefix, got '{scheme}'"
        )));
    }
    if method.is_empty()
        || !method
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
    {
        return Err(CoreError::Validation(format!("invalid DID method '{method}'")));
    }
    if id.is_empty() || id.chars().any(char::is_whitespace) {
        return Err(CoreError::Validation(format!("invalid DID identifier '{id}'")));
    }
    Ok((method, id))
}

// ---------------------------------------------------------------------------
// DID Document Types
// ---------------------------------------------------------------------------

/// A W3C DID Document describing a Civic identity.
///
/// Civic identities are single-key, so every verification relationship
/// points at the same Ed25519 method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DidDocument {
    #[serde(rename = "@context")]
    pub context: Vec<String>,

    pub id: String,

    #[serde(rename = "verificationMethod")]
    pub verification_method: Vec<VerificationMethod>,

    pub authentication: Vec<String>,

    #[serde(rename = "assertionMethod")]
    pub assertion_method: Vec<String>,

    pub created: DateTime<Utc>,
}

impl DidDocument {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Structural checks: parseable DID id, at least one verification method
    /// and authentication reference, DID Core context present.
    pub fn validate(&self) -> Result<()> {
        parse_did(&self.id)?;

        if self.verification_method.is_empty() {
            return Err(CoreError::Validation(
                "document must have at least one verification method".into(),
            ));
        }
        if self.authentication.is_empty() {
            return Err(CoreError::Validation(
                "document must have at least one authentication method".into(),
            ));
        }
        if !self.context.iter().any(|c| c == DID_CONTEXT) {
            return Err(CoreError::Validation(
                "document must include DID Core context".into(),
            ));
        }
        Ok(())
    }
}

/// A verification method entry in a DID Document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationMethod {
    pub id: String,

    #[serde(rename = "type")]
    pub type_: String,

    pub controller: String,

    /// Multicodec-prefixed key, base58btc with a `z` multibase prefix.
    #[serde(rename = "publicKeyMultibase")]
    pub public_key_multibase: String,
}
