//! # Identity Keys
//!
//! Ed25519 keypairs for Civic identities. These are independent of the
//! secp256k1 wallet tree: an identity is not derived from the recovery
//! phrase and the phrase cannot restore it. The identity record in the
//! vault is the only copy.
//!
//! ## Security considerations
//!
//! - Signing keys are zeroized on drop (ed25519-dalek does this for us).
//! - Randomness is injected. Production callers pass `OsRng`; tests pass a
//!   seeded `StdRng`.
//! - Key bytes are never logged and never appear in `Debug` output.

use std::fmt;

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey, SECRET_KEY_LENGTH};
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::{CoreError, Result};

/// Multicodec prefix for an Ed25519 public key.
const ED25519_MULTICODEC: [u8; 2] = [0xed, 0x01];

/// An Ed25519 identity keypair.
///
/// Does not implement `Serialize`. Exporting the secret is an explicit
/// [`secret_key_hex`](Self::secret_key_hex) call.
pub struct IdentityKeypair {
    signing_key: SigningKey,
}

/// The public half of an identity key. Safe to share.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityPublicKey {
    bytes: [u8; 32],
}

/// A 64-byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct IdentitySignature {
    bytes: [u8; 64],
}

impl IdentityKeypair {
    /// Generate a fresh keypair from `rng`.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self {
            signing_key: SigningKey::generate(rng),
        }
    }

    /// Rebuild a keypair from its 32-byte secret. In Ed25519 the secret is
    /// the seed, so any 32 bytes are valid.
    pub fn from_secret_bytes(secret: &[u8; SECRET_KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(secret),
        }
    }

    /// Rebuild a keypair from a hex-encoded secret.
    pub fn from_secret_hex(hex_str: &str) -> Result<Self> {
        let bytes = Zeroizing::new(
            hex::decode(hex_str)
                .map_err(|_| CoreError::Validation("secret key is not valid hex".into()))?,
        );
        let secret: &[u8; SECRET_KEY_LENGTH] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CoreError::Validation("secret key must be 32 bytes".into()))?;
        Ok(Self::from_secret_bytes(secret))
    }

    pub fn public_key(&self) -> IdentityPublicKey {
        IdentityPublicKey {
            bytes: self.signing_key.verifying_key().to_bytes(),
        }
    }

    pub fn public_key_hex(&self) -> String {
        self.public_key().to_hex()
    }

    /// Hex-encoded secret key. Handle with care; the returned string is
    /// wiped when dropped but anything you copy it into is not.
    pub fn secret_key_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.signing_key.to_bytes()))
    }

    /// Deterministic Ed25519 signature over `message`.
    pub fn sign(&self, message: &[u8]) -> IdentitySignature {
        IdentitySignature {
            bytes: self.signing_key.sign(message).to_bytes(),
        }
    }

    pub fn verify(&self, message: &[u8], signature: &IdentitySignature) -> bool {
        self.public_key().verify(message, signature)
    }
}

impl Clone for IdentityKeypair {
    fn clone(&self) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&self.signing_key.to_bytes()),
        }
    }
}

impl fmt::Debug for IdentityKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentityKeypair(pub={})", self.public_key_hex())
    }
}

// ---------------------------------------------------------------------------
// IdentityPublicKey
// ---------------------------------------------------------------------------

impl IdentityPublicKey {
    /// Parse a hex public key, rejecting bytes that are not a curve point.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s)
            .map_err(|_| CoreError::Validation("public key is not valid hex".into()))?;
        let bytes: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CoreError::Validation("public key must be 32 bytes".into()))?;
        VerifyingKey::from_bytes(&bytes)
            .map_err(|_| CoreError::Validation("public key is not a valid Ed25519 point".into()))?;
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Multibase base58btc form (`z...`) of the multicodec-tagged key, as
    /// used for `publicKeyMultibase` in DID documents.
    pub fn to_multibase(&self) -> String {
        let mut tagged = Vec::with_capacity(ED25519_MULTICODEC.len() + self.bytes.len());
        tagged.extend_from_slice(&ED25519_MULTICODEC);
        tagged.extend_from_slice(&self.bytes);
        format!("z{}", bs58::encode(tagged).into_string())
    }

    /// `false` for a bad signature or an invalid key. Never panics.
    pub fn verify(&self, message: &[u8], signature: &IdentitySignature) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.bytes) else {
            return false;
        };
        let sig = Signature::from_bytes(&signature.bytes);
        verifying_key.verify(message, &sig).is_ok()
    }
}

impl fmt::Display for IdentityPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for IdentityPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentityPublicKey({})", &self.to_hex()[..16])
    }
}

// ---------------------------------------------------------------------------
// IdentitySignature
// ---------------------------------------------------------------------------

impl IdentitySignature {
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s)
            .map_err(|_| CoreError::Validation("signature is not valid hex".into()))?;
        let bytes: [u8; 64] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CoreError::Validation("signature must be 64 bytes".into()))?;
        Ok(Self { bytes })
    }
}

impl fmt::Display for IdentitySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for IdentitySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex_str = self.to_hex();
        write!(f, "IdentitySignature({}...{})", &hex_str[..8], &hex_str[120..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn keypair(seed: u64) -> IdentityKeypair {
        IdentityKeypair::generate(&mut StdRng::seed_from_u64(seed))
    }

    #[test]
    fn keypair_sign_verify_roundtrip() {
        let kp = keypair(1);
        let sig = kp.sign(b"hello civic");
        assert!(kp.verify(b"hello civic", &sig));
        assert!(!kp.verify(b"hello civic!", &sig));
    }

    #[test]
    fn wrong_key_fails_verification() {
        let sig = keypair(1).sign(b"message");
        assert!(!keypair(2).verify(b"message", &sig));
    }

    #[test]
    fn signatures_are_deterministic() {
        let kp = keypair(3);
        assert_eq!(kp.sign(b"same"), kp.sign(b"same"));
    }

    #[test]
    fn test_roundtrip_secret_hex() {
        let kp = keypair(4);
        let restored = IdentityKeypair::from_secret_hex(&kp.secret_key_hex()).unwrap();
        assert_eq!(kp.public_key(), restored.public_key());
    }

    #[test]
    fn test_rfc8032_test1_public_key() {
        let secret =
            hex::decode("9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60")
                .unwrap();
        let kp = IdentityKeypair::from_secret_bytes(secret.as_slice().try_into().unwrap());
        assert_eq!(
            kp.public_key_hex(),
            "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a"
        );
    }

    #[test]
    fn public_key_hex_roundtrip() {
        let pk = keypair(5).public_key();
        assert_eq!(IdentityPublicKey::from_hex(&pk.to_hex()).unwrap(), pk);
        assert!(IdentityPublicKey::from_hex("abcd").is_err());
        assert!(IdentityPublicKey::from_hex("zz").is_err());
    }

    #[test]
    fn signature_hex_roundtrip() {
        let sig = keypair(6).sign(b"x");
        assert_eq!(IdentitySignature::from_hex(&sig.to_hex()).unwrap(), sig);
        assert!(IdentitySignature::from_hex(&"00".repeat(63)).is_err());
    }

    #[test]
    fn debug_hides_secret() {
        let kp = keypair(7);
        let dbg = format!("{kp:?}");
        assert!(!dbg.contains(kp.secret_key_hex().as_str()));
        assert!(dbg.contains(&kp.public_key_hex()));
    }

    #[test]
    fn multibase_carries_multicodec_tag() {
        let pk = keypair(8).public_key();
        let multibase = pk.to_multibase();
        assert!(multibase.starts_with("z6Mk"));
        let decoded = bs58::decode(&multibase[1..]).into_vec().unwrap();
        assert_eq!(&decoded[..2], &ED25519_MULTICODEC);
        assert_eq!(&decoded[2..], pk.as_bytes());
    }
}
