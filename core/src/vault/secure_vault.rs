//! # SecureVault
//!
//! Password-based protection for secrets at rest.
//!
//! ```text
//! key        = PBKDF2-HMAC-SHA256(password, salt, iterations) → 32 bytes
//! hash blob  = saltHex ":" keyHex
//! cipher blob= saltHex ":" ivHex ":" (AES-256-GCM(key, iv, plaintext) ‖ tag)Hex
//! ```
//!
//! Every call to [`SecureVault::encrypt`] and [`SecureVault::hash_password`]
//! draws a fresh 16-byte salt (and a fresh 12-byte IV for encryption), so
//! the same plaintext under the same password never produces the same blob
//! twice.
//!
//! The iteration count is not stored in the blob. A blob can only be read
//! back by a vault configured with the count that wrote it.

use hmac::Hmac;
use rand_core::{CryptoRng, RngCore};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::debug;
use zeroize::Zeroizing;

use crate::config::{VaultConfig, AES_KEY_LENGTH, AES_NONCE_LENGTH, VAULT_SALT_LENGTH};
use crate::crypto::encryption;
use crate::error::{CoreError, Result};

/// Password-based key derivation, password hashing and authenticated
/// encryption.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecureVault {
    config: VaultConfig,
}

impl SecureVault {
    pub fn new(config: VaultConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// PBKDF2-HMAC-SHA256 with the configured iteration count.
    pub fn derive_key(
        &self,
        password: &str,
        salt: &[u8],
    ) -> Result<Zeroizing<[u8; AES_KEY_LENGTH]>> {
        derive_key(password, salt, self.config.pbkdf2_iterations)
    }

    /// Salted password hash for later verification, as `saltHex:hashHex`.
    pub fn hash_password<R: RngCore + CryptoRng>(
        &self,
        password: &str,
        rng: &mut R,
    ) -> Result<String> {
        let mut salt = [0u8; VAULT_SALT_LENGTH];
        rng.fill_bytes(&mut salt);
        let hash = self.derive_key(password, &salt)?;
        Ok(format!("{}:{}", hex::encode(salt), hex::encode(*hash)))
    }

    /// Constant-time check of `password` against a `saltHex:hashHex` record.
    /// Malformed records verify as `false`.
    pub fn verify_password(&self, password: &str, stored: &str) -> bool {
        let Some((salt_hex, hash_hex)) = stored.split_once(':') else {
            return false;
        };
        let (Ok(salt), Ok(expected)) = (hex::decode(salt_hex), hex::decode(hash_hex)) else {
            return false;
        };
        if salt.is_empty() || expected.len() != AES_KEY_LENGTH {
            return false;
        }
        match self.derive_key(password, &salt) {
            Ok(candidate) => candidate.as_slice().ct_eq(expected.as_slice()).into(),
            Err(_) => false,
        }
    }

    /// Encrypt `plaintext` under a key derived from `password`.
    ///
    /// Returns `saltHex:ivHex:cipherHex`; the ciphertext carries the GCM tag.
    pub fn encrypt<R: RngCore + CryptoRng>(
        &self,
        plaintext: &[u8],
        password: &str,
        rng: &mut R,
    ) -> Result<String> {
        let mut salt = [0u8; VAULT_SALT_LENGTH];
        let mut iv = [0u8; AES_NONCE_LENGTH];
        rng.fill_bytes(&mut salt);
        rng.fill_bytes(&mut iv);

        let key = self.derive_key(password, &salt)?;
        let ciphertext = encryption::encrypt(&key, &iv, plaintext)?;

        debug!(bytes = plaintext.len(), "vault encrypted secret");
        Ok(format!(
            "{}:{}:{}",
            hex::encode(salt),
            hex::encode(iv),
            hex::encode(ciphertext)
        ))
    }

    /// Decrypt a blob produced by [`encrypt`](Self::encrypt).
    ///
    /// Wrong password, tampered ciphertext and malformed blob all return
    /// [`CoreError::Authentication`].
    pub fn decrypt(&self, blob: &str, password: &str) -> Result<Zeroizing<Vec<u8>>> {
        let mut parts = blob.split(':');
        let (Some(salt_hex), Some(iv_hex), Some(cipher_hex), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(CoreError::Authentication);
        };

        let salt = hex::decode(salt_hex).map_err(|_| CoreError::Authentication)?;
        let iv: [u8; AES_NONCE_LENGTH] = hex::decode(iv_hex)
            .ok()
            .and_then(|v| v.try_into().ok())
            .ok_or(CoreError::Authentication)?;
        let ciphertext = hex::decode(cipher_hex).map_err(|_| CoreError::Authentication)?;
        if salt.is_empty() {
            return Err(CoreError::Authentication);
        }

        let key = self
            .derive_key(password, &salt)
            .map_err(|_| CoreError::Authentication)?;
        encryption::decrypt(&key, &iv, &ciphertext).map(Zeroizing::new)
    }
}

/// PBKDF2-HMAC-SHA256 → 32-byte key.
pub fn derive_key(
    password: &str,
    salt: &[u8],
    iterations: u32,
) -> Result<Zeroizing<[u8; AES_KEY_LENGTH]>> {
    if iterations == 0 {
        return Err(CoreError::Validation(
            "PBKDF2 iteration count must be positive".into(),
        ));
    }
    let mut key = Zeroizing::new([0u8; AES_KEY_LENGTH]);
    pbkdf2::pbkdf2::<Hmac<Sha256>>(password.as_bytes(), salt, iterations, &mut key[..])
        .map_err(|e| CoreError::Derivation(format!("key derivation failed: {e}")))?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn vault() -> SecureVault {
        SecureVault::new(VaultConfig {
            pbkdf2_iterations: 1_000,
        })
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_pbkdf2_sha256_rfc7914_vector() {
        // RFC 7914 §11: PBKDF2-HMAC-SHA256("passwd", "salt", 1), first 32 bytes.
        let key = derive_key("passwd", b"salt", 1).unwrap();
        assert_eq!(
            hex::encode(*key),
            "55ac046e56e3089fec1691c22544b605f94185216dde0465e68b9d57c20dacbc"
        );
    }

    #[test]
    fn zero_iterations_rejected() {
        assert!(derive_key("pw", b"salt", 0).is_err());
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let v = vault();
        let blob = v.encrypt(b"my secret", "hunter2", &mut rng()).unwrap();
        assert_eq!(blob.split(':').count(), 3);
        assert_eq!(v.decrypt(&blob, "hunter2").unwrap().as_slice(), b"my secret");
    }

    #[test]
    fn wrong_password_is_authentication_error() {
        let v = vault();
        let blob = v.encrypt(b"my secret", "hunter2", &mut rng()).unwrap();
        assert!(matches!(v.decrypt(&blob, "hunter3"), Err(CoreError::Authentication)));
    }

    #[test]
    fn malformed_blobs_are_authentication_errors() {
        let v = vault();
        let good = v.encrypt(b"x", "pw", &mut rng()).unwrap();
        let (salt, rest) = good.split_once(':').unwrap();
        let (iv, cipher) = rest.split_once(':').unwrap();
        for bad in [
            String::new(),
            "nocolons".to_string(),
            format!("{salt}:{iv}"),
            format!("{salt}:{iv}:{cipher}:extra"),
            format!("zz:{iv}:{cipher}"),
            format!("{salt}:abcd:{cipher}"),
            format!(":{iv}:{cipher}"),
            format!("{salt}:{iv}:00"),
        ] {
            assert!(
                matches!(v.decrypt(&bad, "pw"), Err(CoreError::Authentication)),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let v = vault();
        let blob = v.encrypt(b"payload", "pw", &mut rng()).unwrap();
        let mut chars: Vec<char> = blob.chars().collect();
        let last = chars.len() - 1;
        chars[last] = if chars[last] == '0' { '1' } else { '0' };
        let tampered: String = chars.into_iter().collect();
        assert!(matches!(v.decrypt(&tampered, "pw"), Err(CoreError::Authentication)));
    }

    #[test]
    fn encryptions_never_repeat() {
        let v = vault();
        let mut r = rng();
        let a = v.encrypt(b"same", "pw", &mut r).unwrap();
        let b = v.encrypt(b"same", "pw", &mut r).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn password_hash_verify() {
        let v = vault();
        let stored = v.hash_password("correct horse", &mut rng()).unwrap();
        assert!(v.verify_password("correct horse", &stored));
        assert!(!v.verify_password("wrong horse", &stored));
    }

    #[test]
    fn password_hash_is_salted() {
        let v = vault();
        let mut r = rng();
        let a = v.hash_password("pw", &mut r).unwrap();
        let b = v.hash_password("pw", &mut r).unwrap();
        assert_ne!(a, b);
        assert!(v.verify_password("pw", &a));
        assert!(v.verify_password("pw", &b));
    }

    #[test]
    fn malformed_password_record_is_false() {
        let v = vault();
        for bad in ["", "abc", "zz:zz", "00:", ":00", "0011:0011"] {
            assert!(!v.verify_password("pw", bad), "accepted {bad:?}");
        }
    }

    #[test]
    fn iteration_count_must_match() {
        let blob = vault().encrypt(b"x", "pw", &mut rng()).unwrap();
        let other = SecureVault::new(VaultConfig {
            pbkdf2_iterations: 999,
        });
        assert!(other.decrypt(&blob, "pw").is_err());
    }
}
