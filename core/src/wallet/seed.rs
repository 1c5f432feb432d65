//! Mnemonic → 64-byte seed (BIP-39).
//!
//! PBKDF2-HMAC-SHA512, 2048 rounds, salt `"mnemonic" + passphrase`, both
//! inputs NFKD-normalised first. The English wordlist is pure ASCII so NFKD
//! only matters for the passphrase, which users can and do type in any
//! script.

use hmac::Hmac;
use sha2::Sha512;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::config::{SEED_LENGTH, SEED_PBKDF2_ROUNDS, SEED_SALT_PREFIX};
use crate::error::{CoreError, Result};
use crate::wallet::mnemonic::Mnemonic;

/// Root seed bytes. Zeroized on drop, no `Clone`, no `Debug`.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Seed([u8; SEED_LENGTH]);

impl Seed {
    /// Wrap raw seed bytes, e.g. from the BIP-32 test vectors.
    pub fn from_bytes(bytes: [u8; SEED_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SEED_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// Derive the seed for a validated mnemonic.
pub fn mnemonic_to_seed(mnemonic: &Mnemonic, passphrase: &str) -> Result<Seed> {
    phrase_to_seed(mnemonic.phrase(), passphrase)
}

/// Derive the seed from raw phrase text without validating it.
///
/// BIP-39 defines the seed for any string, checksum or not. Callers that
/// want validation go through [`Mnemonic::parse`] first.
pub fn phrase_to_seed(phrase: &str, passphrase: &str) -> Result<Seed> {
    let password: Zeroizing<String> = Zeroizing::new(phrase.nfkd().collect());
    let salt: Zeroizing<String> =
        Zeroizing::new(format!("{SEED_SALT_PREFIX}{passphrase}").nfkd().collect());

    let mut output = [0u8; SEED_LENGTH];
    pbkdf2::pbkdf2::<Hmac<Sha512>>(
        password.as_bytes(),
        salt.as_bytes(),
        SEED_PBKDF2_ROUNDS,
        &mut output,
    )
    .map_err(|e| CoreError::Derivation(format!("seed derivation failed: {e}")))?;

    let seed = Seed(output);
    output.zeroize();
    Ok(seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::mnemonic::entropy_to_mnemonic;

    #[test]
    fn test_trezor_vector_zero_entropy() {
        let m = entropy_to_mnemonic(&[0u8; 16]).unwrap();
        let seed = mnemonic_to_seed(&m, "TREZOR").unwrap();
        assert_eq!(
            seed.to_hex(),
            "c55257c360c07c72029aebc1b53c05ed0362ada38ead3e3e9efa3708e5349553\
             1f09a6987599d18264c1e1c92f2cf141630c7a3c4ab7c81b2f001698e7463b04"
        );
    }

    #[test]
    fn passphrase_changes_seed() {
        let m = entropy_to_mnemonic(&[1u8; 16]).unwrap();
        let a = mnemonic_to_seed(&m, "").unwrap();
        let b = mnemonic_to_seed(&m, "extra").unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn derivation_is_pure() {
        let m = entropy_to_mnemonic(&[9u8; 32]).unwrap();
        let a = mnemonic_to_seed(&m, "x").unwrap();
        let b = mnemonic_to_seed(&m, "x").unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn passphrase_is_nfkd_normalised() {
        // U+00E9 (precomposed) vs "e" + U+0301 (combining acute).
        let m = entropy_to_mnemonic(&[2u8; 16]).unwrap();
        let composed = mnemonic_to_seed(&m, "caf\u{e9}").unwrap();
        let decomposed = mnemonic_to_seed(&m, "cafe\u{301}").unwrap();
        assert_eq!(composed.as_bytes(), decomposed.as_bytes());
    }
}
