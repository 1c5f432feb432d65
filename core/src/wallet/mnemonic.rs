//! # Recovery Phrases (BIP-39)
//!
//! Generation and validation of 12- and 24-word recovery phrases over the
//! standard 2048-word English list.
//!
//! ```text
//! entropy (128 | 256 bits)
//!   ‖ checksum (first ENT/32 bits of SHA-256(entropy))
//!   → split into 11-bit groups
//!   → one word per group
//! ```
//!
//! The wordlist comes from the `bip39` crate. The bit packing is done here so
//! the entropy never leaves our zeroizing buffers.

use std::fmt;
use std::str::FromStr;

use bip39::Language;
use rand_core::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::BITS_PER_WORD;
use crate::crypto::sha256;
use crate::error::{CoreError, Result};

/// The only phrase lengths the wallet accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordCount {
    /// 128 bits of entropy, 4 checksum bits.
    Twelve,
    /// 256 bits of entropy, 8 checksum bits.
    TwentyFour,
}

impl WordCount {
    /// Number of words in the phrase.
    pub fn words(self) -> usize {
        match self {
            WordCount::Twelve => 12,
            WordCount::TwentyFour => 24,
        }
    }

    /// Entropy length in bytes.
    pub fn entropy_bytes(self) -> usize {
        match self {
            WordCount::Twelve => 16,
            WordCount::TwentyFour => 32,
        }
    }
}

impl TryFrom<usize> for WordCount {
    type Error = CoreError;

    fn try_from(count: usize) -> Result<Self> {
        match count {
            12 => Ok(WordCount::Twelve),
            24 => Ok(WordCount::TwentyFour),
            other => Err(CoreError::Validation(format!(
                "mnemonic must have 12 or 24 words, got {other}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Mnemonic
// ---------------------------------------------------------------------------

/// A checksum-valid recovery phrase: lowercase words, single spaces.
///
/// Zeroized on drop. `Debug` prints the word count only.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Mnemonic(String);

impl Mnemonic {
    /// Parse and fully validate a phrase.
    ///
    /// Whitespace is collapsed and words are lowercased before lookup, so
    /// `"  Abandon  ABANDON ..."` parses to the canonical form.
    pub fn parse(phrase: &str) -> Result<Self> {
        let words: Vec<String> = phrase
            .split_whitespace()
            .map(|w| w.to_lowercase())
            .collect();
        let count = WordCount::try_from(words.len())?;

        let mut indices = Vec::with_capacity(words.len());
        for word in &words {
            let idx = Language::English
                .find_word(word)
                .ok_or_else(|| CoreError::Validation(format!("'{word}' is not in the wordlist")))?;
            indices.push(idx);
        }

        let mut entropy = unpack_entropy(&indices, count)?;
        entropy.zeroize();

        Ok(Mnemonic(words.join(" ")))
    }

    /// The canonical phrase.
    pub fn phrase(&self) -> &str {
        &self.0
    }

    /// The individual words.
    pub fn words(&self) -> Vec<&str> {
        self.0.split(' ').collect()
    }

    pub fn word_count(&self) -> usize {
        self.0.split(' ').count()
    }
}

impl FromStr for Mnemonic {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mnemonic({} words)", self.word_count())
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Draw fresh entropy from `rng` and encode it as a phrase.
pub fn generate_mnemonic<R: RngCore + CryptoRng>(count: WordCount, rng: &mut R) -> Mnemonic {
    let mut entropy = [0u8; 32];
    let entropy = &mut entropy[..count.entropy_bytes()];
    rng.fill_bytes(entropy);

    let words = encode_words(entropy);
    entropy.zeroize();
    Mnemonic(words)
}

/// Encode raw entropy (16 or 32 bytes) as a phrase.
///
/// Deterministic. Exposed for the BIP-39 reference vectors.
pub fn entropy_to_mnemonic(entropy: &[u8]) -> Result<Mnemonic> {
    match entropy.len() {
        16 | 32 => Ok(Mnemonic(encode_words(entropy))),
        other => Err(CoreError::Validation(format!(
            "entropy must be 16 or 32 bytes, got {other}"
        ))),
    }
}

/// `true` iff `phrase` is 12 or 24 wordlist words with a matching checksum.
/// Never errors.
pub fn validate_mnemonic(phrase: &str) -> bool {
    Mnemonic::parse(phrase).is_ok()
}

fn encode_words(entropy: &[u8]) -> String {
    let wordlist = Language::English.word_list();
    let entropy_bits = entropy.len() * 8;
    let checksum_bits = entropy_bits / 32;
    let word_count = (entropy_bits + checksum_bits) / BITS_PER_WORD;

    // Checksum is at most 8 bits for 256-bit entropy, so one byte suffices.
    let checksum = sha256(entropy)[0];
    let bit_at = |i: usize| -> u16 {
        if i < entropy_bits {
            ((entropy[i / 8] >> (7 - i % 8)) & 1) as u16
        } else {
            ((checksum >> (7 - (i - entropy_bits))) & 1) as u16
        }
    };

    let mut words = Vec::with_capacity(word_count);
    for w in 0..word_count {
        let mut idx = 0u16;
        for b in 0..BITS_PER_WORD {
            idx = (idx << 1) | bit_at(w * BITS_PER_WORD + b);
        }
        words.push(wordlist[idx as usize]);
    }
    words.join(" ")
}

/// Rebuild the entropy from word indices and check the checksum bits.
fn unpack_entropy(indices: &[u16], count: WordCount) -> Result<Vec<u8>> {
    let entropy_len = count.entropy_bytes();
    let entropy_bits = entropy_len * 8;
    let checksum_bits = entropy_bits / 32;

    let bit_at = |i: usize| -> u8 {
        let idx = indices[i / BITS_PER_WORD];
        ((idx >> (BITS_PER_WORD - 1 - i % BITS_PER_WORD)) & 1) as u8
    };

    let mut entropy = vec![0u8; entropy_len];
    for i in 0..entropy_bits {
        entropy[i / 8] |= bit_at(i) << (7 - i % 8);
    }

    let mut provided = 0u8;
    for i in 0..checksum_bits {
        provided = (provided << 1) | bit_at(entropy_bits + i);
    }
    let expected = sha256(&entropy)[0] >> (8 - checksum_bits);

    if provided != expected {
        entropy.zeroize();
        return Err(CoreError::Validation("mnemonic checksum mismatch".into()));
    }
    Ok(entropy)
}
