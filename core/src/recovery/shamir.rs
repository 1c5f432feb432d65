//! # Shamir's Secret Sharing over GF(256)
//!
//! Each secret byte is the constant term of its own random polynomial of
//! degree `threshold - 1`; share `i` holds the evaluations at `x = i`.
//! Any `threshold` shares rebuild every polynomial at `x = 0` by Lagrange
//! interpolation. Fewer give no information about the secret.
//!
//! The field is GF(2^8) with the AES polynomial `x^8 + x^4 + x^3 + x + 1`
//! and generator 3. Share indices run from 1; `x = 0` is the secret.

use rand_core::CryptoRngCore;
use zeroize::Zeroizing;

use crate::error::{CoreError, Result};

/// Largest share count: indices are the non-zero field elements.
pub const MAX_SHARES: usize = 255;

/// A split-and-combine scheme for byte secrets.
///
/// Shares are `(index, payload)` pairs. Implementations decide what the
/// payload means; callers only move it around.
pub trait SecretSharing: Send + Sync {
    /// Split `secret` into `total` shares, any `threshold` of which recover it.
    fn split(
        &self,
        secret: &[u8],
        threshold: u8,
        total: u8,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<Vec<(u8, Vec<u8>)>>;

    /// Rebuild the secret from shares produced by [`split`](Self::split).
    ///
    /// The caller is responsible for supplying at least `threshold` shares;
    /// fewer produce a wrong secret, not an error.
    fn combine(&self, shares: &[(u8, Vec<u8>)]) -> Result<Zeroizing<Vec<u8>>>;
}

/// Shamir's scheme, byte-wise over GF(256).
#[derive(Debug, Clone, Copy, Default)]
pub struct ShamirScheme;

impl SecretSharing for ShamirScheme {
    fn split(
        &self,
        secret: &[u8],
        threshold: u8,
        total: u8,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<Vec<(u8, Vec<u8>)>> {
        check_parameters(threshold, total)?;
        if secret.is_empty() {
            return Err(CoreError::Validation("secret must not be empty".into()));
        }

        let mut shares: Vec<(u8, Vec<u8>)> = (1..=total)
            .map(|x| (x, Vec::with_capacity(secret.len())))
            .collect();

        let mut coefficients = Zeroizing::new(vec![0u8; threshold as usize]);
        for &byte in secret {
            coefficients[0] = byte;
            rng.fill_bytes(&mut coefficients[1..]);
            for (x, data) in shares.iter_mut() {
                data.push(gf256::eval_polynomial(&coefficients, *x));
            }
        }

        Ok(shares)
    }

    fn combine(&self, shares: &[(u8, Vec<u8>)]) -> Result<Zeroizing<Vec<u8>>> {
        let Some((_, first)) = shares.first() else {
            return Err(CoreError::Validation("no shares supplied".into()));
        };
        let length = first.len();

        let mut seen = [false; 256];
        for (x, data) in shares {
            if *x == 0 {
                return Err(CoreError::Validation("share index 0 is reserved".into()));
            }
            if seen[*x as usize] {
                return Err(CoreError::Validation(format!("duplicate share index {x}")));
            }
            seen[*x as usize] = true;
            if data.len() != length {
                return Err(CoreError::Validation(format!(
                    "share {x} has {} bytes, expected {length}",
                    data.len()
                )));
            }
        }

        let xs: Vec<u8> = shares.iter().map(|(x, _)| *x).collect();
        let weights = gf256::lagrange_weights_at_zero(&xs)
            .ok_or_else(|| CoreError::Validation("share indices are not distinct".into()))?;

        let secret = (0..length)
            .map(|i| {
                shares
                    .iter()
                    .zip(&weights)
                    .fold(0u8, |acc, ((_, data), &w)| acc ^ gf256::mul(data[i], w))
            })
            .collect();
        Ok(Zeroizing::new(secret))
    }
}

/// `2 <= threshold <= total <= 255`.
pub fn check_parameters(threshold: u8, total: u8) -> Result<()> {
    if threshold < 2 {
        return Err(CoreError::Validation(format!(
            "threshold must be at least 2, got {threshold}"
        )));
    }
    if total < threshold {
        return Err(CoreError::Validation(format!(
            "threshold {threshold} exceeds share count {total}"
        )));
    }
    Ok(())
}

mod gf256 {
    const MODULUS: u16 = 0x11B;

    /// `EXP[i] = 3^i`, doubled so a sum of two logs needs no reduction.
    const fn build_exp_table() -> [u8; 512] {
        let mut table = [0u8; 512];
        let mut val: u16 = 1;
        let mut i = 0;
        while i < 255 {
            table[i] = val as u8;
            table[i + 255] = val as u8;
            val ^= val << 1;
            if val >= 256 {
                val ^= MODULUS;
            }
            i += 1;
        }
        table
    }

    const fn build_log_table() -> [u8; 256] {
        let exp = build_exp_table();
        let mut table = [0u8; 256];
        let mut i = 0;
        while i < 255 {
            table[exp[i] as usize] = i as u8;
            i += 1;
        }
        table
    }

    static EXP: [u8; 512] = build_exp_table();
    static LOG: [u8; 256] = build_log_table();

    #[inline]
    pub fn mul(a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            return 0;
        }
        EXP[LOG[a as usize] as usize + LOG[b as usize] as usize]
    }

    /// `None` for division by zero.
    #[inline]
    pub fn div(a: u8, b: u8) -> Option<u8> {
        if b == 0 {
            return None;
        }
        if a == 0 {
            return Some(0);
        }
        Some(EXP[255 + LOG[a as usize] as usize - LOG[b as usize] as usize])
    }

    /// Horner evaluation; `coefficients[0]` is the constant term.
    pub fn eval_polynomial(coefficients: &[u8], x: u8) -> u8 {
        coefficients
            .iter()
            .rev()
            .fold(0u8, |acc, &c| mul(acc, x) ^ c)
    }

    /// Lagrange basis values `L_i(0)` for the points `xs`.
    ///
    /// In characteristic 2, `0 - x_j = x_j` and `x_i - x_j = x_i ^ x_j`.
    /// Returns `None` if two points coincide.
    pub fn lagrange_weights_at_zero(xs: &[u8]) -> Option<Vec<u8>> {
        xs.iter()
            .enumerate()
            .map(|(i, &xi)| {
                let (num, den) = xs
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != i)
                    .fold((1u8, 1u8), |(num, den), (_, &xj)| {
                        (mul(num, xj), mul(den, xi ^ xj))
                    });
                div(num, den)
            })
            .collect()
    }

}
