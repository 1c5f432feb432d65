//! # Social Recovery
//!
//! Guardian-based backup of wallet secrets:
//!
//! - **shamir**: the `(t, n)` threshold scheme over GF(256), behind the
//!   [`SecretSharing`] trait.
//! - **coordinator**: guardians, share sets and their sealed hand-off.

pub mod coordinator;
pub mod shamir;

pub use coordinator::{
    open_share, recover_from_shares, recover_mnemonic, Guardian, RecoveryShare,
    SocialRecoveryCoordinator,
};
pub use shamir::{SecretSharing, ShamirScheme};
