//! Error types for the wallet core.
//!
//! Every fallible operation returns a [`CoreError`]. The variants mirror the
//! failure taxonomy callers are expected to branch on: validation and
//! not-found errors are recoverable, integrity errors halt the flow.

use thiserror::Error;

/// Errors produced by the wallet core.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed caller input: mnemonic, derivation path, chain symbol,
    /// DID string, share set, threshold.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Key derivation produced no usable key. Degenerate child indices are
    /// retried internally; this only surfaces when the retry range is
    /// exhausted or the seed itself is unusable.
    #[error("key derivation failed: {0}")]
    Derivation(String),

    /// Wrong password, failed AEAD tag or malformed vault blob. Deliberately
    /// carries no detail.
    #[error("authentication failed")]
    Authentication,

    /// A stored record contradicts itself (e.g. DID does not match the
    /// stored public key). Never auto-repaired.
    #[error("integrity check failed: {0}")]
    Integrity(String),

    /// Nothing stored in the requested slot.
    #[error("not found: {0}")]
    NotFound(String),

    /// The chain symbol is not in the registry.
    #[error("unsupported chain: {0}")]
    UnsupportedChain(String),

    /// Fewer shares supplied than the threshold they were split with.
    #[error("insufficient shares: need {threshold}, got {provided}")]
    InsufficientShares {
        /// Threshold recorded in the shares.
        threshold: u8,
        /// Number of shares supplied.
        provided: usize,
    },

    /// The storage backend failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// A record could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CoreError>;

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}

impl From<sled::Error> for CoreError {
    fn from(err: sled::Error) -> Self {
        CoreError::Storage(err.to_string())
    }
}
