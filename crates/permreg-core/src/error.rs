//! # Error Types — Foundational Failures
//!
//! Errors raised by the leaf crate. All errors use `thiserror` for
//! derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Parse errors carry the offending input so operators can see what was
//!   rejected.
//! - Signature errors keep the exact text that relays and downstream
//!   subsystems already match on.

use thiserror::Error;

/// Top-level error type for foundational operations.
#[derive(Error, Debug)]
pub enum PermregError {
    /// An account identifier could not be parsed.
    #[error("invalid account identifier {input:?}: {reason}")]
    InvalidAccount {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A timestamp could not be parsed.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error recovering a signer from a detached signature.
///
/// The messages match the ECDSA helper used by the on-ledger registry, so
/// a relay sees the same text whether the check ran on-ledger or here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// The signature is not exactly 65 bytes.
    #[error("ECDSA: invalid signature length")]
    InvalidLength {
        /// Length that was supplied.
        got: usize,
    },

    /// `s` lies in the upper half of the curve order (malleable form).
    #[error("ECDSA: invalid signature 's' value")]
    HighS,

    /// The recovery byte is not one of 0, 1, 27 or 28.
    #[error("ECDSA: invalid signature 'v' value")]
    InvalidRecoveryId(u8),

    /// `(r, s)` is out of range or does not recover to a curve point.
    #[error("ECDSA: invalid signature")]
    Unrecoverable,

    /// A hex-encoded signature could not be decoded.
    #[error("invalid signature encoding: {0}")]
    Encoding(String),
}

impl SignatureError {
    /// Whether the failure is a length failure, as opposed to a correctly
    /// sized but malformed signature.
    pub fn is_length_error(&self) -> bool {
        matches!(self, Self::InvalidLength { .. })
    }
}
