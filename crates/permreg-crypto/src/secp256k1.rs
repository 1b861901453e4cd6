//! # secp256k1 Recoverable Signatures
//!
//! Signed delegations carry a 65-byte signature `r || s || v` over the
//! personal-sign digest of a canonical payload. Recovering the public key
//! from the signature and hashing it yields the signer's account id, with
//! no public key shipped alongside the signature.
//!
//! ## Rejection rules
//!
//! Checked in this order, each with its own error:
//!
//! 1. length other than 65 bytes;
//! 2. `s` above half the curve order (the malleable twin of a valid
//!    signature);
//! 3. `v` not one of 27, 28 (ledger form) or 0, 1 (raw form);
//! 4. `(r, s)` out of range or not recovering to a curve point.
//!
//! ## Key material
//!
//! `Secp256k1KeyPair` wraps an existing secret. Key generation belongs to
//! the key-management service; the pair exists so relays and tests can
//! produce delegations. It does not implement `Serialize` and its `Debug`
//! output hides the secret.

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use permreg_core::{AccountId, CanonicalBytes, SignatureError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::keccak::{keccak256, personal_sign_digest};

/// Length of a recoverable signature in bytes.
pub const SIGNATURE_LEN: usize = 65;

/// Half the secp256k1 group order, big-endian. Signatures with a larger
/// `s` are rejected.
const HALF_ORDER: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b,
    0x20, 0xa0,
];

/// Errors handling secret key material.
#[derive(Error, Debug)]
pub enum KeyError {
    /// The secret is not a valid scalar (zero or not below the group order).
    #[error("invalid secp256k1 secret key")]
    InvalidSecret,

    /// The hex encoding of a secret could not be decoded.
    #[error("invalid secret key encoding: {0}")]
    Encoding(String),

    /// Signing failed.
    #[error("signing failed: {0}")]
    Signing(String),
}

/// A 65-byte `r || s || v` signature.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RecoverableSignature([u8; SIGNATURE_LEN]);

impl RecoverableSignature {
    /// Wrap raw bytes, rejecting any length other than 65.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SignatureError> {
        if bytes.len() != SIGNATURE_LEN {
            return Err(SignatureError::InvalidLength { got: bytes.len() });
        }
        let mut arr = [0u8; SIGNATURE_LEN];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// Parse `0x`-prefixed or bare hex.
    pub fn from_hex(input: &str) -> Result<Self, SignatureError> {
        let trimmed = input.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(digits).map_err(|e| SignatureError::Encoding(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Render as `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// The raw 65 bytes.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }

    /// The recovery byte.
    pub fn v(&self) -> u8 {
        self.0[64]
    }
}

impl Serialize for RecoverableSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for RecoverableSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for RecoverableSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RecoverableSignature({}...)", hex::encode(&self.0[..4]))
    }
}

impl std::fmt::Display for RecoverableSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A secp256k1 key pair wrapping an existing secret.
pub struct Secp256k1KeyPair {
    signing_key: SigningKey,
}

impl Secp256k1KeyPair {
    /// Build from a 32-byte secret scalar.
    pub fn from_secret_bytes(secret: &[u8; 32]) -> Result<Self, KeyError> {
        let signing_key = SigningKey::from_slice(secret).map_err(|_| KeyError::InvalidSecret)?;
        Ok(Self { signing_key })
    }

    /// Build from a hex-encoded secret, with or without `0x`.
    pub fn from_hex(input: &str) -> Result<Self, KeyError> {
        let trimmed = input.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let mut secret = [0u8; 32];
        hex::decode_to_slice(digits, &mut secret).map_err(|e| KeyError::Encoding(e.to_string()))?;
        Self::from_secret_bytes(&secret)
    }

    /// The account id this key signs as.
    pub fn account(&self) -> AccountId {
        account_of(self.signing_key.verifying_key())
    }

    /// Sign a delegation payload, producing a ledger-form signature
    /// (`v` = 27 or 28, low `s`).
    pub fn sign(&self, payload: &CanonicalBytes) -> Result<RecoverableSignature, KeyError> {
        let digest = personal_sign_digest(payload);
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(&digest)
            .map_err(|e| KeyError::Signing(e.to_string()))?;
        let mut out = [0u8; SIGNATURE_LEN];
        out[..64].copy_from_slice(&signature.to_bytes());
        out[64] = 27 + recovery_id.to_byte();
        Ok(RecoverableSignature(out))
    }
}

impl std::fmt::Debug for Secp256k1KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Secp256k1KeyPair({})", self.account())
    }
}

/// Account id of a public key: the last 20 bytes of the Keccak-256 of the
/// uncompressed point without its `0x04` tag.
pub fn account_of(key: &VerifyingKey) -> AccountId {
    let point = key.to_encoded_point(false);
    AccountId::from_word_tail(&keccak256(&point.as_bytes()[1..]))
}

/// Recover the account that signed `payload`.
///
/// # Errors
///
/// See the module docs for the rejection rules.
pub fn recover_signer(
    payload: &CanonicalBytes,
    signature: &[u8],
) -> Result<AccountId, SignatureError> {
    let signature = RecoverableSignature::from_slice(signature)?;
    let bytes = signature.as_bytes();

    if bytes[32..64] > HALF_ORDER[..] {
        return Err(SignatureError::HighS);
    }

    let recovery_id = match signature.v() {
        27 | 28 => RecoveryId::from_byte(signature.v() - 27),
        0 | 1 => RecoveryId::from_byte(signature.v()),
        _ => None,
    }
    .ok_or(SignatureError::InvalidRecoveryId(signature.v()))?;

    let sig = Signature::from_slice(&bytes[..64]).map_err(|_| SignatureError::Unrecoverable)?;
    let digest = personal_sign_digest(payload);
    let key = VerifyingKey::recover_from_prehash(&digest, &sig, recovery_id)
        .map_err(|_| SignatureError::Unrecoverable)?;
    Ok(account_of(&key))
}
