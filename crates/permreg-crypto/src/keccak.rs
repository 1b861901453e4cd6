//! # Keccak-256 Digests
//!
//! Ledger-compatible hashing. Keccak-256 here is the pre-standard variant
//! (original padding), not NIST SHA3-256.
//!
//! [`keccak256()`] hashes raw protocol material: the personal-sign
//! envelope and public-key points. Payloads enter only through
//! [`personal_sign_digest()`], which takes `&CanonicalBytes`.

use permreg_core::CanonicalBytes;
use sha3::{Digest, Keccak256};

/// Prefix the ledger prepends before hashing a 32-byte signed message.
pub const PERSONAL_SIGN_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// Keccak-256 of raw bytes.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let hash = Keccak256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&hash);
    out
}

/// The digest a signer actually signs for a delegation payload:
/// `keccak256(PERSONAL_SIGN_PREFIX || keccak256(payload))`.
pub fn personal_sign_digest(payload: &CanonicalBytes) -> [u8; 32] {
    let inner = keccak256(payload.as_bytes());
    let mut buf = Vec::with_capacity(PERSONAL_SIGN_PREFIX.len() + inner.len());
    buf.extend_from_slice(PERSONAL_SIGN_PREFIX);
    buf.extend_from_slice(&inner);
    keccak256(&buf)
}
