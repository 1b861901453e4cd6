//! # Snapshot Seals
//!
//! A seal is the SHA-256 digest of a snapshot's canonical bytes, tagged
//! with its algorithm so the document states how to recheck it. Taking
//! `&CanonicalBytes` keeps arbitrary JSON out of the seal.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;

/// Algorithm tag carried by a seal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DigestAlgorithm {
    Sha256,
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha256 => f.write_str("sha256"),
        }
    }
}

/// A tagged 32-byte digest, serialized as `{ "algorithm", "bytes" }` with
/// hex bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest {
    pub algorithm: DigestAlgorithm,
    #[serde(with = "hex::serde")]
    pub bytes: [u8; 32],
}

impl ContentDigest {
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.to_hex())
    }
}

/// Seal canonical bytes with SHA-256.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    ContentDigest {
        algorithm: DigestAlgorithm::Sha256,
        bytes: Sha256::digest(data.as_bytes()).into(),
    }
}
