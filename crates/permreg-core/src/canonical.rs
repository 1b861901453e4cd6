//! # Canonical Bytes — The Only Input to Digests and Signatures
//!
//! `CanonicalBytes` is the sole type accepted by digest computation and by
//! signer recovery. Its inner buffer is private; there are exactly two ways
//! to build one:
//!
//! - [`CanonicalBytes::new()`] — RFC 8785 (JCS) JSON of any serializable
//!   value, with floats rejected. Used for sealing registry snapshots.
//! - [`CanonicalBytes::for_account()`] — the 32-byte ABI word encoding of
//!   an account identifier (12 zero bytes, then the 20 address bytes). This
//!   is the payload an operator signs to delegate an action to a relay.
//!
//! Because the delegation payload embeds the signer's own address, a
//! signature produced by one key over another key's payload recovers to an
//! unrelated account rather than to the account named in the payload.

use serde::Serialize;
use serde_json::Value;

use crate::account::{AccountId, ACCOUNT_ID_LEN};
use crate::error::CanonicalizationError;

/// Length of one ABI-encoded word.
pub const ABI_WORD_LEN: usize = 32;

/// Bytes produced by one of the canonical encodings.
///
/// # Invariants
///
/// - JSON form: sorted keys, compact separators, no floats.
/// - Account form: exactly 32 bytes, leading 12 bytes zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical JSON bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::FloatRejected` if the value contains
    /// a float, `CanonicalizationError::SerializationFailed` if
    /// serialization fails.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        let coerced = coerce_json_value(value)?;
        let bytes = serialize_canonical(&coerced)?;
        Ok(Self(bytes))
    }

    /// The signed-delegation payload naming `account` as the signer.
    pub fn for_account(account: &AccountId) -> Self {
        let mut word = vec![0u8; ABI_WORD_LEN];
        word[ABI_WORD_LEN - ACCOUNT_ID_LEN..].copy_from_slice(account.as_bytes());
        Self(word)
    }

    /// Interpret received bytes as a delegation payload.
    ///
    /// Returns `None` unless `bytes` is a well-formed account word (32 bytes
    /// with a zero 12-byte prefix).
    pub fn parse_account_payload(bytes: &[u8]) -> Option<(Self, AccountId)> {
        if bytes.len() != ABI_WORD_LEN {
            return None;
        }
        let (prefix, tail) = bytes.split_at(ABI_WORD_LEN - ACCOUNT_ID_LEN);
        if prefix.iter().any(|b| *b != 0) {
            return None;
        }
        let mut id = [0u8; ACCOUNT_ID_LEN];
        id.copy_from_slice(tail);
        Some((Self(bytes.to_vec()), AccountId::from_bytes(id)))
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Recursively reject floats; everything else passes through.
fn coerce_json_value(value: Value) -> Result<Value, CanonicalizationError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(value),
        Value::Number(ref n) => {
            if n.is_f64() && !n.is_i64() && !n.is_u64() {
                if let Some(f) = n.as_f64() {
                    return Err(CanonicalizationError::FloatRejected(f));
                }
            }
            Ok(value)
        }
        Value::Object(map) => {
            let mut coerced = serde_json::Map::new();
            for (k, v) in map {
                coerced.insert(k, coerce_json_value(v)?);
            }
            Ok(Value::Object(coerced))
        }
        Value::Array(arr) => {
            let coerced: Result<Vec<_>, _> = arr.into_iter().map(coerce_json_value).collect();
            Ok(Value::Array(coerced?))
        }
    }
}

/// Serialize a JSON value in JCS-canonical form (RFC 8785).
fn serialize_canonical(value: &Value) -> Result<Vec<u8>, CanonicalizationError> {
    let s = serde_jcs::to_string(value)?;
    Ok(s.into_bytes())
}
