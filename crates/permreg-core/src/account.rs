//! # Account Identifiers
//!
//! Every actor in the registry (root authority, primaries, permissioning,
//! rotation and operator keys) is a 20-byte account identifier in the
//! ledger's address format.
//!
//! ## The null identifier
//!
//! The all-zero identifier means "no account" when it appears as an
//! argument, and mutating operations reject it. It is still a legal
//! *key* for scope grants. Lookups that can come back empty return
//! `Option<AccountId>` instead of handing out the zero value, so the two
//! meanings never merge at the API boundary.
//!
//! ## Wire form
//!
//! `0x`-prefixed lowercase hex (40 digits). Parsing also accepts upper
//! or mixed case and a missing prefix.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PermregError;

/// Length of an account identifier in bytes.
pub const ACCOUNT_ID_LEN: usize = 20;

/// A 20-byte account identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AccountId([u8; ACCOUNT_ID_LEN]);

impl AccountId {
    /// The null identifier.
    pub const ZERO: Self = Self([0u8; ACCOUNT_ID_LEN]);

    /// Create an identifier from raw bytes.
    pub const fn from_bytes(bytes: [u8; ACCOUNT_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Create an identifier from the trailing 20 bytes of a 32-byte word.
    ///
    /// This is how an address is derived from a Keccak-256 digest of a
    /// public key.
    pub fn from_word_tail(word: &[u8; 32]) -> Self {
        let mut bytes = [0u8; ACCOUNT_ID_LEN];
        bytes.copy_from_slice(&word[32 - ACCOUNT_ID_LEN..]);
        Self(bytes)
    }

    /// Return the raw bytes.
    pub fn as_bytes(&self) -> &[u8; ACCOUNT_ID_LEN] {
        &self.0
    }

    /// Whether this is the null identifier.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ACCOUNT_ID_LEN]
    }

    /// `None` for the null identifier, `Some(self)` otherwise.
    pub fn non_zero(self) -> Option<Self> {
        if self.is_zero() {
            None
        } else {
            Some(self)
        }
    }

    /// Render as `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse from hex, with or without the `0x` prefix.
    pub fn from_hex(input: &str) -> Result<Self, PermregError> {
        let trimmed = input.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if digits.len() != ACCOUNT_ID_LEN * 2 {
            return Err(PermregError::InvalidAccount {
                input: input.to_string(),
                reason: format!(
                    "expected {} hex digits, got {}",
                    ACCOUNT_ID_LEN * 2,
                    digits.len()
                ),
            });
        }
        let mut bytes = [0u8; ACCOUNT_ID_LEN];
        hex::decode_to_slice(digits, &mut bytes).map_err(|e| PermregError::InvalidAccount {
            input: input.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self(bytes))
    }
}

impl FromStr for AccountId {
    type Err = PermregError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; ACCOUNT_ID_LEN]> for AccountId {
    fn from(bytes: [u8; ACCOUNT_ID_LEN]) -> Self {
        Self(bytes)
    }
}

impl Serialize for AccountId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccountId({})", self.to_hex())
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// The authenticated identity a mutating call runs as.
///
/// Ledgers attach the sender to every transaction implicitly. Off-ledger
/// there is no such context, so every mutating registry operation takes a
/// `Caller` explicitly. Constructing one asserts that the surrounding
/// transport has authenticated the account (a verified transaction, a
/// recovered signature, an operator console login). Nothing here checks
/// that assertion; a `Caller` is only as trustworthy as the code that
/// built it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Caller(AccountId);

impl Caller {
    /// Tag `account` as the authenticated caller.
    pub fn authenticated(account: AccountId) -> Self {
        Self(account)
    }

    /// The account this call is authenticated as.
    pub fn account(&self) -> AccountId {
        self.0
    }

    /// Whether the caller is exactly `account`.
    ///
    /// The null identifier never matches, so an unset key slot cannot be
    /// claimed by a zero caller.
    pub fn is(&self, account: &AccountId) -> bool {
        !account.is_zero() && self.0 == *account
    }
}

impl std::fmt::Display for Caller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "caller:{}", self.0)
    }
}
