//! # permreg-core — Foundational Types for the Permissions Registry
//!
//! Leaf crate of the workspace. Defines the identifiers, canonical byte
//! encodings, digests and timestamps that the registry and its crypto
//! layer share. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Fixed-size account identifiers.** `AccountId` is a 20-byte newtype
//!    with a single hex wire form. The null identifier is a named constant
//!    and lookups return `Option<AccountId>` instead of it.
//!
//! 2. **Explicit callers.** Mutating operations take a `Caller`, the
//!    authenticated account the call runs as.
//!
//! 3. **`CanonicalBytes` newtype.** Digests and signer recovery accept only
//!    `&CanonicalBytes`, so every signed or sealed byte string went through
//!    one of the two canonical encoders.
//!
//! 4. **UTC-only timestamps.** `Timestamp` is UTC with a `Z` suffix and
//!    seconds precision.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `permreg-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod account;
pub mod canonical;
pub mod digest;
pub mod error;
pub mod scope;
pub mod temporal;

pub use account::{AccountId, Caller, ACCOUNT_ID_LEN};
pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, ContentDigest, DigestAlgorithm};
pub use error::{CanonicalizationError, PermregError, SignatureError};
pub use scope::{ScopeSet, ROLE, TRANSACTIONS_WRITE};
pub use temporal::Timestamp;
