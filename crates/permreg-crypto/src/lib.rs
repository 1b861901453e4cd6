//! # permreg-crypto — Cryptographic Primitives
//!
//! The building blocks behind signed delegations:
//!
//! - **Keccak-256** digests, including the ledger's personal-sign digest.
//! - **secp256k1** recoverable signatures: parsing, rejection of malformed
//!   or malleable signatures, and public-key recovery to an account id.
//! - **`SignerRecovery`**, the capability trait the registry depends on.
//!
//! ## Crate Policy
//!
//! - Depends only on `permreg-core` internally.
//! - No mocking of cryptographic operations in tests; all tests sign and
//!   recover with real keys.
//! - Secret keys are never serialized or printed.

pub mod keccak;
pub mod recovery;
pub mod secp256k1;

pub use keccak::{keccak256, personal_sign_digest};
pub use recovery::{Secp256k1Recovery, SignerRecovery};
pub use secp256k1::{
    account_of, recover_signer, KeyError, RecoverableSignature, Secp256k1KeyPair, SIGNATURE_LEN,
};
