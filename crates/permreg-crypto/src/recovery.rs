//! # Signer Recovery Capability
//!
//! Authorization logic needs exactly one thing from cryptography: given a
//! canonical payload and a detached signature, which account signed it.
//! That is the whole of [`SignerRecovery`]. Swapping the curve or the
//! digest scheme means supplying another implementation; the registry's
//! checks never change.

use permreg_core::{AccountId, CanonicalBytes, SignatureError};

use crate::secp256k1::recover_signer;

/// Recover the signer of a detached signature.
pub trait SignerRecovery: Send + Sync {
    /// Return the account whose key produced `signature` over `payload`.
    ///
    /// # Errors
    ///
    /// `SignatureError::InvalidLength` for a signature of the wrong size,
    /// any other `SignatureError` for a correctly sized but malformed one.
    fn recover(
        &self,
        payload: &CanonicalBytes,
        signature: &[u8],
    ) -> Result<AccountId, SignatureError>;
}

/// secp256k1 recovery over the ledger's personal-sign digest.
#[derive(Debug, Clone, Copy, Default)]
pub struct Secp256k1Recovery;

impl SignerRecovery for Secp256k1Recovery {
    fn recover(
        &self,
        payload: &CanonicalBytes,
        signature: &[u8],
    ) -> Result<AccountId, SignatureError> {
        recover_signer(payload, signature)
    }
}

impl<T: SignerRecovery + ?Sized> SignerRecovery for &T {
    fn recover(
        &self,
        payload: &CanonicalBytes,
        signature: &[u8],
    ) -> Result<AccountId, SignatureError> {
        (**self).recover(payload, signature)
    }
}

impl<T: SignerRecovery + ?Sized> SignerRecovery for Box<T> {
    fn recover(
        &self,
        payload: &CanonicalBytes,
        signature: &[u8],
    ) -> Result<AccountId, SignatureError> {
        (**self).recover(payload, signature)
    }
}
