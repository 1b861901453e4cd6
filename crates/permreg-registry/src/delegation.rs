//! # Signed Delegations
//!
//! An operator can authorize an action without submitting a ledger
//! transaction: it signs a canonical payload off-line, a relay submits
//! `(payload, signature)`, and the verifier recovers the signer and runs it
//! through the ordinary operator checks.
//!
//! The payload embeds the address the signer intends to act as. Because the
//! signature is bound to those exact bytes, a signature made over some other
//! account's payload recovers to the real signer, never to the embedded
//! account, and the checks then judge the real signer.
//!
//! ## Design
//!
//! [`SignedDelegation`] has no `Clone` and is consumed by
//! [`SignedDelegationVerifier::verify_and_resolve`], so one value is
//! verified once. Replay protection across values is the caller's concern.

use permreg_core::{AccountId, CanonicalBytes};
use permreg_crypto::{RecoverableSignature, Secp256k1Recovery, SignerRecovery};

use crate::checker::{OperatorAuthorization, Requirement};
use crate::error::RegistryError;

/// A payload with its detached signature, as submitted by a relay.
#[derive(Debug)]
pub struct SignedDelegation {
    payload: CanonicalBytes,
    signature: Vec<u8>,
}

impl SignedDelegation {
    /// Pair a canonical payload with raw signature bytes.
    ///
    /// The signature is not inspected here; a wrong length is reported by
    /// the verifier.
    pub fn new(payload: CanonicalBytes, signature: impl Into<Vec<u8>>) -> Self {
        Self { payload, signature: signature.into() }
    }

    /// A delegation over the canonical payload for `account`.
    pub fn for_account(account: &AccountId, signature: &RecoverableSignature) -> Self {
        Self::new(CanonicalBytes::for_account(account), signature.as_bytes().to_vec())
    }

    /// The signed payload.
    pub fn payload(&self) -> &CanonicalBytes {
        &self.payload
    }

    /// The raw signature bytes.
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// The account the payload names, if it is a single-address payload.
    pub fn claimed_account(&self) -> Option<AccountId> {
        CanonicalBytes::parse_account_payload(self.payload.as_bytes()).map(|(_, account)| account)
    }
}

/// The outcome of a successful verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDelegation {
    /// The account recovered from the signature.
    pub signer: AccountId,
    /// The primary the signer operates for.
    pub primary: AccountId,
}

/// Recovers the signer of a delegation and checks it as an operator.
#[derive(Debug, Clone, Default)]
pub struct SignedDelegationVerifier<R = Secp256k1Recovery> {
    recovery: R,
}

impl SignedDelegationVerifier<Secp256k1Recovery> {
    /// A verifier using secp256k1 recovery.
    pub fn secp256k1() -> Self {
        Self::new(Secp256k1Recovery)
    }
}

impl<R: SignerRecovery> SignedDelegationVerifier<R> {
    /// A verifier using `recovery`.
    pub fn new(recovery: R) -> Self {
        Self { recovery }
    }

    /// Recover the signer without consulting the registry.
    ///
    /// # Errors
    ///
    /// `InvalidSignatureLength` or `MalformedSignature`.
    pub fn recover_signer(&self, delegation: &SignedDelegation) -> Result<AccountId, RegistryError> {
        Ok(self
            .recovery
            .recover(&delegation.payload, &delegation.signature)?)
    }

    /// Recover the signer of `delegation` and require it to be an operator
    /// whose primary satisfies `requirement`.
    ///
    /// # Errors
    ///
    /// Signature errors from recovery, then exactly the errors a direct
    /// check on the recovered account would produce.
    pub fn verify_and_resolve<C: OperatorAuthorization + ?Sized>(
        &self,
        checker: &C,
        delegation: SignedDelegation,
        requirement: &Requirement,
    ) -> Result<ResolvedDelegation, RegistryError> {
        let signer = match self.recover_signer(&delegation) {
            Ok(signer) => signer,
            Err(err) => {
                tracing::warn!(error = %err, "delegation signature rejected");
                return Err(err);
            }
        };
        let primary = checker.check_requirement(&signer, requirement)?;
        tracing::debug!(
            signer = %signer,
            primary = %primary,
            requirement = %requirement,
            "delegation resolved"
        );
        Ok(ResolvedDelegation { signer, primary })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authority::AuthorityRegistry;
    use permreg_core::{Caller, SignatureError};
    use permreg_crypto::Secp256k1KeyPair;

    fn key(n: u8) -> Secp256k1KeyPair {
        let mut secret = [0u8; 32];
        secret[31] = n;
        Secp256k1KeyPair::from_secret_bytes(&secret).unwrap()
    }

    fn a(byte: u8) -> AccountId {
        AccountId::from_bytes([byte; 20])
    }

    /// Primary 1 holding transactions:write with operator `key(7)`.
    fn registry() -> AuthorityRegistry {
        let root = Caller::authenticated(a(0xf0));
        let mut reg = AuthorityRegistry::new(a(0xf0)).unwrap();
        reg.add_primary(&root, a(1), a(2), a(3)).unwrap();
        reg.add_address_scope(&root, a(1), "transactions:write").unwrap();
        reg.add_operator_key(&Caller::authenticated(a(2)), a(1), key(7).account())
            .unwrap();
        reg
    }

    fn delegation_by(signer: &Secp256k1KeyPair, claimed: &AccountId) -> SignedDelegation {
        let payload = CanonicalBytes::for_account(claimed);
        let sig = signer.sign(&payload).unwrap();
        SignedDelegation::new(payload, sig.as_bytes().to_vec())
    }

    #[test]
    fn test_operator_signature_resolves_primary() {
        let operator = key(7);
        let resolved = SignedDelegationVerifier::secp256k1()
            .verify_and_resolve(
                &registry(),
                delegation_by(&operator, &operator.account()),
                &Requirement::DefaultScope,
            )
            .unwrap();
        assert_eq!(resolved, ResolvedDelegation { signer: operator.account(), primary: a(1) });
    }

    #[test]
    fn test_foreign_payload_recovers_real_signer() {
        let operator = key(7);
        let stranger = key(8);
        let delegation = delegation_by(&stranger, &operator.account());
        assert_eq!(delegation.claimed_account(), Some(operator.account()));

        let verifier = SignedDelegationVerifier::secp256k1();
        assert_eq!(verifier.recover_signer(&delegation), Ok(stranger.account()));
        assert_eq!(
            verifier.verify_and_resolve(&registry(), delegation, &Requirement::DefaultScope),
            Err(RegistryError::OperatorNotMapped { operator: stranger.account() })
        );
    }

    #[test]
    fn test_unmapped_signer_matches_direct_check() {
        let reg = registry();
        let stranger = key(8);
        let via_signature = SignedDelegationVerifier::secp256k1()
            .verify_and_resolve(
                &reg,
                delegation_by(&stranger, &stranger.account()),
                &Requirement::DefaultScope,
            )
            .unwrap_err();
        assert_eq!(via_signature, reg.check_operator(&stranger.account()).unwrap_err());
        assert_eq!(via_signature.to_string(), "Permissions: operator not pointing to a primary");
    }

    #[test]
    fn test_requirements_are_forwarded() {
        let reg = registry();
        let operator = key(7);
        let verifier = SignedDelegationVerifier::secp256k1();

        let lacking = verifier
            .verify_and_resolve(
                &reg,
                delegation_by(&operator, &operator.account()),
                &Requirement::Permission("coupon:burn".into()),
            )
            .unwrap_err();
        assert!(matches!(lacking, RegistryError::PrimaryLacksPermission { .. }));

        let empty = verifier
            .verify_and_resolve(
                &reg,
                delegation_by(&operator, &operator.account()),
                &Requirement::Permission(String::new()),
            )
            .unwrap_err();
        assert_eq!(empty, RegistryError::EmptyPermission);
    }

    #[test]
    fn test_wrong_length_signature() {
        let delegation =
            SignedDelegation::new(CanonicalBytes::for_account(&key(7).account()), vec![0u8; 64]);
        let err = SignedDelegationVerifier::secp256k1()
            .verify_and_resolve(&registry(), delegation, &Requirement::DefaultScope)
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::InvalidSignatureLength(SignatureError::InvalidLength { got: 64 })
        );
    }

    #[test]
    fn test_malformed_signature() {
        let operator = key(7);
        let mut delegation = delegation_by(&operator, &operator.account());
        delegation.signature[64] = 5;
        let err = SignedDelegationVerifier::secp256k1()
            .verify_and_resolve(&registry(), delegation, &Requirement::DefaultScope)
            .unwrap_err();
        assert!(matches!(err, RegistryError::MalformedSignature(_)));
        assert_eq!(err.to_string(), "ECDSA: invalid signature 'v' value");
    }

    struct FixedSigner(AccountId);

    impl SignerRecovery for FixedSigner {
        fn recover(
            &self,
            _payload: &CanonicalBytes,
            _signature: &[u8],
        ) -> Result<AccountId, SignatureError> {
            Ok(self.0)
        }
    }

    #[test]
    fn test_custom_recovery_backend() {
        let verifier = SignedDelegationVerifier::new(FixedSigner(key(7).account()));
        let delegation = SignedDelegation::new(CanonicalBytes::for_account(&a(1)), Vec::new());
        let resolved = verifier
            .verify_and_resolve(&registry(), delegation, &Requirement::DefaultScope)
            .unwrap();
        assert_eq!(resolved.primary, a(1));
    }
}
