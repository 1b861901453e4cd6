//! # Registry Errors
//!
//! Every rejection the registry can produce. The `Display` text of each
//! variant is the exact failure string downstream subsystems match on, so
//! variants carry context in fields but never in their message.
//!
//! ## Taxonomy
//!
//! | Kind | Variants |
//! |------|----------|
//! | Authorization | `NotRootAuthority`, `NotRotationKey`, `NotPermissioningKey` |
//! | Validation | `ZeroAddress`, `EmptyPermission` |
//! | Conflict | `OperatorAlreadyMapped` |
//! | NotFound | `OperatorNotMapped` |
//! | PermissionDenied | `PrimaryLacksRequiredScope`, `PrimaryLacksPermission` |
//! | Signature | `InvalidSignatureLength`, `MalformedSignature` |

use permreg_core::{AccountId, SignatureError, ROLE};
use serde::Serialize;
use thiserror::Error;

/// The category a `RegistryError` belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The caller does not hold the role the action requires.
    Authorization,
    /// An argument is the null identifier or an empty permission.
    Validation,
    /// The operator is already mapped.
    Conflict,
    /// The operator is not mapped.
    NotFound,
    /// The resolved primary lacks the required scope or permission.
    PermissionDenied,
    /// The signature could not be turned into a signer.
    Signature,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Authorization => "authorization",
            Self::Validation => "validation",
            Self::Conflict => "conflict",
            Self::NotFound => "not_found",
            Self::PermissionDenied => "permission_denied",
            Self::Signature => "signature",
        };
        f.write_str(s)
    }
}

/// A rejected registry operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The caller is not the root authority.
    #[error("{role}: caller is not VNF", role = ROLE)]
    NotRootAuthority,

    /// A required identifier is the null identifier.
    #[error("{role}: address is 0 address", role = ROLE)]
    ZeroAddress,

    /// The caller is not the primary's current rotation key.
    #[error("{role}: caller is not rotation key", role = ROLE)]
    NotRotationKey,

    /// The caller is not the primary's current permissioning key.
    #[error("{role}: caller is not permissioning key", role = ROLE)]
    NotPermissioningKey,

    /// The operator already maps to a primary.
    #[error("{role}: operator is already mapped to a primary", role = ROLE)]
    OperatorAlreadyMapped {
        /// The operator that was being mapped.
        operator: AccountId,
        /// The primary it already maps to.
        primary: AccountId,
    },

    /// The operator maps to no primary.
    #[error("{role}: operator not pointing to a primary", role = ROLE)]
    OperatorNotMapped {
        /// The operator that was looked up.
        operator: AccountId,
    },

    /// The operator's primary lacks the scope that was checked.
    ///
    /// The message names `transactions:write` even when a different scope
    /// was requested; `scope` records what was actually checked.
    #[error("{role}: primary of operator lacks transactions:write scope", role = ROLE)]
    PrimaryLacksRequiredScope {
        /// The resolved primary.
        primary: AccountId,
        /// The scope that was checked.
        scope: String,
    },

    /// The operator's primary lacks the requested permission.
    #[error("{role}: primary of operator lacks requested permission", role = ROLE)]
    PrimaryLacksPermission {
        /// The resolved primary.
        primary: AccountId,
        /// The permission that was checked.
        permission: String,
    },

    /// The permission string is empty.
    #[error("{role}: permission may not be empty", role = ROLE)]
    EmptyPermission,

    /// The signature has the wrong length.
    #[error("{0}")]
    InvalidSignatureLength(SignatureError),

    /// The signature is correctly sized but cannot be recovered.
    #[error("{0}")]
    MalformedSignature(SignatureError),
}

impl RegistryError {
    /// The taxonomy category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotRootAuthority | Self::NotRotationKey | Self::NotPermissioningKey => {
                ErrorKind::Authorization
            }
            Self::ZeroAddress | Self::EmptyPermission => ErrorKind::Validation,
            Self::OperatorAlreadyMapped { .. } => ErrorKind::Conflict,
            Self::OperatorNotMapped { .. } => ErrorKind::NotFound,
            Self::PrimaryLacksRequiredScope { .. } | Self::PrimaryLacksPermission { .. } => {
                ErrorKind::PermissionDenied
            }
            Self::InvalidSignatureLength(_) | Self::MalformedSignature(_) => ErrorKind::Signature,
        }
    }
}

impl From<SignatureError> for RegistryError {
    fn from(err: SignatureError) -> Self {
        if err.is_length_error() {
            Self::InvalidSignatureLength(err)
        } else {
            Self::MalformedSignature(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a(byte: u8) -> AccountId {
        AccountId::from_bytes([byte; 20])
    }

    #[test]
    fn test_messages_verbatim() {
        let cases: Vec<(RegistryError, &str)> = vec![
            (RegistryError::NotRootAuthority, "Permissions: caller is not VNF"),
            (RegistryError::ZeroAddress, "Permissions: address is 0 address"),
            (RegistryError::NotRotationKey, "Permissions: caller is not rotation key"),
            (
                RegistryError::NotPermissioningKey,
                "Permissions: caller is not permissioning key",
            ),
            (
                RegistryError::OperatorAlreadyMapped { operator: a(1), primary: a(2) },
                "Permissions: operator is already mapped to a primary",
            ),
            (
                RegistryError::OperatorNotMapped { operator: a(1) },
                "Permissions: operator not pointing to a primary",
            ),
            (
                RegistryError::PrimaryLacksRequiredScope {
                    primary: a(2),
                    scope: "transactions:write".to_string(),
                },
                "Permissions: primary of operator lacks transactions:write scope",
            ),
            (
                RegistryError::PrimaryLacksPermission {
                    primary: a(2),
                    permission: "coupon:burn".to_string(),
                },
                "Permissions: primary of operator lacks requested permission",
            ),
            (RegistryError::EmptyPermission, "Permissions: permission may not be empty"),
        ];
        for (err, text) in cases {
            assert_eq!(err.to_string(), text);
        }
    }

    #[test]
    fn test_scoped_failure_keeps_default_scope_wording() {
        let err = RegistryError::PrimaryLacksRequiredScope {
            primary: a(2),
            scope: "credential:issue".to_string(),
        };
        assert!(err.to_string().contains("transactions:write"));
        assert!(!err.to_string().contains("credential:issue"));
    }

    #[test]
    fn test_kinds() {
        assert_eq!(RegistryError::NotRootAuthority.kind(), ErrorKind::Authorization);
        assert_eq!(RegistryError::NotRotationKey.kind(), ErrorKind::Authorization);
        assert_eq!(RegistryError::ZeroAddress.kind(), ErrorKind::Validation);
        assert_eq!(RegistryError::EmptyPermission.kind(), ErrorKind::Validation);
        assert_eq!(
            RegistryError::OperatorAlreadyMapped { operator: a(1), primary: a(2) }.kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            RegistryError::OperatorNotMapped { operator: a(1) }.kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            RegistryError::PrimaryLacksPermission { primary: a(1), permission: "p".into() }.kind(),
            ErrorKind::PermissionDenied
        );
    }

    #[test]
    fn test_signature_error_split() {
        let len: RegistryError = SignatureError::InvalidLength { got: 3 }.into();
        assert!(matches!(len, RegistryError::InvalidSignatureLength(_)));
        assert_eq!(len.to_string(), "ECDSA: invalid signature length");

        let bad: RegistryError = SignatureError::HighS.into();
        assert!(matches!(bad, RegistryError::MalformedSignature(_)));
        assert_eq!(bad.kind(), ErrorKind::Signature);
    }
}
