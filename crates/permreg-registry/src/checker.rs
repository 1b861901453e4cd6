//! # Authorization Checks
//!
//! Read-only resolution of an operator to its primary, followed by a scope
//! or permission check on that primary. Revocation, coupon and metadata
//! subsystems call these before touching their own records and propagate
//! the error unchanged.
//!
//! ```text
//! Unmapped ──add_operator_key──▶ Mapped(primary)
//!    ▲                              │
//!    └── remove_operator_key ───────┤
//!    └── rotate_operator_key away ──┘
//! ```
//!
//! Scopes and permissions live in the same store; the two entry points
//! differ only in their failure text and in the empty-string rule.

use permreg_core::{AccountId, TRANSACTIONS_WRITE};
use serde::{Deserialize, Serialize};

use crate::authority::AuthorityRegistry;
use crate::error::RegistryError;

/// What a resolved primary must hold.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Requirement {
    /// The `transactions:write` scope.
    DefaultScope,
    /// A named scope.
    Scope(String),
    /// A named permission. Empty permissions are rejected.
    Permission(String),
}

impl std::fmt::Display for Requirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DefaultScope => write!(f, "scope:{TRANSACTIONS_WRITE}"),
            Self::Scope(s) => write!(f, "scope:{s}"),
            Self::Permission(p) => write!(f, "permission:{p}"),
        }
    }
}

/// Operator authorization checks.
///
/// Every method returns the operator's primary on success.
pub trait OperatorAuthorization {
    /// Require the operator's primary to hold `transactions:write`.
    fn check_operator(&self, operator: &AccountId) -> Result<AccountId, RegistryError> {
        self.check_operator_with_scope(operator, TRANSACTIONS_WRITE)
    }

    /// Require the operator's primary to hold `scope`.
    ///
    /// The failure text names `transactions:write` regardless of `scope`.
    fn check_operator_with_scope(
        &self,
        operator: &AccountId,
        scope: &str,
    ) -> Result<AccountId, RegistryError>;

    /// Require the operator's primary to hold `permission`.
    ///
    /// An empty `permission` fails before the operator is looked up.
    fn check_operator_permission(
        &self,
        operator: &AccountId,
        permission: &str,
    ) -> Result<AccountId, RegistryError>;

    /// Dispatch on a [`Requirement`].
    fn check_requirement(
        &self,
        operator: &AccountId,
        requirement: &Requirement,
    ) -> Result<AccountId, RegistryError> {
        match requirement {
            Requirement::DefaultScope => self.check_operator(operator),
            Requirement::Scope(scope) => self.check_operator_with_scope(operator, scope),
            Requirement::Permission(p) => self.check_operator_permission(operator, p),
        }
    }
}

impl AuthorityRegistry {
    fn resolve_operator(&self, operator: &AccountId) -> Result<AccountId, RegistryError> {
        self.lookup_primary(operator)
            .ok_or(RegistryError::OperatorNotMapped { operator: *operator })
    }
}

impl OperatorAuthorization for AuthorityRegistry {
    fn check_operator_with_scope(
        &self,
        operator: &AccountId,
        scope: &str,
    ) -> Result<AccountId, RegistryError> {
        let primary = self.resolve_operator(operator)?;
        if !self.check_address_scope(&primary, scope) {
            return Err(RegistryError::PrimaryLacksRequiredScope {
                primary,
                scope: scope.to_string(),
            });
        }
        Ok(primary)
    }

    fn check_operator_permission(
        &self,
        operator: &AccountId,
        permission: &str,
    ) -> Result<AccountId, RegistryError> {
        if permission.is_empty() {
            return Err(RegistryError::EmptyPermission);
        }
        let primary = self.resolve_operator(operator)?;
        if !self.check_address_scope(&primary, permission) {
            return Err(RegistryError::PrimaryLacksPermission {
                primary,
                permission: permission.to_string(),
            });
        }
        Ok(primary)
    }
}

impl<T: OperatorAuthorization + ?Sized> OperatorAuthorization for &T {
    fn check_operator(&self, operator: &AccountId) -> Result<AccountId, RegistryError> {
        (**self).check_operator(operator)
    }

    fn check_operator_with_scope(
        &self,
        operator: &AccountId,
        scope: &str,
    ) -> Result<AccountId, RegistryError> {
        (**self).check_operator_with_scope(operator, scope)
    }

    fn check_operator_permission(
        &self,
        operator: &AccountId,
        permission: &str,
    ) -> Result<AccountId, RegistryError> {
        (**self).check_operator_permission(operator, permission)
    }
}

impl<T: OperatorAuthorization + ?Sized> OperatorAuthorization for std::sync::Arc<T> {
    fn check_operator(&self, operator: &AccountId) -> Result<AccountId, RegistryError> {
        (**self).check_operator(operator)
    }

    fn check_operator_with_scope(
        &self,
        operator: &AccountId,
        scope: &str,
    ) -> Result<AccountId, RegistryError> {
        (**self).check_operator_with_scope(operator, scope)
    }

    fn check_operator_permission(
        &self,
        operator: &AccountId,
        permission: &str,
    ) -> Result<AccountId, RegistryError> {
        (**self).check_operator_permission(operator, permission)
    }
}
