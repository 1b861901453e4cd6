//! # Mutations and the Mutation Log
//!
//! Every state change the registry accepts is described by a [`Mutation`]
//! value. The handle appends a [`MutationRecord`] for each committed
//! mutation; rejected mutations leave no trace. Replaying the records of a
//! log in sequence order against a fresh registry with the same
//! initializer reproduces the state exactly.

use permreg_core::{AccountId, Timestamp};
use serde::{Deserialize, Serialize};

/// A state-changing registry operation with its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    /// Hand the root authority to `new_root`.
    RotateVnf {
        /// The incoming root authority.
        new_root: AccountId,
    },
    /// Register or re-register a primary account.
    AddPrimary {
        /// The primary account.
        primary: AccountId,
        /// Its permissioning key.
        permissioning: AccountId,
        /// Its rotation key.
        rotation: AccountId,
    },
    /// Replace both keys of a primary using its rotation key.
    RotatePermissioning {
        /// The primary account.
        primary: AccountId,
        /// Replacement permissioning key.
        new_permissioning: AccountId,
        /// Replacement rotation key.
        new_rotation: AccountId,
    },
    /// Map an operator to a primary.
    AddOperatorKey {
        /// The primary account.
        primary: AccountId,
        /// The operator to map.
        operator: AccountId,
    },
    /// Clear an operator's mapping.
    RemoveOperatorKey {
        /// The primary account whose permissioning key authorizes the call.
        primary: AccountId,
        /// The operator to unmap.
        operator: AccountId,
    },
    /// Replace one operator of a primary with another.
    RotateOperatorKey {
        /// The primary account.
        primary: AccountId,
        /// The operator to map.
        new_operator: AccountId,
        /// The operator to unmap.
        old_operator: AccountId,
    },
    /// Grant a scope.
    AddAddressScope {
        /// The grantee.
        address: AccountId,
        /// The scope string.
        scope: String,
    },
    /// Revoke a scope.
    RemoveAddressScope {
        /// The grantee.
        address: AccountId,
        /// The scope string.
        scope: String,
    },
    /// Grant then revoke a batch of scopes.
    UpdateAddressScopes {
        /// The grantee.
        address: AccountId,
        /// Scopes to grant.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        add: Vec<String>,
        /// Scopes to revoke, applied after `add`.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        remove: Vec<String>,
    },
}

impl Mutation {
    /// Stable operation name, as used in logs and the serialized `op` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RotateVnf { .. } => "rotate_vnf",
            Self::AddPrimary { .. } => "add_primary",
            Self::RotatePermissioning { .. } => "rotate_permissioning",
            Self::AddOperatorKey { .. } => "add_operator_key",
            Self::RemoveOperatorKey { .. } => "remove_operator_key",
            Self::RotateOperatorKey { .. } => "rotate_operator_key",
            Self::AddAddressScope { .. } => "add_address_scope",
            Self::RemoveAddressScope { .. } => "remove_address_scope",
            Self::UpdateAddressScopes { .. } => "update_address_scopes",
        }
    }
}

impl std::fmt::Display for Mutation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One committed mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationRecord {
    /// Position in the log, starting at 1.
    pub sequence: u64,
    /// The authenticated caller that issued the mutation.
    pub caller: AccountId,
    /// What was changed.
    pub mutation: Mutation,
    /// When the mutation was committed.
    pub recorded_at: Timestamp,
}
