//! # Registry Handle
//!
//! The shared entry point to the authorization state. A `Registry` is a
//! cheap, cloneable handle; clones share one state.
//!
//! ## Concurrency
//!
//! One `parking_lot::RwLock` guards the state and the mutation log
//! together. A mutation holds the write lock across validate, apply and
//! append, so mutations are linearizable and the log order is the commit
//! order. Checks and reads take the read lock and always observe a state
//! that some prefix of the log produced.
//!
//! ## Logging
//!
//! Committed mutations log at `info`, rejected ones at `warn`, check
//! results at `debug`.

use std::sync::Arc;

use parking_lot::RwLock;
use permreg_core::{AccountId, Caller, Timestamp};

use crate::authority::AuthorityRegistry;
use crate::checker::OperatorAuthorization;
use crate::error::RegistryError;
use crate::mutation::{Mutation, MutationRecord};
use crate::rotation::PrimaryKeys;

#[derive(Debug)]
pub(crate) struct Ledger {
    pub(crate) initializer: AccountId,
    pub(crate) initialized_at: Timestamp,
    pub(crate) state: AuthorityRegistry,
    pub(crate) log: Vec<MutationRecord>,
}

impl Ledger {
    fn next_sequence(&self) -> u64 {
        self.log.len() as u64 + 1
    }
}

/// Shared handle to a permissions registry.
#[derive(Debug, Clone)]
pub struct Registry {
    inner: Arc<RwLock<Ledger>>,
}

impl Registry {
    /// Create a registry whose root authority is the caller.
    ///
    /// # Errors
    ///
    /// `ZeroAddress` if the caller is the null identifier.
    pub fn initialize(caller: &Caller) -> Result<Self, RegistryError> {
        let state = AuthorityRegistry::new(caller.account())?;
        tracing::info!(root = %caller.account(), "registry initialized");
        Ok(Self::from_ledger(Ledger {
            initializer: caller.account(),
            initialized_at: Timestamp::now(),
            state,
            log: Vec::new(),
        }))
    }

    pub(crate) fn from_ledger(ledger: Ledger) -> Self {
        Self { inner: Arc::new(RwLock::new(ledger)) }
    }

    pub(crate) fn with_ledger<T>(&self, f: impl FnOnce(&Ledger) -> T) -> T {
        f(&self.inner.read())
    }

    // ─── Mutations ───────────────────────────────────────────────────

    /// Apply `mutation` as `caller`, appending a log record on success.
    pub fn apply(
        &self,
        caller: &Caller,
        mutation: Mutation,
    ) -> Result<MutationRecord, RegistryError> {
        let mut ledger = self.inner.write();
        if let Err(err) = ledger.state.apply(caller, &mutation) {
            tracing::warn!(
                caller = %caller.account(),
                op = mutation.name(),
                kind = %err.kind(),
                error = %err,
                "mutation rejected"
            );
            return Err(err);
        }
        let record = MutationRecord {
            sequence: ledger.next_sequence(),
            caller: caller.account(),
            mutation,
            recorded_at: Timestamp::now(),
        };
        ledger.log.push(record.clone());
        tracing::info!(
            sequence = record.sequence,
            caller = %record.caller,
            op = record.mutation.name(),
            "mutation committed"
        );
        Ok(record)
    }

    /// Hand the root authority to `new_root`.
    pub fn rotate_vnf(
        &self,
        caller: &Caller,
        new_root: AccountId,
    ) -> Result<MutationRecord, RegistryError> {
        self.apply(caller, Mutation::RotateVnf { new_root })
    }

    /// Register `primary`, or overwrite its keys.
    pub fn add_primary(
        &self,
        caller: &Caller,
        primary: AccountId,
        permissioning: AccountId,
        rotation: AccountId,
    ) -> Result<MutationRecord, RegistryError> {
        self.apply(caller, Mutation::AddPrimary { primary, permissioning, rotation })
    }

    /// Replace both keys of `primary` using its rotation key.
    pub fn rotate_permissioning(
        &self,
        caller: &Caller,
        primary: AccountId,
        new_permissioning: AccountId,
        new_rotation: AccountId,
    ) -> Result<MutationRecord, RegistryError> {
        self.apply(
            caller,
            Mutation::RotatePermissioning { primary, new_permissioning, new_rotation },
        )
    }

    /// Map `operator` to `primary`.
    pub fn add_operator_key(
        &self,
        caller: &Caller,
        primary: AccountId,
        operator: AccountId,
    ) -> Result<MutationRecord, RegistryError> {
        self.apply(caller, Mutation::AddOperatorKey { primary, operator })
    }

    /// Clear the mapping of `operator`.
    pub fn remove_operator_key(
        &self,
        caller: &Caller,
        primary: AccountId,
        operator: AccountId,
    ) -> Result<MutationRecord, RegistryError> {
        self.apply(caller, Mutation::RemoveOperatorKey { primary, operator })
    }

    /// Clear `old_operator` and map `new_operator` to `primary`.
    pub fn rotate_operator_key(
        &self,
        caller: &Caller,
        primary: AccountId,
        new_operator: AccountId,
        old_operator: AccountId,
    ) -> Result<MutationRecord, RegistryError> {
        self.apply(
            caller,
            Mutation::RotateOperatorKey { primary, new_operator, old_operator },
        )
    }

    /// Grant `scope` to `address`.
    pub fn add_address_scope(
        &self,
        caller: &Caller,
        address: AccountId,
        scope: impl Into<String>,
    ) -> Result<MutationRecord, RegistryError> {
        self.apply(caller, Mutation::AddAddressScope { address, scope: scope.into() })
    }

    /// Revoke `scope` from `address`.
    pub fn remove_address_scope(
        &self,
        caller: &Caller,
        address: AccountId,
        scope: impl Into<String>,
    ) -> Result<MutationRecord, RegistryError> {
        self.apply(caller, Mutation::RemoveAddressScope { address, scope: scope.into() })
    }

    /// Grant `add`, then revoke `remove`. `None` is an empty list.
    pub fn update_address_scopes(
        &self,
        caller: &Caller,
        address: AccountId,
        add: Option<Vec<String>>,
        remove: Option<Vec<String>>,
    ) -> Result<MutationRecord, RegistryError> {
        self.apply(
            caller,
            Mutation::UpdateAddressScopes {
                address,
                add: add.unwrap_or_default(),
                remove: remove.unwrap_or_default(),
            },
        )
    }

    // ─── Reads ───────────────────────────────────────────────────────

    /// The current root authority.
    pub fn root_authority(&self) -> AccountId {
        self.inner.read().state.root_authority()
    }

    /// Registered primaries in first-registration order.
    pub fn get_primaries(&self) -> Vec<AccountId> {
        self.inner.read().state.primaries().to_vec()
    }

    /// The current keys of `primary`.
    pub fn primary_keys(&self, primary: &AccountId) -> Option<PrimaryKeys> {
        self.inner.read().state.primary_keys(primary)
    }

    /// The primary `operator` maps to.
    pub fn lookup_primary(&self, operator: &AccountId) -> Option<AccountId> {
        self.inner.read().state.lookup_primary(operator)
    }

    /// Operators mapped to `primary`, sorted.
    pub fn operators_of(&self, primary: &AccountId) -> Vec<AccountId> {
        self.inner.read().state.operators_of(primary)
    }

    /// Whether `address` holds `scope`.
    pub fn check_address_scope(&self, address: &AccountId, scope: &str) -> bool {
        self.inner.read().state.check_address_scope(address, scope)
    }

    /// Scopes held by `address`, sorted.
    pub fn scopes_of(&self, address: &AccountId) -> Vec<String> {
        self.inner.read().state.scopes_of(address)
    }

    /// A copy of the current state.
    pub fn state(&self) -> AuthorityRegistry {
        self.inner.read().state.clone()
    }

    // ─── Mutation log ────────────────────────────────────────────────

    /// Sequence number of the last committed mutation, 0 if none.
    pub fn sequence(&self) -> u64 {
        self.inner.read().log.len() as u64
    }

    /// Every committed mutation, oldest first.
    pub fn log(&self) -> Vec<MutationRecord> {
        self.inner.read().log.clone()
    }

    /// Committed mutations with a sequence greater than `after`.
    pub fn log_since(&self, after: u64) -> Vec<MutationRecord> {
        let ledger = self.inner.read();
        let start = usize::try_from(after).unwrap_or(usize::MAX).min(ledger.log.len());
        ledger.log[start..].to_vec()
    }

    /// The account that initialized the registry.
    pub fn initializer(&self) -> AccountId {
        self.inner.read().initializer
    }
}

impl OperatorAuthorization for Registry {
    fn check_operator_with_scope(
        &self,
        operator: &AccountId,
        scope: &str,
    ) -> Result<AccountId, RegistryError> {
        let result = self.inner.read().state.check_operator_with_scope(operator, scope);
        tracing::debug!(operator = %operator, scope, ok = result.is_ok(), "scope check");
        result
    }

    fn check_operator_permission(
        &self,
        operator: &AccountId,
        permission: &str,
    ) -> Result<AccountId, RegistryError> {
        let result = self
            .inner
            .read()
            .state
            .check_operator_permission(operator, permission);
        tracing::debug!(operator = %operator, permission, ok = result.is_ok(), "permission check");
        result
    }
}
