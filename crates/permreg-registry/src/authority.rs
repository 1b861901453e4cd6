//! # Authority Registry
//!
//! The complete authorization state and every rule that guards it.
//!
//! ## Hierarchy
//!
//! ```text
//! RootAuthority ("VNF")
//!   ├── rotates itself
//!   ├── registers primaries ──▶ Primary ── permissioning key ──▶ operators
//!   │                                  └── rotation key (single use)
//!   └── grants and revokes scopes
//! ```
//!
//! ## Design
//!
//! `AuthorityRegistry` is plain data plus `&mut self` transitions. Each
//! transition validates everything before it writes anything, so an error
//! always leaves the state untouched. Locking, logging and the mutation log
//! live one layer up in [`crate::Registry`].
//!
//! An unregistered primary has no keys, so no caller can hold its
//! permissioning or rotation key: operations naming one fail with
//! `NotPermissioningKey` or `NotRotationKey`.

use std::collections::BTreeMap;

use permreg_core::{AccountId, Caller};
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::mutation::Mutation;
use crate::operators::OperatorDirectory;
use crate::rotation::{PrimaryKeys, Rotation, RotationController};
use crate::scope_store::ScopeStore;

/// Root authority, primaries, operators and scopes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorityRegistry {
    root: AccountId,
    /// Registered primaries in first-registration order.
    primaries: Vec<AccountId>,
    keys: BTreeMap<AccountId, PrimaryKeys>,
    operators: OperatorDirectory,
    scopes: ScopeStore,
}

impl AuthorityRegistry {
    /// A registry whose root authority is `initializer`.
    ///
    /// # Errors
    ///
    /// `ZeroAddress` if `initializer` is the null identifier, since no
    /// caller could ever act as that root.
    pub fn new(initializer: AccountId) -> Result<Self, RegistryError> {
        let root = initializer.non_zero().ok_or(RegistryError::ZeroAddress)?;
        Ok(Self {
            root,
            primaries: Vec::new(),
            keys: BTreeMap::new(),
            operators: OperatorDirectory::new(),
            scopes: ScopeStore::new(),
        })
    }

    // ─── Root authority ──────────────────────────────────────────────

    /// The current root authority.
    pub fn root_authority(&self) -> AccountId {
        self.root
    }

    fn require_root(&self, caller: &Caller) -> Result<(), RegistryError> {
        if caller.is(&self.root) {
            Ok(())
        } else {
            Err(RegistryError::NotRootAuthority)
        }
    }

    /// Hand the root authority to `new_root`. Returns the previous root.
    pub fn rotate_vnf(
        &mut self,
        caller: &Caller,
        new_root: AccountId,
    ) -> Result<AccountId, RegistryError> {
        self.require_root(caller)?;
        let new_root = new_root.non_zero().ok_or(RegistryError::ZeroAddress)?;
        Ok(std::mem::replace(&mut self.root, new_root))
    }

    // ─── Primaries ───────────────────────────────────────────────────

    /// Register `primary`, or overwrite the keys of an existing one.
    ///
    /// Returns the keys that were replaced, if the primary existed. A
    /// re-registered primary keeps its place in [`Self::primaries`].
    pub fn add_primary(
        &mut self,
        caller: &Caller,
        primary: AccountId,
        permissioning: AccountId,
        rotation: AccountId,
    ) -> Result<Option<PrimaryKeys>, RegistryError> {
        self.require_root(caller)?;
        if primary.is_zero() {
            return Err(RegistryError::ZeroAddress);
        }
        let previous = self
            .keys
            .insert(primary, PrimaryKeys::new(permissioning, rotation));
        if previous.is_none() {
            self.primaries.push(primary);
        }
        Ok(previous)
    }

    /// Registered primaries in first-registration order.
    pub fn primaries(&self) -> &[AccountId] {
        &self.primaries
    }

    /// The current keys of `primary`.
    pub fn primary_keys(&self, primary: &AccountId) -> Option<PrimaryKeys> {
        self.keys.get(primary).copied()
    }

    /// Replace both keys of `primary`, consuming the caller's rotation key.
    pub fn rotate_permissioning(
        &mut self,
        caller: &Caller,
        primary: &AccountId,
        new_permissioning: AccountId,
        new_rotation: AccountId,
    ) -> Result<Rotation, RegistryError> {
        RotationController::rotate(
            self.keys.get_mut(primary),
            caller,
            new_permissioning,
            new_rotation,
        )
    }

    fn require_permissioning(
        &self,
        caller: &Caller,
        primary: &AccountId,
    ) -> Result<(), RegistryError> {
        self.keys
            .get(primary)
            .ok_or(RegistryError::NotPermissioningKey)?
            .require_permissioning(caller)
    }

    // ─── Operators ───────────────────────────────────────────────────

    /// Map `operator` to `primary`.
    pub fn add_operator_key(
        &mut self,
        caller: &Caller,
        primary: AccountId,
        operator: AccountId,
    ) -> Result<(), RegistryError> {
        self.require_permissioning(caller, &primary)?;
        self.operators.add(primary, operator)
    }

    /// Clear the mapping of `operator`, whichever primary it points to.
    ///
    /// Returns the primary it pointed to, if any. Clearing an unmapped
    /// operator succeeds.
    pub fn remove_operator_key(
        &mut self,
        caller: &Caller,
        primary: &AccountId,
        operator: &AccountId,
    ) -> Result<Option<AccountId>, RegistryError> {
        self.require_permissioning(caller, primary)?;
        Ok(self.operators.remove(operator))
    }

    /// Clear `old_operator` and map `new_operator` to `primary`.
    pub fn rotate_operator_key(
        &mut self,
        caller: &Caller,
        primary: AccountId,
        new_operator: AccountId,
        old_operator: &AccountId,
    ) -> Result<(), RegistryError> {
        self.require_permissioning(caller, &primary)?;
        self.operators.rotate(primary, new_operator, old_operator)
    }

    /// The primary `operator` maps to.
    pub fn lookup_primary(&self, operator: &AccountId) -> Option<AccountId> {
        self.operators.lookup(operator)
    }

    /// Operators mapped to `primary`, sorted.
    pub fn operators_of(&self, primary: &AccountId) -> Vec<AccountId> {
        self.operators.operators_of(primary)
    }

    // ─── Scopes ──────────────────────────────────────────────────────

    /// Grant `scope` to `address`. Returns whether the grant was new.
    pub fn add_address_scope(
        &mut self,
        caller: &Caller,
        address: AccountId,
        scope: &str,
    ) -> Result<bool, RegistryError> {
        self.require_root(caller)?;
        Ok(self.scopes.add(address, scope))
    }

    /// Revoke `scope` from `address`. Returns whether it was held.
    pub fn remove_address_scope(
        &mut self,
        caller: &Caller,
        address: &AccountId,
        scope: &str,
    ) -> Result<bool, RegistryError> {
        self.require_root(caller)?;
        Ok(self.scopes.remove(address, scope))
    }

    /// Grant every scope in `add`, then revoke every scope in `remove`.
    pub fn update_address_scopes(
        &mut self,
        caller: &Caller,
        address: AccountId,
        add: &[String],
        remove: &[String],
    ) -> Result<(), RegistryError> {
        self.require_root(caller)?;
        self.scopes.update(address, add, remove);
        Ok(())
    }

    /// Whether `address` holds `scope`.
    pub fn check_address_scope(&self, address: &AccountId, scope: &str) -> bool {
        self.scopes.check(address, scope)
    }

    /// Scopes held by `address`, sorted.
    pub fn scopes_of(&self, address: &AccountId) -> Vec<String> {
        self.scopes.scopes_of(address)
    }

    // ─── Dispatch ────────────────────────────────────────────────────

    /// Apply `mutation` as `caller`.
    pub fn apply(&mut self, caller: &Caller, mutation: &Mutation) -> Result<(), RegistryError> {
        match mutation {
            Mutation::RotateVnf { new_root } => {
                self.rotate_vnf(caller, *new_root)?;
            }
            Mutation::AddPrimary { primary, permissioning, rotation } => {
                self.add_primary(caller, *primary, *permissioning, *rotation)?;
            }
            Mutation::RotatePermissioning { primary, new_permissioning, new_rotation } => {
                self.rotate_permissioning(caller, primary, *new_permissioning, *new_rotation)?;
            }
            Mutation::AddOperatorKey { primary, operator } => {
                self.add_operator_key(caller, *primary, *operator)?;
            }
            Mutation::RemoveOperatorKey { primary, operator } => {
                self.remove_operator_key(caller, primary, operator)?;
            }
            Mutation::RotateOperatorKey { primary, new_operator, old_operator } => {
                self.rotate_operator_key(caller, *primary, *new_operator, old_operator)?;
            }
            Mutation::AddAddressScope { address, scope } => {
                self.add_address_scope(caller, *address, scope)?;
            }
            Mutation::RemoveAddressScope { address, scope } => {
                self.remove_address_scope(caller, address, scope)?;
            }
            Mutation::UpdateAddressScopes { address, add, remove } => {
                self.update_address_scopes(caller, *address, add, remove)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a(byte: u8) -> AccountId {
        AccountId::from_bytes([byte; 20])
    }

    fn as_caller(byte: u8) -> Caller {
        Caller::authenticated(a(byte))
    }

    const ROOT: u8 = 0xf0;

    fn registry() -> AuthorityRegistry {
        AuthorityRegistry::new(a(ROOT)).unwrap()
    }

    /// Root plus primary P=1 with permissioning K=2 and rotation R=3.
    fn with_primary() -> AuthorityRegistry {
        let mut reg = registry();
        reg.add_primary(&as_caller(ROOT), a(1), a(2), a(3)).unwrap();
        reg
    }

    #[test]
    fn test_initializer_becomes_root() {
        assert_eq!(registry().root_authority(), a(ROOT));
    }

    #[test]
    fn test_zero_initializer_rejected() {
        assert_eq!(
            AuthorityRegistry::new(AccountId::ZERO),
            Err(RegistryError::ZeroAddress)
        );
    }

    #[test]
    fn test_rotate_vnf() {
        let mut reg = registry();
        assert_eq!(reg.rotate_vnf(&as_caller(ROOT), a(0xf1)), Ok(a(ROOT)));
        assert_eq!(reg.root_authority(), a(0xf1));
        assert_eq!(
            reg.rotate_vnf(&as_caller(ROOT), a(0xf2)),
            Err(RegistryError::NotRootAuthority)
        );
    }

    #[test]
    fn test_rotate_vnf_checks_caller_before_argument() {
        let mut reg = registry();
        assert_eq!(
            reg.rotate_vnf(&as_caller(1), AccountId::ZERO),
            Err(RegistryError::NotRootAuthority)
        );
        assert_eq!(
            reg.rotate_vnf(&as_caller(ROOT), AccountId::ZERO),
            Err(RegistryError::ZeroAddress)
        );
        assert_eq!(reg.root_authority(), a(ROOT));
    }

    #[test]
    fn test_add_primary_requires_root() {
        let mut reg = registry();
        assert_eq!(
            reg.add_primary(&as_caller(1), a(1), a(2), a(3)),
            Err(RegistryError::NotRootAuthority)
        );
        assert_eq!(
            reg.add_primary(&as_caller(ROOT), AccountId::ZERO, a(2), a(3)),
            Err(RegistryError::ZeroAddress)
        );
        assert!(reg.primaries().is_empty());
    }

    #[test]
    fn test_add_primary_overwrites_and_keeps_single_entry() {
        let mut reg = with_primary();
        reg.add_primary(&as_caller(ROOT), a(4), a(5), a(6)).unwrap();
        let previous = reg.add_primary(&as_caller(ROOT), a(1), a(7), a(8)).unwrap();
        assert_eq!(previous, Some(PrimaryKeys::new(a(2), a(3))));
        assert_eq!(reg.primaries(), &[a(1), a(4)]);
        assert_eq!(reg.primary_keys(&a(1)), Some(PrimaryKeys::new(a(7), a(8))));
    }

    #[test]
    fn test_former_root_loses_rights() {
        let mut reg = registry();
        reg.rotate_vnf(&as_caller(ROOT), a(0xf1)).unwrap();
        assert_eq!(
            reg.add_primary(&as_caller(ROOT), a(1), a(2), a(3)),
            Err(RegistryError::NotRootAuthority)
        );
        reg.add_primary(&as_caller(0xf1), a(1), a(2), a(3)).unwrap();
    }

    #[test]
    fn test_rotate_permissioning_of_unregistered_primary() {
        let mut reg = registry();
        assert!(matches!(
            reg.rotate_permissioning(&as_caller(3), &a(1), a(4), a(5)),
            Err(RegistryError::NotRotationKey)
        ));
    }

    #[test]
    fn test_operator_management_requires_permissioning_key() {
        let mut reg = with_primary();
        assert_eq!(
            reg.add_operator_key(&as_caller(3), a(1), a(10)),
            Err(RegistryError::NotPermissioningKey)
        );
        assert_eq!(
            reg.add_operator_key(&as_caller(ROOT), a(1), a(10)),
            Err(RegistryError::NotPermissioningKey)
        );
        assert_eq!(
            reg.add_operator_key(&as_caller(2), a(9), a(10)),
            Err(RegistryError::NotPermissioningKey)
        );
        reg.add_operator_key(&as_caller(2), a(1), a(10)).unwrap();
        assert_eq!(reg.lookup_primary(&a(10)), Some(a(1)));
    }

    #[test]
    fn test_permissioning_check_precedes_argument_checks() {
        let mut reg = with_primary();
        assert_eq!(
            reg.add_operator_key(&as_caller(9), a(1), AccountId::ZERO),
            Err(RegistryError::NotPermissioningKey)
        );
        assert_eq!(
            reg.add_operator_key(&as_caller(2), a(1), AccountId::ZERO),
            Err(RegistryError::ZeroAddress)
        );
    }

    #[test]
    fn test_remove_operator_key() {
        let mut reg = with_primary();
        reg.add_operator_key(&as_caller(2), a(1), a(10)).unwrap();
        assert_eq!(
            reg.remove_operator_key(&as_caller(3), &a(1), &a(10)),
            Err(RegistryError::NotPermissioningKey)
        );
        assert_eq!(reg.remove_operator_key(&as_caller(2), &a(1), &a(10)), Ok(Some(a(1))));
        assert_eq!(reg.remove_operator_key(&as_caller(2), &a(1), &a(10)), Ok(None));
    }

    #[test]
    fn test_rotate_operator_key() {
        let mut reg = with_primary();
        reg.add_operator_key(&as_caller(2), a(1), a(10)).unwrap();
        reg.rotate_operator_key(&as_caller(2), a(1), a(11), &a(10)).unwrap();
        assert_eq!(reg.lookup_primary(&a(10)), None);
        assert_eq!(reg.lookup_primary(&a(11)), Some(a(1)));
        assert_eq!(
            reg.rotate_operator_key(&as_caller(2), a(1), AccountId::ZERO, &a(11)),
            Err(RegistryError::ZeroAddress)
        );
    }

    #[test]
    fn test_new_permissioning_key_takes_over_operators() {
        let mut reg = with_primary();
        reg.add_operator_key(&as_caller(2), a(1), a(10)).unwrap();
        reg.rotate_permissioning(&as_caller(3), &a(1), a(4), a(5)).unwrap();

        assert_eq!(reg.lookup_primary(&a(10)), Some(a(1)));
        assert_eq!(
            reg.add_operator_key(&as_caller(2), a(1), a(11)),
            Err(RegistryError::NotPermissioningKey)
        );
        reg.add_operator_key(&as_caller(4), a(1), a(11)).unwrap();
    }

    #[test]
    fn test_scope_writes_require_root() {
        let mut reg = with_primary();
        assert_eq!(
            reg.add_address_scope(&as_caller(2), a(1), "transactions:write"),
            Err(RegistryError::NotRootAuthority)
        );
        assert_eq!(reg.add_address_scope(&as_caller(ROOT), a(1), "transactions:write"), Ok(true));
        assert_eq!(reg.add_address_scope(&as_caller(ROOT), a(1), "transactions:write"), Ok(false));
        assert!(reg.check_address_scope(&a(1), "transactions:write"));
        assert_eq!(
            reg.remove_address_scope(&as_caller(1), &a(1), "transactions:write"),
            Err(RegistryError::NotRootAuthority)
        );
        assert_eq!(
            reg.update_address_scopes(&as_caller(1), a(1), &[], &[]),
            Err(RegistryError::NotRootAuthority)
        );
    }

    #[test]
    fn test_rejected_mutations_leave_state_untouched() {
        let mut reg = with_primary();
        reg.add_operator_key(&as_caller(2), a(1), a(10)).unwrap();
        let before = reg.clone();

        let rejected = [
            Mutation::RotateVnf { new_root: AccountId::ZERO },
            Mutation::AddPrimary { primary: a(4), permissioning: a(5), rotation: a(6) },
            Mutation::RotatePermissioning {
                primary: a(1),
                new_permissioning: a(7),
                new_rotation: a(8),
            },
            Mutation::AddOperatorKey { primary: a(1), operator: a(10) },
            Mutation::RotateOperatorKey {
                primary: a(1),
                new_operator: a(10),
                old_operator: a(10),
            },
            Mutation::AddAddressScope { address: a(1), scope: "s".into() },
        ];
        for mutation in &rejected {
            let caller = match mutation {
                Mutation::RotateVnf { .. } => as_caller(ROOT),
                Mutation::AddOperatorKey { .. } | Mutation::RotateOperatorKey { .. } => {
                    as_caller(2)
                }
                _ => as_caller(9),
            };
            assert!(reg.apply(&caller, mutation).is_err(), "{mutation} should fail");
            assert_eq!(reg, before, "{mutation} changed state");
        }
    }

    #[test]
    fn test_apply_dispatches() {
        let mut reg = registry();
        reg.apply(
            &as_caller(ROOT),
            &Mutation::AddPrimary { primary: a(1), permissioning: a(2), rotation: a(3) },
        )
        .unwrap();
        reg.apply(
            &as_caller(ROOT),
            &Mutation::UpdateAddressScopes {
                address: a(1),
                add: vec!["transactions:write".into(), "x".into()],
                remove: vec!["x".into()],
            },
        )
        .unwrap();
        reg.apply(&as_caller(2), &Mutation::AddOperatorKey { primary: a(1), operator: a(10) })
            .unwrap();

        assert_eq!(reg.scopes_of(&a(1)), vec!["transactions:write"]);
        assert_eq!(reg.operators_of(&a(1)), vec![a(10)]);
    }
}
