//! # Scope Store
//!
//! Sparse mapping from account to its granted scope strings. Every write is
//! idempotent and none is validated: the null identifier is a valid key and
//! empty strings may be stored. Accounts whose set becomes empty are
//! dropped, so two stores holding the same grants compare equal however
//! they got there.

use std::collections::BTreeMap;

use permreg_core::{AccountId, ScopeSet};
use serde::{Deserialize, Serialize};

/// Account → granted scopes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeStore {
    grants: BTreeMap<AccountId, ScopeSet>,
}

impl ScopeStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `scope` to `address`. Returns whether the grant was new.
    pub fn add(&mut self, address: AccountId, scope: &str) -> bool {
        self.grants
            .entry(address)
            .or_default()
            .insert(scope.to_string())
    }

    /// Revoke `scope` from `address`. Returns whether it was held.
    pub fn remove(&mut self, address: &AccountId, scope: &str) -> bool {
        let Some(set) = self.grants.get_mut(address) else {
            return false;
        };
        let removed = set.remove(scope);
        if set.is_empty() {
            self.grants.remove(address);
        }
        removed
    }

    /// Apply every addition, then every removal.
    ///
    /// A scope present in both lists ends up absent.
    pub fn update(&mut self, address: AccountId, add: &[String], remove: &[String]) {
        for scope in add {
            self.add(address, scope);
        }
        for scope in remove {
            self.remove(&address, scope);
        }
    }

    /// Whether `address` holds `scope`.
    pub fn check(&self, address: &AccountId, scope: &str) -> bool {
        self.grants
            .get(address)
            .is_some_and(|set| set.contains(scope))
    }

    /// The scopes held by `address`, sorted.
    pub fn scopes_of(&self, address: &AccountId) -> Vec<String> {
        self.grants
            .get(address)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of accounts holding at least one scope.
    pub fn len(&self) -> usize {
        self.grants.len()
    }

    /// Whether no account holds any scope.
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}
