//! # Operator Directory
//!
//! Operator → owning primary. An operator maps to at most one primary at a
//! time; a primary may own any number of operators. Moving an operator
//! between primaries requires clearing the old mapping first.
//!
//! This type enforces only the structural rules (null operator, uniqueness).
//! Whether the caller holds the primary's permissioning key is checked by
//! `AuthorityRegistry` before any of these methods run.

use std::collections::BTreeMap;

use permreg_core::AccountId;
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// Operator → primary mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperatorDirectory {
    mappings: BTreeMap<AccountId, AccountId>,
}

impl OperatorDirectory {
    /// An empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `operator` to `primary`.
    ///
    /// # Errors
    ///
    /// `ZeroAddress` for the null operator, `OperatorAlreadyMapped` if the
    /// operator maps to any primary, including `primary` itself.
    pub fn add(&mut self, primary: AccountId, operator: AccountId) -> Result<(), RegistryError> {
        self.ensure_mappable(&operator)?;
        self.mappings.insert(operator, primary);
        Ok(())
    }

    /// Clear the mapping of `operator`, whatever primary it points to.
    /// Returns the primary it pointed to, if any.
    pub fn remove(&mut self, operator: &AccountId) -> Option<AccountId> {
        self.mappings.remove(operator)
    }

    /// Clear `old_operator` and map `new_operator` to `primary`.
    ///
    /// Validation happens before anything is cleared, so a rejected
    /// rotation leaves both mappings as they were.
    pub fn rotate(
        &mut self,
        primary: AccountId,
        new_operator: AccountId,
        old_operator: &AccountId,
    ) -> Result<(), RegistryError> {
        self.ensure_mappable(&new_operator)?;
        self.mappings.remove(old_operator);
        self.mappings.insert(new_operator, primary);
        Ok(())
    }

    /// The primary `operator` maps to. The null identifier is never mapped.
    pub fn lookup(&self, operator: &AccountId) -> Option<AccountId> {
        self.mappings.get(operator).copied()
    }

    /// Operators currently mapped to `primary`, sorted.
    pub fn operators_of(&self, primary: &AccountId) -> Vec<AccountId> {
        self.mappings
            .iter()
            .filter(|(_, p)| *p == primary)
            .map(|(op, _)| *op)
            .collect()
    }

    /// Number of mapped operators.
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Whether no operator is mapped.
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    fn ensure_mappable(&self, operator: &AccountId) -> Result<(), RegistryError> {
        if operator.is_zero() {
            return Err(RegistryError::ZeroAddress);
        }
        if let Some(primary) = self.lookup(operator) {
            return Err(RegistryError::OperatorAlreadyMapped {
                operator: *operator,
                primary,
            });
        }
        Ok(())
    }
}
