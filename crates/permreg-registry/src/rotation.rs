//! # Rotation Controller
//!
//! Each primary holds a permissioning key and a rotation key. The rotation
//! key can replace both, and using it consumes it: the call must install a
//! fresh rotation key alongside the new permissioning key, so the same
//! rotation key value can authorize at most one rotation.
//!
//! ```text
//! (K1, R1) ──rotate by R1──▶ (K2, R2) ──rotate by R2──▶ (K3, R3) ...
//!              ▲
//!              └── a second use of R1 fails with NotRotationKey
//! ```
//!
//! There is no cap on the number of rotations. Installing the same value
//! again as the new rotation key re-arms it; that is the caller's choice.

use permreg_core::{AccountId, Caller};
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// The two keys a primary account controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrimaryKeys {
    /// Manages the primary's operators.
    pub permissioning: AccountId,
    /// Replaces both keys, once.
    pub rotation: AccountId,
}

impl PrimaryKeys {
    /// Keys as registered by the root authority.
    pub fn new(permissioning: AccountId, rotation: AccountId) -> Self {
        Self { permissioning, rotation }
    }

    /// Require `caller` to be the current permissioning key.
    pub fn require_permissioning(&self, caller: &Caller) -> Result<(), RegistryError> {
        if caller.is(&self.permissioning) {
            Ok(())
        } else {
            Err(RegistryError::NotPermissioningKey)
        }
    }

    /// Require `caller` to be the current rotation key.
    pub fn require_rotation(&self, caller: &Caller) -> Result<(), RegistryError> {
        if caller.is(&self.rotation) {
            Ok(())
        } else {
            Err(RegistryError::NotRotationKey)
        }
    }
}

/// Outcome of a committed rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rotation {
    /// The keys before the rotation; `previous.rotation` is now spent.
    pub previous: PrimaryKeys,
    /// The keys now in force.
    pub current: PrimaryKeys,
}

/// Applies the single-use rotation rule to a primary's keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct RotationController;

impl RotationController {
    /// Replace both keys of `keys` if `caller` holds the current rotation key.
    ///
    /// `None` stands for an unregistered primary, whose rotation key no
    /// caller can hold. No validation is applied to the new keys.
    ///
    /// # Errors
    ///
    /// `NotRotationKey` if the primary is unregistered or `caller` is not
    /// its current rotation key. `keys` is untouched on error.
    pub fn rotate(
        keys: Option<&mut PrimaryKeys>,
        caller: &Caller,
        new_permissioning: AccountId,
        new_rotation: AccountId,
    ) -> Result<Rotation, RegistryError> {
        let keys = keys.ok_or(RegistryError::NotRotationKey)?;
        keys.require_rotation(caller)?;
        let previous = *keys;
        *keys = PrimaryKeys::new(new_permissioning, new_rotation);
        Ok(Rotation { previous, current: *keys })
    }
}
