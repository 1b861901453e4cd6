//! # Scopes
//!
//! Scopes are unstructured permission strings granted to accounts. There is
//! no hierarchy and no wildcarding: `"transactions:write"` and
//! `"transactions"` are unrelated strings.

use std::collections::BTreeSet;

/// The scope a primary must hold for its operators to pass the default
/// operator check.
pub const TRANSACTIONS_WRITE: &str = "transactions:write";

/// Prefix of every failure string the registry reports.
///
/// Downstream subsystems pattern-match on the full text, for example
/// `"Permissions: caller is not VNF"`.
pub const ROLE: &str = "Permissions";

/// An account's granted scopes, iterated in sorted order.
pub type ScopeSet = BTreeSet<String>;
