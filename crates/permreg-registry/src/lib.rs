//! # permreg-registry — Capability-Delegation Registry
//!
//! The authorization state every privileged action in the network is gated
//! on: credential revocation, coupon minting and burning, credential
//! metadata registration.
//!
//! ## Components
//!
//! - **ScopeStore** (`scope_store.rs`): account → unstructured scope strings.
//! - **OperatorDirectory** (`operators.rs`): operator → owning primary, at
//!   most one primary per operator.
//! - **RotationController** (`rotation.rs`): single-use rotation keys.
//! - **AuthorityRegistry** (`authority.rs`): root authority and primaries;
//!   composes the three above and enforces who may change what.
//! - **Checks** (`checker.rs`): the `OperatorAuthorization` trait.
//! - **SignedDelegationVerifier** (`delegation.rs`): recover a signer from
//!   a detached signature and check it as an operator.
//! - **Registry** (`registry.rs`): the shared, locked handle with the
//!   mutation log.
//! - **Snapshots** (`snapshot.rs`): sealed JSON persistence.
//!
//! ## Design
//!
//! There is no ambient sender. Every mutating operation takes an explicit
//! [`Caller`](permreg_core::Caller), and every failure is a
//! [`RegistryError`] whose `Display` text is the exact string downstream
//! subsystems match on.

pub mod authority;
pub mod checker;
pub mod delegation;
pub mod error;
pub mod mutation;
pub mod operators;
pub mod registry;
pub mod rotation;
pub mod scope_store;
pub mod snapshot;

pub use authority::AuthorityRegistry;
pub use checker::{OperatorAuthorization, Requirement};
pub use delegation::{ResolvedDelegation, SignedDelegation, SignedDelegationVerifier};
pub use error::{ErrorKind, RegistryError};
pub use mutation::{Mutation, MutationRecord};
pub use operators::OperatorDirectory;
pub use registry::Registry;
pub use rotation::{PrimaryKeys, Rotation, RotationController};
pub use scope_store::ScopeStore;
pub use snapshot::{RegistrySnapshot, SnapshotError, SNAPSHOT_FORMAT};
