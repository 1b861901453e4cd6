//! # permreg-cli — Permissions Registry Administration
//!
//! Provides the `permreg` command-line interface over a registry snapshot
//! file.
//!
//! ## Subcommands
//!
//! - `permreg init` — create a registry rooted at the caller.
//! - `permreg root` — show or rotate the root authority.
//! - `permreg primary` — register, rotate, list and inspect primaries.
//! - `permreg operator` — manage operator keys.
//! - `permreg scope` — grant, revoke and query scopes.
//! - `permreg check` — run operator authorization checks.
//! - `permreg delegation` — sign and verify signed delegations.
//! - `permreg log` — print the mutation log.
//!
//! ```bash
//! permreg init --caller 0xa0a0…
//! permreg primary add --caller 0xa0a0… --primary 0x01… --permissioning 0x02… --rotation 0x03…
//! permreg check operator --operator 0x10…
//! ```
//!
//! ## Crate Policy
//!
//! - Handlers parse arguments and delegate to `permreg-registry`; no
//!   authorization logic lives here.
//! - A registry rejection exits with code 2 and prints the registry's exact
//!   failure string, so scripts can match on it.
//! - `--caller` is not authenticated. Whoever can write the snapshot file
//!   can act as any account, so the file must be protected by file-system
//!   permissions. Concurrent writers are serialized by `<state>.lock`.

pub mod authority;
pub mod check;
pub mod config;
pub mod delegation;
pub mod log;
pub mod operator;
pub mod scope;
pub mod state;
