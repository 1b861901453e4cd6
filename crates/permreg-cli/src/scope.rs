//! # Scope Subcommands
//!
//! Scope grants are written by the root authority and read by anyone.

use anyhow::Result;
use clap::{Args, Subcommand};
use permreg_core::{AccountId, Caller};

use crate::state::StateFile;

/// Arguments for `permreg scope`.
#[derive(Args, Debug)]
pub struct ScopeArgs {
    #[command(subcommand)]
    pub command: ScopeCommand,
}

/// Scope subcommands.
#[derive(Subcommand, Debug)]
pub enum ScopeCommand {
    /// Grant a scope to an account.
    Add {
        /// Authenticated caller (must be the root authority).
        #[arg(long)]
        caller: AccountId,
        #[arg(long)]
        address: AccountId,
        #[arg(long)]
        scope: String,
    },
    /// Revoke a scope from an account.
    Remove {
        #[arg(long)]
        caller: AccountId,
        #[arg(long)]
        address: AccountId,
        #[arg(long)]
        scope: String,
    },
    /// Grant then revoke scopes in one mutation.
    Update {
        #[arg(long)]
        caller: AccountId,
        #[arg(long)]
        address: AccountId,
        /// Scope to grant. Repeatable.
        #[arg(long = "add", value_name = "SCOPE")]
        add: Vec<String>,
        /// Scope to revoke, applied after all grants. Repeatable.
        #[arg(long = "remove", value_name = "SCOPE")]
        remove: Vec<String>,
    },
    /// Exit 0 if the account holds the scope, 3 otherwise.
    Check {
        #[arg(long)]
        address: AccountId,
        #[arg(long)]
        scope: String,
    },
    /// List an account's scopes.
    List {
        #[arg(long)]
        address: AccountId,
    },
}

/// Exit code of `scope check` when the scope is not held.
pub const EXIT_SCOPE_ABSENT: u8 = 3;

/// Execute `permreg scope`.
pub fn run_scope(args: &ScopeArgs, state: &StateFile) -> Result<u8> {
    match &args.command {
        ScopeCommand::Add { caller, address, scope } => state.mutate(|reg| {
            reg.add_address_scope(&Caller::authenticated(*caller), *address, scope.as_str())
        }),
        ScopeCommand::Remove { caller, address, scope } => state.mutate(|reg| {
            reg.remove_address_scope(&Caller::authenticated(*caller), *address, scope.as_str())
        }),
        ScopeCommand::Update { caller, address, add, remove } => state.mutate(|reg| {
            reg.update_address_scopes(
                &Caller::authenticated(*caller),
                *address,
                Some(add.clone()),
                Some(remove.clone()),
            )
        }),
        ScopeCommand::Check { address, scope } => {
            if state.open()?.check_address_scope(address, scope) {
                println!("OK: {address} holds {scope:?}");
                Ok(0)
            } else {
                println!("{address} does not hold {scope:?}");
                Ok(EXIT_SCOPE_ABSENT)
            }
        }
        ScopeCommand::List { address } => {
            let scopes = state.open()?.scopes_of(address);
            println!("Scopes of {address} ({}):", scopes.len());
            for scope in scopes {
                println!("  {scope}");
            }
            Ok(0)
        }
    }
}
