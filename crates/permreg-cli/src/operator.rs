//! # Operator Subcommands
//!
//! Operator keys are managed by a primary's permissioning key.
//!
//! - `add` — map an operator to a primary.
//! - `remove` — clear an operator's mapping.
//! - `rotate` — swap one operator for another.
//! - `lookup` — print the primary an operator maps to.
//! - `list` — print the operators of a primary.

use anyhow::Result;
use clap::{Args, Subcommand};
use permreg_core::{AccountId, Caller};

use crate::state::StateFile;

/// Arguments for `permreg operator`.
#[derive(Args, Debug)]
pub struct OperatorArgs {
    #[command(subcommand)]
    pub command: OperatorCommand,
}

/// Operator subcommands.
#[derive(Subcommand, Debug)]
pub enum OperatorCommand {
    /// Map an operator to a primary.
    Add {
        /// Authenticated caller (must be the primary's permissioning key).
        #[arg(long)]
        caller: AccountId,
        #[arg(long)]
        primary: AccountId,
        #[arg(long)]
        operator: AccountId,
    },
    /// Clear an operator's mapping.
    Remove {
        #[arg(long)]
        caller: AccountId,
        #[arg(long)]
        primary: AccountId,
        #[arg(long)]
        operator: AccountId,
    },
    /// Replace an operator of a primary with a new one.
    Rotate {
        #[arg(long)]
        caller: AccountId,
        #[arg(long)]
        primary: AccountId,
        #[arg(long)]
        new_operator: AccountId,
        #[arg(long)]
        old_operator: AccountId,
    },
    /// Print the primary an operator maps to, or `none`.
    Lookup {
        #[arg(long)]
        operator: AccountId,
    },
    /// List the operators of a primary.
    List {
        #[arg(long)]
        primary: AccountId,
    },
}

/// Execute `permreg operator`.
pub fn run_operator(args: &OperatorArgs, state: &StateFile) -> Result<u8> {
    match &args.command {
        OperatorCommand::Add { caller, primary, operator } => state.mutate(|reg| {
            reg.add_operator_key(&Caller::authenticated(*caller), *primary, *operator)
        }),
        OperatorCommand::Remove { caller, primary, operator } => state.mutate(|reg| {
            reg.remove_operator_key(&Caller::authenticated(*caller), *primary, *operator)
        }),
        OperatorCommand::Rotate { caller, primary, new_operator, old_operator } => {
            state.mutate(|reg| {
                reg.rotate_operator_key(
                    &Caller::authenticated(*caller),
                    *primary,
                    *new_operator,
                    *old_operator,
                )
            })
        }
        OperatorCommand::Lookup { operator } => {
            match state.open()?.lookup_primary(operator) {
                Some(primary) => println!("{primary}"),
                None => println!("none"),
            }
            Ok(0)
        }
        OperatorCommand::List { primary } => {
            let operators = state.open()?.operators_of(primary);
            println!("Operators of {primary} ({}):", operators.len());
            for operator in operators {
                println!("  {operator}");
            }
            Ok(0)
        }
    }
}
