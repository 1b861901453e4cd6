//! # Check Subcommands
//!
//! Run the same operator checks collaborators call, printing the resolved
//! primary on success. A failing check exits with the rejection code and
//! the registry's exact failure string on stderr.

use anyhow::Result;
use clap::{Args, Subcommand};
use permreg_core::AccountId;
use permreg_registry::{OperatorAuthorization, Requirement};

use crate::state::{rejected, StateFile};

/// Arguments for `permreg check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(subcommand)]
    pub command: CheckCommand,
}

/// Check subcommands.
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Require the operator's primary to hold `transactions:write`.
    Operator {
        #[arg(long)]
        operator: AccountId,
    },
    /// Require the operator's primary to hold a scope.
    Scope {
        #[arg(long)]
        operator: AccountId,
        #[arg(long)]
        scope: String,
    },
    /// Require the operator's primary to hold a permission.
    Permission {
        #[arg(long)]
        operator: AccountId,
        #[arg(long)]
        permission: String,
    },
}

impl CheckCommand {
    fn split(&self) -> (AccountId, Requirement) {
        match self {
            Self::Operator { operator } => (*operator, Requirement::DefaultScope),
            Self::Scope { operator, scope } => (*operator, Requirement::Scope(scope.clone())),
            Self::Permission { operator, permission } => {
                (*operator, Requirement::Permission(permission.clone()))
            }
        }
    }
}

/// Execute `permreg check`.
pub fn run_check(args: &CheckArgs, state: &StateFile) -> Result<u8> {
    let (operator, requirement) = args.command.split();
    let registry = state.open()?;
    match registry.check_requirement(&operator, &requirement) {
        Ok(primary) => {
            println!("OK: {operator} operates for {primary} ({requirement})");
            Ok(0)
        }
        Err(err) => Ok(rejected(&err)),
    }
}
