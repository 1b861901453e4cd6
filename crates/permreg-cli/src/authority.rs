//! # Root and Primary Subcommands
//!
//! - `init` — create a registry rooted at the caller.
//! - `root show` / `root rotate` — inspect or hand over the root authority.
//! - `primary add` / `primary rotate` / `primary list` / `primary show`.

use anyhow::Result;
use clap::{Args, Subcommand};
use permreg_core::{AccountId, Caller};

use crate::state::StateFile;

/// Arguments for `permreg init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Account that becomes the root authority.
    #[arg(long)]
    pub caller: AccountId,
}

/// Arguments for `permreg root`.
#[derive(Args, Debug)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: RootCommand,
}

/// Root authority subcommands.
#[derive(Subcommand, Debug)]
pub enum RootCommand {
    /// Print the current root authority.
    Show,
    /// Hand the root authority to another account.
    Rotate {
        /// Authenticated caller (must be the current root).
        #[arg(long)]
        caller: AccountId,
        /// The incoming root authority.
        #[arg(long)]
        new_root: AccountId,
    },
}

/// Arguments for `permreg primary`.
#[derive(Args, Debug)]
pub struct PrimaryArgs {
    #[command(subcommand)]
    pub command: PrimaryCommand,
}

/// Primary account subcommands.
#[derive(Subcommand, Debug)]
pub enum PrimaryCommand {
    /// Register a primary or overwrite its keys (root only).
    Add {
        #[arg(long)]
        caller: AccountId,
        #[arg(long)]
        primary: AccountId,
        /// Key that manages the primary's operators.
        #[arg(long)]
        permissioning: AccountId,
        /// Single-use key that replaces both keys.
        #[arg(long)]
        rotation: AccountId,
    },
    /// Replace both keys using the current rotation key.
    Rotate {
        /// Authenticated caller (must be the current rotation key).
        #[arg(long)]
        caller: AccountId,
        #[arg(long)]
        primary: AccountId,
        #[arg(long)]
        new_permissioning: AccountId,
        #[arg(long)]
        new_rotation: AccountId,
    },
    /// List primaries in registration order.
    List,
    /// Show a primary's keys, operators and scopes.
    Show {
        #[arg(long)]
        primary: AccountId,
    },
}

/// Execute `permreg init`.
pub fn run_init(args: &InitArgs, state: &StateFile) -> Result<u8> {
    let registry = state.create(&Caller::authenticated(args.caller))?;
    println!(
        "OK: initialized registry at {} with root {}",
        state.path().display(),
        registry.root_authority()
    );
    Ok(0)
}

/// Execute `permreg root`.
pub fn run_root(args: &RootArgs, state: &StateFile) -> Result<u8> {
    match &args.command {
        RootCommand::Show => {
            println!("{}", state.open()?.root_authority());
            Ok(0)
        }
        RootCommand::Rotate { caller, new_root } => {
            state.mutate(|reg| reg.rotate_vnf(&Caller::authenticated(*caller), *new_root))
        }
    }
}

/// Execute `permreg primary`.
pub fn run_primary(args: &PrimaryArgs, state: &StateFile) -> Result<u8> {
    match &args.command {
        PrimaryCommand::Add { caller, primary, permissioning, rotation } => state.mutate(|reg| {
            reg.add_primary(&Caller::authenticated(*caller), *primary, *permissioning, *rotation)
        }),
        PrimaryCommand::Rotate { caller, primary, new_permissioning, new_rotation } => state
            .mutate(|reg| {
                reg.rotate_permissioning(
                    &Caller::authenticated(*caller),
                    *primary,
                    *new_permissioning,
                    *new_rotation,
                )
            }),
        PrimaryCommand::List => {
            let primaries = state.open()?.get_primaries();
            if primaries.is_empty() {
                println!("No primaries registered.");
            } else {
                println!("Primaries ({}):", primaries.len());
                for primary in primaries {
                    println!("  {primary}");
                }
            }
            Ok(0)
        }
        PrimaryCommand::Show { primary } => cmd_show_primary(state, primary),
    }
}

fn cmd_show_primary(state: &StateFile, primary: &AccountId) -> Result<u8> {
    let registry = state.open()?;
    let Some(keys) = registry.primary_keys(primary) else {
        anyhow::bail!("primary not registered: {primary}");
    };
    println!("Primary: {primary}");
    println!("  Permissioning key: {}", keys.permissioning);
    println!("  Rotation key:      {}", keys.rotation);
    let operators = registry.operators_of(primary);
    println!("  Operators ({}):", operators.len());
    for operator in operators {
        println!("    {operator}");
    }
    let scopes = registry.scopes_of(primary);
    println!("  Scopes ({}):", scopes.len());
    for scope in scopes {
        println!("    {scope}");
    }
    Ok(0)
}
