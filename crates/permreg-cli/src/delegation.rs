//! # Delegation Subcommands
//!
//! - `sign` — sign the canonical payload for an account with a secret key
//!   file (hex-encoded 32-byte secp256k1 scalar).
//! - `verify` — what a relay does with a submitted `(payload, signature)`:
//!   recover the signer and run it through the operator checks.
//!
//! ## Security Invariant
//!
//! Secret keys are read from files, never from arguments, and are never
//! printed.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use permreg_core::{AccountId, CanonicalBytes};
use permreg_crypto::Secp256k1KeyPair;
use permreg_registry::{Requirement, SignedDelegation, SignedDelegationVerifier};

use crate::state::{rejected, StateFile};

/// Arguments for `permreg delegation`.
#[derive(Args, Debug)]
pub struct DelegationArgs {
    #[command(subcommand)]
    pub command: DelegationCommand,
}

/// Delegation subcommands.
#[derive(Subcommand, Debug)]
pub enum DelegationCommand {
    /// Sign the canonical payload for an account.
    Sign {
        /// Path to the secret key file (hex-encoded 32-byte scalar).
        #[arg(long)]
        key: PathBuf,
        /// Account to embed in the payload. Defaults to the key's own account.
        #[arg(long)]
        account: Option<AccountId>,
    },
    /// Recover the signer of a delegation and check it as an operator.
    Verify {
        /// Signature, hex-encoded `r || s || v`.
        #[arg(long)]
        signature: String,
        /// Account the payload embeds.
        #[arg(long, conflicts_with = "payload", required_unless_present = "payload")]
        account: Option<AccountId>,
        /// Raw payload, hex-encoded 32-byte word.
        #[arg(long)]
        payload: Option<String>,
        /// Require this scope instead of `transactions:write`.
        #[arg(long, conflicts_with = "permission")]
        scope: Option<String>,
        /// Require this permission instead of `transactions:write`.
        #[arg(long)]
        permission: Option<String>,
    },
}

/// Execute `permreg delegation`.
pub fn run_delegation(args: &DelegationArgs, state: &StateFile) -> Result<u8> {
    match &args.command {
        DelegationCommand::Sign { key, account } => cmd_sign(key, account.as_ref()),
        DelegationCommand::Verify { signature, account, payload, scope, permission } => {
            let payload = match (account, payload) {
                (Some(account), _) => CanonicalBytes::for_account(account),
                (None, Some(raw)) => parse_payload(raw)?,
                (None, None) => bail!("either --account or --payload is required"),
            };
            let requirement = match (scope, permission) {
                (Some(scope), _) => Requirement::Scope(scope.clone()),
                (None, Some(permission)) => Requirement::Permission(permission.clone()),
                (None, None) => Requirement::DefaultScope,
            };
            let signature = decode_hex(signature).context("invalid signature hex")?;
            cmd_verify(state, SignedDelegation::new(payload, signature), &requirement)
        }
    }
}

fn cmd_sign(key_path: &Path, account: Option<&AccountId>) -> Result<u8> {
    if !key_path.exists() {
        bail!("secret key file not found: {}", key_path.display());
    }
    let secret = std::fs::read_to_string(key_path)
        .with_context(|| format!("failed to read secret key: {}", key_path.display()))?;
    let keypair = Secp256k1KeyPair::from_hex(&secret).context("invalid secret key")?;

    let account = account.copied().unwrap_or_else(|| keypair.account());
    let payload = CanonicalBytes::for_account(&account);
    let signature = keypair.sign(&payload).context("signing failed")?;

    tracing::info!(signer = %keypair.account(), account = %account, "delegation signed");
    println!("signer:    {}", keypair.account());
    println!("payload:   0x{}", hex::encode(payload.as_bytes()));
    println!("signature: {}", signature.to_hex());
    Ok(0)
}

fn cmd_verify(
    state: &StateFile,
    delegation: SignedDelegation,
    requirement: &Requirement,
) -> Result<u8> {
    let registry = state.open()?;
    match SignedDelegationVerifier::secp256k1().verify_and_resolve(
        &registry,
        delegation,
        requirement,
    ) {
        Ok(resolved) => {
            println!(
                "OK: {} operates for {} ({requirement})",
                resolved.signer, resolved.primary
            );
            Ok(0)
        }
        Err(err) => Ok(rejected(&err)),
    }
}

fn decode_hex(input: &str) -> Result<Vec<u8>> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    Ok(hex::decode(digits)?)
}

fn parse_payload(raw: &str) -> Result<CanonicalBytes> {
    let bytes = decode_hex(raw).context("invalid payload hex")?;
    match CanonicalBytes::parse_account_payload(&bytes) {
        Some((payload, _)) => Ok(payload),
        None => bail!("payload must be a 32-byte word with 12 leading zero bytes"),
    }
}
