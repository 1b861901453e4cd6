//! # Log Subcommand
//!
//! Prints the committed mutation log, optionally only the records after a
//! given sequence number.

use anyhow::Result;
use clap::Args;
use permreg_registry::MutationRecord;

use crate::state::StateFile;

/// Arguments for `permreg log`.
#[derive(Args, Debug)]
pub struct LogArgs {
    /// Only print records with a sequence greater than this.
    #[arg(long, default_value_t = 0)]
    pub since: u64,
    /// Print one JSON object per record.
    #[arg(long)]
    pub json: bool,
}

/// Execute `permreg log`.
pub fn run_log(args: &LogArgs, state: &StateFile) -> Result<u8> {
    let records = state.open()?.log_since(args.since);
    for record in &records {
        if args.json {
            println!("{}", serde_json::to_string(record)?);
        } else {
            println!("{}", render(record));
        }
    }
    Ok(0)
}

fn render(record: &MutationRecord) -> String {
    format!(
        "#{:<4} {} {:<22} by {}",
        record.sequence,
        record.recorded_at,
        record.mutation.name(),
        record.caller
    )
}
