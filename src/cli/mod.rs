//! Command-line interface.

pub mod inspect;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::error::Result;

/// Coffer - inspect encrypted vault files without revealing data.
#[derive(Parser)]
#[command(
    name = "coffer",
    about = "Inspect encrypted vault files without revealing data",
    version
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Inspect a vault file's metadata and document IDs (never decrypts)
    Inspect {
        /// Path to the vault file
        vault_path: PathBuf,
        /// Max number of document IDs to display
        #[arg(short = 'n', long, default_value_t = 10)]
        max_ids: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Suppress headers
        #[arg(short, long)]
        quiet: bool,
    },
}

/// Dispatch a parsed command.
pub fn execute(command: Command) -> Result<()> {
    match command {
        Command::Inspect {
            vault_path,
            max_ids,
            json,
            quiet,
        } => inspect::execute(&vault_path, max_ids, json, quiet),
    }
}
