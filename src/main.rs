//! Coffer - inspect encrypted vault files without revealing data.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use coffer::cli::output;
use coffer::cli::{execute, Cli};

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env("COFFER_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("coffer=debug")
        } else {
            EnvFilter::new("coffer=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).without_time())
        .init();

    if let Err(e) = execute(cli.command) {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
