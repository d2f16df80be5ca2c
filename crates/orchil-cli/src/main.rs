#![doc = include_str!("../README.md")]

mod cli;
mod commands;
mod types;

pub(crate) use types::OutputFormat;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Convert {
            files,
            out_dir,
            stdout,
            keep_going,
        } => {
            commands::convert::run_convert_command(files, out_dir, stdout, keep_going)?;
        }
        Commands::Check { files, format } => {
            commands::check::run_check_command(files, format)?;
        }
        Commands::Parse { file } => {
            commands::parse::run_parse_command(file)?;
        }
    }

    Ok(())
}
