//! CLI argument definitions: top-level `Cli` struct and `Commands` enum.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub(crate) const CLI_LONG_ABOUT: &str =
    "Converter from herd-style litmus tests to solver-ready declarative records.\n\n\
    Typical flow:\n  \
    1. orchil check tests/MP.litmus\n  \
    2. orchil convert tests/MP.litmus --out-dir records/\n\n\
    `convert` writes one record per test; `check` validates files without\n\
    writing anything; `parse` prints the AST of a single test.";

#[derive(Parser)]
#[command(name = "orchil")]
#[command(about = "Convert litmus tests to solver-ready declarative records")]
#[command(long_about = CLI_LONG_ABOUT)]
#[command(version)]
pub(crate) struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence when set)
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    pub(crate) verbose: bool,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Convert litmus tests to declarative records
    #[command(display_order = 10)]
    Convert {
        /// Paths to .litmus test files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Directory to write records to (default: next to each input)
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Print records to stdout instead of writing files
        #[arg(long, default_value_t = false)]
        stdout: bool,

        /// Continue with the remaining files when one fails
        #[arg(long, default_value_t = false)]
        keep_going: bool,
    },

    /// Validate litmus tests without writing records
    #[command(display_order = 20)]
    Check {
        /// Paths to .litmus test files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output format: text | json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Parse a litmus test and print its AST
    #[command(display_order = 30)]
    Parse {
        /// Path to the .litmus test file
        file: PathBuf,
    },
}
