// Shared helper functions used across CLI command handlers.

use std::path::Path;

use miette::IntoDiagnostic;

use crate::OutputFormat;

pub(crate) fn parse_output_format(raw: &str) -> OutputFormat {
    match raw {
        "text" => OutputFormat::Text,
        "json" => OutputFormat::Json,
        other => {
            eprintln!("Unknown output format: {other}. Use 'text' or 'json'.");
            std::process::exit(1);
        }
    }
}

/// Read a litmus source file, reporting IO failures as diagnostics.
pub(crate) fn read_source(path: &Path) -> miette::Result<String> {
    std::fs::read_to_string(path).into_diagnostic()
}
