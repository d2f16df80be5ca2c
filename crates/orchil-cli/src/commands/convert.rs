// Command handler for: Convert
//
// Reads litmus test files, converts each one to a declarative record,
// and writes the records next to the inputs or into --out-dir.

use std::path::{Path, PathBuf};

use miette::IntoDiagnostic;

use orchil_ir::convert::convert_with_source;
use orchil_ir::emit::emit_record;
use orchil_litmus::parse;

use super::helpers::read_source;

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub(crate) fn run_convert_command(
    files: Vec<PathBuf>,
    out_dir: Option<PathBuf>,
    stdout: bool,
    keep_going: bool,
) -> miette::Result<()> {
    if let Some(dir) = &out_dir {
        std::fs::create_dir_all(dir).into_diagnostic()?;
    }

    let mut failures = 0usize;
    for file in &files {
        match convert_one(file, out_dir.as_deref(), stdout) {
            Ok(()) => {}
            Err(err) if keep_going => {
                eprintln!("{err:?}");
                failures += 1;
            }
            Err(err) => return Err(err),
        }
    }

    if failures > 0 {
        eprintln!("{failures} of {} files failed to convert", files.len());
        std::process::exit(2);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Per-file conversion
// ---------------------------------------------------------------------------

fn convert_one(file: &Path, out_dir: Option<&Path>, stdout: bool) -> miette::Result<()> {
    let filename = file.display().to_string();
    tracing::debug!(file = %filename, "Converting litmus test");

    let source = read_source(file)?;
    let test = parse(&source, &filename)?;
    let converted = convert_with_source(&test, &source, &filename)?;
    let record = emit_record(&converted);

    if stdout {
        print!("{record}");
        return Ok(());
    }

    let out_path = record_path(file, out_dir);
    std::fs::write(&out_path, record).into_diagnostic()?;
    println!("Wrote {}", out_path.display());
    Ok(())
}

/// Output path for a converted record: the input name with a `.toml`
/// extension, relocated into `out_dir` when one was given.
fn record_path(file: &Path, out_dir: Option<&Path>) -> PathBuf {
    match out_dir {
        Some(dir) => {
            let name = file.file_name().unwrap_or(file.as_os_str());
            dir.join(name).with_extension("toml")
        }
        None => file.with_extension("toml"),
    }
}
