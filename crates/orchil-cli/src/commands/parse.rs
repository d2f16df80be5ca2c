// Command handler for: Parse
//
// Parses a litmus test file and dumps the AST for debugging.

use std::path::PathBuf;

use super::helpers::read_source;

pub(crate) fn run_parse_command(file: PathBuf) -> miette::Result<()> {
    let source = read_source(&file)?;
    let filename = file.display().to_string();

    match orchil_litmus::parse(&source, &filename) {
        Ok(test) => {
            println!("{:#?}", test);
        }
        Err(e) => {
            eprintln!("Parse error: {e}");
            std::process::exit(1);
        }
    }
    Ok(())
}
