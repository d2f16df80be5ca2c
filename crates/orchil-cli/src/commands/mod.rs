// Command handler modules for the orchil CLI.
//
// Each submodule owns one subcommand and exposes a single
// `run_<name>_command` entry point called from main.rs.

pub(crate) mod check;
pub(crate) mod convert;
pub(crate) mod helpers;
pub(crate) mod parse;
