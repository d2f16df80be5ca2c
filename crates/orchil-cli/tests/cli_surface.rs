//! Contract tests for the CLI surface: help text and the parse dump.

use std::path::PathBuf;
use std::process::Command;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf()
}

#[test]
fn help_lists_subcommands_in_workflow_order() {
    let output = Command::new(env!("CARGO_BIN_EXE_orchil"))
        .arg("--help")
        .output()
        .expect("failed to execute orchil --help");
    assert!(output.status.success(), "--help should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    // The long-about walkthrough also mentions the subcommands, so only
    // inspect the command list itself.
    let commands = stdout.find("Commands:").expect("help should list commands");
    let listing = &stdout[commands..];
    let convert = listing.find("convert").expect("help should list convert");
    let check = listing.find("check").expect("help should list check");
    let parse = listing.find("parse").expect("help should list parse");
    assert!(
        convert < check && check < parse,
        "subcommands must appear in workflow order"
    );
}

#[test]
fn long_help_shows_the_typical_flow() {
    let output = Command::new(env!("CARGO_BIN_EXE_orchil"))
        .arg("--help")
        .output()
        .expect("failed to execute orchil --help");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("orchil check tests/MP.litmus"),
        "long help should walk through the typical flow: {stdout}"
    );
}

#[test]
fn parse_dumps_the_ast() {
    let output = Command::new(env!("CARGO_BIN_EXE_orchil"))
        .arg("parse")
        .arg("litmus/MP.litmus")
        .current_dir(workspace_root())
        .output()
        .expect("failed to execute orchil parse");
    assert!(output.status.success(), "parse should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Test {"));
    assert!(stdout.contains("arch: \"AArch64\""));
}

#[test]
fn parse_error_exits_with_code_1() {
    let scratch = std::env::temp_dir().join(format!("orchil_parse_bad_{}", std::process::id()));
    std::fs::create_dir_all(&scratch).unwrap();
    let bad = scratch.join("garbage.litmus");
    std::fs::write(&bad, "this is not a litmus test\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_orchil"))
        .arg("parse")
        .arg(bad.to_str().unwrap())
        .output()
        .expect("failed to execute orchil parse");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Parse error:"), "got: {stderr}");

    let _ = std::fs::remove_dir_all(&scratch);
}
