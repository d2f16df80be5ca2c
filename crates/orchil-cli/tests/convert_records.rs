//! End-to-end tests for the `convert` subcommand.

use std::path::PathBuf;
use std::process::Command;

fn workspace_root() -> PathBuf {
    // CARGO_MANIFEST_DIR for orchil-cli is crates/orchil-cli;
    // workspace root is two levels up.
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf()
}

fn run_convert(args: &[&str]) -> std::process::Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_orchil"));
    cmd.arg("convert");
    for arg in args {
        cmd.arg(arg);
    }
    cmd.current_dir(workspace_root())
        .output()
        .expect("failed to execute orchil convert")
}

const BAD_MACRO: &str = r#"AArch64 bad-macro
{ 0:X1=x; }
 P0        ;
 LOCK(x)   ;
exists (0:X0=0)
"#;

#[test]
fn convert_writes_record_into_out_dir() {
    let out_dir = std::env::temp_dir().join(format!("orchil_convert_e2e_{}", std::process::id()));

    let output = run_convert(&["litmus/MP.litmus", "--out-dir", out_dir.to_str().unwrap()]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        output.status.success(),
        "convert should succeed; stderr: {stderr}"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Wrote "),
        "convert should report the output path: {stdout}"
    );

    let record = std::fs::read_to_string(out_dir.join("MP.toml")).unwrap();
    assert!(record.starts_with("arch = \"AArch64\"\n"));
    assert!(record.contains("name = \"MP\"\n"));
    assert!(record.contains("expect = \"sat\"\n"));

    let _ = std::fs::remove_dir_all(&out_dir);
}

#[test]
fn convert_stdout_prints_the_record() {
    let output = run_convert(&["litmus/MP.litmus", "--stdout"]);
    assert!(output.status.success(), "convert --stdout should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("arch = \"AArch64\"\n"));
    assert!(stdout.contains("\n[final]\n"));
    assert!(
        !stdout.contains("Wrote "),
        "--stdout must not write record files"
    );
}

#[test]
fn convert_failure_reports_the_diagnostic() {
    let scratch = std::env::temp_dir().join(format!("orchil_convert_bad_{}", std::process::id()));
    std::fs::create_dir_all(&scratch).unwrap();
    let bad = scratch.join("bad-macro.litmus");
    std::fs::write(&bad, BAD_MACRO).unwrap();

    let output = run_convert(&[bad.to_str().unwrap()]);
    assert_eq!(
        output.status.code(),
        Some(1),
        "a conversion failure without --keep-going should abort"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Unsupported instruction 'LOCK(x)' in program listing"),
        "stderr should carry the conversion diagnostic: {stderr}"
    );

    let _ = std::fs::remove_dir_all(&scratch);
}

#[test]
fn keep_going_converts_remaining_files_and_exits_2() {
    let scratch =
        std::env::temp_dir().join(format!("orchil_convert_keep_going_{}", std::process::id()));
    std::fs::create_dir_all(&scratch).unwrap();
    let bad = scratch.join("bad-macro.litmus");
    std::fs::write(&bad, BAD_MACRO).unwrap();
    let out_dir = scratch.join("records");

    let output = run_convert(&[
        bad.to_str().unwrap(),
        "litmus/MP.litmus",
        "--out-dir",
        out_dir.to_str().unwrap(),
        "--keep-going",
    ]);
    assert_eq!(
        output.status.code(),
        Some(2),
        "partial failure under --keep-going should exit 2"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("1 of 2 files failed to convert"),
        "stderr should summarize the failures: {stderr}"
    );
    assert!(
        out_dir.join("MP.toml").exists(),
        "the healthy file should still be converted"
    );

    let _ = std::fs::remove_dir_all(&scratch);
}
