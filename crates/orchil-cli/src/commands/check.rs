// Command handler for: Check
//
// Validates litmus test files without writing records: parses each file,
// runs the conversion, and reports per-file status as text or JSON.

use std::path::PathBuf;

use miette::IntoDiagnostic;
use serde::Serialize;

use orchil_ir::convert::convert;
use orchil_litmus::parse_with_diagnostics;

use super::helpers::{parse_output_format, read_source};
use crate::OutputFormat;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct CheckIssue {
    pub(crate) severity: String,
    pub(crate) code: String,
    pub(crate) message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) suggestion: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct FileCheck {
    pub(crate) file: String,
    pub(crate) status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) arch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) threads: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) expect: Option<String>,
    pub(crate) issues: Vec<CheckIssue>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CheckReport {
    pub(crate) schema_version: u32,
    pub(crate) files: Vec<FileCheck>,
}

fn check_issue(
    severity: &str,
    code: &str,
    message: String,
    suggestion: Option<String>,
) -> CheckIssue {
    CheckIssue {
        severity: severity.to_string(),
        code: code.to_string(),
        message,
        suggestion,
    }
}

fn failed_file(file: String, issues: Vec<CheckIssue>) -> FileCheck {
    FileCheck {
        file,
        status: "error".to_string(),
        arch: None,
        name: None,
        threads: None,
        expect: None,
        issues,
    }
}

// ---------------------------------------------------------------------------
// Per-file check
// ---------------------------------------------------------------------------

pub(crate) fn check_litmus_file(source: &str, filename: &str) -> FileCheck {
    let mut issues: Vec<CheckIssue> = Vec::new();
    let (test, parse_diags) = match parse_with_diagnostics(source, filename) {
        Ok(pair) => pair,
        Err(e) => {
            issues.push(check_issue("error", "parse_error", e.to_string(), None));
            return failed_file(filename.to_string(), issues);
        }
    };
    for diag in parse_diags {
        issues.push(check_issue("warn", &diag.code, diag.message, diag.suggestion));
    }

    match convert(&test) {
        Ok(converted) => FileCheck {
            file: filename.to_string(),
            status: "ok".to_string(),
            arch: Some(converted.arch.clone()),
            name: Some(converted.name.clone()),
            threads: Some(converted.threads.len()),
            expect: Some(converted.final_state.expect.to_string()),
            issues,
        },
        Err(e) => {
            issues.push(check_issue("error", "convert_error", e.to_string(), None));
            // The parse succeeded, so the test identity is still known.
            FileCheck {
                file: filename.to_string(),
                status: "error".to_string(),
                arch: Some(test.arch),
                name: Some(test.name),
                threads: None,
                expect: None,
                issues,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

pub(crate) fn render_check_text(report: &CheckReport) -> String {
    let mut out = String::new();
    let failed = report
        .files
        .iter()
        .filter(|f| f.status == "error")
        .count();
    out.push_str("CHECK REPORT\n");
    out.push_str(&format!(
        "Summary: {} file(s), {} failed\n",
        report.files.len(),
        failed
    ));
    for file in &report.files {
        if file.status == "ok" {
            out.push_str(&format!(
                "- OK {} ({} {}, {} thread(s), expect {})\n",
                file.file,
                file.arch.as_deref().unwrap_or("?"),
                file.name.as_deref().unwrap_or("?"),
                file.threads.unwrap_or(0),
                file.expect.as_deref().unwrap_or("?"),
            ));
        } else {
            out.push_str(&format!("- FAIL {}\n", file.file));
        }
        for issue in &file.issues {
            out.push_str(&format!(
                "    [{}] {}: {}\n",
                issue.severity.to_uppercase(),
                issue.code,
                issue.message
            ));
            if let Some(suggestion) = &issue.suggestion {
                out.push_str(&format!("      suggestion: {suggestion}\n"));
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Command handler
// ---------------------------------------------------------------------------

pub(crate) fn run_check_command(files: Vec<PathBuf>, format: String) -> miette::Result<()> {
    let output_format = parse_output_format(&format);

    let mut checks = Vec::new();
    for file in &files {
        let filename = file.display().to_string();
        let entry = match read_source(file) {
            Ok(source) => check_litmus_file(&source, &filename),
            Err(err) => failed_file(
                filename,
                vec![check_issue("error", "io_error", format!("{err}"), None)],
            ),
        };
        checks.push(entry);
    }
    let report = CheckReport {
        schema_version: 1,
        files: checks,
    };

    match output_format {
        OutputFormat::Text => println!("{}", render_check_text(&report)),
        OutputFormat::Json => {
            let report_json = serde_json::to_string_pretty(&report).into_diagnostic()?;
            println!("{report_json}");
        }
    }

    if report.files.iter().any(|f| f.status == "error") {
        std::process::exit(2);
    }

    Ok(())
}
