use miette::Diagnostic;
use thiserror::Error;

use crate::ast::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseDiagnosticSeverity {
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    pub code: String,
    pub severity: ParseDiagnosticSeverity,
    pub message: String,
    pub suggestion: Option<String>,
    pub span: Option<Span>,
}

#[derive(Debug, Error, Diagnostic)]
pub enum ParseError {
    #[error("Syntax error: {message}")]
    #[diagnostic(code(orchil::parse::syntax))]
    Syntax {
        message: String,
        #[label("here")]
        span: miette::SourceSpan,
        #[source_code]
        src: miette::NamedSource<String>,
    },

    #[error("Program row has {found} cells but {expected} threads are declared")]
    #[diagnostic(
        code(orchil::parse::row_width),
        help("every program row needs one `|`-separated cell per thread")
    )]
    RowWidth {
        expected: usize,
        found: usize,
        #[label("this row")]
        span: miette::SourceSpan,
        #[source_code]
        src: miette::NamedSource<String>,
    },

    #[error("Duplicate thread P{id}")]
    #[diagnostic(code(orchil::parse::duplicate_thread))]
    DuplicateThread {
        id: usize,
        #[label("already declared")]
        span: miette::SourceSpan,
        #[source_code]
        src: miette::NamedSource<String>,
    },

    #[error("Invalid thread id '{text}'")]
    #[diagnostic(code(orchil::parse::thread_id))]
    InvalidThreadId {
        text: String,
        #[label("not a valid thread id")]
        span: miette::SourceSpan,
        #[source_code]
        src: miette::NamedSource<String>,
    },
}

impl ParseError {
    pub fn syntax(message: impl Into<String>, span: Span, source: &str, filename: &str) -> Self {
        ParseError::Syntax {
            message: message.into(),
            span: (span.start, span.end - span.start).into(),
            src: miette::NamedSource::new(filename, source.to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---------------------------------------------------------------
    // ParseDiagnosticSeverity
    // ---------------------------------------------------------------

    #[test]
    fn parse_diagnostic_severity_warning_variant() {
        let sev = ParseDiagnosticSeverity::Warning;
        assert_eq!(sev, ParseDiagnosticSeverity::Warning);
    }

    // ---------------------------------------------------------------
    // ParseDiagnostic construction and fields
    // ---------------------------------------------------------------

    #[test]
    fn parse_diagnostic_construction_all_fields() {
        let diag = ParseDiagnostic {
            code: "W001".into(),
            severity: ParseDiagnosticSeverity::Warning,
            message: "thread ids are not contiguous".into(),
            suggestion: Some("renumber the columns".into()),
            span: Some(Span::new(10, 20)),
        };
        assert_eq!(diag.code, "W001");
        assert_eq!(diag.severity, ParseDiagnosticSeverity::Warning);
        assert_eq!(diag.message, "thread ids are not contiguous");
        assert_eq!(diag.suggestion, Some("renumber the columns".into()));
        assert_eq!(diag.span, Some(Span::new(10, 20)));
    }

    #[test]
    fn parse_diagnostic_optional_fields_none() {
        let diag = ParseDiagnostic {
            code: "W002".into(),
            severity: ParseDiagnosticSeverity::Warning,
            message: "something".into(),
            suggestion: None,
            span: None,
        };
        assert!(diag.suggestion.is_none());
        assert!(diag.span.is_none());
    }

    // ---------------------------------------------------------------
    // ParseError Display messages
    // ---------------------------------------------------------------

    #[test]
    fn display_syntax_error() {
        let err = ParseError::Syntax {
            message: "unexpected EOF".into(),
            span: (0, 5).into(),
            src: miette::NamedSource::new("test.litmus", "hello".to_owned()),
        };
        assert_eq!(err.to_string(), "Syntax error: unexpected EOF");
    }

    #[test]
    fn display_row_width_error() {
        let err = ParseError::RowWidth {
            expected: 2,
            found: 3,
            span: (0, 10).into(),
            src: miette::NamedSource::new("test.litmus", "a | b | c ;".to_owned()),
        };
        assert_eq!(
            err.to_string(),
            "Program row has 3 cells but 2 threads are declared"
        );
    }

    #[test]
    fn display_duplicate_thread_error() {
        let err = ParseError::DuplicateThread {
            id: 1,
            span: (5, 2).into(),
            src: miette::NamedSource::new("test.litmus", "P1 | P1 ;".to_owned()),
        };
        assert_eq!(err.to_string(), "Duplicate thread P1");
    }

    #[test]
    fn display_invalid_thread_id_error() {
        let err = ParseError::InvalidThreadId {
            text: "99999999999999999999999".into(),
            span: (0, 23).into(),
            src: miette::NamedSource::new("test.litmus", "".to_owned()),
        };
        assert_eq!(
            err.to_string(),
            "Invalid thread id '99999999999999999999999'"
        );
    }

    // ---------------------------------------------------------------
    // ParseError::syntax() convenience constructor
    // ---------------------------------------------------------------

    #[test]
    fn syntax_convenience_constructor() {
        let span = Span::new(5, 10);
        let err = ParseError::syntax("bad token", span, "some source code", "file.litmus");
        assert_eq!(err.to_string(), "Syntax error: bad token");
        match &err {
            ParseError::Syntax { message, span: s, .. } => {
                assert_eq!(message, "bad token");
                assert_eq!(s.offset(), 5);
                assert_eq!(s.len(), 5);
            }
            _ => panic!("expected Syntax variant"),
        }
    }
}
