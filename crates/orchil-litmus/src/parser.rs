#![allow(clippy::result_large_err)]

use pest::Parser;
use pest_derive::Parser;

use crate::ast::*;
use crate::errors::{ParseDiagnostic, ParseDiagnosticSeverity, ParseError};

#[derive(Parser)]
#[grammar = "grammar.pest"]
struct LitmusParser;

type Pair<'a> = pest::iterators::Pair<'a, Rule>;

fn span_from(pair: &Pair<'_>) -> Span {
    let s = pair.as_span();
    Span::new(s.start(), s.end())
}

fn source_span(span: Span) -> miette::SourceSpan {
    (span.start, span.end - span.start).into()
}

/// Parse a litmus source file into an AST Test.
pub fn parse(source: &str, filename: &str) -> Result<Test, ParseError> {
    let (test, _) = parse_with_diagnostics(source, filename)?;
    Ok(test)
}

/// Parse a litmus source file into an AST Test and emit parser diagnostics.
pub fn parse_with_diagnostics(
    source: &str,
    filename: &str,
) -> Result<(Test, Vec<ParseDiagnostic>), ParseError> {
    let pairs = LitmusParser::parse(Rule::test_file, source).map_err(|e| {
        let (start, end) = match e.location {
            pest::error::InputLocation::Pos(p) => (p, p + 1),
            pest::error::InputLocation::Span((s, e)) => (s, e),
        };
        ParseError::syntax(format!("{e}"), Span::new(start, end), source, filename)
    })?;

    let file_pair = pairs.into_iter().next().unwrap();
    let test = parse_test(file_pair, source, filename)?;
    let diagnostics = collect_parser_diagnostics(&test);
    Ok((test, diagnostics))
}

fn collect_parser_diagnostics(test: &Test) -> Vec<ParseDiagnostic> {
    let mut diagnostics = Vec::new();

    let mut ids: Vec<usize> = test.threads.iter().map(|t| t.id).collect();
    ids.sort_unstable();
    if !ids.iter().copied().eq(0..test.threads.len()) {
        diagnostics.push(ParseDiagnostic {
            code: "non_contiguous_thread_ids".into(),
            severity: ParseDiagnosticSeverity::Warning,
            message: format!(
                "Thread ids {ids:?} do not form the contiguous range P0..P{}",
                test.threads.len().saturating_sub(1)
            ),
            suggestion: Some("renumber the program columns starting from P0".into()),
            span: test.threads.first().map(|t| t.span),
        });
    }

    let has_code = test
        .threads
        .iter()
        .any(|t| t.code.iter().any(|c| !matches!(c.node, Pseudo::Nop)));
    if !test.threads.is_empty() && !has_code {
        diagnostics.push(ParseDiagnostic {
            code: "empty_program".into(),
            severity: ParseDiagnosticSeverity::Warning,
            message: "Program section contains no instructions".into(),
            suggestion: None,
            span: None,
        });
    }

    for entry in &test.init {
        if let LocExpr::Reg { thread, .. } = &entry.loc.node {
            if !test.threads.iter().any(|t| t.id == *thread) {
                diagnostics.push(ParseDiagnostic {
                    code: "init_unknown_thread".into(),
                    severity: ParseDiagnosticSeverity::Warning,
                    message: format!(
                        "Initial state assigns a register of thread {thread} which has no program column"
                    ),
                    suggestion: None,
                    span: Some(entry.span),
                });
            }
        }
    }

    diagnostics
}

fn parse_test(pair: Pair<'_>, source: &str, filename: &str) -> Result<Test, ParseError> {
    let mut arch = String::new();
    let mut name = String::new();
    let mut doc = Vec::new();
    let mut info = Vec::new();
    let mut init = Vec::new();
    let mut threads = Vec::new();
    let mut locations = Vec::new();
    let mut final_cond = None;

    for item in pair.into_inner() {
        match item.as_rule() {
            Rule::header => {
                let mut inner = item.into_inner();
                arch = inner.next().unwrap().as_str().to_string();
                name = inner.next().unwrap().as_str().to_string();
            }
            Rule::doc_line => {
                let text = item.as_str();
                doc.push(text[1..text.len() - 1].to_string());
            }
            Rule::info_line => {
                let mut inner = item.into_inner();
                let key = inner.next().unwrap().as_str().to_string();
                let value = inner.next().unwrap().as_str().trim().to_string();
                info.push((key, value));
            }
            Rule::init_block => init = parse_init_block(item, source, filename)?,
            Rule::program => threads = parse_program(item, source, filename)?,
            Rule::locations_line => locations = parse_locations(item, source, filename)?,
            Rule::final_cond => final_cond = Some(parse_final_cond(item, source, filename)?),
            _ => {}
        }
    }

    Ok(Test {
        arch,
        name,
        doc,
        info,
        init,
        threads,
        locations,
        final_cond: final_cond.unwrap(),
    })
}

fn parse_init_block(
    pair: Pair<'_>,
    source: &str,
    filename: &str,
) -> Result<Vec<Assignment>, ParseError> {
    let mut entries = Vec::new();
    for item in pair.into_inner() {
        if item.as_rule() == Rule::init_entry {
            let span = span_from(&item);
            let mut inner = item.into_inner();
            let loc = parse_loc_expr(inner.next().unwrap(), source, filename)?;
            let value = parse_constant(inner.next().unwrap(), source, filename)?;
            entries.push(Assignment { loc, value, span });
        }
    }
    Ok(entries)
}

fn parse_loc_expr(
    pair: Pair<'_>,
    source: &str,
    filename: &str,
) -> Result<Spanned<LocExpr>, ParseError> {
    let span = span_from(&pair);
    let item = pair.into_inner().next().unwrap();
    let loc = match item.as_rule() {
        Rule::reg_loc => parse_reg_loc(item, source, filename)?,
        Rule::sym_reg_loc => {
            let name = item.into_inner().next().unwrap().as_str().to_string();
            LocExpr::SymbolicReg(name)
        }
        Rule::addr_loc => {
            let text = item.as_str();
            let addr = parse_number_u64(text).ok_or_else(|| {
                ParseError::syntax(
                    format!("address '{text}' out of range"),
                    span_from(&item),
                    source,
                    filename,
                )
            })?;
            LocExpr::Address(addr)
        }
        Rule::global_loc => LocExpr::Global(item.as_str().to_string()),
        other => unreachable!("unexpected rule in loc_expr: {other:?}"),
    };
    Ok(Spanned::new(loc, span))
}

fn parse_reg_loc(pair: Pair<'_>, source: &str, filename: &str) -> Result<LocExpr, ParseError> {
    let mut inner = pair.into_inner();
    let thread_pair = inner.next().unwrap();
    let thread = thread_pair
        .as_str()
        .parse::<usize>()
        .map_err(|_| ParseError::InvalidThreadId {
            text: thread_pair.as_str().to_string(),
            span: source_span(span_from(&thread_pair)),
            src: miette::NamedSource::new(filename, source.to_owned()),
        })?;
    let reg = inner.next().unwrap().as_str().to_string();
    Ok(LocExpr::Reg { thread, reg })
}

fn parse_constant(
    pair: Pair<'_>,
    source: &str,
    filename: &str,
) -> Result<Spanned<Constant>, ParseError> {
    let span = span_from(&pair);
    let item = pair.into_inner().next().unwrap();
    let constant = match item.as_rule() {
        Rule::label_const => {
            Constant::Label(item.into_inner().next().unwrap().as_str().to_string())
        }
        Rule::number_const => {
            let text = item.as_str();
            let n = parse_number_i64(text).ok_or_else(|| {
                ParseError::syntax(
                    format!("number '{text}' out of range"),
                    span_from(&item),
                    source,
                    filename,
                )
            })?;
            Constant::Number(n)
        }
        Rule::sym_const => Constant::Symbolic(item.as_str().to_string()),
        other => unreachable!("unexpected rule in constant: {other:?}"),
    };
    Ok(Spanned::new(constant, span))
}

fn parse_number_i64(text: &str) -> Option<i64> {
    let (neg, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let magnitude = if let Some(hex) = digits.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).ok()?
    } else if let Some(bin) = digits.strip_prefix("0b") {
        i64::from_str_radix(bin, 2).ok()?
    } else {
        digits.parse::<i64>().ok()?
    };
    Some(if neg { -magnitude } else { magnitude })
}

fn parse_number_u64(text: &str) -> Option<u64> {
    if let Some(hex) = text.strip_prefix("0x") {
        u64::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = text.strip_prefix("0b") {
        u64::from_str_radix(bin, 2).ok()
    } else {
        text.parse::<u64>().ok()
    }
}

fn parse_program(pair: Pair<'_>, source: &str, filename: &str) -> Result<Vec<Thread>, ParseError> {
    let mut threads: Vec<Thread> = Vec::new();
    for item in pair.into_inner() {
        match item.as_rule() {
            Rule::thread_header_row => {
                for label in item.into_inner() {
                    let span = span_from(&label);
                    let digits = &label.as_str()[1..];
                    let id = digits
                        .parse::<usize>()
                        .map_err(|_| ParseError::InvalidThreadId {
                            text: label.as_str().to_string(),
                            span: source_span(span),
                            src: miette::NamedSource::new(filename, source.to_owned()),
                        })?;
                    if threads.iter().any(|t| t.id == id) {
                        return Err(ParseError::DuplicateThread {
                            id,
                            span: source_span(span),
                            src: miette::NamedSource::new(filename, source.to_owned()),
                        });
                    }
                    threads.push(Thread {
                        id,
                        code: Vec::new(),
                        span,
                    });
                }
            }
            Rule::code_row => {
                let row_span = span_from(&item);
                let cells: Vec<Pair<'_>> = item.into_inner().collect();
                if cells.len() != threads.len() {
                    return Err(ParseError::RowWidth {
                        expected: threads.len(),
                        found: cells.len(),
                        span: source_span(row_span),
                        src: miette::NamedSource::new(filename, source.to_owned()),
                    });
                }
                for (thread, cell) in threads.iter_mut().zip(cells) {
                    let span = span_from(&cell);
                    thread
                        .code
                        .push(Spanned::new(classify_cell(cell.as_str()), span));
                }
            }
            _ => {}
        }
    }
    Ok(threads)
}

/// Classify the raw text of one program cell.
fn classify_cell(raw: &str) -> Pseudo {
    let text = raw.trim();
    if text.is_empty() {
        return Pseudo::Nop;
    }
    if let Some(name) = text.strip_prefix('%') {
        if is_ident(name) {
            return Pseudo::Symbolic(name.to_string());
        }
    }
    if let Some((name, args)) = split_macro(text) {
        return Pseudo::Macro(name, args);
    }
    if let Some((label, rest)) = split_label(text) {
        return Pseudo::Label(label.to_string(), Box::new(classify_cell(rest)));
    }
    Pseudo::Instruction(text.to_string())
}

fn is_ident(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Split a `NAME(arg,...)` shaped cell into macro name and arguments.
fn split_macro(text: &str) -> Option<(String, Vec<String>)> {
    let open = text.find('(')?;
    if !text.ends_with(')') {
        return None;
    }
    let name = &text[..open];
    if !is_ident(name) {
        return None;
    }
    let body = &text[open + 1..text.len() - 1];
    if body.contains('(') || body.contains(')') {
        return None;
    }
    let args = if body.trim().is_empty() {
        Vec::new()
    } else {
        body.split(',').map(|a| a.trim().to_string()).collect()
    };
    Some((name.to_string(), args))
}

/// Split a leading `name:` label off a cell, if present.
fn split_label(text: &str) -> Option<(&str, &str)> {
    let colon = text.find(':')?;
    let label = &text[..colon];
    if !is_ident(label) {
        return None;
    }
    Some((label, text[colon + 1..].trim_start()))
}

fn parse_locations(
    pair: Pair<'_>,
    source: &str,
    filename: &str,
) -> Result<Vec<Spanned<LocExpr>>, ParseError> {
    let mut locs = Vec::new();
    for item in pair.into_inner() {
        if item.as_rule() == Rule::loc_expr {
            locs.push(parse_loc_expr(item, source, filename)?);
        }
    }
    Ok(locs)
}

fn parse_final_cond(
    pair: Pair<'_>,
    source: &str,
    filename: &str,
) -> Result<Spanned<FinalCond>, ParseError> {
    let span = span_from(&pair);
    let item = pair.into_inner().next().unwrap();
    let rule = item.as_rule();
    let prop = parse_prop(item.into_inner().next().unwrap(), source, filename)?;
    let cond = match rule {
        Rule::exists_cond => FinalCond::Exists(prop),
        Rule::not_exists_cond => FinalCond::NotExists(prop),
        Rule::forall_cond => FinalCond::Forall(prop),
        other => unreachable!("unexpected rule in final_cond: {other:?}"),
    };
    Ok(Spanned::new(cond, span))
}

fn parse_prop(pair: Pair<'_>, source: &str, filename: &str) -> Result<Prop, ParseError> {
    let mut inner = pair.into_inner();
    let lhs = parse_or_prop(inner.next().unwrap(), source, filename)?;
    match inner.next() {
        Some(rhs) => {
            let rhs = parse_prop(rhs, source, filename)?;
            Ok(Prop::Implies(Box::new(lhs), Box::new(rhs)))
        }
        None => Ok(lhs),
    }
}

fn parse_or_prop(pair: Pair<'_>, source: &str, filename: &str) -> Result<Prop, ParseError> {
    let mut parts = Vec::new();
    for item in pair.into_inner() {
        parts.push(parse_and_prop(item, source, filename)?);
    }
    if parts.len() == 1 {
        Ok(parts.pop().unwrap())
    } else {
        Ok(Prop::Or(parts))
    }
}

fn parse_and_prop(pair: Pair<'_>, source: &str, filename: &str) -> Result<Prop, ParseError> {
    let mut parts = Vec::new();
    for item in pair.into_inner() {
        parts.push(parse_neg_prop(item, source, filename)?);
    }
    if parts.len() == 1 {
        Ok(parts.pop().unwrap())
    } else {
        Ok(Prop::And(parts))
    }
}

fn parse_neg_prop(pair: Pair<'_>, source: &str, filename: &str) -> Result<Prop, ParseError> {
    let item = pair.into_inner().next().unwrap();
    match item.as_rule() {
        Rule::neg_prop => Ok(Prop::Not(Box::new(parse_neg_prop(item, source, filename)?))),
        Rule::primary_prop => parse_primary_prop(item, source, filename),
        other => unreachable!("unexpected rule in neg_prop: {other:?}"),
    }
}

fn parse_primary_prop(pair: Pair<'_>, source: &str, filename: &str) -> Result<Prop, ParseError> {
    let item = pair.into_inner().next().unwrap();
    match item.as_rule() {
        Rule::prop => parse_prop(item, source, filename),
        Rule::atom => parse_atom(item, source, filename),
        other => unreachable!("unexpected rule in primary_prop: {other:?}"),
    }
}

fn parse_atom(pair: Pair<'_>, source: &str, filename: &str) -> Result<Prop, ParseError> {
    let mut inner = pair.into_inner();
    let loc = parse_loc_expr(inner.next().unwrap(), source, filename)?;
    let rhs = inner.next().unwrap().into_inner().next().unwrap();
    match rhs.as_rule() {
        Rule::reg_loc => {
            let span = span_from(&rhs);
            let reg = parse_reg_loc(rhs, source, filename)?;
            Ok(Prop::AtomLL {
                lhs: loc,
                rhs: Spanned::new(reg, span),
            })
        }
        Rule::sym_reg_loc => {
            let span = span_from(&rhs);
            let name = rhs.into_inner().next().unwrap().as_str().to_string();
            Ok(Prop::AtomLL {
                lhs: loc,
                rhs: Spanned::new(LocExpr::SymbolicReg(name), span),
            })
        }
        Rule::constant => {
            let value = parse_constant(rhs, source, filename)?;
            Ok(Prop::Atom { loc, value })
        }
        other => unreachable!("unexpected rule in atom_rhs: {other:?}"),
    }
}
