use miette::{Diagnostic, NamedSource, SourceSpan};
use std::collections::HashSet;
use thiserror::Error;

use crate::record::*;
use crate::sexpr::Sexpr;
use orchil_litmus::ast;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConvertError {
    #[error("Unsupported location '{0}'")]
    UnsupportedLocation(String),
    #[error("Symbolic location '{0}' not supported in initial state")]
    SymbolicLocationInInit(String),
    #[error("LL atom not yet supported")]
    LLAtomUnsupported,
    #[error("Failed to compile value '{0}' to SMT")]
    UnsupportedValue(String),
    #[error("Invalid location '{0}' in final state")]
    InvalidFinalLocation(String),
    #[error("Unsupported instruction '{0}' in program listing")]
    UnsupportedInstruction(String),
    #[error("No output slot for register '{reg}' of thread {thread}")]
    NoOutputSlot { thread: usize, reg: String },
}

/// A conversion error enriched with source span information for pretty-printed diagnostics.
#[derive(Debug, Error, Diagnostic)]
#[error("{inner}")]
pub struct SpannedConvertError {
    #[source_code]
    pub src: NamedSource<String>,
    pub inner: ConvertError,
    #[label("here")]
    pub span: Option<SourceSpan>,
}

impl SpannedConvertError {
    fn new(err: ConvertError, source: String, filename: String, span: Option<ast::Span>) -> Self {
        Self {
            src: NamedSource::new(filename, source),
            inner: err,
            span: span.map(|s| SourceSpan::new(s.start.into(), (s.end - s.start).into())),
        }
    }
}

/// Convert a parsed litmus test into a solver-ready record, with rich source-span diagnostics.
///
/// This wraps `convert()` and attaches source spans for pretty error reporting via miette.
pub fn convert_with_source(
    test: &ast::Test,
    source: &str,
    filename: &str,
) -> Result<ConvertedTest, SpannedConvertError> {
    convert(test).map_err(|err| {
        let span = find_span_for_error(&err, test);
        SpannedConvertError::new(err, source.to_string(), filename.to_string(), span)
    })
}

/// Best-effort span lookup for a conversion error by examining the AST.
fn find_span_for_error(err: &ConvertError, test: &ast::Test) -> Option<ast::Span> {
    let prop = test.final_cond.node.prop();
    match err {
        ConvertError::UnsupportedLocation(text) => {
            // The resolver runs over both the initial state and the final
            // condition; search in that order.
            test.init
                .iter()
                .find(|a| a.loc.node.to_string() == *text)
                .map(|a| a.loc.span)
                .or_else(|| find_prop_location(prop, text))
        }
        ConvertError::SymbolicLocationInInit(name) => test
            .init
            .iter()
            .find(|a| matches!(&a.loc.node, ast::LocExpr::Global(n) if n == name))
            .map(|a| a.loc.span),
        ConvertError::LLAtomUnsupported => find_atom_ll(prop),
        ConvertError::UnsupportedValue(text) => find_prop_value(prop, text),
        ConvertError::InvalidFinalLocation(text) => find_prop_location(prop, text),
        ConvertError::UnsupportedInstruction(text) => test.threads.iter().find_map(|t| {
            t.code
                .iter()
                .find(|cell| pseudo_contains(&cell.node, text))
                .map(|cell| cell.span)
        }),
        ConvertError::NoOutputSlot { .. } => None,
    }
}

fn find_prop_location(prop: &ast::Prop, text: &str) -> Option<ast::Span> {
    match prop {
        ast::Prop::Atom { loc, .. } => (loc.node.to_string() == text).then_some(loc.span),
        ast::Prop::AtomLL { lhs, rhs } => (lhs.node.to_string() == text)
            .then_some(lhs.span)
            .or_else(|| (rhs.node.to_string() == text).then_some(rhs.span)),
        ast::Prop::Not(inner) => find_prop_location(inner, text),
        ast::Prop::And(parts) | ast::Prop::Or(parts) => {
            parts.iter().find_map(|p| find_prop_location(p, text))
        }
        ast::Prop::Implies(lhs, rhs) => {
            find_prop_location(lhs, text).or_else(|| find_prop_location(rhs, text))
        }
    }
}

fn find_prop_value(prop: &ast::Prop, text: &str) -> Option<ast::Span> {
    match prop {
        ast::Prop::Atom { value, .. } => (value.node.to_string() == text).then_some(value.span),
        ast::Prop::AtomLL { .. } => None,
        ast::Prop::Not(inner) => find_prop_value(inner, text),
        ast::Prop::And(parts) | ast::Prop::Or(parts) => {
            parts.iter().find_map(|p| find_prop_value(p, text))
        }
        ast::Prop::Implies(lhs, rhs) => {
            find_prop_value(lhs, text).or_else(|| find_prop_value(rhs, text))
        }
    }
}

fn find_atom_ll(prop: &ast::Prop) -> Option<ast::Span> {
    match prop {
        ast::Prop::Atom { .. } => None,
        ast::Prop::AtomLL { lhs, rhs } => Some(ast::Span::new(lhs.span.start, rhs.span.end)),
        ast::Prop::Not(inner) => find_atom_ll(inner),
        ast::Prop::And(parts) | ast::Prop::Or(parts) => parts.iter().find_map(find_atom_ll),
        ast::Prop::Implies(lhs, rhs) => find_atom_ll(lhs).or_else(|| find_atom_ll(rhs)),
    }
}

fn pseudo_contains(pseudo: &ast::Pseudo, text: &str) -> bool {
    if pseudo.to_string() == text {
        return true;
    }
    match pseudo {
        ast::Pseudo::Label(_, rest) => pseudo_contains(rest, text),
        _ => false,
    }
}

/// Map a source location to a register or symbolic-global reference.
///
/// Concrete memory addresses resolve to `None`; the caller decides whether
/// that is acceptable. Symbolic register placeholders are rejected.
pub fn resolve_location(loc: &ast::LocExpr) -> Result<Option<Location>, ConvertError> {
    match loc {
        ast::LocExpr::Reg { thread, reg } => Ok(Some(Location::Register {
            thread: *thread,
            reg: reg.clone(),
        })),
        ast::LocExpr::Global(name) => Ok(Some(Location::Symbolic(name.clone()))),
        ast::LocExpr::Address(_) => Ok(None),
        ast::LocExpr::SymbolicReg(_) => Err(ConvertError::UnsupportedLocation(loc.to_string())),
    }
}

/// Fold the raw initial-state assignment list into a normalized state.
///
/// Assignments to locations that resolve to `None` are dropped. When a
/// register is initialized more than once, the first value wins and later
/// assignments are ignored.
pub fn normalize_initial_state(init: &[ast::Assignment]) -> Result<InitialState, ConvertError> {
    let mut state = InitialState::default();
    let mut seen: HashSet<(usize, String)> = HashSet::new();

    for assign in init {
        let Some(loc) = resolve_location(&assign.loc.node)? else {
            tracing::debug!(
                "Dropping initial-state assignment for location '{}'",
                assign.loc.node
            );
            continue;
        };
        let (thread, reg) = match loc {
            Location::Register { thread, reg } => (thread, reg),
            Location::Symbolic(name) => return Err(ConvertError::SymbolicLocationInInit(name)),
        };
        if !seen.insert((thread, reg.clone())) {
            tracing::debug!(
                "Register {thread}:{reg} initialized more than once, keeping the first value"
            );
            continue;
        }
        let value = match &assign.value.node {
            ast::Constant::Number(n) => InitialValue::Literal(n.to_string()),
            ast::Constant::Symbolic(name) => {
                state.symbolic.insert(name.clone());
                InitialValue::Literal(name.clone())
            }
            ast::Constant::Label(target) => InitialValue::Label(target.clone()),
        };
        state.registers.push(RegisterInit { thread, reg, value });
    }
    Ok(state)
}

/// Compile the quantified final condition into an assertion with output
/// slots and an expected solver verdict.
pub fn compile_final(cond: &ast::FinalCond) -> Result<CompiledFinal, ConvertError> {
    let mut outputs = Vec::new();
    discover_locations(cond.prop(), &mut outputs)?;

    let (assertion, expect) = match cond {
        ast::FinalCond::Exists(prop) => (compile_prop(prop)?, Expect::Sat),
        ast::FinalCond::NotExists(prop) => (compile_prop(prop)?, Expect::Unsat),
        // A universal claim is discharged as an unsatisfiability query on
        // the negated body.
        ast::FinalCond::Forall(prop) => (compile_prop(prop)?.not(), Expect::Unsat),
    };

    Ok(CompiledFinal {
        outputs,
        assertion,
        expect,
    })
}

fn discover_locations(prop: &ast::Prop, outputs: &mut Vec<OutputSlot>) -> Result<(), ConvertError> {
    match prop {
        ast::Prop::Atom { loc, .. } => discover_location(&loc.node, outputs),
        ast::Prop::AtomLL { lhs, rhs } => {
            discover_location(&lhs.node, outputs)?;
            discover_location(&rhs.node, outputs)
        }
        ast::Prop::Not(inner) => discover_locations(inner, outputs),
        ast::Prop::And(parts) | ast::Prop::Or(parts) => {
            for part in parts {
                discover_locations(part, outputs)?;
            }
            Ok(())
        }
        ast::Prop::Implies(lhs, rhs) => {
            discover_locations(lhs, outputs)?;
            discover_locations(rhs, outputs)
        }
    }
}

fn discover_location(loc: &ast::LocExpr, outputs: &mut Vec<OutputSlot>) -> Result<(), ConvertError> {
    match resolve_location(loc)? {
        Some(Location::Register { thread, reg }) => {
            let fresh = outputs.iter().all(|o| o.thread != thread || o.reg != reg);
            if fresh {
                let slot = format!("output {}", outputs.len());
                outputs.push(OutputSlot { thread, slot, reg });
            }
            Ok(())
        }
        // Symbolic globals are addressed by name in the compiled term and
        // receive no slot.
        Some(Location::Symbolic(_)) | None => Ok(()),
    }
}

fn compile_prop(prop: &ast::Prop) -> Result<Sexpr, ConvertError> {
    match prop {
        ast::Prop::Atom { loc, value } => {
            let lhs = compile_location(&loc.node)?;
            let rhs = compile_value(&value.node)?;
            Ok(lhs.eq(rhs))
        }
        ast::Prop::AtomLL { .. } => Err(ConvertError::LLAtomUnsupported),
        ast::Prop::Not(inner) => Ok(compile_prop(inner)?.not()),
        ast::Prop::And(parts) => {
            let parts: Vec<Sexpr> = parts.iter().map(compile_prop).collect::<Result<_, _>>()?;
            Ok(Sexpr::and(parts))
        }
        ast::Prop::Or(parts) => {
            let parts: Vec<Sexpr> = parts.iter().map(compile_prop).collect::<Result<_, _>>()?;
            Ok(Sexpr::or(parts))
        }
        ast::Prop::Implies(lhs, rhs) => Ok(compile_prop(lhs)?.implies(compile_prop(rhs)?)),
    }
}

fn compile_location(loc: &ast::LocExpr) -> Result<Sexpr, ConvertError> {
    match resolve_location(loc)? {
        Some(Location::Register { thread, reg }) => Ok(Sexpr::app(
            "register",
            vec![Sexpr::atom(reg), Sexpr::atom(thread.to_string())],
        )),
        Some(Location::Symbolic(name)) => {
            Ok(Sexpr::app("last_write_to", vec![Sexpr::atom(name)]))
        }
        None => Err(ConvertError::InvalidFinalLocation(loc.to_string())),
    }
}

fn compile_value(value: &ast::Constant) -> Result<Sexpr, ConvertError> {
    match value {
        ast::Constant::Number(n) => Ok(Sexpr::atom(n.to_string())),
        ast::Constant::Symbolic(_) | ast::Constant::Label(_) => {
            Err(ConvertError::UnsupportedValue(value.to_string()))
        }
    }
}

fn flatten_code(thread: &ast::Thread) -> Result<Vec<CodeLine>, ConvertError> {
    let mut lines = Vec::new();
    for cell in &thread.code {
        push_pseudo(&cell.node, &mut lines)?;
    }
    Ok(lines)
}

fn push_pseudo(pseudo: &ast::Pseudo, lines: &mut Vec<CodeLine>) -> Result<(), ConvertError> {
    match pseudo {
        ast::Pseudo::Nop => Ok(()),
        ast::Pseudo::Label(label, rest) => {
            lines.push(CodeLine::Label(label.clone()));
            push_pseudo(rest, lines)
        }
        ast::Pseudo::Instruction(text) => {
            lines.push(CodeLine::Instr(text.clone()));
            Ok(())
        }
        ast::Pseudo::Macro(..) | ast::Pseudo::Symbolic(_) => {
            Err(ConvertError::UnsupportedInstruction(pseudo.to_string()))
        }
    }
}

/// Convert a parsed litmus test into a solver-ready record.
pub fn convert(test: &ast::Test) -> Result<ConvertedTest, ConvertError> {
    let initial = normalize_initial_state(&test.init)?;
    let final_state = compile_final(&test.final_cond.node)?;

    let mut threads = Vec::with_capacity(test.threads.len());
    for thread in &test.threads {
        threads.push(ThreadCode {
            thread: thread.id,
            code: flatten_code(thread)?,
        });
    }
    threads.sort_by_key(|t| t.thread);

    let info = test
        .info
        .iter()
        .map(|(key, value)| (key.to_lowercase(), value.clone()))
        .collect();

    Ok(ConvertedTest {
        arch: test.arch.clone(),
        name: test.name.clone(),
        info,
        initial,
        threads,
        final_state,
    })
}

impl CompiledFinal {
    /// Look up the output slot assigned to a register, failing when the
    /// register was never discovered in the final condition.
    pub fn require_output_slot(&self, thread: usize, reg: &str) -> Result<&str, ConvertError> {
        self.output_slot(thread, reg)
            .ok_or_else(|| ConvertError::NoOutputSlot {
                thread,
                reg: reg.to_string(),
            })
    }
}
