//! Solver-ready record types for converted litmus tests.
//!
//! These types represent what the conversion emits — a normalized initial
//! state, flattened per-thread code listings, and the final condition
//! compiled to an assertion term with a sat/unsat expectation — rather than
//! the raw parse tree in [`orchil_litmus::ast`].

use indexmap::IndexSet;
use std::fmt;

use crate::sexpr::Sexpr;

/// An addressable storage cell referenced by a test.
///
/// Identity is structural: two locations are equal iff they have the same
/// tag and the same fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum Location {
    /// A thread-relative register such as `1:X0`.
    Register { thread: usize, reg: String },
    /// A named global memory location such as `x`.
    Symbolic(String),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Register { thread, reg } => write!(f, "{thread}:{reg}"),
            Location::Symbolic(name) => f.write_str(name),
        }
    }
}

/// The value bound to a register by the initial state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum InitialValue {
    /// A jump-target label, rendered with a trailing colon.
    Label(String),
    /// A concrete literal or symbolic-variable name, rendered verbatim.
    Literal(String),
}

impl fmt::Display for InitialValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitialValue::Label(target) => write!(f, "{target}:"),
            InitialValue::Literal(text) => f.write_str(text),
        }
    }
}

/// One register initialization surviving normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct RegisterInit {
    /// Thread owning the register.
    pub thread: usize,
    /// Register name, e.g. `X1`.
    pub reg: String,
    /// Rendered value.
    pub value: InitialValue,
}

/// Normalized initial state of a test.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct InitialState {
    /// Distinct symbolic-variable names referenced by register values,
    /// in first-seen order.
    pub symbolic: IndexSet<String>,
    /// Register initializations in declaration order, one entry per register.
    pub registers: Vec<RegisterInit>,
}

impl InitialState {
    /// Symbolic-variable names in sorted order, as emitted.
    pub fn sorted_symbolic(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.symbolic.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Register initializations belonging to one thread, in declaration order.
    pub fn thread_registers(&self, thread: usize) -> impl Iterator<Item = &RegisterInit> {
        self.registers.iter().filter(move |r| r.thread == thread)
    }
}

/// One line of a flattened code listing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum CodeLine {
    /// Label definition, emitted without indentation as `<label>:`.
    Label(String),
    /// Concrete instruction, emitted tab-indented.
    Instr(String),
}

/// Flattened code listing for a single thread.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ThreadCode {
    /// Thread identifier from the source test.
    pub thread: usize,
    /// Code lines with no-ops removed.
    pub code: Vec<CodeLine>,
}

/// Whether the compiled assertion is expected to be satisfiable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum Expect {
    Sat,
    Unsat,
}

impl fmt::Display for Expect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expect::Sat => f.write_str("sat"),
            Expect::Unsat => f.write_str("unsat"),
        }
    }
}

/// An output slot assigned to a register discovered in the final condition.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct OutputSlot {
    /// Thread owning the register.
    pub thread: usize,
    /// Positional slot name, e.g. `output 0`.
    pub slot: String,
    /// Register name.
    pub reg: String,
}

/// The compiled final condition of a test.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct CompiledFinal {
    /// Output slots in first-discovery order over the condition.
    ///
    /// Symbolic globals receive no slot; the assertion addresses them
    /// directly through `last_write_to` terms.
    pub outputs: Vec<OutputSlot>,
    /// The assertion handed to the solver.
    pub assertion: Sexpr,
    /// Expected solver verdict derived from the quantifier shape.
    pub expect: Expect,
}

impl CompiledFinal {
    /// Look up the output slot assigned to a register, if any.
    pub fn output_slot(&self, thread: usize, reg: &str) -> Option<&str> {
        self.outputs
            .iter()
            .find(|o| o.thread == thread && o.reg == reg)
            .map(|o| o.slot.as_str())
    }
}

/// A fully converted litmus test.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ConvertedTest {
    /// Architecture tag from the test header.
    pub arch: String,
    /// Test name from the test header.
    pub name: String,
    /// Informational key/value pairs with lowercased keys, in source order.
    pub info: Vec<(String, String)>,
    /// Normalized initial state.
    pub initial: InitialState,
    /// Per-thread code listings in ascending thread order.
    pub threads: Vec<ThreadCode>,
    /// Compiled final condition.
    pub final_state: CompiledFinal,
}
