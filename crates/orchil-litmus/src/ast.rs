/// Source span for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// A spanned AST node.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// A complete litmus test file.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct Test {
    /// Architecture named on the header line, e.g. `AArch64`.
    pub arch: String,
    /// Test name from the header line.
    pub name: String,
    /// Quoted documentation lines, quotes stripped.
    pub doc: Vec<String>,
    /// `Key=Value` metadata lines in file order, keys as written.
    pub info: Vec<(String, String)>,
    /// Entries of the `{ ... }` initial-state block in file order.
    pub init: Vec<Assignment>,
    /// Program columns, one per declared thread.
    pub threads: Vec<Thread>,
    /// Locations listed in an optional `locations [...]` line.
    pub locations: Vec<Spanned<LocExpr>>,
    /// The quantified final condition.
    pub final_cond: Spanned<FinalCond>,
}

/// One `loc = value` entry of the initial-state block.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct Assignment {
    pub loc: Spanned<LocExpr>,
    pub value: Spanned<Constant>,
    pub span: Span,
}

/// A location as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum LocExpr {
    /// A thread-local register, written `0:X1`.
    Reg { thread: usize, reg: String },
    /// A symbolic register placeholder, written `%name`.
    SymbolicReg(String),
    /// A named shared variable.
    Global(String),
    /// A concrete memory address.
    Address(u64),
}

impl std::fmt::Display for LocExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocExpr::Reg { thread, reg } => write!(f, "{thread}:{reg}"),
            LocExpr::SymbolicReg(name) => write!(f, "%{name}"),
            LocExpr::Global(name) => write!(f, "{name}"),
            LocExpr::Address(addr) => write!(f, "{addr:#x}"),
        }
    }
}

/// A constant value as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum Constant {
    /// A decimal, hex (`0x`) or binary (`0b`) integer.
    Number(i64),
    /// A bare identifier naming a shared variable.
    Symbolic(String),
    /// A code label reference, written `name:`.
    Label(String),
}

impl std::fmt::Display for Constant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Constant::Number(n) => write!(f, "{n}"),
            Constant::Symbolic(name) => write!(f, "{name}"),
            Constant::Label(name) => write!(f, "{name}:"),
        }
    }
}

/// One program column.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct Thread {
    /// Thread id from the `P<n>` column header.
    pub id: usize,
    /// Cells of this column, top to bottom.
    pub code: Vec<Spanned<Pseudo>>,
    /// Span of the `P<n>` column header.
    pub span: Span,
}

/// One cell of the program table.
///
/// Cells are classified from their raw text: empty cells are no-ops, a
/// `name:` prefix introduces a label, `NAME(args)` is an assembler macro and
/// `%name` a symbolic code placeholder. Anything else is an instruction kept
/// as verbatim text.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum Pseudo {
    /// An empty cell.
    Nop,
    /// A label, possibly followed by more code in the same cell.
    Label(String, Box<Pseudo>),
    /// A verbatim instruction.
    Instruction(String),
    /// An assembler macro invocation.
    Macro(String, Vec<String>),
    /// A symbolic code placeholder.
    Symbolic(String),
}

impl std::fmt::Display for Pseudo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pseudo::Nop => Ok(()),
            Pseudo::Label(label, rest) => match rest.as_ref() {
                Pseudo::Nop => write!(f, "{label}:"),
                rest => write!(f, "{label}: {rest}"),
            },
            Pseudo::Instruction(text) => write!(f, "{text}"),
            Pseudo::Macro(name, args) => write!(f, "{name}({})", args.join(",")),
            Pseudo::Symbolic(name) => write!(f, "%{name}"),
        }
    }
}

/// A proposition over final-state locations.
///
/// `And` and `Or` are n-ary: chains of the same connective are flattened
/// during parsing, so `a /\ b /\ c` is a single three-element `And`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum Prop {
    /// `loc = constant`.
    Atom {
        loc: Spanned<LocExpr>,
        value: Spanned<Constant>,
    },
    /// `loc = loc`, comparing two locations.
    AtomLL {
        lhs: Spanned<LocExpr>,
        rhs: Spanned<LocExpr>,
    },
    Not(Box<Prop>),
    And(Vec<Prop>),
    Or(Vec<Prop>),
    Implies(Box<Prop>, Box<Prop>),
}

impl Prop {
    fn is_compound(&self) -> bool {
        matches!(self, Prop::And(_) | Prop::Or(_) | Prop::Implies(_, _))
    }

    fn fmt_child(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_compound() {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

impl std::fmt::Display for Prop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Prop::Atom { loc, value } => write!(f, "{}={}", loc.node, value.node),
            Prop::AtomLL { lhs, rhs } => write!(f, "{}={}", lhs.node, rhs.node),
            Prop::Not(inner) => {
                write!(f, "~")?;
                inner.fmt_child(f)
            }
            Prop::And(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, " /\\ ")?;
                    }
                    part.fmt_child(f)?;
                }
                Ok(())
            }
            Prop::Or(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, " \\/ ")?;
                    }
                    part.fmt_child(f)?;
                }
                Ok(())
            }
            Prop::Implies(lhs, rhs) => {
                lhs.fmt_child(f)?;
                write!(f, " => ")?;
                rhs.fmt_child(f)
            }
        }
    }
}

/// The final condition with its quantifier.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum FinalCond {
    /// `exists (prop)`: the listed outcome is allowed to occur.
    Exists(Prop),
    /// `~exists (prop)`: the listed outcome must never occur.
    NotExists(Prop),
    /// `forall (prop)`: the proposition holds in every final state.
    Forall(Prop),
}

impl FinalCond {
    /// The proposition under the quantifier.
    pub fn prop(&self) -> &Prop {
        match self {
            FinalCond::Exists(prop) | FinalCond::NotExists(prop) | FinalCond::Forall(prop) => prop,
        }
    }
}

impl std::fmt::Display for FinalCond {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FinalCond::Exists(prop) => write!(f, "exists ({prop})"),
            FinalCond::NotExists(prop) => write!(f, "~exists ({prop})"),
            FinalCond::Forall(prop) => write!(f, "forall ({prop})"),
        }
    }
}
