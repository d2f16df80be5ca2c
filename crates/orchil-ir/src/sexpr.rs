use std::fmt;

/// Abstract s-expression representation, solver-agnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum Sexpr {
    /// Bare atom such as a register name or an integer literal.
    Atom(String),
    /// Parenthesized application such as `(= (register X0 1) 1)`.
    List(Vec<Sexpr>),
}

#[allow(clippy::should_implement_trait)]
impl Sexpr {
    pub fn atom(text: impl Into<String>) -> Self {
        Sexpr::Atom(text.into())
    }

    pub fn list(items: Vec<Sexpr>) -> Self {
        Sexpr::List(items)
    }

    /// Application of a named head to arguments, e.g. `(register X0 1)`.
    pub fn app(head: impl Into<String>, args: Vec<Sexpr>) -> Self {
        let mut items = vec![Sexpr::atom(head)];
        items.extend(args);
        Sexpr::List(items)
    }

    pub fn eq(self, other: Sexpr) -> Self {
        Sexpr::app("=", vec![self, other])
    }

    pub fn and(terms: Vec<Sexpr>) -> Self {
        Sexpr::app("and", terms)
    }

    pub fn or(terms: Vec<Sexpr>) -> Self {
        Sexpr::app("or", terms)
    }

    pub fn not(self) -> Self {
        Sexpr::app("not", vec![self])
    }

    pub fn implies(self, other: Sexpr) -> Self {
        Sexpr::app("=>", vec![self, other])
    }
}

impl fmt::Display for Sexpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sexpr::Atom(text) => f.write_str(text),
            Sexpr::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
        }
    }
}
