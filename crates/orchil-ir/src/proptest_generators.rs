//! Proptest strategies for generating well-formed litmus AST fragments.

use proptest::prelude::*;

use orchil_litmus::ast;

const REGISTER_NAMES: &[&str] = &["X0", "X1", "X2", "X4", "W5", "EAX"];
const SYMBOLIC_NAMES: &[&str] = &["x", "y", "z", "flag"];
const LABEL_NAMES: &[&str] = &["LC00", "exit", "retry"];

fn dummy_span() -> ast::Span {
    ast::Span::new(0, 0)
}

/// Strategy for a thread-register location on one of three threads.
pub fn arb_register() -> impl Strategy<Value = ast::LocExpr> {
    (0..3usize, proptest::sample::select(REGISTER_NAMES)).prop_map(|(thread, reg)| {
        ast::LocExpr::Reg {
            thread,
            reg: reg.to_string(),
        }
    })
}

/// Strategy for an equality atom between a register and a small integer.
pub fn arb_concrete_atom() -> impl Strategy<Value = ast::Prop> {
    (arb_register(), -4i64..5).prop_map(|(loc, value)| ast::Prop::Atom {
        loc: ast::Spanned::new(loc, dummy_span()),
        value: ast::Spanned::new(ast::Constant::Number(value), dummy_span()),
    })
}

/// Strategy for a proposition built from concrete equality atoms.
///
/// Generated propositions contain no location-equality atoms and no
/// symbolic or label values, so they always compile.
pub fn arb_concrete_prop() -> impl Strategy<Value = ast::Prop> {
    arb_concrete_atom().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(|p| ast::Prop::Not(Box::new(p))),
            proptest::collection::vec(inner.clone(), 1..4).prop_map(ast::Prop::And),
            proptest::collection::vec(inner.clone(), 1..4).prop_map(ast::Prop::Or),
            (inner.clone(), inner)
                .prop_map(|(lhs, rhs)| ast::Prop::Implies(Box::new(lhs), Box::new(rhs))),
        ]
    })
}

/// Strategy for a quantified final condition over a concrete proposition.
pub fn arb_final_cond() -> impl Strategy<Value = ast::FinalCond> {
    (arb_concrete_prop(), 0..3u8).prop_map(|(prop, quantifier)| match quantifier {
        0 => ast::FinalCond::Exists(prop),
        1 => ast::FinalCond::NotExists(prop),
        _ => ast::FinalCond::Forall(prop),
    })
}

/// Strategy for an initial value: a small integer, a symbolic variable, or
/// a label reference.
pub fn arb_initial_value() -> impl Strategy<Value = ast::Constant> {
    prop_oneof![
        (-8i64..9).prop_map(ast::Constant::Number),
        proptest::sample::select(SYMBOLIC_NAMES)
            .prop_map(|name| ast::Constant::Symbolic(name.to_string())),
        proptest::sample::select(LABEL_NAMES)
            .prop_map(|name| ast::Constant::Label(name.to_string())),
    ]
}

/// Strategy for an initial-state assignment list over register locations.
pub fn arb_initial_assignments() -> impl Strategy<Value = Vec<ast::Assignment>> {
    proptest::collection::vec((arb_register(), arb_initial_value()), 0..8).prop_map(|entries| {
        entries
            .into_iter()
            .map(|(loc, value)| ast::Assignment {
                loc: ast::Spanned::new(loc, dummy_span()),
                value: ast::Spanned::new(value, dummy_span()),
                span: dummy_span(),
            })
            .collect()
    })
}
