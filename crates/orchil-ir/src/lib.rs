#![doc = include_str!("../README.md")]

//! Litmus test record model and conversion.
//!
//! This crate defines the solver-ready record types, the conversion pass
//! from the litmus AST to the record, the final-condition compiler, and the
//! textual record emitter.

pub mod convert;
pub mod emit;
#[cfg(any(test, feature = "proptest"))]
pub mod proptest_generators;
pub mod record;
pub mod sexpr;
