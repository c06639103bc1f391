//! Type inference module for Moa.
//!
//! This module provides the core type inference implementation:
//! - `state`: Inference state owning the term arena and property tables
//! - `env`: Type environment for name bindings
//! - `unify`: Unification with class narrowing, structural subsumption and
//!   variadic argument matching
//! - `infer`: Core type inference for expressions and statements
//! - `decorate`: AST decoration with canonical type strings

mod decorate;
mod env;
mod infer;
mod state;
mod unify;

#[cfg(test)]
mod proptests;

pub use decorate::{decorate_with_types, Decorator};
pub use env::{Binding, Mutability, TypeEnv};
pub use infer::InferResult;
pub use state::{InferState, Primitives};

use crate::builtins::initial_env;
use crate::error::Result;
use crate::parser::ast::Program;
use crate::parser::parse_source;

/// Infer a whole program with a fresh state and the built-in environment.
///
/// Returns a copy of the tree where every node carries its type string.
pub fn convert(program: &Program) -> Result<Program> {
    let mut state = InferState::new();
    let mut env = initial_env(&mut state);
    state.infer_program(&mut env, program)?;
    Ok(decorate_with_types(program, &state))
}

/// Parse and infer `source`, returning the type of the program.
pub fn infer_source(source: &str) -> Result<String> {
    let program = parse_source(source)?;
    let typed = convert(&program)?;
    Ok(typed.ty.unwrap_or_default())
}
