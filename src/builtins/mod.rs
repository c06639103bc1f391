//! Built-in bindings and property tables.
//!
//! This module provides:
//! - The initial type environment: constants, conversions, container
//!   constructors and operators
//! - The property tables of built-in nominal types

use crate::infer::{InferState, TypeEnv};
use crate::types::Scheme;

const ARITHMETIC: [&str; 7] = ["+", "-", "*", "/", "%", "**", "//"];
const LOGICAL: [&str; 2] = ["&&", "||"];
const COMPARISON: [&str; 6] = ["==", "!=", "<", "<=", ">", ">="];

/// Create the initial type environment with built-in bindings.
///
/// Every term is allocated in `state`, so the environment is only valid for
/// that inference run.
pub fn initial_env(state: &mut InferState) -> TypeEnv {
    let mut env = TypeEnv::empty();
    let prims = state.prims;

    env.insert_immutable("true", Scheme::mono(prims.bool));
    env.insert_immutable("false", Scheme::mono(prims.bool));

    // Conversions
    for (name, target) in [("int", prims.int), ("float", prims.float)] {
        let c = state.fresh_num();
        let sig = state.product(vec![c, target]);
        env.insert_immutable(name, Scheme::poly(vec![c], sig));
    }
    let t = state.fresh_var();
    let sig = state.product(vec![t, prims.string]);
    env.insert_immutable("string", Scheme::poly(vec![t], sig));

    // Variadic containers
    for name in ["list", "set"] {
        let t = state.fresh_var();
        state.arena.mark_repeatable(t);
        let container = state.nominal(name, vec![t]);
        let sig = state.product(vec![t, container]);
        env.insert_immutable(name, Scheme::poly(vec![t], sig));
    }
    let k = state.fresh_var();
    let v = state.fresh_var();
    let entry = state.product(vec![k, v]);
    state.arena.mark_repeatable(entry);
    let dict = state.nominal("dict", vec![k, v]);
    let sig = state.product(vec![entry, dict]);
    env.insert_immutable("dict", Scheme::poly(vec![k, v], sig));

    // Operators
    for op in ARITHMETIC {
        let c = state.fresh_num();
        let sig = state.product(vec![c, c, c]);
        env.insert_immutable(op, Scheme::poly(vec![c], sig));
    }
    for op in LOGICAL {
        let sig = state.product(vec![prims.bool, prims.bool, prims.bool]);
        env.insert_immutable(op, Scheme::mono(sig));
    }
    for op in COMPARISON {
        let t = state.fresh_var();
        let sig = state.product(vec![t, t, prims.bool]);
        env.insert_immutable(op, Scheme::poly(vec![t], sig));
    }

    register_properties(state);
    env
}

fn register_properties(state: &mut InferState) {
    let prims = state.prims;
    for name in ["list", "set", "dict", "string"] {
        state.register_properties(name, vec![("size".to_string(), prims.int)]);
    }
    state.register_properties("error", vec![("message".to_string(), prims.string)]);
}
