//! Moa: Hindley-Milner style type inference for the Moa language.
//!
//! This library parses Moa source and infers a type for every node. It
//! features:
//!
//! - **Numeric classes**: literals start as `num` and narrow to `int` or `float`
//! - **Structural records** for parameters used through fields, checked
//!   against nominal property tables and object literals
//! - **Variadic constructors** (`list`, `set`, `dict`) over repeatable parameters
//! - **Error unions**: thrown types travel beside the success type (`num|string`)
//! - **Declared signatures** with `ft`, checked against later `fn` definitions
//!
//! ```
//! assert_eq!(moa::infer::infer_source("[1 2.0 3]").unwrap(), "list(float)");
//! ```

pub mod builtins;
pub mod diagnostics;
pub mod error;
pub mod infer;
pub mod lexer;
pub mod parser;
pub mod types;

#[cfg(feature = "wasm")]
pub mod wasm;
