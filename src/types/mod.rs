//! Type system module for Moa.
//!
//! This module provides the type-term definitions, the arena that owns them,
//! and canonical pretty-printing.

mod arena;
mod pretty;
mod term;

pub use arena::{Snapshot, TermArena};
pub use pretty::PrettyContext;
pub use term::{Scheme, Term, TermId, VarId};
