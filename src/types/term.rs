//! Core type-term definitions for Moa type inference.
//!
//! Terms live in a [`TermArena`](super::TermArena) and refer to each other by
//! [`TermId`] handle. Variables, type classes and structural records carry a
//! mutable `instance` slot: binding one of them during unification writes that
//! slot, and every holder of the handle observes the binding.

use std::collections::BTreeMap;

/// Handle of a term in the arena.
pub type TermId = usize;

/// Unique, monotonically increasing identifier of a type variable.
pub type VarId = u32;

/// A type term.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Term {
    /// Placeholder, unbound until `instance` is written.
    Var { id: VarId, instance: Option<TermId> },

    /// A name with generic arguments: `int`, `list(t)`, `dict(k v)`, `tuple(a b)`.
    Nominal { name: String, generics: Vec<TermId> },

    /// A named set of candidate types (`num` over `int` and `float`),
    /// narrowed to one candidate through `instance`.
    Class {
        name: String,
        traits: Vec<TermId>,
        instance: Option<TermId>,
    },

    /// An open record built from field accesses on an unconstrained value.
    Record {
        fields: BTreeMap<String, TermId>,
        instance: Option<TermId>,
    },

    /// A closed object literal type, fields in written order.
    Object { fields: Vec<(String, TermId)> },

    /// An ordered vector of terms. Function signatures are products whose last
    /// element is the result.
    Product(Vec<TermId>),

    /// A success type paired with the errors that may be thrown instead.
    Expected { success: TermId, errors: Vec<TermId> },
}

impl Term {
    /// The binding slot of terms that can be bound.
    pub fn instance(&self) -> Option<TermId> {
        match self {
            Term::Var { instance, .. }
            | Term::Class { instance, .. }
            | Term::Record { instance, .. } => *instance,
            _ => None,
        }
    }

    /// Whether this term can still be bound.
    pub fn is_unbound_var(&self) -> bool {
        matches!(self, Term::Var { instance: None, .. })
    }

    /// Short description used in trace output.
    pub fn kind(&self) -> &'static str {
        match self {
            Term::Var { .. } => "var",
            Term::Nominal { .. } => "nominal",
            Term::Class { .. } => "class",
            Term::Record { .. } => "record",
            Term::Object { .. } => "object",
            Term::Product(_) => "product",
            Term::Expected { .. } => "expected",
        }
    }
}

/// A term together with the handles that are copied afresh on every use.
///
/// Built-in signatures quantify over their variables so that each application
/// of `list` or `+` works on its own copy. User definitions are monomorphic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scheme {
    pub quantified: Vec<TermId>,
    pub body: TermId,
}

impl Scheme {
    /// A scheme with nothing to instantiate.
    pub fn mono(body: TermId) -> Self {
        Scheme {
            quantified: Vec::new(),
            body,
        }
    }

    pub fn poly(quantified: Vec<TermId>, body: TermId) -> Self {
        Scheme { quantified, body }
    }

    pub fn is_mono(&self) -> bool {
        self.quantified.is_empty()
    }
}
