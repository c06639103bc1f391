//! Inference state management.
//!
//! This module provides the `InferState` struct which tracks:
//! - The term arena for one inference run
//! - The primitive terms shared within the run
//! - The property tables of nominal types
//! - The term inferred for each AST node

use std::collections::{BTreeSet, HashMap};

use crate::parser::ast::{NodeId, TypeExpr};
use crate::types::{PrettyContext, Scheme, Term, TermArena, TermId};

/// Primitive terms, allocated once per run.
#[derive(Clone, Copy, Debug)]
pub struct Primitives {
    pub void: TermId,
    pub bool: TermId,
    pub int: TermId,
    pub float: TermId,
    pub string: TermId,
    pub regexp: TermId,
}

/// Inference state tracking terms, property tables and node types.
pub struct InferState {
    pub arena: TermArena,

    pub prims: Primitives,

    /// Known fields of nominal types, keyed by type name.
    properties: HashMap<String, Vec<(String, TermId)>>,

    /// Inferred term of every visited node.
    node_types: HashMap<NodeId, TermId>,
}

impl Default for InferState {
    fn default() -> Self {
        Self::new()
    }
}

impl InferState {
    /// Create a new inference state with a fresh arena.
    pub fn new() -> Self {
        let mut arena = TermArena::new();
        let mut prim = |name: &str| {
            arena.alloc(Term::Nominal {
                name: name.to_string(),
                generics: Vec::new(),
            })
        };
        let prims = Primitives {
            void: prim("void"),
            bool: prim("bool"),
            int: prim("int"),
            float: prim("float"),
            string: prim("string"),
            regexp: prim("regexp"),
        };
        InferState {
            arena,
            prims,
            properties: HashMap::new(),
            node_types: HashMap::new(),
        }
    }

    pub fn fresh_var(&mut self) -> TermId {
        self.arena.fresh_var()
    }

    /// A fresh `num` class narrowing to `int` or `float`.
    pub fn fresh_num(&mut self) -> TermId {
        self.arena.alloc(Term::Class {
            name: "num".to_string(),
            traits: vec![self.prims.int, self.prims.float],
            instance: None,
        })
    }

    pub fn nominal(&mut self, name: &str, generics: Vec<TermId>) -> TermId {
        self.arena.alloc(Term::Nominal {
            name: name.to_string(),
            generics,
        })
    }

    pub fn product(&mut self, items: Vec<TermId>) -> TermId {
        self.arena.alloc(Term::Product(items))
    }

    /// The term a declared type name stands for.
    pub fn type_named(&mut self, name: &str) -> TermId {
        match name {
            "void" => self.prims.void,
            "bool" => self.prims.bool,
            "int" => self.prims.int,
            "float" => self.prims.float,
            "string" => self.prims.string,
            "regexp" => self.prims.regexp,
            _ => self.nominal(name, Vec::new()),
        }
    }

    /// The term of a written type such as `list(int)`.
    pub fn type_expr(&mut self, ty: &TypeExpr) -> TermId {
        if ty.args.is_empty() {
            return self.type_named(&ty.name);
        }
        let generics = ty.args.iter().map(|arg| self.type_expr(arg)).collect();
        self.nominal(&ty.name, generics)
    }

    /// Prune, then look through an expected type to its success slot.
    pub fn eprune(&mut self, t: TermId) -> TermId {
        let pruned = self.arena.prune(t);
        match self.arena.get(pruned) {
            Term::Expected { success, .. } => {
                let success = *success;
                self.arena.prune(success)
            }
            _ => pruned,
        }
    }

    /// The success part of `t`, or `t` itself when it carries no errors.
    ///
    /// `var` cells are returned as they are so they keep rendering as cells.
    pub fn success_of(&mut self, t: TermId) -> TermId {
        let pruned = self.arena.prune(t);
        match self.arena.get(pruned) {
            Term::Expected { success, .. } => *success,
            _ => t,
        }
    }

    pub fn errors_of(&mut self, t: TermId) -> Vec<TermId> {
        let pruned = self.arena.prune(t);
        match self.arena.get(pruned) {
            Term::Expected { errors, .. } => errors.clone(),
            _ => Vec::new(),
        }
    }

    /// Drop errors whose rendering was already seen, keeping first occurrences.
    pub fn merge_errors(&self, errors: Vec<TermId>) -> Vec<TermId> {
        let mut ctx = PrettyContext::raw();
        let mut seen = BTreeSet::new();
        errors
            .into_iter()
            .filter(|e| seen.insert(ctx.format_term(&self.arena, *e)))
            .collect()
    }

    pub fn expected(&mut self, success: TermId, errors: Vec<TermId>) -> TermId {
        self.arena.alloc(Term::Expected { success, errors })
    }

    /// Attach `extra` errors to `t`, merging with the errors it already has.
    pub fn wrap_errors(&mut self, t: TermId, extra: Vec<TermId>) -> TermId {
        if extra.is_empty() {
            return t;
        }
        let success = self.success_of(t);
        let mut errors = self.errors_of(t);
        errors.extend(extra);
        let errors = self.merge_errors(errors);
        self.expected(success, errors)
    }

    /// Copy the body of a scheme, replacing each quantified term by a fresh one.
    pub fn instantiate(&mut self, scheme: &Scheme) -> TermId {
        if scheme.is_mono() {
            return scheme.body;
        }
        let mut copies = HashMap::new();
        self.copy_term(scheme.body, &scheme.quantified, &mut copies)
    }

    fn copy_term(
        &mut self,
        t: TermId,
        quantified: &[TermId],
        copies: &mut HashMap<TermId, TermId>,
    ) -> TermId {
        if let Some(&copy) = copies.get(&t) {
            return copy;
        }
        let copy = match self.arena.get(t).clone() {
            term if term.is_unbound_var() && quantified.contains(&t) => self.fresh_var(),
            Term::Class {
                name,
                traits,
                instance: None,
            } if quantified.contains(&t) => self.arena.alloc(Term::Class {
                name,
                traits,
                instance: None,
            }),
            Term::Nominal { name, generics } => {
                let copied: Vec<TermId> = generics
                    .iter()
                    .map(|g| self.copy_term(*g, quantified, copies))
                    .collect();
                if copied == generics {
                    t
                } else {
                    self.nominal(&name, copied)
                }
            }
            Term::Product(items) => {
                let copied = items
                    .iter()
                    .map(|item| self.copy_term(*item, quantified, copies))
                    .collect();
                self.product(copied)
            }
            Term::Expected { success, errors } => {
                let success = self.copy_term(success, quantified, copies);
                let errors = errors
                    .iter()
                    .map(|e| self.copy_term(*e, quantified, copies))
                    .collect();
                self.expected(success, errors)
            }
            _ => t,
        };
        if copy != t && self.arena.is_repeatable(t) {
            self.arena.mark_repeatable(copy);
        }
        copies.insert(t, copy);
        copy
    }

    /// Canonical rendering with variables renumbered from 1.
    pub fn render(&self, t: TermId) -> String {
        self.arena.render(t)
    }

    /// Register the fields of a nominal type.
    pub fn register_properties(&mut self, name: &str, fields: Vec<(String, TermId)>) {
        self.properties.insert(name.to_string(), fields);
    }

    pub fn has_properties(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// The type of field `prop` on nominal type `name`.
    pub fn lookup_property(&self, name: &str, prop: &str) -> Option<TermId> {
        self.properties
            .get(name)?
            .iter()
            .find(|(field, _)| field == prop)
            .map(|(_, t)| *t)
    }

    pub fn record_node(&mut self, id: NodeId, t: TermId) {
        self.node_types.insert(id, t);
    }

    pub fn node_type(&self, id: NodeId) -> Option<TermId> {
        self.node_types.get(&id).copied()
    }
}
