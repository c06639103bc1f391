//! Pretty-printing for type terms.
//!
//! The canonical rendering is what unification compares and what tests
//! assert on:
//!
//! - unbound variables print as numbers
//! - bound variables, classes and records print as their instance
//! - `var` cells print as `var(inner)`
//! - nominals print as `name` or `name(g1 g2)`
//! - records print as `(k:v ...)` with sorted keys, objects as `{k:v ...}`
//! - products print as `(a b c)`
//! - expected types print as `success|error1|error2`

use std::collections::HashMap;

use super::arena::TermArena;
use super::term::{Term, TermId, VarId};

/// Context for pretty-printing, tracking variable names.
///
/// A normalizing context renumbers unbound variables `1, 2, ...` in order of
/// first appearance, so one context shared across several renderings keeps
/// their variables consistent. A raw context prints variable identifiers.
pub struct PrettyContext {
    var_names: HashMap<VarId, usize>,
    next_name: usize,
    normalize: bool,
}

impl PrettyContext {
    pub fn new() -> Self {
        PrettyContext {
            var_names: HashMap::new(),
            next_name: 1,
            normalize: true,
        }
    }

    pub fn raw() -> Self {
        PrettyContext {
            normalize: false,
            ..Self::new()
        }
    }

    fn var_name(&mut self, id: VarId) -> String {
        if !self.normalize {
            return id.to_string();
        }
        let next = &mut self.next_name;
        let name = *self.var_names.entry(id).or_insert_with(|| {
            let n = *next;
            *next += 1;
            n
        });
        name.to_string()
    }

    /// Format a term to a string.
    pub fn format_term(&mut self, arena: &TermArena, id: TermId) -> String {
        let mut out = String::new();
        self.write_term(&mut out, arena, id);
        out
    }

    fn write_term(&mut self, out: &mut String, arena: &TermArena, id: TermId) {
        // Walk binding chains in a loop; they can be as long as a container literal.
        let mut id = id;
        let mut cells = 0;
        loop {
            if arena.is_mutable(id) {
                out.push_str("var(");
                cells += 1;
            }
            match arena.get(id).instance() {
                Some(next) => id = next,
                None => break,
            }
        }

        match arena.get(id) {
            Term::Var { id: var, .. } => {
                let name = self.var_name(*var);
                out.push_str(&name);
            }

            Term::Class { name, .. } => out.push_str(name),

            Term::Nominal { name, generics } => {
                out.push_str(name);
                if !generics.is_empty() {
                    out.push('(');
                    self.write_separated(out, arena, generics);
                    out.push(')');
                }
            }

            Term::Record { fields, .. } => {
                out.push('(');
                for (i, (key, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    out.push_str(key);
                    out.push(':');
                    self.write_term(out, arena, *value);
                }
                out.push(')');
            }

            Term::Object { fields } => {
                out.push('{');
                for (i, (key, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    out.push_str(key);
                    out.push(':');
                    self.write_term(out, arena, *value);
                }
                out.push('}');
            }

            Term::Product(items) => {
                out.push('(');
                self.write_separated(out, arena, items);
                out.push(')');
            }

            Term::Expected { success, errors } => {
                self.write_term(out, arena, *success);
                for error in errors {
                    out.push('|');
                    self.write_term(out, arena, *error);
                }
            }
        }

        for _ in 0..cells {
            out.push(')');
        }
    }

    fn write_separated(&mut self, out: &mut String, arena: &TermArena, items: &[TermId]) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            self.write_term(out, arena, *item);
        }
    }
}

impl Default for PrettyContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TermArena {
    /// Render a term with a fresh normalizing context.
    pub fn render(&self, id: TermId) -> String {
        PrettyContext::new().format_term(self, id)
    }
}
