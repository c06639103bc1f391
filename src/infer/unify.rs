//! Unification algorithm for type inference.
//!
//! Implements unification over arena terms, including:
//! - Variable binding with an occurs check
//! - Structural records merged with each other or subsumed by nominal
//!   property tables and object literals
//! - Narrowing of type classes to one of their traits
//! - Application of products to argument lists with repeatable parameters

use std::collections::{BTreeMap, HashSet, VecDeque};

use log::{debug, trace};

use crate::error::{MoaError, TypeError};
use crate::lexer::Span;
use crate::types::{PrettyContext, Term, TermId};

use super::infer::InferResult;
use super::state::InferState;

impl InferState {
    /// Unify two terms, binding variables, classes and records in place.
    pub fn unify(&mut self, span: Span, left: TermId, right: TermId) -> InferResult<()> {
        let l = self.eprune(left);
        let r = self.eprune(right);
        if l == r {
            return Ok(());
        }

        let lt = self.arena.get(l).clone();
        let rt = self.arena.get(r).clone();
        trace!(
            "unify {} {} with {} {}",
            lt.kind(),
            self.render(l),
            rt.kind(),
            self.render(r)
        );

        match (&lt, &rt) {
            (Term::Var { .. }, _) => self.bind(span, l, r),
            (_, Term::Var { .. }) => self.bind(span, r, l),

            (Term::Record { fields: lf, .. }, Term::Record { .. }) => {
                self.merge_records(span, l, lf, r)
            }

            (Term::Record { fields, .. }, Term::Nominal { name, .. }) if self.has_properties(name) => {
                self.subsume_nominal(span, l, fields, r, name)
            }
            (Term::Nominal { name, .. }, Term::Record { fields, .. }) if self.has_properties(name) => {
                self.subsume_nominal(span, r, fields, l, name)
            }

            (Term::Record { fields, .. }, Term::Object { fields: props }) => {
                self.subsume_object(span, l, fields, r, props)
            }
            (Term::Object { fields: props }, Term::Record { fields, .. }) => {
                self.subsume_object(span, r, fields, l, props)
            }

            (Term::Product(ls), Term::Product(rs)) => {
                if ls.len() != rs.len() {
                    return Err(TypeError::ArityMismatch {
                        expected: ls.len(),
                        found: rs.len(),
                        span,
                    }
                    .into());
                }
                for (a, b) in ls.iter().zip(rs.iter()) {
                    self.unify(span, *a, *b)?;
                }
                Ok(())
            }

            (
                Term::Nominal {
                    name: ln,
                    generics: lg,
                },
                Term::Nominal {
                    name: rn,
                    generics: rg,
                },
            ) if ln == rn && lg.len() == rg.len() => {
                for (a, b) in lg.iter().zip(rg.iter()) {
                    self.unify(span, *a, *b)?;
                }
                Ok(())
            }

            (Term::Object { fields: lf }, Term::Object { fields: rf }) if same_keys(lf, rf) => {
                for (key, a) in lf {
                    if let Some((_, b)) = rf.iter().find(|(k, _)| k == key) {
                        self.unify(span, *a, *b)?;
                    }
                }
                Ok(())
            }

            // The left class stays the root.
            (Term::Class { name: ln, .. }, Term::Class { name: rn, .. }) if ln == rn => {
                debug!("alias class {} to {}", r, l);
                self.arena.set_instance(r, l);
                Ok(())
            }

            _ => self.unify_leaves(span, l, &lt, r, &rt),
        }
    }

    /// Reflexivity, then class narrowing, then failure.
    fn unify_leaves(
        &mut self,
        span: Span,
        l: TermId,
        lt: &Term,
        r: TermId,
        rt: &Term,
    ) -> InferResult<()> {
        let l_product = matches!(lt, Term::Product(_));
        let r_product = matches!(rt, Term::Product(_));

        if !l_product && !r_product {
            let mut raw = PrettyContext::raw();
            if raw.format_term(&self.arena, l) == raw.format_term(&self.arena, r) {
                return Ok(());
            }
        }

        match (lt, rt) {
            (Term::Class { traits, .. }, _) if !r_product => self.narrow(span, l, traits, r),
            (_, Term::Class { traits, .. }) if !l_product => self.narrow(span, r, traits, l),
            _ => Err(self.mismatch(span, l, r)),
        }
    }

    /// Bind `class` to the first of its traits rendering like `target`.
    fn narrow(
        &mut self,
        span: Span,
        class: TermId,
        traits: &[TermId],
        target: TermId,
    ) -> InferResult<()> {
        let wanted = self.render(target);
        match traits.iter().find(|t| self.render(**t) == wanted) {
            Some(&chosen) => {
                debug!("narrow class {} to {}", class, wanted);
                self.arena.set_instance(class, chosen);
                Ok(())
            }
            None => {
                let candidates: Vec<String> = traits.iter().map(|t| self.render(*t)).collect();
                Err(TypeError::TypeMismatch {
                    left: candidates.join("|"),
                    right: wanted,
                    span,
                }
                .into())
            }
        }
    }

    /// Bind `var` to `target` unless `target` contains it.
    fn bind(&mut self, span: Span, var: TermId, target: TermId) -> InferResult<()> {
        debug_assert!(
            self.arena.get(var).instance().is_none(),
            "binding an already bound term"
        );
        if self.occurs_in(var, target) {
            return Err(self.mismatch(span, var, target));
        }
        debug!("bind {} := {}", var, self.render(target));
        self.arena.set_instance(var, target);
        Ok(())
    }

    /// Union the fields of `l` into record `r`, then bind `l` to `r`.
    fn merge_records(
        &mut self,
        span: Span,
        l: TermId,
        fields: &BTreeMap<String, TermId>,
        r: TermId,
    ) -> InferResult<()> {
        for (key, field) in fields {
            let existing = match self.arena.get(r) {
                Term::Record { fields, .. } => fields.get(key).copied(),
                _ => None,
            };
            match existing {
                Some(other) => self.unify(span, *field, other)?,
                None => {
                    if let Term::Record { fields, .. } = self.arena.get_mut(r) {
                        fields.insert(key.clone(), *field);
                    }
                }
            }
        }
        self.bind(span, l, r)
    }

    /// Every field of `record` must be a property of the nominal type `name`.
    fn subsume_nominal(
        &mut self,
        span: Span,
        record: TermId,
        fields: &BTreeMap<String, TermId>,
        target: TermId,
        name: &str,
    ) -> InferResult<()> {
        for (key, field) in fields {
            let prop = self
                .lookup_property(name, key)
                .ok_or_else(|| self.mismatch(span, record, target))?;
            self.unify(span, *field, prop)?;
        }
        self.bind(span, record, target)
    }

    /// Every field of `record` must be a field of the object literal type.
    fn subsume_object(
        &mut self,
        span: Span,
        record: TermId,
        fields: &BTreeMap<String, TermId>,
        target: TermId,
        props: &[(String, TermId)],
    ) -> InferResult<()> {
        for (key, field) in fields {
            let prop = props
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, t)| *t)
                .ok_or_else(|| self.mismatch(span, record, target))?;
            self.unify(span, *field, prop)?;
        }
        self.bind(span, record, target)
    }

    /// Whether `var` is reachable from `t`.
    pub fn occurs_in(&self, var: TermId, t: TermId) -> bool {
        let mut stack = vec![t];
        let mut visited = HashSet::new();
        while let Some(next) = stack.pop() {
            let next = self.arena.resolve(next);
            if next == var {
                return true;
            }
            if !visited.insert(next) {
                continue;
            }
            match self.arena.get(next) {
                Term::Nominal { generics: items, .. } | Term::Product(items) => {
                    stack.extend(items.iter().copied())
                }
                Term::Record { fields, .. } => stack.extend(fields.values().copied()),
                Term::Object { fields } => stack.extend(fields.iter().map(|(_, t)| *t)),
                Term::Expected { success, errors } => {
                    stack.push(*success);
                    stack.extend(errors.iter().copied());
                }
                Term::Var { .. } | Term::Class { .. } => {}
            }
        }
        false
    }

    /// A mismatch between two terms, rendered in one naming context.
    pub fn mismatch(&self, span: Span, l: TermId, r: TermId) -> MoaError {
        let mut ctx = PrettyContext::new();
        TypeError::TypeMismatch {
            left: ctx.format_term(&self.arena, l),
            right: ctx.format_term(&self.arena, r),
            span,
        }
        .into()
    }

    /// Apply a callee to argument terms and return the result term.
    ///
    /// A product callee lists its parameters followed by its result. A
    /// repeatable parameter keeps matching arguments until one fails to unify;
    /// that attempt is rolled back and matching moves on to the next
    /// parameter. A repeatable product is a group whose members are matched in
    /// sequence. Any other callee is unified with a product of the arguments
    /// and a fresh result.
    pub fn apply_args(&mut self, span: Span, callee: TermId, args: &[TermId]) -> InferResult<TermId> {
        let head = self.eprune(callee);
        let items = match self.arena.get(head) {
            Term::Product(items) => items.clone(),
            _ => {
                let ret = self.fresh_var();
                let mut items = args.to_vec();
                items.push(ret);
                let sig = self.product(items);
                self.unify(span, head, sig)?;
                return Ok(ret);
            }
        };
        let Some((&ret, params)) = items.split_last() else {
            return Err(TypeError::ArityMismatch {
                expected: 0,
                found: args.len(),
                span,
            }
            .into());
        };

        let mut pending: VecDeque<TermId> = params.iter().copied().collect();
        let mut last_error = None;
        let mut index = 0;
        while index < args.len() {
            let arg = args[index];
            let Some(param) = pending.front().copied() else {
                return Err(last_error.unwrap_or_else(|| {
                    TypeError::ArityMismatch {
                        expected: params.len(),
                        found: args.len(),
                        span,
                    }
                    .into()
                }));
            };

            if !self.arena.is_repeatable(param) {
                pending.pop_front();
                self.unify(span, param, arg)?;
                index += 1;
                continue;
            }

            let group = match self.arena.get(param) {
                Term::Product(members) if !members.is_empty() => Some(members.clone()),
                _ => None,
            };
            let first = group.as_ref().map_or(param, |members| members[0]);

            let snapshot = self.arena.snapshot();
            match self.unify(span, first, arg) {
                Ok(()) => {
                    self.arena.commit(snapshot);
                    trace!("repeatable parameter took argument {}", index);
                    if let Some(members) = group {
                        for member in members[1..].iter().rev() {
                            pending.push_front(*member);
                        }
                    }
                    index += 1;
                }
                Err(e) => {
                    trace!("repeatable parameter declined argument {}: {}", index, e);
                    self.arena.restore(snapshot);
                    pending.pop_front();
                    last_error = Some(e);
                }
            }
        }

        // Unfilled fixed parameters, including the rest of a started group
        let missing = pending
            .iter()
            .filter(|p| !self.arena.is_repeatable(**p))
            .count();
        if missing > 0 {
            return Err(TypeError::ArityMismatch {
                expected: args.len() + missing,
                found: args.len(),
                span,
            }
            .into());
        }
        Ok(ret)
    }
}

fn same_keys(a: &[(String, TermId)], b: &[(String, TermId)]) -> bool {
    let mut ak: Vec<&str> = a.iter().map(|(k, _)| k.as_str()).collect();
    let mut bk: Vec<&str> = b.iter().map(|(k, _)| k.as_str()).collect();
    ak.sort_unstable();
    bk.sort_unstable();
    ak == bk
}
