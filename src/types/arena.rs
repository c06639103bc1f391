//! Storage for type terms.
//!
//! The arena owns every term created during one inference run. Besides the
//! term itself, each slot records whether the term is *repeatable* (a variadic
//! parameter of a built-in signature) and whether it is the cell of a `var`
//! binding.
//!
//! While a snapshot is open, every overwritten term is logged on an undo
//! trail, so restoring costs the number of changes rather than the arena size.

use super::term::{Term, TermId, VarId};

#[derive(Clone, Debug)]
struct Slot {
    term: Term,
    repeatable: bool,
    mutable: bool,
}

/// A saved arena position, used to undo a speculative unification.
#[derive(Debug)]
pub struct Snapshot {
    slots: usize,
    trail: usize,
    next_var: VarId,
}

#[derive(Clone, Debug)]
pub struct TermArena {
    slots: Vec<Slot>,
    next_var: VarId,
    /// Previous terms of slots overwritten while a snapshot is open.
    trail: Vec<(TermId, Term)>,
    open_snapshots: usize,
}

impl TermArena {
    pub fn new() -> Self {
        TermArena {
            slots: Vec::new(),
            next_var: 1,
            trail: Vec::new(),
            open_snapshots: 0,
        }
    }

    pub fn alloc(&mut self, term: Term) -> TermId {
        self.slots.push(Slot {
            term,
            repeatable: false,
            mutable: false,
        });
        self.slots.len() - 1
    }

    /// A new unbound variable with the next identifier.
    pub fn fresh_var(&mut self) -> TermId {
        let id = self.next_var;
        self.next_var += 1;
        self.alloc(Term::Var { id, instance: None })
    }

    pub fn get(&self, id: TermId) -> &Term {
        &self.slots[id].term
    }

    /// Mutable access to a term. The old term is logged if a snapshot is open.
    pub fn get_mut(&mut self, id: TermId) -> &mut Term {
        self.log(id);
        &mut self.slots[id].term
    }

    fn log(&mut self, id: TermId) {
        if self.open_snapshots > 0 {
            self.trail.push((id, self.slots[id].term.clone()));
        }
    }

    pub fn is_repeatable(&self, id: TermId) -> bool {
        self.slots[id].repeatable
    }

    pub fn mark_repeatable(&mut self, id: TermId) {
        self.slots[id].repeatable = true;
    }

    pub fn is_mutable(&self, id: TermId) -> bool {
        self.slots[id].mutable
    }

    pub fn mark_mutable(&mut self, id: TermId) {
        self.slots[id].mutable = true;
    }

    /// Bind a variable, class or record to `target`.
    ///
    /// Other terms have no binding slot and are left untouched.
    pub fn set_instance(&mut self, id: TermId, target: TermId) {
        self.log(id);
        match &mut self.slots[id].term {
            Term::Var { instance, .. }
            | Term::Class { instance, .. }
            | Term::Record { instance, .. } => *instance = Some(target),
            other => debug_assert!(false, "cannot bind a {} term", other.kind()),
        }
    }

    /// Follow binding chains to the representative term, compressing the path
    /// so later lookups are direct.
    pub fn prune(&mut self, id: TermId) -> TermId {
        let root = self.resolve(id);
        let mut current = id;
        while current != root {
            let next = match self.get(current).instance() {
                Some(next) => next,
                None => break,
            };
            if next != root {
                self.set_instance(current, root);
            }
            current = next;
        }
        root
    }

    /// Follow binding chains without modifying the arena.
    pub fn resolve(&self, mut id: TermId) -> TermId {
        while let Some(next) = self.get(id).instance() {
            id = next;
        }
        id
    }

    /// Start recording changes. Every snapshot must end in exactly one
    /// [`restore`](Self::restore) or [`commit`](Self::commit).
    pub fn snapshot(&mut self) -> Snapshot {
        self.open_snapshots += 1;
        Snapshot {
            slots: self.slots.len(),
            trail: self.trail.len(),
            next_var: self.next_var,
        }
    }

    /// Undo every allocation and binding made since `snapshot` was taken.
    pub fn restore(&mut self, snapshot: Snapshot) {
        while self.trail.len() > snapshot.trail {
            if let Some((id, term)) = self.trail.pop() {
                self.slots[id].term = term;
            }
        }
        self.slots.truncate(snapshot.slots);
        self.next_var = snapshot.next_var;
        self.close();
    }

    /// Keep the changes made since `snapshot` was taken.
    pub fn commit(&mut self, snapshot: Snapshot) {
        debug_assert!(snapshot.trail <= self.trail.len());
        self.close();
    }

    fn close(&mut self) {
        self.open_snapshots = self.open_snapshots.saturating_sub(1);
        if self.open_snapshots == 0 {
            self.trail.clear();
        }
    }
}

impl Default for TermArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(arena: &mut TermArena) -> TermId {
        arena.alloc(Term::Nominal {
            name: "int".to_string(),
            generics: vec![],
        })
    }

    #[test]
    fn test_fresh_vars_are_numbered_from_one() {
        let mut arena = TermArena::new();
        let a = arena.fresh_var();
        let b = arena.fresh_var();
        assert_eq!(arena.get(a), &Term::Var { id: 1, instance: None });
        assert_eq!(arena.get(b), &Term::Var { id: 2, instance: None });
    }

    #[test]
    fn test_prune_follows_and_compresses_chain() {
        let mut arena = TermArena::new();
        let a = arena.fresh_var();
        let b = arena.fresh_var();
        let c = arena.fresh_var();
        let i = int(&mut arena);
        arena.set_instance(a, b);
        arena.set_instance(b, c);
        arena.set_instance(c, i);

        assert_eq!(arena.resolve(a), i);
        assert_eq!(arena.prune(a), i);
        assert_eq!(arena.get(a).instance(), Some(i));
        assert_eq!(arena.get(b).instance(), Some(i));
    }

    #[test]
    fn test_prune_of_unbound_is_identity() {
        let mut arena = TermArena::new();
        let a = arena.fresh_var();
        assert_eq!(arena.prune(a), a);
    }

    #[test]
    fn test_restore_undoes_bindings_and_allocations() {
        let mut arena = TermArena::new();
        let a = arena.fresh_var();
        let snapshot = arena.snapshot();
        let i = int(&mut arena);
        arena.set_instance(a, i);
        arena.fresh_var();
        arena.restore(snapshot);

        assert!(arena.get(a).is_unbound_var());
        let next = arena.fresh_var();
        assert_eq!(next, 1);
        assert_eq!(arena.get(next), &Term::Var { id: 2, instance: None });
    }

    #[test]
    fn test_restore_undoes_field_edits() {
        let mut arena = TermArena::new();
        let a = arena.fresh_var();
        let record = arena.alloc(Term::Record {
            fields: Default::default(),
            instance: None,
        });
        let snapshot = arena.snapshot();
        if let Term::Record { fields, .. } = arena.get_mut(record) {
            fields.insert("x".to_string(), a);
        }
        arena.set_instance(record, a);
        arena.restore(snapshot);

        match arena.get(record) {
            Term::Record { fields, instance } => {
                assert!(fields.is_empty());
                assert_eq!(*instance, None);
            }
            other => panic!("expected record, got {:?}", other),
        }
    }

    #[test]
    fn test_commit_keeps_changes() {
        let mut arena = TermArena::new();
        let a = arena.fresh_var();
        let snapshot = arena.snapshot();
        let i = int(&mut arena);
        arena.set_instance(a, i);
        arena.commit(snapshot);
        assert_eq!(arena.resolve(a), i);

        // A later restore only rewinds to its own snapshot.
        let b = arena.fresh_var();
        let snapshot = arena.snapshot();
        arena.set_instance(b, i);
        arena.restore(snapshot);
        assert_eq!(arena.resolve(a), i);
        assert!(arena.get(b).is_unbound_var());
    }

    #[test]
    fn test_nested_snapshots() {
        let mut arena = TermArena::new();
        let a = arena.fresh_var();
        let b = arena.fresh_var();
        let i = int(&mut arena);
        let outer = arena.snapshot();
        arena.set_instance(a, i);
        let inner = arena.snapshot();
        arena.set_instance(b, i);
        arena.restore(inner);
        assert_eq!(arena.resolve(a), i);
        assert!(arena.get(b).is_unbound_var());
        arena.restore(outer);
        assert!(arena.get(a).is_unbound_var());
    }

    #[test]
    fn test_flags() {
        let mut arena = TermArena::new();
        let a = arena.fresh_var();
        assert!(!arena.is_repeatable(a));
        assert!(!arena.is_mutable(a));
        arena.mark_repeatable(a);
        arena.mark_mutable(a);
        assert!(arena.is_repeatable(a));
        assert!(arena.is_mutable(a));
    }
}
