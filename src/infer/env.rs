//! Type environment for name bindings.
//!
//! The type environment maps names to their type schemes. Nested scopes
//! (function and lambda bodies, match arms, conditional branches) work on a
//! clone, so inner bindings never leak outward.

use std::collections::HashMap;

use crate::types::Scheme;

/// Whether a binding is mutable or immutable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutability {
    /// Can be reassigned (`var` declarations)
    Mutable,
    /// Cannot be reassigned (everything else)
    Immutable,
}

/// A binding in the type environment.
#[derive(Clone, Debug)]
pub struct Binding {
    pub scheme: Scheme,
    pub mutability: Mutability,
}

impl Binding {
    pub fn mutable(scheme: Scheme) -> Self {
        Binding {
            scheme,
            mutability: Mutability::Mutable,
        }
    }

    pub fn immutable(scheme: Scheme) -> Self {
        Binding {
            scheme,
            mutability: Mutability::Immutable,
        }
    }

    pub fn is_mutable(&self) -> bool {
        self.mutability == Mutability::Mutable
    }
}

/// Type environment mapping names to type schemes.
#[derive(Clone, Debug, Default)]
pub struct TypeEnv {
    bindings: HashMap<String, Binding>,
}

impl TypeEnv {
    /// Create an empty environment.
    pub fn empty() -> Self {
        TypeEnv {
            bindings: HashMap::new(),
        }
    }

    /// Look up a name and return just its scheme.
    pub fn lookup(&self, name: &str) -> Option<&Scheme> {
        self.bindings.get(name).map(|b| &b.scheme)
    }

    pub fn lookup_binding(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    /// Bind `name` in this scope, shadowing any earlier binding.
    pub fn insert(&mut self, name: impl Into<String>, binding: Binding) {
        self.bindings.insert(name.into(), binding);
    }

    pub fn insert_immutable(&mut self, name: impl Into<String>, scheme: Scheme) {
        self.insert(name, Binding::immutable(scheme));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_env() {
        let env = TypeEnv::empty();
        assert!(env.lookup("x").is_none());
        assert!(!env.contains("x"));
    }

    #[test]
    fn test_clone_leaves_original_unchanged() {
        let env = TypeEnv::empty();
        let mut inner = env.clone();
        inner.insert_immutable("x", Scheme::mono(0));

        assert!(env.lookup("x").is_none());
        assert_eq!(inner.lookup("x"), Some(&Scheme::mono(0)));
    }

    #[test]
    fn test_shadowing() {
        let mut env = TypeEnv::empty();
        env.insert_immutable("x", Scheme::mono(0));
        env.insert_immutable("x", Scheme::mono(1));

        assert_eq!(env.lookup("x"), Some(&Scheme::mono(1)));
    }

    #[test]
    fn test_mutability() {
        let mut env = TypeEnv::empty();
        env.insert("x", Binding::mutable(Scheme::mono(0)));
        env.insert_immutable("y", Scheme::mono(1));

        assert!(env.lookup_binding("x").is_some_and(Binding::is_mutable));
        assert_eq!(
            env.lookup_binding("y").map(|b| b.mutability),
            Some(Mutability::Immutable)
        );
        assert!(env.contains("x") && env.contains("y"));
    }
}
