//! AST decoration with inferred types.
//!
//! After inference, every node that was visited has a term recorded in the
//! state. Decoration copies the tree and stores each term's canonical string
//! in the node's `ty` slot. Variables are renumbered per node, so `a => a`
//! reads `(1 1)` whatever numbering the surrounding program uses.

use crate::parser::ast::{Expr, NodeId, Program};

use super::state::InferState;

/// Fills the `ty` slot of nodes from an inference state.
pub struct Decorator<'a> {
    state: &'a InferState,
}

impl<'a> Decorator<'a> {
    pub fn new(state: &'a InferState) -> Self {
        Self { state }
    }

    pub fn decorate_program(&self, program: &Program) -> Program {
        let mut decorated = program.clone();
        decorated.ty = self.type_of(program.id);
        for stmt in &mut decorated.statements {
            self.decorate_expr(stmt);
        }
        decorated
    }

    fn decorate_expr(&self, expr: &mut Expr) {
        expr.ty = self.type_of(expr.id);
        for child in expr.children_mut() {
            self.decorate_expr(child);
        }
    }

    fn type_of(&self, id: NodeId) -> Option<String> {
        self.state.node_type(id).map(|t| self.state.render(t))
    }
}

/// Decorate a program with the types inferred into `state`.
/// Nodes inference never reached keep an empty slot.
pub fn decorate_with_types(program: &Program, state: &InferState) -> Program {
    Decorator::new(state).decorate_program(program)
}
