//! Property-based tests for unification and rendering.

use proptest::prelude::*;

use super::state::InferState;
use crate::lexer::Span;
use crate::types::TermId;

/// Shape of a term to build in a fresh state.
#[derive(Debug, Clone)]
enum Shape {
    Var,
    Num,
    Int,
    Float,
    Str,
    Bool,
    List(Box<Shape>),
    Tuple(Vec<Shape>),
}

fn shape_strategy() -> impl Strategy<Value = Shape> {
    let leaf = prop_oneof![
        Just(Shape::Var),
        Just(Shape::Num),
        Just(Shape::Int),
        Just(Shape::Float),
        Just(Shape::Str),
        Just(Shape::Bool),
    ];
    leaf.prop_recursive(3, 12, 3, |inner| {
        prop_oneof![
            inner.clone().prop_map(|s| Shape::List(Box::new(s))),
            prop::collection::vec(inner, 1..3).prop_map(Shape::Tuple),
        ]
    })
}

fn build(state: &mut InferState, shape: &Shape) -> TermId {
    match shape {
        Shape::Var => state.fresh_var(),
        Shape::Num => state.fresh_num(),
        Shape::Int => state.prims.int,
        Shape::Float => state.prims.float,
        Shape::Str => state.prims.string,
        Shape::Bool => state.prims.bool,
        Shape::List(item) => {
            let item = build(state, item);
            state.nominal("list", vec![item])
        }
        Shape::Tuple(items) => {
            let items = items.iter().map(|s| build(state, s)).collect();
            state.nominal("tuple", items)
        }
    }
}

/// Unify `a` with `b` in a fresh state, optionally swapping the operands.
/// Returns whether unification succeeded and the rendering of `a`.
fn unify_shapes(a: &Shape, b: &Shape, swap: bool) -> (bool, String) {
    let mut state = InferState::new();
    let left = build(&mut state, a);
    let right = build(&mut state, b);
    let span = Span::new(0, 0);
    let ok = if swap {
        state.unify(span, right, left).is_ok()
    } else {
        state.unify(span, left, right).is_ok()
    };
    (ok, state.render(left))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn unification_is_commutative(a in shape_strategy(), b in shape_strategy()) {
        let (ok_ab, rendered_ab) = unify_shapes(&a, &b, false);
        let (ok_ba, rendered_ba) = unify_shapes(&a, &b, true);
        prop_assert_eq!(ok_ab, ok_ba);
        if ok_ab {
            prop_assert_eq!(rendered_ab, rendered_ba);
        }
    }

    #[test]
    fn unification_with_itself_succeeds(a in shape_strategy()) {
        let mut state = InferState::new();
        let t = build(&mut state, &a);
        let before = state.render(t);
        prop_assert!(state.unify(Span::new(0, 0), t, t).is_ok());
        prop_assert_eq!(state.render(t), before);
    }

    #[test]
    fn rendering_is_idempotent(a in shape_strategy(), b in shape_strategy()) {
        let mut state = InferState::new();
        let left = build(&mut state, &a);
        let right = build(&mut state, &b);
        let _ = state.unify(Span::new(0, 0), left, right);
        let first = state.render(left);
        prop_assert_eq!(state.render(left), first);
    }

    #[test]
    fn both_sides_agree_after_success(a in shape_strategy(), b in shape_strategy()) {
        let mut state = InferState::new();
        let left = build(&mut state, &a);
        let right = build(&mut state, &b);
        if state.unify(Span::new(0, 0), left, right).is_ok() {
            prop_assert_eq!(state.render(left), state.render(right));
        }
    }
}
