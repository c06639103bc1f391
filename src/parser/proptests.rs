//! Property-based tests for parser round-trip.

use proptest::prelude::*;

use super::ast::*;
use super::parse_source;
use super::pretty::{print_expr, sexp};
use crate::lexer::Span;

fn node(kind: ExprKind) -> Expr {
    Expr::new(0, kind, Span::new(0, 0))
}

// Strategy for identifiers that are not keywords
fn ident_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,5}")
        .unwrap()
        .prop_filter("not a keyword", |s| {
            !matches!(
                s.as_str(),
                "let"
                    | "var"
                    | "fn"
                    | "ft"
                    | "class"
                    | "enum"
                    | "match"
                    | "case"
                    | "if"
                    | "else"
                    | "throw"
                    | "try"
                    | "tuple"
            )
        })
}

// Strategy for simple string content (no escapes needed for round-trip)
fn simple_string_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9 ]{0,10}").unwrap()
}

fn literal_strategy() -> impl Strategy<Value = Literal> {
    prop_oneof![
        (0u32..1000).prop_map(|n| Literal::Int(n.to_string())),
        (0u32..100, 0u32..100).prop_map(|(a, b)| Literal::Float(format!("{}.{}", a, b))),
        simple_string_strategy().prop_map(Literal::Str),
        simple_string_strategy().prop_map(Literal::Template),
        simple_string_strategy().prop_map(Literal::Regex),
    ]
}

fn binop_strategy() -> impl Strategy<Value = BinOp> {
    prop_oneof![
        Just(BinOp::Add),
        Just(BinOp::Sub),
        Just(BinOp::Mul),
        Just(BinOp::Div),
        Just(BinOp::FloorDiv),
        Just(BinOp::Mod),
        Just(BinOp::Pow),
        Just(BinOp::Lt),
        Just(BinOp::Gt),
        Just(BinOp::LtEq),
        Just(BinOp::GtEq),
        Just(BinOp::EqEq),
        Just(BinOp::NotEq),
        Just(BinOp::And),
        Just(BinOp::Or),
    ]
}

fn unaryop_strategy() -> impl Strategy<Value = UnaryOp> {
    prop_oneof![Just(UnaryOp::Neg), Just(UnaryOp::Not)]
}

// Recursive expression strategy
fn expr_strategy() -> impl Strategy<Value = Expr> {
    let leaf = prop_oneof![
        literal_strategy().prop_map(|lit| node(ExprKind::Lit(lit))),
        ident_strategy().prop_map(|name| node(ExprKind::Ident(name))),
    ];

    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..3).prop_map(|items| node(ExprKind::List(items))),
            prop::collection::vec(inner.clone(), 1..3)
                .prop_map(|items| node(ExprKind::Tuple(items))),
            prop::collection::vec((ident_strategy(), inner.clone()), 0..3)
                .prop_map(|fields| node(ExprKind::Object(fields))),
            (binop_strategy(), inner.clone(), inner.clone()).prop_map(|(op, left, right)| {
                node(ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                })
            }),
            (unaryop_strategy(), inner.clone()).prop_map(|(op, operand)| {
                node(ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                })
            }),
            (inner.clone(), ident_strategy()).prop_map(|(target, name)| {
                node(ExprKind::Field {
                    target: Box::new(target),
                    name,
                })
            }),
            (inner.clone(), 0usize..4).prop_map(|(target, index)| {
                node(ExprKind::Index {
                    target: Box::new(target),
                    index,
                })
            }),
            (ident_strategy(), prop::collection::vec(inner.clone(), 0..3)).prop_map(
                |(name, args)| {
                    node(ExprKind::Call {
                        callee: Box::new(node(ExprKind::Ident(name))),
                        args,
                    })
                }
            ),
            (prop::collection::vec(ident_strategy(), 1..3), inner.clone()).prop_map(
                |(params, body)| {
                    node(ExprKind::Lambda {
                        params,
                        body: Box::new(body),
                    })
                }
            ),
            inner.prop_map(|value| node(ExprKind::Throw(Box::new(value)))),
        ]
    })
}

fn reparse(source: &str) -> Expr {
    let program = parse_source(source).unwrap_or_else(|e| panic!("{} in {:?}", e, source));
    assert_eq!(program.statements.len(), 1, "{:?}", source);
    program.statements.into_iter().next().unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn test_print_then_parse_preserves_structure(expr in expr_strategy()) {
        let source = print_expr(&expr);
        let parsed = reparse(&source);
        prop_assert_eq!(sexp(&parsed), sexp(&expr), "source: {}", source);
    }

    #[test]
    fn test_printing_is_a_fixed_point(expr in expr_strategy()) {
        let once = print_expr(&expr);
        let twice = print_expr(&reparse(&once));
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn test_node_ids_are_distinct(expr in expr_strategy()) {
        let parsed = reparse(&print_expr(&expr));
        let mut ids = Vec::new();
        let mut stack = vec![&parsed];
        while let Some(e) = stack.pop() {
            ids.push(e.id);
            stack.extend(e.children());
        }
        let count = ids.len();
        ids.sort_unstable();
        ids.dedup();
        prop_assert_eq!(ids.len(), count);
    }
}
