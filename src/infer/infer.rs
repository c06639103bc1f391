//! Core type inference algorithm.
//!
//! Walks the AST depth first, producing a term per node and recording it in
//! the state so the tree can be decorated afterwards.

use log::debug;

use crate::error::{MoaError, TypeError};
use crate::lexer::Span;
use crate::parser::ast::{
    AssignOp, EnumCase, Expr, ExprKind, Literal, MatchCase, Pattern, Program, TypeExpr, UnaryOp,
};
use crate::types::{Scheme, Term, TermId};

use super::env::{Binding, TypeEnv};
use super::state::InferState;

/// Result type for inference operations.
pub type InferResult<T> = Result<T, MoaError>;

impl InferState {
    /// Infer the type of a program.
    ///
    /// Top-level declarations are added to `env`.
    pub fn infer_program(&mut self, env: &mut TypeEnv, program: &Program) -> InferResult<TermId> {
        let t = self.infer_block(env, &program.statements)?;
        self.record_node(program.id, t);
        Ok(t)
    }

    /// Infer the type of an expression or statement.
    pub fn infer_expr(&mut self, env: &mut TypeEnv, expr: &Expr) -> InferResult<TermId> {
        let t = self.infer_kind(env, expr)?;
        self.record_node(expr.id, t);
        Ok(t)
    }

    fn infer_kind(&mut self, env: &mut TypeEnv, expr: &Expr) -> InferResult<TermId> {
        let span = expr.span;
        match &expr.kind {
            ExprKind::Lit(lit) => Ok(self.infer_literal(lit)),

            ExprKind::Ident(name) => self.lookup(env, name, span),

            ExprKind::List(items) => {
                let list = self.lookup(env, "list", span)?;
                let args: Vec<&Expr> = items.iter().collect();
                self.infer_application(env, list, &args, span)
            }

            ExprKind::Dict(entries) => {
                let dict = self.lookup(env, "dict", span)?;
                let args: Vec<&Expr> = entries.iter().flat_map(|(k, v)| [k, v]).collect();
                self.infer_application(env, dict, &args, span)
            }

            ExprKind::Object(fields) => {
                let mut errors = Vec::new();
                let mut terms = Vec::with_capacity(fields.len());
                for (key, value) in fields {
                    let t = self.infer_expr(env, value)?;
                    errors.extend(self.errors_of(t));
                    terms.push((key.clone(), self.success_of(t)));
                }
                let object = self.arena.alloc(Term::Object { fields: terms });
                Ok(self.wrap_errors(object, errors))
            }

            ExprKind::Tuple(items) => {
                let mut errors = Vec::new();
                let mut generics = Vec::with_capacity(items.len());
                for item in items {
                    let t = self.infer_expr(env, item)?;
                    errors.extend(self.errors_of(t));
                    generics.push(self.success_of(t));
                }
                let tuple = self.nominal("tuple", generics);
                Ok(self.wrap_errors(tuple, errors))
            }

            ExprKind::Call { callee, args } => {
                let f = self.infer_expr(env, callee)?;
                let args: Vec<&Expr> = args.iter().collect();
                self.infer_application(env, f, &args, span)
            }

            ExprKind::Binary { op, left, right } => {
                let f = self.lookup(env, op.symbol(), span)?;
                self.infer_application(env, f, &[left.as_ref(), right.as_ref()], span)
            }

            ExprKind::Unary { op, operand } => {
                let t = self.infer_expr(env, operand)?;
                let errors = self.errors_of(t);
                let result = match op {
                    UnaryOp::Not => self.prims.bool,
                    UnaryOp::Neg => self.fresh_num(),
                };
                self.unify(span, result, t)?;
                Ok(self.wrap_errors(result, errors))
            }

            ExprKind::Field { target, name } => {
                let t = self.infer_expr(env, target)?;
                let errors = self.errors_of(t);
                let field = self.property(t, name, span)?;
                Ok(self.wrap_errors(field, errors))
            }

            ExprKind::Index { target, index } => {
                let t = self.infer_expr(env, target)?;
                let errors = self.errors_of(t);
                let base = self.eprune(t);
                let item = match self.arena.get(base) {
                    Term::Nominal { generics, .. } => generics.get(*index).copied(),
                    _ => None,
                };
                let item = item.ok_or_else(|| TypeError::UnknownProperty {
                    prop: index.to_string(),
                    ty: self.render(base),
                    span,
                })?;
                Ok(self.wrap_errors(item, errors))
            }

            ExprKind::Lambda { params, body } => {
                let mut inner = env.clone();
                let mut items = self.bind_params(&mut inner, params);
                items.push(self.infer_expr(&mut inner, body)?);
                Ok(self.product(items))
            }

            ExprKind::Let { name, value } => {
                let t = self.infer_expr(env, value)?;
                env.insert_immutable(name.as_str(), Scheme::mono(t));
                Ok(t)
            }

            ExprKind::Var { name, value } => {
                let t = self.infer_expr(env, value)?;
                let cell = self.fresh_var();
                self.arena.set_instance(cell, t);
                self.arena.mark_mutable(cell);
                env.insert(name.as_str(), Binding::mutable(Scheme::mono(cell)));
                Ok(cell)
            }

            ExprKind::Assign { name, op, value } => self.infer_assign(env, name, *op, value, span),

            ExprKind::Fn { name, params, body } => self.infer_fn(env, name, params, body, span),

            ExprKind::Ft {
                name,
                params,
                types,
            } => {
                let vars: Vec<(String, TermId)> = params
                    .iter()
                    .map(|p| (p.clone(), self.fresh_var()))
                    .collect();
                let items = types.iter().map(|ty| self.declared_type(ty, &vars)).collect();
                let sig = self.product(items);
                debug!("declare {} : {}", name, self.render(sig));
                env.insert_immutable(name.as_str(), Scheme::mono(sig));
                Ok(sig)
            }

            ExprKind::Class { name, fields } => {
                let props: Vec<(String, TermId)> = fields
                    .iter()
                    .map(|(field, ty)| (field.clone(), self.type_expr(ty)))
                    .collect();
                let mut items: Vec<TermId> = props.iter().map(|(_, t)| *t).collect();
                items.push(self.nominal(name, Vec::new()));
                self.register_properties(name, props);
                let ctor = self.product(items);
                debug!("class {} : {}", name, self.render(ctor));
                env.insert_immutable(name.as_str(), Scheme::mono(ctor));
                Ok(ctor)
            }

            ExprKind::Enum { name, cases } => Ok(self.infer_enum(env, name, cases)),

            ExprKind::Match { scrutinee, cases } => self.infer_match(env, scrutinee, cases),

            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.infer_expr(env, cond)?;
                self.infer_expr(&mut env.clone(), then_branch)?;
                if let Some(else_branch) = else_branch {
                    self.infer_expr(&mut env.clone(), else_branch)?;
                }
                Ok(self.prims.void)
            }

            ExprKind::Throw(value) => {
                let t = self.infer_expr(env, value)?;
                let mut errors = vec![self.success_of(t)];
                errors.extend(self.errors_of(t));
                let errors = self.merge_errors(errors);
                let success = self.fresh_var();
                Ok(self.expected(success, errors))
            }

            ExprKind::Try { body, handler } => {
                let t = self.infer_expr(env, body)?;
                let success = self.success_of(t);
                let h = self.infer_expr(env, handler)?;
                let e = self.fresh_var();
                let error = self.nominal("error", vec![e]);
                let accepted = self.product(vec![error, success]);
                self.unify(span, accepted, h)?;
                Ok(success)
            }

            ExprKind::Block(stmts) => self.infer_block(env, stmts),
        }
    }

    fn infer_literal(&mut self, lit: &Literal) -> TermId {
        match lit {
            Literal::Int(_) => self.fresh_num(),
            Literal::Float(_) => self.prims.float,
            Literal::Str(_) | Literal::Template(_) => self.prims.string,
            Literal::Regex(_) => self.prims.regexp,
        }
    }

    /// Instantiate the scheme bound to `name`.
    fn lookup(&mut self, env: &TypeEnv, name: &str, span: Span) -> InferResult<TermId> {
        let scheme = env
            .lookup(name)
            .cloned()
            .ok_or_else(|| TypeError::UnknownIdentifier {
                name: name.to_string(),
                span,
            })?;
        let t = self.instantiate(&scheme);
        Ok(self.arena.prune(t))
    }

    /// Apply `callee` to the inferred arguments, collecting their errors.
    fn infer_application(
        &mut self,
        env: &mut TypeEnv,
        callee: TermId,
        args: &[&Expr],
        span: Span,
    ) -> InferResult<TermId> {
        let mut errors = self.errors_of(callee);
        let mut terms = Vec::with_capacity(args.len());
        for arg in args {
            let t = self.infer_expr(env, arg)?;
            errors.extend(self.errors_of(t));
            terms.push(t);
        }
        let result = self.apply_args(span, callee, &terms)?;
        Ok(self.wrap_errors(result, errors))
    }

    /// Sequence statements: the last success with the errors of all of them.
    fn infer_block(&mut self, env: &mut TypeEnv, stmts: &[Expr]) -> InferResult<TermId> {
        let mut errors = Vec::new();
        let mut last = self.prims.void;
        for stmt in stmts {
            last = self.infer_expr(env, stmt)?;
            errors.extend(self.errors_of(last));
        }
        let success = self.success_of(last);
        Ok(self.wrap_errors(success, errors))
    }

    /// The type of field `name` on `target`.
    ///
    /// An unconstrained target becomes a record holding the field.
    fn property(&mut self, target: TermId, name: &str, span: Span) -> InferResult<TermId> {
        let base = self.eprune(target);
        let found = match self.arena.get(base).clone() {
            Term::Var { .. } => {
                let field = self.fresh_var();
                let record = self.arena.alloc(Term::Record {
                    fields: [(name.to_string(), field)].into_iter().collect(),
                    instance: None,
                });
                debug!("open record for {} on {}", name, base);
                self.arena.set_instance(base, record);
                Some(field)
            }
            Term::Record { fields, .. } => match fields.get(name) {
                Some(field) => Some(*field),
                None => {
                    let field = self.fresh_var();
                    if let Term::Record { fields, .. } = self.arena.get_mut(base) {
                        fields.insert(name.to_string(), field);
                    }
                    Some(field)
                }
            },
            Term::Nominal { name: ty, .. } => self.lookup_property(&ty, name),
            Term::Object { fields } => fields.iter().find(|(k, _)| k == name).map(|(_, t)| *t),
            _ => None,
        };
        found.ok_or_else(|| {
            TypeError::UnknownProperty {
                prop: name.to_string(),
                ty: self.render(base),
                span,
            }
            .into()
        })
    }

    /// Bind each parameter to a fresh variable in `env`.
    fn bind_params(&mut self, env: &mut TypeEnv, params: &[String]) -> Vec<TermId> {
        params
            .iter()
            .map(|param| {
                let v = self.fresh_var();
                env.insert_immutable(param.as_str(), Scheme::mono(v));
                v
            })
            .collect()
    }

    fn infer_fn(
        &mut self,
        env: &mut TypeEnv,
        name: &str,
        params: &[String],
        body: &Expr,
        span: Span,
    ) -> InferResult<TermId> {
        let declared = env.lookup(name).cloned();
        let mut inner = env.clone();
        let recursive = match declared {
            Some(_) => None,
            None => {
                let v = self.fresh_var();
                inner.insert_immutable(name, Scheme::mono(v));
                Some(v)
            }
        };

        let mut items = self.bind_params(&mut inner, params);
        items.push(self.infer_expr(&mut inner, body)?);
        let sig = self.product(items);

        match (declared, recursive) {
            (Some(scheme), _) => {
                let declared = self.instantiate(&scheme);
                self.unify(span, declared, sig)?;
                debug!("fn {} checked against {}", name, self.render(declared));
                Ok(declared)
            }
            (None, Some(v)) => {
                self.unify(span, v, sig)?;
                debug!("fn {} : {}", name, self.render(sig));
                env.insert_immutable(name, Scheme::mono(sig));
                Ok(sig)
            }
            (None, None) => Ok(sig),
        }
    }

    /// A written type where parameter names stand for their variables.
    fn declared_type(&mut self, ty: &TypeExpr, vars: &[(String, TermId)]) -> TermId {
        if ty.args.is_empty() {
            if let Some((_, v)) = vars.iter().find(|(p, _)| *p == ty.name) {
                return *v;
            }
            return self.type_named(&ty.name);
        }
        let generics = ty
            .args
            .iter()
            .map(|arg| self.declared_type(arg, vars))
            .collect();
        self.nominal(&ty.name, generics)
    }

    fn infer_enum(&mut self, env: &mut TypeEnv, name: &str, cases: &[EnumCase]) -> TermId {
        let parent = self.nominal(name, Vec::new());
        env.insert_immutable(name, Scheme::mono(parent));
        for case in cases {
            let t = if case.fields.is_empty() {
                parent
            } else {
                let mut items: Vec<TermId> =
                    case.fields.iter().map(|ty| self.type_expr(ty)).collect();
                items.push(parent);
                self.product(items)
            };
            debug!("enum {} case {} : {}", name, case.tag, self.render(t));
            env.insert_immutable(case.tag.as_str(), Scheme::mono(t));
        }
        parent
    }

    fn infer_match(
        &mut self,
        env: &mut TypeEnv,
        scrutinee: &Expr,
        cases: &[MatchCase],
    ) -> InferResult<TermId> {
        let subject = self.infer_expr(env, scrutinee)?;
        let mut errors = self.errors_of(subject);
        let result = self.fresh_var();

        for case in cases {
            let mut inner = env.clone();
            let pattern = match &case.pattern {
                Pattern::Wildcard => None,
                Pattern::Lit(lit) => Some(self.infer_literal(lit)),
                Pattern::Tag { name, bindings } => {
                    let tag = self.lookup(env, name, case.span)?;
                    if bindings.is_empty() {
                        Some(tag)
                    } else {
                        let vars = self.bind_params(&mut inner, bindings);
                        Some(self.apply_args(case.span, tag, &vars)?)
                    }
                }
            };
            if let Some(pattern) = pattern {
                self.unify(case.span, subject, pattern)?;
            }
            let body = self.infer_expr(&mut inner, &case.body)?;
            errors.extend(self.errors_of(body));
            self.unify(case.body.span, result, body)?;
        }
        Ok(self.wrap_errors(result, errors))
    }

    fn infer_assign(
        &mut self,
        env: &mut TypeEnv,
        name: &str,
        op: AssignOp,
        value: &Expr,
        span: Span,
    ) -> InferResult<TermId> {
        let cell = env
            .lookup_binding(name)
            .filter(|b| b.is_mutable())
            .map(|b| b.scheme.body)
            .ok_or_else(|| TypeError::ImmutableAssignment {
                name: name.to_string(),
                span,
            })?;
        let t = self.infer_expr(env, value)?;
        let errors = self.errors_of(t);
        match op.binary() {
            None => self.unify(span, cell, t)?,
            Some(bin) => {
                let f = self.lookup(env, bin.symbol(), span)?;
                let result = self.apply_args(span, f, &[cell, t])?;
                self.unify(span, cell, result)?;
            }
        }
        Ok(self.wrap_errors(cell, errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infer::infer_source;
    use crate::parser::parse_source;

    fn infer_str(source: &str) -> String {
        infer_source(source).unwrap_or_else(|e| panic!("{} in {:?}", e, source))
    }

    fn infer_err(source: &str) -> TypeError {
        match infer_source(source) {
            Err(MoaError::Type(e)) => e,
            other => panic!("expected a type error for {:?}, got {:?}", source, other),
        }
    }

    fn mismatch(source: &str) -> (String, String) {
        match infer_err(source) {
            TypeError::TypeMismatch { left, right, .. } => (left, right),
            other => panic!("expected a mismatch for {:?}, got {:?}", source, other),
        }
    }

    fn check(cases: &[(&str, &str)]) {
        for (expected, source) in cases {
            assert_eq!(infer_str(source), *expected, "source: {:?}", source);
        }
    }

    #[test]
    fn test_primitives() {
        check(&[
            ("bool", "true"),
            ("bool", "false"),
            ("num", "1"),
            ("float", "1.2"),
            ("string", "\"hi\""),
            ("string", "`hi`"),
            ("regexp", "r\"hi\""),
            ("string", "$\"hi\""),
        ]);
    }

    #[test]
    fn test_lambdas() {
        check(&[
            ("(1 1)", "a => a"),
            ("(1 2 1)", "a,b => a"),
            ("(1 2 2)", "a,b => b"),
        ]);
    }

    #[test]
    fn test_objects() {
        check(&[
            ("{}", "{}"),
            ("{a:num}", "{a:1}"),
            ("{a:num b:string}", "{a:(2+3) b:\"\"}"),
            ("float", "{a:1.5}.a"),
        ]);
    }

    #[test]
    fn test_containers() {
        check(&[
            ("list(1)", "[]"),
            ("list(num)", "[1]"),
            ("list(float)", "[1.0]"),
            ("list(num)", "[1 2]"),
            ("list(float)", "[1 2.0]"),
            ("list(float)", "[1 2.0 3]"),
            ("set(1)", "set()"),
            ("set(num)", "set(1)"),
            ("dict(1 2)", "dict()"),
            ("dict(string num)", "dict(\"a\" 1)"),
            ("dict(1 2)", "[:]"),
            ("dict(string num)", "[a:1]"),
            ("tuple(num)", "tuple(1)"),
            ("tuple(num float)", "tuple(1 0.0)"),
            ("tuple(num float string)", "tuple(1 0.0 \"a\")"),
        ]);
    }

    #[test]
    fn test_heterogeneous_list_fails() {
        assert_eq!(
            mismatch("[1 \"a\"]"),
            ("int|float".to_string(), "string".to_string())
        );
    }

    #[test]
    fn test_properties() {
        check(&[
            ("num", "tuple(1).0"),
            ("string", "tuple(1 \"s\").1"),
            ("int", "[].size"),
            ("int", "\"s\".size"),
            ("((x:1) 1)", "p => p.x"),
            ("((size:1) 1)", "fn f x: x.size"),
            ("((size:num) num)", "fn f x:\n  x.size + 1"),
            ("((size:float) float)", "fn f x:\n  x.size + 1.0"),
            ("((x:num y:num) num)", "p => p.x + p.y"),
            ("((x:float y:float) float)", "p => p.x + p.y + 1.0"),
            ("int", "fn f x: x.size\nf \"a\""),
            ("int", "fn f x: x.size\nf []"),
            ("string", "class p: name string\nfn f x: x.name\nf p(\"s\")"),
        ]);
    }

    #[test]
    fn test_structural_subsumption_failure() {
        assert_eq!(
            mismatch("fn f x: x.size\nf true"),
            ("(size:1)".to_string(), "bool".to_string())
        );
    }

    #[test]
    fn test_unknown_property() {
        match infer_err("true.size") {
            TypeError::UnknownProperty { prop, ty, .. } => {
                assert_eq!(prop, "size");
                assert_eq!(ty, "bool");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            infer_err("tuple(1).3"),
            TypeError::UnknownProperty { .. }
        ));
    }

    #[test]
    fn test_conversions() {
        check(&[
            ("int", "int(1)"),
            ("float", "float(1)"),
            ("int", "int(float(1))"),
            ("float", "float(int(1))"),
            ("string", "string(1)"),
        ]);
    }

    #[test]
    fn test_conditionals() {
        check(&[
            ("void", "if false: 1"),
            ("void", "if false: 1\nelse: 2"),
            ("void", "if false: 1\nelse if true: 2"),
            ("void", "if false: 1\nelse if true: 2\nelse: 3"),
        ]);
    }

    #[test]
    fn test_branch_bindings_do_not_leak() {
        assert!(matches!(
            infer_err("if true:\n  let y 1\ny"),
            TypeError::UnknownIdentifier { name, .. } if name == "y"
        ));
    }

    #[test]
    fn test_variables() {
        check(&[
            ("num", "let x 1"),
            ("var(num)", "var x 1"),
            ("var(num)", "var x 1\nx = 2"),
            ("var(float)", "var x 1\nx += 2.5"),
            ("float", "var x 1\nx -= 2.5\nx"),
        ]);
    }

    #[test]
    fn test_assignment_to_immutable() {
        for source in ["let x 1\nx+=1", "let x 1\nx = 2", "y = 1"] {
            assert!(
                matches!(infer_err(source), TypeError::ImmutableAssignment { .. }),
                "source: {:?}",
                source
            );
        }
    }

    #[test]
    fn test_functions() {
        check(&[
            ("(num)", "fn f: 1"),
            ("(1 1)", "fn f x: x"),
            ("(num num)", "fn f x: x + 1"),
            ("(num)", "fn f:\n  if true: throw \"error\"\n  1"),
            ("num", "fn f x: x\nf 1"),
            ("float", "fn f a b: a * b\nf(1 2.0)"),
        ]);
    }

    #[test]
    fn test_recursive_function() {
        check(&[
            ("(num 1)", "fn f x: f(x - 1)"),
            ("(1 2)", "fn f x: f x"),
            ("(num num)", "fn f x:\n  if x < 1: 0\n  f(x - 1) + 1"),
        ]);
    }

    #[test]
    fn test_arity_mismatch() {
        match infer_err("fn f x: x\nf 1 2") {
            TypeError::ArityMismatch {
                expected, found, ..
            } => assert_eq!((expected, found), (1, 2)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_dict_missing_value() {
        match infer_err("dict(\"a\" 1 \"b\")") {
            TypeError::ArityMismatch {
                expected, found, ..
            } => assert_eq!((expected, found), (4, 3)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_classes() {
        check(&[
            ("item", "class item:\n  name string\nitem(\"moa\")"),
            ("item", "class item:\n  name string\n  price int\nitem(\"moa\" 1)"),
            (
                "string",
                "class item:\n  name string\n  price int\nitem(\"moa\" 1).name",
            ),
            (
                "int",
                "class item:\n  name string\n  price int\nitem(\"moa\" 1).price",
            ),
            ("(string item)", "class item: name string"),
        ]);
    }

    #[test]
    fn test_enums() {
        check(&[
            ("ab", "enum ab:\n  a\n  b\na"),
            ("ab", "enum ab:\n  a\n  b\nb"),
            ("ab", "enum ab:\n  a string\n  b int\na \"a\""),
            ("ab", "enum ab:\n  a string\n  b int\nb 1"),
            ("float", "enum ab:\n  a\n  b\nmatch a:\n  case a: 1\n  case b: 2.0"),
            (
                "string",
                "enum ab:\n  a string\n  b int\nmatch a \"hi\":\n  case a s: s\n  case b n: string(n)",
            ),
        ]);
    }

    #[test]
    fn test_match_literals_and_wildcard() {
        check(&[("string", "match 1:\n  case 1: \"one\"\n  case _: \"many\"")]);
        assert!(matches!(
            infer_err("match 1:\n  case \"a\": 1"),
            TypeError::TypeMismatch { .. }
        ));
    }

    #[test]
    fn test_match_unknown_tag() {
        assert!(matches!(
            infer_err("match 1:\n  case nope: 1"),
            TypeError::UnknownIdentifier { name, .. } if name == "nope"
        ));
    }

    #[test]
    fn test_declared_types() {
        check(&[
            ("(int)", "ft f: int"),
            ("int", "ft f: int\nf()"),
            ("(int)", "ft f: int\nfn f: 1"),
            ("(int int)", "ft f: int int"),
            ("(int int)", "ft f: int int\nfn f a: a"),
            ("(1 1)", "ft f a: a a"),
            ("float", "ft f a: a a\nf(1) + f(1.0)"),
            ("(1 2)", "ft f a b: a b"),
            ("(1 2)", "ft f a b: b a"),
            ("(list(1) 1)", "ft f a: list(a) a"),
        ]);
    }

    #[test]
    fn test_declared_type_mismatch() {
        assert_eq!(
            mismatch("ft f: int\nfn f: \"s\""),
            ("int".to_string(), "string".to_string())
        );
    }

    #[test]
    fn test_operators() {
        check(&[
            ("bool", "!true"),
            ("num", "-1"),
            ("float", "-1.5"),
            ("num", "1 + 2"),
            ("float", "1.0 + 2.0"),
            ("float", "1 + 2.0"),
            ("float", "1.0 + 2"),
            ("float", "1 + 2 + 3.0"),
            ("float", "1.0 + 2.0 + 3"),
            ("bool", "1 < 2"),
            ("bool", "\"a\" == \"b\""),
            ("bool", "true && false || true"),
        ]);
    }

    #[test]
    fn test_operator_mismatches() {
        let cases = [
            ("int|float", "string", "1 + \"s\""),
            ("num", "(num)", "fn f: 1\n1+f"),
            ("int", "float", "int(1) + 1.1"),
            ("float", "int", "1.1 + int(1)"),
            ("bool", "string", "!\"s\""),
        ];
        for (left, right, source) in cases {
            assert_eq!(
                mismatch(source),
                (left.to_string(), right.to_string()),
                "source: {:?}",
                source
            );
        }
    }

    #[test]
    fn test_errors() {
        check(&[
            ("1|string", "throw \"s\""),
            ("num|string", "(throw \"s\") + (throw \"e\")"),
            ("(string|string)", "fn f:\n  throw \"e\"\n  \"hi\""),
            ("(1 1|string)", "fn f x:\n  throw \"e\"\n  x"),
            ("string", "try \"s\" e => \"s\""),
            ("string", "try (throw \"\") e => e.message"),
            (
                "string",
                "fn f:\n  if true:\n    throw \"hi\"\n  \"hi\"\nfn g e: e.message\ntry f() g",
            ),
        ]);
    }

    #[test]
    fn test_user_functions_are_monomorphic() {
        // A use inside another function fixes the parameter type of `f`.
        check(&[(
            "(num num)",
            "fn f x: x\nfn g v:\n  throw \"e\"\n  v\nfn h:\n  let v g 1\n  f v\nf",
        )]);
    }

    #[test]
    fn test_block_accumulates_errors() {
        check(&[("num|string|float", "throw \"a\"\nthrow 1.5\n1")]);
    }

    #[test]
    fn test_try_handler_mismatch() {
        assert_eq!(
            mismatch("try 1 e => \"s\""),
            ("int|float".to_string(), "string".to_string())
        );
    }

    #[test]
    fn test_unknown_identifier() {
        match infer_err("x + 1") {
            TypeError::UnknownIdentifier { name, .. } => assert_eq!(name, "x"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_environment_keeps_declarations() {
        let program = parse_source("let x 1\nfn f y: y").unwrap();
        let mut state = InferState::new();
        let mut env = crate::builtins::initial_env(&mut state);
        state.infer_program(&mut env, &program).unwrap();
        let f = env.lookup("f").cloned().unwrap();
        assert_eq!(state.render(f.body), "(1 1)");
        assert!(env.contains("x"));
        assert_eq!(state.node_type(program.id).map(|t| state.render(t)), Some("(1 1)".to_string()));
    }
}
