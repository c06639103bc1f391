//! Pretty printers for the Moa AST.
//!
//! [`print_expr`] and [`print_program`] render Moa source that parses back to
//! the same tree. [`sexp`] renders the nested S-expression form, and
//! [`typed_sexp`] suffixes every decorated node with `:type`.

use std::fmt::{self, Write};

use super::ast::*;

/// Where an expression is printed, which decides whether it needs parentheses.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Position {
    /// A whole line: anything goes.
    Line,
    /// A juxtaposed argument or container element.
    Arg,
    /// An operand of a binary operator.
    Operand,
    /// The target of `.field`, `.0` or a call.
    Target,
}

/// Pretty print an expression to Moa source.
pub fn print_expr(expr: &Expr) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_expr(&mut out, expr, Position::Line, 0);
    out
}

/// Pretty print a program to Moa source, one statement per line.
pub fn print_program(program: &Program) -> String {
    let mut out = String::new();
    for stmt in &program.statements {
        let _ = write_expr(&mut out, stmt, Position::Line, 0);
        out.push('\n');
    }
    out
}

/// Render an expression as a nested S-expression.
pub fn sexp(expr: &Expr) -> String {
    let mut out = String::new();
    let _ = write_sexp(&mut out, expr, false);
    out
}

/// Render an expression as an S-expression with `:type` on every typed node.
pub fn typed_sexp(expr: &Expr) -> String {
    let mut out = String::new();
    let _ = write_sexp(&mut out, expr, true);
    out
}

fn needs_parens(expr: &Expr, pos: Position) -> bool {
    let rank = match &expr.kind {
        ExprKind::Lit(Literal::Int(_) | Literal::Float(_))
        | ExprKind::Unary {
            op: UnaryOp::Not, ..
        } => Position::Target,
        // `f a -b` reads as a subtraction
        ExprKind::Unary {
            op: UnaryOp::Neg, ..
        } => Position::Arg,
        ExprKind::Binary { .. } => Position::Operand,
        ExprKind::Lit(_)
        | ExprKind::Ident(_)
        | ExprKind::List(_)
        | ExprKind::Dict(_)
        | ExprKind::Object(_)
        | ExprKind::Tuple(_)
        | ExprKind::Call { .. }
        | ExprKind::Field { .. }
        | ExprKind::Index { .. } => return false,
        _ => Position::Arg,
    };
    pos >= rank
}

fn write_expr(w: &mut impl Write, expr: &Expr, pos: Position, indent: usize) -> fmt::Result {
    if needs_parens(expr, pos) {
        write!(w, "(")?;
        write_expr(w, expr, Position::Line, indent)?;
        return write!(w, ")");
    }

    match &expr.kind {
        ExprKind::Lit(lit) => write_literal(w, lit),

        ExprKind::Ident(name) => write!(w, "{}", name),

        ExprKind::List(items) => {
            write!(w, "[")?;
            write_args(w, items, indent)?;
            write!(w, "]")
        }

        ExprKind::Dict(entries) => {
            if entries.is_empty() {
                return write!(w, "[:]");
            }
            write!(w, "[")?;
            for (i, (key, value)) in entries.iter().enumerate() {
                if i > 0 {
                    write!(w, " ")?;
                }
                // A bare identifier key would read back as a string key
                if matches!(key.kind, ExprKind::Ident(_)) {
                    write!(w, "(")?;
                    write_expr(w, key, Position::Line, indent)?;
                    write!(w, ")")?;
                } else {
                    write_expr(w, key, Position::Arg, indent)?;
                }
                write!(w, ":")?;
                write_expr(w, value, Position::Arg, indent)?;
            }
            write!(w, "]")
        }

        ExprKind::Object(fields) => {
            write!(w, "{{")?;
            for (i, (name, value)) in fields.iter().enumerate() {
                if i > 0 {
                    write!(w, " ")?;
                }
                write!(w, "{}:", name)?;
                write_expr(w, value, Position::Arg, indent)?;
            }
            write!(w, "}}")
        }

        ExprKind::Tuple(items) => {
            write!(w, "tuple(")?;
            write_args(w, items, indent)?;
            write!(w, ")")
        }

        ExprKind::Call { callee, args } => {
            // `tuple(...)` would read back as a tuple literal
            if matches!(&callee.kind, ExprKind::Ident(name) if name == "tuple") {
                write!(w, "(tuple)")?;
            } else {
                write_expr(w, callee, Position::Target, indent)?;
            }
            write!(w, "(")?;
            write_args(w, args, indent)?;
            write!(w, ")")
        }

        ExprKind::Unary { op, operand } => {
            write!(w, "{}", op.symbol())?;
            write_expr(w, operand, Position::Operand, indent)
        }

        ExprKind::Binary { op, left, right } => {
            write_expr(w, left, Position::Operand, indent)?;
            write!(w, " {} ", op.symbol())?;
            write_expr(w, right, Position::Operand, indent)
        }

        ExprKind::Field { target, name } => {
            write_expr(w, target, Position::Target, indent)?;
            write!(w, ".{}", name)
        }

        ExprKind::Index { target, index } => {
            write_expr(w, target, Position::Target, indent)?;
            write!(w, ".{}", index)
        }

        ExprKind::Lambda { params, body } => {
            write!(w, "{} => ", params.join(","))?;
            write_expr(w, body, Position::Line, indent)
        }

        ExprKind::Let { name, value } => {
            write!(w, "let {} ", name)?;
            write_expr(w, value, Position::Line, indent)
        }

        ExprKind::Var { name, value } => {
            write!(w, "var {} ", name)?;
            write_expr(w, value, Position::Line, indent)
        }

        ExprKind::Assign { name, op, value } => {
            write!(w, "{} {} ", name, op.symbol())?;
            write_expr(w, value, Position::Line, indent)
        }

        ExprKind::Fn { name, params, body } => {
            write!(w, "fn {}", name)?;
            for param in params {
                write!(w, " {}", param)?;
            }
            write_body(w, body, indent)
        }

        ExprKind::Ft {
            name,
            params,
            types,
        } => {
            write!(w, "ft {}", name)?;
            for param in params {
                write!(w, " {}", param)?;
            }
            write!(w, ":")?;
            for ty in types {
                write!(w, " ")?;
                write_type(w, ty)?;
            }
            Ok(())
        }

        ExprKind::Class { name, fields } => {
            write!(w, "class {}:", name)?;
            for (field, ty) in fields {
                writeln!(w)?;
                write_indent(w, indent + 1)?;
                write!(w, "{} ", field)?;
                write_type(w, ty)?;
            }
            Ok(())
        }

        ExprKind::Enum { name, cases } => {
            write!(w, "enum {}:", name)?;
            for case in cases {
                writeln!(w)?;
                write_indent(w, indent + 1)?;
                write!(w, "{}", case.tag)?;
                for ty in &case.fields {
                    write!(w, " ")?;
                    write_type(w, ty)?;
                }
            }
            Ok(())
        }

        ExprKind::Match { scrutinee, cases } => {
            write!(w, "match ")?;
            write_expr(w, scrutinee, Position::Line, indent)?;
            write!(w, ":")?;
            for case in cases {
                writeln!(w)?;
                write_indent(w, indent + 1)?;
                write!(w, "case ")?;
                write_pattern(w, &case.pattern)?;
                write_body(w, &case.body, indent + 1)?;
            }
            Ok(())
        }

        ExprKind::If {
            cond,
            then_branch,
            else_branch,
        } => {
            write!(w, "if ")?;
            write_expr(w, cond, Position::Line, indent)?;
            write_body(w, then_branch, indent)?;
            if let Some(else_branch) = else_branch {
                writeln!(w)?;
                write_indent(w, indent)?;
                write!(w, "else")?;
                if matches!(else_branch.kind, ExprKind::If { .. }) {
                    write!(w, " ")?;
                    write_expr(w, else_branch, Position::Line, indent)?;
                } else {
                    write_body(w, else_branch, indent)?;
                }
            }
            Ok(())
        }

        ExprKind::Throw(value) => {
            write!(w, "throw ")?;
            write_expr(w, value, Position::Line, indent)
        }

        ExprKind::Try { body, handler } => {
            write!(w, "try ")?;
            write_expr(w, body, Position::Arg, indent)?;
            write!(w, " ")?;
            write_expr(w, handler, Position::Arg, indent)
        }

        ExprKind::Block(statements) => {
            for (i, stmt) in statements.iter().enumerate() {
                if i > 0 {
                    writeln!(w)?;
                    write_indent(w, indent)?;
                }
                write_expr(w, stmt, Position::Line, indent)?;
            }
            Ok(())
        }
    }
}

fn write_args(w: &mut impl Write, args: &[Expr], indent: usize) -> fmt::Result {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            write!(w, " ")?;
        }
        write_expr(w, arg, Position::Arg, indent)?;
    }
    Ok(())
}

/// `: stmt` for a single statement, an indented block otherwise.
fn write_body(w: &mut impl Write, body: &Expr, indent: usize) -> fmt::Result {
    let inline = match &body.kind {
        ExprKind::Block(_)
        | ExprKind::Fn { .. }
        | ExprKind::Class { .. }
        | ExprKind::Enum { .. }
        | ExprKind::Match { .. }
        | ExprKind::If { .. } => false,
        _ => true,
    };

    if inline {
        write!(w, ": ")?;
        return write_expr(w, body, Position::Line, indent);
    }

    writeln!(w, ":")?;
    write_indent(w, indent + 1)?;
    write_expr(w, body, Position::Line, indent + 1)
}

fn write_indent(w: &mut impl Write, indent: usize) -> fmt::Result {
    write!(w, "{}", "  ".repeat(indent))
}

fn write_type(w: &mut impl Write, ty: &TypeExpr) -> fmt::Result {
    write!(w, "{}", ty.name)?;
    if !ty.args.is_empty() {
        write!(w, "(")?;
        for (i, arg) in ty.args.iter().enumerate() {
            if i > 0 {
                write!(w, " ")?;
            }
            write_type(w, arg)?;
        }
        write!(w, ")")?;
    }
    Ok(())
}

fn write_pattern(w: &mut impl Write, pattern: &Pattern) -> fmt::Result {
    match pattern {
        Pattern::Wildcard => write!(w, "_"),
        Pattern::Lit(lit) => write_literal(w, lit),
        Pattern::Tag { name, bindings } => {
            write!(w, "{}", name)?;
            for binding in bindings {
                write!(w, " {}", binding)?;
            }
            Ok(())
        }
    }
}

fn write_literal(w: &mut impl Write, lit: &Literal) -> fmt::Result {
    match lit {
        Literal::Int(s) | Literal::Float(s) => write!(w, "{}", s),
        Literal::Str(s) => write_quoted(w, "", '"', s),
        Literal::Template(s) => write_quoted(w, "", '`', s),
        Literal::Regex(s) => write_quoted(w, "r", '"', s),
    }
}

fn write_quoted(w: &mut impl Write, prefix: &str, quote: char, s: &str) -> fmt::Result {
    write!(w, "{}{}", prefix, quote)?;
    for c in s.chars() {
        match c {
            '\\' => write!(w, "\\\\")?,
            '\n' => write!(w, "\\n")?,
            '\t' => write!(w, "\\t")?,
            '\r' => write!(w, "\\r")?,
            c if c == quote => write!(w, "\\{}", c)?,
            c => write!(w, "{}", c)?,
        }
    }
    write!(w, "{}", quote)
}

fn write_sexp(w: &mut impl Write, expr: &Expr, typed: bool) -> fmt::Result {
    match &expr.kind {
        ExprKind::Lit(lit) => write_literal(w, lit)?,
        ExprKind::Ident(name) => write!(w, "{}", name)?,
        _ => {
            write!(w, "(")?;
            write_sexp_items(w, expr, typed)?;
            write!(w, ")")?;
        }
    }

    if typed {
        if let Some(ty) = &expr.ty {
            write!(w, ":{}", ty)?;
        }
    }
    Ok(())
}

fn write_sexp_list(w: &mut impl Write, head: &str, children: &[&Expr], typed: bool) -> fmt::Result {
    write!(w, "{}", head)?;
    for child in children {
        write!(w, " ")?;
        write_sexp(w, child, typed)?;
    }
    Ok(())
}

fn write_sexp_items(w: &mut impl Write, expr: &Expr, typed: bool) -> fmt::Result {
    match &expr.kind {
        ExprKind::Lit(_) | ExprKind::Ident(_) => Ok(()),
        ExprKind::List(_) => write_sexp_list(w, "list", &expr.children(), typed),
        ExprKind::Dict(_) => write_sexp_list(w, "dict", &expr.children(), typed),
        ExprKind::Tuple(_) => write_sexp_list(w, "tuple", &expr.children(), typed),
        ExprKind::Block(_) => write_sexp_list(w, "do", &expr.children(), typed),
        ExprKind::If { .. } => write_sexp_list(w, "if", &expr.children(), typed),
        ExprKind::Try { .. } => write_sexp_list(w, "try", &expr.children(), typed),
        ExprKind::Throw(_) => write_sexp_list(w, "throw", &expr.children(), typed),
        ExprKind::Object(fields) => {
            write!(w, "obj")?;
            for (name, value) in fields {
                write!(w, " {} ", name)?;
                write_sexp(w, value, typed)?;
            }
            Ok(())
        }
        ExprKind::Call { callee, args } => {
            write_sexp(w, callee, typed)?;
            for arg in args {
                write!(w, " ")?;
                write_sexp(w, arg, typed)?;
            }
            Ok(())
        }
        ExprKind::Unary { op, .. } => write_sexp_list(w, op.symbol(), &expr.children(), typed),
        ExprKind::Binary { op, .. } => write_sexp_list(w, op.symbol(), &expr.children(), typed),
        ExprKind::Field { target, name } => {
            write_sexp_list(w, ".", &[target.as_ref()], typed)?;
            write!(w, " {}", name)
        }
        ExprKind::Index { target, index } => {
            write_sexp_list(w, ".", &[target.as_ref()], typed)?;
            write!(w, " {}", index)
        }
        ExprKind::Lambda { params, .. } => {
            let head = format!("=> ({})", params.join(" "));
            write_sexp_list(w, &head, &expr.children(), typed)
        }
        ExprKind::Let { name, .. } => {
            write_sexp_list(w, &format!("let {}", name), &expr.children(), typed)
        }
        ExprKind::Var { name, .. } => {
            write_sexp_list(w, &format!("var {}", name), &expr.children(), typed)
        }
        ExprKind::Assign { name, op, .. } => {
            let head = format!("{} {}", op.symbol(), name);
            write_sexp_list(w, &head, &expr.children(), typed)
        }
        ExprKind::Fn { name, params, .. } => {
            let head = format!("fn {} ({})", name, params.join(" "));
            write_sexp_list(w, &head, &expr.children(), typed)
        }
        ExprKind::Ft {
            name,
            params,
            types,
        } => {
            write!(w, "ft {} ({}) (", name, params.join(" "))?;
            for (i, ty) in types.iter().enumerate() {
                if i > 0 {
                    write!(w, " ")?;
                }
                write_type(w, ty)?;
            }
            write!(w, ")")
        }
        ExprKind::Class { name, fields } => {
            write!(w, "class {}", name)?;
            for (field, ty) in fields {
                write!(w, " ({} ", field)?;
                write_type(w, ty)?;
                write!(w, ")")?;
            }
            Ok(())
        }
        ExprKind::Enum { name, cases } => {
            write!(w, "enum {}", name)?;
            for case in cases {
                write!(w, " ({}", case.tag)?;
                for ty in &case.fields {
                    write!(w, " ")?;
                    write_type(w, ty)?;
                }
                write!(w, ")")?;
            }
            Ok(())
        }
        ExprKind::Match { scrutinee, cases } => {
            write_sexp_list(w, "match", &[scrutinee.as_ref()], typed)?;
            for case in cases {
                write!(w, " (case ")?;
                write_pattern(w, &case.pattern)?;
                write!(w, " ")?;
                write_sexp(w, &case.body, typed)?;
                write!(w, ")")?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;

    fn roundtrip(source: &str) -> String {
        let program = parse_source(source).unwrap();
        print_program(&program)
    }

    fn sexp_of(source: &str) -> String {
        let program = parse_source(source).unwrap();
        program.statements.iter().map(sexp).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_print_literals() {
        assert_eq!(roundtrip("42"), "42\n");
        assert_eq!(roundtrip("1.5"), "1.5\n");
        assert_eq!(roundtrip("\"say \\\"hi\\\"\""), "\"say \\\"hi\\\"\"\n");
        assert_eq!(roundtrip("$\"t\""), "`t`\n");
        assert_eq!(roundtrip("r\"a+\""), "r\"a+\"\n");
    }

    #[test]
    fn test_print_binary_parenthesizes_nested_operands() {
        assert_eq!(roundtrip("1 + 2 * 3"), "1 + (2 * 3)\n");
    }

    #[test]
    fn test_print_calls() {
        assert_eq!(roundtrip("f 1 2"), "f(1 2)\n");
        assert_eq!(roundtrip("f(1) 2"), "f(1)(2)\n");
        assert_eq!(roundtrip("f (g 1)"), "f(g(1))\n");
    }

    #[test]
    fn test_print_containers() {
        assert_eq!(roundtrip("[1 2]"), "[1 2]\n");
        assert_eq!(roundtrip("[:]"), "[:]\n");
        assert_eq!(roundtrip("[a:1]"), "[\"a\":1]\n");
        assert_eq!(roundtrip("{a:1 b:\"\"}"), "{a:1 b:\"\"}\n");
        assert_eq!(roundtrip("tuple(1 2).0"), "tuple(1 2).0\n");
    }

    #[test]
    fn test_print_declarations() {
        assert_eq!(roundtrip("fn f x: x + 1"), "fn f x: x + 1\n");
        assert_eq!(roundtrip("ft f a: a list(a)"), "ft f a: a list(a)\n");
        assert_eq!(
            roundtrip("class item:\n  name string\n  price int"),
            "class item:\n  name string\n  price int\n"
        );
        assert_eq!(
            roundtrip("fn f:\n  throw \"e\"\n  \"hi\""),
            "fn f:\n  throw \"e\"\n  \"hi\"\n"
        );
    }

    #[test]
    fn test_print_if_else() {
        assert_eq!(
            roundtrip("if false: 1\nelse if true: 2\nelse: 3"),
            "if false: 1\nelse if true: 2\nelse: 3\n"
        );
    }

    #[test]
    fn test_sexp() {
        assert_eq!(sexp_of("1 + 2"), "(+ 1 2)");
        assert_eq!(sexp_of("f 1 \"a\""), "(f 1 \"a\")");
        assert_eq!(sexp_of("a,b => a"), "(=> (a b) a)");
        assert_eq!(sexp_of("p.x"), "(. p x)");
        assert_eq!(sexp_of("let x [1]"), "(let x (list 1))");
        assert_eq!(sexp_of("x += 1"), "(+= x 1)");
        assert_eq!(sexp_of("fn f x:\n  x"), "(fn f (x) (do x))");
    }

    #[test]
    fn test_typed_sexp() {
        let mut program = parse_source("1 + 2").unwrap();
        let expr = &mut program.statements[0];
        expr.ty = Some("num".to_string());
        if let ExprKind::Binary { left, right, .. } = &mut expr.kind {
            left.ty = Some("num".to_string());
            right.ty = Some("num".to_string());
        }
        assert_eq!(typed_sexp(expr), "(+ 1:num 2:num):num");
    }
}
