//! Parser module for Moa source code.
//!
//! A recursive-descent parser over the layout-aware token stream. Statements
//! are separated by `Newline`; indented blocks open with `:` and are delimited
//! by `Indent`/`Dedent`. Juxtaposition is application: `f a b` calls `f` with
//! two arguments, while `f(a b)` requires the parenthesis to touch the callee.

pub mod ast;
pub mod pretty;

#[cfg(test)]
mod proptests;

use crate::error::{ParseError, Result};
use crate::lexer::{Span, Spanned, Token};
use ast::*;

/// The parser for Moa source code.
pub struct Parser {
    tokens: Vec<Spanned<Token>>,
    pos: usize,
    next_id: NodeId,
}

impl Parser {
    pub fn new(tokens: Vec<Spanned<Token>>) -> Self {
        Self {
            tokens,
            pos: 0,
            next_id: 0,
        }
    }

    /// Parse the entire program
    pub fn parse_program(&mut self) -> Result<Program> {
        let start = self.current_span().start;
        let mut statements = Vec::new();

        self.skip_newlines();
        while !self.is_at_end() {
            statements.push(self.parse_statement()?);
            self.end_statement()?;
            self.skip_newlines();
        }

        let end = statements.last().map(|s| s.span.end).unwrap_or(start);

        Ok(Program {
            statements,
            span: Span::new(start, end),
            id: self.fresh_id(),
            ty: None,
        })
    }

    // ========== Statement Parsing ==========

    fn parse_statement(&mut self) -> Result<Expr> {
        match self.current() {
            Token::Let => self.parse_binding(true),
            Token::Var => self.parse_binding(false),
            Token::Fn => self.parse_fn(),
            Token::Ft => self.parse_ft(),
            Token::Class => self.parse_class(),
            Token::Enum => self.parse_enum(),
            Token::If => self.parse_if(),
            Token::Match => self.parse_match(),
            Token::Ident(_) if self.peek_assign_op().is_some() => self.parse_assignment(),
            _ => self.parse_line(),
        }
    }

    /// A statement ends at a newline, at the end of its block, or right
    /// after an indented block it opened.
    fn end_statement(&mut self) -> Result<()> {
        if self.consume_if(&Token::Newline)
            || self.check(&Token::Dedent)
            || self.is_at_end()
            || self.prev_is(&Token::Dedent)
        {
            Ok(())
        } else {
            Err(self.unexpected("end of line"))
        }
    }

    /// `:` followed by an inline statement or an indented statement sequence.
    fn parse_block(&mut self) -> Result<Expr> {
        self.expect(&Token::Colon)?;

        if !self.consume_if(&Token::Newline) {
            return self.parse_statement();
        }

        let start = self.current_span().start;
        self.expect(&Token::Indent)?;

        let mut statements = Vec::new();
        while !self.check(&Token::Dedent) && !self.is_at_end() {
            statements.push(self.parse_statement()?);
            self.end_statement()?;
        }
        let end = self.prev_span().end;
        self.expect(&Token::Dedent)?;

        Ok(self.node(ExprKind::Block(statements), Span::new(start, end)))
    }

    fn parse_binding(&mut self, immutable: bool) -> Result<Expr> {
        let start = self.current_span().start;
        self.advance(); // let / var

        let name = self.expect_ident()?;
        let value = Box::new(self.parse_line()?);
        let span = Span::new(start, self.prev_span().end);

        let kind = if immutable {
            ExprKind::Let { name, value }
        } else {
            ExprKind::Var { name, value }
        };
        Ok(self.node(kind, span))
    }

    fn parse_assignment(&mut self) -> Result<Expr> {
        let start = self.current_span().start;
        let name = self.expect_ident()?;
        let op = self
            .peek_assign_op_at(self.pos)
            .ok_or_else(|| self.unexpected("assignment"))?;
        self.advance();

        let value = Box::new(self.parse_line()?);
        let span = Span::new(start, self.prev_span().end);
        Ok(self.node(ExprKind::Assign { name, op, value }, span))
    }

    fn parse_fn(&mut self) -> Result<Expr> {
        let start = self.current_span().start;
        self.expect(&Token::Fn)?;

        let name = self.expect_ident()?;
        let params = self.parse_params()?;
        let body = Box::new(self.parse_block()?);
        let span = Span::new(start, self.prev_span().end);

        Ok(self.node(ExprKind::Fn { name, params, body }, span))
    }

    fn parse_ft(&mut self) -> Result<Expr> {
        let start = self.current_span().start;
        self.expect(&Token::Ft)?;

        let name = self.expect_ident()?;
        let params = self.parse_params()?;
        self.expect(&Token::Colon)?;

        let mut types = Vec::new();
        while !self.at_line_end() {
            types.push(self.parse_type()?);
        }
        if types.is_empty() {
            return Err(self.unexpected("type"));
        }

        let span = Span::new(start, self.prev_span().end);
        Ok(self.node(
            ExprKind::Ft {
                name,
                params,
                types,
            },
            span,
        ))
    }

    fn parse_params(&mut self) -> Result<Vec<String>> {
        let mut params = Vec::new();
        while let Token::Ident(_) = self.current() {
            params.push(self.expect_ident()?);
        }
        Ok(params)
    }

    fn parse_class(&mut self) -> Result<Expr> {
        let start = self.current_span().start;
        self.expect(&Token::Class)?;

        let name = self.expect_ident()?;
        self.expect(&Token::Colon)?;

        let mut fields = Vec::new();
        if self.consume_if(&Token::Newline) {
            self.expect(&Token::Indent)?;
            while !self.check(&Token::Dedent) && !self.is_at_end() {
                let field = self.expect_ident()?;
                fields.push((field, self.parse_type()?));
                self.end_statement()?;
            }
            self.expect(&Token::Dedent)?;
        } else {
            while !self.at_line_end() {
                let field = self.expect_ident()?;
                fields.push((field, self.parse_type()?));
            }
        }

        let span = Span::new(start, self.prev_span().end);
        Ok(self.node(ExprKind::Class { name, fields }, span))
    }

    fn parse_enum(&mut self) -> Result<Expr> {
        let start = self.current_span().start;
        self.expect(&Token::Enum)?;

        let name = self.expect_ident()?;
        self.expect(&Token::Colon)?;
        self.expect(&Token::Newline)?;
        self.expect(&Token::Indent)?;

        let mut cases = Vec::new();
        while !self.check(&Token::Dedent) && !self.is_at_end() {
            let case_start = self.current_span().start;
            let tag = self.expect_ident()?;
            let mut fields = Vec::new();
            while !self.at_line_end() {
                fields.push(self.parse_type()?);
            }
            cases.push(EnumCase {
                tag,
                fields,
                span: Span::new(case_start, self.prev_span().end),
            });
            self.end_statement()?;
        }
        self.expect(&Token::Dedent)?;

        let span = Span::new(start, self.prev_span().end);
        Ok(self.node(ExprKind::Enum { name, cases }, span))
    }

    fn parse_if(&mut self) -> Result<Expr> {
        let start = self.current_span().start;
        self.expect(&Token::If)?;

        let cond = Box::new(self.parse_line()?);
        let then_branch = Box::new(self.parse_block()?);

        // `else` sits on the line after the branch
        if self.check(&Token::Newline) && self.peek_is(&Token::Else) {
            self.advance();
        }

        let else_branch = if self.consume_if(&Token::Else) {
            if self.check(&Token::If) {
                Some(Box::new(self.parse_if()?))
            } else {
                Some(Box::new(self.parse_block()?))
            }
        } else {
            None
        };

        let span = Span::new(start, self.prev_span().end);
        Ok(self.node(
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            },
            span,
        ))
    }

    fn parse_match(&mut self) -> Result<Expr> {
        let start = self.current_span().start;
        self.expect(&Token::Match)?;

        let scrutinee = Box::new(self.parse_line()?);
        self.expect(&Token::Colon)?;
        self.expect(&Token::Newline)?;
        self.expect(&Token::Indent)?;

        let mut cases = Vec::new();
        while !self.check(&Token::Dedent) && !self.is_at_end() {
            let case_start = self.current_span().start;
            self.expect(&Token::Case)?;
            let pattern = self.parse_pattern()?;
            let body = self.parse_block()?;
            cases.push(MatchCase {
                pattern,
                body,
                span: Span::new(case_start, self.prev_span().end),
            });
            self.end_statement()?;
        }
        self.expect(&Token::Dedent)?;

        let span = Span::new(start, self.prev_span().end);
        Ok(self.node(ExprKind::Match { scrutinee, cases }, span))
    }

    fn parse_pattern(&mut self) -> Result<Pattern> {
        if let Some(literal) = self.literal() {
            self.advance();
            return Ok(Pattern::Lit(literal));
        }

        let name = self.expect_ident()?;
        if name == "_" {
            return Ok(Pattern::Wildcard);
        }

        let bindings = self.parse_params()?;
        Ok(Pattern::Tag { name, bindings })
    }

    /// `name` or `name(arg ...)`
    fn parse_type(&mut self) -> Result<TypeExpr> {
        let start = self.current_span().start;
        let name = self.expect_ident()?;

        let mut args = Vec::new();
        if self.check(&Token::LParen) && self.current_span().start == self.prev_span().end {
            self.advance();
            while !self.check(&Token::RParen) && !self.is_at_end() {
                args.push(self.parse_type()?);
            }
            self.expect(&Token::RParen)?;
        }

        Ok(TypeExpr {
            name,
            args,
            span: Span::new(start, self.prev_span().end),
        })
    }

    // ========== Expression Parsing ==========

    /// A full line: `throw`, `try`, or an application by juxtaposition.
    fn parse_line(&mut self) -> Result<Expr> {
        let start = self.current_span().start;

        match self.current() {
            Token::Throw => {
                self.advance();
                let value = Box::new(self.parse_line()?);
                let span = Span::new(start, self.prev_span().end);
                Ok(self.node(ExprKind::Throw(value), span))
            }
            Token::Try => {
                self.advance();
                let body = Box::new(self.parse_arg()?);
                let handler = Box::new(self.parse_arg()?);
                let span = Span::new(start, self.prev_span().end);
                Ok(self.node(ExprKind::Try { body, handler }, span))
            }
            _ => {
                let callee = self.parse_arg()?;
                let mut args = Vec::new();
                while self.starts_arg() {
                    args.push(self.parse_arg()?);
                }

                if args.is_empty() {
                    Ok(callee)
                } else {
                    let span = Span::new(start, self.prev_span().end);
                    Ok(self.node(
                        ExprKind::Call {
                            callee: Box::new(callee),
                            args,
                        },
                        span,
                    ))
                }
            }
        }
    }

    fn parse_arg(&mut self) -> Result<Expr> {
        if self.at_lambda() {
            self.parse_lambda()
        } else {
            self.parse_binary_expression(0)
        }
    }

    fn parse_lambda(&mut self) -> Result<Expr> {
        let start = self.current_span().start;

        let mut params = vec![self.expect_ident()?];
        while self.consume_if(&Token::Comma) {
            params.push(self.expect_ident()?);
        }
        self.expect(&Token::FatArrow)?;

        let body = Box::new(self.parse_line()?);
        let span = Span::new(start, self.prev_span().end);
        Ok(self.node(ExprKind::Lambda { params, body }, span))
    }

    fn parse_binary_expression(&mut self, min_prec: u8) -> Result<Expr> {
        let mut left = self.parse_unary_expression()?;

        while let Some(op) = self.binary_op() {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }

            self.advance();

            let next_min_prec = if op.is_right_assoc() { prec } else { prec + 1 };
            let right = self.parse_binary_expression(next_min_prec)?;

            let span = left.span.merge(right.span);
            left = self.node(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }

        Ok(left)
    }

    fn binary_op(&self) -> Option<BinOp> {
        match self.current() {
            Token::Plus => Some(BinOp::Add),
            Token::Minus => Some(BinOp::Sub),
            Token::Star => Some(BinOp::Mul),
            Token::StarStar => Some(BinOp::Pow),
            Token::Slash => Some(BinOp::Div),
            Token::SlashSlash => Some(BinOp::FloorDiv),
            Token::Percent => Some(BinOp::Mod),
            Token::Lt => Some(BinOp::Lt),
            Token::Gt => Some(BinOp::Gt),
            Token::LtEq => Some(BinOp::LtEq),
            Token::GtEq => Some(BinOp::GtEq),
            Token::EqEq => Some(BinOp::EqEq),
            Token::NotEq => Some(BinOp::NotEq),
            Token::And => Some(BinOp::And),
            Token::Or => Some(BinOp::Or),
            _ => None,
        }
    }

    fn parse_unary_expression(&mut self) -> Result<Expr> {
        let start = self.current_span().start;

        let op = match self.current() {
            Token::Minus => Some(UnaryOp::Neg),
            Token::Not => Some(UnaryOp::Not),
            _ => None,
        };

        if let Some(op) = op {
            self.advance();
            let operand = Box::new(self.parse_unary_expression()?);
            let span = Span::new(start, self.prev_span().end);
            return Ok(self.node(ExprKind::Unary { op, operand }, span));
        }

        self.parse_postfix_expression()
    }

    fn parse_postfix_expression(&mut self) -> Result<Expr> {
        let mut expr = self.parse_primary_expression()?;

        loop {
            match self.current() {
                // A call only when the parenthesis touches the callee: `f(x)`, not `f (x)`
                Token::LParen if self.current_span().start == expr.span.end => {
                    self.advance();
                    let mut args = Vec::new();
                    while !self.check(&Token::RParen) && !self.is_at_end() {
                        args.push(self.parse_arg()?);
                    }
                    self.expect(&Token::RParen)?;
                    let span = Span::new(expr.span.start, self.prev_span().end);

                    let kind = match &expr.kind {
                        ExprKind::Ident(name) if name == "tuple" => ExprKind::Tuple(args),
                        _ => ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                    };
                    expr = self.node(kind, span);
                }
                Token::Dot => {
                    let start = expr.span.start;
                    self.advance();
                    let kind = match self.current().clone() {
                        Token::Int(digits) => {
                            let index = digits.parse().map_err(|_| self.unexpected("tuple index"))?;
                            self.advance();
                            ExprKind::Index {
                                target: Box::new(expr),
                                index,
                            }
                        }
                        _ => {
                            let name = self.expect_ident()?;
                            ExprKind::Field {
                                target: Box::new(expr),
                                name,
                            }
                        }
                    };
                    let span = Span::new(start, self.prev_span().end);
                    expr = self.node(kind, span);
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn parse_primary_expression(&mut self) -> Result<Expr> {
        let span = self.current_span();

        if let Some(literal) = self.literal() {
            self.advance();
            return Ok(self.node(ExprKind::Lit(literal), span));
        }

        match self.current().clone() {
            Token::Ident(name) => {
                self.advance();
                Ok(self.node(ExprKind::Ident(name), span))
            }
            Token::LParen => {
                self.advance();
                let mut expr = self.parse_line()?;
                self.expect(&Token::RParen)?;
                // Cover the parentheses so `(f x)(y)` still reads as a touching call
                expr.span = Span::new(span.start, self.prev_span().end);
                Ok(expr)
            }
            Token::LBracket => self.parse_bracket_literal(),
            Token::LBrace => self.parse_object_literal(),
            _ => Err(self.unexpected("expression")),
        }
    }

    /// `[a b]` is a list, `[k:v ...]` and `[:]` are dictionaries.
    fn parse_bracket_literal(&mut self) -> Result<Expr> {
        let start = self.current_span().start;
        self.expect(&Token::LBracket)?;

        if self.consume_if(&Token::Colon) {
            self.expect(&Token::RBracket)?;
            let span = Span::new(start, self.prev_span().end);
            return Ok(self.node(ExprKind::Dict(Vec::new()), span));
        }

        let mut elements = Vec::new();
        let mut entries = Vec::new();
        while !self.check(&Token::RBracket) && !self.is_at_end() {
            let key = if matches!(self.current(), Token::Ident(_)) && self.peek_is(&Token::Colon) {
                let span = self.current_span();
                let name = self.expect_ident()?;
                self.node(ExprKind::Lit(Literal::Str(name)), span)
            } else {
                self.parse_arg()?
            };

            if self.consume_if(&Token::Colon) {
                if !elements.is_empty() {
                    return Err(self.unexpected("list element"));
                }
                entries.push((key, self.parse_arg()?));
            } else if !entries.is_empty() {
                return Err(self.unexpected("':'"));
            } else {
                elements.push(key);
            }
        }
        self.expect(&Token::RBracket)?;

        let span = Span::new(start, self.prev_span().end);
        let kind = if entries.is_empty() {
            ExprKind::List(elements)
        } else {
            ExprKind::Dict(entries)
        };
        Ok(self.node(kind, span))
    }

    fn parse_object_literal(&mut self) -> Result<Expr> {
        let start = self.current_span().start;
        self.expect(&Token::LBrace)?;

        let mut fields = Vec::new();
        while !self.check(&Token::RBrace) && !self.is_at_end() {
            let name = self.expect_ident()?;
            self.expect(&Token::Colon)?;
            fields.push((name, self.parse_arg()?));
        }
        self.expect(&Token::RBrace)?;

        let span = Span::new(start, self.prev_span().end);
        Ok(self.node(ExprKind::Object(fields), span))
    }

    // ========== Helper Methods ==========

    fn node(&mut self, kind: ExprKind, span: Span) -> Expr {
        let id = self.fresh_id();
        Expr::new(id, kind, span)
    }

    fn fresh_id(&mut self) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn literal(&self) -> Option<Literal> {
        match self.current() {
            Token::Int(s) => Some(Literal::Int(s.clone())),
            Token::Float(s) => Some(Literal::Float(s.clone())),
            Token::String(s) => Some(Literal::Str(s.clone())),
            Token::Template(s) => Some(Literal::Template(s.clone())),
            Token::Regex(s) => Some(Literal::Regex(s.clone())),
            _ => None,
        }
    }

    /// Whether the current token can begin another juxtaposed argument.
    fn starts_arg(&self) -> bool {
        matches!(
            self.current(),
            Token::Int(_)
                | Token::Float(_)
                | Token::String(_)
                | Token::Template(_)
                | Token::Regex(_)
                | Token::Ident(_)
                | Token::LParen
                | Token::LBracket
                | Token::LBrace
                | Token::Not
        )
    }

    /// Lookahead for `a, b => ...`
    fn at_lambda(&self) -> bool {
        let mut pos = self.pos;
        loop {
            match self.tokens.get(pos).map(|t| &t.value) {
                Some(Token::Ident(_)) => pos += 1,
                _ => return false,
            }
            match self.tokens.get(pos).map(|t| &t.value) {
                Some(Token::FatArrow) => return true,
                Some(Token::Comma) => pos += 1,
                _ => return false,
            }
        }
    }

    fn peek_assign_op(&self) -> Option<AssignOp> {
        self.peek_assign_op_at(self.pos + 1)
    }

    fn peek_assign_op_at(&self, pos: usize) -> Option<AssignOp> {
        match self.tokens.get(pos).map(|t| &t.value)? {
            Token::Eq => Some(AssignOp::Assign),
            Token::PlusEq => Some(AssignOp::AddAssign),
            Token::MinusEq => Some(AssignOp::SubAssign),
            Token::StarEq => Some(AssignOp::MulAssign),
            Token::StarStarEq => Some(AssignOp::PowAssign),
            Token::SlashEq => Some(AssignOp::DivAssign),
            Token::PercentEq => Some(AssignOp::ModAssign),
            _ => None,
        }
    }

    fn at_line_end(&self) -> bool {
        self.current().is_layout()
    }

    fn skip_newlines(&mut self) {
        while self.consume_if(&Token::Newline) {}
    }

    fn current(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .map(|s| &s.value)
            .unwrap_or(&Token::Eof)
    }

    fn current_span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .map(|s| s.span)
            .unwrap_or_default()
    }

    fn prev_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens
                .get(self.pos - 1)
                .map(|s| s.span)
                .unwrap_or_default()
        } else {
            Span::default()
        }
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        self.current() == &Token::Eof
    }

    fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.current()) == std::mem::discriminant(token)
    }

    fn prev_is(&self, token: &Token) -> bool {
        self.pos > 0
            && self
                .tokens
                .get(self.pos - 1)
                .map(|s| std::mem::discriminant(&s.value) == std::mem::discriminant(token))
                .unwrap_or(false)
    }

    fn peek_is(&self, token: &Token) -> bool {
        self.tokens
            .get(self.pos + 1)
            .map(|s| std::mem::discriminant(&s.value) == std::mem::discriminant(token))
            .unwrap_or(false)
    }

    fn consume_if(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token) -> Result<()> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", token)))
        }
    }

    fn expect_ident(&mut self) -> Result<String> {
        if let Token::Ident(name) = self.current().clone() {
            self.advance();
            Ok(name)
        } else {
            Err(self.unexpected("identifier"))
        }
    }

    fn unexpected(&self, expected: &str) -> crate::error::MoaError {
        // Only layout tokens left means the input stopped early
        let exhausted = self.tokens[self.pos.min(self.tokens.len())..]
            .iter()
            .all(|t| t.value.is_layout());
        if exhausted {
            return ParseError::UnexpectedEof {
                span: self.current_span(),
            }
            .into();
        }
        ParseError::UnexpectedToken {
            found: format!("{}", self.current()),
            expected: expected.to_string(),
            span: self.current_span(),
        }
        .into()
    }
}

/// Lex and parse source code into an AST
pub fn parse_source(source: &str) -> Result<Program> {
    use crate::lexer::Scanner;

    let tokens = Scanner::new(source).tokenize()?;
    let mut parser = Parser::new(tokens);
    parser.parse_program()
}
