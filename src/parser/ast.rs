//! Abstract Syntax Tree definitions for Moa.
//!
//! Every node carries a parser-assigned [`NodeId`], its source span, and a
//! `ty` slot that stays empty until the tree is decorated with inferred types.

use crate::lexer::Span;

/// Identifier of a node, unique within one parsed program.
pub type NodeId = usize;

/// A program is a sequence of top-level statements.
#[derive(Debug, Clone)]
pub struct Program {
    pub statements: Vec<Expr>,
    pub span: Span,
    pub id: NodeId,
    pub ty: Option<String>,
}

/// Literal values, kept as written.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(String),
    Float(String),
    Str(String),
    /// `text` or $"text"
    Template(String),
    /// r"text"
    Regex(String),
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv, // //
    Mod,
    Pow, // **

    // Comparison
    Lt,
    Gt,
    LtEq,
    GtEq,
    EqEq,
    NotEq,

    // Logical
    And,
    Or,
}

impl BinOp {
    /// Get the precedence of this operator (higher = binds tighter)
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::Or => 1,
            BinOp::And => 2,
            BinOp::Lt | BinOp::Gt | BinOp::LtEq | BinOp::GtEq | BinOp::EqEq | BinOp::NotEq => 3,
            BinOp::Add | BinOp::Sub => 4,
            BinOp::Mul | BinOp::Div | BinOp::FloorDiv | BinOp::Mod => 5,
            BinOp::Pow => 6,
        }
    }

    /// Check if operator is right-associative
    pub fn is_right_assoc(self) -> bool {
        matches!(self, BinOp::Pow)
    }

    /// The operator as written, which is also its name in the environment.
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::FloorDiv => "//",
            BinOp::Mod => "%",
            BinOp::Pow => "**",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::LtEq => "<=",
            BinOp::GtEq => ">=",
            BinOp::EqEq => "==",
            BinOp::NotEq => "!=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg, // -
    Not, // !
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

/// Assignment operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,    // =
    AddAssign, // +=
    SubAssign, // -=
    MulAssign, // *=
    PowAssign, // **=
    DivAssign, // /=
    ModAssign, // %=
}

impl AssignOp {
    /// The binary operator a compound assignment applies, if any.
    pub fn binary(self) -> Option<BinOp> {
        match self {
            AssignOp::Assign => None,
            AssignOp::AddAssign => Some(BinOp::Add),
            AssignOp::SubAssign => Some(BinOp::Sub),
            AssignOp::MulAssign => Some(BinOp::Mul),
            AssignOp::PowAssign => Some(BinOp::Pow),
            AssignOp::DivAssign => Some(BinOp::Div),
            AssignOp::ModAssign => Some(BinOp::Mod),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::AddAssign => "+=",
            AssignOp::SubAssign => "-=",
            AssignOp::MulAssign => "*=",
            AssignOp::PowAssign => "**=",
            AssignOp::DivAssign => "/=",
            AssignOp::ModAssign => "%=",
        }
    }
}

/// A type as written in `ft`, `class` and `enum` declarations: `int`, `list(int)`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpr {
    pub name: String,
    pub args: Vec<TypeExpr>,
    pub span: Span,
}

/// One constructor of an `enum` declaration.
#[derive(Debug, Clone)]
pub struct EnumCase {
    pub tag: String,
    pub fields: Vec<TypeExpr>,
    pub span: Span,
}

/// Pattern of a `case` arm.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// `_`
    Wildcard,
    Lit(Literal),
    /// A constructor tag, optionally binding its fields: `a s`
    Tag { name: String, bindings: Vec<String> },
}

/// One `case` arm of a `match`.
#[derive(Debug, Clone)]
pub struct MatchCase {
    pub pattern: Pattern,
    pub body: Expr,
    pub span: Span,
}

/// Expression AST node
#[derive(Debug, Clone)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub span: Span,
    /// Canonical type string, filled in by decoration.
    pub ty: Option<String>,
}

impl Expr {
    pub fn new(id: NodeId, kind: ExprKind, span: Span) -> Self {
        Expr {
            id,
            kind,
            span,
            ty: None,
        }
    }

    /// Direct sub-expressions in source order.
    pub fn children(&self) -> Vec<&Expr> {
        match &self.kind {
            ExprKind::Lit(_)
            | ExprKind::Ident(_)
            | ExprKind::Ft { .. }
            | ExprKind::Class { .. }
            | ExprKind::Enum { .. } => vec![],
            ExprKind::List(items) | ExprKind::Tuple(items) | ExprKind::Block(items) => {
                items.iter().collect()
            }
            ExprKind::Dict(entries) => entries.iter().flat_map(|(k, v)| [k, v]).collect(),
            ExprKind::Object(fields) => fields.iter().map(|(_, v)| v).collect(),
            ExprKind::Call { callee, args } => {
                std::iter::once(callee.as_ref()).chain(args.iter()).collect()
            }
            ExprKind::Unary { operand, .. } => vec![operand.as_ref()],
            ExprKind::Binary { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            ExprKind::Field { target, .. } | ExprKind::Index { target, .. } => {
                vec![target.as_ref()]
            }
            ExprKind::Lambda { body, .. } | ExprKind::Fn { body, .. } => vec![body.as_ref()],
            ExprKind::Let { value, .. }
            | ExprKind::Var { value, .. }
            | ExprKind::Assign { value, .. }
            | ExprKind::Throw(value) => vec![value.as_ref()],
            ExprKind::Match { scrutinee, cases } => std::iter::once(scrutinee.as_ref())
                .chain(cases.iter().map(|c| &c.body))
                .collect(),
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let mut children = vec![cond.as_ref(), then_branch.as_ref()];
                children.extend(else_branch.as_deref());
                children
            }
            ExprKind::Try { body, handler } => vec![body.as_ref(), handler.as_ref()],
        }
    }

    /// Mutable counterpart of [`Expr::children`].
    pub fn children_mut(&mut self) -> Vec<&mut Expr> {
        match &mut self.kind {
            ExprKind::Lit(_)
            | ExprKind::Ident(_)
            | ExprKind::Ft { .. }
            | ExprKind::Class { .. }
            | ExprKind::Enum { .. } => vec![],
            ExprKind::List(items) | ExprKind::Tuple(items) | ExprKind::Block(items) => {
                items.iter_mut().collect()
            }
            ExprKind::Dict(entries) => entries.iter_mut().flat_map(|(k, v)| [k, v]).collect(),
            ExprKind::Object(fields) => fields.iter_mut().map(|(_, v)| v).collect(),
            ExprKind::Call { callee, args } => {
                std::iter::once(callee.as_mut()).chain(args.iter_mut()).collect()
            }
            ExprKind::Unary { operand, .. } => vec![operand.as_mut()],
            ExprKind::Binary { left, right, .. } => vec![left.as_mut(), right.as_mut()],
            ExprKind::Field { target, .. } | ExprKind::Index { target, .. } => {
                vec![target.as_mut()]
            }
            ExprKind::Lambda { body, .. } | ExprKind::Fn { body, .. } => vec![body.as_mut()],
            ExprKind::Let { value, .. }
            | ExprKind::Var { value, .. }
            | ExprKind::Assign { value, .. }
            | ExprKind::Throw(value) => vec![value.as_mut()],
            ExprKind::Match { scrutinee, cases } => std::iter::once(scrutinee.as_mut())
                .chain(cases.iter_mut().map(|c| &mut c.body))
                .collect(),
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let mut children = vec![cond.as_mut(), then_branch.as_mut()];
                children.extend(else_branch.as_deref_mut());
                children
            }
            ExprKind::Try { body, handler } => vec![body.as_mut(), handler.as_mut()],
        }
    }
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Lit(Literal),

    /// Variable reference
    Ident(String),

    /// List literal: [a b c]
    List(Vec<Expr>),

    /// Dictionary literal: [k:v ...] or [:]
    Dict(Vec<(Expr, Expr)>),

    /// Object literal: {a:1 b:2}
    Object(Vec<(String, Expr)>),

    /// tuple(a b c)
    Tuple(Vec<Expr>),

    /// Application by juxtaposition `f a b` or by parentheses `f(a b)`
    Call { callee: Box<Expr>, args: Vec<Expr> },

    Unary { op: UnaryOp, operand: Box<Expr> },

    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Field access: target.name
    Field { target: Box<Expr>, name: String },

    /// Positional tuple access: target.0
    Index { target: Box<Expr>, index: usize },

    /// a,b => body
    Lambda { params: Vec<String>, body: Box<Expr> },

    /// let name value
    Let { name: String, value: Box<Expr> },

    /// var name value
    Var { name: String, value: Box<Expr> },

    /// name = value, name += value, ...
    Assign {
        name: String,
        op: AssignOp,
        value: Box<Expr>,
    },

    /// fn name params: body
    Fn {
        name: String,
        params: Vec<String>,
        body: Box<Expr>,
    },

    /// ft name params: types (the last type is the result)
    Ft {
        name: String,
        params: Vec<String>,
        types: Vec<TypeExpr>,
    },

    /// class name: field type ...
    Class {
        name: String,
        fields: Vec<(String, TypeExpr)>,
    },

    /// enum name: tag field-types ...
    Enum { name: String, cases: Vec<EnumCase> },

    Match {
        scrutinee: Box<Expr>,
        cases: Vec<MatchCase>,
    },

    If {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Option<Box<Expr>>,
    },

    Throw(Box<Expr>),

    /// try body handler
    Try { body: Box<Expr>, handler: Box<Expr> },

    /// Indented statement sequence
    Block(Vec<Expr>),
}
