//! Token definitions for the Moa lexer.

use std::fmt;

/// Source location information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// A token with its span
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { value, span }
    }
}

/// Token types for Moa
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    Let,
    Var,
    Fn,
    Ft,
    Class,
    Enum,
    Match,
    Case,
    If,
    Else,
    Throw,
    Try,

    // Literals (kept as written, inference only cares about the kind)
    Int(std::string::String),
    Float(std::string::String),
    String(std::string::String),
    /// Template literal: `text` or $"text"
    Template(std::string::String),
    /// Regular expression literal: r"text"
    Regex(std::string::String),

    // Identifier
    Ident(std::string::String),

    // Arithmetic
    Plus,       // +
    Minus,      // -
    Star,       // *
    StarStar,   // **
    Slash,      // /
    SlashSlash, // //
    Percent,    // %

    // Comparison
    Lt,    // <
    Gt,    // >
    LtEq,  // <=
    GtEq,  // >=
    EqEq,  // ==
    NotEq, // !=

    // Logical
    And, // &&
    Or,  // ||
    Not, // !

    // Assignment
    Eq,         // =
    PlusEq,     // +=
    MinusEq,    // -=
    StarEq,     // *=
    StarStarEq, // **=
    SlashEq,    // /=
    PercentEq,  // %=

    // Punctuation
    FatArrow, // =>
    LParen,   // (
    RParen,   // )
    LBrace,   // {
    RBrace,   // }
    LBracket, // [
    RBracket, // ]
    Comma,    // ,
    Dot,      // .
    Colon,    // :

    // Layout
    Newline,
    Indent,
    Dedent,

    // Special
    Eof,
}

impl Token {
    /// Get the keyword for an identifier string, if any
    pub fn keyword(s: &str) -> Option<Token> {
        match s {
            "let" => Some(Token::Let),
            "var" => Some(Token::Var),
            "fn" => Some(Token::Fn),
            "ft" => Some(Token::Ft),
            "class" => Some(Token::Class),
            "enum" => Some(Token::Enum),
            "match" => Some(Token::Match),
            "case" => Some(Token::Case),
            "if" => Some(Token::If),
            "else" => Some(Token::Else),
            "throw" => Some(Token::Throw),
            "try" => Some(Token::Try),
            _ => None,
        }
    }

    /// Layout tokens carry no text of their own.
    pub fn is_layout(&self) -> bool {
        matches!(
            self,
            Token::Newline | Token::Indent | Token::Dedent | Token::Eof
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Let => write!(f, "let"),
            Token::Var => write!(f, "var"),
            Token::Fn => write!(f, "fn"),
            Token::Ft => write!(f, "ft"),
            Token::Class => write!(f, "class"),
            Token::Enum => write!(f, "enum"),
            Token::Match => write!(f, "match"),
            Token::Case => write!(f, "case"),
            Token::If => write!(f, "if"),
            Token::Else => write!(f, "else"),
            Token::Throw => write!(f, "throw"),
            Token::Try => write!(f, "try"),
            Token::Int(s) | Token::Float(s) => write!(f, "{}", s),
            Token::String(s) => write!(f, "\"{}\"", s),
            Token::Template(s) => write!(f, "`{}`", s),
            Token::Regex(s) => write!(f, "r\"{}\"", s),
            Token::Ident(s) => write!(f, "{}", s),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::StarStar => write!(f, "**"),
            Token::Slash => write!(f, "/"),
            Token::SlashSlash => write!(f, "//"),
            Token::Percent => write!(f, "%"),
            Token::Lt => write!(f, "<"),
            Token::Gt => write!(f, ">"),
            Token::LtEq => write!(f, "<="),
            Token::GtEq => write!(f, ">="),
            Token::EqEq => write!(f, "=="),
            Token::NotEq => write!(f, "!="),
            Token::And => write!(f, "&&"),
            Token::Or => write!(f, "||"),
            Token::Not => write!(f, "!"),
            Token::Eq => write!(f, "="),
            Token::PlusEq => write!(f, "+="),
            Token::MinusEq => write!(f, "-="),
            Token::StarEq => write!(f, "*="),
            Token::StarStarEq => write!(f, "**="),
            Token::SlashEq => write!(f, "/="),
            Token::PercentEq => write!(f, "%="),
            Token::FatArrow => write!(f, "=>"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::Comma => write!(f, ","),
            Token::Dot => write!(f, "."),
            Token::Colon => write!(f, ":"),
            Token::Newline => write!(f, "<newline>"),
            Token::Indent => write!(f, "<indent>"),
            Token::Dedent => write!(f, "<dedent>"),
            Token::Eof => write!(f, "<eof>"),
        }
    }
}
