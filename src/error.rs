//! Error types for the Moa type checker.

use crate::lexer::Span;
use thiserror::Error;

/// Result type for Moa operations.
pub type Result<T> = std::result::Result<T, MoaError>;

/// Main error type for Moa.
#[derive(Debug, Error)]
pub enum MoaError {
    #[error("Lexer error: {0}")]
    Lex(#[from] LexError),

    #[error("Parser error: {0}")]
    Parse(#[from] ParseError),

    #[error("Type error: {0}")]
    Type(#[from] TypeError),
}

impl MoaError {
    pub fn span(&self) -> Span {
        match self {
            MoaError::Lex(e) => e.span(),
            MoaError::Parse(e) => e.span(),
            MoaError::Type(e) => e.span(),
        }
    }
}

/// Lexer errors.
#[derive(Debug, Error)]
pub enum LexError {
    #[error("Unexpected character '{ch}'")]
    UnexpectedCharacter { ch: char, span: Span },

    #[error("Unterminated string literal")]
    UnterminatedString { span: Span },

    #[error("Indentation does not match any enclosing block")]
    InconsistentIndent { span: Span },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedCharacter { span, .. } => *span,
            LexError::UnterminatedString { span } => *span,
            LexError::InconsistentIndent { span } => *span,
        }
    }
}

/// Parser errors.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Unexpected token '{found}', expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: String,
        span: Span,
    },

    #[error("Unexpected end of input")]
    UnexpectedEof { span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnexpectedToken { span, .. } => *span,
            ParseError::UnexpectedEof { span } => *span,
        }
    }
}

/// Type checking errors.
///
/// Types are carried as their canonical rendered strings.
#[derive(Debug, Error)]
pub enum TypeError {
    #[error("Unknown identifier '{name}'")]
    UnknownIdentifier { name: String, span: Span },

    #[error("Property '{prop}' not found on type {ty}")]
    UnknownProperty { prop: String, ty: String, span: Span },

    #[error("Type mismatch: {left} and {right}")]
    TypeMismatch {
        left: String,
        right: String,
        span: Span,
    },

    #[error("Wrong number of arguments: expected {expected}, found {found}")]
    ArityMismatch {
        expected: usize,
        found: usize,
        span: Span,
    },

    #[error("Cannot assign to immutable or undeclared '{name}'")]
    ImmutableAssignment { name: String, span: Span },
}

impl TypeError {
    pub fn span(&self) -> Span {
        match self {
            TypeError::UnknownIdentifier { span, .. } => *span,
            TypeError::UnknownProperty { span, .. } => *span,
            TypeError::TypeMismatch { span, .. } => *span,
            TypeError::ArityMismatch { span, .. } => *span,
            TypeError::ImmutableAssignment { span, .. } => *span,
        }
    }
}
