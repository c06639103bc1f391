//! Lexer module for tokenizing Moa source code.
//!
//! Moa uses significant indentation, so besides ordinary tokens the scanner
//! emits `Newline`, `Indent` and `Dedent` layout tokens.

mod scanner;
mod token;

pub use scanner::Scanner;
pub use token::{Span, Spanned, Token};
