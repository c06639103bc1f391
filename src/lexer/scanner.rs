//! Character-level scanner for tokenizing Moa source.

use std::collections::VecDeque;

use super::token::{Span, Spanned, Token};
use crate::error::{LexError, Result};

/// The lexer/scanner for Moa source code.
pub struct Scanner<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    current_pos: usize,
    /// Columns of the currently open indentation levels, innermost last.
    indents: Vec<usize>,
    /// Layout tokens produced ahead of time (dedent runs, end of input).
    pending: VecDeque<Spanned<Token>>,
    /// Bracket nesting; layout is ignored while inside brackets.
    depth: usize,
    at_line_start: bool,
    /// Whether the current logical line produced a token yet.
    line_has_content: bool,
    /// Set right after a `.`, where digits are a tuple index: `t.0.1`
    after_dot: bool,
    finished: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            current_pos: 0,
            indents: vec![0],
            pending: VecDeque::new(),
            depth: 0,
            at_line_start: true,
            line_has_content: false,
            after_dot: false,
            finished: false,
        }
    }

    /// Tokenize the entire source.
    pub fn tokenize(mut self) -> Result<Vec<Spanned<Token>>> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            let is_eof = token.value == Token::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        Ok(tokens)
    }

    /// Get the next token from the source.
    pub fn next_token(&mut self) -> Result<Spanned<Token>> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(token);
            }

            if self.at_line_start && self.depth == 0 {
                self.at_line_start = false;
                if let Some(token) = self.scan_indentation()? {
                    return Ok(token);
                }
            }

            self.skip_whitespace_and_comments();

            let start = self.current_pos;

            let Some((_, ch)) = self.peek() else {
                self.finish(start);
                continue;
            };

            if ch == '\n' {
                self.advance();
                self.at_line_start = true;
                if self.line_has_content {
                    self.line_has_content = false;
                    return Ok(Spanned::new(Token::Newline, Span::new(start, start + 1)));
                }
                continue;
            }

            let token = self.scan_token(ch)?;
            self.after_dot = token == Token::Dot;
            self.line_has_content = true;
            return Ok(Spanned::new(token, Span::new(start, self.current_pos)));
        }
    }

    fn scan_token(&mut self, ch: char) -> Result<Token> {
        let token = match ch {
            '(' => self.open(Token::LParen),
            '[' => self.open(Token::LBracket),
            '{' => self.open(Token::LBrace),
            ')' => self.close(Token::RParen),
            ']' => self.close(Token::RBracket),
            '}' => self.close(Token::RBrace),
            ',' => self.single(Token::Comma),
            '.' => self.single(Token::Dot),
            ':' => self.single(Token::Colon),

            '+' => self.scan_with_eq(Token::Plus, Token::PlusEq),
            '-' => self.scan_with_eq(Token::Minus, Token::MinusEq),
            '%' => self.scan_with_eq(Token::Percent, Token::PercentEq),
            '<' => self.scan_with_eq(Token::Lt, Token::LtEq),
            '>' => self.scan_with_eq(Token::Gt, Token::GtEq),
            '!' => self.scan_with_eq(Token::Not, Token::NotEq),
            '*' => self.scan_star(),
            '/' => self.scan_slash(),
            '=' => self.scan_equals(),
            '&' => self.scan_double('&', Token::And)?,
            '|' => self.scan_double('|', Token::Or)?,

            '"' => Token::String(self.scan_quoted('"')?),
            '`' => Token::Template(self.scan_quoted('`')?),
            'r' if self.peek_next() == Some('"') => {
                self.advance();
                Token::Regex(self.scan_quoted('"')?)
            }
            '$' if self.peek_next() == Some('"') => {
                self.advance();
                Token::Template(self.scan_quoted('"')?)
            }

            c if c.is_ascii_digit() => self.scan_number(),
            c if c.is_alphabetic() || c == '_' => self.scan_identifier(),

            other => {
                let start = self.current_pos;
                self.advance();
                return Err(LexError::UnexpectedCharacter {
                    ch: other,
                    span: Span::new(start, self.current_pos),
                }
                .into());
            }
        };
        Ok(token)
    }

    /// Measure the indentation of a fresh line, skipping blank and comment-only lines.
    fn scan_indentation(&mut self) -> Result<Option<Spanned<Token>>> {
        let (start, column) = loop {
            let start = self.current_pos;
            let mut column = 0;
            while let Some((_, ' ' | '\t')) = self.peek() {
                self.advance();
                column += 1;
            }
            match self.peek() {
                None => return Ok(None),
                Some((_, '\n' | '\r')) => {
                    self.advance();
                }
                Some((_, '#')) => {
                    self.skip_comment();
                }
                Some(_) => break (start, column),
            }
        };

        let span = Span::new(start, self.current_pos);
        let top = self.indents.last().copied().unwrap_or(0);

        if column > top {
            self.indents.push(column);
            return Ok(Some(Spanned::new(Token::Indent, span)));
        }

        while column < self.indents.last().copied().unwrap_or(0) {
            self.indents.pop();
            self.pending.push_back(Spanned::new(Token::Dedent, span));
        }

        if self.indents.last().copied().unwrap_or(0) != column {
            return Err(LexError::InconsistentIndent { span }.into());
        }

        Ok(self.pending.pop_front())
    }

    /// Queue the tokens closing the input: a final newline, dedents, eof.
    fn finish(&mut self, at: usize) {
        let span = Span::new(at, at);
        if !self.finished {
            self.finished = true;
            if self.line_has_content {
                self.line_has_content = false;
                self.pending.push_back(Spanned::new(Token::Newline, span));
            }
            while self.indents.len() > 1 {
                self.indents.pop();
                self.pending.push_back(Spanned::new(Token::Dedent, span));
            }
        }
        self.pending.push_back(Spanned::new(Token::Eof, span));
    }

    fn peek(&mut self) -> Option<(usize, char)> {
        self.chars.peek().copied()
    }

    fn advance(&mut self) -> Option<(usize, char)> {
        let result = self.chars.next();
        if let Some((pos, ch)) = result {
            self.current_pos = pos + ch.len_utf8();
        }
        result
    }

    fn peek_next(&self) -> Option<char> {
        let mut iter = self.chars.clone();
        iter.next();
        iter.next().map(|(_, c)| c)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some((_, ' ' | '\t' | '\r')) => {
                    self.advance();
                }
                Some((_, '\n')) if self.depth > 0 => {
                    self.advance();
                }
                Some((_, '#')) => self.skip_comment(),
                _ => break,
            }
        }
    }

    fn skip_comment(&mut self) {
        while let Some((_, ch)) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn single(&mut self, token: Token) -> Token {
        self.advance();
        token
    }

    fn open(&mut self, token: Token) -> Token {
        self.depth += 1;
        self.single(token)
    }

    fn close(&mut self, token: Token) -> Token {
        self.depth = self.depth.saturating_sub(1);
        self.single(token)
    }

    fn scan_with_eq(&mut self, plain: Token, with_eq: Token) -> Token {
        self.advance();
        match self.peek() {
            Some((_, '=')) => {
                self.advance();
                with_eq
            }
            _ => plain,
        }
    }

    fn scan_star(&mut self) -> Token {
        self.advance(); // *
        match self.peek() {
            Some((_, '*')) => {
                self.advance();
                match self.peek() {
                    Some((_, '=')) => {
                        self.advance();
                        Token::StarStarEq
                    }
                    _ => Token::StarStar,
                }
            }
            Some((_, '=')) => {
                self.advance();
                Token::StarEq
            }
            _ => Token::Star,
        }
    }

    fn scan_slash(&mut self) -> Token {
        self.advance(); // /
        match self.peek() {
            Some((_, '/')) => {
                self.advance();
                Token::SlashSlash
            }
            Some((_, '=')) => {
                self.advance();
                Token::SlashEq
            }
            _ => Token::Slash,
        }
    }

    fn scan_equals(&mut self) -> Token {
        self.advance(); // =
        match self.peek() {
            Some((_, '=')) => {
                self.advance();
                Token::EqEq
            }
            Some((_, '>')) => {
                self.advance();
                Token::FatArrow
            }
            _ => Token::Eq,
        }
    }

    fn scan_double(&mut self, ch: char, token: Token) -> Result<Token> {
        let start = self.current_pos;
        self.advance();
        match self.peek() {
            Some((_, c)) if c == ch => {
                self.advance();
                Ok(token)
            }
            _ => Err(LexError::UnexpectedCharacter {
                ch,
                span: Span::new(start, self.current_pos),
            }
            .into()),
        }
    }

    /// Scan a quoted literal whose opening quote is the next character.
    fn scan_quoted(&mut self, quote: char) -> Result<std::string::String> {
        let start = self.current_pos;
        self.advance(); // opening quote
        let mut value = std::string::String::new();

        loop {
            match self.advance() {
                Some((_, ch)) if ch == quote => break,
                Some((_, '\\')) => match self.advance() {
                    Some((_, 'n')) => value.push('\n'),
                    Some((_, 't')) => value.push('\t'),
                    Some((_, 'r')) => value.push('\r'),
                    Some((_, other)) => value.push(other),
                    None => {
                        return Err(LexError::UnterminatedString {
                            span: Span::new(start, self.current_pos),
                        }
                        .into())
                    }
                },
                Some((_, ch)) => value.push(ch),
                None => {
                    return Err(LexError::UnterminatedString {
                        span: Span::new(start, self.current_pos),
                    }
                    .into())
                }
            }
        }

        Ok(value)
    }

    fn scan_number(&mut self) -> Token {
        let start = self.current_pos;
        self.scan_decimal_digits();

        // A dot only starts a fraction when a digit follows; `t.0` stays an index.
        let is_float = !self.after_dot
            && self.peek().map(|(_, c)| c == '.').unwrap_or(false)
            && self.peek_next().map(|c| c.is_ascii_digit()).unwrap_or(false);

        if is_float {
            self.advance();
            self.scan_decimal_digits();
            Token::Float(self.source[start..self.current_pos].to_string())
        } else {
            Token::Int(self.source[start..self.current_pos].to_string())
        }
    }

    fn scan_decimal_digits(&mut self) {
        while let Some((_, ch)) = self.peek() {
            if ch.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn scan_identifier(&mut self) -> Token {
        let start = self.current_pos;

        while let Some((_, ch)) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' {
                self.advance();
            } else {
                break;
            }
        }

        let ident = &self.source[start..self.current_pos];
        Token::keyword(ident).unwrap_or_else(|| Token::Ident(ident.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(source: &str) -> Vec<Token> {
        Scanner::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|s| s.value)
            .collect()
    }

    fn ident(s: &str) -> Token {
        Token::Ident(s.to_string())
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            tokenize("let x"),
            vec![Token::Let, ident("x"), Token::Newline, Token::Eof]
        );
        assert_eq!(
            tokenize("fn ft class enum"),
            vec![
                Token::Fn,
                Token::Ft,
                Token::Class,
                Token::Enum,
                Token::Newline,
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            tokenize("42 1.5"),
            vec![
                Token::Int("42".into()),
                Token::Float("1.5".into()),
                Token::Newline,
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_tuple_index_is_not_a_float() {
        assert_eq!(
            tokenize("t.0"),
            vec![
                ident("t"),
                Token::Dot,
                Token::Int("0".into()),
                Token::Newline,
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_nested_tuple_index() {
        assert_eq!(
            tokenize("t.0.1"),
            vec![
                ident("t"),
                Token::Dot,
                Token::Int("0".into()),
                Token::Dot,
                Token::Int("1".into()),
                Token::Newline,
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_string_kinds() {
        assert_eq!(
            tokenize(r#""hi" `hi` r"h+" $"hi""#),
            vec![
                Token::String("hi".into()),
                Token::Template("hi".into()),
                Token::Regex("h+".into()),
                Token::Template("hi".into()),
                Token::Newline,
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            tokenize(r#""a\"b\n""#),
            vec![Token::String("a\"b\n".into()), Token::Newline, Token::Eof]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            tokenize("+ += ** **= // == => != && ||"),
            vec![
                Token::Plus,
                Token::PlusEq,
                Token::StarStar,
                Token::StarStarEq,
                Token::SlashSlash,
                Token::EqEq,
                Token::FatArrow,
                Token::NotEq,
                Token::And,
                Token::Or,
                Token::Newline,
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_indentation() {
        assert_eq!(
            tokenize("fn f:\n  1\n  2\nf"),
            vec![
                Token::Fn,
                ident("f"),
                Token::Colon,
                Token::Newline,
                Token::Indent,
                Token::Int("1".into()),
                Token::Newline,
                Token::Int("2".into()),
                Token::Newline,
                Token::Dedent,
                ident("f"),
                Token::Newline,
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_dedent_at_end_of_input() {
        assert_eq!(
            tokenize("a:\n  b:\n    c"),
            vec![
                ident("a"),
                Token::Colon,
                Token::Newline,
                Token::Indent,
                ident("b"),
                Token::Colon,
                Token::Newline,
                Token::Indent,
                ident("c"),
                Token::Newline,
                Token::Dedent,
                Token::Dedent,
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_blank_lines_and_comments() {
        assert_eq!(
            tokenize("a # note\n\n   # indented comment\nb"),
            vec![
                ident("a"),
                Token::Newline,
                ident("b"),
                Token::Newline,
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_newlines_inside_brackets() {
        assert_eq!(
            tokenize("[1\n  2]"),
            vec![
                Token::LBracket,
                Token::Int("1".into()),
                Token::Int("2".into()),
                Token::RBracket,
                Token::Newline,
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_inconsistent_indent() {
        let result = Scanner::new("a:\n    b\n  c").tokenize();
        assert!(matches!(
            result,
            Err(crate::error::MoaError::Lex(
                LexError::InconsistentIndent { .. }
            ))
        ));
    }

    #[test]
    fn test_unterminated_string() {
        let result = Scanner::new("\"abc").tokenize();
        assert!(matches!(
            result,
            Err(crate::error::MoaError::Lex(
                LexError::UnterminatedString { .. }
            ))
        ));
    }

    #[test]
    fn test_spans() {
        let tokens = Scanner::new("ab + 1").tokenize().unwrap();
        assert_eq!(tokens[0].span, Span::new(0, 2));
        assert_eq!(tokens[1].span, Span::new(3, 4));
        assert_eq!(tokens[2].span, Span::new(5, 6));
    }
}
