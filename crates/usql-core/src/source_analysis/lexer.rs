// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lexical analysis for USQL scripts.
//!
//! This module converts source text into a stream of [`Token`]s. The lexer
//! is hand-written for maximum control over error recovery and reporting.
//!
//! # Design Principles
//!
//! - **Error recovery**: never panic on malformed input; emit [`TokenKind::Error`]
//!   tokens that the parse entry point surfaces as `LexError`s
//! - **Verbatim literals**: numbers and strings keep their textual form, so
//!   no precision is lost before downstream code decides how to interpret them
//! - **Precise positions**: every token carries its byte span and the 1-based
//!   line/column of its first character
//!
//! Whitespace and comments (`//` line and `/* */` block) are skipped without
//! emitting tokens.
//!
//! # Example
//!
//! ```
//! use usql_core::source_analysis::{Lexer, TokenKind};
//!
//! let tokens: Vec<_> = Lexer::new("USE mydb").collect();
//! assert_eq!(tokens.len(), 2); // USE, mydb (EOF excluded from iterator)
//! ```

use std::iter::Peekable;
use std::str::CharIndices;

use ecow::EcoString;

use super::{Keyword, Span, Token, TokenKind};

/// A lexer that tokenizes USQL source text.
///
/// The lexer produces tokens lazily and implements [`Iterator`] for easy
/// consumption. The sequence is finite; re-tokenizing requires a fresh
/// `Lexer` (no in-place seek).
pub struct Lexer<'src> {
    /// The source text being lexed.
    source: &'src str,
    /// Character iterator with byte positions.
    chars: Peekable<CharIndices<'src>>,
    /// Current byte position in source.
    position: usize,
    /// Current 1-based line.
    line: u32,
    /// Current 1-based column (counted in characters).
    column: u32,
}

impl std::fmt::Debug for Lexer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexer")
            .field("position", &self.position)
            .field("remaining", &self.source.get(self.position..).unwrap_or(""))
            .finish()
    }
}

/// Tokenizes `source`, excluding the end-of-input marker.
#[must_use]
pub fn lex(source: &str) -> Vec<Token> {
    Lexer::new(source).collect()
}

/// Tokenizes `source`, including the trailing [`TokenKind::Eof`] token.
///
/// The parser requires the EOF token to detect end of input.
#[must_use]
pub fn lex_with_eof(source: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.lex_token();
        let at_end = token.kind().is_eof();
        tokens.push(token);
        if at_end {
            break;
        }
    }
    tokens
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source text.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Peeks at the next character without consuming it.
    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    /// Peeks `n+1` characters ahead without consuming (n=0 is the same as
    /// `peek_char`, n=1 returns the second character, etc.).
    fn peek_char_n(&self, n: usize) -> Option<char> {
        let mut iter = self.chars.clone();
        for _ in 0..n {
            iter.next();
        }
        iter.next().map(|(_, c)| c)
    }

    /// Consumes the next character and returns it.
    fn advance(&mut self) -> Option<char> {
        let (pos, c) = self.chars.next()?;
        self.position = pos + c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Consumes characters while the predicate is true.
    fn advance_while(&mut self, predicate: impl Fn(char) -> bool) {
        while self.peek_char().is_some_and(&predicate) {
            self.advance();
        }
    }

    /// Returns the current byte position.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "scripts over 4GB are not supported"
    )]
    fn current_position(&self) -> u32 {
        self.position as u32
    }

    /// Creates a span from start to current position.
    fn span_from(&self, start: u32) -> Span {
        Span::new(start, self.current_position())
    }

    /// Extracts source text for a span.
    fn text_for(&self, span: Span) -> &'src str {
        &self.source[span.as_range()]
    }

    /// Skips whitespace and comments without emitting tokens.
    ///
    /// An unterminated block comment is consumed to end of input; the
    /// missing terminator surfaces as an EOF where the parser expected
    /// more, rather than as a lexer failure.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek_char() {
                Some(c) if c.is_whitespace() => {
                    self.advance_while(char::is_whitespace);
                }
                Some('/') if self.peek_char_n(1) == Some('/') => {
                    self.advance_while(|c| c != '\n');
                }
                Some('/') if self.peek_char_n(1) == Some('*') => {
                    self.advance(); // /
                    self.advance(); // *
                    loop {
                        match self.peek_char() {
                            None => break,
                            Some('*') if self.peek_char_n(1) == Some('/') => {
                                self.advance(); // *
                                self.advance(); // /
                                break;
                            }
                            _ => {
                                self.advance();
                            }
                        }
                    }
                }
                _ => break,
            }
        }
    }

    /// Lexes the next token. Returns the EOF token at end of input.
    pub(super) fn lex_token(&mut self) -> Token {
        self.skip_trivia();

        let start = self.current_position();
        let line = self.line;
        let column = self.column;

        let kind = match self.peek_char() {
            None => TokenKind::Eof,
            Some(c) => self.lex_token_kind(c, start),
        };

        Token::new(kind, self.span_from(start), line, column)
    }

    /// Lexes a token kind based on the first character.
    fn lex_token_kind(&mut self, c: char, start: u32) -> TokenKind {
        match c {
            'a'..='z' | 'A'..='Z' | '_' => self.lex_word(),
            '0'..='9' => self.lex_number(),
            '\'' => self.lex_string(start),
            '[' => self.lex_quoted_identifier(start),
            '@' => self.lex_variable(start),

            '(' => {
                self.advance();
                TokenKind::LeftParen
            }
            ')' => {
                self.advance();
                TokenKind::RightParen
            }
            ',' => {
                self.advance();
                TokenKind::Comma
            }
            '.' => {
                self.advance();
                TokenKind::Dot
            }
            ';' => {
                self.advance();
                TokenKind::Semicolon
            }

            '+' | '-' | '*' | '/' | '%' => {
                self.advance();
                TokenKind::Operator(EcoString::from(self.text_for(self.span_from(start))))
            }
            '<' => {
                self.advance();
                if matches!(self.peek_char(), Some('=' | '>')) {
                    self.advance();
                }
                TokenKind::Operator(EcoString::from(self.text_for(self.span_from(start))))
            }
            '>' => {
                self.advance();
                if self.peek_char() == Some('=') {
                    self.advance();
                }
                TokenKind::Operator(EcoString::from(self.text_for(self.span_from(start))))
            }
            '=' => {
                self.advance();
                if self.peek_char() == Some('=') {
                    self.advance();
                }
                TokenKind::Operator(EcoString::from(self.text_for(self.span_from(start))))
            }
            '!' => {
                self.advance();
                if self.peek_char() == Some('=') {
                    self.advance();
                    TokenKind::Operator(EcoString::from("!="))
                } else {
                    TokenKind::Error(EcoString::from("!"))
                }
            }

            // Unknown character - error recovery
            _ => {
                self.advance();
                let text = self.text_for(self.span_from(start));
                TokenKind::Error(EcoString::from(text))
            }
        }
    }

    /// Lexes a word and classifies it against the keyword table.
    ///
    /// The table is case-sensitive: only the reserved upper-case forms are
    /// keywords; everything else is an unquoted identifier.
    fn lex_word(&mut self) -> TokenKind {
        let start = self.current_position();
        self.advance_while(|c| c.is_ascii_alphanumeric() || c == '_');
        let text = self.text_for(self.span_from(start));

        match Keyword::from_word(text) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Identifier(EcoString::from(text)),
        }
    }

    /// Lexes a numeric literal, preserving its textual form verbatim.
    ///
    /// Supports integers (`42`), decimals (`3.5`), exponents (`2.5E10`),
    /// and C#-style type suffixes (`100L`, `0.5m`, `1.0f`).
    fn lex_number(&mut self) -> TokenKind {
        let start = self.current_position();

        self.advance_while(|c| c.is_ascii_digit());

        // Fraction: a decimal point only counts when a digit follows,
        // otherwise the dot is a separate member-access token.
        if self.peek_char() == Some('.') && self.peek_char_n(1).is_some_and(|c| c.is_ascii_digit())
        {
            self.advance(); // .
            self.advance_while(|c| c.is_ascii_digit());
        }

        // Exponent: e/E, optional sign, digits.
        if matches!(self.peek_char(), Some('e' | 'E')) {
            let after_e = self.peek_char_n(1);
            let after_sign = self.peek_char_n(2);
            let has_exponent = match after_e {
                Some(c) if c.is_ascii_digit() => true,
                Some('+' | '-') => after_sign.is_some_and(|c| c.is_ascii_digit()),
                _ => false,
            };
            if has_exponent {
                self.advance(); // e/E
                if matches!(self.peek_char(), Some('+' | '-')) {
                    self.advance();
                }
                self.advance_while(|c| c.is_ascii_digit());
            }
        }

        // C#-style numeric type suffix.
        self.advance_while(|c| matches!(c, 'l' | 'L' | 'u' | 'U' | 'm' | 'M' | 'f' | 'F' | 'd' | 'D'));

        TokenKind::Number(EcoString::from(self.text_for(self.span_from(start))))
    }

    /// Lexes a single-quoted string literal, quotes preserved in the text.
    ///
    /// A doubled quote (`''`) escapes a literal quote. An unterminated
    /// string produces an error token carrying the consumed text.
    fn lex_string(&mut self, start: u32) -> TokenKind {
        self.advance(); // opening quote

        loop {
            match self.peek_char() {
                None => {
                    let text = self.text_for(self.span_from(start));
                    return TokenKind::Error(EcoString::from(text));
                }
                Some('\'') if self.peek_char_n(1) == Some('\'') => {
                    self.advance(); // first '
                    self.advance(); // second '
                }
                Some('\'') => {
                    self.advance(); // closing quote
                    break;
                }
                Some(_) => {
                    self.advance();
                }
            }
        }

        TokenKind::String(EcoString::from(self.text_for(self.span_from(start))))
    }

    /// Lexes a bracket-quoted identifier, delimiters preserved in the text.
    fn lex_quoted_identifier(&mut self, start: u32) -> TokenKind {
        self.advance(); // [

        loop {
            match self.peek_char() {
                None | Some('\n') => {
                    let text = self.text_for(self.span_from(start));
                    return TokenKind::Error(EcoString::from(text));
                }
                Some(']') => {
                    self.advance();
                    break;
                }
                Some(_) => {
                    self.advance();
                }
            }
        }

        TokenKind::QuotedIdentifier(EcoString::from(self.text_for(self.span_from(start))))
    }

    /// Lexes a `@variable` reference, `@` preserved in the text.
    fn lex_variable(&mut self, start: u32) -> TokenKind {
        self.advance(); // @

        if !self
            .peek_char()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        {
            return TokenKind::Error(EcoString::from("@"));
        }

        self.advance_while(|c| c.is_ascii_alphanumeric() || c == '_');
        TokenKind::Variable(EcoString::from(self.text_for(self.span_from(start))))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = self.lex_token();
        if token.kind().is_eof() {
            None
        } else {
            Some(token)
        }
    }
}
