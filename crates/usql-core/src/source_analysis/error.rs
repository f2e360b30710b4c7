// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Error types for the USQL front-end.
//!
//! Errors carry source locations ([`Span`]) for precise diagnostics and
//! integrate with [`miette`] for rendering. Three kinds exist:
//!
//! - [`LexError`] — an unrecognized character or malformed literal.
//! - [`ParseError`] — the outward fail-fast error: either lexical or
//!   syntactic, always carrying the offending token text and its 1-based
//!   line/column.
//! - [`RuleError`] — a recoverable sub-rule failure attached to a syntax
//!   node instead of aborting the parse (see
//!   [`CreateDatabaseStatement`](crate::ast::CreateDatabaseStatement)).

// Spurious warnings from miette derive macro expansion
#![allow(unused_assignments)]

use ecow::EcoString;
use miette::Diagnostic;
use thiserror::Error;

use super::{Position, Span};

/// A lexical error encountered during tokenization.
///
/// The lexer recovers by emitting error tokens, so lexical errors never
/// abort tokenization itself; the parse entry point converts the first
/// error token into a `LexError` under fail-fast mode.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{kind}")]
#[diagnostic()]
pub struct LexError {
    /// The kind of lexical error.
    #[source]
    pub kind: LexErrorKind,
    /// The source location of the error.
    #[label("here")]
    pub span: Span,
}

impl LexError {
    /// Creates a new lexical error.
    #[must_use]
    pub fn new(kind: LexErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Creates an "unexpected character" error.
    #[must_use]
    pub fn unexpected_char(c: char, span: Span) -> Self {
        Self::new(LexErrorKind::UnexpectedCharacter(c), span)
    }

    /// Creates an "unterminated string" error.
    #[must_use]
    pub fn unterminated_string(span: Span) -> Self {
        Self::new(LexErrorKind::UnterminatedString, span)
    }
}

/// The kind of lexical error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexErrorKind {
    /// An unexpected character was encountered.
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),

    /// A string literal was not terminated.
    #[error("unterminated string literal")]
    UnterminatedString,

    /// A quoted identifier was not terminated.
    #[error("unterminated quoted identifier")]
    UnterminatedQuotedIdentifier,

    /// A `@` that is not followed by a variable name.
    #[error("'@' must be followed by a variable name")]
    MalformedVariable,
}

impl LexErrorKind {
    /// Classifies a lexer error token's text.
    ///
    /// The lexer preserves the consumed text in its error tokens; the
    /// leading character identifies what went wrong.
    #[must_use]
    pub fn classify(text: &str) -> Self {
        if text.starts_with('\'') {
            Self::UnterminatedString
        } else if text.starts_with('[') {
            Self::UnterminatedQuotedIdentifier
        } else if text == "@" {
            Self::MalformedVariable
        } else {
            Self::UnexpectedCharacter(text.chars().next().unwrap_or('\0'))
        }
    }
}

/// The stage that produced a diagnostic or error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Tokenization.
    Lexer,
    /// Grammar recognition.
    Parser,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexer => f.write_str("lexer"),
            Self::Parser => f.write_str("parser"),
        }
    }
}

/// The error returned by a failed fail-fast parse.
///
/// Under fail-fast mode no partial tree is ever returned: the first
/// lexical or syntactic error aborts the parse and surfaces here with the
/// offending token's text and position.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ParseError {
    /// Tokenization failed.
    #[error("lexical error at {position}: {message}")]
    #[diagnostic()]
    Lex {
        /// Human-readable description of the failure.
        message: EcoString,
        /// The offending token text.
        offending: EcoString,
        /// 1-based line/column of the offending token.
        position: Position,
        /// Byte span of the offending token.
        #[label("offending token")]
        span: Span,
    },

    /// The token sequence matched no grammar alternative.
    #[error("syntax error at {position}: {message}")]
    #[diagnostic()]
    Syntax {
        /// Human-readable description of the failure.
        message: EcoString,
        /// The offending token text.
        offending: EcoString,
        /// 1-based line/column of the offending token.
        position: Position,
        /// Byte span of the offending token.
        #[label("offending token")]
        span: Span,
    },
}

impl ParseError {
    /// Returns the stage that produced this error.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        match self {
            Self::Lex { .. } => Stage::Lexer,
            Self::Syntax { .. } => Stage::Parser,
        }
    }

    /// Returns the 1-based line/column of the offending token.
    #[must_use]
    pub const fn position(&self) -> Position {
        match self {
            Self::Lex { position, .. } | Self::Syntax { position, .. } => *position,
        }
    }

    /// Returns the offending token text.
    #[must_use]
    pub fn offending_text(&self) -> &str {
        match self {
            Self::Lex { offending, .. } | Self::Syntax { offending, .. } => offending,
        }
    }

    /// Returns the error message without position prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Lex { message, .. } | Self::Syntax { message, .. } => message,
        }
    }

    /// Returns the byte span of the offending token.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Lex { span, .. } | Self::Syntax { span, .. } => *span,
        }
    }
}

/// A recoverable sub-rule failure attached to a syntax node.
///
/// Some grammar rules define a fallback: the enclosing statement node still
/// exists, carrying the failure instead of propagating it. The parse as a
/// whole continues in both error modes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RuleError {
    /// Description of the sub-rule failure.
    pub message: EcoString,
    /// The source location where the sub-rule failed.
    pub span: Span,
}

impl RuleError {
    /// Creates a new recoverable rule error.
    #[must_use]
    pub fn new(message: impl Into<EcoString>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_error_display() {
        let err = LexError::unexpected_char('§', Span::new(0, 2));
        assert_eq!(err.to_string(), "unexpected character '§'");

        let err = LexError::unterminated_string(Span::new(0, 10));
        assert_eq!(err.to_string(), "unterminated string literal");
    }

    #[test]
    fn parse_error_display_and_accessors() {
        let err = ParseError::Syntax {
            message: "expected a statement".into(),
            offending: ")".into(),
            position: Position { line: 1, column: 9 },
            span: Span::new(8, 9),
        };
        assert_eq!(
            err.to_string(),
            "syntax error at line 1, column 9: expected a statement"
        );
        assert_eq!(err.stage(), Stage::Parser);
        assert_eq!(err.offending_text(), ")");
        assert_eq!(err.position().column, 9);
        assert_eq!(err.span(), Span::new(8, 9));
    }

    #[test]
    fn stage_display() {
        assert_eq!(Stage::Lexer.to_string(), "lexer");
        assert_eq!(Stage::Parser.to_string(), "parser");
    }

    #[test]
    fn classify_error_token_text() {
        assert_eq!(
            LexErrorKind::classify("'oops"),
            LexErrorKind::UnterminatedString
        );
        assert_eq!(
            LexErrorKind::classify("[oops"),
            LexErrorKind::UnterminatedQuotedIdentifier
        );
        assert_eq!(LexErrorKind::classify("@"), LexErrorKind::MalformedVariable);
        assert_eq!(
            LexErrorKind::classify("?"),
            LexErrorKind::UnexpectedCharacter('?')
        );
    }

    #[test]
    fn rule_error_display() {
        let err = RuleError::new("expected a database name", Span::new(16, 17));
        assert_eq!(err.to_string(), "expected a database name");
    }
}
