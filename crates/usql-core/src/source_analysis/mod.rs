// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Parsing infrastructure for USQL scripts.
//!
//! This module contains the lexer, parser, and their shared support types.
//!
//! # Lexical Analysis
//!
//! The [`Lexer`] converts source text into a stream of [`Token`]s. Each
//! token carries its byte [`Span`] and 1-based line/column. Literal text
//! is preserved verbatim.
//!
//! ```
//! use usql_core::source_analysis::{Lexer, TokenKind};
//!
//! let tokens: Vec<_> = Lexer::new("USE mydb").collect();
//! assert_eq!(tokens.len(), 2); // USE, mydb
//! ```
//!
//! See [`TokenKind`] for all supported syntactic elements.
//!
//! # Parsing
//!
//! [`parse`] converts tokens into a [`Program`](crate::ast::Program) plus
//! diagnostics; [`parse_script`] is the outward entry point that selects
//! the error mode and optionally prints the token stream first.
//!
//! # Error Handling
//!
//! The lexer recovers from invalid input by emitting [`TokenKind::Error`]
//! tokens; under the default fail-fast mode the parse entry point converts
//! the first error (lexical or syntactic, whichever is positionally
//! earliest) into a [`ParseError`] and returns no tree. The optional
//! error-collecting mode returns every problem as a [`Diagnostic`]
//! alongside a tree with error nodes.

mod error;
mod lexer;
mod parser;
mod span;
mod token;

// Property-based tests for the lexer
#[cfg(test)]
mod lexer_property_tests;

pub use error::{LexError, LexErrorKind, ParseError, RuleError, Stage};
pub use lexer::{Lexer, lex, lex_with_eof};
pub use parser::{Diagnostic, ErrorMode, ParseOptions, Severity, parse, parse_script};
pub use span::{Position, Span};
pub use token::{Keyword, Token, TokenKind};
