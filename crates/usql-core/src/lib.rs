// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! USQL front-end: lexer, parser, and syntax-tree core.
//!
//! This crate converts USQL source text into a structured syntax tree and
//! lets downstream code inspect the statements it finds:
//!
//! - [`source_analysis`] — tokenization, the statement/expression grammar,
//!   and the error strategy (fail-fast by default, error-collecting as an
//!   extension point)
//! - [`ast`] — the immutable syntax tree model
//! - [`ast_walker`] — a listener protocol for traversing a parsed tree
//!
//! Parsing is synchronous and self-contained: one script in, one tree (or
//! one located error) out. Independent scripts can be parsed from
//! independent threads, and a finished tree is immutable and safe to
//! traverse concurrently.
//!
//! # Example
//!
//! ```
//! use usql_core::ast::Statement;
//! use usql_core::source_analysis::{ParseOptions, parse_script};
//!
//! let (program, _) = parse_script("DROP TABLE IF EXISTS foo.bar", &ParseOptions::default())
//!     .expect("valid script");
//!
//! let Statement::DropTable(drop) = &program.statements[0] else {
//!     panic!("expected a DROP TABLE statement");
//! };
//! assert!(drop.if_exists);
//! assert_eq!(drop.table.text(), "foo.bar");
//! ```

pub mod ast;
pub mod ast_walker;
pub mod source_analysis;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::ast::{Expression, Identifier, MultipartIdentifier, Program, Statement};
    pub use crate::ast_walker::{Listener, walk_program};
    pub use crate::source_analysis::{ParseError, ParseOptions, Span, parse_script};
}
