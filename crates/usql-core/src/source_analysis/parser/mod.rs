// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Recursive descent parser for USQL scripts.
//!
//! This parser builds a [`Program`] from a stream of tokens. Statement
//! forms are dispatched on their leading keyword; expressions use Pratt
//! parsing for declarative operator precedence.
//!
//! # Error Strategy
//!
//! Two modes, selected per invocation through [`ParseOptions`]:
//!
//! - **Fail-fast (default)** — the first lexical or syntactic error aborts
//!   the parse; [`parse_script`] returns a [`ParseError`] naming the
//!   offending token and its 1-based line/column, and no tree is returned.
//! - **Error-collecting** — errors become [`Diagnostic`]s and error nodes
//!   in the tree; the rest of the script still parses.
//!
//! Internally the parser always recovers (synchronizing at statement
//! boundaries) and collects diagnostics; fail-fast is enforced at the
//! entry point by refusing to return a tree once an error-severity
//! diagnostic exists. Recoverable rules (see
//! [`CreateDatabaseStatement`](crate::ast::CreateDatabaseStatement)) record
//! warnings, which never abort.
//!
//! # Operator Precedence (Pratt Parsing)
//!
//! Binary operator precedence uses a binding-power table, lowest first:
//!
//! | Level | Operators        | Associativity |
//! |-------|------------------|---------------|
//! | 10    | `OR`             | Left |
//! | 20    | `AND`            | Left |
//! | 30    | `= == != <>`     | Left |
//! | 40    | `< > <= >=`      | Left |
//! | 50    | `+ -`            | Left |
//! | 60    | `* / %`          | Left |
//!
//! Prefix `NOT` binds between `AND` and the comparisons; prefix `-`/`+`
//! bind above `*`; member access `.` binds tightest. To add a new
//! operator, add an entry to [`binary_binding_power`].
//!
//! # Usage
//!
//! ```
//! use usql_core::source_analysis::{lex_with_eof, parse};
//!
//! let tokens = lex_with_eof("USE mydb");
//! let (program, diagnostics) = parse(tokens);
//!
//! assert!(diagnostics.is_empty());
//! assert_eq!(program.statements.len(), 1);
//! ```

use ecow::EcoString;
use tracing::debug;

use crate::ast::{Program, Statement};
use crate::source_analysis::{
    Keyword, LexErrorKind, ParseError, Position, Span, Stage, Token, TokenKind, lex_with_eof,
};

// Submodules with additional impl blocks for Parser
mod expressions;
mod statements;

// ============================================================================
// Pratt Parsing for Binary Operator Precedence
// ============================================================================

/// Binding power for binary operators (Pratt parsing).
///
/// Higher values bind tighter. Left and right binding powers differ
/// for associativity: left-associative operators have
/// `left == right - 1`.
#[derive(Debug, Clone, Copy)]
pub(super) struct BindingPower {
    /// How tightly this operator binds to its left operand.
    pub(super) left: u8,
    /// How tightly this operator binds to its right operand.
    pub(super) right: u8,
}

impl BindingPower {
    /// Creates a left-associative binding power.
    const fn left_assoc(precedence: u8) -> Self {
        Self {
            left: precedence,
            right: precedence + 1,
        }
    }
}

/// Right binding power of prefix `NOT`: between `AND` and the comparisons,
/// so `NOT a = b` parses as `NOT (a = b)` and `NOT a AND b` as
/// `(NOT a) AND b`.
pub(super) const NOT_RIGHT_BINDING_POWER: u8 = 25;

/// Gets the binding power for a binary operator.
///
/// Returns `None` for anything that is not a binary operator, which ends
/// expression parsing at that token. The table is total over the USQL
/// operator set; every level is left-associative.
pub(super) fn binary_binding_power(op: &str) -> Option<BindingPower> {
    match op {
        "OR" => Some(BindingPower::left_assoc(10)),
        "AND" => Some(BindingPower::left_assoc(20)),
        "=" | "==" | "!=" | "<>" => Some(BindingPower::left_assoc(30)),
        "<" | ">" | "<=" | ">=" => Some(BindingPower::left_assoc(40)),
        "+" | "-" => Some(BindingPower::left_assoc(50)),
        "*" | "/" | "%" => Some(BindingPower::left_assoc(60)),
        _ => None,
    }
}

// ============================================================================
// Entry Points
// ============================================================================

/// Parses a token sequence into a program, collecting diagnostics.
///
/// This is the error-collecting core: it always returns a [`Program`],
/// marking unparseable regions with [`Statement::Error`] /
/// [`Expression::Error`](crate::ast::Expression::Error) nodes. Check the
/// returned diagnostics for errors; fail-fast callers should use
/// [`parse_script`] instead.
///
/// # Examples
///
/// ```
/// use usql_core::source_analysis::{lex_with_eof, parse};
///
/// let tokens = lex_with_eof("DROP TABLE IF EXISTS foo.bar");
/// let (program, diagnostics) = parse(tokens);
///
/// assert!(diagnostics.is_empty());
/// assert_eq!(program.statements.len(), 1);
/// ```
#[must_use]
pub fn parse(tokens: Vec<Token>) -> (Program, Vec<Diagnostic>) {
    let mut parser = Parser::new(tokens);
    let program = parser.parse_program();
    (program, parser.diagnostics)
}

/// Parses a script from source text.
///
/// The outward entry point: tokenizes, optionally prints the token stream,
/// and parses under the selected error mode. Under fail-fast (the
/// default), the first error aborts and no tree is returned; under
/// error-collecting, the tree and all diagnostics come back together.
///
/// # Errors
///
/// Under [`ErrorMode::FailFast`], returns the first [`ParseError`]
/// (positionally earliest) if the script has a lexical or syntactic
/// error. [`ErrorMode::Collect`] never errors.
///
/// # Examples
///
/// ```
/// use usql_core::source_analysis::{ParseOptions, parse_script};
///
/// let (program, _) = parse_script("USE mydb", &ParseOptions::default())
///     .expect("valid script");
/// assert_eq!(program.statements.len(), 1);
/// ```
pub fn parse_script(
    source: &str,
    options: &ParseOptions,
) -> Result<(Program, Vec<Diagnostic>), ParseError> {
    let tokens = lex_with_eof(source);

    if options.print_tokens {
        for token in &tokens {
            if !token.kind().is_eof() {
                debug!(
                    text = %token.text(),
                    kind = token.kind().symbolic_name(),
                    "token"
                );
            }
        }
    }

    let (program, diagnostics) = parse(tokens);

    if options.error_mode == ErrorMode::FailFast {
        // Positionally earliest error, matching what a bail-on-first-error
        // parse would have hit.
        if let Some(diagnostic) = diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .min_by_key(|d| d.span.start())
        {
            debug!(
                stage = %diagnostic.stage,
                message = %diagnostic.message,
                "parse failed"
            );
            return Err(diagnostic.to_parse_error(source));
        }
    }

    Ok((program, diagnostics))
}

/// Options for a single parse invocation.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// How errors are handled; fail-fast by default.
    pub error_mode: ErrorMode,
    /// Emit each token as a `tracing` debug event before parsing.
    pub print_tokens: bool,
}

/// How a parse invocation handles errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Abort on the first error; no partial tree is returned.
    #[default]
    FailFast,
    /// Record errors as diagnostics and error nodes; keep parsing.
    Collect,
}

// ============================================================================
// Diagnostics
// ============================================================================

/// A diagnostic produced during lexing or parsing.
///
/// Both error modes funnel through this type: fail-fast converts the first
/// error-severity diagnostic into a [`ParseError`] via
/// [`Diagnostic::to_parse_error`]; error-collecting returns the whole list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The stage that produced the diagnostic.
    pub stage: Stage,
    /// The severity of the diagnostic.
    pub severity: Severity,
    /// The error message.
    pub message: EcoString,
    /// The source location.
    pub span: Span,
    /// The offending token text, when one exists.
    pub offending: Option<EcoString>,
}

impl Diagnostic {
    /// Creates a parser-stage error diagnostic.
    #[must_use]
    pub fn error(message: impl Into<EcoString>, span: Span) -> Self {
        Self {
            stage: Stage::Parser,
            severity: Severity::Error,
            message: message.into(),
            span,
            offending: None,
        }
    }

    /// Creates a parser-stage warning diagnostic.
    #[must_use]
    pub fn warning(message: impl Into<EcoString>, span: Span) -> Self {
        Self {
            stage: Stage::Parser,
            severity: Severity::Warning,
            message: message.into(),
            span,
            offending: None,
        }
    }

    /// Creates a lexer-stage error diagnostic.
    #[must_use]
    pub fn lexer_error(message: impl Into<EcoString>, span: Span) -> Self {
        Self {
            stage: Stage::Lexer,
            severity: Severity::Error,
            message: message.into(),
            span,
            offending: None,
        }
    }

    /// Attaches the offending token text.
    #[must_use]
    pub fn with_offending(mut self, offending: impl Into<EcoString>) -> Self {
        self.offending = Some(offending.into());
        self
    }

    /// Converts this diagnostic into the outward [`ParseError`] form,
    /// deriving the 1-based line/column from the span and source text.
    #[must_use]
    pub fn to_parse_error(&self, source: &str) -> ParseError {
        let position = Position::of(source, self.span.start());
        let offending = self.offending.clone().unwrap_or_default();
        match self.stage {
            Stage::Lexer => ParseError::Lex {
                message: self.message.clone(),
                offending,
                position,
                span: self.span,
            },
            Stage::Parser => ParseError::Syntax {
                message: self.message.clone(),
                offending,
                position,
                span: self.span,
            },
        }
    }
}

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// An error; aborts a fail-fast parse.
    Error,
    /// A recoverable problem; never aborts.
    Warning,
}

/// Maximum nesting depth for expressions before the parser bails out.
///
/// Prevents stack overflow on deeply nested input (e.g., `(((((...)))))`).
/// 64 is generous enough for any realistic script while staying safe.
const MAX_NESTING_DEPTH: usize = 64;

// ============================================================================
// Parser State
// ============================================================================

/// The parser state.
pub(super) struct Parser {
    /// The tokens being parsed. Always ends with an EOF token.
    pub(super) tokens: Vec<Token>,
    /// Current token index.
    pub(super) current: usize,
    /// Accumulated diagnostics.
    pub(super) diagnostics: Vec<Diagnostic>,
    /// Current expression nesting depth (guards against stack overflow).
    nesting_depth: usize,
}

impl Parser {
    /// Creates a new parser for the given tokens.
    ///
    /// Lexer error tokens are pre-scanned into lexer-stage diagnostics so
    /// both error modes see them; the grammar then treats those tokens as
    /// unexpected without reporting the same position twice.
    fn new(tokens: Vec<Token>) -> Self {
        let mut tokens = tokens;
        if tokens.is_empty() {
            tokens.push(Token::new(TokenKind::Eof, Span::default(), 1, 1));
        }

        let diagnostics = tokens
            .iter()
            .filter_map(|token| {
                if let TokenKind::Error(text) = token.kind() {
                    let kind = LexErrorKind::classify(text);
                    Some(
                        Diagnostic::lexer_error(kind.to_string(), token.span())
                            .with_offending(text.clone()),
                    )
                } else {
                    None
                }
            })
            .collect();

        Self {
            tokens,
            current: 0,
            diagnostics,
            nesting_depth: 0,
        }
    }

    // ========================================================================
    // Token Management
    // ========================================================================

    /// Returns the current token.
    pub(super) fn current_token(&self) -> &Token {
        if self.current < self.tokens.len() {
            &self.tokens[self.current]
        } else {
            // Past the end of the stream; fall back to the EOF token.
            self.tokens
                .last()
                .expect("Parser has no tokens; expected at least an EOF token")
        }
    }

    /// Returns the current token kind.
    pub(super) fn current_kind(&self) -> &TokenKind {
        self.current_token().kind()
    }

    /// Peeks at the next token kind without consuming.
    pub(super) fn peek_kind(&self) -> Option<&TokenKind> {
        self.tokens.get(self.current + 1).map(Token::kind)
    }

    /// Checks if we're at the end of input.
    pub(super) fn is_at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    /// Advances to the next token and returns the previous one.
    pub(super) fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.tokens[self.current.saturating_sub(1)].clone()
    }

    /// Returns the span of the most recently consumed token.
    pub(super) fn previous_span(&self) -> Span {
        if self.current == 0 {
            self.current_token().span()
        } else {
            self.tokens[self.current - 1].span()
        }
    }

    /// Checks if the current token equals the given kind exactly.
    pub(super) fn check(&self, kind: &TokenKind) -> bool {
        self.current_kind() == kind
    }

    /// Consumes the current token if it equals the given kind.
    pub(super) fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expects the current token to equal the given kind, advancing if so.
    ///
    /// Reports an error and returns `None` otherwise.
    pub(super) fn expect(&mut self, kind: &TokenKind, message: &str) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            self.error(message);
            None
        }
    }

    /// Checks if the current token is the given keyword.
    pub(super) fn at_keyword(&self, keyword: Keyword) -> bool {
        matches!(self.current_kind(), TokenKind::Keyword(k) if *k == keyword)
    }

    /// Consumes the current token if it is the given keyword.
    pub(super) fn match_keyword(&mut self, keyword: Keyword) -> bool {
        if self.at_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expects the given keyword, advancing if present.
    ///
    /// Reports an error and returns `None` otherwise.
    pub(super) fn expect_keyword(&mut self, keyword: Keyword, message: &str) -> Option<Token> {
        if self.at_keyword(keyword) {
            Some(self.advance())
        } else {
            self.error(message);
            None
        }
    }

    // ========================================================================
    // Error Handling & Recovery
    // ========================================================================

    /// Reports an error at the current token.
    ///
    /// Positions holding lexer error tokens are skipped; the pre-scan in
    /// [`Parser::new`] already reported them.
    pub(super) fn error(&mut self, message: impl Into<EcoString>) {
        let token = self.current_token();
        if token.kind().is_error() {
            return;
        }
        let diagnostic =
            Diagnostic::error(message, token.span()).with_offending(token.text());
        self.diagnostics.push(diagnostic);
    }

    /// Increments the nesting depth, reporting an error and returning
    /// `Err` with an error expression if it exceeds [`MAX_NESTING_DEPTH`].
    /// Call [`leave_nesting`](Self::leave_nesting) on every exit path when
    /// this returns `Ok(())`.
    pub(super) fn enter_nesting(&mut self, span: Span) -> Result<(), crate::ast::Expression> {
        self.nesting_depth += 1;
        if self.nesting_depth > MAX_NESTING_DEPTH {
            self.diagnostics.push(Diagnostic::error(
                format!("expression nesting is too deep (maximum {MAX_NESTING_DEPTH} levels)"),
                span,
            ));
            self.nesting_depth -= 1;
            return Err(crate::ast::Expression::Error {
                message: "expression nesting too deep".into(),
                span,
            });
        }
        Ok(())
    }

    /// Decrements the nesting depth (pair with [`enter_nesting`](Self::enter_nesting)).
    pub(super) fn leave_nesting(&mut self) {
        debug_assert!(
            self.nesting_depth > 0,
            "leave_nesting called without matching enter_nesting"
        );
        self.nesting_depth = self.nesting_depth.saturating_sub(1);
    }

    /// Synchronizes the parser to a safe recovery point: a statement
    /// terminator (`;`) or the leading keyword of the next statement.
    pub(super) fn synchronize(&mut self) {
        while !self.is_at_end() {
            if matches!(self.current_kind(), TokenKind::Semicolon) {
                return;
            }
            if let TokenKind::Keyword(keyword) = self.current_kind() {
                if matches!(
                    keyword,
                    Keyword::Use
                        | Keyword::Create
                        | Keyword::Drop
                        | Keyword::Alter
                        | Keyword::Declare
                        | Keyword::Insert
                ) {
                    return;
                }
            }
            self.advance();
        }
    }

    // ========================================================================
    // Program Parsing
    // ========================================================================

    /// Parses the whole token stream into a program.
    fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            if self.match_token(&TokenKind::Semicolon) {
                continue;
            }
            statements.push(self.parse_statement());
        }

        let end = self.tokens.last().map_or(0, |t| t.span().end());
        Program::new(statements, Span::new(0, end))
    }

    /// Parses one statement, recovering to a statement boundary on failure.
    fn parse_statement(&mut self) -> Statement {
        let start_span = self.current_token().span();
        let start_index = self.current;

        let result = match self.current_kind() {
            TokenKind::Keyword(Keyword::Use) => self.parse_use_database(),
            TokenKind::Keyword(Keyword::Create) => self.parse_create(),
            TokenKind::Keyword(Keyword::Drop) => self.parse_drop_table(),
            TokenKind::Keyword(Keyword::Alter) => self.parse_alter_table(),
            TokenKind::Keyword(Keyword::Declare) => self.parse_declare_variable(),
            TokenKind::Keyword(Keyword::Insert) => self.parse_insert(),
            _ => {
                self.error("expected a statement");
                self.advance();
                None
            }
        };

        match result {
            Some(statement) => statement,
            None => {
                // Guarantee progress even if the failing rule consumed nothing.
                if self.current == start_index {
                    self.advance();
                }
                self.synchronize();
                Statement::Error {
                    message: "statement did not parse".into(),
                    span: start_span.merge(self.previous_span()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ast::{
        AlterTableOperation, BuiltinType, Expression, LiteralKind, PartitionOperation,
        SortDirection, Statement,
    };

    /// Parses source expecting no diagnostics, returning the program.
    fn parse_ok(source: &str) -> Program {
        let (program, diagnostics) = parse(lex_with_eof(source));
        assert!(
            diagnostics.is_empty(),
            "expected no diagnostics for {source:?}: {diagnostics:?}"
        );
        program
    }

    /// Parses source under fail-fast mode, expecting failure.
    fn parse_err(source: &str) -> ParseError {
        parse_script(source, &ParseOptions::default())
            .expect_err("expected a parse failure")
    }

    #[test]
    fn use_database_statement() {
        let program = parse_ok("USE mydb");
        assert_eq!(program.statements.len(), 1);
        let Statement::UseDatabase(stmt) = &program.statements[0] else {
            panic!("expected UseDatabase, got {:?}", program.statements[0]);
        };
        assert_eq!(stmt.name.name, "mydb");
    }

    #[test]
    fn create_schema_statement() {
        let program = parse_ok("CREATE SCHEMA reporting;");
        let Statement::CreateSchema(stmt) = &program.statements[0] else {
            panic!("expected CreateSchema");
        };
        assert_eq!(stmt.name.name, "reporting");
    }

    #[test]
    fn create_schema_quoted_identifier() {
        let program = parse_ok("CREATE SCHEMA [my schema]");
        let Statement::CreateSchema(stmt) = &program.statements[0] else {
            panic!("expected CreateSchema");
        };
        assert_eq!(stmt.name.name, "[my schema]");
        assert_eq!(stmt.name.unquoted(), "my schema");
    }

    #[test]
    fn create_database_statement() {
        let program = parse_ok("CREATE DATABASE warehouse");
        let Statement::CreateDatabase(stmt) = &program.statements[0] else {
            panic!("expected CreateDatabase");
        };
        assert_eq!(stmt.name.as_ref().expect("name").name, "warehouse");
        assert!(stmt.error.is_none());
    }

    #[test]
    fn create_database_recovers_from_missing_name() {
        // The recoverable rule: the statement node exists, carries the
        // failure, and the rest of the script still parses.
        let (program, diagnostics) = parse(lex_with_eof("CREATE DATABASE; USE mydb"));
        assert_eq!(program.statements.len(), 2);

        let Statement::CreateDatabase(stmt) = &program.statements[0] else {
            panic!("expected CreateDatabase, got {:?}", program.statements[0]);
        };
        assert!(stmt.name.is_none());
        let error = stmt.error.as_ref().expect("attached rule error");
        assert_eq!(error.message, "expected a database name");

        assert!(matches!(&program.statements[1], Statement::UseDatabase(_)));

        // Recoverable failures are warnings; they never abort fail-fast.
        assert!(diagnostics.iter().all(|d| d.severity == Severity::Warning));
        parse_script("CREATE DATABASE; USE mydb", &ParseOptions::default())
            .expect("recoverable failure must not abort fail-fast");
    }

    #[test]
    fn drop_table_statement() {
        let program = parse_ok("DROP TABLE IF EXISTS foo.bar");
        let Statement::DropTable(stmt) = &program.statements[0] else {
            panic!("expected DropTable");
        };
        assert!(stmt.if_exists);
        let parts: Vec<&str> = stmt.table.parts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(parts, vec!["foo", "bar"]);
    }

    #[test]
    fn drop_table_without_if_exists() {
        let program = parse_ok("DROP TABLE logs");
        let Statement::DropTable(stmt) = &program.statements[0] else {
            panic!("expected DropTable");
        };
        assert!(!stmt.if_exists);
        assert_eq!(stmt.table.text(), "logs");
    }

    #[test]
    fn create_table_with_schema_and_partition() {
        let program =
            parse_ok("CREATE TABLE t WITH SCHEMA (a INT, b STRING) PARTITIONED BY (a)");
        let Statement::CreateTableWithSchema(stmt) = &program.statements[0] else {
            panic!("expected CreateTableWithSchema");
        };
        assert_eq!(stmt.table.text(), "t");
        assert_eq!(stmt.columns.len(), 2);
        assert_eq!(stmt.columns[0].name.name, "a");
        assert_eq!(stmt.columns[0].ty, BuiltinType::Int);
        assert_eq!(stmt.columns[1].name.name, "b");
        assert_eq!(stmt.columns[1].ty, BuiltinType::String);
        assert!(stmt.index.is_none());

        let partition = stmt.partition.as_ref().expect("partition specification");
        let columns: Vec<&str> = partition.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(columns, vec!["a"]);
        assert!(partition.distribution.is_none());
    }

    #[test]
    fn create_table_with_index_and_distribution() {
        let source = "CREATE TABLE dw.facts WITH SCHEMA (id LONG, amount DECIMAL, at DATETIME) \
                      INDEX ix_facts ON (id ASC, at DESC) \
                      PARTITIONED BY (at) DISTRIBUTED BY HASH (id)";
        let program = parse_ok(source);
        let Statement::CreateTableWithSchema(stmt) = &program.statements[0] else {
            panic!("expected CreateTableWithSchema");
        };
        assert_eq!(stmt.table.text(), "dw.facts");
        assert_eq!(stmt.columns.len(), 3);

        let index = stmt.index.as_ref().expect("index clause");
        assert_eq!(index.name.name, "ix_facts");
        assert_eq!(index.sort_items.len(), 2);
        assert_eq!(index.sort_items[0].direction, Some(SortDirection::Ascending));
        assert_eq!(index.sort_items[1].direction, Some(SortDirection::Descending));

        let partition = stmt.partition.as_ref().expect("partition clause");
        let distribution = partition.distribution.as_ref().expect("distribution clause");
        let columns: Vec<&str> = distribution
            .columns
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(columns, vec!["id"]);
    }

    #[test]
    fn sort_item_direction_is_optional() {
        let program = parse_ok("CREATE TABLE t WITH SCHEMA (a INT) INDEX i ON (a)");
        let Statement::CreateTableWithSchema(stmt) = &program.statements[0] else {
            panic!("expected CreateTableWithSchema");
        };
        let index = stmt.index.as_ref().expect("index clause");
        assert_eq!(index.sort_items[0].direction, None);
    }

    #[test]
    fn distribution_requires_partition() {
        // DISTRIBUTED BY only nests inside a partition specification.
        let err = parse_err("CREATE TABLE t WITH SCHEMA (a INT) DISTRIBUTED BY HASH (a)");
        assert_eq!(err.stage(), Stage::Parser);
        assert_eq!(err.offending_text(), "DISTRIBUTED");
    }

    #[test]
    fn alter_table_add_columns() {
        let program = parse_ok("ALTER TABLE db.dbo.t ADD COLUMN c INT, d STRING");
        let Statement::AlterTable(stmt) = &program.statements[0] else {
            panic!("expected AlterTable");
        };
        assert_eq!(stmt.table.parts.len(), 3);
        let AlterTableOperation::AddColumns(columns) = &stmt.operation else {
            panic!("expected AddColumns");
        };
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[1].ty, BuiltinType::String);
    }

    #[test]
    fn alter_table_drop_columns_and_rebuild() {
        let program = parse_ok("ALTER TABLE t DROP COLUMN c, d; ALTER TABLE t REBUILD");
        assert_eq!(program.statements.len(), 2);
        let Statement::AlterTable(stmt) = &program.statements[0] else {
            panic!("expected AlterTable");
        };
        let AlterTableOperation::DropColumns(columns) = &stmt.operation else {
            panic!("expected DropColumns");
        };
        assert_eq!(columns.len(), 2);
        let Statement::AlterTable(stmt) = &program.statements[1] else {
            panic!("expected AlterTable");
        };
        assert_eq!(stmt.operation, AlterTableOperation::Rebuild);
    }

    #[test]
    fn alter_table_add_partition() {
        let program = parse_ok("ALTER TABLE t ADD PARTITION (1, 'us'), (2, 'eu')");
        let Statement::AlterTableAddDropPartition(stmt) = &program.statements[0] else {
            panic!("expected AlterTableAddDropPartition");
        };
        assert_eq!(stmt.operation, PartitionOperation::Add);
        assert_eq!(stmt.labels.len(), 2);
        assert_eq!(stmt.labels[0].expressions.len(), 2);
        assert_eq!(stmt.labels[0].expressions[1].text(), "'us'");
    }

    #[test]
    fn alter_table_drop_partition_with_static_arithmetic() {
        let program = parse_ok("ALTER TABLE t DROP PARTITION (1 + 2)");
        let Statement::AlterTableAddDropPartition(stmt) = &program.statements[0] else {
            panic!("expected AlterTableAddDropPartition");
        };
        assert_eq!(stmt.operation, PartitionOperation::Drop);
        assert!(stmt.labels[0].expressions[0].is_static());
    }

    #[test]
    fn partition_label_rejects_non_static_expressions() {
        let err = parse_err("ALTER TABLE t ADD PARTITION (region)");
        assert_eq!(err.stage(), Stage::Parser);
        assert_eq!(err.offending_text(), "region");
    }

    #[test]
    fn declare_variable_statement() {
        let program = parse_ok("DECLARE @rows INT = 10 * 2");
        let Statement::DeclareVariable(stmt) = &program.statements[0] else {
            panic!("expected DeclareVariable");
        };
        assert_eq!(stmt.variable.name, "@rows");
        assert_eq!(stmt.ty, BuiltinType::Int);
        let initializer = stmt.initializer.as_ref().expect("initializer");
        assert_eq!(initializer.text(), "10 * 2");
    }

    #[test]
    fn declare_without_initializer() {
        let program = parse_ok("DECLARE @when DATETIME");
        let Statement::DeclareVariable(stmt) = &program.statements[0] else {
            panic!("expected DeclareVariable");
        };
        assert!(stmt.initializer.is_none());
    }

    #[test]
    fn insert_statement_multi_row() {
        // Multi-row inserts parse fully; the first row backs the summary
        // accessor.
        let program = parse_ok("INSERT INTO t VALUES (1, 'x'), (2, 'y')");
        let Statement::Insert(stmt) = &program.statements[0] else {
            panic!("expected Insert");
        };
        assert_eq!(stmt.table.text(), "t");
        assert_eq!(stmt.rows.len(), 2);
        let first: Vec<EcoString> = stmt.first_row().iter().map(Expression::text).collect();
        assert_eq!(first, vec!["1", "'x'"]);
    }

    #[test]
    fn insert_preserves_literal_text_verbatim() {
        let program = parse_ok("INSERT INTO t VALUES (100.0m, 2.5E10, TRUE, NULL)");
        let Statement::Insert(stmt) = &program.statements[0] else {
            panic!("expected Insert");
        };
        let texts: Vec<EcoString> = stmt.first_row().iter().map(Expression::text).collect();
        assert_eq!(texts, vec!["100.0m", "2.5E10", "TRUE", "NULL"]);

        let Expression::Literal(lit) = &stmt.first_row()[3] else {
            panic!("expected literal");
        };
        assert_eq!(lit.kind, LiteralKind::Null);
    }

    #[test]
    fn member_access_in_value_expressions() {
        let program = parse_ok("INSERT INTO t VALUES (a.b.c)");
        let Statement::Insert(stmt) = &program.statements[0] else {
            panic!("expected Insert");
        };
        // a.b.c nests left as member access, not a multipart identifier.
        let Expression::MemberAccess { receiver, member, .. } = &stmt.first_row()[0] else {
            panic!("expected MemberAccess, got {:?}", stmt.first_row()[0]);
        };
        assert_eq!(member.name, "c");
        assert!(matches!(&**receiver, Expression::MemberAccess { .. }));
        assert_eq!(stmt.first_row()[0].text(), "a.b.c");
    }

    #[test]
    fn operator_precedence_shapes_the_tree() {
        let program = parse_ok("DECLARE @x BOOL = 1 + 2 * 3 == 7 AND NOT 2 < 1");
        let Statement::DeclareVariable(stmt) = &program.statements[0] else {
            panic!("expected DeclareVariable");
        };
        let Some(Expression::Binary { left, op, right, .. }) = stmt.initializer.as_ref() else {
            panic!("expected binary initializer");
        };
        // AND is the loosest operator, so it is the root.
        assert_eq!(op, "AND");
        // 1 + 2 * 3 == 7: multiplication binds before addition before ==.
        let Expression::Binary { left: sum, op: eq, .. } = &**left else {
            panic!("expected comparison on the left");
        };
        assert_eq!(eq, "==");
        assert_eq!(sum.text(), "1 + 2 * 3");
        let Expression::Binary { left: one, right: product, .. } = &**sum else {
            panic!("expected addition");
        };
        assert_eq!(one.text(), "1");
        assert_eq!(product.text(), "2 * 3");
        // NOT binds above AND and below comparison: NOT (2 < 1).
        let Expression::Unary { operand, .. } = &**right else {
            panic!("expected NOT on the right");
        };
        assert!(matches!(&**operand, Expression::Binary { .. }));
    }

    #[test]
    fn left_associativity() {
        let program = parse_ok("DECLARE @x INT = 1 - 2 - 3");
        let Statement::DeclareVariable(stmt) = &program.statements[0] else {
            panic!("expected DeclareVariable");
        };
        let Some(Expression::Binary { left, .. }) = stmt.initializer.as_ref() else {
            panic!("expected binary initializer");
        };
        assert_eq!(left.text(), "1 - 2");
    }

    #[test]
    fn statements_in_source_order() {
        let source = "USE a; CREATE SCHEMA s; DROP TABLE t; INSERT INTO t VALUES (1)";
        let program = parse_ok(source);
        assert_eq!(program.statements.len(), 4);
        assert!(matches!(&program.statements[0], Statement::UseDatabase(_)));
        assert!(matches!(&program.statements[1], Statement::CreateSchema(_)));
        assert!(matches!(&program.statements[2], Statement::DropTable(_)));
        assert!(matches!(&program.statements[3], Statement::Insert(_)));
    }

    #[test]
    fn reparse_yields_structurally_equal_trees() {
        let source = "USE a;\nCREATE TABLE t WITH SCHEMA (a INT, b STRING) PARTITIONED BY (a);\n\
                      INSERT INTO t VALUES (1, 'x'), (2, 'y')";
        let first = parse_ok(source);
        let second = parse_ok(source);
        assert_eq!(first, second);
    }

    #[test]
    fn stray_close_paren_fails_with_offending_token() {
        let err = parse_err("USE mydb\n)");
        assert_eq!(err.stage(), Stage::Parser);
        assert_eq!(err.offending_text(), ")");
        assert_eq!(err.position().line, 2);
        assert_eq!(err.position().column, 1);
    }

    #[test]
    fn fail_fast_reports_unknown_character_as_lex_error() {
        let err = parse_err("USE my?db");
        assert_eq!(err.stage(), Stage::Lexer);
        assert_eq!(err.offending_text(), "?");
        assert_eq!(err.position().line, 1);
        assert_eq!(err.position().column, 7);
        assert!(err.message().contains("unexpected character"));
    }

    #[test]
    fn fail_fast_reports_unterminated_string() {
        let err = parse_err("INSERT INTO t VALUES ('oops");
        assert_eq!(err.stage(), Stage::Lexer);
        assert!(err.message().contains("unterminated string"));
    }

    #[test]
    fn fail_fast_reports_positionally_first_error() {
        // The parser error at ')' on line 1 precedes the lexer error on
        // line 2; fail-fast must surface the earlier one.
        let err = parse_err(") USE my?db");
        assert_eq!(err.stage(), Stage::Parser);
        assert_eq!(err.offending_text(), ")");
    }

    #[test]
    fn collect_mode_parses_past_errors() {
        let source = "DROP TABLE; USE mydb";
        let options = ParseOptions {
            error_mode: ErrorMode::Collect,
            ..ParseOptions::default()
        };
        let (program, diagnostics) =
            parse_script(source, &options).expect("collect mode never fails");
        assert!(!diagnostics.is_empty());
        assert_eq!(program.statements.len(), 2);
        assert!(program.statements[0].is_error());
        assert!(matches!(&program.statements[1], Statement::UseDatabase(_)));
    }

    #[test]
    fn diagnostics_funnel_to_parse_error() {
        let source = "DROP TABLE ;";
        let (_, diagnostics) = parse(lex_with_eof(source));
        let diagnostic = diagnostics.first().expect("a diagnostic");
        let err = diagnostic.to_parse_error(source);
        assert_eq!(err.stage(), Stage::Parser);
        assert_eq!(err.offending_text(), ";");
        assert_eq!(err.position().line, 1);
        assert_eq!(err.position().column, 12);
    }

    #[test]
    fn child_spans_nest_within_parents() {
        let source = "CREATE TABLE t WITH SCHEMA (a INT) PARTITIONED BY (a)";
        let program = parse_ok(source);
        let statement = &program.statements[0];
        assert!(program.span.contains(statement.span()));
        let Statement::CreateTableWithSchema(stmt) = statement else {
            panic!("expected CreateTableWithSchema");
        };
        assert!(stmt.span.contains(stmt.table.span));
        for column in &stmt.columns {
            assert!(stmt.span.contains(column.span));
            assert!(column.span.contains(column.name.span));
        }
        let partition = stmt.partition.as_ref().expect("partition");
        assert!(stmt.span.contains(partition.span));
    }

    #[test]
    fn deep_nesting_is_bounded() {
        let mut source = String::from("DECLARE @x INT = ");
        for _ in 0..200 {
            source.push('(');
        }
        source.push('1');
        for _ in 0..200 {
            source.push(')');
        }
        // Must not overflow the stack; reports a depth error instead.
        let (_, diagnostics) = parse(lex_with_eof(&source));
        assert!(
            diagnostics
                .iter()
                .any(|d| d.message.contains("nesting is too deep")),
            "expected a nesting-depth diagnostic"
        );
    }

    #[test]
    fn semicolons_are_optional_separators() {
        let program = parse_ok("USE a\nUSE b;;\nUSE c");
        assert_eq!(program.statements.len(), 3);
    }

    #[test]
    fn empty_script_parses_to_empty_program() {
        let program = parse_ok("");
        assert!(program.statements.is_empty());
    }

    #[test]
    fn print_tokens_flag_does_not_change_the_result() {
        let options = ParseOptions {
            print_tokens: true,
            ..ParseOptions::default()
        };
        let (with_printing, _) = parse_script("USE mydb", &options).expect("valid");
        let (without, _) = parse_script("USE mydb", &ParseOptions::default()).expect("valid");
        assert_eq!(with_printing, without);
    }
}
