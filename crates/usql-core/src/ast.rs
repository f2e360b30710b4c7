// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Syntax tree definitions for USQL.
//!
//! The tree represents the structure of a script after parsing. Every node
//! carries a [`Span`] for error reporting and text extraction, child spans
//! are contiguous subranges of their parent's span, and child order
//! reflects source order. The tree is read-only once the parse completes.
//!
//! # Design Philosophy
//!
//! - **One variant per grammar rule** — [`Statement`] and [`Expression`] are
//!   tagged unions matched exhaustively by consumers (see
//!   [`ast_walker`](crate::ast_walker))
//! - **Error recovery** — the parser can produce [`Statement::Error`] and
//!   [`Expression::Error`] nodes in error-collecting mode, and a
//!   [`CreateDatabaseStatement`] can carry an attached [`RuleError`] instead
//!   of failing the parse
//! - **Verbatim literals** — [`Literal`] keeps the source text of numbers
//!   and strings, so `100.0m` survives untouched
//!
//! # Example
//!
//! ```ignore
//! // Source: USE mydb
//! Program {
//!     statements: vec![Statement::UseDatabase(UseDatabaseStatement {
//!         name: Identifier { name: "mydb".into(), span: ... },
//!         span: ...
//!     })],
//!     span: ...
//! }
//! ```

use ecow::EcoString;

use crate::source_analysis::{Keyword, RuleError, Span};

/// Top-level container for a parsed USQL script.
///
/// A program owns a sequence of top-level statements in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// The statements in this script.
    pub statements: Vec<Statement>,
    /// Source location spanning the entire script.
    pub span: Span,
}

impl Program {
    /// Creates a new program with the given statements and span.
    #[must_use]
    pub fn new(statements: Vec<Statement>, span: Span) -> Self {
        Self { statements, span }
    }
}

/// A top-level USQL statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `USE <database-name>`
    UseDatabase(UseDatabaseStatement),

    /// `CREATE SCHEMA <identifier>`
    CreateSchema(CreateSchemaStatement),

    /// `CREATE DATABASE <database-name>`
    CreateDatabase(CreateDatabaseStatement),

    /// `DROP TABLE [IF EXISTS] <multipart-identifier>`
    DropTable(DropTableStatement),

    /// `CREATE TABLE <table-name> WITH SCHEMA (...) [INDEX ...] [PARTITIONED BY ...]`
    CreateTableWithSchema(CreateTableWithSchemaStatement),

    /// `ALTER TABLE <multipart-identifier> ADD COLUMN ... | DROP COLUMN ... | REBUILD`
    AlterTable(AlterTableStatement),

    /// `ALTER TABLE <multipart-identifier> ADD|DROP PARTITION (...), ...`
    AlterTableAddDropPartition(AlterTableAddDropPartitionStatement),

    /// `DECLARE <variable> <type> [= <expression>]`
    DeclareVariable(DeclareVariableStatement),

    /// `INSERT INTO <multipart-identifier> VALUES (...), ...`
    Insert(InsertStatement),

    /// An error node for an unparseable statement.
    ///
    /// Only produced in error-collecting mode; fail-fast parses never
    /// return a tree containing one.
    Error {
        /// A description of what went wrong.
        message: EcoString,
        /// Source location of the erroneous code.
        span: Span,
    },
}

impl Statement {
    /// Returns the span of this statement.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::UseDatabase(s) => s.span,
            Self::CreateSchema(s) => s.span,
            Self::CreateDatabase(s) => s.span,
            Self::DropTable(s) => s.span,
            Self::CreateTableWithSchema(s) => s.span,
            Self::AlterTable(s) => s.span,
            Self::AlterTableAddDropPartition(s) => s.span,
            Self::DeclareVariable(s) => s.span,
            Self::Insert(s) => s.span,
            Self::Error { span, .. } => *span,
        }
    }

    /// Returns true if this statement is an error node.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// `USE <database-name>` — changes the database context.
#[derive(Debug, Clone, PartialEq)]
pub struct UseDatabaseStatement {
    /// The database to switch to.
    pub name: Identifier,
    /// Source location of the entire statement.
    pub span: Span,
}

/// `CREATE SCHEMA <identifier>`
#[derive(Debug, Clone, PartialEq)]
pub struct CreateSchemaStatement {
    /// The schema name.
    pub name: Identifier,
    /// Source location of the entire statement.
    pub span: Span,
}

/// `CREATE DATABASE <database-name>`
///
/// Database-name parsing is a recoverable rule: when it fails, the
/// statement node still exists with `name: None` and the failure attached
/// as a [`RuleError`], and the rest of the script continues to parse.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateDatabaseStatement {
    /// The database name, if it parsed.
    pub name: Option<Identifier>,
    /// The attached failure when the database name did not parse.
    pub error: Option<RuleError>,
    /// Source location of the entire statement.
    pub span: Span,
}

/// `DROP TABLE [IF EXISTS] <multipart-identifier>`
#[derive(Debug, Clone, PartialEq)]
pub struct DropTableStatement {
    /// Whether the `IF EXISTS` clause was present.
    pub if_exists: bool,
    /// The table to drop.
    pub table: MultipartIdentifier,
    /// Source location of the entire statement.
    pub span: Span,
}

/// `CREATE TABLE <table-name> WITH SCHEMA (<column-definition>, ...)`
/// with optional index and partition clauses.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableWithSchemaStatement {
    /// The table being created.
    pub table: MultipartIdentifier,
    /// The column definitions, in source order.
    pub columns: Vec<ColumnDefinition>,
    /// Optional `INDEX <identifier> ON (<sort-item>, ...)` clause.
    pub index: Option<TableIndex>,
    /// Optional `PARTITIONED BY (...)` clause.
    pub partition: Option<PartitionSpecification>,
    /// Source location of the entire statement.
    pub span: Span,
}

/// A single `identifier builtin-type` column definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    /// The column name.
    pub name: Identifier,
    /// The column's built-in type.
    pub ty: BuiltinType,
    /// Source location of the definition.
    pub span: Span,
}

/// `INDEX <identifier> ON (<sort-item>, ...)`
#[derive(Debug, Clone, PartialEq)]
pub struct TableIndex {
    /// The index name.
    pub name: Identifier,
    /// The sorted columns, in source order.
    pub sort_items: Vec<SortItem>,
    /// Source location of the clause.
    pub span: Span,
}

/// `identifier [ASC|DESC]` — direction is optional; absence implies the
/// engine default.
#[derive(Debug, Clone, PartialEq)]
pub struct SortItem {
    /// The column being sorted.
    pub column: Identifier,
    /// The explicit sort direction, if any.
    pub direction: Option<SortDirection>,
    /// Source location of the item.
    pub span: Span,
}

/// An explicit sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    /// `ASC`
    Ascending,
    /// `DESC`
    Descending,
}

impl SortDirection {
    /// Returns the keyword as it appears in source.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// `PARTITIONED BY (<identifier>, ...)` with an optional nested
/// distribution clause.
///
/// The distribution specification is only meaningful inside a partition
/// specification, which the structure enforces.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionSpecification {
    /// The partition columns, in source order.
    pub columns: Vec<Identifier>,
    /// Optional nested `DISTRIBUTED BY ...` clause.
    pub distribution: Option<DistributionSpecification>,
    /// Source location of the clause.
    pub span: Span,
}

/// `DISTRIBUTED BY [HASH] (<identifier>, ...)`
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionSpecification {
    /// How rows are spread across partitions.
    pub scheme: DistributionScheme,
    /// The distribution columns, in source order.
    pub columns: Vec<Identifier>,
    /// Source location of the clause.
    pub span: Span,
}

/// The distribution scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistributionScheme {
    /// Rows are spread by hashing the distribution columns.
    Hash,
}

/// `ALTER TABLE <multipart-identifier> <operation>`
#[derive(Debug, Clone, PartialEq)]
pub struct AlterTableStatement {
    /// The table being altered.
    pub table: MultipartIdentifier,
    /// The alteration to apply.
    pub operation: AlterTableOperation,
    /// Source location of the entire statement.
    pub span: Span,
}

/// The general-form `ALTER TABLE` operations.
#[derive(Debug, Clone, PartialEq)]
pub enum AlterTableOperation {
    /// `ADD COLUMN <column-definition>, ...`
    AddColumns(Vec<ColumnDefinition>),
    /// `DROP COLUMN <identifier>, ...`
    DropColumns(Vec<Identifier>),
    /// `REBUILD`
    Rebuild,
}

/// `ALTER TABLE <multipart-identifier> ADD|DROP PARTITION <label>, ...`
#[derive(Debug, Clone, PartialEq)]
pub struct AlterTableAddDropPartitionStatement {
    /// The table whose partitions change.
    pub table: MultipartIdentifier,
    /// Whether partitions are added or dropped.
    pub operation: PartitionOperation,
    /// The partition labels, in source order.
    pub labels: Vec<PartitionLabel>,
    /// Source location of the entire statement.
    pub span: Span,
}

/// Whether a partition statement adds or drops partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartitionOperation {
    /// `ADD PARTITION`
    Add,
    /// `DROP PARTITION`
    Drop,
}

impl PartitionOperation {
    /// Returns the keyword as it appears in source.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Drop => "DROP",
        }
    }
}

/// A parenthesized list of static expressions naming one partition.
///
/// The parser rejects expressions that are not constant-foldable (see
/// [`Expression::is_static`]).
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionLabel {
    /// The static expressions, in source order.
    pub expressions: Vec<Expression>,
    /// Source location including the parentheses.
    pub span: Span,
}

/// `DECLARE <variable> <type> [= <expression>]`
#[derive(Debug, Clone, PartialEq)]
pub struct DeclareVariableStatement {
    /// The variable being declared.
    pub variable: Variable,
    /// The declared type.
    pub ty: BuiltinType,
    /// Optional initializer expression.
    pub initializer: Option<Expression>,
    /// Source location of the entire statement.
    pub span: Span,
}

/// `INSERT INTO <multipart-identifier> VALUES (<expr>, ...), ...`
///
/// Multi-row inserts parse fully; summary consumers (see
/// [`ast_walker`](crate::ast_walker)) are only guaranteed access to the
/// first row via [`InsertStatement::first_row`].
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    /// The target table.
    pub table: MultipartIdentifier,
    /// The value rows, each a list of expressions in source order.
    pub rows: Vec<Vec<Expression>>,
    /// Source location of the entire statement.
    pub span: Span,
}

impl InsertStatement {
    /// Returns the first row's expression list.
    ///
    /// Empty only for a degenerate tree built by hand; the grammar
    /// requires at least one row.
    #[must_use]
    pub fn first_row(&self) -> &[Expression] {
        self.rows.first().map_or(&[], Vec::as_slice)
    }
}

/// A built-in column/variable type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    Int,
    Long,
    Float,
    Double,
    Decimal,
    String,
    Bool,
    DateTime,
    Byte,
}

impl BuiltinType {
    /// Maps a type keyword to its built-in type.
    #[must_use]
    pub const fn from_keyword(keyword: Keyword) -> Option<Self> {
        match keyword {
            Keyword::Int => Some(Self::Int),
            Keyword::Long => Some(Self::Long),
            Keyword::Float => Some(Self::Float),
            Keyword::Double => Some(Self::Double),
            Keyword::Decimal => Some(Self::Decimal),
            Keyword::String => Some(Self::String),
            Keyword::Bool => Some(Self::Bool),
            Keyword::DateTime => Some(Self::DateTime),
            Keyword::Byte => Some(Self::Byte),
            _ => None,
        }
    }

    /// Returns the type name as it appears in source.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Int => "INT",
            Self::Long => "LONG",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::Decimal => "DECIMAL",
            Self::String => "STRING",
            Self::Bool => "BOOL",
            Self::DateTime => "DATETIME",
            Self::Byte => "BYTE",
        }
    }
}

impl std::fmt::Display for BuiltinType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A quoted or unquoted identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    /// The name as written, delimiters preserved for quoted identifiers
    /// (`[my table]` keeps its brackets).
    pub name: EcoString,
    /// Source location of the identifier.
    pub span: Span,
}

impl Identifier {
    /// Creates a new identifier.
    #[must_use]
    pub fn new(name: impl Into<EcoString>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }

    /// Returns the name without quoting delimiters.
    #[must_use]
    pub fn unquoted(&self) -> &str {
        self.name
            .as_str()
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .unwrap_or(&self.name)
    }
}

/// A dotted name referring to nested namespaces/objects: `schema.table`.
///
/// Multipart identifiers are recognized contextually in name positions as
/// a dedicated rule, distinct from the member-access expression rule used
/// inside value expressions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MultipartIdentifier {
    /// The name parts, outermost first. Never empty.
    pub parts: Vec<Identifier>,
    /// Source location spanning all parts.
    pub span: Span,
}

impl MultipartIdentifier {
    /// Creates a new multipart identifier.
    #[must_use]
    pub fn new(parts: Vec<Identifier>, span: Span) -> Self {
        Self { parts, span }
    }

    /// Returns the dotted textual form, as written.
    #[must_use]
    pub fn text(&self) -> EcoString {
        let mut out = EcoString::new();
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push_str(&part.name);
        }
        out
    }
}

/// A `@variable` reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable {
    /// The name as written, including the `@`.
    pub name: EcoString,
    /// Source location of the variable.
    pub span: Span,
}

impl Variable {
    /// Creates a new variable reference.
    #[must_use]
    pub fn new(name: impl Into<EcoString>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// A USQL value expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A literal value, textual form preserved verbatim.
    Literal(Literal),

    /// A bare identifier.
    Identifier(Identifier),

    /// A `@variable` reference.
    Variable(Variable),

    /// Member access: `a.b`. Chains nest left: `a.b.c` is `(a.b).c`.
    MemberAccess {
        /// The expression whose member is accessed.
        receiver: Box<Expression>,
        /// The member name.
        member: Identifier,
        /// Source location of the entire access.
        span: Span,
    },

    /// A prefix operator application.
    Unary {
        /// The operator.
        op: UnaryOperator,
        /// The operand.
        operand: Box<Expression>,
        /// Source location including the operator.
        span: Span,
    },

    /// A binary operator application.
    Binary {
        /// The left operand.
        left: Box<Expression>,
        /// The operator text (`+`, `<=`, `AND`, ...).
        op: EcoString,
        /// The right operand.
        right: Box<Expression>,
        /// Source location of the entire application.
        span: Span,
    },

    /// A parenthesized sub-expression.
    Parenthesized {
        /// The inner expression.
        expression: Box<Expression>,
        /// Source location including parentheses.
        span: Span,
    },

    /// An error node for unparseable code (error-collecting mode only).
    Error {
        /// A description of what went wrong.
        message: EcoString,
        /// Source location of the erroneous code.
        span: Span,
    },
}

impl Expression {
    /// Returns the span of this expression.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::MemberAccess { span, .. }
            | Self::Unary { span, .. }
            | Self::Binary { span, .. }
            | Self::Parenthesized { span, .. }
            | Self::Error { span, .. } => *span,
            Self::Literal(lit) => lit.span,
            Self::Identifier(id) => id.span,
            Self::Variable(var) => var.span,
        }
    }

    /// Returns true if this expression is an error node.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Returns true if this expression is constant-foldable.
    ///
    /// Partition labels only admit static expressions: literals and
    /// operator applications over them. Identifiers, variables, and
    /// member accesses depend on runtime context and are not static.
    #[must_use]
    pub fn is_static(&self) -> bool {
        match self {
            Self::Literal(_) => true,
            Self::Parenthesized { expression, .. } => expression.is_static(),
            Self::Unary { operand, .. } => operand.is_static(),
            Self::Binary { left, right, .. } => left.is_static() && right.is_static(),
            Self::Identifier(_) | Self::Variable(_) | Self::MemberAccess { .. } | Self::Error { .. } => {
                false
            }
        }
    }

    /// Reconstructs the textual form of this expression.
    ///
    /// Literal text is verbatim; composite forms are rebuilt with single
    /// spaces around binary operators.
    #[must_use]
    pub fn text(&self) -> EcoString {
        match self {
            Self::Literal(lit) => lit.text.clone(),
            Self::Identifier(id) => id.name.clone(),
            Self::Variable(var) => var.name.clone(),
            Self::MemberAccess {
                receiver, member, ..
            } => {
                let mut out = receiver.text();
                out.push('.');
                out.push_str(&member.name);
                out
            }
            Self::Unary { op, operand, .. } => {
                let mut out = EcoString::from(op.as_str());
                if matches!(op, UnaryOperator::Not) {
                    out.push(' ');
                }
                out.push_str(&operand.text());
                out
            }
            Self::Binary {
                left, op, right, ..
            } => {
                let mut out = left.text();
                out.push(' ');
                out.push_str(op);
                out.push(' ');
                out.push_str(&right.text());
                out
            }
            Self::Parenthesized { expression, .. } => {
                let mut out = EcoString::from("(");
                out.push_str(&expression.text());
                out.push(')');
                out
            }
            Self::Error { .. } => EcoString::from("<error>"),
        }
    }
}

/// A literal value with its verbatim source text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal {
    /// What kind of literal this is.
    pub kind: LiteralKind,
    /// The source text, verbatim: `42`, `'silo'`, `TRUE`.
    pub text: EcoString,
    /// Source location of the literal.
    pub span: Span,
}

impl Literal {
    /// Creates a new literal.
    #[must_use]
    pub fn new(kind: LiteralKind, text: impl Into<EcoString>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }
}

/// The kind of a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    /// A numeric literal. Not converted; the text is authoritative.
    Number,
    /// A string literal, quotes included in the text.
    String,
    /// `TRUE` or `FALSE`.
    Boolean,
    /// `NULL`.
    Null,
}

/// A prefix operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    /// Logical `NOT`.
    Not,
    /// Arithmetic negation `-`.
    Negate,
    /// Arithmetic identity `+`.
    Plus,
}

impl UnaryOperator {
    /// Returns the operator as it appears in source.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Not => "NOT",
            Self::Negate => "-",
            Self::Plus => "+",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        Span::new(0, 1)
    }

    #[test]
    fn identifier_unquoted() {
        assert_eq!(Identifier::new("mydb", span()).unquoted(), "mydb");
        assert_eq!(Identifier::new("[my db]", span()).unquoted(), "my db");
    }

    #[test]
    fn multipart_identifier_text() {
        let mpi = MultipartIdentifier::new(
            vec![
                Identifier::new("foo", Span::new(0, 3)),
                Identifier::new("bar", Span::new(4, 7)),
            ],
            Span::new(0, 7),
        );
        assert_eq!(mpi.text(), "foo.bar");
    }

    #[test]
    fn builtin_type_from_keyword() {
        assert_eq!(BuiltinType::from_keyword(Keyword::Int), Some(BuiltinType::Int));
        assert_eq!(
            BuiltinType::from_keyword(Keyword::DateTime),
            Some(BuiltinType::DateTime)
        );
        assert_eq!(BuiltinType::from_keyword(Keyword::Table), None);
    }

    #[test]
    fn static_expressions() {
        let lit = |text: &str| {
            Expression::Literal(Literal::new(LiteralKind::Number, text, span()))
        };

        assert!(lit("1").is_static());
        assert!(Expression::Binary {
            left: Box::new(lit("1")),
            op: "+".into(),
            right: Box::new(lit("2")),
            span: span(),
        }
        .is_static());
        assert!(!Expression::Identifier(Identifier::new("a", span())).is_static());
        assert!(!Expression::Binary {
            left: Box::new(lit("1")),
            op: "+".into(),
            right: Box::new(Expression::Variable(Variable::new("@x", span()))),
            span: span(),
        }
        .is_static());
    }

    #[test]
    fn expression_text_reconstruction() {
        let expr = Expression::Binary {
            left: Box::new(Expression::Literal(Literal::new(
                LiteralKind::Number,
                "1",
                span(),
            ))),
            op: "+".into(),
            right: Box::new(Expression::Parenthesized {
                expression: Box::new(Expression::MemberAccess {
                    receiver: Box::new(Expression::Identifier(Identifier::new("a", span()))),
                    member: Identifier::new("b", span()),
                    span: span(),
                }),
                span: span(),
            }),
            span: span(),
        };
        assert_eq!(expr.text(), "1 + (a.b)");
    }

    #[test]
    fn insert_first_row() {
        let stmt = InsertStatement {
            table: MultipartIdentifier::new(vec![Identifier::new("t", span())], span()),
            rows: vec![
                vec![Expression::Literal(Literal::new(
                    LiteralKind::Number,
                    "1",
                    span(),
                ))],
                vec![Expression::Literal(Literal::new(
                    LiteralKind::Number,
                    "2",
                    span(),
                ))],
            ],
            span: span(),
        };
        assert_eq!(stmt.first_row().len(), 1);
        assert_eq!(stmt.first_row()[0].text(), "1");
    }
}
