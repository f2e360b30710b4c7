// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Statement parsing for USQL.
//!
//! This module contains the statement-level grammar rules extracted from
//! the main `Parser` implementation:
//!
//! - `USE <database-name>`
//! - `CREATE SCHEMA | DATABASE | TABLE ... WITH SCHEMA`
//! - `DROP TABLE [IF EXISTS]`
//! - `ALTER TABLE` (column operations, `REBUILD`, and `ADD|DROP PARTITION`)
//! - `DECLARE <variable> <type> [= <expression>]`
//! - `INSERT INTO ... VALUES`
//!
//! Every method consumes its leading keyword before it can fail, so the
//! recovery loop in `parse_statement` always makes progress.

use crate::ast::{
    AlterTableAddDropPartitionStatement, AlterTableOperation, AlterTableStatement, BuiltinType,
    ColumnDefinition, CreateDatabaseStatement, CreateSchemaStatement,
    CreateTableWithSchemaStatement, DeclareVariableStatement, DistributionScheme,
    DistributionSpecification, DropTableStatement, Expression, Identifier, InsertStatement,
    MultipartIdentifier, PartitionLabel, PartitionOperation, PartitionSpecification, SortDirection,
    SortItem, Statement, TableIndex, UseDatabaseStatement, Variable,
};
use crate::source_analysis::{Keyword, RuleError, TokenKind};

use super::{Diagnostic, Parser};

impl Parser {
    // ========================================================================
    // Names
    // ========================================================================

    /// Parses a quoted or unquoted identifier.
    pub(super) fn parse_identifier(&mut self, message: &str) -> Option<Identifier> {
        if self.current_kind().is_identifier() {
            let token = self.advance();
            Some(Identifier::new(token.text(), token.span()))
        } else {
            self.error(message);
            None
        }
    }

    /// Parses a dotted multipart identifier: `a`, `a.b`, `a.b.c`, ...
    ///
    /// Multipart identifiers are a dedicated rule used in name positions;
    /// inside value expressions a dotted chain is member access instead.
    pub(super) fn parse_multipart_identifier(
        &mut self,
        message: &str,
    ) -> Option<MultipartIdentifier> {
        let first = self.parse_identifier(message)?;
        let start = first.span;
        let mut parts = vec![first];

        while self.match_token(&TokenKind::Dot) {
            parts.push(self.parse_identifier("expected an identifier after '.'")?);
        }

        let span = start.merge(self.previous_span());
        Some(MultipartIdentifier::new(parts, span))
    }

    /// Parses a built-in type keyword.
    fn parse_builtin_type(&mut self, message: &str) -> Option<BuiltinType> {
        if let TokenKind::Keyword(keyword) = self.current_kind() {
            if let Some(ty) = BuiltinType::from_keyword(*keyword) {
                self.advance();
                return Some(ty);
            }
        }
        self.error(message);
        None
    }

    // ========================================================================
    // USE / CREATE / DROP
    // ========================================================================

    /// `USE <database-name>`
    pub(super) fn parse_use_database(&mut self) -> Option<Statement> {
        let use_token = self.advance();
        let name = self.parse_identifier("expected a database name after USE")?;
        let span = use_token.span().merge(name.span);
        Some(Statement::UseDatabase(UseDatabaseStatement { name, span }))
    }

    /// Dispatches `CREATE SCHEMA | DATABASE | TABLE`.
    pub(super) fn parse_create(&mut self) -> Option<Statement> {
        match self.peek_kind() {
            Some(TokenKind::Keyword(Keyword::Schema)) => self.parse_create_schema(),
            Some(TokenKind::Keyword(Keyword::Database)) => self.parse_create_database(),
            Some(TokenKind::Keyword(Keyword::Table)) => self.parse_create_table(),
            _ => {
                self.advance(); // CREATE
                self.error("expected SCHEMA, DATABASE, or TABLE after CREATE");
                None
            }
        }
    }

    /// `CREATE SCHEMA <identifier>`
    fn parse_create_schema(&mut self) -> Option<Statement> {
        let create_token = self.advance(); // CREATE
        self.advance(); // SCHEMA
        let name = self.parse_identifier("expected a schema name after CREATE SCHEMA")?;
        let span = create_token.span().merge(name.span);
        Some(Statement::CreateSchema(CreateSchemaStatement { name, span }))
    }

    /// `CREATE DATABASE <database-name>`
    ///
    /// The database name is a recoverable rule: when it fails to parse,
    /// the statement node is still produced with the failure attached as a
    /// [`RuleError`] and a warning diagnostic, and the parse continues.
    fn parse_create_database(&mut self) -> Option<Statement> {
        let create_token = self.advance(); // CREATE
        let database_token = self.advance(); // DATABASE

        let (name, error) = if self.current_kind().is_identifier() {
            let token = self.advance();
            (Some(Identifier::new(token.text(), token.span())), None)
        } else {
            let offending = self.current_token().clone();
            self.diagnostics.push(
                Diagnostic::warning(
                    "CREATE DATABASE is missing a database name",
                    offending.span(),
                )
                .with_offending(offending.text()),
            );
            (
                None,
                Some(RuleError::new("expected a database name", offending.span())),
            )
        };

        let end = name
            .as_ref()
            .map_or(database_token.span(), |n| n.span);
        let span = create_token.span().merge(end);
        Some(Statement::CreateDatabase(CreateDatabaseStatement {
            name,
            error,
            span,
        }))
    }

    /// `DROP TABLE [IF EXISTS] <multipart-identifier>`
    pub(super) fn parse_drop_table(&mut self) -> Option<Statement> {
        let drop_token = self.advance(); // DROP
        self.expect_keyword(Keyword::Table, "expected TABLE after DROP")?;

        let if_exists = if self.match_keyword(Keyword::If) {
            self.expect_keyword(Keyword::Exists, "expected EXISTS after IF")?;
            true
        } else {
            false
        };

        let table = self.parse_multipart_identifier("expected a table name after DROP TABLE")?;
        let span = drop_token.span().merge(table.span);
        Some(Statement::DropTable(DropTableStatement {
            if_exists,
            table,
            span,
        }))
    }

    // ========================================================================
    // CREATE TABLE ... WITH SCHEMA
    // ========================================================================

    /// `CREATE TABLE <table-name> WITH SCHEMA (<column-definition>, ...)`
    /// with optional `INDEX` and `PARTITIONED BY` clauses.
    fn parse_create_table(&mut self) -> Option<Statement> {
        let create_token = self.advance(); // CREATE
        self.advance(); // TABLE

        let table = self.parse_multipart_identifier("expected a table name after CREATE TABLE")?;
        self.expect_keyword(Keyword::With, "expected WITH SCHEMA after the table name")?;
        self.expect_keyword(Keyword::Schema, "expected SCHEMA after WITH")?;
        self.expect(
            &TokenKind::LeftParen,
            "expected '(' to open the column list",
        )?;

        let mut columns = vec![self.parse_column_definition()?];
        while self.match_token(&TokenKind::Comma) {
            columns.push(self.parse_column_definition()?);
        }
        self.expect(
            &TokenKind::RightParen,
            "expected ')' to close the column list",
        )?;

        let index = if self.at_keyword(Keyword::Index) {
            Some(self.parse_table_index()?)
        } else {
            None
        };

        let partition = if self.at_keyword(Keyword::Partitioned) {
            Some(self.parse_partition_specification()?)
        } else {
            None
        };

        let span = create_token.span().merge(self.previous_span());
        Some(Statement::CreateTableWithSchema(
            CreateTableWithSchemaStatement {
                table,
                columns,
                index,
                partition,
                span,
            },
        ))
    }

    /// `identifier builtin-type`
    fn parse_column_definition(&mut self) -> Option<ColumnDefinition> {
        let name = self.parse_identifier("expected a column name")?;
        let ty = self.parse_builtin_type("expected a built-in type after the column name")?;
        let span = name.span.merge(self.previous_span());
        Some(ColumnDefinition { name, ty, span })
    }

    /// `INDEX <identifier> ON (<sort-item>, ...)`
    fn parse_table_index(&mut self) -> Option<TableIndex> {
        let index_token = self.advance(); // INDEX
        let name = self.parse_identifier("expected an index name after INDEX")?;
        self.expect_keyword(Keyword::On, "expected ON after the index name")?;
        self.expect(&TokenKind::LeftParen, "expected '(' to open the sort list")?;

        let mut sort_items = vec![self.parse_sort_item()?];
        while self.match_token(&TokenKind::Comma) {
            sort_items.push(self.parse_sort_item()?);
        }
        self.expect(
            &TokenKind::RightParen,
            "expected ')' to close the sort list",
        )?;

        let span = index_token.span().merge(self.previous_span());
        Some(TableIndex {
            name,
            sort_items,
            span,
        })
    }

    /// `identifier [ASC|DESC]`
    fn parse_sort_item(&mut self) -> Option<SortItem> {
        let column = self.parse_identifier("expected a column name in the sort list")?;
        let direction = if self.match_keyword(Keyword::Asc) {
            Some(SortDirection::Ascending)
        } else if self.match_keyword(Keyword::Desc) {
            Some(SortDirection::Descending)
        } else {
            None
        };
        let span = column.span.merge(self.previous_span());
        Some(SortItem {
            column,
            direction,
            span,
        })
    }

    /// `PARTITIONED BY (<identifier>, ...) [DISTRIBUTED BY ...]`
    fn parse_partition_specification(&mut self) -> Option<PartitionSpecification> {
        let partitioned_token = self.advance(); // PARTITIONED
        self.expect_keyword(Keyword::By, "expected BY after PARTITIONED")?;
        let columns =
            self.parse_identifier_list("expected a column name in the partition list")?;

        let distribution = if self.at_keyword(Keyword::Distributed) {
            Some(self.parse_distribution_specification()?)
        } else {
            None
        };

        let span = partitioned_token.span().merge(self.previous_span());
        Some(PartitionSpecification {
            columns,
            distribution,
            span,
        })
    }

    /// `DISTRIBUTED BY [HASH] (<identifier>, ...)`
    ///
    /// The scheme keyword is optional; hashing is the only scheme, so its
    /// absence still means [`DistributionScheme::Hash`].
    fn parse_distribution_specification(&mut self) -> Option<DistributionSpecification> {
        let distributed_token = self.advance(); // DISTRIBUTED
        self.expect_keyword(Keyword::By, "expected BY after DISTRIBUTED")?;
        self.match_keyword(Keyword::Hash);
        let scheme = DistributionScheme::Hash;
        let columns =
            self.parse_identifier_list("expected a column name in the distribution list")?;

        let span = distributed_token.span().merge(self.previous_span());
        Some(DistributionSpecification {
            scheme,
            columns,
            span,
        })
    }

    /// `(<identifier>, ...)`
    fn parse_identifier_list(&mut self, message: &str) -> Option<Vec<Identifier>> {
        self.expect(
            &TokenKind::LeftParen,
            "expected '(' to open the column list",
        )?;
        let mut identifiers = vec![self.parse_identifier(message)?];
        while self.match_token(&TokenKind::Comma) {
            identifiers.push(self.parse_identifier(message)?);
        }
        self.expect(
            &TokenKind::RightParen,
            "expected ')' to close the column list",
        )?;
        Some(identifiers)
    }

    // ========================================================================
    // ALTER TABLE
    // ========================================================================

    /// `ALTER TABLE <multipart-identifier> ...`
    ///
    /// Dispatches between the general form (column operations, `REBUILD`)
    /// and the specialized `ADD|DROP PARTITION` statement.
    pub(super) fn parse_alter_table(&mut self) -> Option<Statement> {
        let alter_token = self.advance(); // ALTER
        self.expect_keyword(Keyword::Table, "expected TABLE after ALTER")?;
        let table = self.parse_multipart_identifier("expected a table name after ALTER TABLE")?;

        let at_partition_op = matches!(
            self.current_kind(),
            TokenKind::Keyword(Keyword::Add | Keyword::Drop)
        ) && matches!(
            self.peek_kind(),
            Some(TokenKind::Keyword(Keyword::Partition))
        );

        if at_partition_op {
            let operation = if self.match_keyword(Keyword::Add) {
                PartitionOperation::Add
            } else {
                self.advance(); // DROP
                PartitionOperation::Drop
            };
            self.advance(); // PARTITION

            let mut labels = vec![self.parse_partition_label()?];
            while self.match_token(&TokenKind::Comma) {
                labels.push(self.parse_partition_label()?);
            }

            let span = alter_token.span().merge(self.previous_span());
            return Some(Statement::AlterTableAddDropPartition(
                AlterTableAddDropPartitionStatement {
                    table,
                    operation,
                    labels,
                    span,
                },
            ));
        }

        let operation = if self.match_keyword(Keyword::Add) {
            self.expect_keyword(Keyword::Column, "expected COLUMN or PARTITION after ADD")?;
            let mut columns = vec![self.parse_column_definition()?];
            while self.match_token(&TokenKind::Comma) {
                columns.push(self.parse_column_definition()?);
            }
            AlterTableOperation::AddColumns(columns)
        } else if self.match_keyword(Keyword::Drop) {
            self.expect_keyword(Keyword::Column, "expected COLUMN or PARTITION after DROP")?;
            let mut columns = vec![self.parse_identifier("expected a column name")?];
            while self.match_token(&TokenKind::Comma) {
                columns.push(self.parse_identifier("expected a column name")?);
            }
            AlterTableOperation::DropColumns(columns)
        } else if self.match_keyword(Keyword::Rebuild) {
            AlterTableOperation::Rebuild
        } else {
            self.error("expected ADD, DROP, or REBUILD in ALTER TABLE");
            return None;
        };

        let span = alter_token.span().merge(self.previous_span());
        Some(Statement::AlterTable(AlterTableStatement {
            table,
            operation,
            span,
        }))
    }

    /// `(<static-expression>, ...)` — one partition label.
    ///
    /// Each expression must be constant-foldable; anything that depends on
    /// runtime context is rejected with an error diagnostic.
    fn parse_partition_label(&mut self) -> Option<PartitionLabel> {
        let open = self.expect(
            &TokenKind::LeftParen,
            "expected '(' to open a partition label",
        )?;

        let mut expressions = vec![self.parse_expression()];
        while self.match_token(&TokenKind::Comma) {
            expressions.push(self.parse_expression());
        }

        for expression in &expressions {
            if !expression.is_error() && !expression.is_static() {
                self.diagnostics.push(
                    Diagnostic::error(
                        "partition label expressions must be constant",
                        expression.span(),
                    )
                    .with_offending(expression.text()),
                );
            }
        }

        self.expect(
            &TokenKind::RightParen,
            "expected ')' to close a partition label",
        )?;

        let span = open.span().merge(self.previous_span());
        Some(PartitionLabel { expressions, span })
    }

    // ========================================================================
    // DECLARE / INSERT
    // ========================================================================

    /// `DECLARE <variable> <builtin-type> [= <expression>]`
    pub(super) fn parse_declare_variable(&mut self) -> Option<Statement> {
        let declare_token = self.advance(); // DECLARE

        let variable = if matches!(self.current_kind(), TokenKind::Variable(_)) {
            let token = self.advance();
            Variable::new(token.text(), token.span())
        } else {
            self.error("expected a variable after DECLARE");
            return None;
        };

        let ty = self.parse_builtin_type("expected a type after the variable name")?;

        let initializer = if self.match_token(&TokenKind::Operator("=".into())) {
            Some(self.parse_expression())
        } else {
            None
        };

        let span = declare_token.span().merge(self.previous_span());
        Some(Statement::DeclareVariable(DeclareVariableStatement {
            variable,
            ty,
            initializer,
            span,
        }))
    }

    /// `INSERT INTO <multipart-identifier> VALUES (<expr>, ...), ...`
    pub(super) fn parse_insert(&mut self) -> Option<Statement> {
        let insert_token = self.advance(); // INSERT
        self.expect_keyword(Keyword::Into, "expected INTO after INSERT")?;
        let table = self.parse_multipart_identifier("expected a table name after INSERT INTO")?;
        self.expect_keyword(Keyword::Values, "expected VALUES after the table name")?;

        let mut rows = vec![self.parse_value_row()?];
        while self.match_token(&TokenKind::Comma) {
            rows.push(self.parse_value_row()?);
        }

        let span = insert_token.span().merge(self.previous_span());
        Some(Statement::Insert(InsertStatement { table, rows, span }))
    }

    /// `(<expr>, ...)` — one value row.
    fn parse_value_row(&mut self) -> Option<Vec<Expression>> {
        self.expect(&TokenKind::LeftParen, "expected '(' to open a value row")?;
        let mut expressions = vec![self.parse_expression()];
        while self.match_token(&TokenKind::Comma) {
            expressions.push(self.parse_expression());
        }
        self.expect(&TokenKind::RightParen, "expected ')' to close a value row")?;
        Some(expressions)
    }
}
