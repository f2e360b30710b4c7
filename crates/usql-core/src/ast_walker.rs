// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Listener-based traversal of a parsed [`Program`].
//!
//! [`walk_program`] visits every node of the tree exactly once, in
//! document order, invoking the matching [`Listener`] hooks: `enter_*`
//! before a node's children, `exit_*` after them. Every hook has a
//! default no-op implementation, so listeners override only what they
//! need.
//!
//! The traversal itself is side-effect-free and re-entrant: walking the
//! same tree twice, with the same or different listeners, yields the
//! identical visitation order. Side effects belong inside the listener,
//! which is injected by the caller and owns its own state.
//!
//! # Node kinds and hooks
//!
//! Statement and clause nodes map one-to-one to hook pairs. Expression
//! hooks follow the grammar's rule structure: member access, binary, and
//! unary applications get their own pairs, while literals, identifiers,
//! variables, and parenthesized sub-expressions share the
//! `*_primary_expression` pair (they are alternatives of the grammar's
//! primary rule). Identifier nodes additionally fire the `*_identifier`
//! pair wherever they appear.
//!
//! Error nodes produced by error-collecting parses have no hooks; the
//! traversal skips them silently.
//!
//! # Example
//!
//! ```
//! use usql_core::ast::UseDatabaseStatement;
//! use usql_core::ast_walker::{Listener, walk_program};
//! use usql_core::source_analysis::{lex_with_eof, parse};
//!
//! #[derive(Default)]
//! struct DatabaseCollector {
//!     databases: Vec<String>,
//! }
//!
//! impl Listener for DatabaseCollector {
//!     fn exit_use_database_statement(&mut self, statement: &UseDatabaseStatement) {
//!         self.databases.push(statement.name.unquoted().to_string());
//!     }
//! }
//!
//! let (program, _) = parse(lex_with_eof("USE a; USE b"));
//! let mut collector = DatabaseCollector::default();
//! walk_program(&program, &mut collector);
//! assert_eq!(collector.databases, vec!["a", "b"]);
//! ```

use crate::ast::{
    AlterTableAddDropPartitionStatement, AlterTableOperation, AlterTableStatement,
    ColumnDefinition, CreateDatabaseStatement, CreateSchemaStatement,
    CreateTableWithSchemaStatement, DeclareVariableStatement, DistributionSpecification,
    DropTableStatement, Expression, Identifier, InsertStatement, MultipartIdentifier,
    PartitionLabel, PartitionSpecification, Program, SortItem, Statement, TableIndex,
    UseDatabaseStatement,
};

/// Callbacks invoked during a [`walk_program`] traversal.
///
/// One enter/exit pair exists per node kind; all methods default to
/// no-ops. Implementations hold whatever state the consumer needs —
/// the traversal never inspects it.
#[allow(unused_variables)]
pub trait Listener {
    fn enter_program(&mut self, program: &Program) {}
    fn exit_program(&mut self, program: &Program) {}

    fn enter_use_database_statement(&mut self, statement: &UseDatabaseStatement) {}
    fn exit_use_database_statement(&mut self, statement: &UseDatabaseStatement) {}

    fn enter_create_schema_statement(&mut self, statement: &CreateSchemaStatement) {}
    fn exit_create_schema_statement(&mut self, statement: &CreateSchemaStatement) {}

    fn enter_create_database_statement(&mut self, statement: &CreateDatabaseStatement) {}
    fn exit_create_database_statement(&mut self, statement: &CreateDatabaseStatement) {}

    fn enter_drop_table_statement(&mut self, statement: &DropTableStatement) {}
    fn exit_drop_table_statement(&mut self, statement: &DropTableStatement) {}

    fn enter_create_table_with_schema_statement(
        &mut self,
        statement: &CreateTableWithSchemaStatement,
    ) {
    }
    fn exit_create_table_with_schema_statement(
        &mut self,
        statement: &CreateTableWithSchemaStatement,
    ) {
    }

    fn enter_alter_table_statement(&mut self, statement: &AlterTableStatement) {}
    fn exit_alter_table_statement(&mut self, statement: &AlterTableStatement) {}

    fn enter_alter_table_add_drop_partition_statement(
        &mut self,
        statement: &AlterTableAddDropPartitionStatement,
    ) {
    }
    fn exit_alter_table_add_drop_partition_statement(
        &mut self,
        statement: &AlterTableAddDropPartitionStatement,
    ) {
    }

    fn enter_declare_variable_statement(&mut self, statement: &DeclareVariableStatement) {}
    fn exit_declare_variable_statement(&mut self, statement: &DeclareVariableStatement) {}

    fn enter_insert_statement(&mut self, statement: &InsertStatement) {}
    fn exit_insert_statement(&mut self, statement: &InsertStatement) {}

    fn enter_column_definition(&mut self, column: &ColumnDefinition) {}
    fn exit_column_definition(&mut self, column: &ColumnDefinition) {}

    fn enter_table_index(&mut self, index: &TableIndex) {}
    fn exit_table_index(&mut self, index: &TableIndex) {}

    fn enter_sort_item(&mut self, item: &SortItem) {}
    fn exit_sort_item(&mut self, item: &SortItem) {}

    fn enter_partition_specification(&mut self, specification: &PartitionSpecification) {}
    fn exit_partition_specification(&mut self, specification: &PartitionSpecification) {}

    fn enter_distribution_specification(&mut self, specification: &DistributionSpecification) {}
    fn exit_distribution_specification(&mut self, specification: &DistributionSpecification) {}

    fn enter_partition_label(&mut self, label: &PartitionLabel) {}
    fn exit_partition_label(&mut self, label: &PartitionLabel) {}

    fn enter_identifier(&mut self, identifier: &Identifier) {}
    fn exit_identifier(&mut self, identifier: &Identifier) {}

    fn enter_multipart_identifier(&mut self, identifier: &MultipartIdentifier) {}
    fn exit_multipart_identifier(&mut self, identifier: &MultipartIdentifier) {}

    fn enter_member_access_expression(&mut self, expression: &Expression) {}
    fn exit_member_access_expression(&mut self, expression: &Expression) {}

    fn enter_binary_expression(&mut self, expression: &Expression) {}
    fn exit_binary_expression(&mut self, expression: &Expression) {}

    fn enter_unary_expression(&mut self, expression: &Expression) {}
    fn exit_unary_expression(&mut self, expression: &Expression) {}

    fn enter_primary_expression(&mut self, expression: &Expression) {}
    fn exit_primary_expression(&mut self, expression: &Expression) {}
}

/// Walks a program in document order, invoking the listener's hooks.
///
/// Every node is visited exactly once; enter fires before a node's
/// children, exit after.
pub fn walk_program<L: Listener + ?Sized>(program: &Program, listener: &mut L) {
    listener.enter_program(program);
    for statement in &program.statements {
        walk_statement(statement, listener);
    }
    listener.exit_program(program);
}

fn walk_statement<L: Listener + ?Sized>(statement: &Statement, listener: &mut L) {
    match statement {
        Statement::UseDatabase(s) => {
            listener.enter_use_database_statement(s);
            walk_identifier(&s.name, listener);
            listener.exit_use_database_statement(s);
        }
        Statement::CreateSchema(s) => {
            listener.enter_create_schema_statement(s);
            walk_identifier(&s.name, listener);
            listener.exit_create_schema_statement(s);
        }
        Statement::CreateDatabase(s) => {
            listener.enter_create_database_statement(s);
            if let Some(name) = &s.name {
                walk_identifier(name, listener);
            }
            listener.exit_create_database_statement(s);
        }
        Statement::DropTable(s) => {
            listener.enter_drop_table_statement(s);
            walk_multipart_identifier(&s.table, listener);
            listener.exit_drop_table_statement(s);
        }
        Statement::CreateTableWithSchema(s) => {
            listener.enter_create_table_with_schema_statement(s);
            walk_multipart_identifier(&s.table, listener);
            for column in &s.columns {
                walk_column_definition(column, listener);
            }
            if let Some(index) = &s.index {
                walk_table_index(index, listener);
            }
            if let Some(partition) = &s.partition {
                walk_partition_specification(partition, listener);
            }
            listener.exit_create_table_with_schema_statement(s);
        }
        Statement::AlterTable(s) => {
            listener.enter_alter_table_statement(s);
            walk_multipart_identifier(&s.table, listener);
            match &s.operation {
                AlterTableOperation::AddColumns(columns) => {
                    for column in columns {
                        walk_column_definition(column, listener);
                    }
                }
                AlterTableOperation::DropColumns(columns) => {
                    for column in columns {
                        walk_identifier(column, listener);
                    }
                }
                AlterTableOperation::Rebuild => {}
            }
            listener.exit_alter_table_statement(s);
        }
        Statement::AlterTableAddDropPartition(s) => {
            listener.enter_alter_table_add_drop_partition_statement(s);
            walk_multipart_identifier(&s.table, listener);
            for label in &s.labels {
                walk_partition_label(label, listener);
            }
            listener.exit_alter_table_add_drop_partition_statement(s);
        }
        Statement::DeclareVariable(s) => {
            listener.enter_declare_variable_statement(s);
            if let Some(initializer) = &s.initializer {
                walk_expression(initializer, listener);
            }
            listener.exit_declare_variable_statement(s);
        }
        Statement::Insert(s) => {
            listener.enter_insert_statement(s);
            walk_multipart_identifier(&s.table, listener);
            for row in &s.rows {
                for expression in row {
                    walk_expression(expression, listener);
                }
            }
            listener.exit_insert_statement(s);
        }
        // Error nodes have no hooks.
        Statement::Error { .. } => {}
    }
}

fn walk_column_definition<L: Listener + ?Sized>(column: &ColumnDefinition, listener: &mut L) {
    listener.enter_column_definition(column);
    walk_identifier(&column.name, listener);
    listener.exit_column_definition(column);
}

fn walk_table_index<L: Listener + ?Sized>(index: &TableIndex, listener: &mut L) {
    listener.enter_table_index(index);
    walk_identifier(&index.name, listener);
    for item in &index.sort_items {
        listener.enter_sort_item(item);
        walk_identifier(&item.column, listener);
        listener.exit_sort_item(item);
    }
    listener.exit_table_index(index);
}

fn walk_partition_specification<L: Listener + ?Sized>(
    specification: &PartitionSpecification,
    listener: &mut L,
) {
    listener.enter_partition_specification(specification);
    for column in &specification.columns {
        walk_identifier(column, listener);
    }
    if let Some(distribution) = &specification.distribution {
        walk_distribution_specification(distribution, listener);
    }
    listener.exit_partition_specification(specification);
}

fn walk_distribution_specification<L: Listener + ?Sized>(
    specification: &DistributionSpecification,
    listener: &mut L,
) {
    listener.enter_distribution_specification(specification);
    for column in &specification.columns {
        walk_identifier(column, listener);
    }
    listener.exit_distribution_specification(specification);
}

fn walk_partition_label<L: Listener + ?Sized>(label: &PartitionLabel, listener: &mut L) {
    listener.enter_partition_label(label);
    for expression in &label.expressions {
        walk_expression(expression, listener);
    }
    listener.exit_partition_label(label);
}

fn walk_multipart_identifier<L: Listener + ?Sized>(
    identifier: &MultipartIdentifier,
    listener: &mut L,
) {
    listener.enter_multipart_identifier(identifier);
    for part in &identifier.parts {
        walk_identifier(part, listener);
    }
    listener.exit_multipart_identifier(identifier);
}

fn walk_identifier<L: Listener + ?Sized>(identifier: &Identifier, listener: &mut L) {
    listener.enter_identifier(identifier);
    listener.exit_identifier(identifier);
}

fn walk_expression<L: Listener + ?Sized>(expression: &Expression, listener: &mut L) {
    match expression {
        Expression::MemberAccess {
            receiver, member, ..
        } => {
            listener.enter_member_access_expression(expression);
            walk_expression(receiver, listener);
            walk_identifier(member, listener);
            listener.exit_member_access_expression(expression);
        }
        Expression::Binary { left, right, .. } => {
            listener.enter_binary_expression(expression);
            walk_expression(left, listener);
            walk_expression(right, listener);
            listener.exit_binary_expression(expression);
        }
        Expression::Unary { operand, .. } => {
            listener.enter_unary_expression(expression);
            walk_expression(operand, listener);
            listener.exit_unary_expression(expression);
        }
        Expression::Parenthesized {
            expression: inner, ..
        } => {
            listener.enter_primary_expression(expression);
            walk_expression(inner, listener);
            listener.exit_primary_expression(expression);
        }
        Expression::Identifier(identifier) => {
            listener.enter_primary_expression(expression);
            walk_identifier(identifier, listener);
            listener.exit_primary_expression(expression);
        }
        Expression::Literal(_) | Expression::Variable(_) => {
            listener.enter_primary_expression(expression);
            listener.exit_primary_expression(expression);
        }
        // Error nodes have no hooks.
        Expression::Error { .. } => {}
    }
}
