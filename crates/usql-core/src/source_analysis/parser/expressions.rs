// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Expression parsing for USQL.
//!
//! This module contains the expression grammar extracted from the main
//! `Parser` implementation:
//!
//! - Binary operators via Pratt parsing (see
//!   [`binary_binding_power`](super::binary_binding_power) for the table)
//! - Prefix `NOT`, `-`, `+`
//! - Member access: `a.b` (binds tightest, nests left)
//! - Primary fallback: literals, identifiers, variables, parenthesized
//!   sub-expressions
//!
//! Literal expressions keep their token text verbatim; `100.0m` is carried
//! through untouched.

use ecow::EcoString;

use crate::ast::{Expression, Identifier, Literal, LiteralKind, UnaryOperator, Variable};
use crate::source_analysis::{Keyword, TokenKind};

use super::{NOT_RIGHT_BINDING_POWER, Parser, binary_binding_power};

impl Parser {
    // ========================================================================
    // Expression Parsing
    // ========================================================================

    /// Parses any expression.
    ///
    /// Entry point for expression parsing; handles all precedence levels.
    /// Guarded against stack overflow on deeply nested input by the
    /// parser's nesting-depth counter.
    pub(super) fn parse_expression(&mut self) -> Expression {
        if let Err(error) = self.enter_nesting(self.current_token().span()) {
            return error;
        }
        let result = self.parse_binary(0);
        self.leave_nesting();
        result
    }

    /// Pratt parsing for binary expressions.
    ///
    /// `min_bp` is the minimum binding power required to continue: an
    /// operator that binds less tightly ends this level and is handled by
    /// an enclosing call, which yields correct precedence and left
    /// associativity through recursion.
    fn parse_binary(&mut self, min_bp: u8) -> Expression {
        let mut left = self.parse_unary();

        while let Some(op) = self.current_binary_op() {
            let Some(bp) = binary_binding_power(&op) else {
                break;
            };
            if bp.left < min_bp {
                break;
            }

            self.advance();
            let right = self.parse_binary(bp.right);

            let span = left.span().merge(right.span());
            left = Expression::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
                span,
            };
        }

        left
    }

    /// Returns the binary operator at the current token, if any.
    ///
    /// Symbolic operators come from operator tokens; `AND`/`OR` are
    /// keywords that act as binary operators in expressions.
    fn current_binary_op(&self) -> Option<EcoString> {
        match self.current_kind() {
            TokenKind::Operator(op) => Some(op.clone()),
            TokenKind::Keyword(Keyword::And) => Some(EcoString::from("AND")),
            TokenKind::Keyword(Keyword::Or) => Some(EcoString::from("OR")),
            _ => None,
        }
    }

    /// Parses prefix operators: `NOT`, `-`, `+`.
    fn parse_unary(&mut self) -> Expression {
        if self.at_keyword(Keyword::Not) {
            let not_token = self.advance();
            if let Err(error) = self.enter_nesting(not_token.span()) {
                return error;
            }
            // NOT binds between AND and the comparisons, so its operand is
            // a whole comparison: NOT a = b parses as NOT (a = b).
            let operand = self.parse_binary(NOT_RIGHT_BINDING_POWER);
            self.leave_nesting();

            let span = not_token.span().merge(operand.span());
            return Expression::Unary {
                op: UnaryOperator::Not,
                operand: Box::new(operand),
                span,
            };
        }

        let prefix = match self.current_kind() {
            TokenKind::Operator(op) if op == "-" => Some(UnaryOperator::Negate),
            TokenKind::Operator(op) if op == "+" => Some(UnaryOperator::Plus),
            _ => None,
        };

        if let Some(op) = prefix {
            let op_token = self.advance();
            if let Err(error) = self.enter_nesting(op_token.span()) {
                return error;
            }
            let operand = self.parse_unary();
            self.leave_nesting();

            let span = op_token.span().merge(operand.span());
            return Expression::Unary {
                op,
                operand: Box::new(operand),
                span,
            };
        }

        self.parse_postfix()
    }

    /// Parses postfix member access: `a.b.c` nests left as `(a.b).c`.
    fn parse_postfix(&mut self) -> Expression {
        let mut expr = self.parse_primary();

        while self.match_token(&TokenKind::Dot) {
            let Some(member) = self.parse_identifier("expected a member name after '.'") else {
                let span = expr.span().merge(self.previous_span());
                return Expression::Error {
                    message: "member access is missing a member name".into(),
                    span,
                };
            };
            let span = expr.span().merge(member.span);
            expr = Expression::MemberAccess {
                receiver: Box::new(expr),
                member,
                span,
            };
        }

        expr
    }

    /// Parses a primary expression: a literal, identifier, variable, or
    /// parenthesized sub-expression.
    fn parse_primary(&mut self) -> Expression {
        match self.current_kind() {
            TokenKind::Number(_) => {
                let token = self.advance();
                Expression::Literal(Literal::new(LiteralKind::Number, token.text(), token.span()))
            }
            TokenKind::String(_) => {
                let token = self.advance();
                Expression::Literal(Literal::new(LiteralKind::String, token.text(), token.span()))
            }
            TokenKind::Keyword(Keyword::True | Keyword::False) => {
                let token = self.advance();
                Expression::Literal(Literal::new(
                    LiteralKind::Boolean,
                    token.text(),
                    token.span(),
                ))
            }
            TokenKind::Keyword(Keyword::Null) => {
                let token = self.advance();
                Expression::Literal(Literal::new(LiteralKind::Null, token.text(), token.span()))
            }
            TokenKind::Variable(_) => {
                let token = self.advance();
                Expression::Variable(Variable::new(token.text(), token.span()))
            }
            TokenKind::Identifier(_) | TokenKind::QuotedIdentifier(_) => {
                let token = self.advance();
                Expression::Identifier(Identifier::new(token.text(), token.span()))
            }
            TokenKind::LeftParen => {
                let open = self.advance();
                let expression = self.parse_expression();
                self.expect(
                    &TokenKind::RightParen,
                    "expected ')' to close the expression",
                );
                let span = open.span().merge(self.previous_span());
                Expression::Parenthesized {
                    expression: Box::new(expression),
                    span,
                }
            }
            _ => {
                self.error("expected an expression");
                let token = self.advance();
                Expression::Error {
                    message: "expected an expression".into(),
                    span: token.span(),
                }
            }
        }
    }
}
