// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Property-based tests for the USQL lexer.
//!
//! These tests use `proptest` to verify lexer invariants over generated
//! inputs:
//!
//! 1. **Lexer never panics** — arbitrary string input always produces tokens
//! 2. **Token spans within input** — all token spans satisfy `end <= input.len()`
//! 3. **Token spans are ordered and non-overlapping**
//! 4. **EOF is always last** — `lex_with_eof` always ends with EOF
//! 5. **Lexer is deterministic** — same input always produces same tokens
//! 6. **Valid fragments produce no errors** — known-valid inputs lex cleanly

use proptest::prelude::*;

use super::lexer::{lex, lex_with_eof};

// ============================================================================
// Generators
// ============================================================================

/// Known-valid single-token fragments that should lex without errors.
const VALID_SINGLE_TOKENS: &[&str] = &[
    "USE",
    "CREATE",
    "PARTITIONED",
    "mydb",
    "_tmp",
    "[quoted name]",
    "@rowCount",
    "42",
    "3.5",
    "2.5E10",
    "100L",
    "0.5m",
    "'silo'",
    "'it''s'",
    "+",
    "-",
    "*",
    "/",
    "%",
    "=",
    "==",
    "!=",
    "<>",
    "<=",
    ">=",
    "(",
    ")",
    ",",
    ".",
    ";",
];

/// Multi-token valid statements that should lex cleanly.
const VALID_STATEMENTS: &[&str] = &[
    "USE mydb",
    "CREATE SCHEMA reporting",
    "DROP TABLE IF EXISTS foo.bar",
    "CREATE TABLE t WITH SCHEMA (a INT, b STRING) PARTITIONED BY (a)",
    "ALTER TABLE t ADD PARTITION (1, 'us')",
    "DECLARE @rows INT = 10 * 2",
    "INSERT INTO t VALUES (1, 'x'), (2, 'y')",
    "INSERT INTO t VALUES (a.b.c)",
];

fn valid_single_token() -> impl Strategy<Value = String> {
    prop::sample::select(VALID_SINGLE_TOKENS).prop_map(std::string::ToString::to_string)
}

fn valid_statement() -> impl Strategy<Value = String> {
    prop::sample::select(VALID_STATEMENTS).prop_map(std::string::ToString::to_string)
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Property 1: Lexer never panics on arbitrary string input.
    #[test]
    fn lexer_never_panics(input in "\\PC{0,500}") {
        let _tokens = lex(&input);
    }

    /// Property 1b: Lexer never panics with lex_with_eof on arbitrary input.
    #[test]
    fn lexer_with_eof_never_panics(input in "\\PC{0,500}") {
        let _tokens = lex_with_eof(&input);
    }

    /// Property 2: All token spans are within input bounds.
    #[test]
    fn token_spans_within_input(input in "\\PC{0,500}") {
        let tokens = lex_with_eof(&input);
        let input_len = u32::try_from(input.len()).unwrap_or(u32::MAX);
        for token in &tokens {
            prop_assert!(
                token.span().end() <= input_len,
                "token {:?} span end {} exceeds input length {}",
                token.kind(),
                token.span().end(),
                input_len,
            );
        }
    }

    /// Property 3: Token spans are ordered and non-overlapping.
    #[test]
    fn token_spans_are_ordered(input in "\\PC{0,500}") {
        let tokens = lex(&input);
        for pair in tokens.windows(2) {
            prop_assert!(
                pair[0].span().end() <= pair[1].span().start(),
                "token spans overlap: {:?} then {:?}",
                pair[0].span(),
                pair[1].span(),
            );
        }
    }

    /// Property 4: lex_with_eof always ends with exactly one EOF token.
    #[test]
    fn eof_is_always_last(input in "\\PC{0,500}") {
        let tokens = lex_with_eof(&input);
        prop_assert!(!tokens.is_empty());
        prop_assert!(tokens.last().expect("non-empty").kind().is_eof());
        let eof_count = tokens.iter().filter(|t| t.kind().is_eof()).count();
        prop_assert_eq!(eof_count, 1);
    }

    /// Property 5: Lexing is deterministic.
    #[test]
    fn lexer_is_deterministic(input in "\\PC{0,500}") {
        let first = lex_with_eof(&input);
        let second = lex_with_eof(&input);
        prop_assert_eq!(first, second);
    }

    /// Property 6: Known-valid single tokens lex without errors.
    #[test]
    fn valid_tokens_lex_cleanly(input in valid_single_token()) {
        let tokens = lex(&input);
        prop_assert_eq!(tokens.len(), 1, "expected one token for {:?}", input);
        prop_assert!(!tokens[0].kind().is_error());
    }

    /// Property 6b: Known-valid statements lex without errors.
    #[test]
    fn valid_statements_lex_cleanly(input in valid_statement()) {
        let tokens = lex(&input);
        prop_assert!(!tokens.is_empty());
        for token in &tokens {
            prop_assert!(
                !token.kind().is_error(),
                "unexpected error token in {:?}: {:?}",
                input,
                token.kind(),
            );
        }
    }

    /// Whitespace between valid statements never changes the token kinds.
    #[test]
    fn surrounding_whitespace_is_insignificant(
        input in valid_statement(),
        leading in "[ \t\n]{0,5}",
        trailing in "[ \t\n]{0,5}",
    ) {
        let padded = format!("{leading}{input}{trailing}");
        let plain: Vec<_> = lex(&input).into_iter().map(super::Token::into_kind).collect();
        let spaced: Vec<_> = lex(&padded).into_iter().map(super::Token::into_kind).collect();
        prop_assert_eq!(plain, spaced);
    }
}
