// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Partial numeric evaluation of AST nodes, for testing and the CLI's
//! `eval` subcommand.
//!
//! This is deliberately not an interpreter: only literal arithmetic reduces.
//! Anything touching names, calls, control flow, or state yields `None`,
//! which keeps the evaluator honest as a cross-check on parse shape — if
//! precedence is wrong, the number comes out wrong.

use crate::ast::Expression;

/// Evaluates an expression to a number, where possible.
///
/// Comparisons yield `1.0`/`0.0`. Bitwise and shift operators truncate to
/// 64-bit integers, matching scripting-language semantics.
#[must_use]
pub fn debug_eval(expr: &Expression) -> Option<f64> {
    match expr {
        Expression::Number { text, .. } => text.parse::<f64>().ok(),

        Expression::BuiltinPrimary { text, .. } => match text.as_str() {
            "true" => Some(1.0),
            "false" => Some(0.0),
            _ => None,
        },

        Expression::Parens { inner, .. } => debug_eval(inner),

        Expression::PrefixUnary { op, inner, .. } => {
            let value = debug_eval(inner)?;
            match op.as_str() {
                "+" => Some(value),
                "-" => Some(-value),
                "!" | "not" => Some(if value == 0.0 { 1.0 } else { 0.0 }),
                "~" => int_op(value, value, |a, _| !a),
                _ => None,
            }
        }

        Expression::Binary {
            left, op, right, ..
        } => {
            let a = debug_eval(left)?;
            let b = debug_eval(right)?;
            match op.as_str() {
                "+" => Some(a + b),
                "-" => Some(a - b),
                "*" => Some(a * b),
                "/" => Some(a / b),
                "|" => int_op(a, b, |a, b| a | b),
                "^" => int_op(a, b, |a, b| a ^ b),
                "&" => int_op(a, b, |a, b| a & b),
                "<<" => int_op(a, b, |a, b| a.wrapping_shl(b as u32)),
                ">>" => int_op(a, b, |a, b| a.wrapping_shr(b as u32)),
                ">>>" => int_op(a, b, |a, b| ((a as u64).wrapping_shr(b as u32)) as i64),
                "==" | "is" => Some(bool_num(a == b)),
                "!=" | "isnt" => Some(bool_num(a != b)),
                ">" => Some(bool_num(a > b)),
                "<" => Some(bool_num(a < b)),
                ">=" => Some(bool_num(a >= b)),
                "<=" => Some(bool_num(a <= b)),
                _ => None,
            }
        }

        _ => None,
    }
}

fn bool_num(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "bitwise operators intentionally truncate to integer range"
)]
fn int_op(a: f64, b: f64, f: impl Fn(i64, i64) -> i64) -> Option<f64> {
    let result = f(a as i64, b as i64);
    Some(result as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_source;

    fn eval(source: &str) -> Option<f64> {
        let block = parse_source(source).unwrap();
        debug_eval(&block.expressions[0])
    }

    #[test]
    fn arithmetic_respects_precedence() {
        assert_eq!(eval("1 + 2 * 3"), Some(7.0));
        assert_eq!(eval("(1 + 2) * 3"), Some(9.0));
        assert_eq!(eval("10 / 4"), Some(2.5));
        assert_eq!(eval("2 * 3 - 1"), Some(5.0));
    }

    #[test]
    fn unary_signs() {
        assert_eq!(eval("-2"), Some(-2.0));
        assert_eq!(eval("1 -2"), Some(-1.0));
        assert_eq!(eval("+3"), Some(3.0));
    }

    #[test]
    fn bitwise_and_shifts() {
        assert_eq!(eval("3 | 0"), Some(3.0));
        assert_eq!(eval("6 & 3"), Some(2.0));
        assert_eq!(eval("5 ^ 1"), Some(4.0));
        assert_eq!(eval("1 << 4"), Some(16.0));
        assert_eq!(eval("16 >> 2"), Some(4.0));
        // Shifts bind tighter than additive operators.
        assert_eq!(eval("1 << 1 + 1"), Some(3.0));
    }

    #[test]
    fn comparisons_yield_unit_numbers() {
        assert_eq!(eval("2 > 1"), Some(1.0));
        assert_eq!(eval("2 < 1"), Some(0.0));
        assert_eq!(eval("2 is 2"), Some(1.0));
        assert_eq!(eval("2 isnt 2"), Some(0.0));
        // Comparisons bind tighter than bitwise.
        assert_eq!(eval("1 | 2 > 1"), Some(1.0));
    }

    #[test]
    fn builtins_and_not() {
        assert_eq!(eval("true"), Some(1.0));
        assert_eq!(eval("not false"), Some(1.0));
        assert_eq!(eval("!1"), Some(0.0));
        assert_eq!(eval("~0"), Some(-1.0));
    }

    #[test]
    fn non_numeric_shapes_do_not_reduce() {
        assert_eq!(eval("foo"), None);
        assert_eq!(eval("foo 1"), None);
        assert_eq!(eval("\"text\""), None);
        assert_eq!(eval("null"), None);
    }
}
