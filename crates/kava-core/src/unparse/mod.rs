// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! AST unparser: renders Kava AST nodes back to text.
//!
//! Two renderings exist, both deterministic:
//!
//! - [`emit`] — the canonical bracket-annotated form. Every operator node is
//!   parenthesized, so the tree shape is visible in the output; useful when
//!   debugging precedence and backtracking decisions.
//! - [`emit_common`] — the normalized single-line form used as the oracle in
//!   tests: implicit calls print with explicit parentheses, object literals
//!   with braces, block bodies between braces with `;`-separated statements.
//!
//! The parser's contract is the tree shape; these strings are a readable
//! projection of it, not a source-fidelity round trip.

use crate::ast::{Block, ElsePart, Expression, ForClause, FunctionParam, LoopKind};

/// Renders a block in canonical bracket-annotated form.
#[must_use]
pub fn emit(block: &Block) -> String {
    let statements: Vec<String> = block.expressions.iter().map(emit_expression).collect();
    statements.join(";")
}

/// Renders one expression in canonical bracket-annotated form.
#[must_use]
pub fn emit_expression(expr: &Expression) -> String {
    render_expression(expr, Style::Canonical)
}

/// Renders a block in the normalized common form.
#[must_use]
pub fn emit_common(block: &Block) -> String {
    let statements: Vec<String> = block.expressions.iter().map(emit_common_expression).collect();
    statements.join(";")
}

/// Renders one expression in the normalized common form.
#[must_use]
pub fn emit_common_expression(expr: &Expression) -> String {
    render_expression(expr, Style::Common)
}

/// Which rendering is being produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Canonical,
    Common,
}

impl Style {
    /// Argument separator inside call parentheses.
    const fn arg_separator(self) -> &'static str {
        match self {
            Self::Canonical => ", ",
            Self::Common => ",",
        }
    }
}

fn render_block(block: &Block, style: Style) -> String {
    let statements: Vec<String> = block
        .expressions
        .iter()
        .map(|e| render_expression(e, style))
        .collect();
    statements.join(";")
}

/// Wraps an operator expression according to style: canonical output keeps
/// the brackets, common output relies on the reader knowing the priorities.
fn operator_node(text: String, style: Style) -> String {
    match style {
        Style::Canonical => format!("({text})"),
        Style::Common => text,
    }
}

fn render_expression(expr: &Expression, style: Style) -> String {
    match expr {
        Expression::Number { text, .. }
        | Expression::StringLiteral { text, .. }
        | Expression::BuiltinPrimary { text, .. }
        | Expression::This { text, .. } => text.to_string(),

        Expression::Identifier(id) => id.name.to_string(),

        Expression::Parens { inner, .. } => {
            format!("({})", render_expression(inner, style))
        }

        Expression::Binary {
            left, op, right, ..
        } => operator_node(
            format!(
                "{} {op} {}",
                render_expression(left, style),
                render_expression(right, style)
            ),
            style,
        ),

        Expression::PrefixUnary { op, inner, .. } => {
            let space = if op.ends_with(char::is_alphabetic) {
                " "
            } else {
                ""
            };
            operator_node(
                format!("{op}{space}{}", render_expression(inner, style)),
                style,
            )
        }

        Expression::PostfixUnary { op, inner, .. } => {
            operator_node(format!("{}{op}", render_expression(inner, style)), style)
        }

        Expression::Assign {
            target, op, value, ..
        } => operator_node(
            format!(
                "{} {op} {}",
                render_expression(target, style),
                render_expression(value, style)
            ),
            style,
        ),

        Expression::PropertyAccess { target, member, .. } => {
            // `@name` prints without a dot; everything else dotted.
            match &**target {
                Expression::This { text, .. } if text == "@" => format!("@{}", member.name),
                _ => format!("{}.{}", render_expression(target, style), member.name),
            }
        }

        Expression::FunctionCall { target, args, .. } => {
            let rendered: Vec<String> = args.iter().map(|a| render_expression(a, style)).collect();
            format!(
                "{}({})",
                render_expression(target, style),
                rendered.join(style.arg_separator())
            )
        }

        Expression::Splat { inner, .. } => {
            format!("{}...", render_expression(inner, style))
        }

        Expression::Function {
            params,
            body,
            binds_this,
            ..
        } => {
            let rendered: Vec<String> = params.iter().map(|p| render_param(p, style)).collect();
            let arrow = if *binds_this { "=>" } else { "->" };
            format!(
                "({}) {arrow} {{{}}}",
                rendered.join(", "),
                render_block(body, style)
            )
        }

        Expression::ObjectLiteral { properties, .. } => {
            let rendered: Vec<String> = properties
                .iter()
                .map(|p| {
                    format!(
                        "{}: {}",
                        render_expression(&p.key, style),
                        render_expression(&p.value, style)
                    )
                })
                .collect();
            format!("{{{}}}", rendered.join(", "))
        }

        Expression::If {
            kind,
            condition,
            then_block,
            else_part,
            ..
        } => {
            let mut out = format!(
                "{} ({}) {{ {} }}",
                kind.keyword(),
                render_expression(condition, style),
                render_block(then_block, style)
            );
            if let Some(else_part) = else_part {
                match &**else_part {
                    ElsePart::Block(block) => {
                        out.push_str(&format!(" else {{ {} }}", render_block(block, style)));
                    }
                    ElsePart::If(chained) => {
                        out.push_str(&format!(" else {}", render_expression(chained, style)));
                    }
                }
            }
            out
        }

        Expression::Loop {
            kind,
            condition,
            body,
            ..
        } => match (kind, condition) {
            (LoopKind::Until, Some(condition)) => format!(
                "until ({}) {{ {} }}",
                render_expression(condition, style),
                render_block(body, style)
            ),
            _ => format!("loop {{ {} }}", render_block(body, style)),
        },

        Expression::For { clause, body, .. } => {
            format!(
                "for {} {{ {} }}",
                render_clause(clause, style),
                render_block(body, style)
            )
        }

        Expression::PostfixFor { inner, clause, .. } => {
            format!(
                "{} for {}",
                render_expression(inner, style),
                render_clause(clause, style)
            )
        }

        Expression::Return { value, .. } => match value {
            Some(value) => format!("return {}", render_expression(value, style)),
            None => "return".to_string(),
        },
    }
}

fn render_clause(clause: &ForClause, style: Style) -> String {
    let mut out = render_expression(&clause.iter1, style);
    if let Some(iter2) = &clause.iter2 {
        out.push_str(", ");
        out.push_str(&render_expression(iter2, style));
    }
    out.push(' ');
    out.push_str(clause.iter_kind.keyword());
    out.push(' ');
    out.push_str(&render_expression(&clause.iterable, style));
    out
}

fn render_param(param: &FunctionParam, style: Style) -> String {
    if param.splat {
        format!("{}...", param.name.name)
    } else if let Some(default) = &param.default_value {
        format!("{} = {}", param.name.name, render_expression(default, style))
    } else {
        param.name.name.to_string()
    }
}
