// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Abstract Syntax Tree (AST) definitions for Kava.
//!
//! The AST is a tagged-variant tree built bottom-up by the parser and
//! immutable afterwards. Every node carries a [`Span`] for diagnostics.
//! Behavior (re-emission, the debug numeric evaluator) lives in free
//! functions that match on the variants — see [`crate::unparse`] and
//! [`crate::eval`] — rather than on the nodes themselves.
//!
//! # Example
//!
//! ```
//! use kava_core::parse_source;
//! use kava_core::ast::Expression;
//!
//! let block = parse_source("x = 1").unwrap();
//! assert!(matches!(block.expressions[0], Expression::Assign { .. }));
//! ```

use ecow::EcoString;

use crate::source_analysis::Span;

/// A sequence of statements at one indentation level.
///
/// The root of every parse is a `Block`; nested blocks appear as the bodies
/// of functions, conditionals, and loops. `indent` is the column of the
/// block's first significant token.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// The statements, in source order.
    pub expressions: Vec<Expression>,
    /// The indentation column this block sits at.
    pub indent: usize,
    /// Source location spanning the whole block.
    pub span: Span,
}

impl Block {
    /// Creates a block.
    #[must_use]
    pub fn new(expressions: Vec<Expression>, indent: usize, span: Span) -> Self {
        Self {
            expressions,
            indent,
            span,
        }
    }

    /// Creates an empty block at the given indent.
    #[must_use]
    pub fn empty(indent: usize, span: Span) -> Self {
        Self::new(Vec::new(), indent, span)
    }

    /// Returns `true` if the block has no statements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }
}

/// An identifier with its source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    /// The name as written.
    pub name: EcoString,
    /// Source location.
    pub span: Span,
}

impl Identifier {
    /// Creates an identifier.
    #[must_use]
    pub fn new(name: impl Into<EcoString>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// Whether a conditional reads `if` or `unless`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionalKind {
    /// `if cond …`
    If,
    /// `unless cond …` — the negated form.
    Unless,
}

impl ConditionalKind {
    /// The keyword as written in source.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::If => "if",
            Self::Unless => "unless",
        }
    }
}

/// Whether a loop reads `loop` or `until`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopKind {
    /// `loop body` — unconditional; has no condition.
    Loop,
    /// `until cond body` — the condition is required.
    Until,
}

/// The iteration keyword of a `for`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IterKind {
    /// `for x in xs` — values.
    In,
    /// `for k of obj` — keys.
    Of,
}

impl IterKind {
    /// The keyword as written in source.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Of => "of",
        }
    }
}

/// The iteration header of a `for`: `iter1 [, iter2] (in|of) iterable`.
///
/// Shared between the statement form ([`Expression::For`], which owns a
/// body) and the postfix comprehension ([`Expression::PostfixFor`], which
/// does not).
#[derive(Debug, Clone, PartialEq)]
pub struct ForClause {
    /// First iteration variable; an identifier or `@name`.
    pub iter1: Box<Expression>,
    /// Optional second iteration variable.
    pub iter2: Option<Box<Expression>>,
    /// `in` or `of`.
    pub iter_kind: IterKind,
    /// The expression being iterated.
    pub iterable: Box<Expression>,
    /// Source location of the clause.
    pub span: Span,
}

/// The `else` arm of a conditional: either a plain block or a chained
/// conditional (`else if …` / `else unless …`).
#[derive(Debug, Clone, PartialEq)]
pub enum ElsePart {
    /// `else body`
    Block(Block),
    /// `else if …` — the expression is always [`Expression::If`].
    If(Box<Expression>),
}

/// One parameter of a function literal.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionParam {
    /// The parameter name.
    pub name: Identifier,
    /// Optional default value; never present on a splat parameter.
    pub default_value: Option<Expression>,
    /// `true` for a rest parameter (`args...`).
    pub splat: bool,
    /// Source location.
    pub span: Span,
}

impl FunctionParam {
    /// Creates a plain parameter.
    #[must_use]
    pub fn new(name: Identifier) -> Self {
        let span = name.span;
        Self {
            name,
            default_value: None,
            splat: false,
            span,
        }
    }
}

/// One `key: value` pair of an object literal.
///
/// The key is restricted to an identifier, number, or string literal.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectProperty {
    /// The key.
    pub key: Expression,
    /// The value.
    pub value: Expression,
    /// Source location of the pair.
    pub span: Span,
}

/// An expression or statement node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// An integer literal; the text is kept as written.
    Number {
        /// The digits as written.
        text: EcoString,
        /// Source location.
        span: Span,
    },

    /// A string literal, quotes included.
    StringLiteral {
        /// The literal as written, delimiters and escapes intact.
        text: EcoString,
        /// Source location.
        span: Span,
    },

    /// A variable reference.
    Identifier(Identifier),

    /// `true`, `false`, `null`, or `undefined`.
    BuiltinPrimary {
        /// The keyword as written.
        text: EcoString,
        /// Source location.
        span: Span,
    },

    /// The receiver reference, written `@` or `this`.
    This {
        /// `@` or `this`, as written.
        text: EcoString,
        /// Source location.
        span: Span,
    },

    /// A parenthesized expression.
    Parens {
        /// The inner expression.
        inner: Box<Expression>,
        /// Source location including the parentheses.
        span: Span,
    },

    /// A binary expression. Postfix `if`/`unless` also land here, with the
    /// keyword as the operator.
    Binary {
        /// Left operand.
        left: Box<Expression>,
        /// The operator spelling (`+`, `is`, `if`, …).
        op: EcoString,
        /// Right operand.
        right: Box<Expression>,
        /// Source location.
        span: Span,
    },

    /// A prefix unary expression: `-x`, `not x`, `++i`.
    PrefixUnary {
        /// The operator spelling.
        op: EcoString,
        /// The operand.
        inner: Box<Expression>,
        /// Source location.
        span: Span,
    },

    /// A postfix unary expression: `i++`, `i--`.
    PostfixUnary {
        /// The operator spelling.
        op: EcoString,
        /// The operand.
        inner: Box<Expression>,
        /// Source location.
        span: Span,
    },

    /// An assignment: `target = value` and the compound forms.
    Assign {
        /// The target; an identifier or `@name` access.
        target: Box<Expression>,
        /// The operator spelling (`=`, `+=`, …).
        op: EcoString,
        /// The assigned value.
        value: Box<Expression>,
        /// Source location.
        span: Span,
    },

    /// Member access: `a.b`, `@name`, `this.name`.
    PropertyAccess {
        /// The receiver.
        target: Box<Expression>,
        /// The member name.
        member: Identifier,
        /// Source location.
        span: Span,
    },

    /// A function call, explicit (`f(1)`) or implicit (`f 1`).
    FunctionCall {
        /// The callee.
        target: Box<Expression>,
        /// The arguments; possibly empty.
        args: Vec<Expression>,
        /// Source location.
        span: Span,
    },

    /// A splatted argument: `xs...`.
    Splat {
        /// The spread expression.
        inner: Box<Expression>,
        /// Source location.
        span: Span,
    },

    /// A function literal: `(params) -> body` or `(params) => body`.
    Function {
        /// The parameter list; possibly empty.
        params: Vec<FunctionParam>,
        /// The body; possibly empty.
        body: Block,
        /// `true` for `=>`.
        binds_this: bool,
        /// Source location.
        span: Span,
    },

    /// An object literal, bracketed or unbracketed. Always has at least one
    /// property.
    ObjectLiteral {
        /// The `key: value` pairs, in source order.
        properties: Vec<ObjectProperty>,
        /// Source location.
        span: Span,
    },

    /// A conditional in statement-head form (`if`/`unless` … `then`/block).
    If {
        /// `if` or `unless`.
        kind: ConditionalKind,
        /// The condition.
        condition: Box<Expression>,
        /// The then-body.
        then_block: Block,
        /// The optional `else` arm.
        else_part: Option<Box<ElsePart>>,
        /// Source location.
        span: Span,
    },

    /// `loop body` or `until cond body`.
    Loop {
        /// `loop` or `until`.
        kind: LoopKind,
        /// The condition; present iff `kind` is [`LoopKind::Until`].
        condition: Option<Box<Expression>>,
        /// The body.
        body: Block,
        /// Source location.
        span: Span,
    },

    /// A `for` in statement form, with a body.
    For {
        /// The iteration header.
        clause: ForClause,
        /// The body.
        body: Block,
        /// Source location.
        span: Span,
    },

    /// A postfix comprehension: `x for x in xs`.
    PostfixFor {
        /// The expression being comprehended.
        inner: Box<Expression>,
        /// The iteration header.
        clause: ForClause,
        /// Source location.
        span: Span,
    },

    /// `return` with an optional value.
    Return {
        /// The returned value, if any.
        value: Option<Box<Expression>>,
        /// Source location.
        span: Span,
    },
}

impl Expression {
    /// Returns the source span of this expression.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Number { span, .. }
            | Self::StringLiteral { span, .. }
            | Self::BuiltinPrimary { span, .. }
            | Self::This { span, .. }
            | Self::Parens { span, .. }
            | Self::Binary { span, .. }
            | Self::PrefixUnary { span, .. }
            | Self::PostfixUnary { span, .. }
            | Self::Assign { span, .. }
            | Self::PropertyAccess { span, .. }
            | Self::FunctionCall { span, .. }
            | Self::Splat { span, .. }
            | Self::Function { span, .. }
            | Self::ObjectLiteral { span, .. }
            | Self::If { span, .. }
            | Self::Loop { span, .. }
            | Self::For { span, .. }
            | Self::PostfixFor { span, .. }
            | Self::Return { span, .. } => *span,
            Self::Identifier(id) => id.span,
        }
    }

    /// Returns `true` for expressions that may be assigned to or used as a
    /// `for` iteration variable: an identifier, or `@name` access.
    #[must_use]
    pub fn is_left_hand_value(&self) -> bool {
        match self {
            Self::Identifier(_) => true,
            Self::PropertyAccess { target, .. } => matches!(**target, Self::This { .. }),
            _ => false,
        }
    }
}
