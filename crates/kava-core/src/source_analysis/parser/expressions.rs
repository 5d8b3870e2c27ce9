// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Expression parsing for Kava.
//!
//! This module contains all expression parsing methods extracted from the
//! main `Parser` implementation:
//!
//! - Assignments, with the implicit-block descent onto a new line
//! - Pratt parsing of binary operators, including postfix `if`/`unless`
//! - Prefix and postfix unary operators, with the whitespace rule that
//!   separates `foo -2` (a call) from `foo - 2` (a subtraction)
//! - Function calls: explicit argument lists, implicit (parenthesis-less)
//!   argument lists with their continuation-indent rules, and the
//!   cooperative rewind that turns a failed `(…)` call target back into a
//!   parenthesized expression
//! - Object literals, bracketed and unbracketed
//! - Conditionals, loops, `for` comprehensions, and function literals

use crate::ast::{
    Block, ConditionalKind, ElsePart, Expression, ForClause, FunctionParam, Identifier, IterKind,
    LoopKind, ObjectProperty,
};
use crate::source_analysis::{ParseError, ParseErrorKind, Span, Token, TokenKind};

use super::{ExprState, ParseResult, Parser, operator_priority};

impl Parser {
    // ========================================================================
    // Expressions
    // ========================================================================

    /// Parses any expression, or `None` if nothing expression-like starts at
    /// the cursor.
    ///
    /// Wraps its body in `stacker::maybe_grow` so deeply nested input extends
    /// the stack on the heap instead of overflowing it.
    pub(super) fn parse_expression(&mut self, st: ExprState) -> ParseResult<Option<Expression>> {
        stacker::maybe_grow(32 * 1024, 256 * 1024, || {
            if self.assignment_ahead() {
                return self.parse_assignment(st).map(Some);
            }
            let Some(mut expr) = self.parse_binary(0, st)? else {
                return Ok(None);
            };
            // Postfix comprehensions chain: `x for x in xs for xs in list`.
            if !st.implicit_fcall_arg {
                while self.view.peek_kind() == Some(TokenKind::For) {
                    let clause = self.parse_for_clause()?;
                    let span = expr.span().merge(clause.span);
                    expr = Expression::PostfixFor {
                        inner: Box::new(expr),
                        clause,
                        span,
                    };
                }
            }
            Ok(Some(expr))
        })
    }

    /// Parses an expression or fails with an `ExpectedToken` error.
    pub(super) fn parse_expression_required(&mut self, st: ExprState) -> ParseResult<Expression> {
        match self.parse_expression(st)? {
            Some(expr) => Ok(expr),
            None => Err(self.expected("an expression")),
        }
    }

    // ========================================================================
    // Assignment
    // ========================================================================

    /// Same-line lookahead for `target OP …` without consuming anything.
    fn assignment_ahead(&self) -> bool {
        let kind_at = |n: usize| self.view.peek_nth(n).map(Token::kind);
        match self.view.peek_kind() {
            Some(TokenKind::Identifier) => kind_at(1) == Some(TokenKind::AssignOp),
            Some(TokenKind::ShortThis) => {
                kind_at(1) == Some(TokenKind::Identifier) && kind_at(2) == Some(TokenKind::AssignOp)
            }
            Some(TokenKind::LongThis) => {
                kind_at(1) == Some(TokenKind::Dot)
                    && kind_at(2) == Some(TokenKind::Identifier)
                    && kind_at(3) == Some(TokenKind::AssignOp)
            }
            _ => false,
        }
    }

    /// Parses `target OP value`, committed (the lookahead already matched).
    ///
    /// If the value starts on a new line, the landed indent is recorded as
    /// the implicit-block floor, which is what lets an unbracketed object
    /// literal span the following lines. The value parse recurses through
    /// `parse_expression`, so chained assignment is right-associative.
    fn parse_assignment(&mut self, st: ExprState) -> ParseResult<Expression> {
        let target = self.parse_left_hand_value()?;
        let op = self.expect_kind(TokenKind::AssignOp, "an assignment operator")?;
        let mut value_state = ExprState {
            expr_indent: st.expr_indent,
            implicit_fcall_arg: st.implicit_fcall_arg,
        };
        if self.view.peek_newline() {
            let indent = self.move_to_next_line(false)?;
            value_state.expr_indent = Some(indent);
        }
        let value = match self.try_parse_object_literal(value_state)? {
            Some(object) => object,
            None => self.parse_expression_required(value_state)?,
        };
        let span = target.span().merge(value.span());
        Ok(Expression::Assign {
            target: Box::new(target),
            op: op.text().clone(),
            value: Box::new(value),
            span,
        })
    }

    /// Parses an assignable place: an identifier, `@name`, or `this.name`.
    pub(super) fn parse_left_hand_value(&mut self) -> ParseResult<Expression> {
        match self.view.peek_kind() {
            Some(TokenKind::Identifier) => {
                let token = self.take_known("an identifier")?;
                Ok(Expression::Identifier(Identifier::new(
                    token.text().clone(),
                    token.span(),
                )))
            }
            Some(TokenKind::ShortThis) => {
                let at = self.take_known("'@'")?;
                let member_token = self.expect_kind(TokenKind::Identifier, "a name after '@'")?;
                let member = Identifier::new(member_token.text().clone(), member_token.span());
                let span = at.span().merge(member.span);
                Ok(Expression::PropertyAccess {
                    target: Box::new(Expression::This {
                        text: at.text().clone(),
                        span: at.span(),
                    }),
                    member,
                    span,
                })
            }
            Some(TokenKind::LongThis) => {
                let this = self.take_known("'this'")?;
                self.expect_kind(TokenKind::Dot, "'.'")?;
                let member_token = self.expect_kind(TokenKind::Identifier, "a name")?;
                let member = Identifier::new(member_token.text().clone(), member_token.span());
                let span = this.span().merge(member.span);
                Ok(Expression::PropertyAccess {
                    target: Box::new(Expression::This {
                        text: this.text().clone(),
                        span: this.span(),
                    }),
                    member,
                    span,
                })
            }
            _ => Err(self.expected("an identifier")),
        }
    }

    // ========================================================================
    // Binary operators (Pratt)
    // ========================================================================

    /// Pratt parsing over the priority table in [`operator_priority`].
    ///
    /// `min_priority` is the threshold to continue: a looser operator ends
    /// this level and is handled by an outer call. Postfix `if`/`unless`
    /// participate at priority 1 unless an implicit call argument is being
    /// parsed (so `foo x if y` calls first and tests afterwards).
    pub(super) fn parse_binary(
        &mut self,
        min_priority: u8,
        st: ExprState,
    ) -> ParseResult<Option<Expression>> {
        let Some(mut left) = self.parse_unary(st)? else {
            return Ok(None);
        };
        loop {
            let Some(token) = self.view.peek() else { break };
            let priority = match token.kind() {
                TokenKind::Operator => match operator_priority(token.text()) {
                    Some(priority) => priority,
                    None => {
                        return Err(ParseError::new(
                            ParseErrorKind::PrecedenceError(token.text().clone()),
                            Some(token.span()),
                        ));
                    }
                },
                TokenKind::If | TokenKind::Unless if !st.implicit_fcall_arg => 1,
                _ => break,
            };
            if priority < min_priority {
                break;
            }
            let op = self.take_known("an operator")?;
            // The right operand may continue on a later line.
            if self.view.peek_newline() {
                self.move_to_next_line(false)?;
            }
            let Some(right) = self.parse_binary(priority + 1, st.without_indent())? else {
                return Err(self.expected("an expression"));
            };
            let span = left.span().merge(right.span());
            left = Expression::Binary {
                left: Box::new(left),
                op: op.text().clone(),
                right: Box::new(right),
                span,
            };
        }
        Ok(Some(left))
    }

    // ========================================================================
    // Unary operators
    // ========================================================================

    /// Parses prefix unary operators, a primary, and adjacent postfix
    /// `++`/`--`.
    ///
    /// Inside an implicit call argument a sign-like operator followed by
    /// whitespace is *not* unary — that keeps `a - b` a subtraction while
    /// `foo -2` stays a call with a negative argument.
    pub(super) fn parse_unary(&mut self, st: ExprState) -> ParseResult<Option<Expression>> {
        let is_prefix = self.view.peek().is_some_and(|t| {
            t.kind().is_unary_class()
                || (t.kind() == TokenKind::Operator && matches!(t.text().as_str(), "+" | "-"))
        });
        if is_prefix {
            let sign_like = self
                .view
                .peek()
                .is_some_and(|t| matches!(t.text().as_str(), "+" | "-" | "++" | "--"));
            if st.implicit_fcall_arg && sign_like && self.view.space_follows_peek() {
                return Ok(None);
            }
            let op = self.take_known("a unary operator")?;
            if self.view.peek_newline() {
                self.move_to_next_line(false)?;
            }
            let Some(inner) = self.parse_unary(st.without_indent())? else {
                return Err(self.expected("an expression"));
            };
            let span = op.span().merge(inner.span());
            return Ok(Some(Expression::PrefixUnary {
                op: op.text().clone(),
                inner: Box::new(inner),
                span,
            }));
        }

        let Some(mut expr) = self.parse_primary(st)? else {
            return Ok(None);
        };
        // Postfix `++`/`--` bind only when directly adjacent.
        while !self.view.peek_space() {
            let Some(token) = self.view.peek() else { break };
            if token.kind() == TokenKind::UnaryMath && matches!(token.text().as_str(), "++" | "--")
            {
                let op = self.take_known("an operator")?;
                let span = expr.span().merge(op.span());
                expr = Expression::PostfixUnary {
                    op: op.text().clone(),
                    inner: Box::new(expr),
                    span,
                };
            } else {
                break;
            }
        }
        Ok(Some(expr))
    }

    // ========================================================================
    // Primaries
    // ========================================================================

    fn parse_primary(&mut self, st: ExprState) -> ParseResult<Option<Expression>> {
        let Some(token) = self.view.peek() else {
            return Ok(None);
        };
        match token.kind() {
            TokenKind::Number => {
                let token = self.take_known("a number")?;
                Ok(Some(Expression::Number {
                    text: token.text().clone(),
                    span: token.span(),
                }))
            }
            TokenKind::String => {
                let token = self.take_known("a string")?;
                Ok(Some(Expression::StringLiteral {
                    text: token.text().clone(),
                    span: token.span(),
                }))
            }
            TokenKind::BuiltinPrimary => {
                let token = self.take_known("a literal")?;
                Ok(Some(Expression::BuiltinPrimary {
                    text: token.text().clone(),
                    span: token.span(),
                }))
            }
            TokenKind::Identifier | TokenKind::ShortThis | TokenKind::LongThis => {
                self.parse_call_chain(st)
            }
            TokenKind::LeftParen => {
                if let Some(function) = self.try_parse_function()? {
                    return Ok(Some(function));
                }
                self.parse_call_chain(st)
            }
            TokenKind::Func => {
                let arrow = self.take_known("'->'")?;
                self.parse_function_body(&arrow, Vec::new(), arrow.span())
                    .map(Some)
            }
            TokenKind::LeftBrace => self.parse_object_body(st, true).map(Some),
            TokenKind::If | TokenKind::Unless => self.parse_conditional(st),
            TokenKind::Loop | TokenKind::Until if !st.implicit_fcall_arg => {
                self.parse_loop().map(Some)
            }
            TokenKind::For if !st.implicit_fcall_arg => self.parse_for_statement().map(Some),
            _ => Ok(None),
        }
    }

    // ========================================================================
    // Function calls
    // ========================================================================

    /// Parses a call target and then folds argument lists around it:
    /// member access, explicit `( … )` lists (no space before the paren),
    /// and implicit lists (whitespace, then at least one argument). Each
    /// list wraps the current expression in a new call node, so
    /// `f(1) 2` is `(f(1))(2)`.
    fn parse_call_chain(&mut self, st: ExprState) -> ParseResult<Option<Expression>> {
        self.in_f_call += 1;
        let target = self.parse_call_target();
        self.in_f_call -= 1;
        let mut expr = match target? {
            Some(expr) => expr,
            None => {
                // The `(…)` call-target attempt rewound: re-parse the same
                // parens as a plain parenthesized expression, this time with
                // implicit calls enabled inside.
                if self.view.peek_kind() == Some(TokenKind::LeftParen) {
                    self.parse_parens_expression()?
                } else {
                    return Ok(None);
                }
            }
        };
        loop {
            match self.view.peek_kind() {
                Some(TokenKind::Dot) => {
                    self.view.take();
                    let member_token = self.expect_kind(TokenKind::Identifier, "a name after '.'")?;
                    let member = Identifier::new(member_token.text().clone(), member_token.span());
                    let span = expr.span().merge(member.span);
                    expr = Expression::PropertyAccess {
                        target: Box::new(expr),
                        member,
                        span,
                    };
                }
                Some(TokenKind::LeftParen) if !self.view.peek_space() => {
                    let (args, end) = self.parse_paren_args()?;
                    let span = expr.span().merge(end);
                    expr = Expression::FunctionCall {
                        target: Box::new(expr),
                        args,
                        span,
                    };
                }
                _ => {
                    // An implicit list needs whitespace before its first
                    // argument, and never begins while a call target is
                    // still being searched for.
                    if self.in_f_call == 0 && self.view.peek_space() {
                        if let Some(args) = self.try_parse_implicit_args()? {
                            let span = args
                                .last()
                                .map_or(expr.span(), |arg| expr.span().merge(arg.span()));
                            expr = Expression::FunctionCall {
                                target: Box::new(expr),
                                args,
                                span,
                            };
                            continue;
                        }
                    }
                    break;
                }
            }
        }
        Ok(Some(expr))
    }

    /// Parses a call target: an identifier, `@name`, `this`, or a
    /// parenthesized expression.
    ///
    /// The parenthesized attempt is speculative: if the inner expression
    /// does not reach a `)`, the parser rewinds to the opening paren and
    /// reports `None`, and the caller re-parses the group as an expression
    /// that may contain an implicit call — `(foo 1, 2)` becomes
    /// `(foo(1, 2))`.
    fn parse_call_target(&mut self) -> ParseResult<Option<Expression>> {
        match self.view.peek_kind() {
            Some(TokenKind::Identifier) => {
                let token = self.take_known("an identifier")?;
                Ok(Some(Expression::Identifier(Identifier::new(
                    token.text().clone(),
                    token.span(),
                ))))
            }
            Some(TokenKind::ShortThis) => {
                let at = self.take_known("'@'")?;
                let this = Expression::This {
                    text: at.text().clone(),
                    span: at.span(),
                };
                if !self.view.peek_space() && self.view.peek_kind() == Some(TokenKind::Identifier) {
                    let member_token = self.take_known("a name")?;
                    let member = Identifier::new(member_token.text().clone(), member_token.span());
                    let span = at.span().merge(member.span);
                    return Ok(Some(Expression::PropertyAccess {
                        target: Box::new(this),
                        member,
                        span,
                    }));
                }
                Ok(Some(this))
            }
            Some(TokenKind::LongThis) => {
                let token = self.take_known("'this'")?;
                Ok(Some(Expression::This {
                    text: token.text().clone(),
                    span: token.span(),
                }))
            }
            Some(TokenKind::LeftParen) => {
                let checkpoint = self.stash();
                let open = self.take_known("'('")?;
                self.in_parens += 1;
                if self.view.peek_newline() {
                    self.move_to_next_line(false)?;
                }
                let inner = self.parse_expression(ExprState::default())?;
                if let Some(inner) = inner {
                    if self.view.peek_kind() == Some(TokenKind::RightParen) {
                        let close = self.take_known("')'")?;
                        self.in_parens -= 1;
                        return Ok(Some(Expression::Parens {
                            inner: Box::new(inner),
                            span: open.span().merge(close.span()),
                        }));
                    }
                }
                self.restore(checkpoint);
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    /// Parses `( … )` as an expression, committed: a missing `)` is fatal.
    fn parse_parens_expression(&mut self) -> ParseResult<Expression> {
        let open = self.expect_kind(TokenKind::LeftParen, "'('")?;
        self.in_parens += 1;
        if self.view.peek_newline() {
            self.move_to_next_line(false)?;
        }
        let inner = self.parse_expression_required(ExprState::default())?;
        if self.view.peek_newline() {
            self.move_to_next_line(false)?;
        }
        let close = self.expect_kind(TokenKind::RightParen, "')'")?;
        self.in_parens -= 1;
        Ok(Expression::Parens {
            inner: Box::new(inner),
            span: open.span().merge(close.span()),
        })
    }

    /// Parses an explicit argument list; the cursor is at the `(`.
    /// Newlines are permitted after the paren, around commas, and before
    /// the close.
    fn parse_paren_args(&mut self) -> ParseResult<(Vec<Expression>, Span)> {
        let open = self.expect_kind(TokenKind::LeftParen, "'('")?;
        self.in_parens += 1;
        if self.view.peek_newline() {
            self.move_to_next_line(false)?;
        }
        let mut args = Vec::new();
        if self.view.peek_kind() != Some(TokenKind::RightParen) {
            loop {
                let Some(arg) = self.parse_arg(ExprState::default())? else {
                    return Err(self.expected("an expression"));
                };
                args.push(arg);
                if self.view.peek_newline() {
                    self.move_to_next_line(false)?;
                }
                if self.view.peek_kind() == Some(TokenKind::Comma) {
                    self.view.take();
                    if self.view.peek_newline() {
                        self.move_to_next_line(false)?;
                    }
                    continue;
                }
                break;
            }
        }
        let close = self.expect_kind(TokenKind::RightParen, "')'")?;
        self.in_parens -= 1;
        Ok((args, open.span().merge(close.span())))
    }

    /// Parses one argument: an unbracketed object literal or an expression,
    /// with an optional trailing `...` splat.
    fn parse_arg(&mut self, st: ExprState) -> ParseResult<Option<Expression>> {
        let expr = match self.try_parse_object_literal(st)? {
            Some(object) => object,
            None => match self.parse_expression(st)? {
                Some(expr) => expr,
                None => return Ok(None),
            },
        };
        if self.view.peek_kind() == Some(TokenKind::Ellipsis) {
            let dots = self.take_known("'...'")?;
            let span = expr.span().merge(dots.span());
            return Ok(Some(Expression::Splat {
                inner: Box::new(expr),
                span,
            }));
        }
        Ok(Some(expr))
    }

    /// Speculatively parses an implicit argument list.
    ///
    /// Fails softly (restoring the snapshot) when no first argument parses.
    /// After the first argument, a comma continues the list; a comma may
    /// also open the next line, subject to the continuation rules: the line
    /// must land deeper than the enclosing block, and once a continuation
    /// column is established, deeper still. After a comma, the next line
    /// must land at or beyond the block indent or the list is malformed.
    fn try_parse_implicit_args(&mut self) -> ParseResult<Option<Vec<Expression>>> {
        let checkpoint = self.stash();
        let st = ExprState {
            expr_indent: None,
            implicit_fcall_arg: true,
        };
        let Some(first) = self.parse_arg(st)? else {
            self.restore(checkpoint);
            return Ok(None);
        };
        let mut args = vec![first];
        let block_indent = self.indents.current();
        let mut list_indent: Option<usize> = None;
        loop {
            match self.view.peek_kind() {
                Some(TokenKind::Comma) => {
                    self.view.take();
                }
                Some(TokenKind::Newline) => {
                    let line_checkpoint = self.stash();
                    let indent = self.move_to_next_line(true)?;
                    let deep_enough =
                        indent > block_indent && list_indent.is_none_or(|limit| indent > limit);
                    if self.eof
                        || !deep_enough
                        || self.view.peek_kind() != Some(TokenKind::Comma)
                    {
                        self.restore(line_checkpoint);
                        break;
                    }
                    if list_indent.is_none() {
                        list_indent = Some(indent);
                    }
                    self.view.take();
                }
                _ => break,
            }
            if self.view.peek_newline() {
                let indent = self.move_to_next_line(true)?;
                if !self.eof && indent < block_indent {
                    return Err(self.indent_error("missing indentation"));
                }
                if list_indent.is_none() && indent > block_indent {
                    list_indent = Some(indent);
                }
            }
            let Some(arg) = self.parse_arg(st)? else {
                return Err(self.expected("an expression after ','"));
            };
            args.push(arg);
        }
        Ok(Some(args))
    }

    // ========================================================================
    // Object literals
    // ========================================================================

    /// Same-line lookahead for `key :`.
    fn object_pair_ahead(&self) -> bool {
        self.view.peek().is_some_and(|t| t.kind().is_object_key())
            && self
                .view
                .peek_nth(1)
                .is_some_and(|t| t.kind() == TokenKind::Colon)
    }

    /// Speculatively parses an unbracketed object literal. Only called in
    /// the contexts that may start one: assignment right-hand sides, call
    /// arguments, and object values.
    pub(super) fn try_parse_object_literal(
        &mut self,
        st: ExprState,
    ) -> ParseResult<Option<Expression>> {
        if !self.object_pair_ahead() {
            return Ok(None);
        }
        self.parse_object_body(st, false).map(Some)
    }

    fn object_key(&mut self) -> ParseResult<Expression> {
        match self.view.peek_kind() {
            Some(TokenKind::Identifier) => {
                let token = self.take_known("a property key")?;
                Ok(Expression::Identifier(Identifier::new(
                    token.text().clone(),
                    token.span(),
                )))
            }
            Some(TokenKind::Number) => {
                let token = self.take_known("a property key")?;
                Ok(Expression::Number {
                    text: token.text().clone(),
                    span: token.span(),
                })
            }
            Some(TokenKind::String) => {
                let token = self.take_known("a property key")?;
                Ok(Expression::StringLiteral {
                    text: token.text().clone(),
                    span: token.span(),
                })
            }
            _ => Err(self.expected("a property key")),
        }
    }

    /// Parses an object literal body.
    ///
    /// The working indent (`last_indent`) starts at the implicit-block
    /// indent when one is set, else at the enclosing block indent, and is
    /// also the floor (`min_indent`). Keys on later lines must sit exactly
    /// at the working indent; a comma on its own line may pull the working
    /// indent back toward the floor. Violations are hard errors inside
    /// braces; outside braces they end the literal with the cursor rewound
    /// to before the offending line.
    fn parse_object_body(&mut self, st: ExprState, braced: bool) -> ParseResult<Expression> {
        let block_indent = self.indents.current();
        let mut last_indent = st.expr_indent.unwrap_or(block_indent);
        let min_indent = last_indent;
        // An inline literal (`a = b:1, c:2` on one line) separates pairs
        // with commas only; a bare newline ends it.
        let inline = !braced && st.expr_indent.is_none();
        let mut properties: Vec<ObjectProperty> = Vec::new();
        let mut start_span: Option<Span> = None;

        if braced {
            let open = self.expect_kind(TokenKind::LeftBrace, "'{'")?;
            start_span = Some(open.span());
            if self.view.peek_newline() {
                let indent = self.move_to_next_line(true)?;
                if self.eof {
                    return Err(self.expected("'}'"));
                }
                if indent < last_indent {
                    return Err(self.indent_error("missing indent"));
                }
                last_indent = indent;
            }
        }

        let end_span = 'pairs: loop {
            let key = self.object_key()?;
            if start_span.is_none() {
                start_span = Some(key.span());
            }
            self.expect_kind(TokenKind::Colon, "':'")?;

            let mut value_state = ExprState {
                expr_indent: None,
                implicit_fcall_arg: st.implicit_fcall_arg,
            };
            if self.view.peek_newline() {
                let indent = self.move_to_next_line(true)?;
                if self.eof || indent <= last_indent {
                    return Err(self.indent_error("missing indent"));
                }
                value_state.expr_indent = Some(indent);
            }
            let value = match self.try_parse_object_literal(value_state)? {
                Some(object) => object,
                None => self.parse_expression_required(value_state)?,
            };
            let pair_span = key.span().merge(value.span());
            properties.push(ObjectProperty {
                key,
                value,
                span: pair_span,
            });

            match self.view.peek_kind() {
                Some(TokenKind::RightBrace) if braced => {
                    let close = self.take_known("'}'")?;
                    break 'pairs close.span();
                }
                Some(TokenKind::Comma) => {
                    let checkpoint = self.stash();
                    self.view.take();
                    if self.view.peek_newline() {
                        let indent = self.move_to_next_line(true)?;
                        if self.eof || indent < min_indent {
                            if braced {
                                return Err(if self.eof {
                                    self.expected("'}'")
                                } else {
                                    self.indent_error("missing indent")
                                });
                            }
                            self.restore(checkpoint);
                            break 'pairs pair_span;
                        }
                        if indent < last_indent {
                            last_indent = indent;
                        }
                    }
                    if braced && self.view.peek_kind() == Some(TokenKind::RightBrace) {
                        let close = self.take_known("'}'")?;
                        break 'pairs close.span();
                    }
                    if !self.object_pair_ahead() {
                        if braced {
                            return Err(self.expected("a property key"));
                        }
                        self.restore(checkpoint);
                        break 'pairs pair_span;
                    }
                }
                Some(TokenKind::Newline) if inline => break 'pairs pair_span,
                Some(TokenKind::Newline) => {
                    let checkpoint = self.stash();
                    let indent = self.move_to_next_line(true)?;
                    if self.eof {
                        if braced {
                            return Err(self.expected("'}'"));
                        }
                        self.restore(checkpoint);
                        break 'pairs pair_span;
                    }
                    if braced && self.view.peek_kind() == Some(TokenKind::RightBrace) {
                        let close = self.take_known("'}'")?;
                        break 'pairs close.span();
                    }
                    if self.view.peek_kind() == Some(TokenKind::Comma) {
                        // A comma on its own line pulls the working indent
                        // back toward the floor.
                        if indent < min_indent {
                            if braced {
                                return Err(self.indent_error("missing indent"));
                            }
                            self.restore(checkpoint);
                            break 'pairs pair_span;
                        }
                        if indent < last_indent {
                            last_indent = indent;
                        }
                        self.view.take();
                        if self.view.peek_newline() {
                            let next = self.move_to_next_line(true)?;
                            if self.eof || next < min_indent {
                                if braced {
                                    return Err(self.indent_error("missing indent"));
                                }
                                self.restore(checkpoint);
                                break 'pairs pair_span;
                            }
                            if next < last_indent {
                                last_indent = next;
                            }
                        }
                        if !self.object_pair_ahead() {
                            if braced {
                                return Err(self.expected("a property key"));
                            }
                            self.restore(checkpoint);
                            break 'pairs pair_span;
                        }
                        continue 'pairs;
                    }
                    if indent == last_indent && self.object_pair_ahead() {
                        continue 'pairs;
                    }
                    if indent > last_indent {
                        return Err(self.indent_error("unexpected indent"));
                    }
                    if braced {
                        return Err(self.indent_error("missing indent"));
                    }
                    self.restore(checkpoint);
                    break 'pairs pair_span;
                }
                Some(_) => {
                    if braced {
                        return Err(self.expected("',' or '}'"));
                    }
                    break 'pairs pair_span;
                }
                None => {
                    if braced {
                        return Err(self.expected("'}'"));
                    }
                    break 'pairs pair_span;
                }
            }
        };

        let span = start_span.unwrap_or(end_span).merge(end_span);
        Ok(Expression::ObjectLiteral { properties, span })
    }

    // ========================================================================
    // Conditionals
    // ========================================================================

    /// Parses `if`/`unless` in statement-head form.
    ///
    /// When the body turns out empty while parsing an implicit call
    /// argument, the rule rewinds cleanly and reports `None`, so the
    /// keyword re-binds as a postfix operator (`foo if c` is `foo if c`,
    /// not a call with a broken conditional argument).
    fn parse_conditional(&mut self, st: ExprState) -> ParseResult<Option<Expression>> {
        let checkpoint = self.stash();
        let keyword = self.take_known("'if'")?;
        let kind = if keyword.kind() == TokenKind::Unless {
            ConditionalKind::Unless
        } else {
            ConditionalKind::If
        };
        let condition = self.parse_expression_required(ExprState::default())?;

        let then_block = match self.view.peek_kind() {
            Some(TokenKind::Then) => {
                self.view.take();
                self.parse_inline_block()?
            }
            Some(TokenKind::Newline) => self.parse_nested_block()?,
            None => Block::empty(self.indents.current(), Span::default()),
            Some(_) => {
                if st.implicit_fcall_arg {
                    self.restore(checkpoint);
                    return Ok(None);
                }
                return Err(self.expected("'then' or a newline"));
            }
        };
        if then_block.is_empty() {
            if st.implicit_fcall_arg {
                self.restore(checkpoint);
                return Ok(None);
            }
            return Err(self.empty_block(kind.keyword()));
        }

        let else_part = self.parse_else_arm()?;
        if else_part.is_some() {
            if let Some(extra) = self.take_else()? {
                return Err(self.unexpected(&extra));
            }
        }

        let mut span = keyword.span().merge(then_block.span);
        if let Some(else_part) = &else_part {
            span = span.merge(match else_part {
                ElsePart::Block(block) => block.span,
                ElsePart::If(expr) => expr.span(),
            });
        }
        Ok(Some(Expression::If {
            kind,
            condition: Box::new(condition),
            then_block,
            else_part: else_part.map(Box::new),
            span,
        }))
    }

    /// Takes an `else` that belongs to the conditional being parsed: either
    /// directly after the then-part, or at the enclosing block's indent on
    /// a following line.
    fn take_else(&mut self) -> ParseResult<Option<Token>> {
        if self.view.peek_kind() == Some(TokenKind::Else) {
            return Ok(Some(self.take_known("'else'")?));
        }
        if self.view.peek_newline() {
            let checkpoint = self.stash();
            let indent = self.move_to_next_line(true)?;
            if !self.eof
                && indent == self.indents.current()
                && self.view.peek_kind() == Some(TokenKind::Else)
            {
                return Ok(Some(self.take_known("'else'")?));
            }
            self.restore(checkpoint);
        }
        Ok(None)
    }

    fn parse_else_arm(&mut self) -> ParseResult<Option<ElsePart>> {
        if self.take_else()?.is_none() {
            return Ok(None);
        }
        match self.view.peek_kind() {
            Some(TokenKind::If | TokenKind::Unless) => {
                let Some(chained) = self.parse_conditional(ExprState::default())? else {
                    return Err(self.expected("a conditional after 'else'"));
                };
                Ok(Some(ElsePart::If(Box::new(chained))))
            }
            Some(TokenKind::Newline) => {
                let block = self.parse_nested_block()?;
                if block.is_empty() {
                    return Err(self.empty_block("else"));
                }
                Ok(Some(ElsePart::Block(block)))
            }
            None => Err(self.empty_block("else")),
            Some(_) => {
                let block = self.parse_inline_block()?;
                if block.is_empty() {
                    return Err(self.empty_block("else"));
                }
                Ok(Some(ElsePart::Block(block)))
            }
        }
    }

    // ========================================================================
    // Loops and comprehensions
    // ========================================================================

    /// Parses a body in `then` form, block form, or directly on the same
    /// line.
    fn parse_construct_body(&mut self) -> ParseResult<Block> {
        match self.view.peek_kind() {
            Some(TokenKind::Then) => {
                self.view.take();
                self.parse_inline_block()
            }
            Some(TokenKind::Newline) => self.parse_nested_block(),
            None => Ok(Block::empty(self.indents.current(), Span::default())),
            Some(_) => self.parse_inline_block(),
        }
    }

    /// Parses `loop body` or `until cond body`.
    fn parse_loop(&mut self) -> ParseResult<Expression> {
        let keyword = self.take_known("'loop'")?;
        let kind = if keyword.kind() == TokenKind::Until {
            LoopKind::Until
        } else {
            LoopKind::Loop
        };
        let condition = match kind {
            LoopKind::Until => Some(Box::new(self.parse_expression_required(ExprState::default())?)),
            LoopKind::Loop => None,
        };
        let body = self.parse_construct_body()?;
        if body.is_empty() {
            return Err(self.empty_block(match kind {
                LoopKind::Loop => "loop",
                LoopKind::Until => "until",
            }));
        }
        let span = keyword.span().merge(body.span);
        Ok(Expression::Loop {
            kind,
            condition,
            body,
            span,
        })
    }

    /// Parses a `for` in statement form (header plus body).
    fn parse_for_statement(&mut self) -> ParseResult<Expression> {
        let clause = self.parse_for_clause()?;
        let body = self.parse_construct_body()?;
        if body.is_empty() {
            return Err(self.empty_block("for"));
        }
        let span = clause.span.merge(body.span);
        Ok(Expression::For { clause, body, span })
    }

    /// Parses a `for` header: `for iter1 [, iter2] (in|of) iterable`.
    ///
    /// The iterable is parsed at the binary level so a following `for`
    /// keyword chains comprehensions instead of nesting into the iterable.
    pub(super) fn parse_for_clause(&mut self) -> ParseResult<ForClause> {
        let keyword = self.expect_kind(TokenKind::For, "'for'")?;
        let iter1 = self.parse_left_hand_value()?;
        let iter2 = if self.view.peek_kind() == Some(TokenKind::Comma) {
            self.view.take();
            Some(Box::new(self.parse_left_hand_value()?))
        } else {
            None
        };
        let iter_kind = match self.view.peek_kind() {
            Some(TokenKind::In) => {
                self.view.take();
                IterKind::In
            }
            Some(TokenKind::Of) => {
                self.view.take();
                IterKind::Of
            }
            _ => return Err(self.expected("'in' or 'of'")),
        };
        let Some(iterable) = self.parse_binary(0, ExprState::default())? else {
            return Err(self.expected("an expression to iterate"));
        };
        let span = keyword.span().merge(iterable.span());
        Ok(ForClause {
            iter1: Box::new(iter1),
            iter2,
            iter_kind,
            iterable: Box::new(iterable),
            span,
        })
    }

    // ========================================================================
    // Function literals
    // ========================================================================

    /// Speculatively parses `( params? ) ("->"|"=>") body?`; the cursor is
    /// at the `(`. Rewinds and reports `None` when the parameter list or the
    /// arrow fails to materialize — the parens then mean grouping or a call.
    fn try_parse_function(&mut self) -> ParseResult<Option<Expression>> {
        let checkpoint = self.stash();
        let open = self.expect_kind(TokenKind::LeftParen, "'('")?;
        let mut params: Vec<FunctionParam> = Vec::new();
        if self.view.peek_kind() == Some(TokenKind::RightParen) {
            self.view.take();
        } else {
            loop {
                if self.view.peek_kind() != Some(TokenKind::Identifier) {
                    self.restore(checkpoint);
                    return Ok(None);
                }
                let name_token = self.take_known("a parameter name")?;
                let name = Identifier::new(name_token.text().clone(), name_token.span());
                let mut param = FunctionParam::new(name);
                if self.view.peek_kind() == Some(TokenKind::Ellipsis) {
                    let dots = self.take_known("'...'")?;
                    param.splat = true;
                    param.span = param.span.merge(dots.span());
                } else if self
                    .view
                    .peek()
                    .is_some_and(|t| t.kind() == TokenKind::AssignOp && t.is("="))
                {
                    self.view.take();
                    let default = self.parse_expression_required(ExprState::default())?;
                    param.span = param.span.merge(default.span());
                    param.default_value = Some(default);
                }
                params.push(param);
                match self.view.peek_kind() {
                    Some(TokenKind::Comma) => {
                        self.view.take();
                    }
                    Some(TokenKind::RightParen) => {
                        self.view.take();
                        break;
                    }
                    _ => {
                        self.restore(checkpoint);
                        return Ok(None);
                    }
                }
            }
        }
        if self.view.peek_kind() != Some(TokenKind::Func) {
            self.restore(checkpoint);
            return Ok(None);
        }
        let arrow = self.take_known("'->'")?;
        self.parse_function_body(&arrow, params, open.span()).map(Some)
    }

    /// Parses a function body after the arrow. An immediate end of input or
    /// de-indent yields an empty block, which is legal for functions.
    fn parse_function_body(
        &mut self,
        arrow: &Token,
        params: Vec<FunctionParam>,
        start: Span,
    ) -> ParseResult<Expression> {
        let binds_this = arrow.is("=>");
        let body = match self.view.peek_kind() {
            None => Block::empty(self.indents.current(), Span::default()),
            Some(TokenKind::Newline) => self.parse_nested_block()?,
            Some(_) => self.parse_inline_block()?,
        };
        let mut span = start.merge(arrow.span());
        if !body.is_empty() {
            span = span.merge(body.span);
        }
        Ok(Expression::Function {
            params,
            body,
            binds_this,
            span,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::Expression;
    use crate::source_analysis::{ParseErrorKind, Parser, scan};
    use crate::unparse::emit_common;

    fn parse_ok(source: &str) -> crate::ast::Block {
        Parser::new(scan(source).unwrap()).parse().unwrap()
    }

    fn parse_err(source: &str) -> crate::source_analysis::ParseError {
        Parser::new(scan(source).unwrap()).parse().unwrap_err()
    }

    fn common(source: &str) -> String {
        emit_common(&parse_ok(source))
    }

    // --- calls ---

    #[test]
    fn explicit_call_chain() {
        assert_eq!(common("foo(1, 2)"), "foo(1,2)");
        assert_eq!(common("foo()"), "foo()");
        assert_eq!(common("foo(1)(2)"), "foo(1)(2)");
    }

    #[test]
    fn implicit_call_basics() {
        assert_eq!(common("foo 1, 2"), "foo(1,2)");
        assert_eq!(common("foo bar, baz 2"), "foo(bar,baz(2))");
    }

    #[test]
    fn implicit_call_target_rule() {
        // Identifier, `@name`, and parenthesized targets accept a signed
        // argument; a number never does.
        assert_eq!(common("foo -2"), "foo(-2)");
        assert_eq!(common("@go -2"), "@go(-2)");
        assert_eq!(common("(1) +2"), "(1)(+2)");
        assert_eq!(common("1 +2"), "1 + 2");
        assert_eq!(common("1 -2"), "1 - 2");
        assert_eq!(common("foo - 2"), "foo - 2");
        assert_eq!(common("foo-2"), "foo - 2");
    }

    #[test]
    fn spaced_paren_is_an_implicit_argument() {
        assert_eq!(common("foo (2)"), "foo((2))");
        assert_eq!(common("foo(2)"), "foo(2)");
    }

    #[test]
    fn parenthesized_implicit_call_rewind() {
        assert_eq!(common("(foo 1, 2)"), "(foo(1,2))");
        assert_eq!(common("(foo 1, 2) * 3"), "(foo(1,2)) * 3");
        assert_eq!(common("(bar baz) 2"), "(bar(baz))(2)");
    }

    #[test]
    fn unmatched_close_paren_is_fatal() {
        let err = parse_err("(a b");
        assert!(matches!(err.kind, ParseErrorKind::ExpectedToken { .. }));
    }

    #[test]
    fn paren_args_span_lines() {
        assert_eq!(common("foo(\n  1,\n  2\n)"), "foo(1,2)");
    }

    #[test]
    fn implicit_args_continue_after_comma_lines() {
        assert_eq!(common("foo 1,\n  2,\n  3"), "foo(1,2,3)");
    }

    #[test]
    fn implicit_args_stop_at_shallow_lines() {
        // The second line is not deeper than the block, so the list ends and
        // the parser resumes at the newline.
        let block = parse_ok("foo 1\nbar 2");
        assert_eq!(block.expressions.len(), 2);
    }

    #[test]
    fn implicit_args_missing_indent_after_comma() {
        let err = parse_err("f = () ->\n  foo 1,\nbar");
        assert!(matches!(err.kind, ParseErrorKind::IndentError(_)));
    }

    #[test]
    fn splat_arguments() {
        assert_eq!(common("foo(xs...)"), "foo(xs...)");
        assert_eq!(common("foo xs..."), "foo(xs...)");
        assert_eq!(common("foo(1, rest...)"), "foo(1,rest...)");
    }

    #[test]
    fn member_access_chains() {
        assert_eq!(common("a.b.c"), "a.b.c");
        assert_eq!(common("a.b(1).c 2"), "a.b(1).c(2)");
        assert_eq!(common("@name"), "@name");
        assert_eq!(common("this.name"), "this.name");
        assert_eq!(common("@"), "@");
    }

    // --- unary / binary ---

    #[test]
    fn unary_operators() {
        assert_eq!(common("-2"), "-2");
        assert_eq!(common("not ready"), "not ready");
        assert_eq!(common("!done"), "!done");
        assert_eq!(common("~bits"), "~bits");
        assert_eq!(common("++i"), "++i");
        assert_eq!(common("i++"), "i++");
        assert_eq!(common("i--"), "i--");
    }

    #[test]
    fn postfix_requires_adjacency() {
        // With a space, `++` is neither postfix nor binary.
        assert!(Parser::new(scan("a ++ b").unwrap()).parse().is_err());
    }

    #[test]
    fn unary_operand_may_follow_on_next_line() {
        assert_eq!(common("-\n  2"), "-2");
    }

    #[test]
    fn comparison_and_word_operators() {
        assert_eq!(common("a is b"), "a is b");
        assert_eq!(common("a isnt b"), "a isnt b");
        assert_eq!(common("a == b != c"), "a == b != c");
    }

    #[test]
    fn bitwise_and_shift_priorities() {
        // `|` below comparisons, shifts between additive and multiplicative.
        let block = parse_ok("a | b < c");
        let Expression::Binary { op, .. } = &block.expressions[0] else {
            panic!("expected binary");
        };
        assert_eq!(op, "|");

        let block = parse_ok("a + b << c * d");
        let Expression::Binary { op, left, right, .. } = &block.expressions[0] else {
            panic!("expected binary");
        };
        assert_eq!(op, "+");
        assert!(matches!(**left, Expression::Identifier(_)));
        let Expression::Binary { op: shift_op, .. } = &**right else {
            panic!("expected shift on the right");
        };
        assert_eq!(shift_op, "<<");
    }

    #[test]
    fn binary_operand_may_follow_on_next_line() {
        assert_eq!(common("1 +\n  2"), "1 + 2");
    }

    // --- assignment ---

    #[test]
    fn assignment_forms() {
        assert_eq!(common("a = 1"), "a = 1");
        assert_eq!(common("a += 1"), "a += 1");
        assert_eq!(common("@count = 0"), "@count = 0");
        assert_eq!(common("this.count = 0"), "this.count = 0");
    }

    #[test]
    fn chained_assignment_is_right_associative() {
        let block = parse_ok("a = b = 1");
        let Expression::Assign { value, .. } = &block.expressions[0] else {
            panic!("expected assignment");
        };
        assert!(matches!(**value, Expression::Assign { .. }));
    }

    #[test]
    fn assignment_value_on_next_line() {
        assert_eq!(common("a =\n  1 + 2"), "a = 1 + 2");
    }

    #[test]
    fn assignment_value_dedent_is_an_error() {
        let err = parse_err("f = () ->\n  a =\nb");
        assert!(matches!(err.kind, ParseErrorKind::IndentError(_)));
    }

    // --- object literals ---

    #[test]
    fn braced_object_literals() {
        assert_eq!(common("a = {b: 1, c: 2}"), "a = {b: 1, c: 2}");
        assert_eq!(common("a = {\n  b: 1\n  c: 2\n}"), "a = {b: 1, c: 2}");
        assert_eq!(common("a = {b: 1,}"), "a = {b: 1}");
        assert_eq!(common("a = {\"s\": 1, 2: x}"), "a = {\"s\": 1, 2: x}");
    }

    #[test]
    fn empty_braces_are_rejected() {
        let err = parse_err("a = {}");
        assert!(matches!(err.kind, ParseErrorKind::ExpectedToken { .. }));
    }

    #[test]
    fn inline_unbracketed_object() {
        assert_eq!(common("a = b:1, c:2"), "a = {b: 1, c: 2}");
        // A newline without a comma ends the inline form.
        let block = parse_ok("a = b:1\nc()");
        assert_eq!(block.expressions.len(), 2);
    }

    #[test]
    fn unbracketed_object_as_argument() {
        assert_eq!(common("foo a:1, b:2"), "foo({a: 1, b: 2})");
        assert_eq!(common("foo(a:1, b:2)"), "foo({a: 1, b: 2})");
        // A trailing non-pair argument ends the object, not the call.
        assert_eq!(common("foo(a:1, 2)"), "foo({a: 1},2)");
    }

    #[test]
    fn multiline_unbracketed_object() {
        assert_eq!(
            common("a =\n  b: 1\n  c: 2"),
            "a = {b: 1, c: 2}"
        );
    }

    #[test]
    fn nested_unbracketed_object_values() {
        assert_eq!(
            common("a =\n  hello:\n    world: 2"),
            "a = {hello: {world: 2}}"
        );
    }

    #[test]
    fn object_key_deeper_than_working_indent_is_an_error() {
        let err = parse_err("a =\n  b: 1\n    c: 2");
        assert!(matches!(err.kind, ParseErrorKind::IndentError(_)));
    }

    #[test]
    fn object_value_must_outdent_the_key() {
        let err = parse_err("a =\n  b:\n  1");
        assert!(matches!(err.kind, ParseErrorKind::IndentError(_)));
    }

    #[test]
    fn comma_on_its_own_line_pulls_indent_back() {
        // The first key establishes the working indent; a shallower comma
        // line is legal inside braces and lowers it.
        assert_eq!(
            common("x = {\n    b: 1\n  , c: 2\n  }"),
            "x = {b: 1, c: 2}"
        );
    }

    #[test]
    fn comma_below_the_floor_ends_an_unbracketed_literal() {
        let err = parse_err("f = () ->\n  a =\n    b: 1\n, c: 2");
        assert!(matches!(err.kind, ParseErrorKind::ExpectedToken { .. }));
    }

    #[test]
    fn braced_object_missing_close_is_fatal() {
        let err = parse_err("a = {b: 1");
        assert!(matches!(err.kind, ParseErrorKind::ExpectedToken { .. }));
    }

    // --- functions ---

    #[test]
    fn function_literals() {
        assert_eq!(common("f = (a, b) -> a + b"), "f = (a, b) -> {a + b}");
        assert_eq!(common("f = () -> 1"), "f = () -> {1}");
        assert_eq!(common("f = -> 1"), "f = () -> {1}");
        assert_eq!(common("f = () =>\n  @x"), "f = () => {@x}");
    }

    #[test]
    fn function_params_defaults_and_splats() {
        assert_eq!(
            common("f = (a, b = 2, rest...) -> a"),
            "f = (a, b = 2, rest...) -> {a}"
        );
    }

    #[test]
    fn empty_function_body_is_legal() {
        assert_eq!(common("f = () ->"), "f = () -> {}");
        let block = parse_ok("f = () ->\ng()");
        assert_eq!(block.expressions.len(), 2);
    }

    #[test]
    fn immediately_invoked_function() {
        assert_eq!(common("((x) -> x)(2)"), "((x) -> {x})(2)");
    }

    #[test]
    fn parens_that_are_not_params_stay_expressions() {
        assert_eq!(common("(a)"), "(a)");
        assert_eq!(common("(a) + 2"), "(a) + 2");
        assert_eq!(common("(a) +2"), "(a)(+2)");
    }

    // --- conditionals in expression positions ---

    #[test]
    fn conditional_as_paren_expression() {
        assert_eq!(common("x = (if a then b else c)"), "x = (if (a) { b } else { c })");
    }

    #[test]
    fn postfix_if_does_not_bind_into_implicit_args() {
        assert_eq!(common("foo x if y"), "foo(x) if y");
        assert_eq!(common("foo x, y if c"), "foo(x,y) if c");
        assert_eq!(common("foo x unless c"), "foo(x) unless c");
    }

    #[test]
    fn conditional_argument_with_then_is_a_real_argument() {
        assert_eq!(common("foo if c then d"), "foo(if (c) { d })");
    }

    #[test]
    fn postfix_for_suppressed_in_implicit_args() {
        assert_eq!(common("foo x for x in arr"), "foo(x) for x in arr");
    }

    // --- return ---

    #[test]
    fn return_inside_parens() {
        assert_eq!(common("f = () -> return 1"), "f = () -> {return 1}");
    }
}
