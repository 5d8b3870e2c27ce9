// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Recursive descent parser for Kava source code.
//!
//! The parser drives a [`TokenView`] over the scanned token stream and
//! builds the AST bottom-up. Two things make the grammar interesting:
//!
//! - **Significant indentation.** The scanner emits newlines and whitespace
//!   as tokens; the parser crosses line boundaries only through
//!   [`Parser::move_to_next_line`], which computes the landing column and
//!   checks it against the stack of active block indents.
//! - **Cooperative backtracking.** Implicit (parenthesis-less) calls,
//!   unbracketed object literals, and function literals are ambiguous with
//!   plain expressions. Speculative rules snapshot the parser, try, and on a
//!   soft failure restore the snapshot and report `None`; only rules past a
//!   commit point raise hard errors.
//!
//! # Binary Operator Precedence (Pratt Parsing)
//!
//! Binary expressions use a priority table — higher binds tighter:
//!
//! | Priority | Operators |
//! |----------|-----------|
//! | 1   | postfix `if`, `unless` |
//! | 4   | `\|` |
//! | 6   | `^` |
//! | 8   | `&` |
//! | 10  | `is` `isnt` `==` `!=` `>=` `<=` `>` `<` |
//! | 50  | `+` `-` |
//! | 75  | `<<` `>>` `>>>` |
//! | 100 | `*` `/` |
//!
//! # Usage
//!
//! ```
//! use kava_core::source_analysis::{Parser, scan};
//!
//! let tokens = scan("x = 3 + 4").unwrap();
//! let block = Parser::new(tokens).parse().unwrap();
//! assert_eq!(block.expressions.len(), 1);
//! ```

use ecow::eco_format;
use tracing::trace;

use crate::ast::{Block, Expression};
use crate::source_analysis::view::ViewCheckpoint;
use crate::source_analysis::{ParseError, ParseErrorKind, Span, Token, TokenKind, TokenView};

mod expressions;

#[cfg(test)]
mod property_tests;

pub(crate) type ParseResult<T> = Result<T, ParseError>;

/// Priority of a binary operator; higher binds tighter.
///
/// Returns `None` for spellings outside the table; the expression parser
/// turns that into a [`ParseErrorKind::PrecedenceError`]. With the current
/// scanner every `Operator` spelling is covered, so the error arm is a
/// defensive backstop for future operators.
pub(super) fn operator_priority(op: &str) -> Option<u8> {
    match op {
        "if" | "unless" => Some(1),
        "|" => Some(4),
        "^" => Some(6),
        "&" => Some(8),
        "is" | "isnt" | "==" | "!=" | ">=" | "<=" | ">" | "<" => Some(10),
        "+" | "-" => Some(50),
        "<<" | ">>" | ">>>" => Some(75),
        "*" | "/" => Some(100),
        _ => None,
    }
}

/// The stack of active block indentation columns.
///
/// A block pushes its indent on entry and pops on exit. Speculation clones
/// the whole stack into the snapshot, so a failed rule that pushed a frame
/// rolls it back with everything else.
#[derive(Debug, Clone, Default)]
pub(super) struct IndentTracker {
    stack: Vec<usize>,
}

impl IndentTracker {
    /// The innermost active block indent; zero before the root block opens.
    fn current(&self) -> usize {
        self.stack.last().copied().unwrap_or(0)
    }

    fn push(&mut self, indent: usize) {
        self.stack.push(indent);
    }

    fn pop(&mut self) {
        self.stack.pop();
    }
}

/// Rule-local state threaded through the expression rules.
///
/// `expr_indent` is set when an outer construct (assignment right-hand side,
/// object value) has just opened an implicit block by descending to a new
/// line; it becomes the indentation floor for an unbracketed object literal.
/// `implicit_fcall_arg` is set while parsing the arguments of an implicit
/// call and tightens several rules (postfix `if`/`unless` and postfix `for`
/// are not consumed; a sign operator followed by whitespace is not unary).
#[derive(Debug, Clone, Copy, Default)]
pub(super) struct ExprState {
    pub(super) expr_indent: Option<usize>,
    pub(super) implicit_fcall_arg: bool,
}

impl ExprState {
    /// The same state with the implicit-block indent cleared; used when
    /// recursing past the position the indent was recorded for.
    pub(super) fn without_indent(self) -> Self {
        Self {
            expr_indent: None,
            ..self
        }
    }
}

/// A full parser snapshot, restored atomically on speculative failure.
#[derive(Debug, Clone)]
pub(super) struct ParserCheckpoint {
    view: ViewCheckpoint,
    in_f_call: u32,
    in_parens: u32,
    indent_stack: Vec<usize>,
    eof: bool,
}

/// The parser state.
pub struct Parser {
    pub(super) view: TokenView,
    /// Nonzero while searching for a function-call target; enables the
    /// parenthesized-implicit-call rewind and suppresses implicit argument
    /// lists during the search.
    pub(super) in_f_call: u32,
    /// Nonzero inside `( … )`; lets blocks terminate at `)`.
    pub(super) in_parens: u32,
    pub(super) indents: IndentTracker,
    /// Set when a line-crossing walks off the end of the input.
    pub(super) eof: bool,
}

impl Parser {
    /// Creates a parser over a scanned token vector.
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            view: TokenView::new(tokens),
            in_f_call: 0,
            in_parens: 0,
            indents: IndentTracker::default(),
            eof: false,
        }
    }

    /// Re-initializes the parser over a new token vector.
    pub fn reset(&mut self, tokens: Vec<Token>) {
        *self = Self::new(tokens);
    }

    /// Parses the token stream into the root block.
    ///
    /// # Errors
    ///
    /// Returns the first hard [`ParseError`]: an unexpected or missing
    /// token, an indentation violation, an empty body on a construct that
    /// requires one, or leftover input after a complete parse.
    pub fn parse(&mut self) -> Result<Block, ParseError> {
        let indent = self.move_to_next_line(true)?;
        if self.eof {
            return Ok(Block::empty(indent, Span::default()));
        }
        let block = self.parse_block_body(indent, true)?;
        if let Some(leftover) = self.view.peek_through_newlines() {
            return Err(ParseError::new(
                ParseErrorKind::Leftover(eco_format!("{leftover}")),
                Some(leftover.span()),
            ));
        }
        trace!(statements = block.expressions.len(), "parsed root block");
        Ok(block)
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    pub(super) fn stash(&self) -> ParserCheckpoint {
        ParserCheckpoint {
            view: self.view.stash(),
            in_f_call: self.in_f_call,
            in_parens: self.in_parens,
            indent_stack: self.indents.stack.clone(),
            eof: self.eof,
        }
    }

    pub(super) fn restore(&mut self, checkpoint: ParserCheckpoint) {
        self.view.restore(checkpoint.view);
        self.in_f_call = checkpoint.in_f_call;
        self.in_parens = checkpoint.in_parens;
        self.indents.stack = checkpoint.indent_stack;
        self.eof = checkpoint.eof;
    }

    // ========================================================================
    // Error construction
    // ========================================================================

    pub(super) fn unexpected(&self, token: &Token) -> ParseError {
        ParseError::new(
            ParseErrorKind::UnexpectedToken(eco_format!("{token}")),
            Some(token.span()),
        )
    }

    pub(super) fn unexpected_after_expression(&self, token: &Token) -> ParseError {
        ParseError::new(
            ParseErrorKind::UnexpectedToken(eco_format!("{token} after expression")),
            Some(token.span()),
        )
    }

    /// An `ExpectedToken` error naming what the rule needed and what the
    /// next significant token actually is.
    pub(super) fn expected(&self, what: &str) -> ParseError {
        let found = self.view.peek();
        ParseError::new(
            ParseErrorKind::ExpectedToken {
                expected: what.into(),
                found: found.map_or_else(|| "end of input".into(), |t| eco_format!("{t}")),
            },
            found.map(Token::span),
        )
    }

    pub(super) fn indent_error(&self, message: &str) -> ParseError {
        ParseError::new(
            ParseErrorKind::IndentError(message.into()),
            self.view.peek().map(Token::span),
        )
    }

    pub(super) fn empty_block(&self, construct: &str) -> ParseError {
        ParseError::new(
            ParseErrorKind::EmptyBlock(eco_format!("'{construct}'")),
            self.view.peek().map(Token::span),
        )
    }

    /// Takes the next token, which the caller has already peeked.
    pub(super) fn take_known(&mut self, what: &str) -> ParseResult<Token> {
        self.view.take().ok_or_else(|| self.expected(what))
    }

    /// Takes the next token if it has the given kind, or fails.
    pub(super) fn expect_kind(&mut self, kind: TokenKind, what: &str) -> ParseResult<Token> {
        if self.view.peek_kind() == Some(kind) {
            self.take_known(what)
        } else {
            Err(self.expected(what))
        }
    }

    // ========================================================================
    // Line crossing
    // ========================================================================

    /// Advances past newlines, whitespace, and comments to the first
    /// significant token of a later line, returning its column.
    ///
    /// Every newline resets the running count to zero; every whitespace run
    /// adds its length. With `in_block` the caller owns the indent decision
    /// (end of input sets `eof` and returns 0); without it, landing shallower
    /// than the innermost block indent is a hard "missing indent" error.
    pub(super) fn move_to_next_line(&mut self, in_block: bool) -> ParseResult<usize> {
        let mut indent = 0usize;
        loop {
            let Some(token) = self.view.raw() else {
                self.eof = true;
                if in_block {
                    return Ok(0);
                }
                break;
            };
            match token.kind() {
                TokenKind::Newline => {
                    indent = 0;
                    self.view.advance_raw();
                }
                TokenKind::Whitespace => {
                    indent += token.len();
                    self.view.advance_raw();
                }
                TokenKind::Comment | TokenKind::BlockStart | TokenKind::BlockEnd => {
                    self.view.advance_raw();
                }
                _ => break,
            }
        }
        if !in_block && indent < self.indents.current() {
            return Err(self.indent_error("missing indent"));
        }
        Ok(indent)
    }

    // ========================================================================
    // Blocks and statements
    // ========================================================================

    /// Parses a block whose first statement starts at the cursor, at the
    /// given indent.
    fn parse_block_body(&mut self, indent: usize, root: bool) -> ParseResult<Block> {
        self.indents.push(indent);
        let result = self.block_statements(indent, root);
        self.indents.pop();
        result
    }

    fn block_statements(&mut self, indent: usize, root: bool) -> ParseResult<Block> {
        // A separator before the first statement is malformed.
        if let Some(token) = self.view.peek() {
            if token.kind() == TokenKind::Semicolon {
                return Err(self.unexpected(&token.clone()));
            }
        }

        let mut expressions: Vec<Expression> = Vec::new();
        let start = self.view.peek().map_or(Span::default(), Token::span);
        'statements: loop {
            if self.eof {
                break;
            }
            let statement = self.parse_statement()?;
            expressions.push(statement);

            let mut had_semicolon = false;
            while self.view.peek_kind() == Some(TokenKind::Semicolon) {
                self.view.take();
                had_semicolon = true;
            }

            match self.view.peek_kind() {
                None => {
                    self.eof = true;
                    break 'statements;
                }
                Some(TokenKind::Newline) => {
                    let checkpoint = self.stash();
                    let next_indent = self.move_to_next_line(true)?;
                    if self.eof {
                        break 'statements;
                    }
                    if next_indent < indent {
                        if root {
                            return Err(self.indent_error("missing indentation in root block"));
                        }
                        self.restore(checkpoint);
                        break 'statements;
                    }
                    if next_indent > indent {
                        return Err(self.indent_error("unexpected indent"));
                    }
                    // `else` at block indent belongs to an enclosing `if`.
                    if self.view.peek_kind() == Some(TokenKind::Else) {
                        self.restore(checkpoint);
                        break 'statements;
                    }
                }
                Some(TokenKind::RightParen) if self.in_parens > 0 => break 'statements,
                Some(TokenKind::Else) => break 'statements,
                Some(_) if had_semicolon => {}
                Some(_) => {
                    let Some(token) = self.view.peek().cloned() else {
                        break 'statements;
                    };
                    return Err(self.unexpected_after_expression(&token));
                }
            }
        }

        let end = expressions.last().map_or(start, Expression::span);
        Ok(Block::new(expressions, indent, start.merge(end)))
    }

    /// Parses a nested block in block form: the cursor is at the newline
    /// that follows the construct's header. A body that immediately
    /// de-indents back to the enclosing level is an empty block.
    pub(super) fn parse_nested_block(&mut self) -> ParseResult<Block> {
        let outer = self.indents.current();
        let checkpoint = self.stash();
        let indent = self.move_to_next_line(true)?;
        if self.eof {
            return Ok(Block::empty(indent, Span::default()));
        }
        if indent <= outer {
            self.restore(checkpoint);
            return Ok(Block::empty(indent, Span::default()));
        }
        self.parse_block_body(indent, false)
    }

    /// Parses a same-line block (`then` form, same-line function bodies):
    /// `statement (';' statement)*`, ending at whatever follows.
    pub(super) fn parse_inline_block(&mut self) -> ParseResult<Block> {
        let indent = self.indents.current();
        let mut expressions: Vec<Expression> = Vec::new();
        let start = self.view.peek().map_or(Span::default(), Token::span);
        loop {
            match self.view.peek_kind() {
                None | Some(TokenKind::Newline | TokenKind::Else | TokenKind::Comma) => break,
                Some(TokenKind::RightParen) if self.in_parens > 0 => break,
                Some(TokenKind::Semicolon) => {
                    self.view.take();
                }
                Some(_) => {
                    expressions.push(self.parse_statement()?);
                    if self.view.peek_kind() != Some(TokenKind::Semicolon) {
                        break;
                    }
                }
            }
        }
        let end = expressions.last().map_or(start, Expression::span);
        Ok(Block::new(expressions, indent, start.merge(end)))
    }

    /// Parses one statement: `return [expr]` or an expression.
    fn parse_statement(&mut self) -> ParseResult<Expression> {
        if self.view.peek_kind() == Some(TokenKind::Return) {
            let keyword = self.take_known("'return'")?;
            let value = match self.view.peek_kind() {
                None | Some(TokenKind::Newline | TokenKind::Semicolon | TokenKind::Else) => None,
                Some(TokenKind::RightParen) if self.in_parens > 0 => None,
                Some(_) => Some(Box::new(self.parse_expression_required(ExprState::default())?)),
            };
            let span = value
                .as_ref()
                .map_or(keyword.span(), |v| keyword.span().merge(v.span()));
            return Ok(Expression::Return { value, span });
        }
        self.parse_expression_required(ExprState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ConditionalKind, ElsePart, Expression, LoopKind};
    use crate::source_analysis::scan;
    use crate::unparse::emit_common;

    fn parse_ok(source: &str) -> Block {
        let tokens = scan(source).unwrap();
        Parser::new(tokens).parse().unwrap()
    }

    fn parse_err(source: &str) -> ParseError {
        let tokens = scan(source).unwrap();
        Parser::new(tokens).parse().unwrap_err()
    }

    fn common(source: &str) -> String {
        emit_common(&parse_ok(source))
    }

    #[test]
    fn empty_input_is_an_empty_block() {
        assert!(parse_ok("").is_empty());
        assert!(parse_ok("   \n\n  # just a comment\n").is_empty());
    }

    #[test]
    fn priority_table_is_complete_for_scanned_operators() {
        for op in [
            "if", "unless", "|", "^", "&", "is", "isnt", "==", "!=", ">=", "<=", ">", "<", "+",
            "-", "<<", ">>", ">>>", "*", "/",
        ] {
            assert!(operator_priority(op).is_some(), "no priority for {op}");
        }
        assert!(operator_priority("%").is_none());
    }

    #[test]
    fn additive_binds_looser_than_multiplicative() {
        let block = parse_ok("1 + 2 * 3");
        let Expression::Binary { op, right, .. } = &block.expressions[0] else {
            panic!("expected binary, got {:?}", block.expressions[0]);
        };
        assert_eq!(op, "+");
        assert!(matches!(**right, Expression::Binary { .. }));
    }

    #[test]
    fn common_emit_scenarios() {
        assert_eq!(common("1 + 2 * 3"), "1 + 2 * 3");
        assert_eq!(common("(1 + 2) * 3"), "(1 + 2) * 3");
        assert_eq!(common("foo +2, b +3 | 0"), "foo(+2,b(+3 | 0))");
        assert_eq!(
            common("foo = () ->\n  hello()\nhi()"),
            "foo = () -> {hello()};hi()"
        );
        assert_eq!(
            common("a =\n  hello :\n    world : 2\n  hi:\n    welt: 3"),
            "a = {hello: {world: 2}, hi: {welt: 3}}"
        );
        assert_eq!(
            common("x for x in xs for xs in list"),
            "x for x in xs for xs in list"
        );
        assert_eq!(
            common("if friday then jack else jill"),
            "if (friday) { jack } else { jill }"
        );
    }

    #[test]
    fn rejects_malformed_inputs() {
        // A deeper line after a complete statement.
        parse_err("foo\n  20");
        // A second `else`.
        parse_err("if friday then sue else joy else huh");
        // `for` iteration variable must be assignable.
        parse_err("for 2*x,y in arr then x");
        // A separator before the first statement of a block.
        parse_err("foo = ->\n ;a()");
    }

    #[test]
    fn root_block_rejects_dedent() {
        let err = parse_err("  a\nb");
        assert!(matches!(err.kind, ParseErrorKind::IndentError(_)));
    }

    #[test]
    fn statements_share_a_line_with_semicolons() {
        let block = parse_ok("a(); b(); c()");
        assert_eq!(block.expressions.len(), 3);
        // Runs of semicolons are tolerated.
        let block = parse_ok("a() ;; b()");
        assert_eq!(block.expressions.len(), 2);
    }

    #[test]
    fn leading_semicolon_is_rejected() {
        let err = parse_err(";a()");
        assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken(_)));
    }

    #[test]
    fn return_with_and_without_value() {
        let block = parse_ok("f = () ->\n  return 1\ng = () ->\n  return");
        assert_eq!(block.expressions.len(), 2);
        assert_eq!(common("f = () ->\n  return 1"), "f = () -> {return 1}");
        assert_eq!(common("f = () ->\n  return"), "f = () -> {return}");
    }

    #[test]
    fn if_else_chain() {
        let block = parse_ok("if a then 1 else if b then 2 else 3");
        let Expression::If {
            kind, else_part, ..
        } = &block.expressions[0]
        else {
            panic!("expected if");
        };
        assert_eq!(*kind, ConditionalKind::If);
        let Some(else_part) = else_part else {
            panic!("expected else part");
        };
        assert!(matches!(**else_part, ElsePart::If(_)));
        assert_eq!(
            common("if a then 1 else if b then 2 else 3"),
            "if (a) { 1 } else if (b) { 2 } else { 3 }"
        );
    }

    #[test]
    fn block_form_if_with_else() {
        assert_eq!(
            common("if a\n  b()\nelse\n  c()"),
            "if (a) { b() } else { c() }"
        );
    }

    #[test]
    fn unless_is_a_conditional() {
        assert_eq!(common("unless busy then play()"), "unless (busy) { play() }");
    }

    #[test]
    fn empty_conditional_bodies_are_errors() {
        let err = parse_err("if x");
        assert!(matches!(err.kind, ParseErrorKind::EmptyBlock(_)));
        parse_err("loop");
        parse_err("until x");
        parse_err("for x in xs");
        parse_err("if a then b else");
    }

    #[test]
    fn loop_and_until() {
        assert_eq!(common("loop\n  tick()"), "loop { tick() }");
        assert_eq!(common("until done\n  tick()"), "until (done) { tick() }");
        let block = parse_ok("loop then tick()");
        let Expression::Loop { kind, condition, .. } = &block.expressions[0] else {
            panic!("expected loop");
        };
        assert_eq!(*kind, LoopKind::Loop);
        assert!(condition.is_none());
    }

    #[test]
    fn for_statement_forms() {
        assert_eq!(common("for x in xs then use(x)"), "for x in xs { use(x) }");
        assert_eq!(
            common("for k, v of pairs\n  use(k, v)"),
            "for k, v of pairs { use(k,v) }"
        );
        assert_eq!(common("for @x in xs then go()"), "for @x in xs { go() }");
    }

    #[test]
    fn postfix_conditional_and_comprehension() {
        assert_eq!(common("foo x, y if c"), "foo(x,y) if c");
        assert_eq!(common("x() if ready"), "x() if ready");
        assert_eq!(common("foo x for x in arr"), "foo(x) for x in arr");
    }

    #[test]
    fn postfix_if_after_empty_if_rewind() {
        // `foo if c` cannot be an `if`-expression argument (its body would be
        // empty), so the conditional rewinds and binds as a postfix operator.
        assert_eq!(common("foo if c"), "foo if c");
    }

    #[test]
    fn leftover_and_unexpected_inputs() {
        let err = parse_err("a b: ");
        assert!(matches!(err.kind, ParseErrorKind::ExpectedToken { .. }));
        let err = parse_err("a )");
        assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken(_)));
    }

    #[test]
    fn reset_reinitializes_state() {
        let mut parser = Parser::new(scan("a").unwrap());
        parser.parse().unwrap();
        parser.reset(scan("b + 1").unwrap());
        let block = parser.parse().unwrap();
        assert_eq!(block.expressions.len(), 1);
    }

    #[test]
    fn blank_lines_between_statements() {
        let block = parse_ok("a()\n\n\nb()");
        assert_eq!(block.expressions.len(), 2);
    }

    #[test]
    fn comment_lines_are_skipped() {
        let block = parse_ok("a()\n# note\nb()");
        assert_eq!(block.expressions.len(), 2);
    }

    #[test]
    fn root_block_at_nonzero_indent() {
        let block = parse_ok("  a()\n  b()");
        assert_eq!(block.indent, 2);
        assert_eq!(block.expressions.len(), 2);
    }
}
