use crate::diagnostics::{Diagnostic, Span};
use crate::lexer::{Token, TokenKind, TokenSource};

use super::super::ast::Expr;
use super::helpers::is_statement_start;
use super::Parser;

/// A view of a token source in which the next statement keyword reads as end-of-input.
///
/// The keyword itself is never consumed through the view.
struct StatementBounded<'a, S> {
    inner: &'a mut S,
}

fn boundary(keyword: &Token) -> Token {
    Token {
        kind: TokenKind::Eof,
        span: Span::empty(keyword.span.start),
    }
}

impl<S: TokenSource> TokenSource for StatementBounded<'_, S> {
    fn peek(&mut self) -> Token {
        let token = self.inner.peek();
        if is_statement_start(&token.kind) {
            return boundary(&token);
        }
        token
    }

    fn next(&mut self) -> Token {
        let token = self.inner.peek();
        if is_statement_start(&token.kind) {
            return boundary(&token);
        }
        self.inner.next()
    }

    fn consume(&mut self) {
        if !is_statement_start(&self.inner.peek().kind) {
            self.inner.consume();
        }
    }
}

impl<S: TokenSource> Parser<S> {
    pub(super) fn emit_diag(&mut self, code: &str, message: &str, span: Span) {
        self.diagnostics.push(Diagnostic::error(code, message, span));
    }

    /// Parses one expression that must not run into the following statement.
    pub(super) fn parse_statement_expr(&mut self) -> Expr {
        let mut bounded = Parser {
            tokens: StatementBounded {
                inner: &mut self.tokens,
            },
            diagnostics: std::mem::take(&mut self.diagnostics),
            options: self.options,
        };
        let (expr, _) = bounded.parse_expr();
        self.diagnostics = bounded.diagnostics;
        expr
    }

    /// Skips to the next statement keyword or end-of-input.
    pub(super) fn recover_to_statement(&mut self) {
        let mut skipped = 0;
        loop {
            let token = self.tokens.peek();
            if token.kind == TokenKind::Eof || is_statement_start(&token.kind) {
                break;
            }
            self.tokens.consume();
            skipped += 1;
        }
        if skipped > 0 {
            tracing::trace!(skipped, "recovered to statement boundary");
        }
    }

    pub(super) fn peek_is(&mut self, kind: &TokenKind) -> bool {
        self.tokens.peek().kind == *kind
    }
}
