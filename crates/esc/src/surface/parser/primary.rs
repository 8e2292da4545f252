use crate::diagnostics::merge_span;
use crate::lexer::{Token, TokenKind, TokenSource};

use super::super::ast::{Expr, Identifier, UnaryOp};
use super::helpers::{is_operand_terminator, prefix_op};
use super::Parser;

impl<S: TokenSource> Parser<S> {
    /// Collects a run of leading `+`/`-`, outermost first.
    pub(super) fn parse_prefix(&mut self) -> Vec<(Token, UnaryOp)> {
        let mut prefixes = Vec::new();
        loop {
            let token = self.tokens.peek();
            let Some(op) = prefix_op(&token.kind) else {
                break;
            };
            self.tokens.consume();
            prefixes.push((token, op));
        }
        prefixes
    }

    /// One operand: prefixes, a primary expression, then its postfix chain.
    ///
    /// Always yields a node. A closing token in operand position is consumed into an
    /// `Ignore` node; anything else unexpected is reported and skipped.
    pub(super) fn parse_primary(&mut self) -> Expr {
        let prefixes = self.parse_prefix();
        let expr = loop {
            let token = self.tokens.peek();
            match &token.kind {
                TokenKind::Number(value) => {
                    self.tokens.consume();
                    break Expr::Number {
                        value: *value,
                        span: token.span,
                    };
                }
                TokenKind::String(value) => {
                    self.tokens.consume();
                    break Expr::String {
                        value: value.clone(),
                        span: token.span,
                    };
                }
                TokenKind::Identifier(name) => {
                    self.tokens.consume();
                    break Expr::Identifier(Identifier {
                        name: name.clone(),
                        span: token.span,
                    });
                }
                TokenKind::OpenParen => {
                    // The group's closer ends the interior expression.
                    self.tokens.consume();
                    break self.parse_expr().0;
                }
                TokenKind::OpenBracket => {
                    self.tokens.consume();
                    let (elems, terminator) = self.parse_seq();
                    break Expr::Array {
                        elems,
                        span: merge_span(token.span, terminator.span()),
                    };
                }
                kind if is_operand_terminator(kind) => {
                    let message = format!("unexpected {kind} where an operand was expected");
                    self.emit_diag("E2001", &message, token.span);
                    self.tokens.consume();
                    break Expr::Ignore {
                        span: token.span,
                        token: token.clone(),
                    };
                }
                kind => {
                    let message = format!("unexpected {kind} where an operand was expected");
                    self.emit_diag("E2001", &message, token.span);
                    tracing::trace!(token = %kind, "skipping token in operand position");
                    self.tokens.consume();
                }
            }
        };

        let expr = self.parse_postfix(expr);
        prefixes.into_iter().rev().fold(expr, |arg, (token, op)| Expr::Unary {
            span: merge_span(token.span, arg.span()),
            op,
            arg: Box::new(arg),
        })
    }
}
