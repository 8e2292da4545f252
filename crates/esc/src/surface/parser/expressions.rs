use crate::config::Reduction;
use crate::diagnostics::{merge_span, Span};
use crate::lexer::{TokenKind, TokenSource};

use super::super::ast::{BinaryOp, Expr, Identifier};
use super::helpers::binary_op;
use super::{Parser, Terminator, TerminatorKind};

impl<S: TokenSource> Parser<S> {
    /// Parses operands joined by binary operators up to the first terminator.
    ///
    /// The terminator is consumed and handed back so callers can tell a `,` from a
    /// closing delimiter.
    pub fn parse_expr(&mut self) -> (Expr, Terminator) {
        let mut operands = vec![self.parse_primary()];
        let mut operators: Vec<BinaryOp> = Vec::new();

        let terminator = loop {
            let token = self.tokens.next();
            if let Some(kind) = TerminatorKind::classify(&token.kind) {
                break Terminator { kind, token };
            }
            let Some(op) = binary_op(&token.kind) else {
                let message = format!("unexpected {} after an operand", token.kind);
                self.emit_diag("E2002", &message, token.span);
                tracing::trace!(token = %token.kind, "skipping token after operand");
                continue;
            };

            match self.options.reduction {
                Reduction::SingleStep => {
                    if binds_at_least(&operators, op) {
                        fold_top(&mut operands, &mut operators);
                    }
                }
                Reduction::Cascading => {
                    while binds_at_least(&operators, op) {
                        fold_top(&mut operands, &mut operators);
                    }
                }
            }

            operators.push(op);
            operands.push(self.parse_primary());
        };

        while !operators.is_empty() {
            fold_top(&mut operands, &mut operators);
        }
        let Some(expr) = operands.pop() else {
            unreachable!("expression stack emptied while draining");
        };
        (expr, terminator)
    }

    /// Applies call, index and member accessors to `expr` for as long as they follow.
    pub(super) fn parse_postfix(&mut self, mut expr: Expr) -> Expr {
        loop {
            let token = self.tokens.peek();
            expr = match &token.kind {
                TokenKind::OpenParen | TokenKind::QuestionOpenParen => {
                    let optional = matches!(token.kind, TokenKind::QuestionOpenParen);
                    self.tokens.consume();
                    let (args, terminator) = self.parse_seq();
                    Expr::Call {
                        span: merge_span(expr.span(), terminator.span()),
                        callee: Box::new(expr),
                        args,
                        optional,
                    }
                }
                TokenKind::OpenBracket | TokenKind::QuestionOpenBracket => {
                    let optional = matches!(token.kind, TokenKind::QuestionOpenBracket);
                    self.tokens.consume();
                    let (index, terminator) = self.parse_expr();
                    Expr::Index {
                        span: merge_span(expr.span(), terminator.span()),
                        object: Box::new(expr),
                        index: Box::new(index),
                        optional,
                    }
                }
                TokenKind::Dot | TokenKind::QuestionDot => {
                    let optional = matches!(token.kind, TokenKind::QuestionDot);
                    self.tokens.consume();
                    let prop = self.parse_member_name(token.span, optional);
                    Expr::Member {
                        span: merge_span(expr.span(), prop.span),
                        object: Box::new(expr),
                        prop,
                        optional,
                    }
                }
                _ => return expr,
            };
        }
    }

    fn parse_member_name(&mut self, dot: Span, optional: bool) -> Identifier {
        let token = self.tokens.next();
        match token.kind {
            TokenKind::Identifier(name) => Identifier {
                name,
                span: token.span,
            },
            _ => {
                let accessor = if optional { "?." } else { "." };
                let message = format!("expected an identifier after {accessor}");
                self.emit_diag("E2003", &message, dot);
                Identifier {
                    name: String::new(),
                    span: Span::empty(dot.end),
                }
            }
        }
    }

    /// Comma-separated expressions up to a closing delimiter or end-of-input.
    pub(super) fn parse_seq(&mut self) -> (Vec<Expr>, Terminator) {
        let mut elems = Vec::new();
        loop {
            let (expr, terminator) = self.parse_expr();
            elems.push(expr);
            match terminator.kind {
                TerminatorKind::Comma => continue,
                TerminatorKind::CloseParen
                | TerminatorKind::CloseBracket
                | TerminatorKind::CloseBrace
                | TerminatorKind::Eof => return (elems, terminator),
            }
        }
    }
}

fn binds_at_least(operators: &[BinaryOp], incoming: BinaryOp) -> bool {
    operators
        .last()
        .is_some_and(|top| top.precedence() >= incoming.precedence())
}

fn fold_top(operands: &mut Vec<Expr>, operators: &mut Vec<BinaryOp>) {
    let (Some(op), Some(right), Some(left)) = (operators.pop(), operands.pop(), operands.pop())
    else {
        unreachable!("operand stack must hold one more entry than the operator stack");
    };
    tracing::trace!(op = op.symbol(), "folding binary operator");
    operands.push(Expr::Binary {
        span: merge_span(left.span(), right.span()),
        left: Box::new(left),
        op,
        right: Box::new(right),
    });
}
