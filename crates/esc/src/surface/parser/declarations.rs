use crate::diagnostics::{merge_span, Span};
use crate::lexer::{TokenKind, TokenSource};

use super::super::ast::{Decl, DeclKind, Identifier, Stmt, VariableKind};
use super::helpers::is_statement_start;
use super::{Parser, TerminatorKind};

impl<S: TokenSource> Parser<S> {
    /// `[export] [declare] (val|var) name [= expr]` or `[export] [declare] fn name [(params)]`.
    pub fn parse_decl(&mut self) -> Option<Decl> {
        let start = self.tokens.peek().span;
        let export = self.peek_is(&TokenKind::Export);
        if export {
            self.tokens.consume();
        }
        let declare = self.peek_is(&TokenKind::Declare);
        if declare {
            self.tokens.consume();
        }

        let token = self.tokens.next();
        match token.kind {
            TokenKind::Val | TokenKind::Var => {
                let binding = if token.kind == TokenKind::Val {
                    VariableKind::Val
                } else {
                    VariableKind::Var
                };
                let name = self.expect_identifier("expected a name after the binding keyword")?;
                let mut end = name.span;
                let init = if declare {
                    None
                } else {
                    let equals = self.tokens.peek();
                    if equals.kind != TokenKind::Equals {
                        let message = format!("expected `=` but found {}", equals.kind);
                        self.emit_diag("E2102", &message, equals.span);
                        return None;
                    }
                    self.tokens.consume();
                    let init = self.parse_statement_expr();
                    end = init.span();
                    Some(init)
                };
                Some(Decl {
                    kind: DeclKind::Variable {
                        binding,
                        name,
                        init,
                    },
                    export,
                    declare,
                    span: merge_span(start, end),
                })
            }
            TokenKind::Fn => {
                let name = self.expect_identifier("expected a function name after `fn`")?;
                let mut end = name.span;
                let mut params = Vec::new();
                if self.peek_is(&TokenKind::OpenParen) {
                    self.tokens.consume();
                    end = self.parse_params(&mut params)?;
                }
                Some(Decl {
                    kind: DeclKind::Function { name, params },
                    export,
                    declare,
                    span: merge_span(start, end),
                })
            }
            other => {
                let message = format!("unexpected {other} at the start of a statement");
                self.emit_diag("E2103", &message, token.span);
                None
            }
        }
    }

    /// Reads `a, b, c)` after the opening paren. Returns the closing paren's span.
    fn parse_params(&mut self, params: &mut Vec<Identifier>) -> Option<Span> {
        let close = self.tokens.peek();
        if close.kind == TokenKind::CloseParen {
            self.tokens.consume();
            return Some(close.span);
        }
        loop {
            params.push(self.expect_identifier("expected a parameter name")?);
            let token = self.tokens.next();
            match token.kind {
                TokenKind::Comma => continue,
                TokenKind::CloseParen => return Some(token.span),
                other => {
                    let message = format!("expected `,` or `)` in a parameter list, found {other}");
                    self.emit_diag("E2104", &message, token.span);
                    return None;
                }
            }
        }
    }

    fn expect_identifier(&mut self, message: &str) -> Option<Identifier> {
        let token = self.tokens.next();
        match token.kind {
            TokenKind::Identifier(name) => Some(Identifier {
                name,
                span: token.span,
            }),
            other => {
                self.emit_diag("E2101", &format!("{message}, found {other}"), token.span);
                None
            }
        }
    }

    pub fn parse_stmt(&mut self) -> Option<Stmt> {
        let token = self.tokens.peek();
        match token.kind {
            TokenKind::Export
            | TokenKind::Declare
            | TokenKind::Val
            | TokenKind::Var
            | TokenKind::Fn => {
                let decl = self.parse_decl()?;
                Some(Stmt::Decl {
                    span: decl.span,
                    decl,
                })
            }
            TokenKind::Return => {
                self.tokens.consume();
                let next = self.tokens.peek();
                let bare = TerminatorKind::classify(&next.kind).is_some()
                    || is_statement_start(&next.kind);
                if bare {
                    return Some(Stmt::Return {
                        arg: None,
                        span: token.span,
                    });
                }
                let arg = self.parse_statement_expr();
                Some(Stmt::Return {
                    span: merge_span(token.span, arg.span()),
                    arg: Some(arg),
                })
            }
            other => {
                let message = format!("unexpected {other} at the start of a statement");
                self.emit_diag("E2103", &message, token.span);
                None
            }
        }
    }

    /// Statements until end-of-input. A failed statement skips ahead to the next keyword.
    pub fn parse_program(&mut self) -> Vec<Stmt> {
        let mut stmts = Vec::new();
        while !self.peek_is(&TokenKind::Eof) {
            match self.parse_stmt() {
                Some(stmt) => stmts.push(stmt),
                None => self.recover_to_statement(),
            }
        }
        stmts
    }
}
