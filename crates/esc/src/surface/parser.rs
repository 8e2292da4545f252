use crate::config::ParseOptions;
use crate::diagnostics::{Diagnostic, Span};
use crate::lexer::{token_stream, Token, TokenKind, TokenSource, TokenStream};

use super::ast::*;

mod declarations;
mod expressions;
mod helpers;
mod primary;
mod tokens;

/// The closed set of tokens the expression engine stops on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminatorKind {
    Comma,
    CloseParen,
    CloseBracket,
    CloseBrace,
    Eof,
}

impl TerminatorKind {
    pub fn classify(kind: &TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Comma => Some(Self::Comma),
            TokenKind::CloseParen => Some(Self::CloseParen),
            TokenKind::CloseBracket => Some(Self::CloseBracket),
            TokenKind::CloseBrace => Some(Self::CloseBrace),
            TokenKind::Eof => Some(Self::Eof),
            _ => None,
        }
    }
}

/// The token that ended an expression, already consumed from the stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Terminator {
    pub kind: TerminatorKind,
    pub token: Token,
}

impl Terminator {
    pub fn span(&self) -> Span {
        self.token.span
    }
}

/// One parse job: a token cursor plus the diagnostics recorded while reading it.
///
/// Diagnostics only ever grow; nothing in the parser aborts on bad input. Run
/// independent parses on independent instances.
pub struct Parser<S = TokenStream> {
    tokens: S,
    diagnostics: Vec<Diagnostic>,
    options: ParseOptions,
}

impl<S: TokenSource> Parser<S> {
    pub fn new(tokens: S) -> Self {
        Self::with_options(tokens, ParseOptions::default())
    }

    pub fn with_options(tokens: S, options: ParseOptions) -> Self {
        Self {
            tokens,
            diagnostics: Vec::new(),
            options,
        }
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// Lexes and parses a single expression.
///
/// Lexer and parser diagnostics are merged in source order.
pub fn parse_expr_source(content: &str, options: ParseOptions) -> (Expr, Vec<Diagnostic>) {
    let (tokens, mut diagnostics) = token_stream(content);
    let mut parser = Parser::with_options(tokens, options);
    let (expr, terminator) = parser.parse_expr();
    tracing::debug!(
        terminator = ?terminator.kind,
        diagnostics = parser.diagnostics().len(),
        "parsed expression"
    );
    diagnostics.append(&mut parser.into_diagnostics());
    diagnostics.sort_by_key(|diag| diag.span.start);
    (expr, diagnostics)
}

/// Lexes and parses a sequence of statements up to end-of-input.
pub fn parse_program_source(
    content: &str,
    options: ParseOptions,
) -> (Vec<Stmt>, Vec<Diagnostic>) {
    let (tokens, mut diagnostics) = token_stream(content);
    let mut parser = Parser::with_options(tokens, options);
    let stmts = parser.parse_program();
    tracing::debug!(
        statements = stmts.len(),
        diagnostics = parser.diagnostics().len(),
        "parsed program"
    );
    diagnostics.append(&mut parser.into_diagnostics());
    diagnostics.sort_by_key(|diag| diag.span.start);
    (stmts, diagnostics)
}
