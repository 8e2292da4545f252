use serde::Serialize;

use crate::diagnostics::{Diagnostic, Span};
use crate::lexer::TokenKind;

#[derive(Debug, Clone, Serialize)]
pub struct CstToken {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

#[derive(Debug, Serialize)]
pub struct CstFile {
    pub path: String,
    pub byte_count: usize,
    pub line_count: usize,
    pub tokens: Vec<CstToken>,
    pub diagnostics: Vec<Diagnostic>,
    #[serde(skip)]
    pub source: String,
}
