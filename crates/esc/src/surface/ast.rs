use serde::Serialize;

use crate::diagnostics::Span;
use crate::lexer::Token;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identifier {
    /// Empty when synthesized during recovery.
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    UnaryPlus,
    UnaryMinus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    Times,
    Divide,
    Modulo,
    Plus,
    Minus,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    Equal,
    NotEqual,
    LogicalAnd,
    LogicalOr,
    NullishCoalescing,
}

impl BinaryOp {
    /// Higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Times | BinaryOp::Divide | BinaryOp::Modulo => 12,
            BinaryOp::Plus | BinaryOp::Minus => 11,
            BinaryOp::LessThan
            | BinaryOp::LessThanEqual
            | BinaryOp::GreaterThan
            | BinaryOp::GreaterThanEqual => 9,
            BinaryOp::Equal | BinaryOp::NotEqual => 8,
            BinaryOp::LogicalAnd => 4,
            BinaryOp::LogicalOr | BinaryOp::NullishCoalescing => 3,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Times => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::LessThan => "<",
            BinaryOp::LessThanEqual => "<=",
            BinaryOp::GreaterThan => ">",
            BinaryOp::GreaterThanEqual => ">=",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::LogicalOr => "||",
            BinaryOp::NullishCoalescing => "??",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Expr {
    Number {
        value: f64,
        span: Span,
    },
    String {
        value: String,
        span: Span,
    },
    Identifier(Identifier),
    Unary {
        op: UnaryOp,
        arg: Box<Expr>,
        span: Span,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
        span: Span,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        optional: bool,
        span: Span,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
        optional: bool,
        span: Span,
    },
    Member {
        object: Box<Expr>,
        prop: Identifier,
        optional: bool,
        span: Span,
    },
    Array {
        elems: Vec<Expr>,
        span: Span,
    },
    /// Stands in for a missing or invalid operand; carries the token found instead.
    Ignore {
        token: Token,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        expr_span(self)
    }
}

pub fn expr_span(expr: &Expr) -> Span {
    match expr {
        Expr::Identifier(name) => name.span,
        Expr::Number { span, .. }
        | Expr::String { span, .. }
        | Expr::Unary { span, .. }
        | Expr::Binary { span, .. }
        | Expr::Call { span, .. }
        | Expr::Index { span, .. }
        | Expr::Member { span, .. }
        | Expr::Array { span, .. }
        | Expr::Ignore { span, .. } => *span,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    Val,
    Var,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum DeclKind {
    Variable {
        binding: VariableKind,
        name: Identifier,
        init: Option<Expr>,
    },
    Function {
        name: Identifier,
        params: Vec<Identifier>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decl {
    pub kind: DeclKind,
    pub export: bool,
    pub declare: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Stmt {
    Decl {
        decl: Decl,
        span: Span,
    },
    Return {
        arg: Option<Expr>,
        span: Span,
    },
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Decl { span, .. } | Stmt::Return { span, .. } => *span,
        }
    }
}
