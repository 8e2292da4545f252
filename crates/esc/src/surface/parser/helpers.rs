use crate::lexer::TokenKind;

use super::super::ast::{BinaryOp, UnaryOp};

pub(super) fn binary_op(kind: &TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::Asterisk => BinaryOp::Times,
        TokenKind::Slash => BinaryOp::Divide,
        TokenKind::Percent => BinaryOp::Modulo,
        TokenKind::Plus => BinaryOp::Plus,
        TokenKind::Minus => BinaryOp::Minus,
        TokenKind::Less => BinaryOp::LessThan,
        TokenKind::LessEqual => BinaryOp::LessThanEqual,
        TokenKind::Greater => BinaryOp::GreaterThan,
        TokenKind::GreaterEqual => BinaryOp::GreaterThanEqual,
        TokenKind::EqualEqual => BinaryOp::Equal,
        TokenKind::BangEqual => BinaryOp::NotEqual,
        TokenKind::AmpAmp => BinaryOp::LogicalAnd,
        TokenKind::PipePipe => BinaryOp::LogicalOr,
        TokenKind::QuestionQuestion => BinaryOp::NullishCoalescing,
        _ => return None,
    };
    Some(op)
}

pub(super) fn prefix_op(kind: &TokenKind) -> Option<UnaryOp> {
    match kind {
        TokenKind::Plus => Some(UnaryOp::UnaryPlus),
        TokenKind::Minus => Some(UnaryOp::UnaryMinus),
        _ => None,
    }
}

/// Tokens that may only close something; in operand position they become `Ignore`.
pub(super) fn is_operand_terminator(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::CloseBrace | TokenKind::Comma | TokenKind::CloseParen | TokenKind::Eof
    )
}

pub(super) fn is_statement_start(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Export
            | TokenKind::Declare
            | TokenKind::Val
            | TokenKind::Var
            | TokenKind::Fn
            | TokenKind::Return
    )
}
