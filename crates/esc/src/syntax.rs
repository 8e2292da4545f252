use crate::lexer::TokenKind;

pub const KEYWORDS: &[(&str, TokenKind)] = &[
    ("export", TokenKind::Export),
    ("declare", TokenKind::Declare),
    ("val", TokenKind::Val),
    ("var", TokenKind::Var),
    ("fn", TokenKind::Fn),
    ("return", TokenKind::Return),
];

pub const SYMBOLS_2: &[([char; 2], TokenKind)] = &[
    (['?', '.'], TokenKind::QuestionDot),
    (['?', '('], TokenKind::QuestionOpenParen),
    (['?', '['], TokenKind::QuestionOpenBracket),
    (['?', '?'], TokenKind::QuestionQuestion),
    (['=', '='], TokenKind::EqualEqual),
    (['!', '='], TokenKind::BangEqual),
    (['<', '='], TokenKind::LessEqual),
    (['>', '='], TokenKind::GreaterEqual),
    (['&', '&'], TokenKind::AmpAmp),
    (['|', '|'], TokenKind::PipePipe),
];

pub const SYMBOLS_1: &[(char, TokenKind)] = &[
    ('+', TokenKind::Plus),
    ('-', TokenKind::Minus),
    ('*', TokenKind::Asterisk),
    ('/', TokenKind::Slash),
    ('%', TokenKind::Percent),
    ('<', TokenKind::Less),
    ('>', TokenKind::Greater),
    ('=', TokenKind::Equals),
    ('(', TokenKind::OpenParen),
    (')', TokenKind::CloseParen),
    ('[', TokenKind::OpenBracket),
    (']', TokenKind::CloseBracket),
    ('{', TokenKind::OpenBrace),
    ('}', TokenKind::CloseBrace),
    ('.', TokenKind::Dot),
    (',', TokenKind::Comma),
    (':', TokenKind::Colon),
];

pub fn keyword(text: &str) -> Option<TokenKind> {
    KEYWORDS
        .iter()
        .find(|(word, _)| *word == text)
        .map(|(_, kind)| kind.clone())
}
