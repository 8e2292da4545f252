use std::fmt;

use serde::Serialize;

use crate::cst::CstToken;
use crate::diagnostics::{Diagnostic, Span};
use crate::syntax;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value")]
pub enum TokenKind {
    Number(f64),
    String(String),
    Identifier(String),

    Export,
    Declare,
    Val,
    Var,
    Fn,
    Return,

    Plus,
    Minus,
    Asterisk,
    Slash,
    Percent,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    EqualEqual,
    BangEqual,
    AmpAmp,
    PipePipe,
    QuestionQuestion,
    Equals,

    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    OpenBrace,
    CloseBrace,
    QuestionOpenParen,
    QuestionOpenBracket,
    Dot,
    QuestionDot,
    Comma,
    Colon,

    /// A character the lexer could not classify; kept so the parser can report and skip it.
    Unknown(char),
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Number(value) => return write!(f, "number `{value}`"),
            TokenKind::String(value) => return write!(f, "string {value:?}"),
            TokenKind::Identifier(name) => return write!(f, "identifier `{name}`"),
            TokenKind::Unknown(ch) => return write!(f, "`{ch}`"),
            TokenKind::Eof => return write!(f, "end of input"),
            TokenKind::Export => "export",
            TokenKind::Declare => "declare",
            TokenKind::Val => "val",
            TokenKind::Var => "var",
            TokenKind::Fn => "fn",
            TokenKind::Return => "return",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Asterisk => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Less => "<",
            TokenKind::LessEqual => "<=",
            TokenKind::Greater => ">",
            TokenKind::GreaterEqual => ">=",
            TokenKind::EqualEqual => "==",
            TokenKind::BangEqual => "!=",
            TokenKind::AmpAmp => "&&",
            TokenKind::PipePipe => "||",
            TokenKind::QuestionQuestion => "??",
            TokenKind::Equals => "=",
            TokenKind::OpenParen => "(",
            TokenKind::CloseParen => ")",
            TokenKind::OpenBracket => "[",
            TokenKind::CloseBracket => "]",
            TokenKind::OpenBrace => "{",
            TokenKind::CloseBrace => "}",
            TokenKind::QuestionOpenParen => "?(",
            TokenKind::QuestionOpenBracket => "?[",
            TokenKind::Dot => ".",
            TokenKind::QuestionDot => "?.",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
        };
        write!(f, "`{text}`")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// The cursor contract the expression engine consumes.
///
/// `peek` is idempotent; `next` returns the peeked token and advances; `consume`
/// discards the token `peek` would return. Once the input is exhausted every call
/// keeps yielding the same `Eof` token.
pub trait TokenSource {
    fn peek(&mut self) -> Token;
    fn next(&mut self) -> Token;
    fn consume(&mut self);
}

/// A `TokenSource` over an already-lexed token vector.
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenStream {
    /// Appends a trailing `Eof` when the vector does not already end with one.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last(), Some(Token { kind: TokenKind::Eof, .. })) {
            let at = tokens.last().map(|token| token.span.end).unwrap_or(0);
            tokens.push(Token {
                kind: TokenKind::Eof,
                span: Span::empty(at),
            });
        }
        Self { tokens, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    fn current(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }
}

impl TokenSource for TokenStream {
    fn peek(&mut self) -> Token {
        self.current().clone()
    }

    fn next(&mut self) -> Token {
        let token = self.current().clone();
        self.consume();
        token
    }

    fn consume(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }
}

pub fn lex(content: &str) -> (Vec<Token>, Vec<Diagnostic>) {
    let mut tokens = Vec::new();
    let mut diagnostics = Vec::new();

    let chars: Vec<(usize, char)> = content.char_indices().collect();
    let offset_at = |index: usize| {
        chars
            .get(index)
            .map(|(offset, _)| *offset)
            .unwrap_or(content.len())
    };
    let mut index = 0usize;

    while index < chars.len() {
        let (start, ch) = chars[index];

        if ch.is_whitespace() {
            index += 1;
            continue;
        }

        // Line comments run to end-of-line.
        if ch == '/' && chars.get(index + 1).is_some_and(|(_, next)| *next == '/') {
            while index < chars.len() && chars[index].1 != '\n' {
                index += 1;
            }
            continue;
        }

        if ch == '"' {
            index += 1;
            let mut value = String::new();
            let mut closed = false;
            while index < chars.len() {
                let c = chars[index].1;
                if c == '\n' {
                    break;
                }
                if c == '\\' && index + 1 < chars.len() && chars[index + 1].1 != '\n' {
                    let esc = chars[index + 1].1;
                    value.push(decode_escape(esc).unwrap_or(esc));
                    index += 2;
                    continue;
                }
                index += 1;
                if c == '"' {
                    closed = true;
                    break;
                }
                value.push(c);
            }
            let span = Span::new(start, offset_at(index));
            if !closed {
                diagnostics.push(
                    Diagnostic::error("E1001", "unterminated string literal", span)
                        .with_label("string literal started here", Span::new(start, start + 1)),
                );
            }
            tokens.push(Token {
                kind: TokenKind::String(value),
                span,
            });
            continue;
        }

        if is_ident_start(ch) {
            while index < chars.len() && is_ident_continue(chars[index].1) {
                index += 1;
            }
            let end = offset_at(index);
            let text = &content[start..end];
            let kind = syntax::keyword(text)
                .unwrap_or_else(|| TokenKind::Identifier(text.to_string()));
            tokens.push(Token {
                kind,
                span: Span::new(start, end),
            });
            continue;
        }

        if ch.is_ascii_digit() {
            while index < chars.len() && chars[index].1.is_ascii_digit() {
                index += 1;
            }
            if index + 1 < chars.len()
                && chars[index].1 == '.'
                && chars[index + 1].1.is_ascii_digit()
            {
                index += 1;
                while index < chars.len() && chars[index].1.is_ascii_digit() {
                    index += 1;
                }
            }
            let digits_end = offset_at(index);
            // Digits run straight into a name: `12abc` is one bad literal, not two tokens.
            while index < chars.len() && is_ident_continue(chars[index].1) {
                index += 1;
            }
            let end = offset_at(index);
            let span = Span::new(start, end);
            if end > digits_end {
                diagnostics.push(Diagnostic::error(
                    "E1002",
                    format!("invalid number literal `{}`", &content[start..end]),
                    span,
                ));
            }
            let value = content[start..digits_end]
                .parse::<f64>()
                .unwrap_or_default();
            tokens.push(Token {
                kind: TokenKind::Number(value),
                span,
            });
            continue;
        }

        if let Some((kind, len)) = match_symbol(&chars, index) {
            index += len;
            tokens.push(Token {
                kind,
                span: Span::new(start, offset_at(index)),
            });
            continue;
        }

        index += 1;
        let span = Span::new(start, offset_at(index));
        diagnostics.push(Diagnostic::error(
            "E1000",
            format!("unexpected character '{ch}'"),
            span,
        ));
        tokens.push(Token {
            kind: TokenKind::Unknown(ch),
            span,
        });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::empty(content.len()),
    });

    (tokens, diagnostics)
}

/// Lexes `content` and wraps the result in a `TokenStream`.
pub fn token_stream(content: &str) -> (TokenStream, Vec<Diagnostic>) {
    let (tokens, diagnostics) = lex(content);
    (TokenStream::new(tokens), diagnostics)
}

/// Token dump used by `esc lex`: the text each token was produced from, plus its kind.
pub fn lex_cst(content: &str) -> (Vec<CstToken>, Vec<Diagnostic>) {
    let (tokens, diagnostics) = lex(content);
    let cst = tokens
        .into_iter()
        .map(|token| CstToken {
            text: content
                .get(token.span.start..token.span.end)
                .unwrap_or("")
                .to_string(),
            kind: token.kind,
            span: token.span,
        })
        .collect();
    (cst, diagnostics)
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_ident_continue(ch: char) -> bool {
    is_ident_start(ch) || ch.is_ascii_digit()
}

fn decode_escape(ch: char) -> Option<char> {
    match ch {
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        '\\' => Some('\\'),
        '"' => Some('"'),
        _ => None,
    }
}

fn match_symbol(chars: &[(usize, char)], index: usize) -> Option<(TokenKind, usize)> {
    if index + 1 < chars.len() {
        for (needle, kind) in syntax::SYMBOLS_2 {
            if chars[index].1 == needle[0] && chars[index + 1].1 == needle[1] {
                return Some((kind.clone(), 2));
            }
        }
    }

    let ch = chars[index].1;
    syntax::SYMBOLS_1
        .iter()
        .find(|(symbol, _)| *symbol == ch)
        .map(|(_, kind)| (kind.clone(), 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let (tokens, diags) = lex(src);
        assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
        tokens.into_iter().map(|token| token.kind).collect()
    }

    fn diag_codes(diags: &[Diagnostic]) -> Vec<String> {
        let mut codes: Vec<String> = diags.iter().map(|d| d.code.clone()).collect();
        codes.sort();
        codes
    }

    #[test]
    fn lex_distinguishes_optional_chaining_forms() {
        assert_eq!(
            kinds("a?.b?(c)?[d] ?? e"),
            vec![
                TokenKind::Identifier("a".to_string()),
                TokenKind::QuestionDot,
                TokenKind::Identifier("b".to_string()),
                TokenKind::QuestionOpenParen,
                TokenKind::Identifier("c".to_string()),
                TokenKind::CloseParen,
                TokenKind::QuestionOpenBracket,
                TokenKind::Identifier("d".to_string()),
                TokenKind::CloseBracket,
                TokenKind::QuestionQuestion,
                TokenKind::Identifier("e".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_prefers_two_character_operators() {
        assert_eq!(
            kinds("<= < >= > == = != && ||"),
            vec![
                TokenKind::LessEqual,
                TokenKind::Less,
                TokenKind::GreaterEqual,
                TokenKind::Greater,
                TokenKind::EqualEqual,
                TokenKind::Equals,
                TokenKind::BangEqual,
                TokenKind::AmpAmp,
                TokenKind::PipePipe,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_maps_reserved_words_to_keywords() {
        assert_eq!(
            kinds("export declare val var fn return value"),
            vec![
                TokenKind::Export,
                TokenKind::Declare,
                TokenKind::Val,
                TokenKind::Var,
                TokenKind::Fn,
                TokenKind::Return,
                TokenKind::Identifier("value".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_numbers_accept_simple_decimal_fractions() {
        let (tokens, diags) = lex("x = 12.34 + 5");
        assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
        assert_eq!(tokens[2].kind, TokenKind::Number(12.34));
        assert_eq!(tokens[2].span, Span::new(4, 9));
        assert_eq!(tokens[4].kind, TokenKind::Number(5.0));
    }

    #[test]
    fn lex_number_followed_by_name_is_invalid() {
        let (tokens, diags) = lex("12abc + 1.5e");
        assert_eq!(diag_codes(&diags), vec!["E1002".to_string(), "E1002".to_string()]);
        assert_eq!(diags[0].message, "invalid number literal `12abc`");
        assert_eq!(diags[0].span, Span::new(0, 5));
        assert_eq!(tokens[0].kind, TokenKind::Number(12.0));
        assert_eq!(tokens[0].span, Span::new(0, 5));
        assert_eq!(tokens[1].kind, TokenKind::Plus);
        assert_eq!(tokens[2].kind, TokenKind::Number(1.5));
        assert_eq!(tokens[2].span, Span::new(8, 12));
        assert_eq!(tokens[3].kind, TokenKind::Eof);
    }

    #[test]
    fn lex_member_access_on_number_is_not_a_fraction() {
        assert_eq!(
            kinds("1.x"),
            vec![
                TokenKind::Number(1.0),
                TokenKind::Dot,
                TokenKind::Identifier("x".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_decodes_string_escapes() {
        let (tokens, diags) = lex(r#""a\"b\n""#);
        assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
        assert_eq!(tokens[0].kind, TokenKind::String("a\"b\n".to_string()));
        assert_eq!(tokens[0].span, Span::new(0, 8));
    }

    #[test]
    fn lex_unterminated_string_emits_error() {
        let (tokens, diags) = lex("x = \"unterminated\ny");
        assert_eq!(diag_codes(&diags), vec!["E1001".to_string()]);
        assert_eq!(diags[0].span.start, 4);
        assert_eq!(tokens[2].kind, TokenKind::String("unterminated".to_string()));
        assert_eq!(tokens[3].kind, TokenKind::Identifier("y".to_string()));
    }

    #[test]
    fn lex_unknown_characters_stay_in_the_stream() {
        let (tokens, diags) = lex("a # b");
        assert_eq!(diag_codes(&diags), vec!["E1000".to_string()]);
        assert_eq!(tokens[1].kind, TokenKind::Unknown('#'));
        assert_eq!(tokens[1].span, Span::new(2, 3));
    }

    #[test]
    fn lex_skips_line_comments() {
        assert_eq!(
            kinds("a // b c\n+ d"),
            vec![
                TokenKind::Identifier("a".to_string()),
                TokenKind::Plus,
                TokenKind::Identifier("d".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn eof_spans_the_end_of_input() {
        let (tokens, _) = lex("ab  ");
        let eof = tokens.last().expect("eof");
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!(eof.span, Span::empty(4));
    }

    #[test]
    fn token_stream_keeps_returning_eof() {
        let (mut stream, _) = token_stream("a");
        assert_eq!(stream.peek().kind, TokenKind::Identifier("a".to_string()));
        assert_eq!(stream.peek().kind, TokenKind::Identifier("a".to_string()));
        assert_eq!(stream.next().kind, TokenKind::Identifier("a".to_string()));
        assert_eq!(stream.next().kind, TokenKind::Eof);
        assert_eq!(stream.next().kind, TokenKind::Eof);
        stream.consume();
        assert_eq!(stream.peek().kind, TokenKind::Eof);
        assert_eq!(stream.position(), 1);
    }

    #[test]
    fn token_stream_appends_missing_eof() {
        let mut stream = TokenStream::new(vec![Token {
            kind: TokenKind::Comma,
            span: Span::new(3, 4),
        }]);
        stream.consume();
        let eof = stream.next();
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!(eof.span, Span::empty(4));
    }

    #[test]
    fn lex_cst_keeps_source_text() {
        let (tokens, _) = lex_cst("foo?.bar");
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["foo", "?.", "bar", ""]);
    }
}
