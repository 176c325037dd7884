//! Logos-based lexer for initializer and parameter literals
//!
//! Only the expression fragments the bridge reads and writes are covered:
//! literals, `new Class(args)` constructions and the punctuation between them.

use logos::Logos;
use text_size::{TextRange, TextSize};

/// A token with its kind, text, and range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub range: TextRange,
}

/// Input could not be tokenized at `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexError {
    pub offset: TextSize,
}

/// Tokenize an entire string, skipping whitespace and comments.
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, LexError> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(input);
    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let range = TextRange::new(
            TextSize::new(span.start as u32),
            TextSize::new(span.end as u32),
        );
        match result {
            Ok(kind) if kind.is_trivia() => {}
            Ok(kind) => tokens.push(Token {
                kind,
                text: lexer.slice(),
                range,
            }),
            Err(()) => return Err(LexError { offset: range.start() }),
        }
    }
    Ok(tokens)
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[regex(r"--[^\n]*")]
    Comment,

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[token("true")]
    #[token("false")]
    Bool,

    #[token("nil")]
    Nil,

    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?")]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+")]
    Real,

    #[regex(r"[0-9]+")]
    Int,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    Str,

    #[regex(r"'([^'\\\n]|\\.)'")]
    Char,

    // =========================================================================
    // NAMES AND PUNCTUATION
    // =========================================================================
    #[token("new")]
    New,

    #[regex(r"[A-Za-z][A-Za-z0-9_]*")]
    Ident,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(",")]
    Comma,

    #[token("-")]
    Minus,

    #[token("+")]
    Plus,

    #[token(".")]
    Dot,
}

impl TokenKind {
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::Whitespace | Self::Comment)
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Self::Bool | Self::Nil | Self::Real | Self::Int | Self::Str | Self::Char
        )
    }
}

/// Literal category of a standalone literal expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Bool,
    Nil,
    Int,
    Real,
    Char,
    Str,
}

/// Classify `text` if it is exactly one literal, numeric ones optionally signed.
pub fn classify_literal(text: &str) -> Option<LiteralKind> {
    let tokens = tokenize(text).ok()?;
    let literal = match tokens.as_slice() {
        [t] => t,
        [sign, t] if matches!(sign.kind, TokenKind::Minus | TokenKind::Plus) => {
            if !matches!(t.kind, TokenKind::Int | TokenKind::Real) {
                return None;
            }
            t
        }
        _ => return None,
    };
    match literal.kind {
        TokenKind::Bool => Some(LiteralKind::Bool),
        TokenKind::Nil => Some(LiteralKind::Nil),
        TokenKind::Int => Some(LiteralKind::Int),
        TokenKind::Real => Some(LiteralKind::Real),
        TokenKind::Char => Some(LiteralKind::Char),
        TokenKind::Str => Some(LiteralKind::Str),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_tokenize_construction() {
        let tokens = tokenize("new RealPort(1.5)").unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::New,
                TokenKind::Ident,
                TokenKind::LParen,
                TokenKind::Real,
                TokenKind::RParen
            ]
        );
        assert_eq!(tokens[1].text, "RealPort");
        assert_eq!(tokens[3].range, TextRange::new(13.into(), 16.into()));
    }

    #[test]
    fn test_tokenize_reports_offset() {
        let err = tokenize("1 # 2").unwrap_err();
        assert_eq!(err.offset, TextSize::new(2));
    }

    #[rstest]
    #[case("true", Some(LiteralKind::Bool))]
    #[case("1", Some(LiteralKind::Int))]
    #[case("-1", Some(LiteralKind::Int))]
    #[case("2.5", Some(LiteralKind::Real))]
    #[case("1e-3", Some(LiteralKind::Real))]
    #[case("\"abc\"", Some(LiteralKind::Str))]
    #[case("'c'", Some(LiteralKind::Char))]
    #[case("nil", Some(LiteralKind::Nil))]
    #[case("-true", None)]
    #[case("1 + 2", None)]
    #[case("new RealPort(1.0)", None)]
    #[case("x", None)]
    fn test_classify_literal(#[case] input: &str, #[case] expected: Option<LiteralKind>) {
        assert_eq!(classify_literal(input), expected);
    }
}
