//! Initializer expressions and the patchable parameter slot.

use std::fmt;

use smol_str::SmolStr;

use super::lexer::{TokenKind, classify_literal, tokenize};

/// The default expression of a declaration, as far as the bridge needs to see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Initializer {
    /// A standalone literal such as `1`, `-2.5`, `true` or `"txt"`.
    Literal(String),
    /// `new Class(arg, ...)`; arguments are kept as source text.
    Construct { class: SmolStr, args: Vec<String> },
    /// Anything else, opaque.
    Expr(String),
}

impl Initializer {
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    pub fn construct(class: impl Into<SmolStr>, args: Vec<String>) -> Self {
        Self::Construct {
            class: class.into(),
            args,
        }
    }

    /// Read an initializer from source text.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if classify_literal(text).is_some() {
            return Self::Literal(text.to_string());
        }
        Self::parse_construct(text).unwrap_or_else(|| Self::Expr(text.to_string()))
    }

    fn parse_construct(text: &str) -> Option<Self> {
        let tokens = tokenize(text).ok()?;
        let [new, class, open, rest @ .., close] = tokens.as_slice() else {
            return None;
        };
        if new.kind != TokenKind::New
            || class.kind != TokenKind::Ident
            || open.kind != TokenKind::LParen
            || close.kind != TokenKind::RParen
        {
            return None;
        }

        let mut args = Vec::new();
        let mut depth = 0usize;
        let mut start: Option<usize> = None;
        let mut end = 0usize;
        for token in rest {
            match token.kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => depth = depth.checked_sub(1)?,
                TokenKind::Comma if depth == 0 => {
                    args.push(text[start?..end].to_string());
                    start = None;
                    continue;
                }
                _ => {}
            }
            start.get_or_insert(usize::from(token.range.start()));
            end = token.range.end().into();
        }
        if depth != 0 {
            return None;
        }
        match start {
            Some(start) => args.push(text[start..end].to_string()),
            None if !args.is_empty() => return None,
            None => {}
        }

        Some(Self::Construct {
            class: SmolStr::new(class.text),
            args,
        })
    }

    /// The literal this initializer carries, for literals and single-argument constructions.
    pub fn literal_argument(&self) -> Option<&str> {
        match self {
            Self::Literal(text) => Some(text),
            Self::Construct { args, .. } if args.len() == 1 => {
                let arg = args[0].as_str();
                classify_literal(arg).map(|_| arg)
            }
            _ => None,
        }
    }

    /// Source text of the initializer.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Initializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) | Self::Expr(text) => f.write_str(text),
            Self::Construct { class, args } => write!(f, "new {}({})", class, args.join(", ")),
        }
    }
}

/// Owned, explicitly mutable default expression of a value declaration.
///
/// The only writer is the stepping session's parameter override; the new
/// expression takes effect on the next instantiation of the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSlot {
    initializer: Initializer,
}

impl ParameterSlot {
    pub fn new(initializer: Initializer) -> Self {
        Self { initializer }
    }

    pub fn initializer(&self) -> &Initializer {
        &self.initializer
    }

    /// Insert or replace the constructor argument with `argument`.
    ///
    /// A plain literal is replaced wholesale. Returns `false` and leaves the
    /// slot untouched for any other expression.
    pub(crate) fn patch(&mut self, argument: &str) -> bool {
        match &mut self.initializer {
            Initializer::Construct { args, .. } => {
                match args.first_mut() {
                    Some(first) => *first = argument.to_string(),
                    None => args.push(argument.to_string()),
                }
                true
            }
            Initializer::Literal(text) => {
                *text = argument.to_string();
                true
            }
            Initializer::Expr(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", Initializer::literal("1"))]
    #[case(" -2.5 ", Initializer::literal("-2.5"))]
    #[case("new RealPort(1.0)", Initializer::construct("RealPort", vec!["1.0".into()]))]
    #[case("new BoolPort()", Initializer::construct("BoolPort", vec![]))]
    #[case(
        "new Pair(f(1, 2), -3)",
        Initializer::construct("Pair", vec!["f(1, 2)".into(), "-3".into()])
    )]
    #[case("a + b", Initializer::Expr("a + b".into()))]
    #[case("new X(1,)", Initializer::Expr("new X(1,)".into()))]
    fn test_parse(#[case] input: &str, #[case] expected: Initializer) {
        assert_eq!(Initializer::parse(input), expected);
    }

    #[test]
    fn test_literal_argument() {
        assert_eq!(Initializer::parse("new RealPort(2)").literal_argument(), Some("2"));
        assert_eq!(Initializer::parse("true").literal_argument(), Some("true"));
        assert_eq!(Initializer::parse("new RealPort(x)").literal_argument(), None);
        assert_eq!(Initializer::parse("new RealPort()").literal_argument(), None);
    }

    #[test]
    fn test_patch_inserts_or_replaces_argument() {
        let mut empty = ParameterSlot::new(Initializer::parse("new RealPort()"));
        assert!(empty.patch("3.7"));
        assert_eq!(empty.initializer().render(), "new RealPort(3.7)");

        let mut filled = ParameterSlot::new(Initializer::parse("new RealPort(1.0)"));
        assert!(filled.patch("3.7"));
        assert_eq!(filled.initializer().render(), "new RealPort(3.7)");

        let mut opaque = ParameterSlot::new(Initializer::parse("a + b"));
        assert!(!opaque.patch("3.7"));
        assert_eq!(opaque.initializer().render(), "a + b");
    }
}
