//! Type descriptors and the internal/external type mapping.
//!
//! | Internal kind              | External kind | Default-value wrapper |
//! |----------------------------|---------------|-----------------------|
//! | `bool`                     | `Boolean`     | `new BoolPort(lit)`   |
//! | `int`/`nat`/`nat1`         | `Integer`     | `new IntPort(lit)`    |
//! | `real`                     | `Real`        | `new RealPort(lit)`   |
//! | `seq of char`              | `String`      | `new StringPort(lit)` |
//!
//! `Enumeration` is read but has no internal counterpart.

use std::fmt;

use crate::model::{DeclType, Initializer, PortKind};

/// External type of a scalar variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Boolean,
    Real,
    Integer,
    String,
    Enumeration,
}

impl TypeKind {
    pub const ALL: [TypeKind; 5] = [
        Self::Real,
        Self::Integer,
        Self::Boolean,
        Self::String,
        Self::Enumeration,
    ];

    /// Element name in the description document.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::Real => "Real",
            Self::Integer => "Integer",
            Self::String => "String",
            Self::Enumeration => "Enumeration",
        }
    }

    /// Case-insensitive parse.
    pub fn parse(text: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(text))
    }

    /// External kind of a declared type; ports map to their value kind.
    pub fn from_decl(ty: &DeclType) -> Option<Self> {
        match ty {
            DeclType::Bool => Some(Self::Boolean),
            DeclType::Real => Some(Self::Real),
            DeclType::Port(kind) => Some(Self::from_port(*kind)),
            t if t.is_integral() => Some(Self::Integer),
            t if t.is_string() => Some(Self::String),
            _ => None,
        }
    }

    pub fn from_port(kind: PortKind) -> Self {
        match kind {
            PortKind::Bool => Self::Boolean,
            PortKind::Int => Self::Integer,
            PortKind::Real => Self::Real,
            PortKind::String => Self::String,
        }
    }

    /// Port class that carries values of this kind.
    pub fn port(self) -> Option<PortKind> {
        match self {
            Self::Boolean => Some(PortKind::Bool),
            Self::Integer => Some(PortKind::Int),
            Self::Real => Some(PortKind::Real),
            Self::String => Some(PortKind::String),
            Self::Enumeration => None,
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Give an integer-looking real literal a fractional part.
///
/// - literals containing `.` are kept as they are
/// - an exponent without a fraction gets `.0` before the exponent marker
///   (`1e5` → `1.0e5`, `-2E-3` → `-2.0E-3`)
/// - everything else gets `.0` appended (`1` → `1.0`, `-3` → `-3.0`)
pub fn format_real_literal(text: &str) -> String {
    let text = text.trim();
    if text.contains('.') {
        return text.to_string();
    }
    match text.find(['e', 'E']) {
        Some(pos) => format!("{}.0{}", &text[..pos], &text[pos..]),
        None => format!("{text}.0"),
    }
}

/// A real start value together with its rendered text.
#[derive(Debug, Clone, PartialEq)]
pub struct RealLiteral {
    value: f64,
    text: String,
}

impl RealLiteral {
    /// Parse a literal, keeping its spelling (normalized to carry a fraction).
    pub fn parse(text: &str) -> Option<Self> {
        let value: f64 = text.trim().parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        Some(Self {
            value,
            text: format_real_literal(text),
        })
    }

    pub fn from_value(value: f64) -> Self {
        Self {
            value,
            text: format_real_literal(&format!("{value:?}")),
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// A typed start value.
#[derive(Debug, Clone, PartialEq)]
pub enum StartValue {
    Boolean(bool),
    Integer(i64),
    Real(RealLiteral),
    String(String),
    Enumeration(String),
}

impl StartValue {
    /// Parse `text` as a start value of `kind`.
    ///
    /// Booleans accept `true`/`false` (any case) or an integer, zero being false.
    /// String text may be a quoted model literal; the quotes are dropped and
    /// `\\` and `\"` unescaped, so `to_model_literal` gives the literal back.
    pub fn parse(kind: TypeKind, text: &str) -> Option<Self> {
        let trimmed = text.trim();
        match kind {
            TypeKind::Boolean => {
                if trimmed.eq_ignore_ascii_case("true") {
                    Some(Self::Boolean(true))
                } else if trimmed.eq_ignore_ascii_case("false") {
                    Some(Self::Boolean(false))
                } else {
                    trimmed.parse::<i64>().ok().map(|i| Self::Boolean(i != 0))
                }
            }
            TypeKind::Integer => trimmed.parse().ok().map(Self::Integer),
            TypeKind::Real => RealLiteral::parse(trimmed).map(Self::Real),
            TypeKind::String => {
                let value = match trimmed
                    .strip_prefix('"')
                    .and_then(|t| t.strip_suffix('"'))
                {
                    Some(quoted) => unescape_model_string(quoted),
                    None => trimmed.to_string(),
                };
                Some(Self::String(value))
            }
            TypeKind::Enumeration => Some(Self::Enumeration(trimmed.to_string())),
        }
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            Self::Boolean(_) => TypeKind::Boolean,
            Self::Integer(_) => TypeKind::Integer,
            Self::Real(_) => TypeKind::Real,
            Self::String(_) => TypeKind::String,
            Self::Enumeration(_) => TypeKind::Enumeration,
        }
    }

    /// Text of the `start` attribute.
    pub fn to_attribute(&self) -> String {
        match self {
            Self::Boolean(b) => b.to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Real(r) => r.as_str().to_string(),
            Self::String(s) | Self::Enumeration(s) => s.clone(),
        }
    }

    /// Model literal for this value.
    pub fn to_model_literal(&self) -> String {
        match self {
            Self::String(s) => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
            other => other.to_attribute(),
        }
    }
}

/// Undo the `\\` and `\"` escapes of a model string literal.
///
/// Other escapes are kept verbatim.
fn unescape_model_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(next @ ('\\' | '"')) => out.push(next),
            Some(next) => {
                out.push('\\');
                out.push(next);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// `{kind, start}` of a scalar variable.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    pub kind: TypeKind,
    pub start: Option<StartValue>,
}

impl TypeDescriptor {
    pub fn new(kind: TypeKind) -> Self {
        Self { kind, start: None }
    }

    /// Descriptor with a start value parsed from `text`; `None` if it does not parse as `kind`.
    pub fn with_start(kind: TypeKind, text: &str) -> Option<Self> {
        Some(Self {
            kind,
            start: Some(StartValue::parse(kind, text)?),
        })
    }

    /// Name of the internal type this descriptor maps to (`RealPort`, ...).
    pub fn model_type_name(&self) -> Option<&'static str> {
        self.kind.port().map(PortKind::class_name)
    }

    /// Port construction used as the default of a synthesized declaration.
    ///
    /// Without a start value the kind's zero is used.
    pub fn default_initializer(&self) -> Option<Initializer> {
        let port = self.kind.port()?;
        let argument = match &self.start {
            Some(start) => start.to_model_literal(),
            None => match self.kind {
                TypeKind::Boolean => "false".to_string(),
                TypeKind::Integer => "0".to_string(),
                TypeKind::Real => "0.0".to_string(),
                _ => "\"\"".to_string(),
            },
        };
        Some(Initializer::construct(port.class_name(), vec![argument]))
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.start {
            Some(start) => write!(f, "{} {}", self.kind, start.to_attribute()),
            None => write!(f, "{}", self.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", "1.0")]
    #[case("-3", "-3.0")]
    #[case("2.50", "2.50")]
    #[case("1e5", "1.0e5")]
    #[case("-2E-3", "-2.0E-3")]
    #[case("1.5e3", "1.5e3")]
    fn test_format_real_literal(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(format_real_literal(input), expected);
    }

    #[rstest]
    #[case(TypeKind::Boolean, "0", Some(StartValue::Boolean(false)))]
    #[case(TypeKind::Boolean, "1", Some(StartValue::Boolean(true)))]
    #[case(TypeKind::Boolean, "TRUE", Some(StartValue::Boolean(true)))]
    #[case(TypeKind::Boolean, "yes", None)]
    #[case(TypeKind::Integer, "42", Some(StartValue::Integer(42)))]
    #[case(TypeKind::Integer, "4.2", None)]
    #[case(TypeKind::Real, "abc", None)]
    #[case(TypeKind::String, "\"hi\"", Some(StartValue::String("hi".into())))]
    #[case(TypeKind::String, r#" "a\"b" "#, Some(StartValue::String(r#"a"b"#.into())))]
    #[case(TypeKind::String, r#""c:\\tmp""#, Some(StartValue::String(r"c:\tmp".into())))]
    #[case(TypeKind::String, " raw ", Some(StartValue::String("raw".into())))]
    fn test_start_value_parse(
        #[case] kind: TypeKind,
        #[case] text: &str,
        #[case] expected: Option<StartValue>,
    ) {
        assert_eq!(StartValue::parse(kind, text), expected);
    }

    #[rstest]
    #[case(r#""plain""#)]
    #[case(r#""a\"b""#)]
    #[case(r#""c:\\tmp\\""#)]
    fn test_model_string_literal_roundtrip(#[case] literal: &str) {
        let start = StartValue::parse(TypeKind::String, literal).unwrap();
        assert_eq!(start.to_model_literal(), literal);
    }

    #[test]
    fn test_real_start_keeps_fraction() {
        let start = StartValue::parse(TypeKind::Real, "1").unwrap();
        assert_eq!(start.to_attribute(), "1.0");
        assert_eq!(RealLiteral::from_value(1e-5).as_str(), "1.0e-5");
        assert_eq!(RealLiteral::from_value(2.5).value(), 2.5);
        assert!(RealLiteral::parse("inf").is_none());
    }

    #[test]
    fn test_type_mapping() {
        assert_eq!(TypeKind::from_decl(&DeclType::Nat1), Some(TypeKind::Integer));
        assert_eq!(TypeKind::from_decl(&DeclType::string()), Some(TypeKind::String));
        assert_eq!(
            TypeKind::from_decl(&DeclType::Port(PortKind::Real)),
            Some(TypeKind::Real)
        );
        assert_eq!(TypeKind::from_decl(&DeclType::Char), None);
        assert_eq!(TypeKind::Enumeration.port(), None);
        assert_eq!(TypeKind::parse("integer"), Some(TypeKind::Integer));
    }

    #[rstest]
    #[case(TypeDescriptor::new(TypeKind::Real), "new RealPort(0.0)")]
    #[case(TypeDescriptor::with_start(TypeKind::Real, "2").unwrap(), "new RealPort(2.0)")]
    #[case(TypeDescriptor::with_start(TypeKind::Boolean, "0").unwrap(), "new BoolPort(false)")]
    #[case(TypeDescriptor::new(TypeKind::Integer), "new IntPort(0)")]
    #[case(TypeDescriptor::with_start(TypeKind::String, "a\"b").unwrap(), "new StringPort(\"a\\\"b\")")]
    fn test_default_initializer(#[case] ty: TypeDescriptor, #[case] expected: &str) {
        assert_eq!(ty.default_initializer().unwrap().render(), expected);
    }
}
