//! Values exchanged with a running instance.

use std::fmt;

use crate::binding::{StartValue, TypeKind};

/// Name of the synthetic output carrying the simulation time.
pub const TIME: &str = "time";

/// A runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Real(f64),
    Integer(i64),
    Boolean(bool),
    String(String),
    /// Declared but never assigned; distinct from zero or empty.
    Undefined,
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Real(_) => "Real",
            Self::Integer(_) => "Integer",
            Self::Boolean(_) => "Boolean",
            Self::String(_) => "String",
            Self::Undefined => "undefined",
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Convert to a value of `kind`, widening integers to real.
    ///
    /// Returns `None` when the value does not fit.
    pub fn coerce(self, kind: TypeKind) -> Option<Self> {
        match (kind, self) {
            (TypeKind::Real, Self::Integer(i)) => Some(Self::Real(i as f64)),
            (TypeKind::Real, v @ Self::Real(_))
            | (TypeKind::Integer, v @ Self::Integer(_))
            | (TypeKind::Boolean, v @ Self::Boolean(_))
            | (TypeKind::String, v @ Self::String(_))
            | (TypeKind::Enumeration, v @ (Self::Integer(_) | Self::String(_))) => Some(v),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Self::Real(r) => Some(*r),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl From<&StartValue> for Value {
    fn from(start: &StartValue) -> Self {
        match start {
            StartValue::Boolean(b) => Self::Boolean(*b),
            StartValue::Integer(i) => Self::Integer(*i),
            StartValue::Real(r) => Self::Real(r.value()),
            StartValue::String(s) | StartValue::Enumeration(s) => Self::String(s.clone()),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Real(r) => write!(f, "{r:?}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Undefined => f.write_str("undefined"),
        }
    }
}

/// A `(name, value)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedValue {
    pub name: String,
    pub value: Value,
}

impl NamedValue {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Value::Integer(2), TypeKind::Real, Some(Value::Real(2.0)))]
    #[case(Value::Real(2.5), TypeKind::Integer, None)]
    #[case(Value::Boolean(true), TypeKind::Boolean, Some(Value::Boolean(true)))]
    #[case(Value::from("x"), TypeKind::Real, None)]
    #[case(Value::Undefined, TypeKind::Real, None)]
    fn test_coerce(#[case] value: Value, #[case] kind: TypeKind, #[case] expected: Option<Value>) {
        assert_eq!(value.coerce(kind), expected);
    }

    #[test]
    fn test_from_start_value() {
        let start = StartValue::parse(TypeKind::Real, "1").unwrap();
        assert_eq!(Value::from(&start), Value::Real(1.0));
        assert_eq!(Value::Real(1.0).to_string(), "1.0");
    }
}
