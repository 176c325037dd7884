//! Declared types of model definitions.

use std::fmt;

use smol_str::SmolStr;

/// The four port classes of the FMI port library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortKind {
    Bool,
    Int,
    Real,
    String,
}

impl PortKind {
    pub const ALL: [PortKind; 4] = [Self::Real, Self::Int, Self::Bool, Self::String];

    /// Class name of the port in model source.
    pub fn class_name(self) -> &'static str {
        match self {
            Self::Bool => "BoolPort",
            Self::Int => "IntPort",
            Self::Real => "RealPort",
            Self::String => "StringPort",
        }
    }

    pub fn from_class_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.class_name() == name)
    }
}

/// Type of a model declaration as written in source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeclType {
    Bool,
    Int,
    Nat,
    Nat1,
    Real,
    Char,
    Seq(Box<DeclType>),
    Port(PortKind),
    /// Any other named type (classes, type definitions with invariants, ...).
    Named(SmolStr),
}

impl DeclType {
    /// `seq of char`, the model spelling of a string.
    pub fn string() -> Self {
        Self::Seq(Box::new(Self::Char))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Self::Seq(inner) if **inner == Self::Char)
    }

    /// Numeric but not real.
    pub fn is_integral(&self) -> bool {
        matches!(self, Self::Int | Self::Nat | Self::Nat1)
    }

    pub fn port_kind(&self) -> Option<PortKind> {
        match self {
            Self::Port(kind) => Some(*kind),
            _ => None,
        }
    }
}

impl fmt::Display for DeclType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int"),
            Self::Nat => f.write_str("nat"),
            Self::Nat1 => f.write_str("nat1"),
            Self::Real => f.write_str("real"),
            Self::Char => f.write_str("char"),
            Self::Seq(inner) => write!(f, "seq of {inner}"),
            Self::Port(kind) => f.write_str(kind.class_name()),
            Self::Named(name) => f.write_str(name),
        }
    }
}
