//! Interpreter contract and the built-in literal interpreter.

use smol_str::SmolStr;

use super::lexer::{LiteralKind, classify_literal, tokenize};
use super::{DeclType, DefinitionKind, Initializer, Model, PortKind};

/// Type of a checked expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprType {
    Bool,
    Int,
    Real,
    Char,
    String,
    Nil,
    /// An object of the named class.
    Object(SmolStr),
}

impl ExprType {
    fn of_literal(kind: LiteralKind) -> Self {
        match kind {
            LiteralKind::Bool => Self::Bool,
            LiteralKind::Nil => Self::Nil,
            LiteralKind::Int => Self::Int,
            LiteralKind::Real => Self::Real,
            LiteralKind::Char => Self::Char,
            LiteralKind::Str => Self::String,
        }
    }

    /// Whether a value of this type may be the argument of a port of `kind`.
    ///
    /// Integers widen to real. Objects never fit, so ports do not nest.
    pub fn fits_port(&self, kind: PortKind) -> bool {
        match (kind, self) {
            (PortKind::Real, Self::Real | Self::Int) => true,
            (PortKind::Int, Self::Int) => true,
            (PortKind::Bool, Self::Bool) => true,
            (PortKind::String, Self::String) => true,
            _ => false,
        }
    }

    /// Whether a value of this type conforms to a declared type.
    pub fn conforms_to(&self, ty: &DeclType) -> bool {
        match ty {
            DeclType::Real => matches!(self, Self::Real | Self::Int),
            DeclType::Int | DeclType::Nat | DeclType::Nat1 => *self == Self::Int,
            DeclType::Bool => *self == Self::Bool,
            DeclType::Char => *self == Self::Char,
            DeclType::Seq(_) if ty.is_string() => *self == Self::String,
            DeclType::Port(kind) => matches!(self, Self::Object(c) if c == kind.class_name()),
            DeclType::Seq(_) | DeclType::Named(_) => true,
        }
    }
}

/// A checked expression with its normalized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedExpr {
    pub text: String,
    pub ty: ExprType,
}

/// Black-box model interpreter.
///
/// Errors are returned as the checker's message list.
pub trait Interpreter: Send + Sync {
    /// Type check the whole model.
    fn type_check(&self, model: &Model) -> bool;

    /// Parse a standalone expression, returning its normalized text.
    fn parse_expression(&self, text: &str) -> Result<String, Vec<String>>;

    /// Type check a standalone expression.
    fn type_check_expression(&self, text: &str) -> Result<TypedExpr, Vec<String>>;
}

/// Interpreter that understands literals and port constructions only.
///
/// Enough to validate parameter overrides and to act as the design-time
/// checker when no full interpreter is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralInterpreter;

impl LiteralInterpreter {
    fn check_initializer(&self, initializer: &Initializer) -> Result<ExprType, Vec<String>> {
        match initializer {
            Initializer::Literal(text) => classify_literal(text)
                .map(ExprType::of_literal)
                .ok_or_else(|| vec![format!("'{text}' is not a literal")]),
            Initializer::Construct { class, args } => {
                if let Some(kind) = PortKind::from_class_name(class) {
                    match args.as_slice() {
                        [] => {}
                        [arg] => {
                            let ty = self.type_check_expression(arg)?.ty;
                            if !ty.fits_port(kind) {
                                return Err(vec![format!(
                                    "{} cannot be constructed from {:?}",
                                    kind.class_name(),
                                    ty
                                )]);
                            }
                        }
                        _ => {
                            return Err(vec![format!(
                                "{} takes at most one argument",
                                kind.class_name()
                            )]);
                        }
                    }
                }
                Ok(ExprType::Object(class.clone()))
            }
            Initializer::Expr(text) => Err(vec![format!("unsupported expression '{text}'")]),
        }
    }
}

impl Interpreter for LiteralInterpreter {
    fn type_check(&self, model: &Model) -> bool {
        let mut ok = true;
        for (_, class, def) in model.definitions() {
            let initializer = match &def.kind {
                DefinitionKind::Value { slot } => slot.initializer(),
                DefinitionKind::InstanceVariable {
                    initializer: Some(initializer),
                } => initializer,
                _ => continue,
            };
            match self.check_initializer(initializer) {
                Ok(ty) if ty.conforms_to(&def.ty) => {}
                Ok(ty) => {
                    tracing::warn!(
                        "{}.{}: expected {}, found {:?} ({})",
                        class.name,
                        def.name,
                        def.ty,
                        ty,
                        def.location
                    );
                    ok = false;
                }
                Err(messages) => {
                    tracing::warn!(
                        "{}.{}: {} ({})",
                        class.name,
                        def.name,
                        messages.join(", "),
                        def.location
                    );
                    ok = false;
                }
            }
        }
        ok
    }

    fn parse_expression(&self, text: &str) -> Result<String, Vec<String>> {
        let tokens = tokenize(text)
            .map_err(|e| vec![format!("unexpected character at offset {}", u32::from(e.offset))])?;
        if tokens.is_empty() {
            return Err(vec!["expected an expression".to_string()]);
        }
        match Initializer::parse(text) {
            Initializer::Expr(_) => Err(vec![format!("expected a literal expression, found '{}'", text.trim())]),
            parsed => Ok(parsed.render()),
        }
    }

    fn type_check_expression(&self, text: &str) -> Result<TypedExpr, Vec<String>> {
        let normalized = self.parse_expression(text)?;
        let ty = self.check_initializer(&Initializer::parse(&normalized))?;
        Ok(TypedExpr {
            text: normalized,
            ty,
        })
    }
}
