//! Error types for bridge operations.
//!
//! Every failure is a hard stop: validation happens before any source file
//! is touched, so an error never leaves a half-written model behind.

use std::path::PathBuf;

use thiserror::Error;

use crate::base::SourceLocation;
use crate::binding::TypeKind;
use crate::model::Role;

/// An annotated input the model expects but the description lacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingInput {
    pub name: String,
    pub location: SourceLocation,
}

fn list_inputs(inputs: &[MissingInput]) -> String {
    inputs
        .iter()
        .map(|i| format!("'{}' at {}", i.name, i.location))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Structural problems detected before export or import mutates anything.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("model contains type errors")]
    TypeCheckFailed,

    #[error("missing entry point: class '{class}' has no explicit '{operation}' operation")]
    MissingEntryPoint { class: String, operation: String },

    #[error("class '{class}' not found")]
    MissingClass { class: String },

    #[error("missing '{field}' instance variable in system class '{system}'")]
    MissingInterfaceField { system: String, field: String },

    #[error("annotation of {role} '{name}' outside class '{interface}' is not supported ({location})")]
    CausalityPlacement {
        name: String,
        role: Role,
        interface: String,
        location: SourceLocation,
    },

    #[error(
        "model not compatible with the description, too many inputs defined: {}",
        list_inputs(.0)
    )]
    ExtraInputs(Vec<MissingInput>),

    #[error("class '{class}' must not contain static definitions: '{name}' ({location})")]
    StaticInterfaceMember {
        class: String,
        name: String,
        location: SourceLocation,
    },

    #[error("unsupported type '{ty}' for '{name}' ({location})")]
    UnsupportedType {
        name: String,
        ty: String,
        location: SourceLocation,
    },

    #[error("'{name}' has no characters usable in an identifier")]
    UnrepresentableName { name: String },

    #[error("identifier '{identifier}' for '{name}' collides with an existing declaration")]
    IdentifierCollision { name: String, identifier: String },

    #[error("cannot create '{}': file already exists", .path.display())]
    ScaffoldConflict { path: PathBuf },
}

/// Two declarations claim the same exported name.
#[derive(Debug, Error)]
pub enum ConflictError {
    #[error("duplicate export name '{name}' at {second} duplicates {first}")]
    DuplicateName {
        name: String,
        first: SourceLocation,
        second: SourceLocation,
    },
}

/// Name resolution failures on the stepping API.
#[derive(Debug, Error)]
pub enum BindingError {
    #[error("tried to set unlinked design parameter: {0}")]
    UnboundParameter(String),

    #[error("output not bound: {0}")]
    BoundOutputMissing(String),

    #[error("output not initialized: {0}")]
    OutputUninitialized(String),

    #[error("input not bound: {0}")]
    UnboundInput(String),

    #[error("no scalar variable named '{0}'")]
    UnknownVariable(String),

    #[error("value for '{name}' must be {expected}, found {found}")]
    TypeMismatch {
        name: String,
        expected: TypeKind,
        found: &'static str,
    },
}

/// A parameter literal was rejected; the declaration is left untouched.
#[derive(Debug, Error)]
pub enum ExpressionError {
    #[error("unable to parse parameter expression '{text}': {messages}")]
    Parse { text: String, messages: String },

    #[error("unable to type check parameter expression '{text}': {messages}")]
    TypeCheck { text: String, messages: String },

    #[error("initializer of '{name}' cannot be patched")]
    NotPatchable { name: String },
}

impl ExpressionError {
    pub fn parse(text: impl Into<String>, messages: &[String]) -> Self {
        Self::Parse {
            text: text.into(),
            messages: messages.join(", "),
        }
    }

    pub fn type_check(text: impl Into<String>, messages: &[String]) -> Self {
        Self::TypeCheck {
            text: text.into(),
            messages: messages.join(", "),
        }
    }
}

/// Problems reading or writing the description document.
#[derive(Debug, Error)]
pub enum DescriptionError {
    /// XML parsing or serialization error.
    #[error("XML error: {0}")]
    Xml(String),

    /// Missing required element or attribute.
    #[error("Missing required {kind}: {name}")]
    Missing { kind: &'static str, name: String },

    /// Invalid attribute value.
    #[error("Invalid {kind}: {message}")]
    Invalid { kind: &'static str, message: String },

    /// A scalar variable without a typed child element.
    #[error("Missing type for: {0}")]
    MissingType(String),
}

impl DescriptionError {
    pub fn xml(message: impl Into<String>) -> Self {
        Self::Xml(message.into())
    }

    pub fn missing_attribute(name: impl Into<String>) -> Self {
        Self::Missing {
            kind: "attribute",
            name: name.into(),
        }
    }

    pub fn invalid_attribute(message: impl Into<String>) -> Self {
        Self::Invalid {
            kind: "attribute",
            message: message.into(),
        }
    }
}

/// Value store access violations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("no storage for '{0}'")]
    Unknown(String),

    #[error("'{0}' is transactional and cannot be overwritten directly")]
    NotDirectlyWritable(String),

    #[error("'{0}' does not support staged writes")]
    NotTransactional(String),
}

/// Failure reported by a live simulated instance.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct InstanceError(pub String);

/// Errors surfaced by a stepping session.
#[derive(Debug, Error)]
pub enum SteppingError {
    #[error("instance is busy with another operation")]
    Busy,

    #[error("cannot step back in time: current {current}, requested {target}")]
    TimeRegression { current: f64, target: f64 },

    #[error("instance failed: {0}")]
    Instance(#[from] InstanceError),

    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error(transparent)]
    Expression(#[from] ExpressionError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Any error produced by the bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error(transparent)]
    Expression(#[from] ExpressionError),

    #[error(transparent)]
    Description(#[from] DescriptionError),

    #[error(transparent)]
    Stepping(#[from] SteppingError),

    /// IO error during read/write.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
