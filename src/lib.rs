//! # fmi-bridge
//!
//! Binds an interpreted model to the FMI co-simulation model description:
//! exports annotated declarations as scalar variables, imports a description
//! back into model source, and steps a running instance by exchanging
//! values through the resulting bindings.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! runtime   → Stepping sessions, value store, simulated instances
//!   ↓
//! import    → Description reader, coverage gate, scaffolding, synthesis
//! export    → Classification, description generator and writer
//!   ↓
//! binding   → Scalar variables, value references, link table
//!   ↓
//! model     → Declarations, annotations, interpreter contract
//! project   → Files of a model project
//!   ↓
//! base      → Source locations, provenance headers
//! ```

// ============================================================================
// MODULES (dependency order: base → model → binding → export/import → runtime)
// ============================================================================

/// Foundation types: SourceLocation, Provenance, TextRange
pub mod base;

/// Bridge configuration (`fmi.json`)
pub mod config;

/// Error types shared by every stage
pub mod error;

/// Internal declaration model and interpreter contract
pub mod model;

/// Project files: reading, rewriting and creating model sources
pub mod project;

/// Binding table: scalar variables, value references, links
pub mod binding;

/// Export: annotated model to description document
pub mod export;

/// Import: description document to synthesized declarations
pub mod import;

/// Stepping engine
pub mod runtime;

// Re-export commonly needed items
pub use binding::{
    Causality, ModelDescription, QualifiedName, ScalarVariable, TypeKind, ValueReference,
};
pub use config::{BridgeConfig, ModelDescriptionConfig};
pub use error::{BridgeError, SteppingError};
pub use export::{ExportArtifact, Exporter};
pub use import::{ImportReport, Importer};
pub use model::{Annotation, Model, Role};
pub use project::{FsProject, Project};
pub use runtime::{NamedValue, Session, SimulationInstance, Value};
