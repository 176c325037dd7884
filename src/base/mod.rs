//! Foundation types shared by every other module.
//!
//! - [`SourceLocation`], [`Position`] - where a declaration lives in model source
//! - [`TextRange`], [`TextSize`] - byte offsets used for splicing
//! - [`Provenance`] - traceability header lines prepended to mutated files
//!
//! This module has NO dependencies on other crate modules.

mod position;
mod provenance;

pub use position::{Position, SourceLocation};
pub use provenance::{Provenance, ProvenanceKind, content_hash};

pub use text_size::{TextRange, TextSize};
