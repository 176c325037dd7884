//! Binding table: the canonical mapping between model declarations and
//! exported scalar variables.
//!
//! ```text
//! Definition ──qualify──▶ QualifiedName ◀──link── ValueReference
//!     │                                                 │
//!     └── annotation name (or qualified name) ──▶ ScalarVariable.name
//! ```
//!
//! Nothing here is persisted. References are handed out by a
//! [`ReferenceAllocator`] that restarts at zero for every export run, and
//! the qualified name of a declaration only depends on its owning class and
//! local name, so links stay valid across re-exports.

mod scalar;
mod types;

pub use scalar::{Causality, Initial, ScalarVariable, Variability};
pub use types::{RealLiteral, StartValue, TypeDescriptor, TypeKind, format_real_literal};

use std::fmt;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::model::{Annotation, ClassDef, Definition};

/// Numeric identity of a scalar variable within one description.
pub type ValueReference = u32;

/// Monotonic value reference counter.
#[derive(Debug, Clone, Default)]
pub struct ReferenceAllocator {
    next: ValueReference,
}

impl ReferenceAllocator {
    /// Counter starting at 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter continuing after an already used reference.
    pub fn after(existing_max: ValueReference) -> Self {
        Self {
            next: existing_max.saturating_add(1),
        }
    }

    pub fn next_reference(&mut self) -> ValueReference {
        let reference = self.next;
        self.next += 1;
        reference
    }

    /// Number of references handed out by a fresh counter so far.
    pub fn assigned(&self) -> u32 {
        self.next
    }
}

/// `OwningClass.name` of a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName(String);

impl QualifiedName {
    pub fn new(class: &str, name: &str) -> Self {
        Self(format!("{class}.{name}"))
    }

    /// Split into owning class and local name.
    pub fn parts(&self) -> (&str, &str) {
        self.0.rsplit_once('.').unwrap_or(("", &self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QualifiedName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Qualified name of `def` inside `class`.
pub fn qualify(class: &ClassDef, def: &Definition) -> QualifiedName {
    QualifiedName::new(&class.name, &def.name)
}

/// Exported name: the annotation's explicit name, else the qualified name.
pub fn export_name(annotation: &Annotation, class: &ClassDef, def: &Definition) -> String {
    match &annotation.name {
        Some(name) => name.clone(),
        None => qualify(class, def).0,
    }
}

/// One `(valueReference, qualifiedName)` link record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingEntry {
    pub value_reference: ValueReference,
    pub qualified_name: QualifiedName,
}

impl BindingEntry {
    pub fn new(value_reference: ValueReference, qualified_name: QualifiedName) -> Self {
        Self {
            value_reference,
            qualified_name,
        }
    }
}

/// Link records of one description, in reference order of insertion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkTable {
    links: IndexMap<ValueReference, QualifiedName>,
    by_name: FxHashMap<QualifiedName, ValueReference>,
}

impl LinkTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a link, replacing any previous link with the same reference.
    pub fn insert(&mut self, entry: BindingEntry) {
        if let Some(old) = self
            .links
            .insert(entry.value_reference, entry.qualified_name.clone())
        {
            self.by_name.remove(&old);
        }
        self.by_name
            .insert(entry.qualified_name, entry.value_reference);
    }

    pub fn get(&self, value_reference: ValueReference) -> Option<&QualifiedName> {
        self.links.get(&value_reference)
    }

    pub fn reference_of(&self, qualified: &QualifiedName) -> Option<ValueReference> {
        self.by_name.get(qualified).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = BindingEntry> + '_ {
        self.links
            .iter()
            .map(|(vr, name)| BindingEntry::new(*vr, name.clone()))
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl FromIterator<BindingEntry> for LinkTable {
    fn from_iter<T: IntoIterator<Item = BindingEntry>>(iter: T) -> Self {
        let mut table = Self::new();
        for entry in iter {
            table.insert(entry);
        }
        table
    }
}

/// A complete scalar-variable table with its links.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelDescription {
    /// Variables in encounter order.
    pub variables: Vec<ScalarVariable>,
    pub links: LinkTable,
    /// 1-based indices into `variables` of every output.
    pub outputs: Vec<usize>,
}

impl ModelDescription {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a variable, recording it as an output when its causality says so.
    pub fn push(&mut self, variable: ScalarVariable) {
        let is_output = variable.causality == Some(Causality::Output);
        self.variables.push(variable);
        if is_output {
            self.outputs.push(self.variables.len());
        }
    }

    pub fn variable(&self, name: &str) -> Option<&ScalarVariable> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn by_reference(&self, value_reference: ValueReference) -> Option<&ScalarVariable> {
        self.variables
            .iter()
            .find(|v| v.value_reference == value_reference)
    }

    /// Variables of the given effective causality, in table order.
    pub fn with_causality(&self, causality: Causality) -> impl Iterator<Item = &ScalarVariable> {
        self.variables
            .iter()
            .filter(move |v| v.effective_causality() == causality)
    }

    /// Qualified name linked to the variable called `name`.
    pub fn link_for(&self, name: &str) -> Option<&QualifiedName> {
        self.links.get(self.variable(name)?.value_reference)
    }
}
