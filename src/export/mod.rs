//! Export: annotated model → scalar-variable table → description document.
//!
//! ## Pipeline
//!
//! ```text
//! Model ──collect──▶ AnnotationSet ──preflight──▶ DescriptionGenerator ──▶ ModelDescription
//!                                                                              │
//!                                                          DescriptionWriter ◀─┘──▶ XML text
//! ```
//!
//! ## Classification
//!
//! | Declaration                          | Causality | Variability  | Initial      | Start          |
//! |--------------------------------------|-----------|--------------|--------------|----------------|
//! | value with a literal default         | parameter | fixed        | exact        | the literal    |
//! | instance variable, `output`          | output    | discrete     | calculated   | none           |
//! | instance variable, `input`           | input     | continuous   | (omitted)    | default, if any|
//!
//! Anything else that carries an annotation is skipped with a warning and
//! does not consume a value reference.

mod writer;

pub use writer::{DescriptionHeader, DescriptionWriter};

use std::path::Path;

use indexmap::IndexMap;

use crate::base::{Provenance, ProvenanceKind, SourceLocation};
use crate::binding::{
    BindingEntry, Causality, Initial, ModelDescription, ReferenceAllocator, ScalarVariable,
    StartValue, TypeDescriptor, TypeKind, Variability, export_name, qualify,
};
use crate::config::BridgeConfig;
use crate::error::{BridgeError, ConflictError, ValidationError};
use crate::model::{
    Annotation, AnnotationCollector, AnnotationSet, ClassDef, Definition, DefinitionKind,
    Interpreter, LiteralInterpreter, Model, ModelAnnotations, Role,
};
use crate::project::Project;

/// Outcome of classifying one annotated declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub causality: Causality,
    pub variability: Variability,
    pub initial: Option<Initial>,
    /// Whether the declaration's default becomes the start value.
    pub seeds_start: bool,
}

/// Classify a declaration by its kind and annotated role.
///
/// Returns `None` for declarations no rule covers.
pub fn classify(def: &Definition, annotation: &Annotation) -> Option<Classification> {
    match (&def.kind, annotation.role) {
        (DefinitionKind::Value { slot }, _) if slot.initializer().literal_argument().is_some() => {
            Some(Classification {
                causality: Causality::Parameter,
                variability: Variability::Fixed,
                initial: Some(Initial::Exact),
                seeds_start: true,
            })
        }
        (DefinitionKind::InstanceVariable { .. }, Role::Output) => Some(Classification {
            causality: Causality::Output,
            variability: Variability::Discrete,
            initial: Some(Initial::Calculated),
            seeds_start: false,
        }),
        (DefinitionKind::InstanceVariable { .. }, Role::Input) => Some(Classification {
            causality: Causality::Input,
            variability: Variability::Continuous,
            initial: None,
            seeds_start: true,
        }),
        _ => None,
    }
}

/// Builds the scalar-variable table and link records.
pub struct DescriptionGenerator<'a> {
    model: &'a Model,
}

impl<'a> DescriptionGenerator<'a> {
    pub fn new(model: &'a Model) -> Self {
        Self { model }
    }

    /// Generate the description for `annotations`.
    ///
    /// Without a system class nothing is bound, so the table stays empty.
    /// Returns the description together with the warnings raised on the way.
    pub fn generate(
        &self,
        annotations: &AnnotationSet,
        system: Option<&ClassDef>,
    ) -> Result<(ModelDescription, Vec<String>), ValidationError> {
        let mut description = ModelDescription::new();
        let mut warnings = Vec::new();

        let Some(system) = system else {
            tracing::info!("No system class, generating an empty description");
            return Ok((description, warnings));
        };
        tracing::debug!("Generating description for system '{}'", system.name);

        let mut references = ReferenceAllocator::new();
        for (id, annotation) in annotations {
            let (Some(class), Some(def)) = (self.model.class_of(*id), self.model.definition(*id))
            else {
                continue;
            };
            let name = export_name(annotation, class, def);

            let Some(rule) = classify(def, annotation) else {
                let warning = format!(
                    "skipping '{name}': no export rule for a {} annotation on this declaration ({})",
                    annotation.role, annotation.location
                );
                tracing::warn!("{warning}");
                warnings.push(warning);
                continue;
            };

            let kind = TypeKind::from_decl(&def.ty).ok_or_else(|| {
                ValidationError::UnsupportedType {
                    name: name.clone(),
                    ty: def.ty.to_string(),
                    location: def.location.clone(),
                }
            })?;

            let mut ty = TypeDescriptor::new(kind);
            if rule.seeds_start {
                if let Some(text) = def.initializer().and_then(|i| i.literal_argument()) {
                    match StartValue::parse(kind, text) {
                        Some(start) => ty.start = Some(start),
                        None => {
                            let warning = format!(
                                "dropping start value '{text}' of '{name}': not a valid {kind}"
                            );
                            tracing::warn!("{warning}");
                            warnings.push(warning);
                        }
                    }
                }
            }

            let reference = references.next_reference();
            let mut variable = ScalarVariable::new(name, reference, ty)
                .with_causality(rule.causality)
                .with_variability(rule.variability);
            variable.initial = rule.initial;
            tracing::debug!(
                "{} -> {} ({}, vr {})",
                qualify(class, def),
                variable.name,
                rule.causality,
                reference
            );

            description
                .links
                .insert(BindingEntry::new(reference, qualify(class, def)));
            description.push(variable);
        }

        Ok((description, warnings))
    }
}

/// A rendered export.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub description: ModelDescription,
    /// The description document.
    pub text: String,
    pub warnings: Vec<String>,
}

/// Runs preflight checks and renders descriptions.
pub struct Exporter {
    config: BridgeConfig,
    interpreter: Box<dyn Interpreter>,
    collector: Box<dyn AnnotationCollector>,
}

impl Exporter {
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            interpreter: Box::new(LiteralInterpreter),
            collector: Box::new(ModelAnnotations),
        }
    }

    pub fn with_interpreter(mut self, interpreter: impl Interpreter + 'static) -> Self {
        self.interpreter = Box::new(interpreter);
        self
    }

    pub fn with_collector(mut self, collector: impl AnnotationCollector + 'static) -> Self {
        self.collector = Box::new(collector);
        self
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Check everything that would make the export meaningless.
    ///
    /// Returns the collected annotations on success.
    pub fn preflight(&self, model: &Model) -> Result<AnnotationSet, BridgeError> {
        if !self.interpreter.type_check(model) {
            return Err(ValidationError::TypeCheckFailed.into());
        }

        let annotations = self.collector.collect(model);
        tracing::info!("Found {} annotations in model '{}'", annotations.len(), model.name);

        let has_entry = model
            .class(&self.config.entry_class)
            .is_some_and(|c| c.has_explicit_operation(&self.config.run_operation));
        if !has_entry {
            return Err(ValidationError::MissingEntryPoint {
                class: self.config.entry_class.clone(),
                operation: self.config.run_operation.clone(),
            }
            .into());
        }

        check_placement(model, &annotations, &self.config.interface_class)?;
        check_duplicates(model, &annotations)?;

        if let Some(interface) = model.class(&self.config.interface_class) {
            if let Some(def) = interface
                .definitions
                .iter()
                .find(|d| d.is_instance_variable() && d.is_static)
            {
                return Err(ValidationError::StaticInterfaceMember {
                    class: interface.name.to_string(),
                    name: def.name.to_string(),
                    location: def.location.clone(),
                }
                .into());
            }
        }

        Ok(annotations)
    }

    /// Preflight, generate and render the description of `model`.
    pub fn export(&self, model: &Model) -> Result<ExportArtifact, BridgeError> {
        tracing::info!("Starting export for model '{}'", model.name);
        let annotations = self.preflight(model)?;

        let (description, warnings) =
            DescriptionGenerator::new(model).generate(&annotations, model.system())?;

        let mut header =
            DescriptionHeader::from_config(&self.config.description, &model.name, &self.config.tool_id);
        if header.source_files.is_empty() {
            header.source_files = model
                .files()
                .iter()
                .map(|p| p.display().to_string())
                .collect();
        }
        let text = DescriptionWriter::new(&header).write(&description)?;

        tracing::info!(
            "Exported {} scalar variables ({} links)",
            description.variables.len(),
            description.links.len()
        );
        Ok(ExportArtifact {
            description,
            text,
            warnings,
        })
    }

    /// Record a packaged export in the interface class file.
    ///
    /// Prepends an `EXPORT` provenance header when provenance is enabled.
    /// Returns whether the file was touched.
    pub fn record_export(
        &self,
        project: &mut dyn Project,
        model: &Model,
        artifact_name: &str,
        artifact: &[u8],
    ) -> Result<bool, BridgeError> {
        if !self.config.provenance {
            return Ok(false);
        }
        let Some(interface) = model.class(&self.config.interface_class) else {
            tracing::warn!(
                "No class '{}' to record the export in",
                self.config.interface_class
            );
            return Ok(false);
        };

        let file: &Path = &interface.file;
        let text = project.read_source(file)?;
        let header = Provenance::new(
            ProvenanceKind::Export,
            artifact,
            artifact_name,
            &self.config.tool_id,
        );
        project.write_source(file, &header.prepend_to(&text))?;
        tracing::info!("Recorded export of '{}' in {}", artifact_name, file.display());
        Ok(true)
    }
}

/// Input/output annotations must sit in the interface class.
pub(crate) fn check_placement(
    model: &Model,
    annotations: &AnnotationSet,
    interface: &str,
) -> Result<(), ValidationError> {
    for (id, annotation) in annotations {
        let Some(class) = model.class_of(*id) else {
            continue;
        };
        if annotation.role.is_port() && class.name != interface {
            let name = model
                .definition(*id)
                .map(|d| export_name(annotation, class, d))
                .unwrap_or_default();
            return Err(ValidationError::CausalityPlacement {
                name,
                role: annotation.role,
                interface: interface.to_string(),
                location: annotation.location.clone(),
            });
        }
    }
    Ok(())
}

fn check_duplicates(model: &Model, annotations: &AnnotationSet) -> Result<(), ConflictError> {
    let mut seen: IndexMap<String, SourceLocation> = IndexMap::new();
    let mut duplicates = Vec::new();
    for (id, annotation) in annotations {
        let (Some(class), Some(def)) = (model.class_of(*id), model.definition(*id)) else {
            continue;
        };
        let name = export_name(annotation, class, def);
        match seen.get(&name) {
            Some(first) => {
                tracing::warn!(
                    "Duplicate export name '{}' at {} duplicates {}",
                    name,
                    annotation.location,
                    first
                );
                duplicates.push((name, first.clone(), annotation.location.clone()));
            }
            None => {
                seen.insert(name, annotation.location.clone());
            }
        }
    }

    match duplicates.into_iter().next() {
        Some((name, first, second)) => Err(ConflictError::DuplicateName {
            name,
            first,
            second,
        }),
        None => Ok(()),
    }
}
