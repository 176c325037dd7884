//! Import: description document → declarations spliced into the model.
//!
//! Every gate runs before the first write, in this order:
//!
//! 1. the model type checks
//! 2. the document parses
//! 3. input/output annotations sit in the interface class
//! 4. every annotated input is offered by the document
//! 5. type mismatches between bound names are collected as warnings
//! 6. already-bound variables are filtered out
//! 7. missing scaffolding is planned (or the import aborts)
//! 8. fragments are built and their identifiers checked for collisions
//!
//! Only then are scaffolding files created and the interface class file
//! rewritten, optionally behind a provenance header.

mod reader;
mod scaffold;
mod synthesize;
mod validate;

pub use reader::{DescriptionReader, read_description};
pub use scaffold::{PORT_LIBRARY_PATH, ScaffoldFile, ScaffoldKind, ScaffoldPlan};
pub use synthesize::{Synthesis, SynthesizedDeclaration, sanitize_identifier, splice};
pub use validate::{bound_names, check_coverage, partition_bound, type_warnings};

use std::path::{Path, PathBuf};

use crate::base::{Provenance, ProvenanceKind, content_hash};
use crate::binding::Causality;
use crate::config::BridgeConfig;
use crate::error::{BridgeError, ValidationError};
use crate::export::check_placement;
use crate::model::{
    AnnotationCollector, Interpreter, LiteralInterpreter, Model, ModelAnnotations, find_header,
};
use crate::project::Project;

/// What an import did (or would have done).
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    /// SHA-256 of the imported document.
    pub source_hash: String,
    pub variables_read: usize,
    /// Variables skipped because an annotation already binds their name.
    pub already_bound: Vec<String>,
    /// Variables skipped for their causality.
    pub skipped: Vec<(String, Causality)>,
    /// Variables whose type has no synthesis rule.
    pub unsupported: Vec<String>,
    pub scaffolding: ScaffoldPlan,
    pub synthesis: Synthesis,
    pub interface_class: String,
    /// File the declarations were spliced into.
    pub interface_file: Option<PathBuf>,
    pub warnings: Vec<String>,
}

impl ImportReport {
    /// Whether the import left every file untouched.
    pub fn is_noop(&self) -> bool {
        self.scaffolding.is_empty() && self.synthesis.is_empty()
    }

    /// Files created for missing scaffolding.
    pub fn created(&self) -> Vec<&Path> {
        self.scaffolding.paths().collect()
    }

    /// Bring `model` up to date with what this import wrote.
    ///
    /// Scaffolded classes are added and the synthesized declarations are
    /// appended to the interface class.
    pub fn apply_to(&self, model: &mut Model) {
        for file in &self.scaffolding.files {
            for class in &file.classes {
                if model.class(&class.name).is_none() {
                    model.classes.push(class.clone());
                }
            }
        }
        if let Some(interface) = model
            .classes
            .iter_mut()
            .find(|c| c.name == self.interface_class.as_str())
        {
            for decl in self.synthesis.iter() {
                interface.push_definition(decl.to_definition());
            }
        }
    }
}

/// Imports description documents into a model project.
pub struct Importer {
    config: BridgeConfig,
    interpreter: Box<dyn Interpreter>,
    collector: Box<dyn AnnotationCollector>,
}

impl Importer {
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

    /// Import the document at `path`.
    pub fn import_file(
        &self,
        project: &mut dyn Project,
        model: &Model,
        path: &Path,
    ) -> Result<ImportReport, BridgeError> {
        let document = std::fs::read(path)?;
        let source_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.import(project, model, &source_name, &document)
    }

    /// Import `document` (named `source_name` in provenance headers).
    pub fn import(
        &self,
        project: &mut dyn Project,
        model: &Model,
        source_name: &str,
        document: &[u8],
    ) -> Result<ImportReport, BridgeError> {
        tracing::info!("Starting import of '{}' into '{}'", source_name, project.name());
        let report = self.plan(project, model, document)?;
        if report.is_noop() {
            tracing::info!("Nothing to import, all variables already bound");
            return Ok(report);
        }
        self.apply(project, model, source_name, document, report)
    }

    /// Run every gate and compute the changes, without writing anything.
    pub fn plan(
        &self,
        project: &dyn Project,
        model: &Model,
        document: &[u8],
    ) -> Result<ImportReport, BridgeError> {
        if !self.interpreter.type_check(model) {
            return Err(ValidationError::TypeCheckFailed.into());
        }

        let annotations = self.collector.collect(model);
        tracing::info!("Found {} annotations in model", annotations.len());

        let description = read_description(document)?;
        tracing::info!("Found {} scalar variables", description.variables.len());

        check_placement(model, &annotations, &self.config.interface_class)?;
        check_coverage(model, &annotations, &description)?;

        let mut report = ImportReport {
            source_hash: content_hash(document),
            variables_read: description.variables.len(),
            interface_class: self.config.interface_class.clone(),
            warnings: type_warnings(model, &annotations, &description),
            ..ImportReport::default()
        };

        let bound = bound_names(model, &annotations);
        let (already, fresh) = partition_bound(&description, &bound);
        for variable in already {
            tracing::debug!("Skipping import of '{}'", variable.name);
            report.already_bound.push(variable.name.clone());
        }
        if fresh.is_empty() {
            return Ok(report);
        }

        report.scaffolding = ScaffoldPlan::for_model(model, &self.config, project)?;

        for variable in fresh {
            match SynthesizedDeclaration::for_variable(variable)? {
                Some(decl) => {
                    tracing::debug!("Importing scalar variable '{}'", variable.name);
                    report.synthesis.push(decl);
                }
                None if variable.ty.kind.port().is_none() => {
                    let warning = format!(
                        "'{}' has type {} which cannot be imported",
                        variable.name, variable.ty.kind
                    );
                    tracing::warn!("{warning}");
                    report.warnings.push(warning);
                    report.unsupported.push(variable.name.clone());
                }
                None => {
                    let causality = variable.effective_causality();
                    tracing::info!("Skipping {} '{}'", causality, variable.name);
                    report.skipped.push((variable.name.clone(), causality));
                }
            }
        }

        let existing = model
            .class(&self.config.interface_class)
            .map(|c| c.definitions.iter().map(|d| d.name.as_str()).collect::<Vec<_>>())
            .unwrap_or_default();
        report.synthesis.check_identifiers(existing)?;

        if report.synthesis.is_empty() {
            // Nothing to attach, so missing structure is not needed either.
            report.scaffolding = ScaffoldPlan::default();
        }
        Ok(report)
    }

    fn apply(
        &self,
        project: &mut dyn Project,
        model: &Model,
        source_name: &str,
        document: &[u8],
        mut report: ImportReport,
    ) -> Result<ImportReport, BridgeError> {
        // The interface source is read before any scaffolding file is created.
        let (interface, text) = match model.class(&self.config.interface_class) {
            Some(class) => (class.clone(), project.read_source(&class.file)?),
            None => {
                let file = report
                    .scaffolding
                    .get(ScaffoldKind::InterfaceClass)
                    .ok_or_else(|| ValidationError::MissingClass {
                        class: self.config.interface_class.clone(),
                    })?;
                let class = file.classes.first().cloned().ok_or_else(|| {
                    ValidationError::MissingClass {
                        class: self.config.interface_class.clone(),
                    }
                })?;
                (class, file.text.clone())
            }
        };

        report.scaffolding.create(project)?;

        let anchor = find_header(&text, interface.kind, &interface.name)
            .unwrap_or(interface.name_range);
        let mut updated = splice(&text, anchor, &report.synthesis.sections());

        if self.config.provenance {
            let header = Provenance::new(
                ProvenanceKind::Import,
                document,
                source_name,
                &self.config.tool_id,
            );
            updated = header.prepend_to(&updated);
        }
        project.write_source(&interface.file, &updated)?;

        tracing::info!(
            "Imported {} declarations into {}",
            report.synthesis.len(),
            interface.file.display()
        );
        report.interface_file = Some(interface.file.clone());
        Ok(report)
    }
}
