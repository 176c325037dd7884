//! Import gates that run before anything is written.

use rustc_hash::FxHashSet;

use crate::binding::{ModelDescription, ScalarVariable, TypeKind, export_name};
use crate::error::{MissingInput, ValidationError};
use crate::model::{AnnotationSet, Model, Role};

/// Effective exported names of every annotated declaration.
pub fn bound_names(model: &Model, annotations: &AnnotationSet) -> FxHashSet<String> {
    annotations
        .iter()
        .filter_map(|(id, annotation)| {
            let class = model.class_of(*id)?;
            let def = model.definition(*id)?;
            Some(export_name(annotation, class, def))
        })
        .collect()
}

/// Every annotated input must be offered by the description.
pub fn check_coverage(
    model: &Model,
    annotations: &AnnotationSet,
    description: &ModelDescription,
) -> Result<(), ValidationError> {
    let mut missing = Vec::new();
    for (id, annotation) in annotations {
        if annotation.role != Role::Input {
            continue;
        }
        let (Some(class), Some(def)) = (model.class_of(*id), model.definition(*id)) else {
            continue;
        };
        let name = export_name(annotation, class, def);
        if description.variable(&name).is_none() {
            tracing::warn!(
                "Input '{}' not defined in model description ({})",
                name,
                annotation.location
            );
            missing.push(MissingInput {
                name,
                location: annotation.location.clone(),
            });
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::ExtraInputs(missing))
    }
}

/// Warnings for names present on both sides whose types disagree.
pub fn type_warnings(
    model: &Model,
    annotations: &AnnotationSet,
    description: &ModelDescription,
) -> Vec<String> {
    let mut warnings = Vec::new();
    for (id, annotation) in annotations {
        let (Some(class), Some(def)) = (model.class_of(*id), model.definition(*id)) else {
            continue;
        };
        let name = export_name(annotation, class, def);
        let Some(variable) = description.variable(&name) else {
            continue;
        };
        if TypeKind::from_decl(&def.ty) != Some(variable.ty.kind) {
            let importing = variable
                .ty
                .model_type_name()
                .unwrap_or(variable.ty.kind.as_str());
            let warning = format!(
                "'{name}' is defined as '{}' but imported as '{importing}' ({})",
                def.ty, def.location
            );
            tracing::warn!("{warning}");
            warnings.push(warning);
        }
    }
    warnings
}

/// Split the description into already-bound and still-unbound variables.
pub fn partition_bound<'a>(
    description: &'a ModelDescription,
    bound: &FxHashSet<String>,
) -> (Vec<&'a ScalarVariable>, Vec<&'a ScalarVariable>) {
    description
        .variables
        .iter()
        .partition(|v| bound.contains(&v.name))
}
