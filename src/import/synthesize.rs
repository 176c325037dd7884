//! Declaration fragments for unbound scalar variables.
//!
//! Fragments are grouped into three sections spliced right after the
//! interface class name:
//!
//! ```text
//! class HardwareInterface
//! values
//! 	-- @ interface: type = parameter, name="maxLevel";
//! 	public maxLevel : RealPort = new RealPort(2.0);
//!
//! instance variables
//! 	-- @ interface: type = input, name="level";
//! 	public level : RealPort := new RealPort(0.0);
//!
//! instance variables
//! 	-- @ interface: type = output, name="valve";
//! 	public valve : BoolPort;
//! ```

use rustc_hash::FxHashSet;
use text_size::TextRange;

use crate::binding::{Causality, ScalarVariable};
use crate::error::ValidationError;
use crate::model::{Annotation, DeclType, Definition, Initializer, PortKind, Role};

/// Strip every character outside `[A-Za-z0-9()[]]`.
pub fn sanitize_identifier(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '(' | ')' | '[' | ']'))
        .collect()
}

/// One declaration to add to the interface class.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedDeclaration {
    /// Name on the wire, kept as the annotation name.
    pub external_name: String,
    pub identifier: String,
    pub role: Role,
    pub port: PortKind,
    /// `None` for outputs.
    pub initializer: Option<Initializer>,
}

impl SynthesizedDeclaration {
    /// Build the declaration for `variable`.
    ///
    /// Returns `Ok(None)` for causalities and types that are not synthesized.
    pub fn for_variable(variable: &ScalarVariable) -> Result<Option<Self>, ValidationError> {
        let role = match variable.effective_causality() {
            Causality::Parameter => Role::Parameter,
            Causality::Input => Role::Input,
            Causality::Output => Role::Output,
            Causality::CalculatedParameter | Causality::Independent | Causality::Local => {
                return Ok(None);
            }
        };
        let Some(port) = variable.ty.kind.port() else {
            return Ok(None);
        };

        let identifier = sanitize_identifier(&variable.name);
        if identifier.is_empty() {
            return Err(ValidationError::UnrepresentableName {
                name: variable.name.clone(),
            });
        }

        let initializer = match role {
            Role::Output => None,
            Role::Parameter | Role::Input => variable.ty.default_initializer(),
        };

        Ok(Some(Self {
            external_name: variable.name.clone(),
            identifier,
            role,
            port,
            initializer,
        }))
    }

    fn annotation(&self) -> Annotation {
        Annotation::new(self.role).with_name(self.external_name.as_str())
    }

    /// Source text: the annotation comment and the declaration, tab indented.
    pub fn render(&self) -> String {
        let comment = self.annotation().render_comment();
        let ty = self.port.class_name();
        let declaration = match (&self.role, &self.initializer) {
            (Role::Parameter, Some(init)) => {
                format!("public {} : {} = {};", self.identifier, ty, init)
            }
            (_, Some(init)) => format!("public {} : {} := {};", self.identifier, ty, init),
            (_, None) => format!("public {} : {};", self.identifier, ty),
        };
        format!("\t{comment}\n\t{declaration}\n")
    }

    /// The declaration as a model definition, for callers that adopt the
    /// result without re-reading the source.
    pub fn to_definition(&self) -> Definition {
        let ty = DeclType::Port(self.port);
        let def = match (self.role, &self.initializer) {
            (Role::Parameter, Some(init)) => {
                Definition::value(self.identifier.as_str(), ty, init.clone())
            }
            (_, init) => Definition::instance_variable(self.identifier.as_str(), ty, init.clone()),
        };
        def.with_annotation(self.annotation())
    }
}

/// Declarations grouped by section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Synthesis {
    pub values: Vec<SynthesizedDeclaration>,
    pub inputs: Vec<SynthesizedDeclaration>,
    pub outputs: Vec<SynthesizedDeclaration>,
}

impl Synthesis {
    pub fn push(&mut self, decl: SynthesizedDeclaration) {
        match decl.role {
            Role::Parameter => self.values.push(decl),
            Role::Input => self.inputs.push(decl),
            Role::Output => self.outputs.push(decl),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.inputs.is_empty() && self.outputs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len() + self.inputs.len() + self.outputs.len()
    }

    /// All declarations in section order.
    pub fn iter(&self) -> impl Iterator<Item = &SynthesizedDeclaration> {
        self.values.iter().chain(&self.inputs).chain(&self.outputs)
    }

    /// Reject identifiers that clash with `existing` members or with each other.
    pub fn check_identifiers<'a>(
        &self,
        existing: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), ValidationError> {
        let mut taken: FxHashSet<&str> = existing.into_iter().collect();
        for decl in self.iter() {
            if !taken.insert(decl.identifier.as_str()) {
                return Err(ValidationError::IdentifierCollision {
                    name: decl.external_name.clone(),
                    identifier: decl.identifier.clone(),
                });
            }
        }
        Ok(())
    }

    /// Text inserted after the class name.
    pub fn sections(&self) -> String {
        let mut text = String::new();
        for (header, decls) in [
            ("values", &self.values),
            ("instance variables", &self.inputs),
            ("instance variables", &self.outputs),
        ] {
            if decls.is_empty() {
                continue;
            }
            text.push('\n');
            text.push_str(header);
            text.push('\n');
            for decl in decls {
                text.push_str(&decl.render());
            }
        }
        text
    }
}

/// Insert `insertion` right after `anchor`.
pub fn splice(text: &str, anchor: TextRange, insertion: &str) -> String {
    let at = usize::from(anchor.end()).min(text.len());
    let mut out = String::with_capacity(text.len() + insertion.len());
    out.push_str(&text[..at]);
    out.push_str(insertion);
    out.push_str(&text[at..]);
    out
}
