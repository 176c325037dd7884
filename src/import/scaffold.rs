//! Minimum model structure an import needs.
//!
//! ```text
//! <entry>.vdmrt          class with the explicit run operation
//! lib/Fmi.vdmrt          Port, RealPort, IntPort, BoolPort, StringPort
//! <interface>.vdmrt      the interface class new declarations are spliced into
//! System.vdmrt           system class holding the static interface field
//! ```
//!
//! Missing pieces are planned here and created by the importer once every
//! gate has passed. A present entry class without its run operation, or a
//! present system class without the interface field, aborts the import.

use std::path::{Path, PathBuf};

use crate::base::SourceLocation;
use crate::config::BridgeConfig;
use crate::error::ValidationError;
use crate::model::{ClassDef, DeclType, Definition, Initializer, Model, PortKind, find_header};
use crate::project::Project;

pub const PORT_LIBRARY_PATH: &str = "lib/Fmi.vdmrt";
const SYSTEM_CLASS: &str = "System";

const PORT_LIBRARY: &str = r#"class Port

types
	public String = seq of char;
	public ValueTypes = bool | real | int | String;

instance variables
	protected value : [ValueTypes] := nil;

operations
	public setValue : ValueTypes ==> ()
	setValue(v) == value := v;

end Port

class IntPort is subclass of Port

operations
	public IntPort : int ==> IntPort
	IntPort(v) == setValue(v);

	public getValue : () ==> int
	getValue() == return value;

end IntPort

class BoolPort is subclass of Port

operations
	public BoolPort : bool ==> BoolPort
	BoolPort(v) == setValue(v);

	public getValue : () ==> bool
	getValue() == return value;

end BoolPort

class RealPort is subclass of Port

operations
	public RealPort : real ==> RealPort
	RealPort(v) == setValue(v);

	public getValue : () ==> real
	getValue() == return value;

end RealPort

class StringPort is subclass of Port

operations
	public StringPort : String ==> StringPort
	StringPort(v) == setValue(v);

	public getValue : () ==> String
	getValue() == return value;

end StringPort
"#;

fn entry_template(class: &str, operation: &str) -> String {
    format!(
        "class {class}\n\noperations\n\npublic {operation} : () ==> ()\n{operation}() ==\n(\n\tskip;\n);\n\nend {class}\n"
    )
}

fn interface_template(class: &str) -> String {
    format!("class {class}\n\nend {class}\n")
}

fn system_template(system: &str, field: &str, interface: &str) -> String {
    format!(
        "system {system}\n\ninstance variables\n\n\tpublic static {field}: {interface} := new {interface}();\n\noperations\n\npublic {system} : () ==> {system}\n{system}() ==\n(\n\tskip;\n);\n\nend {system}\n"
    )
}

/// Which piece of structure a file provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaffoldKind {
    EntryClass,
    PortLibrary,
    InterfaceClass,
    SystemClass,
}

/// One file to create, with the classes it defines.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaffoldFile {
    pub kind: ScaffoldKind,
    pub path: PathBuf,
    pub text: String,
    pub classes: Vec<ClassDef>,
}

impl ScaffoldFile {
    fn new(kind: ScaffoldKind, path: impl Into<PathBuf>, text: String) -> Self {
        Self {
            kind,
            path: path.into(),
            text,
            classes: Vec::new(),
        }
    }

    fn with_class(mut self, class: ClassDef) -> Self {
        let mut class = ClassDef {
            file: self.path.clone(),
            ..class
        };
        if let Some(range) = find_header(&self.text, class.kind, &class.name) {
            class.name_range = range;
        }
        for def in &mut class.definitions {
            def.location = SourceLocation::new(self.path.clone(), def.location.position, def.location.range);
        }
        self.classes.push(class);
        self
    }
}

/// Files that must be created before declarations can be spliced in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScaffoldPlan {
    pub files: Vec<ScaffoldFile>,
}

impl ScaffoldPlan {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get(&self, kind: ScaffoldKind) -> Option<&ScaffoldFile> {
        self.files.iter().find(|f| f.kind == kind)
    }

    /// Check `model` and plan every missing piece.
    pub fn for_model(
        model: &Model,
        config: &BridgeConfig,
        project: &dyn Project,
    ) -> Result<Self, ValidationError> {
        let mut plan = Self::default();

        tracing::debug!("Checking class '{}'", config.entry_class);
        match model.class(&config.entry_class) {
            Some(entry) if !entry.has_explicit_operation(&config.run_operation) => {
                return Err(ValidationError::MissingEntryPoint {
                    class: config.entry_class.clone(),
                    operation: config.run_operation.clone(),
                });
            }
            Some(_) => {}
            None => {
                let text = entry_template(&config.entry_class, &config.run_operation);
                plan.files.push(
                    ScaffoldFile::new(
                        ScaffoldKind::EntryClass,
                        format!("{}.vdmrt", config.entry_class),
                        text,
                    )
                    .with_class(
                        ClassDef::new(config.entry_class.as_str(), "")
                            .with_definition(Definition::operation(config.run_operation.as_str())),
                    ),
                );
            }
        }

        tracing::debug!("Checking for the port library");
        let has_ports = model.class("Port").is_some()
            && PortKind::ALL
                .iter()
                .all(|k| model.class(k.class_name()).is_some());
        if !has_ports {
            let mut file = ScaffoldFile::new(
                ScaffoldKind::PortLibrary,
                PORT_LIBRARY_PATH,
                PORT_LIBRARY.to_string(),
            )
            .with_class(ClassDef::new("Port", ""));
            for kind in PortKind::ALL {
                file = file.with_class(ClassDef::new(kind.class_name(), ""));
            }
            plan.files.push(file);
        }

        tracing::debug!("Checking class '{}'", config.interface_class);
        if model.class(&config.interface_class).is_none() {
            plan.files.push(
                ScaffoldFile::new(
                    ScaffoldKind::InterfaceClass,
                    format!("{}.vdmrt", config.interface_class),
                    interface_template(&config.interface_class),
                )
                .with_class(ClassDef::new(config.interface_class.as_str(), "")),
            );
        }

        tracing::debug!("Checking the system");
        match model.system() {
            Some(system) if !system.has_instance_variable(&config.interface_field) => {
                return Err(ValidationError::MissingInterfaceField {
                    system: system.name.to_string(),
                    field: config.interface_field.clone(),
                });
            }
            Some(_) => {}
            None => {
                let field = Definition::instance_variable(
                    config.interface_field.as_str(),
                    DeclType::Named(config.interface_class.as_str().into()),
                    Some(Initializer::construct(config.interface_class.as_str(), vec![])),
                )
                .into_static();
                plan.files.push(
                    ScaffoldFile::new(
                        ScaffoldKind::SystemClass,
                        format!("{SYSTEM_CLASS}.vdmrt"),
                        system_template(
                            SYSTEM_CLASS,
                            &config.interface_field,
                            &config.interface_class,
                        ),
                    )
                    .with_class(ClassDef::system(SYSTEM_CLASS, "").with_definition(field)),
                );
            }
        }

        for file in &plan.files {
            if project.exists(&file.path) {
                return Err(ValidationError::ScaffoldConflict {
                    path: file.path.clone(),
                });
            }
        }
        Ok(plan)
    }

    /// Create every planned file.
    pub fn create(&self, project: &mut dyn Project) -> std::io::Result<Vec<PathBuf>> {
        let mut created = Vec::new();
        for file in &self.files {
            project.create_file(&file.path, &file.text)?;
            created.push(file.path.clone());
        }
        Ok(created)
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(|f| f.path.as_path())
    }
}
