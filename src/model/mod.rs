//! Internal declaration model.
//!
//! The bridge never parses or interprets model source itself. A front end
//! hands it a [`Model`]: classes with their value, instance-variable and
//! operation definitions, the declared types, default expressions, and the
//! interface [`Annotation`]s found above each declaration.
//!
//! ```text
//! Model
//! ├── classes: Vec<ClassDef>        (source order)
//! │   └── definitions: Vec<Definition>
//! │       ├── kind: Value { slot } | InstanceVariable { initializer } | Operation
//! │       ├── ty: DeclType
//! │       └── annotation: Option<Annotation>
//! └── name
//! ```
//!
//! The two collaborators consulted as black boxes, the annotation collector
//! and the interpreter, are the [`AnnotationCollector`] and [`Interpreter`]
//! traits.

mod annotation;
mod initializer;
mod interpreter;
pub mod lexer;
mod types;

pub use annotation::{Annotation, AnnotationCollector, AnnotationSet, ModelAnnotations, Role};
pub use initializer::{Initializer, ParameterSlot};
pub use interpreter::{ExprType, Interpreter, LiteralInterpreter, TypedExpr};
pub use types::{DeclType, PortKind};

use std::path::{Path, PathBuf};

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use crate::base::SourceLocation;

/// Index of a definition inside a [`Model`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId {
    pub class: u32,
    pub index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    /// The system class describing the deployed architecture.
    System,
}

impl ClassKind {
    fn keyword(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::System => "system",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DefinitionKind {
    /// A constant value; its default expression is the parameter slot.
    Value { slot: ParameterSlot },
    InstanceVariable { initializer: Option<Initializer> },
    Operation { explicit: bool },
}

/// One declaration of a class.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub name: SmolStr,
    pub kind: DefinitionKind,
    pub ty: DeclType,
    pub is_static: bool,
    pub location: SourceLocation,
    pub annotation: Option<Annotation>,
}

impl Definition {
    fn new(name: impl Into<SmolStr>, kind: DefinitionKind, ty: DeclType) -> Self {
        Self {
            name: name.into(),
            kind,
            ty,
            is_static: false,
            location: SourceLocation::default(),
            annotation: None,
        }
    }

    pub fn value(name: impl Into<SmolStr>, ty: DeclType, initializer: Initializer) -> Self {
        Self::new(
            name,
            DefinitionKind::Value {
                slot: ParameterSlot::new(initializer),
            },
            ty,
        )
    }

    pub fn instance_variable(
        name: impl Into<SmolStr>,
        ty: DeclType,
        initializer: Option<Initializer>,
    ) -> Self {
        Self::new(name, DefinitionKind::InstanceVariable { initializer }, ty)
    }

    /// An explicit operation; its type is irrelevant to the bridge.
    pub fn operation(name: impl Into<SmolStr>) -> Self {
        Self::new(
            name,
            DefinitionKind::Operation { explicit: true },
            DeclType::Named(SmolStr::new("()")),
        )
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotation = Some(annotation);
        self
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }

    pub fn into_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn is_value(&self) -> bool {
        matches!(self.kind, DefinitionKind::Value { .. })
    }

    pub fn is_instance_variable(&self) -> bool {
        matches!(self.kind, DefinitionKind::InstanceVariable { .. })
    }

    /// The default expression, if the definition has one.
    pub fn initializer(&self) -> Option<&Initializer> {
        match &self.kind {
            DefinitionKind::Value { slot } => Some(slot.initializer()),
            DefinitionKind::InstanceVariable { initializer } => initializer.as_ref(),
            DefinitionKind::Operation { .. } => None,
        }
    }

    pub fn slot_mut(&mut self) -> Option<&mut ParameterSlot> {
        match &mut self.kind {
            DefinitionKind::Value { slot } => Some(slot),
            _ => None,
        }
    }
}

/// A class (or the system class) of the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    pub name: SmolStr,
    pub kind: ClassKind,
    pub file: PathBuf,
    /// Byte range of the class name in `file`; new sections are spliced after it.
    pub name_range: TextRange,
    pub definitions: Vec<Definition>,
}

impl ClassDef {
    pub fn new(name: impl Into<SmolStr>, file: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            kind: ClassKind::Class,
            file: file.into(),
            name_range: TextRange::default(),
            definitions: Vec::new(),
        }
    }

    pub fn system(name: impl Into<SmolStr>, file: impl Into<PathBuf>) -> Self {
        Self {
            kind: ClassKind::System,
            ..Self::new(name, file)
        }
    }

    /// Locate the class header (`class Name` / `system Name`) in `text`.
    pub fn locate_in(mut self, text: &str) -> Option<Self> {
        self.name_range = find_header(text, self.kind, &self.name)?;
        Some(self)
    }

    /// Add a definition; an empty location is pointed at this class's file.
    pub fn with_definition(mut self, def: Definition) -> Self {
        self.push_definition(def);
        self
    }

    pub fn push_definition(&mut self, mut def: Definition) {
        if def.location.file.as_os_str().is_empty() {
            def.location = SourceLocation::new(
                self.file.clone(),
                def.location.position,
                def.location.range,
            );
        }
        self.definitions.push(def);
    }

    pub fn is_system(&self) -> bool {
        self.kind == ClassKind::System
    }

    pub fn find(&self, name: &str) -> Option<&Definition> {
        self.definitions.iter().find(|d| d.name == name)
    }

    pub fn has_explicit_operation(&self, name: &str) -> bool {
        self.definitions.iter().any(|d| {
            d.name == name && matches!(d.kind, DefinitionKind::Operation { explicit: true })
        })
    }

    pub fn has_instance_variable(&self, name: &str) -> bool {
        self.definitions
            .iter()
            .any(|d| d.name == name && d.is_instance_variable())
    }
}

/// Byte range of `name` in the first `<keyword> <name>` header of `text`.
pub(crate) fn find_header(text: &str, kind: ClassKind, name: &str) -> Option<TextRange> {
    let keyword = kind.keyword();
    let mut search = 0;
    while let Some(found) = text[search..].find(keyword) {
        let start = search + found;
        let after_keyword = start + keyword.len();
        let rest = &text[after_keyword..];
        let trimmed = rest.trim_start();
        let name_start = after_keyword + (rest.len() - trimmed.len());
        let name_end = name_start + name.len();
        let at_line_start = start == 0 || text[..start].ends_with('\n');
        let separated = name_start > after_keyword;
        let name_matches = trimmed.starts_with(name)
            && !text[name_end..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_');
        if at_line_start && separated && name_matches {
            return Some(TextRange::new(
                TextSize::new(name_start as u32),
                TextSize::new(name_end as u32),
            ));
        }
        search = after_keyword;
    }
    None
}

/// A complete model snapshot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Model {
    pub name: String,
    pub classes: Vec<ClassDef>,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            classes: Vec::new(),
        }
    }

    pub fn with_class(mut self, class: ClassDef) -> Self {
        self.classes.push(class);
        self
    }

    pub fn class(&self, name: &str) -> Option<&ClassDef> {
        self.classes.iter().find(|c| c.name == name)
    }

    /// The system class, if the model has one.
    pub fn system(&self) -> Option<&ClassDef> {
        self.classes.iter().find(|c| c.is_system())
    }

    pub fn class_of(&self, id: DeclId) -> Option<&ClassDef> {
        self.classes.get(id.class as usize)
    }

    pub fn definition(&self, id: DeclId) -> Option<&Definition> {
        self.class_of(id)?.definitions.get(id.index as usize)
    }

    pub fn definition_mut(&mut self, id: DeclId) -> Option<&mut Definition> {
        self.classes
            .get_mut(id.class as usize)?
            .definitions
            .get_mut(id.index as usize)
    }

    /// Every definition with its id and owning class, in source order.
    pub fn definitions(&self) -> impl Iterator<Item = (DeclId, &ClassDef, &Definition)> {
        self.classes.iter().enumerate().flat_map(|(ci, class)| {
            class.definitions.iter().enumerate().map(move |(di, def)| {
                let id = DeclId {
                    class: ci as u32,
                    index: di as u32,
                };
                (id, class, def)
            })
        })
    }

    /// Find a definition by `Class.name`.
    pub fn find_qualified(&self, qualified: &str) -> Option<DeclId> {
        let (class, name) = qualified.rsplit_once('.')?;
        self.definitions()
            .find(|(_, c, d)| c.name == class && d.name == name)
            .map(|(id, _, _)| id)
    }

    /// Drop every annotation, leaving the bare declarations.
    pub fn strip_annotations(&mut self) {
        for class in &mut self.classes {
            for def in &mut class.definitions {
                def.annotation = None;
            }
        }
    }

    /// Files holding the model's classes, deduplicated in class order.
    pub fn files(&self) -> Vec<&Path> {
        let mut files: Vec<&Path> = Vec::new();
        for class in &self.classes {
            if !files.contains(&class.file.as_path()) {
                files.push(&class.file);
            }
        }
        files
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Model {
        Model::new("wt").with_class(
            ClassDef::new("Controller", "Controller.vdmrt")
                .with_definition(Definition::value(
                    "maxLevel",
                    DeclType::Real,
                    Initializer::literal("3"),
                ))
                .with_definition(Definition::operation("loop")),
        )
    }

    #[test]
    fn test_find_qualified() {
        let model = sample();
        let id = model.find_qualified("Controller.maxLevel").unwrap();
        assert_eq!(id, DeclId { class: 0, index: 0 });
        assert!(model.find_qualified("Controller.missing").is_none());
        assert!(model.find_qualified("maxLevel").is_none());
    }

    #[test]
    fn test_with_definition_defaults_location_to_class_file() {
        let model = sample();
        let def = model.definition(DeclId { class: 0, index: 0 }).unwrap();
        assert_eq!(def.location.file.as_ref(), Path::new("Controller.vdmrt"));
    }

    #[test]
    fn test_locate_header() {
        let text = "-- hdr\nclass HardwareInterfaceX\nend HardwareInterfaceX\nclass HardwareInterface\nend HardwareInterface\n";
        let class = ClassDef::new("HardwareInterface", "hwi.vdmrt")
            .locate_in(text)
            .unwrap();
        let start: usize = class.name_range.start().into();
        let end: usize = class.name_range.end().into();
        assert_eq!(&text[start..end], "HardwareInterface");
        assert!(text[..start].ends_with("class "));
        assert!(text[end..].starts_with('\n'));
        assert!(start > text.find("end HardwareInterfaceX").unwrap());
    }

    #[test]
    fn test_locate_system_header() {
        let text = "system System\nend System\n";
        let class = ClassDef::system("System", "System.vdmrt").locate_in(text).unwrap();
        assert_eq!(class.name_range, TextRange::new(7.into(), 13.into()));
        assert!(ClassDef::new("System", "x").locate_in(text).is_none());
    }
}
