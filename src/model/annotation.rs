//! Interface annotations and the collector contract.
//!
//! In model source an annotation is a comment directly above the declaration:
//!
//! ```text
//! -- @ interface: type = input, name="level";
//! public level : RealPort := new RealPort(0.0);
//! ```

use std::fmt;

use indexmap::IndexMap;

use super::{DeclId, Model};
use crate::base::SourceLocation;

/// Role an annotation assigns to its declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Parameter,
    Input,
    Output,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Parameter => "parameter",
            Self::Input => "input",
            Self::Output => "output",
        }
    }

    /// Case-insensitive parse.
    pub fn parse(text: &str) -> Option<Self> {
        [Self::Parameter, Self::Input, Self::Output]
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(text.trim()))
    }

    /// Input and output annotations must live in the interface class.
    pub fn is_port(self) -> bool {
        matches!(self, Self::Input | Self::Output)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interface metadata attached to one declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Explicit exported name; derived from the qualified name when absent.
    pub name: Option<String>,
    pub role: Role,
    pub location: SourceLocation,
}

impl Annotation {
    pub fn new(role: Role) -> Self {
        Self {
            name: None,
            role,
            location: SourceLocation::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }

    /// Parse an annotation comment line. The location is left empty.
    pub fn parse_comment(line: &str) -> Option<Self> {
        let rest = line.trim().strip_prefix("--")?.trim_start();
        let rest = rest.strip_prefix('@')?.trim_start();
        let rest = rest.strip_prefix("interface")?.trim_start();
        let body = rest.strip_prefix(':')?.trim();
        let body = body.strip_suffix(';').unwrap_or(body);

        let mut role = None;
        let mut name = None;
        for pair in body.split(',') {
            let (key, value) = pair.split_once('=')?;
            let value = value.trim();
            match key.trim() {
                "type" => role = Some(Role::parse(value)?),
                "name" => {
                    let unquoted = value.strip_prefix('"')?.strip_suffix('"')?;
                    name = Some(unquoted.to_string());
                }
                _ => {}
            }
        }

        let mut annotation = Self::new(role?);
        annotation.name = name;
        Some(annotation)
    }

    /// Render the annotation comment (without indentation or newline).
    pub fn render_comment(&self) -> String {
        match &self.name {
            Some(name) => format!("-- @ interface: type = {}, name=\"{}\";", self.role, name),
            None => format!("-- @ interface: type = {};", self.role),
        }
    }
}

/// Annotated declarations in encounter order.
pub type AnnotationSet = IndexMap<DeclId, Annotation>;

/// Produces the annotation set of a model.
pub trait AnnotationCollector {
    fn collect(&self, model: &Model) -> AnnotationSet;
}

/// Collector reading the annotations already attached to the model's definitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelAnnotations;

impl AnnotationCollector for ModelAnnotations {
    fn collect(&self, model: &Model) -> AnnotationSet {
        let mut set = AnnotationSet::default();
        for (id, _, def) in model.definitions() {
            if let Some(annotation) = &def.annotation {
                let mut annotation = annotation.clone();
                if annotation.location.file.as_os_str().is_empty() {
                    annotation.location = def.location.clone();
                }
                set.insert(id, annotation);
            }
        }
        tracing::debug!("Collected {} annotations", set.len());
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("-- @ interface: type = input, name=\"level\";", Role::Input, Some("level"))]
    #[case("--@interface:type=OUTPUT,name=\"valve\"", Role::Output, Some("valve"))]
    #[case("\t-- @ interface: type = parameter;", Role::Parameter, None)]
    fn test_parse_comment(#[case] line: &str, #[case] role: Role, #[case] name: Option<&str>) {
        let annotation = Annotation::parse_comment(line).expect("annotation");
        assert_eq!(annotation.role, role);
        assert_eq!(annotation.name.as_deref(), name);
    }

    #[rstest]
    #[case("-- plain comment")]
    #[case("-- @ interface: name=\"x\";")]
    #[case("-- @ interface: type = state;")]
    fn test_parse_comment_rejects(#[case] line: &str) {
        assert!(Annotation::parse_comment(line).is_none());
    }

    #[test]
    fn test_render_comment_parses_back() {
        let annotation = Annotation::new(Role::Input).with_name("a.b");
        let rendered = annotation.render_comment();
        assert_eq!(rendered, "-- @ interface: type = input, name=\"a.b\";");
        assert_eq!(Annotation::parse_comment(&rendered), Some(annotation));
    }
}
