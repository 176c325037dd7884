//! Description document reader.
//!
//! Only the parts import needs are read: every `ScalarVariable` with its
//! typed child, and the `link` records of the vendor annotations. Element
//! prefixes are ignored, enumerated attribute values are matched
//! case-insensitively.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use rustc_hash::FxHashMap;

use crate::binding::{
    BindingEntry, Causality, Initial, ModelDescription, ScalarVariable, StartValue,
    TypeDescriptor, TypeKind, ValueReference, Variability,
};
use crate::error::DescriptionError;

/// A `ScalarVariable` whose typed child has not been seen yet.
struct PendingVariable {
    name: String,
    value_reference: ValueReference,
    description: Option<String>,
    causality: Option<Causality>,
    variability: Option<Variability>,
    initial: Option<Initial>,
    ty: Option<TypeDescriptor>,
}

impl PendingVariable {
    fn finish(self) -> Result<ScalarVariable, DescriptionError> {
        let ty = self
            .ty
            .ok_or_else(|| DescriptionError::MissingType(self.name.clone()))?;
        Ok(ScalarVariable {
            name: self.name,
            value_reference: self.value_reference,
            description: self.description,
            causality: self.causality,
            variability: self.variability,
            initial: self.initial,
            ty,
        })
    }
}

/// Reads a [`ModelDescription`] from XML.
#[derive(Default)]
pub struct DescriptionReader {
    description: ModelDescription,
    pending: Option<PendingVariable>,
}

impl DescriptionReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(mut self, input: &[u8]) -> Result<ModelDescription, DescriptionError> {
        let mut reader = Reader::from_reader(input);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => self.handle_start(e)?,
                Ok(Event::Empty(ref e)) => {
                    // Self-closing element - handle as start + end
                    self.handle_start(e)?;
                    if e.local_name().as_ref() == b"ScalarVariable" {
                        self.finish_variable()?;
                    }
                }
                Ok(Event::End(ref e)) => {
                    if e.local_name().as_ref() == b"ScalarVariable" {
                        self.finish_variable()?;
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(DescriptionError::xml(format!(
                        "XML parse error at position {}: {e}",
                        reader.error_position()
                    )));
                }
                _ => {}
            }
            buf.clear();
        }

        tracing::debug!(
            "Read {} scalar variables and {} links",
            self.description.variables.len(),
            self.description.links.len()
        );
        Ok(self.description)
    }

    fn handle_start(&mut self, e: &BytesStart<'_>) -> Result<(), DescriptionError> {
        let local = e.local_name();
        let tag = std::str::from_utf8(local.as_ref())
            .map_err(|e| DescriptionError::xml(format!("Invalid tag name: {e}")))?;

        match tag {
            "ScalarVariable" => {
                let attrs = attributes(e)?;
                self.pending = Some(scalar_variable(&attrs)?);
            }
            "link" => {
                let attrs = attributes(e)?;
                let reference = value_reference(&attrs)?;
                let name = required(&attrs, "name")?;
                self.description
                    .links
                    .insert(BindingEntry::new(reference, name.as_str().into()));
            }
            _ => {
                let Some(pending) = self.pending.as_mut() else {
                    return Ok(());
                };
                let Some(kind) = TypeKind::parse(tag) else {
                    return Ok(());
                };
                if pending.ty.is_some() {
                    return Ok(());
                }
                let attrs = attributes(e)?;
                let mut ty = TypeDescriptor::new(kind);
                if let Some(start) = attrs.get("start") {
                    let value = StartValue::parse(kind, start).ok_or_else(|| {
                        DescriptionError::invalid_attribute(format!(
                            "start '{start}' of '{}' is not a valid {kind}",
                            pending.name
                        ))
                    })?;
                    ty.start = Some(value);
                }
                pending.ty = Some(ty);
            }
        }
        Ok(())
    }

    fn finish_variable(&mut self) -> Result<(), DescriptionError> {
        if let Some(pending) = self.pending.take() {
            let variable = pending.finish()?;
            self.description.push(variable);
        }
        Ok(())
    }
}

/// Read a description document.
pub fn read_description(input: &[u8]) -> Result<ModelDescription, DescriptionError> {
    DescriptionReader::new().read(input)
}

type Attributes = FxHashMap<String, String>;

fn attributes(e: &BytesStart<'_>) -> Result<Attributes, DescriptionError> {
    let mut attrs = Attributes::default();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| DescriptionError::xml(format!("Invalid attribute: {e}")))?;
        let key = std::str::from_utf8(attr.key.local_name().as_ref())
            .map_err(|e| DescriptionError::xml(format!("Invalid attribute name: {e}")))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| DescriptionError::xml(format!("Invalid attribute value: {e}")))?
            .into_owned();
        attrs.insert(key, value);
    }
    Ok(attrs)
}

fn required<'a>(attrs: &'a Attributes, name: &str) -> Result<&'a String, DescriptionError> {
    attrs
        .get(name)
        .ok_or_else(|| DescriptionError::missing_attribute(name))
}

fn value_reference(attrs: &Attributes) -> Result<ValueReference, DescriptionError> {
    let text = required(attrs, "valueReference")?;
    text.trim().parse().map_err(|_| {
        DescriptionError::invalid_attribute(format!("valueReference '{text}' is not a number"))
    })
}

fn optional<T>(
    attrs: &Attributes,
    key: &str,
    owner: &str,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>, DescriptionError> {
    match attrs.get(key) {
        None => Ok(None),
        Some(text) => parse(text).map(Some).ok_or_else(|| {
            DescriptionError::invalid_attribute(format!("{key} '{text}' of '{owner}'"))
        }),
    }
}

fn scalar_variable(attrs: &Attributes) -> Result<PendingVariable, DescriptionError> {
    let name = required(attrs, "name")?.clone();
    let value_reference = value_reference(attrs)?;
    Ok(PendingVariable {
        causality: optional(attrs, "causality", &name, Causality::parse)?,
        variability: optional(attrs, "variability", &name, Variability::parse)?,
        initial: optional(attrs, "initial", &name, Initial::parse)?,
        description: attrs.get("description").cloned(),
        name,
        value_reference,
        ty: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<fmi:fmiModelDescription xmlns:fmi="urn:fmi" fmiVersion="2.0" modelName="wt">
  <TypeDefinitions>
    <SimpleType name="T"><Real unit="m"/></SimpleType>
  </TypeDefinitions>
  <VendorAnnotations>
    <Tool name="x"><Links><link valueReference="1" name="HardwareInterface.level"/></Links></Tool>
  </VendorAnnotations>
  <fmi:ModelVariables>
    <ScalarVariable name="maxLevel" valueReference="0" causality="PARAMETER" variability="fixed" initial="Exact">
      <Real start="2"/>
    </ScalarVariable>
    <ScalarVariable name="level" valueReference="1" causality="input">
      <Annotations/>
      <Real/>
    </ScalarVariable>
    <ScalarVariable name="flag" valueReference="2"><Boolean start="0"/></ScalarVariable>
  </fmi:ModelVariables>
</fmi:fmiModelDescription>"#;

    #[test]
    fn test_read_variables_and_links() {
        let desc = read_description(DOC.as_bytes()).unwrap();
        assert_eq!(desc.variables.len(), 3);

        let max_level = desc.variable("maxLevel").unwrap();
        assert_eq!(max_level.causality, Some(Causality::Parameter));
        assert_eq!(max_level.initial, Some(Initial::Exact));
        assert_eq!(max_level.ty.start.as_ref().unwrap().to_attribute(), "2.0");

        let level = desc.variable("level").unwrap();
        assert_eq!(level.causality, Some(Causality::Input));
        assert!(level.ty.start.is_none());

        let flag = desc.variable("flag").unwrap();
        assert_eq!(flag.causality, None);
        assert_eq!(flag.ty.start, Some(StartValue::Boolean(false)));

        assert_eq!(
            desc.link_for("level").map(|q| q.as_str()),
            Some("HardwareInterface.level")
        );
    }

    #[test]
    fn test_missing_type_fails() {
        let doc = r#"<fmiModelDescription><ModelVariables>
            <ScalarVariable name="x" valueReference="0"/>
        </ModelVariables></fmiModelDescription>"#;
        let err = read_description(doc.as_bytes()).unwrap_err();
        assert!(matches!(err, DescriptionError::MissingType(name) if name == "x"));
    }

    #[test]
    fn test_malformed_start_fails() {
        let doc = r#"<fmiModelDescription><ModelVariables>
            <ScalarVariable name="x" valueReference="0"><Integer start="1.5"/></ScalarVariable>
        </ModelVariables></fmiModelDescription>"#;
        let err = read_description(doc.as_bytes()).unwrap_err();
        assert!(matches!(err, DescriptionError::Invalid { .. }));
    }

    #[test]
    fn test_missing_value_reference_fails() {
        let doc = r#"<fmiModelDescription><ModelVariables>
            <ScalarVariable name="x"><Real/></ScalarVariable>
        </ModelVariables></fmiModelDescription>"#;
        let err = read_description(doc.as_bytes()).unwrap_err();
        assert!(matches!(err, DescriptionError::Missing { name, .. } if name == "valueReference"));
    }

    #[test]
    fn test_malformed_xml_fails() {
        let err = read_description(b"<fmiModelDescription><ModelVariables></fmiModelDescription>")
            .unwrap_err();
        assert!(matches!(err, DescriptionError::Xml(_)));
    }
}
