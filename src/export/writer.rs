//! FMI 2.0 model description writer.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <fmiModelDescription fmiVersion="2.0" modelName="wt" guid="{...}" ...>
//!   <CoSimulation modelIdentifier="wt" needsExecutionTool="true" ...>
//!     <SourceFiles>
//!       <File name="HardwareInterface.vdmrt"/>
//!     </SourceFiles>
//!   </CoSimulation>
//!   <VendorAnnotations>
//!     <Tool name="fmi-bridge/0.3.0-alpha">
//!       <Links>
//!         <link valueReference="0" name="Controller.maxLevel"/>
//!       </Links>
//!     </Tool>
//!   </VendorAnnotations>
//!   <ModelVariables>
//!     <!-- Index 1 -->
//!     <ScalarVariable name="maxLevel" valueReference="0" causality="parameter" ...>
//!       <Real start="2.0"/>
//!     </ScalarVariable>
//!   </ModelVariables>
//!   <ModelStructure>
//!     <Outputs>
//!       <Unknown index="2"/>
//!     </Outputs>
//!   </ModelStructure>
//! </fmiModelDescription>
//! ```

use std::io::Cursor;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::binding::{Causality, ModelDescription, ScalarVariable};
use crate::config::ModelDescriptionConfig;
use crate::error::DescriptionError;

/// Header attributes of the description document.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptionHeader {
    pub model_name: String,
    pub model_identifier: String,
    pub description: String,
    pub author: String,
    pub guid: String,
    pub generation_tool: String,
    pub generated_at: String,
    pub needs_execution_tool: bool,
    pub can_be_instantiated_only_once_per_process: bool,
    pub source_files: Vec<String>,
}

impl DescriptionHeader {
    /// Build a header, falling back to `model_name` and a fresh GUID where
    /// the configuration leaves fields empty.
    pub fn from_config(config: &ModelDescriptionConfig, model_name: &str, tool_id: &str) -> Self {
        let name = if config.model_name.is_empty() {
            model_name.to_string()
        } else {
            config.model_name.clone()
        };
        let identifier = if config.identifier().is_empty() {
            name.clone()
        } else {
            config.identifier().to_string()
        };
        let guid = config
            .guid
            .clone()
            .unwrap_or_else(|| format!("{{{}}}", uuid::Uuid::new_v4()));

        Self {
            model_name: name,
            model_identifier: identifier,
            description: config.description.clone(),
            author: config.author.clone(),
            guid,
            generation_tool: tool_id.to_string(),
            generated_at: chrono::Local::now()
                .format("%Y-%m-%dT%H:%M:%S")
                .to_string(),
            needs_execution_tool: config.needs_execution_tool,
            can_be_instantiated_only_once_per_process: config
                .can_be_instantiated_only_once_per_process,
            source_files: config.source_files.clone(),
        }
    }

    pub fn with_source_files(mut self, files: Vec<String>) -> Self {
        self.source_files = files;
        self
    }
}

fn write_err(e: impl std::fmt::Display) -> DescriptionError {
    DescriptionError::xml(format!("Write error: {e}"))
}

fn flag(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

/// Serializes a [`ModelDescription`].
pub struct DescriptionWriter<'a> {
    header: &'a DescriptionHeader,
}

impl<'a> DescriptionWriter<'a> {
    pub fn new(header: &'a DescriptionHeader) -> Self {
        Self { header }
    }

    pub fn write(&self, description: &ModelDescription) -> Result<String, DescriptionError> {
        let mut buffer = Cursor::new(Vec::new());
        let mut writer = Writer::new_with_indent(&mut buffer, b' ', 2);

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(write_err)?;

        let mut root = BytesStart::new("fmiModelDescription");
        root.push_attribute(("fmiVersion", "2.0"));
        root.push_attribute(("modelName", self.header.model_name.as_str()));
        root.push_attribute(("guid", self.header.guid.as_str()));
        root.push_attribute(("description", self.header.description.as_str()));
        root.push_attribute(("author", self.header.author.as_str()));
        root.push_attribute(("generationTool", self.header.generation_tool.as_str()));
        root.push_attribute(("generationDateAndTime", self.header.generated_at.as_str()));
        root.push_attribute(("variableNamingConvention", "flat"));
        root.push_attribute(("numberOfEventIndicators", "0"));
        writer.write_event(Event::Start(root)).map_err(write_err)?;

        self.write_co_simulation(&mut writer)?;
        self.write_links(&mut writer, description)?;
        self.write_variables(&mut writer, description)?;
        self.write_structure(&mut writer, description)?;

        writer
            .write_event(Event::End(BytesEnd::new("fmiModelDescription")))
            .map_err(write_err)?;

        let mut output = buffer.into_inner();
        output.push(b'\n');
        String::from_utf8(output).map_err(write_err)
    }

    fn write_co_simulation<W: std::io::Write>(
        &self,
        writer: &mut Writer<W>,
    ) -> Result<(), DescriptionError> {
        let header = self.header;
        let mut co_sim = BytesStart::new("CoSimulation");
        co_sim.push_attribute(("modelIdentifier", header.model_identifier.as_str()));
        co_sim.push_attribute(("needsExecutionTool", flag(header.needs_execution_tool)));
        co_sim.push_attribute(("canHandleVariableCommunicationStepSize", "true"));
        co_sim.push_attribute(("canInterpolateInputs", "false"));
        co_sim.push_attribute(("maxOutputDerivativeOrder", "0"));
        co_sim.push_attribute(("canRunAsynchronuously", "false"));
        co_sim.push_attribute((
            "canBeInstantiatedOnlyOncePerProcess",
            flag(header.can_be_instantiated_only_once_per_process),
        ));
        co_sim.push_attribute(("canNotUseMemoryManagementFunctions", "true"));
        co_sim.push_attribute(("canGetAndSetFMUstate", "false"));
        co_sim.push_attribute(("canSerializeFMUstate", "false"));
        co_sim.push_attribute(("providesDirectionalDerivative", "false"));

        if header.source_files.is_empty() {
            return writer.write_event(Event::Empty(co_sim)).map_err(write_err).map(|_| ());
        }

        writer.write_event(Event::Start(co_sim)).map_err(write_err)?;
        writer
            .write_event(Event::Start(BytesStart::new("SourceFiles")))
            .map_err(write_err)?;
        for file in &header.source_files {
            let mut elem = BytesStart::new("File");
            elem.push_attribute(("name", file.as_str()));
            writer.write_event(Event::Empty(elem)).map_err(write_err)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new("SourceFiles")))
            .map_err(write_err)?;
        writer
            .write_event(Event::End(BytesEnd::new("CoSimulation")))
            .map_err(write_err)?;
        Ok(())
    }

    fn write_links<W: std::io::Write>(
        &self,
        writer: &mut Writer<W>,
        description: &ModelDescription,
    ) -> Result<(), DescriptionError> {
        writer
            .write_event(Event::Start(BytesStart::new("VendorAnnotations")))
            .map_err(write_err)?;
        let mut tool = BytesStart::new("Tool");
        tool.push_attribute(("name", self.header.generation_tool.as_str()));
        writer.write_event(Event::Start(tool)).map_err(write_err)?;

        if description.links.is_empty() {
            writer
                .write_event(Event::Empty(BytesStart::new("Links")))
                .map_err(write_err)?;
        } else {
            writer
                .write_event(Event::Start(BytesStart::new("Links")))
                .map_err(write_err)?;
            for entry in description.links.iter() {
                let reference = entry.value_reference.to_string();
                let mut link = BytesStart::new("link");
                link.push_attribute(("valueReference", reference.as_str()));
                link.push_attribute(("name", entry.qualified_name.as_str()));
                writer.write_event(Event::Empty(link)).map_err(write_err)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new("Links")))
                .map_err(write_err)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new("Tool")))
            .map_err(write_err)?;
        writer
            .write_event(Event::End(BytesEnd::new("VendorAnnotations")))
            .map_err(write_err)?;
        Ok(())
    }

    fn write_variables<W: std::io::Write>(
        &self,
        writer: &mut Writer<W>,
        description: &ModelDescription,
    ) -> Result<(), DescriptionError> {
        if description.variables.is_empty() {
            return writer
                .write_event(Event::Empty(BytesStart::new("ModelVariables")))
                .map_err(write_err)
                .map(|_| ());
        }

        writer
            .write_event(Event::Start(BytesStart::new("ModelVariables")))
            .map_err(write_err)?;
        for (i, variable) in description.variables.iter().enumerate() {
            let comment = format!(" Index {} ", i + 1);
            writer
                .write_event(Event::Comment(BytesText::new(&comment)))
                .map_err(write_err)?;
            Self::write_variable(writer, variable)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new("ModelVariables")))
            .map_err(write_err)?;
        Ok(())
    }

    fn write_variable<W: std::io::Write>(
        writer: &mut Writer<W>,
        variable: &ScalarVariable,
    ) -> Result<(), DescriptionError> {
        let reference = variable.value_reference.to_string();
        let mut elem = BytesStart::new("ScalarVariable");
        elem.push_attribute(("name", variable.name.as_str()));
        elem.push_attribute(("valueReference", reference.as_str()));
        if let Some(description) = &variable.description {
            elem.push_attribute(("description", description.as_str()));
        }
        if let Some(causality) = variable.causality {
            elem.push_attribute(("causality", causality.as_str()));
        }
        if let Some(variability) = variable.variability {
            elem.push_attribute(("variability", variability.as_str()));
        }
        // Inputs never carry `initial`.
        if variable.causality != Some(Causality::Input) {
            if let Some(initial) = variable.initial {
                elem.push_attribute(("initial", initial.as_str()));
            }
        }
        writer.write_event(Event::Start(elem)).map_err(write_err)?;

        let mut ty = BytesStart::new(variable.ty.kind.as_str());
        if let Some(start) = &variable.ty.start {
            let start = start.to_attribute();
            ty.push_attribute(("start", start.as_str()));
        }
        writer.write_event(Event::Empty(ty)).map_err(write_err)?;

        writer
            .write_event(Event::End(BytesEnd::new("ScalarVariable")))
            .map_err(write_err)?;
        Ok(())
    }

    fn write_structure<W: std::io::Write>(
        &self,
        writer: &mut Writer<W>,
        description: &ModelDescription,
    ) -> Result<(), DescriptionError> {
        writer
            .write_event(Event::Start(BytesStart::new("ModelStructure")))
            .map_err(write_err)?;
        if description.outputs.is_empty() {
            writer
                .write_event(Event::Empty(BytesStart::new("Outputs")))
                .map_err(write_err)?;
        } else {
            writer
                .write_event(Event::Start(BytesStart::new("Outputs")))
                .map_err(write_err)?;
            for index in &description.outputs {
                let index = index.to_string();
                let mut unknown = BytesStart::new("Unknown");
                unknown.push_attribute(("index", index.as_str()));
                writer.write_event(Event::Empty(unknown)).map_err(write_err)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new("Outputs")))
                .map_err(write_err)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new("ModelStructure")))
            .map_err(write_err)?;
        Ok(())
    }
}
