//! Bridge configuration (stored as `fmi.json`).
//!
//! Names the designated scopes of the model, switches traceability headers
//! on or off and carries the header fields of the generated description.

use serde::{Deserialize, Serialize};

/// File name used when the configuration lives next to the model sources.
pub const CONFIG_FILE: &str = "fmi.json";

fn default_tool_id() -> String {
    format!("fmi-bridge/{}", env!("CARGO_PKG_VERSION"))
}

fn default_interface_class() -> String {
    "HardwareInterface".to_string()
}

fn default_entry_class() -> String {
    "World".to_string()
}

fn default_run_operation() -> String {
    "run".to_string()
}

fn default_interface_field() -> String {
    "hwi".to_string()
}

fn default_true() -> bool {
    true
}

/// Top-level configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeConfig {
    /// Prepend traceability headers to mutated files.
    #[serde(default)]
    pub provenance: bool,

    /// Tool identity written into headers and the description.
    #[serde(default = "default_tool_id")]
    pub tool_id: String,

    /// Class that holds every input/output declaration.
    #[serde(default = "default_interface_class")]
    pub interface_class: String,

    /// Class holding the run operation.
    #[serde(default = "default_entry_class")]
    pub entry_class: String,

    #[serde(default = "default_run_operation")]
    pub run_operation: String,

    /// Instance variable of the system class referencing the interface.
    #[serde(default = "default_interface_field")]
    pub interface_field: String,

    #[serde(default)]
    pub description: ModelDescriptionConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            provenance: false,
            tool_id: default_tool_id(),
            interface_class: default_interface_class(),
            entry_class: default_entry_class(),
            run_operation: default_run_operation(),
            interface_field: default_interface_field(),
            description: ModelDescriptionConfig::default(),
        }
    }
}

impl BridgeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable traceability headers.
    pub fn with_provenance(mut self, enabled: bool) -> Self {
        self.provenance = enabled;
        self
    }

    pub fn with_tool_id(mut self, tool_id: impl Into<String>) -> Self {
        self.tool_id = tool_id.into();
        self
    }

    pub fn with_description(mut self, description: ModelDescriptionConfig) -> Self {
        self.description = description;
        self
    }

    /// Read a configuration from a JSON file.
    pub fn read_from_file(path: impl AsRef<std::path::Path>) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path.as_ref())?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Write the configuration to a JSON file.
    pub fn write_to_file(&self, path: impl AsRef<std::path::Path>) -> Result<(), std::io::Error> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path.as_ref(), json)
    }
}

/// Header fields of the generated model description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptionConfig {
    #[serde(default)]
    pub model_name: String,

    /// Defaults to `model_name` when empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub model_identifier: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub author: String,

    /// Fixed GUID; a fresh one is generated per export when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,

    #[serde(default = "default_true")]
    pub needs_execution_tool: bool,

    #[serde(default)]
    pub can_be_instantiated_only_once_per_process: bool,

    /// Model source files listed in the co-simulation section.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_files: Vec<String>,
}

impl Default for ModelDescriptionConfig {
    fn default() -> Self {
        Self {
            model_name: String::new(),
            model_identifier: String::new(),
            description: String::new(),
            author: String::new(),
            guid: None,
            needs_execution_tool: true,
            can_be_instantiated_only_once_per_process: false,
            source_files: Vec::new(),
        }
    }
}

impl ModelDescriptionConfig {
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            ..Self::default()
        }
    }

    pub fn with_guid(mut self, guid: impl Into<String>) -> Self {
        self.guid = Some(guid.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_source_file(mut self, path: impl Into<String>) -> Self {
        self.source_files.push(path.into());
        self
    }

    /// Identifier used for binaries and the co-simulation section.
    pub fn identifier(&self) -> &str {
        if self.model_identifier.is_empty() {
            &self.model_name
        } else {
            &self.model_identifier
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: BridgeConfig = serde_json::from_str(r#"{ "provenance": true }"#).unwrap();
        assert!(config.provenance);
        assert_eq!(config.interface_class, "HardwareInterface");
        assert_eq!(config.entry_class, "World");
        assert_eq!(config.run_operation, "run");
        assert_eq!(config.interface_field, "hwi");
        assert!(config.description.needs_execution_tool);
        assert!(config.tool_id.starts_with("fmi-bridge/"));
    }

    #[test]
    fn test_config_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let config = BridgeConfig::new()
            .with_provenance(true)
            .with_description(ModelDescriptionConfig::new("wt2").with_guid("{abc}"));

        config.write_to_file(&path).unwrap();
        let json = std::fs::read_to_string(&path).unwrap();
        assert!(json.contains("\"modelName\": \"wt2\""));

        let parsed = BridgeConfig::read_from_file(&path).unwrap();
        assert_eq!(parsed, config);
        assert_eq!(parsed.description.identifier(), "wt2");
    }
}
