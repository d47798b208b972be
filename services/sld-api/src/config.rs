//! Service configuration loading and types.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use sld_protocol::{MarshalContext, NamespaceTable};

/// Service configuration loaded from a YAML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub output: OutputConfig,

    /// Bindings declared in addition to the `ogc`, `gml` and `sld` defaults.
    pub namespaces: Vec<NamespaceBinding>,
}

/// Formatting of generated documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Spaces per nesting level. `None` writes compact output.
    pub indent: Option<usize>,

    /// Emit an `<?xml ...?>` declaration before the root element.
    pub xml_declaration: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceBinding {
    pub prefix: String,
    pub uri: String,
}

impl ServiceConfig {
    /// Load configuration from a YAML file.
    pub fn load_from_file(path: &str) -> Result<Self> {
        let file = Path::new(path);

        // If the file doesn't exist, fall back to the SLD 1.0.0 defaults
        if !file.exists() {
            tracing::warn!("Config file {} does not exist, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read: {:?}", file))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse: {:?}", file))?;

        tracing::info!(
            indent = ?config.output.indent,
            xml_declaration = config.output.xml_declaration,
            namespaces = config.namespaces.len(),
            "Loaded service config from {:?}",
            file
        );
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for binding in &self.namespaces {
            if binding.prefix.is_empty() || binding.uri.is_empty() {
                anyhow::bail!("namespace bindings need both a prefix and a uri");
            }
        }
        Ok(())
    }

    /// Build the marshalling context every request is encoded with.
    pub fn marshal_context(&self) -> MarshalContext {
        let namespaces = self
            .namespaces
            .iter()
            .fold(NamespaceTable::default(), |table, binding| {
                table.bind(binding.prefix.as_str(), binding.uri.as_str())
            });

        MarshalContext::sld_1_0_0()
            .with_namespaces(namespaces)
            .with_indent(self.output.indent)
            .with_xml_declaration(self.output.xml_declaration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = ServiceConfig::load_from_file("/nonexistent/sld-api.yaml").unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.marshal_context(), MarshalContext::sld_1_0_0());
    }

    #[test]
    fn test_load_from_file() {
        let dir = test_utils::temp_test_dir();
        let path = dir.path().join("sld-api.yaml");
        std::fs::write(&path, "output:\n  xml_declaration: true\n").unwrap();

        let config = ServiceConfig::load_from_file(path.to_str().unwrap()).unwrap();
        assert!(config.output.xml_declaration);
        assert_eq!(config.output.indent, None);
    }

    #[test]
    fn test_invalid_yaml_file_is_an_error() {
        let dir = test_utils::temp_test_dir();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "output: [unterminated").unwrap();
        assert!(ServiceConfig::load_from_file(path.to_str().unwrap()).is_err());
    }

    #[test]
    fn test_parse_yaml() {
        let config = ServiceConfig::from_yaml(
            r#"
output:
  indent: 4
  xml_declaration: true
namespaces:
  - prefix: xlink
    uri: http://www.w3.org/1999/xlink
"#,
        )
        .unwrap();

        assert_eq!(config.output.indent, Some(4));
        let ctx = config.marshal_context();
        assert!(ctx.xml_declaration());
        assert_eq!(ctx.namespaces().len(), 4);
        assert_eq!(ctx.sld_prefix(), Some("sld"));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = ServiceConfig::from_yaml("output:\n  indent: 2\n").unwrap();
        assert!(!config.output.xml_declaration);
        assert!(config.namespaces.is_empty());
    }

    #[test]
    fn test_empty_binding_rejected() {
        let result = ServiceConfig::from_yaml("namespaces:\n  - prefix: ''\n    uri: urn:x\n");
        assert!(result.is_err());
    }
}
