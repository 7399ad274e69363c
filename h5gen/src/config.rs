//! Configuration management for the generator
//!
//! Every key is optional. A missing file section falls back to the defaults
//! below, which reproduce the behaviour of the generator without any config.

use crate::error::ConfigError;
use clap::ValueEnum;
use h5gen_types::BuiltinKind;
use serde_derive::{Deserialize, Serialize};
use std::path::Path;

/// Layout of the written artifacts, spelled the same in config files and on
/// the command line
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// One header with inline definitions
    #[default]
    HeaderOnly,
    /// A header with declarations plus a source file with definitions
    Split,
}

/// Name lists that drive field classification
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default)]
pub struct ClassifierConfig {
    /// Owning pointer wrappers, matched against the last segment of the template name
    pub smart_pointers: Vec<String>,
    /// Dynamic containers mirrored by a variable-length handle
    pub vector_templates: Vec<String>,
    /// Bounded containers treated like a C array
    pub fixed_array_templates: Vec<String>,
    /// Dynamic text containers
    pub string_types: Vec<String>,
    /// Builtin kinds whose raw pointers are C strings
    pub char_types: Vec<BuiltinKind>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            smart_pointers: vec!["shared_ptr".into(), "unique_ptr".into(), "scoped_ptr".into()],
            vector_templates: vec!["std::vector".into()],
            fixed_array_templates: vec!["std::array".into()],
            string_types: vec!["std::string".into(), "std::u8string".into(), "std::basic_string".into()],
            char_types: vec![BuiltinKind::Char, BuiltinKind::Schar, BuiltinKind::Uchar, BuiltinKind::Char8],
        }
    }
}

/// Configuration structure for the generator
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default)]
pub struct GeneratorConfig {
    /// Namespace wrapping the generated code; inferred from the descriptors when absent
    pub namespace: Option<String>,
    /// Header included by the generated code; defaults to the descriptor source
    pub input_header: Option<String>,
    /// Header providing the `HDF5::to_h5type` primary templates
    pub traits_header: String,
    pub emit_serializers: bool,
    pub output_mode: OutputMode,
    #[serde(flatten)]
    pub classifier: ClassifierConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            input_header: None,
            traits_header: "HDF5_TypeTraits.h".to_string(),
            emit_serializers: true,
            output_mode: OutputMode::HeaderOnly,
            classifier: ClassifierConfig::default(),
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let config: GeneratorConfig = serde_yml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(namespace) = &self.namespace {
            if !is_namespace_path(namespace) {
                return Err(ConfigError::InvalidNamespace(namespace.clone()));
            }
        }

        let lists: [(&'static str, &Vec<String>); 4] = [
            ("smart-pointers", &self.classifier.smart_pointers),
            ("vector-templates", &self.classifier.vector_templates),
            ("fixed-array-templates", &self.classifier.fixed_array_templates),
            ("string-types", &self.classifier.string_types),
        ];
        for (key, list) in lists {
            if list.iter().any(|entry| entry.trim().is_empty()) {
                return Err(ConfigError::EmptyEntry(key));
            }
        }
        Ok(())
    }
}

/// `a`, `a::b`, and `::a::b` are accepted; the empty string is not.
pub fn is_namespace_path(namespace: &str) -> bool {
    let trimmed = namespace.strip_prefix("::").unwrap_or(namespace);
    !trimmed.is_empty()
        && trimmed.split("::").all(|segment| {
            let mut chars = segment.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validation() {
        let config = GeneratorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.traits_header, "HDF5_TypeTraits.h");
        assert_eq!(config.output_mode, OutputMode::HeaderOnly);
        assert!(config.classifier.smart_pointers.contains(&"unique_ptr".to_string()));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = GeneratorConfig::from_yaml_str(
            "namespace: EERAModel\nsmart-pointers: [shared_ptr, intrusive_ptr]\noutput-mode: split\n",
        )
        .expect("config should parse");
        assert_eq!(config.namespace.as_deref(), Some("EERAModel"));
        assert_eq!(config.output_mode, OutputMode::Split);
        assert_eq!(config.classifier.smart_pointers, vec!["shared_ptr", "intrusive_ptr"]);
        assert_eq!(config.classifier.vector_templates, vec!["std::vector"]);
        assert!(config.emit_serializers);
    }

    #[test]
    fn test_output_mode_names_match_config_keys() {
        for mode in OutputMode::value_variants() {
            let name = mode.to_possible_value().expect("mode has a name").get_name().to_string();
            assert_eq!(OutputMode::from_str(&name, false), Ok(*mode));
            let config = GeneratorConfig::from_yaml_str(&format!("output-mode: {name}\n")).expect("config should parse");
            assert_eq!(config.output_mode, *mode);
        }
        assert_eq!(OutputMode::from_str("header-only", false), Ok(OutputMode::HeaderOnly));
    }

    #[test]
    fn test_invalid_namespace() {
        let err = GeneratorConfig::from_yaml_str("namespace: \"1bad::name\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNamespace(_)));
    }

    #[test]
    fn test_empty_list_entry() {
        let err = GeneratorConfig::from_yaml_str("string-types: [\"std::string\", \"\"]\n").unwrap_err();
        assert!(matches!(err, ConfigError::EmptyEntry("string-types")));
    }

    #[test]
    fn test_namespace_paths() {
        assert!(is_namespace_path("CodeGen"));
        assert!(is_namespace_path("::a::b_c"));
        assert!(!is_namespace_path(""));
        assert!(!is_namespace_path("a::"));
        assert!(!is_namespace_path("a b"));
    }

    #[test]
    fn test_missing_config_file() {
        let err = GeneratorConfig::load(Path::new("/nonexistent/h5gen.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
