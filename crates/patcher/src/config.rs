//! Patch configuration
//!
//! Names the generated SDK layout and the anchor vocabulary of the
//! generator's templates. Every field has a default matching the Python
//! client generator, so a config file only needs the fields it changes.

use api_hierarchy_common::naming::{to_pascal_case, to_snake_case};
use api_hierarchy_common::{HierarchyError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Layout, anchors, and templates used when patching generated sources
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PatchConfig {
    /// Directory under the package holding one API class file per tag
    pub api_dir: String,
    /// Appended to a tag's snake_case name to form its module name
    pub api_module_suffix: String,
    /// Appended to a tag's PascalCase name to form its class name
    pub api_class_suffix: String,
    /// Extension of generated source files
    pub file_extension: String,
    /// Aggregate client file, relative to the package directory
    pub client_file: String,
    /// Regex matching the class declaration line of an API file
    pub class_pattern: String,
    /// Constructor statement that binds the transport client
    pub transport_binding: String,
    /// Comment in the aggregate client after which wiring is inserted
    pub client_marker: String,
    pub templates: TemplateConfig,
}

/// Tera templates for the inserted lines
///
/// Rendered with `package`, `api_dir`, `child`, `child_attr`,
/// `child_module`, `child_class` and, for wiring, `parent` and
/// `parent_attr`. The `snake_case` and `pascal_case` filters are available.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TemplateConfig {
    pub import: String,
    pub property: String,
    pub wiring: String,
    /// Comment placed before the wiring block; empty to omit
    pub wiring_header: String,
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            api_dir: "api".to_string(),
            api_module_suffix: "_api".to_string(),
            api_class_suffix: "Api".to_string(),
            file_extension: "py".to_string(),
            client_file: "llama_stack_client.py".to_string(),
            class_pattern: r"^class \w+Api:".to_string(),
            transport_binding: "self.api_client = api_client".to_string(),
            client_marker: "# Set up nested API structure based on x-nesting-config".to_string(),
            templates: TemplateConfig::default(),
        }
    }
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            import: "from {{ package }}.{{ api_dir }}.{{ child_module }} import {{ child_class }}"
                .to_string(),
            property: "self.{{ child_attr }}: Optional[{{ child_class }}] = None".to_string(),
            wiring: "self.{{ parent_attr }}.{{ child_attr }} = self.{{ child_attr }}".to_string(),
            wiring_header: "# Wire up parent-child API relationships".to_string(),
        }
    }
}

impl PatchConfig {
    /// Load a patch configuration YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(HierarchyError::MissingInput(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| {
            HierarchyError::Config(format!("Failed to parse patch config YAML: {}", e))
        })
    }

    /// Module name of a tag's API class (`DatasetIO` -> `dataset_io_api`)
    pub fn api_module(&self, tag: &str) -> String {
        format!("{}{}", to_snake_case(tag), self.api_module_suffix)
    }

    /// Class name of a tag's API class (`DatasetIO` -> `DatasetIoApi`)
    pub fn api_class(&self, tag: &str) -> String {
        format!("{}{}", to_pascal_case(tag), self.api_class_suffix)
    }

    /// File name of a tag's API class (`chat` -> `chat_api.py`)
    pub fn api_file_name(&self, tag: &str) -> String {
        if self.file_extension.is_empty() {
            self.api_module(tag)
        } else {
            format!("{}.{}", self.api_module(tag), self.file_extension)
        }
    }

    pub(crate) fn class_regex(&self) -> Result<Regex> {
        Regex::new(&self.class_pattern).map_err(|e| {
            HierarchyError::Config(format!(
                "Invalid class_pattern '{}': {}",
                self.class_pattern, e
            ))
        })
    }
}
