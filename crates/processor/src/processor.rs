//! OpenAPI spec loading, processing, and output

use crate::extractor::{extract, Extraction};
use crate::normalizer::{normalize, NormalizationReport};
use api_hierarchy_common::{HierarchyError, HierarchyFile, Result};
use serde_yaml::Value;
use std::fs;
use std::path::Path;

/// OpenAPI spec processor
///
/// Holds a loaded spec document until [`SpecProcessor::process`] extracts the
/// hierarchy and normalizes the schemas.
pub struct SpecProcessor {
    spec: Value,
}

/// A spec after hierarchy extraction and normalization
#[derive(Debug, Clone)]
pub struct ProcessedSpec {
    pub spec: Value,
    pub extraction: Extraction,
    pub normalization: NormalizationReport,
}

impl SpecProcessor {
    /// Load an OpenAPI YAML document from disk
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(HierarchyError::MissingInput(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse an OpenAPI document from YAML (or JSON) text
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let spec: Value = serde_yaml::from_str(yaml)?;
        Ok(Self { spec })
    }

    pub fn spec(&self) -> &Value {
        &self.spec
    }

    /// Extract the tag hierarchy, then normalize schemas on the same document
    pub fn process(self) -> Result<ProcessedSpec> {
        let mut spec = self.spec;
        let extraction = extract(&mut spec)?;
        let normalization = normalize(&mut spec);

        Ok(ProcessedSpec {
            spec,
            extraction,
            normalization,
        })
    }
}

impl ProcessedSpec {
    /// Hierarchy file contents for the patch pass
    pub fn hierarchy_file(&self) -> HierarchyFile {
        HierarchyFile::new(
            self.extraction.tree.clone(),
            &self.extraction.all_tags,
            &self.extraction.tags_with_endpoints,
            &self.extraction.tags_without_endpoints,
        )
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.spec)?)
    }

    pub fn write_spec(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    pub fn write_hierarchy(&self, path: &Path) -> Result<()> {
        self.hierarchy_file().write_to(path)
    }
}
