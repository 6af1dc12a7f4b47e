//! Hierarchy file I/O
//!
//! The hierarchy file is written by the processing pass and read back by the
//! patch pass. Only `api_hierarchy` is consumed when patching; the tag lists
//! are kept for operators and are always written sorted.

use crate::{HierarchyError, HierarchyTree, ParentChildPair, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Root structure of the hierarchy YAML file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct HierarchyFile {
    /// Nested tag tree
    #[serde(default)]
    pub api_hierarchy: HierarchyTree,
    /// Every tag seen on an eligible operation
    #[serde(default)]
    pub all_tags: Vec<String>,
    /// Tags that are the leaf of at least one real operation
    #[serde(default)]
    pub tags_with_endpoints: Vec<String>,
    /// Tags that only appear as ancestors
    #[serde(default)]
    pub tags_without_endpoints: Vec<String>,
}

impl HierarchyFile {
    /// Build a hierarchy file from a tree and tag sets (sets iterate sorted)
    pub fn new(
        api_hierarchy: HierarchyTree,
        all_tags: &BTreeSet<String>,
        tags_with_endpoints: &BTreeSet<String>,
        tags_without_endpoints: &BTreeSet<String>,
    ) -> Self {
        Self {
            api_hierarchy,
            all_tags: all_tags.iter().cloned().collect(),
            tags_with_endpoints: tags_with_endpoints.iter().cloned().collect(),
            tags_without_endpoints: tags_without_endpoints.iter().cloned().collect(),
        }
    }

    /// Load a hierarchy file from disk
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(HierarchyError::MissingInput(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a hierarchy file from YAML text.
    ///
    /// An empty document parses as an empty hierarchy.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// Parent-child pairs in patch order
    pub fn pairs(&self) -> Vec<ParentChildPair> {
        self.api_hierarchy.linearize()
    }
}
