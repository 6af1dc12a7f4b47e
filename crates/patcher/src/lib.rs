//! Hierarchy patching for generated SDK sources
//!
//! The code generator emits one flat API class per tag plus an aggregate
//! client. This crate reads the parent-child pairs of a hierarchy file and
//! edits those sources so that every child API is reachable from its parent:
//!
//! - `api_file` adds the child import and property to the parent's class
//! - `client` wires `client.<parent>.<child>` in the aggregate client
//!
//! Each file is edited at most once per pair. Running the patcher again over
//! an already-patched tree leaves every file byte-for-byte unchanged.

mod api_file;
mod artifact;
mod client;
mod config;
mod templates;

pub use api_file::{ensure_optional_import, patch_api_file};
pub use artifact::{Anchor, AnchorSet, GeneratedArtifact};
pub use client::patch_client;
pub use config::{PatchConfig, TemplateConfig};
pub use templates::PatchTemplates;

use api_hierarchy_common::{HierarchyError, HierarchyFile, ParentChildPair, Result};
use std::path::{Path, PathBuf};

/// What happened to a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The file was edited and written back
    Patched,
    /// The edit was found in the file from an earlier run
    AlreadyPatched,
    /// There was nothing to insert
    NoChanges,
}

/// Result of patching one parent file for one pair
#[derive(Debug)]
pub struct FileReport {
    pub pair: ParentChildPair,
    pub file: PathBuf,
    pub outcome: Result<PatchOutcome>,
}

/// Result of a full patch run
#[derive(Debug, Default)]
pub struct PatchSummary {
    /// Pairs in the order they were applied
    pub pairs: Vec<ParentChildPair>,
    pub api_files: Vec<FileReport>,
    /// Aggregate client outcome, absent when there was nothing to wire
    pub client: Option<(PathBuf, Result<PatchOutcome>)>,
}

impl PatchSummary {
    /// Number of API files edited in this run
    pub fn patched_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, Ok(PatchOutcome::Patched)))
    }

    /// Number of pairs already present from an earlier run
    pub fn already_patched_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, Ok(PatchOutcome::AlreadyPatched)))
    }

    /// Number of pairs skipped because of an error
    pub fn skipped_count(&self) -> usize {
        self.count(Result::is_err)
    }

    fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&Result<PatchOutcome>) -> bool,
    {
        self.api_files
            .iter()
            .filter(|report| predicate(&report.outcome))
            .count()
    }
}

/// Applies a hierarchy to one generated SDK package
pub struct HierarchyPatcher {
    sdk_dir: PathBuf,
    package: String,
    config: PatchConfig,
    templates: PatchTemplates,
    anchors: AnchorSet,
}

impl HierarchyPatcher {
    /// Create a patcher for `sdk_dir/<package>`
    pub fn new(sdk_dir: impl Into<PathBuf>, package: &str, config: PatchConfig) -> Result<Self> {
        let templates = PatchTemplates::new(package, &config)?;
        let anchors = AnchorSet::from_config(&config)?;
        Ok(Self {
            sdk_dir: sdk_dir.into(),
            package: package.to_string(),
            config,
            templates,
            anchors,
        })
    }

    pub fn package_dir(&self) -> PathBuf {
        self.sdk_dir.join(&self.package)
    }

    pub fn api_dir(&self) -> PathBuf {
        self.package_dir().join(&self.config.api_dir)
    }

    /// Generated API file of a tag
    pub fn api_file(&self, tag: &str) -> PathBuf {
        self.api_dir().join(self.config.api_file_name(tag))
    }

    pub fn client_file(&self) -> PathBuf {
        self.package_dir().join(&self.config.client_file)
    }

    /// Patch every parent file and the aggregate client.
    ///
    /// Fails only when the SDK or API directory is missing. Problems with
    /// individual files are recorded in the summary and the run continues.
    pub fn patch_all(&self, hierarchy: &HierarchyFile) -> Result<PatchSummary> {
        require_dir(&self.sdk_dir)?;

        let pairs = hierarchy.pairs();
        if pairs.is_empty() {
            return Ok(PatchSummary::default());
        }
        require_dir(&self.api_dir())?;

        let api_files = pairs
            .iter()
            .map(|pair| {
                let file = self.api_file(&pair.parent);
                let outcome = patch_api_file(&file, &pair.child, &self.templates, &self.anchors);
                FileReport {
                    pair: pair.clone(),
                    file,
                    outcome,
                }
            })
            .collect();

        let client_file = self.client_file();
        let client_outcome = patch_client(&client_file, &pairs, &self.templates, &self.anchors);

        Ok(PatchSummary {
            pairs,
            api_files,
            client: Some((client_file, client_outcome)),
        })
    }
}

fn require_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(HierarchyError::MissingInput(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sdk_layout() {
        let patcher =
            HierarchyPatcher::new("sdks/python", "llama_stack_client", PatchConfig::default())
                .unwrap();

        assert_eq!(
            patcher.api_file("Tool Runtime"),
            Path::new("sdks/python/llama_stack_client/api/tool_runtime_api.py")
        );
        assert_eq!(
            patcher.client_file(),
            Path::new("sdks/python/llama_stack_client/llama_stack_client.py")
        );
    }

    #[test]
    fn test_summary_counts() {
        let report = |outcome| FileReport {
            pair: ParentChildPair::new("Chat", "Completions"),
            file: PathBuf::from("chat_api.py"),
            outcome,
        };
        let summary = PatchSummary {
            api_files: vec![
                report(Ok(PatchOutcome::Patched)),
                report(Ok(PatchOutcome::AlreadyPatched)),
                report(Err(HierarchyError::MissingInput(PathBuf::from("x.py")))),
                report(Ok(PatchOutcome::Patched)),
            ],
            ..PatchSummary::default()
        };

        assert_eq!(summary.patched_count(), 2);
        assert_eq!(summary.already_patched_count(), 1);
        assert_eq!(summary.skipped_count(), 1);
    }
}
