//! Generated source artifacts as line-addressable text
//!
//! Patching never parses the generated language. It finds anchor lines that
//! the generator's templates always emit and inserts whole lines relative to
//! them. Line endings of the original file are preserved.

use crate::config::PatchConfig;
use api_hierarchy_common::{HierarchyError, Result};
use regex::Regex;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Anchor lines the patcher relies on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Class declaration of a per-tag API file
    ClassDeclaration,
    /// Constructor statement binding the transport client
    TransportBinding,
    /// Marker comment in the aggregate client
    ClientMarker,
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anchor::ClassDeclaration => write!(f, "class declaration"),
            Anchor::TransportBinding => write!(f, "transport binding statement"),
            Anchor::ClientMarker => write!(f, "nesting marker comment"),
        }
    }
}

/// Compiled anchor vocabulary
#[derive(Debug, Clone)]
pub struct AnchorSet {
    class_declaration: Regex,
    transport_binding: String,
    client_marker: String,
}

impl AnchorSet {
    pub fn from_config(config: &PatchConfig) -> Result<Self> {
        Ok(Self {
            class_declaration: config.class_regex()?,
            transport_binding: config.transport_binding.clone(),
            client_marker: config.client_marker.clone(),
        })
    }

    /// Whether a line (without its terminator) is the given anchor
    pub fn matches(&self, anchor: Anchor, line: &str) -> bool {
        match anchor {
            Anchor::ClassDeclaration => self.class_declaration.is_match(line),
            Anchor::TransportBinding => line.contains(&self.transport_binding),
            Anchor::ClientMarker => line.contains(&self.client_marker),
        }
    }
}

/// A generated source file held in memory as lines
#[derive(Debug, Clone)]
pub struct GeneratedArtifact {
    path: PathBuf,
    /// Lines including their terminators
    lines: Vec<String>,
    newline: &'static str,
}

impl GeneratedArtifact {
    /// Read an artifact from disk
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(HierarchyError::MissingInput(path.to_path_buf()));
        }
        let source = fs::read_to_string(path)?;
        Ok(Self::from_source(path, &source))
    }

    pub fn from_source(path: impl Into<PathBuf>, source: &str) -> Self {
        let newline = if source.contains("\r\n") { "\r\n" } else { "\n" };
        Self {
            path: path.into(),
            lines: source.split_inclusive('\n').map(String::from).collect(),
            newline,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line text without its terminator
    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines
            .get(index)
            .map(|line| line.trim_end_matches(['\r', '\n']))
    }

    pub fn contents(&self) -> String {
        self.lines.concat()
    }

    /// Whether any line contains `needle` verbatim
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.contains(needle))
    }

    /// First line at or after `from` matching `predicate`
    pub fn find_line<F>(&self, from: usize, predicate: F) -> Option<usize>
    where
        F: Fn(&str) -> bool,
    {
        (from..self.lines.len()).find(|&index| self.line(index).is_some_and(&predicate))
    }

    /// First line at or after `from` that is the given anchor
    pub fn find_anchor(&self, anchors: &AnchorSet, anchor: Anchor, from: usize) -> Option<usize> {
        self.find_line(from, |line| anchors.matches(anchor, line))
    }

    /// Like [`GeneratedArtifact::find_anchor`], failing with a structural mismatch
    pub fn require_anchor(&self, anchors: &AnchorSet, anchor: Anchor, from: usize) -> Result<usize> {
        self.find_anchor(anchors, anchor, from)
            .ok_or_else(|| HierarchyError::StructuralMismatch {
                path: self.path.clone(),
                anchor: anchor.to_string(),
            })
    }

    /// Leading whitespace of a line
    pub fn indent_of(&self, index: usize) -> String {
        self.line(index)
            .map(|line| {
                line.chars()
                    .take_while(|c| c.is_whitespace())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Insert `text` as a new line at `index` (clamped to the end)
    pub fn insert_line(&mut self, index: usize, text: &str) {
        self.insert_lines(index, &[text.to_string()]);
    }

    /// Replace the text of an existing line, keeping its terminator
    pub fn replace_line(&mut self, index: usize, text: &str) {
        if let Some(line) = self.lines.get_mut(index) {
            let body_len = line.trim_end_matches(['\r', '\n']).len();
            let terminator = line.split_off(body_len);
            *line = format!("{}{}", text, terminator);
        }
    }

    /// Insert several lines at `index`, keeping their order
    pub fn insert_lines(&mut self, index: usize, texts: &[String]) {
        let index = index.min(self.lines.len());
        if let Some(previous) = index.checked_sub(1).and_then(|i| self.lines.get_mut(i)) {
            if !previous.ends_with('\n') {
                previous.push_str(self.newline);
            }
        }
        for (offset, text) in texts.iter().enumerate() {
            let line = format!("{}{}", text, self.newline);
            self.lines.insert(index + offset, line);
        }
    }

    /// Write the artifact back over its path.
    ///
    /// Contents go to a sibling temporary file that is then renamed into
    /// place, so the original is either untouched or fully replaced.
    pub fn save(&self) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(self.contents().as_bytes())?;
        temp.flush()?;
        if let Ok(metadata) = fs::metadata(&self.path) {
            fs::set_permissions(temp.path(), metadata.permissions())?;
        }
        temp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}
