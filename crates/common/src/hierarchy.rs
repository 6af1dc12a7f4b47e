//! Tag hierarchy tree and its linearization

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Nested mapping from tag to subtree.
///
/// Children keep the order in which they were first inserted, which is the
/// order tags were encountered while scanning operations. A tag may appear
/// under several parents: each chain only ever adds keys, so `[a, b]` and
/// `[c, b]` nest `b` under both `a` and `c`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HierarchyTree {
    children: IndexMap<String, HierarchyTree>,
}

/// A (parent tag, child tag) edge of the hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParentChildPair {
    pub parent: String,
    pub child: String,
}

impl ParentChildPair {
    pub fn new(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self {
            parent: parent.into(),
            child: child.into(),
        }
    }
}

impl HierarchyTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a root-to-leaf tag path.
    ///
    /// Each tag becomes a child of the previous one. Missing subtrees are
    /// created empty; existing subtrees are descended into, never replaced.
    pub fn insert_path<S: AsRef<str>>(&mut self, tags: &[S]) {
        let mut current = self;
        for tag in tags {
            current = current
                .children
                .entry(tag.as_ref().to_string())
                .or_default();
        }
    }

    /// Flatten into (parent, child) pairs, pre-order and depth-first.
    ///
    /// Top-level tags have no parent and produce no pair of their own; each
    /// key is emitted before its own subtree is visited.
    pub fn linearize(&self) -> Vec<ParentChildPair> {
        let mut pairs = Vec::new();
        self.collect_pairs(None, &mut pairs);
        pairs
    }

    fn collect_pairs(&self, parent: Option<&str>, pairs: &mut Vec<ParentChildPair>) {
        for (tag, subtree) in &self.children {
            if let Some(parent) = parent {
                pairs.push(ParentChildPair::new(parent, tag.as_str()));
            }
            subtree.collect_pairs(Some(tag.as_str()), pairs);
        }
    }

    /// Pre-order `(depth, tag)` listing for display
    pub fn outline(&self) -> Vec<(usize, &str)> {
        let mut lines = Vec::new();
        self.collect_outline(0, &mut lines);
        lines
    }

    fn collect_outline<'a>(&'a self, depth: usize, lines: &mut Vec<(usize, &'a str)>) {
        for (tag, subtree) in &self.children {
            lines.push((depth, tag.as_str()));
            subtree.collect_outline(depth + 1, lines);
        }
    }

    /// Direct children of this node
    pub fn children(&self) -> impl Iterator<Item = (&str, &HierarchyTree)> {
        self.children.iter().map(|(tag, subtree)| (tag.as_str(), subtree))
    }

    /// Subtree for a direct child tag
    pub fn get(&self, tag: &str) -> Option<&HierarchyTree> {
        self.children.get(tag)
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }
}
