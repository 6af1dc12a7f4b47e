//! Common types and utilities for the API hierarchy tooling
//!
//! This crate contains the hierarchy tree, the naming rules that turn tags into
//! identifiers, the on-disk hierarchy file, and the error type shared by the
//! processor, patcher, and CLI components.

mod hierarchy;
mod hierarchy_file;
pub mod naming;

pub use hierarchy::{HierarchyTree, ParentChildPair};
pub use hierarchy_file::HierarchyFile;

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while processing specs or patching generated sources
#[derive(Error, Debug)]
pub enum HierarchyError {
    #[error("Required input not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("Could not find {anchor} in {}", .path.display())]
    StructuralMismatch { path: PathBuf, anchor: String },

    #[error("Invalid OpenAPI spec: {0}")]
    InvalidSpec(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for hierarchy operations
pub type Result<T> = std::result::Result<T, HierarchyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_file() {
        let err = HierarchyError::MissingInput(PathBuf::from("sdk/api/chat_api.py"));
        assert_eq!(err.to_string(), "Required input not found: sdk/api/chat_api.py");

        let err = HierarchyError::StructuralMismatch {
            path: PathBuf::from("client.py"),
            anchor: "nesting marker comment".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Could not find nesting marker comment in client.py"
        );
    }
}
