//! Per-tag API file patching
//!
//! Adds a child API to its parent's generated class:
//! - an import of the child class, two lines above the class declaration
//! - a nullable property for the child, right after the transport binding
//! - `Optional` in the file's typing imports

use crate::artifact::{Anchor, AnchorSet, GeneratedArtifact};
use crate::templates::PatchTemplates;
use crate::PatchOutcome;
use api_hierarchy_common::Result;
use std::path::Path;

const TYPING_IMPORT: &str = "from typing import";
const OPTIONAL: &str = "Optional";

/// Patch `api_file` so its class exposes `child_tag` as a property.
///
/// Returns [`PatchOutcome::AlreadyPatched`] without touching the file when
/// the child's import is already present. Nothing is written if an anchor
/// is missing.
pub fn patch_api_file(
    api_file: &Path,
    child_tag: &str,
    templates: &PatchTemplates,
    anchors: &AnchorSet,
) -> Result<PatchOutcome> {
    let mut artifact = GeneratedArtifact::load(api_file)?;

    let import = templates.import_statement(child_tag)?;
    if artifact.contains(&import) {
        return Ok(PatchOutcome::AlreadyPatched);
    }

    ensure_optional_import(&mut artifact);

    let class_index = artifact.require_anchor(anchors, Anchor::ClassDeclaration, 0)?;
    artifact.insert_line(class_index.saturating_sub(2), &import);

    // The class declaration moved down by one line
    let binding_index = artifact.require_anchor(anchors, Anchor::TransportBinding, class_index + 1)?;
    let indent = artifact.indent_of(binding_index);
    let property = templates.property_statement(child_tag)?;
    artifact.insert_line(binding_index + 1, &format!("{indent}{property}"));

    artifact.save()?;
    Ok(PatchOutcome::Patched)
}

/// Make sure `Optional` is imported from `typing`.
///
/// Returns whether the artifact changed.
pub fn ensure_optional_import(artifact: &mut GeneratedArtifact) -> bool {
    let Some(typing_index) = artifact.find_line(0, |line| line.starts_with(TYPING_IMPORT)) else {
        let after_imports = last_top_level_import(artifact).map_or(0, |index| index + 1);
        artifact.insert_line(after_imports, &format!("{TYPING_IMPORT} {OPTIONAL}"));
        return true;
    };

    let line = artifact.line(typing_index).unwrap_or_default().to_string();
    let (code, comment) = split_comment(&line);
    let names = code[TYPING_IMPORT.len()..].trim();

    if names == "(" {
        // Parenthesized import spanning several lines
        let close = artifact
            .find_line(typing_index + 1, |line| split_comment(line).0.trim_start().starts_with(')'))
            .unwrap_or(artifact.len());
        let already = (typing_index + 1..close)
            .filter_map(|index| artifact.line(index))
            .any(|line| imports_optional(split_comment(line).0));
        if already {
            return false;
        }
        artifact.insert_line(typing_index + 1, &format!("    {OPTIONAL},"));
        return true;
    }

    if imports_optional(names) {
        return false;
    }

    let names = match names.strip_suffix(')') {
        Some(inner) => format!("{}, {OPTIONAL})", inner.trim_end().trim_end_matches(',')),
        None => format!("{}, {OPTIONAL}", names.trim_end_matches(',')),
    };
    let rewritten = match comment {
        Some(comment) => format!("{TYPING_IMPORT} {names}  {comment}"),
        None => format!("{TYPING_IMPORT} {names}"),
    };
    artifact.replace_line(typing_index, &rewritten);
    true
}

/// Split a line into its code and trailing `#` comment
fn split_comment(line: &str) -> (&str, Option<&str>) {
    match line.find('#') {
        Some(index) => (line[..index].trim_end(), Some(&line[index..])),
        None => (line, None),
    }
}

fn imports_optional(names: &str) -> bool {
    names
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .any(|name| name == OPTIONAL)
}

fn last_top_level_import(artifact: &GeneratedArtifact) -> Option<usize> {
    (0..artifact.len()).rev().find(|&index| {
        artifact
            .line(index)
            .is_some_and(|line| line.starts_with("import ") || line.starts_with("from "))
    })
}
