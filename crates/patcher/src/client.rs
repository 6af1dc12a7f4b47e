//! Aggregate client wiring

use crate::artifact::{Anchor, AnchorSet, GeneratedArtifact};
use crate::templates::PatchTemplates;
use crate::PatchOutcome;
use api_hierarchy_common::{ParentChildPair, Result};
use std::path::Path;

/// Wire every child onto its parent in the aggregate client.
///
/// Statements go right after the marker comment, in pair order. The whole
/// block is skipped when the first pair's statement is already present.
pub fn patch_client(
    client_file: &Path,
    pairs: &[ParentChildPair],
    templates: &PatchTemplates,
    anchors: &AnchorSet,
) -> Result<PatchOutcome> {
    let mut artifact = GeneratedArtifact::load(client_file)?;
    let marker = artifact.require_anchor(anchors, Anchor::ClientMarker, 0)?;

    let Some(first) = pairs.first() else {
        return Ok(PatchOutcome::NoChanges);
    };
    if artifact.contains(&templates.wiring_statement(first)?) {
        return Ok(PatchOutcome::AlreadyPatched);
    }

    let indent = artifact.indent_of(marker);
    let mut block = Vec::with_capacity(pairs.len() + 1);
    if let Some(header) = templates.wiring_header()? {
        block.push(format!("{indent}{header}"));
    }
    for pair in pairs {
        block.push(format!("{indent}{}", templates.wiring_statement(pair)?));
    }

    artifact.insert_lines(marker + 1, &block);
    artifact.save()?;
    Ok(PatchOutcome::Patched)
}
