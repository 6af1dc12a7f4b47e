//! Tag hierarchy extraction
//!
//! Walks every operation's tag list, builds the hierarchy tree, collapses each
//! tag list to its leaf, and synthesizes placeholder operations for tags that
//! only ever appear as ancestors.

use api_hierarchy_common::naming::{operation_id_fragment, path_slug};
use api_hierarchy_common::{HierarchyError, HierarchyTree, Result};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeSet;

/// HTTP methods that carry operations in a path item
pub const HTTP_METHODS: [&str; 8] = [
    "get", "post", "put", "delete", "patch", "options", "head", "trace",
];

/// One tagged operation seen during extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointRecord {
    pub method: String,
    pub path: String,
    /// Tag list as written in the input spec
    pub tags: Vec<String>,
    /// Tag the operation keeps after collapsing
    pub leaf: String,
}

/// Result of hierarchy extraction
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub tree: HierarchyTree,
    pub all_tags: BTreeSet<String>,
    pub tags_with_endpoints: BTreeSet<String>,
    pub tags_without_endpoints: BTreeSet<String>,
    /// Tagged operations, in scan order
    pub endpoints: Vec<EndpointRecord>,
    /// Operations seen under any HTTP method, tagged or not
    pub endpoint_count: usize,
    /// Paths of synthesized placeholder operations, one per structural tag
    pub placeholder_paths: Vec<String>,
    /// Structural tags whose preferred `/dummy/<slug>` path was already taken
    pub placeholder_collisions: Vec<PlaceholderCollision>,
}

/// A placeholder moved off its preferred path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderCollision {
    pub tag: String,
    pub preferred: String,
    pub used: String,
}

/// Extract the tag hierarchy and rewrite the spec in place.
///
/// Every operation with a non-empty tag list has its tags collapsed to
/// `[leaf]`. Running this again on an already processed spec leaves tags
/// unchanged since a single-element list has no ancestors.
pub fn extract(spec: &mut Value) -> Result<Extraction> {
    let paths = spec
        .get_mut("paths")
        .and_then(Value::as_mapping_mut)
        .ok_or_else(|| HierarchyError::InvalidSpec("missing top-level `paths` mapping".into()))?;

    let mut extraction = Extraction::default();

    for (path, path_item) in paths.iter_mut() {
        let Some(path_item) = path_item.as_mapping_mut() else {
            continue;
        };
        let path = path.as_str().unwrap_or_default();

        for method in HTTP_METHODS {
            let Some(operation) = path_item.get_mut(method).and_then(Value::as_mapping_mut) else {
                continue;
            };
            extraction.endpoint_count += 1;

            let Some(tags) = tag_list(operation) else {
                continue;
            };
            let Some(leaf) = tags.last().cloned() else {
                continue;
            };

            extraction.tree.insert_path(tags.as_slice());
            extraction.all_tags.extend(tags.iter().cloned());
            extraction.tags_with_endpoints.insert(leaf.clone());

            operation.insert(
                Value::from("tags"),
                Value::Sequence(vec![Value::from(leaf.as_str())]),
            );

            extraction.endpoints.push(EndpointRecord {
                method: method.to_string(),
                path: path.to_string(),
                tags,
                leaf,
            });
        }
    }

    extraction.tags_without_endpoints = extraction
        .all_tags
        .difference(&extraction.tags_with_endpoints)
        .cloned()
        .collect();

    for tag in &extraction.tags_without_endpoints {
        let preferred = format!("/dummy/{}", path_slug(tag));
        let placeholder_path = free_path(paths, &preferred);
        if placeholder_path != preferred {
            extraction.placeholder_collisions.push(PlaceholderCollision {
                tag: tag.clone(),
                preferred,
                used: placeholder_path.clone(),
            });
        }

        let mut path_item = Mapping::new();
        path_item.insert(Value::from("get"), placeholder_operation(tag));
        paths.insert(
            Value::from(placeholder_path.as_str()),
            Value::Mapping(path_item),
        );
        extraction.placeholder_paths.push(placeholder_path);
    }

    Ok(extraction)
}

/// `preferred`, or the first `preferred-N` (N >= 2) not already in `paths`
fn free_path(paths: &Mapping, preferred: &str) -> String {
    if !paths.contains_key(preferred) {
        return preferred.to_string();
    }
    (2..)
        .map(|n| format!("{preferred}-{n}"))
        .find(|candidate| !paths.contains_key(candidate.as_str()))
        .unwrap_or_else(|| preferred.to_string())
}

/// Non-empty list of string tags, or `None` when absent or malformed
fn tag_list(operation: &Mapping) -> Option<Vec<String>> {
    let tags = operation.get("tags")?.as_sequence()?;
    if tags.is_empty() {
        return None;
    }
    tags.iter()
        .map(|tag| tag.as_str().map(String::from))
        .collect()
}

/// Placeholder `GET` operation so the generator still emits a class for `tag`
fn placeholder_operation(tag: &str) -> Value {
    let mut success = Mapping::new();
    success.insert(Value::from("description"), Value::from("Success"));

    let mut responses = Mapping::new();
    responses.insert(Value::from("200"), Value::Mapping(success));

    let mut operation = Mapping::new();
    operation.insert(
        Value::from("summary"),
        Value::from(format!("Dummy endpoint for {tag} tag")),
    );
    operation.insert(
        Value::from("description"),
        Value::from(format!(
            "This is a placeholder endpoint for the {tag} tag in the hierarchy"
        )),
    );
    operation.insert(
        Value::from("operationId"),
        Value::from(format!("dummy_{}", operation_id_fragment(tag))),
    );
    operation.insert(
        Value::from("tags"),
        Value::Sequence(vec![Value::from(tag)]),
    );
    operation.insert(Value::from("responses"), Value::Mapping(responses));
    operation.insert(Value::from("x-operation-name"), Value::from("dummy"));

    Value::Mapping(operation)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn tags_of(spec: &Value, path: &str, method: &str) -> Vec<String> {
        spec["paths"][path][method]["tags"]
            .as_sequence()
            .unwrap()
            .iter()
            .map(|t| t.as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_chat_has_direct_endpoint() {
        let mut spec = spec(
            r#"
paths:
  /chat/completions:
    post:
      tags: [Chat, Completions]
  /chat:
    get:
      tags: [Chat]
"#,
        );

        let extraction = extract(&mut spec).unwrap();

        assert_eq!(extraction.tree.linearize().len(), 1);
        assert!(extraction.tree.get("Chat").unwrap().get("Completions").is_some());
        assert_eq!(
            extraction.tags_with_endpoints.iter().collect::<Vec<_>>(),
            vec!["Chat", "Completions"]
        );
        assert!(extraction.tags_without_endpoints.is_empty());
        assert!(extraction.placeholder_paths.is_empty());
        assert_eq!(tags_of(&spec, "/chat/completions", "post"), vec!["Completions"]);
        assert_eq!(tags_of(&spec, "/chat", "get"), vec!["Chat"]);
    }

    #[test]
    fn test_structural_tags_get_placeholders() {
        let mut spec = spec(
            r#"
paths:
  /agents/{agent_id}/session/{session_id}/turn:
    post:
      operationId: create_turn
      tags: [Agents, Session, Turn]
"#,
        );

        let extraction = extract(&mut spec).unwrap();

        assert_eq!(
            extraction.tags_without_endpoints.iter().collect::<Vec<_>>(),
            vec!["Agents", "Session"]
        );
        assert_eq!(
            extraction.placeholder_paths,
            vec!["/dummy/agents", "/dummy/session"]
        );

        let dummy = &spec["paths"]["/dummy/agents"]["get"];
        assert_eq!(dummy["operationId"].as_str(), Some("dummy_Agents"));
        assert_eq!(dummy["x-operation-name"].as_str(), Some("dummy"));
        assert_eq!(
            dummy["responses"]["200"]["description"].as_str(),
            Some("Success")
        );
        assert_eq!(tags_of(&spec, "/dummy/session", "get"), vec!["Session"]);
    }

    #[test]
    fn test_untagged_and_malformed_operations_are_counted_but_skipped() {
        let mut spec = spec(
            r#"
paths:
  /health:
    get:
      operationId: health
  /weird:
    get:
      tags: Chat
    post:
      tags: []
    put:
      tags: [Chat, 3]
    parameters: []
"#,
        );

        let extraction = extract(&mut spec).unwrap();

        assert_eq!(extraction.endpoint_count, 4);
        assert!(extraction.endpoints.is_empty());
        assert!(extraction.all_tags.is_empty());
        assert!(spec["paths"]["/weird"]["post"]["tags"]
            .as_sequence()
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_extraction_is_stable_on_processed_spec() {
        let mut spec = spec(
            r#"
paths:
  /a:
    get:
      tags: [Agents, Session, Turn]
"#,
        );
        extract(&mut spec).unwrap();
        let once = spec.clone();

        let second = extract(&mut spec).unwrap();
        assert_eq!(spec, once);
        assert!(second.tags_without_endpoints.is_empty());
        for endpoint in &second.endpoints {
            assert_eq!(endpoint.tags.len(), 1);
        }
    }

    #[test]
    fn test_placeholders_never_replace_existing_paths() {
        let mut spec = spec(
            r#"
paths:
  /dummy/agents:
    get:
      operationId: list_dummy_agents
  /rag:
    post:
      tags: [Tool Runtime, Rag]
  /other:
    post:
      tags: [tool_runtime, Other]
  /turn:
    post:
      tags: [Agents, Turn]
"#,
        );

        let extraction = extract(&mut spec).unwrap();

        // "Agents" < "Tool Runtime" < "tool_runtime"
        assert_eq!(
            extraction.placeholder_paths,
            vec!["/dummy/agents-2", "/dummy/tool-runtime", "/dummy/tool-runtime-2"]
        );
        assert_eq!(
            extraction.placeholder_collisions,
            vec![
                PlaceholderCollision {
                    tag: "Agents".to_string(),
                    preferred: "/dummy/agents".to_string(),
                    used: "/dummy/agents-2".to_string(),
                },
                PlaceholderCollision {
                    tag: "tool_runtime".to_string(),
                    preferred: "/dummy/tool-runtime".to_string(),
                    used: "/dummy/tool-runtime-2".to_string(),
                },
            ]
        );

        assert_eq!(
            spec["paths"]["/dummy/agents"]["get"]["operationId"].as_str(),
            Some("list_dummy_agents")
        );
        for tag in &extraction.tags_without_endpoints {
            let owners = spec["paths"]
                .as_mapping()
                .unwrap()
                .values()
                .filter_map(|item| item.get("get"))
                .filter(|op| op["x-operation-name"].as_str() == Some("dummy"))
                .filter(|op| op["tags"] == Value::Sequence(vec![Value::from(tag.as_str())]))
                .count();
            assert_eq!(owners, 1, "placeholders for {tag}");
        }
    }

    #[test]
    fn test_missing_paths_is_invalid() {
        let mut spec = spec("openapi: 3.1.0\n");
        let err = extract(&mut spec).unwrap_err();
        assert!(matches!(err, HierarchyError::InvalidSpec(_)));
    }
}
