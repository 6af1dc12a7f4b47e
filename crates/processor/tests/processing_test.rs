//! Integration tests for spec processing

use api_hierarchy_common::{HierarchyFile, ParentChildPair};
use api_hierarchy_processor::{SpecProcessor, UNWRAP_EXTENSION};
use serde_yaml::Value;
use std::collections::BTreeSet;
use std::fs;
use tempfile::TempDir;

const STACK_SPEC: &str = r##"
openapi: 3.1.0
info:
  title: Llama Stack Specification
  version: v1
paths:
  /v1/chat/completions:
    post:
      operationId: openai_chat_completion
      tags: [Chat, Completions]
      responses:
        '200':
          description: OK
  /v1/agents/{agent_id}/session/{session_id}/turn:
    post:
      operationId: create_agent_turn
      tags: [Agents, Session, Turn]
  /v1/agents/{agent_id}/session/{session_id}/turn/{turn_id}/step/{step_id}:
    get:
      operationId: get_agents_step
      tags: [Agents, Session, Turn, Steps]
  /v1/models:
    get:
      operationId: list_models
      tags: [Models]
      responses:
        '200':
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/ListModelsResponse'
  /v1/files:
    get:
      operationId: openai_list_files
      tags: [Files]
      responses:
        '200':
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/ListOpenAIFileResponse'
  /v1/health:
    get:
      operationId: health
components:
  schemas:
    ListModelsResponse:
      type: object
      properties:
        data:
          type: array
          items: {$ref: '#/components/schemas/Model'}
      required: [data]
    ListOpenAIFileResponse:
      type: object
      properties:
        data: {type: array}
        has_more: {type: boolean}
        first_id: {type: string}
        last_id: {type: string}
        object: {type: string, const: list, default: list}
      required: [data, has_more, first_id, last_id, object]
    Model:
      type: object
      properties:
        model_type:
          oneOf:
            - {const: llm, type: string}
            - {const: embedding, type: string}
          default: llm
        identifier: {type: string}
      required: [identifier, model_type]
    Error:
      type: object
      properties:
        status: {type: integer}
        title: {type: string}
        detail: {type: string}
        instance: {type: string}
      required: [status, title, detail]
"##;

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn operations(spec: &Value) -> Vec<&Value> {
    spec["paths"]
        .as_mapping()
        .unwrap()
        .values()
        .flat_map(|item| item.as_mapping().unwrap().values())
        .collect()
}

#[test]
fn test_full_processing_pipeline() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("openapi.generator.yml");
    let output = dir.path().join("openapi-processed.yml");
    let hierarchy_path = dir.path().join("api-hierarchy.yml");
    fs::write(&source, STACK_SPEC).unwrap();

    let processed = SpecProcessor::from_file(&source).unwrap().process().unwrap();
    processed.write_spec(&output).unwrap();
    processed.write_hierarchy(&hierarchy_path).unwrap();

    let extraction = &processed.extraction;
    assert_eq!(extraction.endpoint_count, 6);
    assert_eq!(extraction.endpoints.len(), 5);
    assert_eq!(
        extraction.all_tags,
        set(&["Agents", "Chat", "Completions", "Files", "Models", "Session", "Steps", "Turn"])
    );
    assert_eq!(
        extraction.tags_without_endpoints,
        set(&["Agents", "Chat", "Session"])
    );

    // Processed spec on disk is valid YAML with placeholders and collapsed tags
    let written: Value = serde_yaml::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    for path in ["/dummy/agents", "/dummy/chat", "/dummy/session"] {
        assert!(written["paths"][path]["get"].is_mapping(), "missing {path}");
    }
    for operation in operations(&written) {
        let tags = operation["tags"].as_sequence();
        assert!(tags.map_or(true, |tags| tags.len() <= 1));
    }
    assert_eq!(
        written["paths"]["/v1/agents/{agent_id}/session/{session_id}/turn"]["post"]["tags"],
        serde_yaml::from_str::<Value>("[Turn]").unwrap()
    );

    // Normalization ran on the same document
    let schemas = &written["components"]["schemas"];
    assert_eq!(
        schemas["Model"]["properties"]["model_type"]["enum"],
        serde_yaml::from_str::<Value>("[llm, embedding]").unwrap()
    );
    assert_eq!(
        schemas["Model"]["required"],
        serde_yaml::from_str::<Value>("[identifier]").unwrap()
    );
    assert_eq!(
        schemas["Error"]["required"],
        serde_yaml::from_str::<Value>("[detail]").unwrap()
    );
    assert_eq!(
        written["paths"]["/v1/models"]["get"][UNWRAP_EXTENSION],
        Value::Bool(true)
    );
    assert!(written["paths"]["/v1/files"]["get"]
        .get(UNWRAP_EXTENSION)
        .is_none());

    // Hierarchy file feeds the patch pass
    let hierarchy = HierarchyFile::from_file(&hierarchy_path).unwrap();
    assert_eq!(
        hierarchy.pairs(),
        vec![
            ParentChildPair::new("Chat", "Completions"),
            ParentChildPair::new("Agents", "Session"),
            ParentChildPair::new("Session", "Turn"),
            ParentChildPair::new("Turn", "Steps"),
        ]
    );
    assert_eq!(hierarchy.tags_with_endpoints.len(), 5);
}

#[test]
fn test_tag_classification_partitions_all_tags() {
    let processed = SpecProcessor::from_yaml(STACK_SPEC)
        .unwrap()
        .process()
        .unwrap();
    let extraction = &processed.extraction;

    let union: BTreeSet<String> = extraction
        .tags_with_endpoints
        .union(&extraction.tags_without_endpoints)
        .cloned()
        .collect();
    assert_eq!(union, extraction.all_tags);
    assert!(extraction
        .tags_with_endpoints
        .is_disjoint(&extraction.tags_without_endpoints));

    // Each structural tag owns exactly one placeholder, tagged with only itself
    for tag in &extraction.tags_without_endpoints {
        let owners: Vec<&Value> = operations(&processed.spec)
            .into_iter()
            .filter(|op| op["operationId"].as_str() == Some(format!("dummy_{tag}").as_str()))
            .collect();
        assert_eq!(owners.len(), 1, "placeholders for {tag}");
        assert_eq!(
            owners[0]["tags"],
            Value::Sequence(vec![Value::from(tag.as_str())])
        );
    }
}

#[test]
fn test_collapsed_leaf_is_last_original_tag() {
    let processed = SpecProcessor::from_yaml(STACK_SPEC)
        .unwrap()
        .process()
        .unwrap();

    for endpoint in &processed.extraction.endpoints {
        assert_eq!(Some(&endpoint.leaf), endpoint.tags.last());
        let tags = &processed.spec["paths"][endpoint.path.as_str()][endpoint.method.as_str()]["tags"];
        assert_eq!(tags, &Value::Sequence(vec![Value::from(endpoint.leaf.as_str())]));
    }
}

#[test]
fn test_agents_only_scenario() {
    let processed = SpecProcessor::from_yaml(
        r#"
paths:
  /turn:
    post:
      tags: [Agents, Session, Turn]
"#,
    )
    .unwrap()
    .process()
    .unwrap();

    let hierarchy = processed.hierarchy_file();
    assert_eq!(
        hierarchy.to_yaml().unwrap(),
        "api_hierarchy:\n  Agents:\n    Session:\n      Turn: {}\nall_tags:\n- Agents\n- Session\n- Turn\ntags_with_endpoints:\n- Turn\ntags_without_endpoints:\n- Agents\n- Session\n"
    );
    assert_eq!(
        processed.extraction.placeholder_paths,
        vec!["/dummy/agents", "/dummy/session"]
    );
    assert_eq!(
        hierarchy.pairs(),
        vec![
            ParentChildPair::new("Agents", "Session"),
            ParentChildPair::new("Session", "Turn"),
        ]
    );
}

#[test]
fn test_same_input_yields_identical_outputs() {
    let first = SpecProcessor::from_yaml(STACK_SPEC).unwrap().process().unwrap();
    let second = SpecProcessor::from_yaml(STACK_SPEC).unwrap().process().unwrap();

    assert_eq!(first.to_yaml().unwrap(), second.to_yaml().unwrap());
    assert_eq!(
        first.hierarchy_file().to_yaml().unwrap(),
        second.hierarchy_file().to_yaml().unwrap()
    );
    assert_eq!(first.extraction.tree.linearize(), second.extraction.tree.linearize());
}
