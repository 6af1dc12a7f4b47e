//! Schema normalization passes
//!
//! Rewrites that make the external generator produce well-typed clients.
//! The passes run in a fixed order: const-only `oneOf` to `enum`, defaults
//! imply optional, `Error` relaxation, then list-unwrap marking.

use serde_yaml::{Mapping, Number, Value};
use std::collections::HashSet;

/// Properties whose presence marks a list response as paginated.
///
/// Must match what the generator templates expect; a list response that has
/// none of these and has `data` is unwrapped.
pub const PAGINATION_FIELDS: [&str; 6] = [
    "has_more",
    "url",
    "first_id",
    "last_id",
    "next_page_token",
    "total",
];

/// Operation extension read by the generator templates
pub const UNWRAP_EXTENSION: &str = "x-unwrap-list-response";

const UNWRAP_METHODS: [&str; 5] = ["get", "post", "put", "delete", "patch"];

/// Operation marked for list unwrapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnwrappedOperation {
    /// `operationId`, or `METHOD path` when the operation has none
    pub operation: String,
    pub schema: String,
}

/// What the normalization passes changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizationReport {
    pub oneof_conversions: usize,
    /// Component schema name and the fields dropped from its `required` list
    pub optional_fields: Vec<(String, Vec<String>)>,
    pub error_relaxed: bool,
    pub unwrapped: Vec<UnwrappedOperation>,
}

/// Run every normalization pass over the spec
pub fn normalize(spec: &mut Value) -> NormalizationReport {
    let oneof_conversions = fix_oneof_const_schemas(spec);
    let optional_fields = relax_required_with_defaults(spec);
    let error_relaxed = relax_error_schema(spec);
    let unwrapped = mark_list_responses(spec);

    NormalizationReport {
        oneof_conversions,
        optional_fields,
        error_relaxed,
        unwrapped,
    }
}

/// Convert a `oneOf` whose members all carry `const` into an `enum` schema.
///
/// The enum type comes from the first member (`string` if it has none).
/// Sibling keys other than `oneOf`, `type` and `enum` are kept after the new
/// `type` and `enum`. Returns `None` when the schema does not qualify.
pub fn convert_oneof_const_to_enum(schema: &Mapping) -> Option<Mapping> {
    let one_of = schema.get("oneOf")?.as_sequence()?;
    let first = one_of.first()?;

    let all_const = one_of
        .iter()
        .all(|member| member.as_mapping().is_some_and(|m| m.contains_key("const")));
    if !all_const {
        return None;
    }

    let values: Vec<Value> = one_of
        .iter()
        .filter_map(|member| member.get("const"))
        .cloned()
        .collect();
    let schema_type = first
        .get("type")
        .cloned()
        .unwrap_or_else(|| Value::from("string"));

    let mut converted = Mapping::new();
    converted.insert(Value::from("type"), schema_type);
    converted.insert(Value::from("enum"), Value::Sequence(values));
    for (key, value) in schema {
        if !matches!(key.as_str(), Some("oneOf" | "type" | "enum")) {
            converted.insert(key.clone(), value.clone());
        }
    }

    Some(converted)
}

/// Apply [`convert_oneof_const_to_enum`] everywhere below `value`.
///
/// Returns the number of schemas converted. Converted schemas no longer have
/// `oneOf`, so a second run converts nothing.
pub fn fix_oneof_const_schemas(value: &mut Value) -> usize {
    let mut converted = 0;

    if let Value::Mapping(map) = value {
        if let Some(enum_schema) = convert_oneof_const_to_enum(map) {
            *map = enum_schema;
            converted += 1;
        }
    }

    match value {
        Value::Mapping(map) => {
            for child in map.values_mut() {
                converted += fix_oneof_const_schemas(child);
            }
        }
        Value::Sequence(items) => {
            for child in items.iter_mut() {
                converted += fix_oneof_const_schemas(child);
            }
        }
        Value::Tagged(tagged) => {
            converted += fix_oneof_const_schemas(&mut tagged.value);
        }
        _ => {}
    }

    converted
}

/// Drop fields that declare a `default` from their schema's `required` list.
///
/// Applies to every schema directly under `components.schemas` that has both
/// `required` and `properties`. Properties and defaults are left untouched.
pub fn relax_required_with_defaults(spec: &mut Value) -> Vec<(String, Vec<String>)> {
    let mut relaxed = Vec::new();
    let Some(schemas) = component_schemas_mut(spec) else {
        return relaxed;
    };

    for (name, schema) in schemas.iter_mut() {
        let Some(schema) = schema.as_mapping_mut() else {
            continue;
        };
        let Some(properties) = schema.get("properties").and_then(Value::as_mapping) else {
            continue;
        };

        let with_defaults: HashSet<String> = properties
            .iter()
            .filter(|(_, field)| field.as_mapping().is_some_and(|f| f.contains_key("default")))
            .filter_map(|(field, _)| field.as_str().map(String::from))
            .collect();
        if with_defaults.is_empty() {
            continue;
        }

        let Some(required) = schema.get_mut("required").and_then(Value::as_sequence_mut) else {
            continue;
        };

        let mut removed = Vec::new();
        required.retain(|field| match field.as_str() {
            Some(field) if with_defaults.contains(field) => {
                removed.push(field.to_string());
                false
            }
            _ => true,
        });

        if !removed.is_empty() {
            relaxed.push((name.as_str().unwrap_or_default().to_string(), removed));
        }
    }

    relaxed
}

/// Loosen the `Error` component schema.
///
/// `status` and `title` stop being required, and `detail` accepts either a
/// string or an object. Only the schema named exactly `Error` is touched.
/// Returns whether anything changed.
pub fn relax_error_schema(spec: &mut Value) -> bool {
    let Some(error) = component_schemas_mut(spec)
        .and_then(|schemas| schemas.get_mut("Error"))
        .and_then(Value::as_mapping_mut)
    else {
        return false;
    };

    let mut changed = false;

    if let Some(required) = error.get_mut("required").and_then(Value::as_sequence_mut) {
        let before = required.len();
        required.retain(|field| !matches!(field.as_str(), Some("status" | "title")));
        changed |= required.len() != before;
    }

    if let Some(properties) = error.get_mut("properties").and_then(Value::as_mapping_mut) {
        if properties.contains_key("detail") {
            properties.insert(Value::from("detail"), flexible_detail_schema());
            changed = true;
        }
    }

    changed
}

fn flexible_detail_schema() -> Value {
    let mut string_type = Mapping::new();
    string_type.insert(Value::from("type"), Value::from("string"));
    let mut object_type = Mapping::new();
    object_type.insert(Value::from("type"), Value::from("object"));

    let mut detail = Mapping::new();
    detail.insert(
        Value::from("description"),
        Value::from("Error detail - can be a string or structured error object"),
    );
    detail.insert(
        Value::from("oneOf"),
        Value::Sequence(vec![Value::Mapping(string_type), Value::Mapping(object_type)]),
    );
    Value::Mapping(detail)
}

/// Mark operations whose 200 JSON response is a simple `List*Response`.
///
/// A list response is simple when its component declares `data` and none of
/// [`PAGINATION_FIELDS`]. Marked operations get [`UNWRAP_EXTENSION`]` = true`.
pub fn mark_list_responses(spec: &mut Value) -> Vec<UnwrappedOperation> {
    let simple_lists = simple_list_schemas(spec);
    let mut unwrapped = Vec::new();
    if simple_lists.is_empty() {
        return unwrapped;
    }

    let Some(paths) = spec.get_mut("paths").and_then(Value::as_mapping_mut) else {
        return unwrapped;
    };

    for (path, path_item) in paths.iter_mut() {
        let Some(path_item) = path_item.as_mapping_mut() else {
            continue;
        };
        let path = path.as_str().unwrap_or_default();

        for (method, operation) in path_item.iter_mut() {
            let Some(method) = method.as_str() else {
                continue;
            };
            if !UNWRAP_METHODS.contains(&method.to_lowercase().as_str()) {
                continue;
            }
            let Some(operation) = operation.as_mapping_mut() else {
                continue;
            };
            let Some(schema) = ok_response_schema_name(operation) else {
                continue;
            };
            if !simple_lists.contains(&schema) {
                continue;
            }

            operation.insert(Value::from(UNWRAP_EXTENSION), Value::Bool(true));
            let label = operation
                .get("operationId")
                .and_then(Value::as_str)
                .map(String::from)
                .unwrap_or_else(|| format!("{} {}", method.to_uppercase(), path));
            unwrapped.push(UnwrappedOperation {
                operation: label,
                schema,
            });
        }
    }

    unwrapped
}

/// Names of `List*Response` components with `data` and no pagination fields
fn simple_list_schemas(spec: &Value) -> HashSet<String> {
    let Some(schemas) = spec
        .get("components")
        .and_then(|components| components.get("schemas"))
        .and_then(Value::as_mapping)
    else {
        return HashSet::new();
    };

    schemas
        .iter()
        .filter_map(|(name, schema)| {
            let name = name.as_str()?;
            if !(name.starts_with("List") && name.ends_with("Response")) {
                return None;
            }
            let properties = schema.get("properties")?.as_mapping()?;
            let paginated = PAGINATION_FIELDS
                .iter()
                .any(|field| properties.contains_key(*field));
            (!paginated && properties.contains_key("data")).then(|| name.to_string())
        })
        .collect()
}

/// Component name referenced by the operation's 200 `application/json` schema
fn ok_response_schema_name(operation: &Mapping) -> Option<String> {
    let responses = operation.get("responses")?.as_mapping()?;
    let ok_status = Value::Number(Number::from(200u64));
    let ok = responses.get("200").or_else(|| responses.get(&ok_status))?;
    let reference = ok
        .get("content")?
        .get("application/json")?
        .get("schema")?
        .get("$ref")?
        .as_str()?;
    reference.rsplit('/').next().map(String::from)
}

fn component_schemas_mut(spec: &mut Value) -> Option<&mut Mapping> {
    spec.get_mut("components")?
        .get_mut("schemas")?
        .as_mapping_mut()
}
