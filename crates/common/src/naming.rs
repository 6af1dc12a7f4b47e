//! Tag naming rules
//!
//! Tags are stored exactly as written in the spec. Every identifier derived
//! from a tag (module names, class names, attribute names, placeholder paths)
//! goes through the functions in this module so that one tag always maps to
//! the same identifier in every artifact.

/// Convert a tag to snake_case.
///
/// Splits on camel/Pascal boundaries (`DatasetIO` -> `dataset_io`,
/// `HTTPServer` -> `http_server`) and on `-`, `_` and spaces. Runs of
/// separators collapse to a single underscore and leading/trailing
/// underscores are dropped.
pub fn to_snake_case(name: &str) -> String {
    let mut result = String::new();
    let chars: Vec<char> = name.chars().collect();

    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() {
            // Break before an uppercase char that follows a lowercase char or
            // digit, or that starts a new word after an acronym (HTTPServer).
            let should_add_underscore = i > 0
                && (chars[i - 1].is_lowercase()
                    || chars[i - 1].is_ascii_digit()
                    || chars.get(i + 1).is_some_and(|next| next.is_lowercase()));

            if should_add_underscore && !result.ends_with('_') {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else if ch == '-' || ch == ' ' || ch == '_' {
            if !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
        } else {
            result.push(ch);
        }
    }

    result.trim_matches('_').to_string()
}

/// Convert a tag to PascalCase for class names.
///
/// Uses the same word boundaries as [`to_snake_case`], so
/// `to_pascal_case("dataset-io")`, `to_pascal_case("DatasetIO")` and
/// `to_pascal_case("dataset_io")` all yield `DatasetIo`.
pub fn to_pascal_case(name: &str) -> String {
    to_snake_case(name)
        .split('_')
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect()
}

/// Path segment for a tag's placeholder endpoint (`Tool Runtime` -> `tool-runtime`)
pub fn path_slug(tag: &str) -> String {
    tag.to_lowercase().replace([' ', '_'], "-")
}

/// Suffix for a tag's placeholder operation id (`tool-runtime` -> `tool_runtime`)
pub fn operation_id_fragment(tag: &str) -> String {
    tag.replace([' ', '-'], "_")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
