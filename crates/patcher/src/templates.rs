//! Template loading and rendering for inserted lines

use crate::config::PatchConfig;
use api_hierarchy_common::naming::{to_pascal_case, to_snake_case};
use api_hierarchy_common::{HierarchyError, ParentChildPair, Result};
use std::collections::HashMap;
use tera::{Context, Tera, Value};

const IMPORT: &str = "import";
const PROPERTY: &str = "property";
const WIRING: &str = "wiring";
const WIRING_HEADER: &str = "wiring_header";

/// Renders the import, property, and wiring lines for a package
pub struct PatchTemplates {
    tera: Tera,
    package: String,
    config: PatchConfig,
}

impl PatchTemplates {
    /// Load the configured templates for `package`
    pub fn new(package: &str, config: &PatchConfig) -> Result<Self> {
        let mut tera = Tera::default();

        tera.register_filter("snake_case", snake_case_filter);
        tera.register_filter("pascal_case", pascal_case_filter);

        let templates = &config.templates;
        for (name, source) in [
            (IMPORT, &templates.import),
            (PROPERTY, &templates.property),
            (WIRING, &templates.wiring),
            (WIRING_HEADER, &templates.wiring_header),
        ] {
            tera.add_raw_template(name, source).map_err(|e| {
                HierarchyError::Template(format!("Failed to load {} template: {}", name, e))
            })?;
        }

        Ok(Self {
            tera,
            package: package.to_string(),
            config: config.clone(),
        })
    }

    /// Import of the child's class into the parent's file
    pub fn import_statement(&self, child: &str) -> Result<String> {
        self.render(IMPORT, &self.child_context(child))
    }

    /// Nullable property declaring the child on the parent
    pub fn property_statement(&self, child: &str) -> Result<String> {
        self.render(PROPERTY, &self.child_context(child))
    }

    /// Assignment wiring `parent.child` to the client's top-level child
    pub fn wiring_statement(&self, pair: &ParentChildPair) -> Result<String> {
        let mut context = self.child_context(&pair.child);
        context.insert("parent", &pair.parent);
        context.insert("parent_attr", &to_snake_case(&pair.parent));
        self.render(WIRING, &context)
    }

    /// Comment placed before the wiring block, if any
    pub fn wiring_header(&self) -> Result<Option<String>> {
        let header = self.render(WIRING_HEADER, &self.base_context())?;
        Ok(if header.is_empty() { None } else { Some(header) })
    }

    fn base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("package", &self.package);
        context.insert("api_dir", &self.config.api_dir);
        context
    }

    fn child_context(&self, child: &str) -> Context {
        let mut context = self.base_context();
        context.insert("child", child);
        context.insert("child_attr", &to_snake_case(child));
        context.insert("child_module", &self.config.api_module(child));
        context.insert("child_class", &self.config.api_class(child));
        context
    }

    fn render(&self, name: &str, context: &Context) -> Result<String> {
        self.tera
            .render(name, context)
            .map(|rendered| rendered.trim().to_string())
            .map_err(|e| HierarchyError::Template(format!("Failed to render {}: {:?}", name, e)))
    }
}

/// Filter converting a tag to snake_case
fn snake_case_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let tag = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("snake_case filter expects a string"))?;
    Ok(Value::String(to_snake_case(tag)))
}

/// Filter converting a tag to PascalCase
fn pascal_case_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let tag = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("pascal_case filter expects a string"))?;
    Ok(Value::String(to_pascal_case(tag)))
}
