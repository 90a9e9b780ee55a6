//! Named prompt templates with `{{variable}}` placeholders.
//!
//! The template layer has three parts:
//!
//! 1. **[`Template`]**: an immutable named body plus the ordered list of
//!    variables it declares.
//! 2. **[`TemplateRegistry`]**: an explicitly constructed, in-memory map of
//!    templates keyed by name. [`TemplateRegistry::with_builtins`] seeds the
//!    fixed catalogue from [`builtin`].
//! 3. **[`render`]**: purely textual substitution of declared variables
//!    from a [`Variables`] map.

pub mod builtin;
pub mod registry;
pub mod render;

pub use registry::{SharedRegistry, TemplateRegistry};
pub use render::{Variables, render, stringify_value};

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Matches any `{{...}}` placeholder, capturing the inner name.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^{}]+)\}\}").expect("placeholder regex"));

/// A named, reusable text pattern.
///
/// `variables` lists, in order, the placeholder names that [`render`]
/// substitutes. Placeholders in `body` that are not declared here are left
/// untouched by rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    pub body: String,
    #[serde(default)]
    pub variables: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Template {
    /// Create a template with no declared variables.
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
            variables: Vec::new(),
            description: None,
        }
    }

    /// Declare the variables the body references.
    pub fn with_variables<I, S>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variables = variables.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Placeholders that occur in the body but are missing from `variables`.
    pub fn undeclared_placeholders(&self) -> Vec<String> {
        placeholders(&self.body)
            .into_iter()
            .filter(|p| !self.variables.iter().any(|v| v == p))
            .collect()
    }
}

/// Names of every `{{name}}` placeholder in `text`, deduplicated, in order
/// of first occurrence.
pub fn placeholders(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for cap in PLACEHOLDER.captures_iter(text) {
        let name = &cap[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_in_first_occurrence_order() {
        let found = placeholders("{{b}} and {{a}} then {{b}} again");
        assert_eq!(found, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn placeholders_ignore_single_braces() {
        assert!(placeholders("{\"json\": {\"nested\": 1}}").is_empty());
    }

    #[test]
    fn undeclared_placeholders_reported() {
        let t = Template::new("t", "Hi {{name}}, {{z}}").with_variables(["name"]);
        assert_eq!(t.undeclared_placeholders(), vec!["z".to_string()]);
    }

    #[test]
    fn fully_declared_template_has_no_undeclared() {
        let t = Template::new("t", "{{a}}{{b}}").with_variables(["a", "b"]);
        assert!(t.undeclared_placeholders().is_empty());
    }
}
