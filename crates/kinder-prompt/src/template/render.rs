//! Variable substitution for [`Template`] bodies.

use super::Template;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Variable values keyed by placeholder name.
///
/// Values are JSON values so numbers and booleans keep their literal form.
/// Structured values (arrays, objects) are rendered as compact JSON.
///
/// ```
/// use kinder_prompt::template::{Template, Variables, render};
///
/// let t = Template::new("greet", "Hello {{name}}, role={{role}}")
///     .with_variables(["name", "role"]);
/// let vars = Variables::new().with("name", "Ann");
/// assert_eq!(render(&t, &vars), "Hello Ann, role=");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Variables(BTreeMap<String, Value>);

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Variables {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Stringify a variable value for substitution.
///
/// Strings are inserted raw, `null` becomes the empty string, and every
/// other value uses its JSON form (`3`, `true`, `["a","b"]`).
pub fn stringify_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Render a template against a variable map.
///
/// Every declared variable replaces all occurrences of its literal
/// `{{name}}`; a declared variable missing from `variables` becomes the
/// empty string. Placeholders the template does not declare pass through
/// verbatim. No escaping is performed.
pub fn render(template: &Template, variables: &Variables) -> String {
    let mut out = template.body.clone();
    for name in &template.variables {
        let placeholder = format!("{{{{{name}}}}}");
        if !out.contains(&placeholder) {
            continue;
        }
        let value = variables.get(name).map(stringify_value).unwrap_or_default();
        out = out.replace(&placeholder, &value);
    }
    out
}
