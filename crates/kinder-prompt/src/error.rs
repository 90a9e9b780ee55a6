//! Error types for the few operations that can refuse their input.
//!
//! Prompt assembly itself never fails: missing templates and unresolved
//! placeholders are reported through [`Diagnostics`](crate::prompt::Diagnostics)
//! instead. Only strict template registration returns an error.

use thiserror::Error;

/// Reasons a template is rejected by
/// [`TemplateRegistry::try_register`](crate::template::TemplateRegistry::try_register).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template name must not be empty")]
    EmptyName,
    #[error("template '{name}' uses undeclared placeholders: {}", .placeholders.join(", "))]
    UndeclaredPlaceholders {
        name: String,
        placeholders: Vec<String>,
    },
}
