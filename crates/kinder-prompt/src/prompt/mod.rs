//! Prompt composition: context, sections, builder and composers.
//!
//! The composition layer has four parts:
//!
//! 1. **[`PromptContext`]**: per-request input (role, memories, page,
//!    tools, history, feature flags).
//! 2. **[`sections`]**: total renderers for the data-driven sections
//!    (memory, page context, tool catalogue).
//! 3. **[`SystemPromptBuilder`]**: ordered collection of named
//!    [`Section`]s, joined with blank lines.
//! 4. **[`PromptComposer`]**: the composers that pick, order and render
//!    sections for each mode, returning a [`ComposedPrompt`].

pub mod builder;
pub mod composer;
pub mod context;
pub mod mode;
pub mod sections;

pub use builder::{SECTION_SEPARATOR, Section, SystemPromptBuilder, join_sections};
pub use composer::{DocumentKind, PromptComposer, StepResult};
pub use context::{
    ConversationTurn, MemorySnippet, PageAction, PageContext, PromptContext, ToolDescriptor,
};
pub use mode::{ModeInputs, PromptMode};

use crate::config::PromptConfig;
use crate::stats::{self, PromptStats, ValidationReport};
use crate::template;
use serde::Serialize;
use std::fmt;

/// What went wrong, non-fatally, while composing a prompt.
///
/// Composition never fails. A missing template skips its section and an
/// unresolved placeholder stays in the text; both are recorded here so
/// callers can assert on them without capturing logs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    /// Templates that were requested but not registered, in request order.
    pub missing_templates: Vec<String>,
    /// `{{name}}` placeholders still present in the final text.
    pub unresolved_placeholders: Vec<String>,
}

impl Diagnostics {
    /// `true` when nothing was skipped or left unresolved.
    pub fn is_clean(&self) -> bool {
        self.missing_templates.is_empty() && self.unresolved_placeholders.is_empty()
    }

    pub(crate) fn record_missing(&mut self, name: &str) {
        if !self.missing_templates.iter().any(|n| n == name) {
            self.missing_templates.push(name.to_string());
        }
    }
}

/// The output of a composer, before compression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedPrompt {
    pub text: String,
    /// `ceil(chars / 4)` of `text`.
    pub token_estimate: usize,
    /// Number of sections that rendered.
    pub section_count: usize,
    #[serde(skip)]
    pub sections: Vec<Section>,
    pub diagnostics: Diagnostics,
}

impl ComposedPrompt {
    /// Join `sections` and derive the size fields and placeholder diagnostics.
    pub fn from_sections(sections: Vec<Section>, mut diagnostics: Diagnostics) -> Self {
        let text = join_sections(&sections);
        diagnostics.unresolved_placeholders = template::placeholders(&text);
        Self {
            token_estimate: stats::estimate_tokens(&text),
            section_count: sections.len(),
            text,
            sections,
            diagnostics,
        }
    }

    pub fn stats(&self) -> PromptStats {
        stats::prompt_stats(&self.text)
    }

    pub fn validate(&self, config: &PromptConfig) -> ValidationReport {
        stats::validate_prompt_with(&self.text, config)
    }

    /// Names of the rendered sections, in order.
    pub fn section_names(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

impl fmt::Display for ComposedPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for ComposedPrompt {
    fn as_ref(&self) -> &str {
        &self.text
    }
}
