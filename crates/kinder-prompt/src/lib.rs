//! Prompt construction for the kindergarten-management assistant.
//!
//! `kinder-prompt` turns a per-request [`PromptContext`](prompt::PromptContext)
//! into the system and user prompts sent to the model. It owns the template
//! catalogue, fills `{{variable}}` placeholders, assembles ordered
//! sections, and shrinks oversized prompts to a character budget.
//!
//! # Getting started
//!
//! ```
//! use kinder_prompt::prelude::*;
//!
//! let registry = TemplateRegistry::with_builtins();
//! let composer = PromptComposer::new(&registry);
//!
//! let context = PromptContext {
//!     user_role: "teacher".into(),
//!     memory_context: vec![MemorySnippet::new("负责大一班")],
//!     ..Default::default()
//! };
//!
//! let prompt = composer.build_system_prompt(&context);
//! assert!(prompt.text.contains("负责大一班"));
//! assert!(prompt.diagnostics.is_clean());
//!
//! let fitted = compress_prompt(&prompt.text, Some(8000), CompressionLevel::Medium);
//! assert!(fitted.chars().count() <= 8000);
//! ```
//!
//! # Where to find things
//!
//! - **Templates:** [`Template`](template::Template),
//!   [`TemplateRegistry`](template::TemplateRegistry) and the built-in
//!   catalogue in [`template::builtin`]. Substitution is
//!   [`template::render`].
//!
//! - **Composition:** [`PromptComposer`](prompt::PromptComposer) builds the
//!   system, agent, direct, user, multi-round, error, summary and document
//!   prompts. [`PromptMode`](prompt::PromptMode) picks which system prompt
//!   a request gets. Results are [`ComposedPrompt`](prompt::ComposedPrompt)s
//!   that keep their section structure and diagnostics.
//!
//! - **Compression:** [`compress::compress_prompt`] and
//!   [`ComposedPrompt::compress`](prompt::ComposedPrompt::compress), with
//!   [`compress::intelligent_truncate`] as the last step.
//!
//! - **Measurement:** [`stats::prompt_stats`] and [`stats::validate_prompt`].
//!
//! - **Reuse:** [`cache::PromptCache`] for built prompts.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`template`] | Template type, registry, built-in catalogue, substitution |
//! | [`prompt`] | Context model, section builders, composers, mode selection |
//! | [`compress`] | Cleanup, level-based rewriting, intelligent truncation |
//! | [`stats`] | Length and token estimates, validation |
//! | [`cache`] | TTL cache of composed prompts |
//! | [`config`] | [`PromptConfig`](config::PromptConfig) |

pub mod cache;
pub mod compress;
pub mod config;
pub mod error;
pub mod prelude;
pub mod prompt;
pub mod stats;
pub mod template;

use schemars::JsonSchema;

pub use error::TemplateError;

// Re-export schemars for downstream crates.
pub use schemars;

// ── Constants ──────────────────────────────────────────────────────

/// Characters per estimated token.
pub const CHARS_PER_TOKEN: usize = 4;

/// Default compression target in characters.
pub const DEFAULT_TARGET_LENGTH: usize = 8000;

// ── Schema generation ──────────────────────────────────────────────

/// Generate a JSON Schema `serde_json::Value` from a type that implements
/// `schemars::JsonSchema`.
///
/// # Example
///
/// ```
/// use kinder_prompt::json_schema_for;
/// use kinder_prompt::prompt::PromptContext;
///
/// let schema = json_schema_for::<PromptContext>();
/// assert_eq!(schema["type"], "object");
/// assert!(schema["properties"]["userRole"].is_object());
/// ```
pub fn json_schema_for<T: JsonSchema>() -> serde_json::Value {
    let schema = schemars::schema_for!(T);
    serde_json::to_value(schema)
        .unwrap_or_else(|_| serde_json::json!({"type": "object", "properties": {}}))
}

/// Length in Unicode scalar values. All budgets in this crate use it.
pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}
