//! Convenience re-exports for common `kinder-prompt` types.
//!
//! ```
//! use kinder_prompt::prelude::*;
//! ```

// ── Templates ───────────────────────────────────────────────────────
pub use crate::template::{SharedRegistry, Template, TemplateRegistry, Variables, render};

// ── Composition ─────────────────────────────────────────────────────
pub use crate::prompt::{
    ComposedPrompt, ConversationTurn, Diagnostics, DocumentKind, MemorySnippet, ModeInputs,
    PageAction, PageContext, PromptComposer, PromptContext, PromptMode, StepResult,
    SystemPromptBuilder, ToolDescriptor,
};

// ── Compression, stats, caching ─────────────────────────────────────
pub use crate::cache::PromptCache;
pub use crate::compress::{CompressionLevel, compress_prompt, intelligent_truncate};
pub use crate::config::PromptConfig;
pub use crate::stats::{PromptStats, ValidationReport, prompt_stats, validate_prompt};
pub use crate::{TemplateError, json_schema_for};
