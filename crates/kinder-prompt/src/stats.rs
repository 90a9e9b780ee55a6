//! Prompt size statistics and permissive validation.
//!
//! Token counts are a character heuristic, not a tokenizer result: one
//! token per [`CHARS_PER_TOKEN`] characters, rounded up. Validation is meant
//! for logging: only an empty prompt is an error, everything else is a
//! warning and never blocks emission.

use crate::config::PromptConfig;
use crate::{CHARS_PER_TOKEN, char_len, template};
use serde::Serialize;

/// Section marker counted by [`PromptStats::sections`].
pub const SECTION_MARKER: &str = "##";

/// Estimate tokens as `ceil(chars / 4)`.
pub fn estimate_tokens(text: &str) -> usize {
    char_len(text).div_ceil(CHARS_PER_TOKEN)
}

/// Size snapshot of a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptStats {
    /// Length in characters.
    pub total_length: usize,
    pub token_estimate: usize,
    /// Occurrences of the `##` marker.
    pub sections: usize,
}

impl PromptStats {
    /// Format as a short log-friendly string.
    pub fn to_log_string(&self) -> String {
        format!(
            "prompt: {} chars, ~{} tokens, {} sections",
            self.total_length, self.token_estimate, self.sections
        )
    }
}

pub fn prompt_stats(text: &str) -> PromptStats {
    PromptStats {
        total_length: char_len(text),
        token_estimate: estimate_tokens(text),
        sections: text.matches(SECTION_MARKER).count(),
    }
}

/// Outcome of [`validate_prompt`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// `true` iff `errors` is empty. Warnings never invalidate a prompt.
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Validate a prompt with the default limits.
pub fn validate_prompt(text: &str) -> ValidationReport {
    validate_prompt_with(text, &PromptConfig::default())
}

/// Validate a prompt against the limits in `config`.
///
/// Errors: empty (or whitespace-only) prompt. Warnings: length above
/// `max_prompt_length`, token estimate above `max_token_estimate`, and any
/// `{{...}}` placeholder left in the text.
pub fn validate_prompt_with(text: &str, config: &PromptConfig) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if text.trim().is_empty() {
        errors.push("prompt is empty".to_string());
    }

    let stats = prompt_stats(text);
    if stats.total_length > config.max_prompt_length {
        warnings.push(format!(
            "prompt length {} exceeds limit {}",
            stats.total_length, config.max_prompt_length
        ));
    }
    if stats.token_estimate > config.max_token_estimate {
        warnings.push(format!(
            "estimated tokens {} exceed limit {}",
            stats.token_estimate, config.max_token_estimate
        ));
    }

    let unresolved = template::placeholders(text);
    if !unresolved.is_empty() {
        let listed: Vec<String> = unresolved.iter().map(|p| format!("{{{{{p}}}}}")).collect();
        warnings.push(format!("unresolved placeholders: {}", listed.join(", ")));
    }

    ValidationReport {
        valid: errors.is_empty(),
        errors,
        warnings,
    }
}
