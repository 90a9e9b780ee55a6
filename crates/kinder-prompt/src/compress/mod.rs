//! Multi-level prompt compression.
//!
//! The pipeline, applied only when a prompt exceeds its target length:
//!
//! 1. whitespace cleanup on every section;
//! 2. level-dependent rewriting of compressible sections
//!    ([`CompressionLevel`]);
//! 3. [`intelligent_truncate`] if the result is still too long.
//!
//! Rewrites run section by section, so a rule never matches across a
//! section boundary, and a step that would make a section longer is
//! discarded. The output is never longer than the input.

pub mod cleanup;
pub mod rules;
mod truncate;

pub use truncate::intelligent_truncate;

use crate::config::PromptConfig;
use crate::prompt::{ComposedPrompt, SECTION_SEPARATOR, Section};
use crate::{DEFAULT_TARGET_LENGTH, char_len};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Appended to truncated prompts.
pub const TRUNCATION_MARKER: &str = "[内容因长度限制被截断]";

/// Characters reserved below the target length when truncating.
pub const TRUNCATION_BUFFER: usize = 50;

const SECTION_HEADER: &str = "## ";
const PREAMBLE: &str = "preamble";

type Step = (&'static str, fn(&str) -> String);

/// How much content the compressor may rewrite.
///
/// Levels are cumulative: `Medium` applies everything `Light` does.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    /// Strip decorative emoji.
    Light,
    /// Also replace examples and shorten long descriptions.
    #[default]
    Medium,
    /// Also collapse long lists and merge repeated rules.
    Aggressive,
}

impl CompressionLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Medium => "medium",
            Self::Aggressive => "aggressive",
        }
    }

    fn steps(self) -> Vec<Step> {
        let strip: Step = ("strip_emoji", cleanup::strip_emoji);
        let mut steps = vec![strip];
        if self >= Self::Medium {
            steps.push(("compress_examples", rules::compress_examples));
            steps.push(("truncate_descriptions", rules::truncate_descriptions));
        }
        if self >= Self::Aggressive {
            steps.push(("collapse_lists", rules::collapse_lists));
            steps.push(("merge_rules", rules::merge_rules));
        }
        steps
    }
}

impl fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompressionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "medium" => Ok(Self::Medium),
            "aggressive" => Ok(Self::Aggressive),
            other => Err(format!(
                "unknown compression level '{other}' (expected light, medium or aggressive)"
            )),
        }
    }
}

/// Compress `text` to fit `max_length` characters (default 8000).
///
/// Text already within the limit is returned unchanged.
///
/// ```
/// use kinder_prompt::compress::{CompressionLevel, compress_prompt};
///
/// let prompt = "## 🎯 角色\n你是助手。";
/// assert_eq!(compress_prompt(prompt, None, CompressionLevel::Light), prompt);
///
/// let long = format!("## 🎯 角色\n{}", "内容 ".repeat(100));
/// let out = compress_prompt(&long, Some(120), CompressionLevel::Light);
/// assert!(out.chars().count() <= 120);
/// assert!(!out.contains('🎯'));
/// ```
pub fn compress_prompt(text: &str, max_length: Option<usize>, level: CompressionLevel) -> String {
    let target = max_length.unwrap_or(DEFAULT_TARGET_LENGTH);
    if char_len(text) <= target {
        return text.to_string();
    }
    let framed = split_framed(text);
    compress_sections(text, framed.iter().map(|(sep, s)| (*sep, s)), target, level)
}

/// Split a prompt into sections at lines beginning with `## `.
///
/// Text before the first header becomes a section named `preamble`; the
/// other sections are named after their header. Header-like lines inside
/// fenced code blocks do not start a section. All sections are
/// compressible.
pub fn split_sections(text: &str) -> Vec<Section> {
    split_framed(text).into_iter().map(|(_, s)| s).collect()
}

/// Compressed section text plus the separator that preceded it.
#[derive(Debug, Clone)]
pub(crate) struct Part {
    pub(crate) separator: &'static str,
    pub(crate) text: String,
}

/// Join parts with their own separators. The first separator is dropped.
pub(crate) fn join_parts(parts: &[Part]) -> String {
    let mut out = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push_str(part.separator);
        }
        out.push_str(&part.text);
    }
    out
}

/// [`split_sections`] keeping, for each section, the newlines that
/// separated it from the previous one in `text` (`"\n"` or `"\n\n"`).
pub(crate) fn split_framed(text: &str) -> Vec<(&'static str, Section)> {
    let lines: Vec<&str> = text.split('\n').collect();
    let fences = paired_fences(&lines);

    let mut sections = Vec::new();
    let mut name = PREAMBLE.to_string();
    let mut start = 0;
    let mut in_fence = false;
    for (i, line) in lines.iter().enumerate() {
        if fences.contains(&i) {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if let Some(title) = line.strip_prefix(SECTION_HEADER) {
            if i > start {
                sections.push(Section::new(name, lines[start..i].join("\n")));
            }
            name = title.trim().to_string();
            start = i;
        }
    }
    sections.push(Section::new(name, lines[start..].join("\n")));

    let mut framed = Vec::with_capacity(sections.len());
    let mut separator = "";
    for section in sections {
        // A trailing empty line means a blank line stood before the next header.
        let next = if section.text.ends_with('\n') {
            SECTION_SEPARATOR
        } else {
            "\n"
        };
        framed.push((separator, section));
        separator = next;
    }
    framed
}

/// Indices of code-fence lines that open or close a block. An unterminated
/// final fence is ignored.
fn paired_fences(lines: &[&str]) -> Vec<usize> {
    let mut fences: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.trim_start().starts_with("```"))
        .map(|(i, _)| i)
        .collect();
    if fences.len() % 2 == 1 {
        fences.pop();
    }
    fences
}

impl ComposedPrompt {
    /// Compress this prompt using its section structure.
    ///
    /// Fixed sections (such as the base system prompt) only get
    /// whitespace cleanup.
    pub fn compress(&self, max_length: Option<usize>, level: CompressionLevel) -> String {
        let target = max_length.unwrap_or(DEFAULT_TARGET_LENGTH);
        if char_len(&self.text) <= target {
            return self.text.clone();
        }
        if self.sections.is_empty() {
            return compress_prompt(&self.text, Some(target), level);
        }
        let framed = self.sections.iter().enumerate().map(|(i, s)| {
            let separator = if i == 0 { "" } else { SECTION_SEPARATOR };
            (separator, s)
        });
        compress_sections(&self.text, framed, target, level)
    }

    /// [`compress`](Self::compress) with the configured target and level.
    pub fn compress_with(&self, config: &PromptConfig) -> String {
        self.compress(Some(config.target_length), config.default_level)
    }
}

/// Every part is no longer than its section and every separator is no
/// longer than the newlines it replaces, so the result never outgrows
/// `original`.
fn compress_sections<'s>(
    original: &str,
    sections: impl Iterator<Item = (&'static str, &'s Section)>,
    target: usize,
    level: CompressionLevel,
) -> String {
    let parts: Vec<Part> = sections
        .map(|(separator, section)| Part {
            separator,
            text: compress_section(section, level),
        })
        .filter(|p| !p.text.is_empty())
        .collect();
    let text = join_parts(&parts);
    debug!(
        level = %level,
        original = char_len(original),
        compressed = char_len(&text),
        target,
        "Prompt compressed"
    );
    if char_len(&text) <= target {
        return text;
    }
    truncate::truncate_parts(&parts, target)
}

fn compress_section(section: &Section, level: CompressionLevel) -> String {
    let mut text = cleanup::clean(&section.text);
    if section.compressible {
        for (step, apply) in level.steps() {
            let next = cleanup::clean(&apply(&text));
            let (before, after) = (char_len(&text), char_len(&next));
            if after <= before {
                if after < before {
                    debug!(
                        section = %section.name,
                        step,
                        saved = before - after,
                        "Compression step applied"
                    );
                }
                text = next;
            }
        }
    }
    text.trim_matches('\n').to_string()
}
