//! Ordered assembly of prompt sections.
//!
//! [`SystemPromptBuilder`] collects named [`Section`]s in insertion order and
//! joins them with blank lines. Unlike a plain string buffer it keeps the
//! section list, so the compression pipeline can work section by section
//! instead of running patterns over the concatenated text.

use serde::Serialize;

/// Separator placed between sections in the final text.
pub const SECTION_SEPARATOR: &str = "\n\n";

/// One independently rendered fragment of a composed prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Stable identifier (e.g. `"memory"`, `"tool_calling_rules"`).
    pub name: String,
    pub text: String,
    /// Whether compression may rewrite this section beyond whitespace cleanup.
    pub compressible: bool,
}

impl Section {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            compressible: true,
        }
    }

    /// A section compression only cleans up (whitespace), never rewrites.
    pub fn fixed(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            compressible: false,
            ..Self::new(name, text)
        }
    }
}

/// Join section texts with [`SECTION_SEPARATOR`].
pub fn join_sections(sections: &[Section]) -> String {
    sections
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(SECTION_SEPARATOR)
}

/// Builder for multi-section prompts.
///
/// Empty content is silently skipped, so callers can pass the output of
/// section renderers straight through.
///
/// # Example
///
/// ```
/// use kinder_prompt::prompt::SystemPromptBuilder;
///
/// let prompt = SystemPromptBuilder::new()
///     .fixed("base", "## 角色\n你是助手。")
///     .section_if(true, "rules", || "## 规则\n先确认参数。".into())
///     .section_opt("memory", None::<String>)
///     .build_text();
///
/// assert_eq!(prompt, "## 角色\n你是助手。\n\n## 规则\n先确认参数。");
/// ```
#[derive(Debug, Default)]
pub struct SystemPromptBuilder {
    sections: Vec<Section>,
}

impl SystemPromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a compressible section. Skipped if `content` is empty.
    pub fn section(mut self, name: &str, content: impl Into<String>) -> Self {
        let content = content.into();
        if !content.is_empty() {
            self.sections.push(Section::new(name, content));
        }
        self
    }

    /// Append a section that compression must not rewrite.
    ///
    /// Skipped if `content` is empty.
    pub fn fixed(mut self, name: &str, content: impl Into<String>) -> Self {
        let content = content.into();
        if !content.is_empty() {
            self.sections.push(Section::fixed(name, content));
        }
        self
    }

    /// Conditionally append a section.
    ///
    /// The `content_fn` is only called when `condition` is true.
    pub fn section_if(
        self,
        condition: bool,
        name: &str,
        content_fn: impl FnOnce() -> String,
    ) -> Self {
        if condition {
            self.section(name, content_fn())
        } else {
            self
        }
    }

    /// Append a section only if the content is `Some`.
    pub fn section_opt(self, name: &str, content: Option<impl Into<String>>) -> Self {
        match content {
            Some(c) => self.section(name, c),
            None => self,
        }
    }

    /// Append a fixed section only if the content is `Some`.
    pub fn fixed_opt(self, name: &str, content: Option<impl Into<String>>) -> Self {
        match content {
            Some(c) => self.fixed(name, c),
            None => self,
        }
    }

    /// Number of sections collected so far.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Finish and return the ordered section list.
    pub fn build(self) -> Vec<Section> {
        self.sections
    }

    /// Finish and return the joined text.
    pub fn build_text(self) -> String {
        join_sections(&self.sections)
    }
}
