//! Mode selection for system-prompt composition.
//!
//! The orchestration layer builds one of three system prompts per request:
//! a lightweight direct-mode prompt, the think-optimized context-driven
//! prompt, or the full ten-step agent prompt. [`PromptMode::select`] encodes
//! how its two request flags map onto those modes.

use super::ComposedPrompt;
use super::composer::PromptComposer;
use super::context::PromptContext;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptMode {
    /// Single-template prompt, one tool per answer.
    Direct,
    /// Context-driven prompt from [`PromptComposer::build_system_prompt`].
    #[serde(rename = "think")]
    ThinkOptimized,
    /// Full ten-step agent prompt.
    #[default]
    Agent,
}

impl PromptMode {
    /// Pick the mode from request flags.
    ///
    /// Think optimization wins over direct mode; with neither flag the full
    /// agent prompt is used.
    pub fn select(is_direct: bool, enable_think: bool) -> Self {
        if enable_think {
            Self::ThinkOptimized
        } else if is_direct {
            Self::Direct
        } else {
            Self::Agent
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::ThinkOptimized => "think",
            Self::Agent => "agent",
        }
    }
}

impl fmt::Display for PromptMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "direct" => Ok(Self::Direct),
            "think" | "system" => Ok(Self::ThinkOptimized),
            "agent" => Ok(Self::Agent),
            other => Err(format!(
                "unknown prompt mode '{other}', expected direct, think or agent"
            )),
        }
    }
}

/// Everything any mode may read.
///
/// The organization status and tool-selection tree are free text produced
/// by other services; the think-optimized mode ignores them.
#[derive(Debug, Clone, Copy)]
pub struct ModeInputs<'b> {
    pub context: &'b PromptContext,
    pub organization_status: &'b str,
    pub tool_selection_tree: &'b str,
    pub user_pages: Option<&'b str>,
}

impl<'b> ModeInputs<'b> {
    pub fn new(context: &'b PromptContext) -> Self {
        Self {
            context,
            organization_status: "",
            tool_selection_tree: "",
            user_pages: None,
        }
    }

    pub fn with_organization_status(mut self, text: &'b str) -> Self {
        self.organization_status = text;
        self
    }

    pub fn with_tool_selection_tree(mut self, text: &'b str) -> Self {
        self.tool_selection_tree = text;
        self
    }

    pub fn with_user_pages(mut self, text: &'b str) -> Self {
        self.user_pages = Some(text);
        self
    }
}

impl PromptComposer<'_> {
    /// Build the system prompt for `mode`.
    pub fn compose(&self, mode: PromptMode, inputs: ModeInputs<'_>) -> ComposedPrompt {
        match mode {
            PromptMode::Direct => self
                .build_direct_mode_prompt(inputs.organization_status, inputs.tool_selection_tree),
            PromptMode::ThinkOptimized => {
                self.build_system_prompt(&inputs.context.with_think_defaults())
            }
            PromptMode::Agent => self.build_agent_mode_prompt(
                &inputs.context.user_role,
                inputs.organization_status,
                inputs.tool_selection_tree,
                inputs.user_pages,
            ),
        }
    }
}
