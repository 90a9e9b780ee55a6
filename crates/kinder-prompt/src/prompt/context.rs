//! Per-request input to the composers.
//!
//! A [`PromptContext`] is plain data built by the calling orchestration
//! layer for one request and discarded afterwards. Every field has a
//! default, so callers (and JSON context files) only set what applies.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Everything a composer may need to assemble a prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct PromptContext {
    /// Role of the user the assistant is serving (e.g. "园长", "admin").
    pub user_role: String,
    /// Memory snippets, most relevant first.
    pub memory_context: Vec<MemorySnippet>,
    /// Page the user is currently looking at, if known.
    pub page_context: Option<PageContext>,
    /// Tool catalogue offered to the model.
    pub tools: Vec<ToolDescriptor>,
    /// Prior turns, oldest first.
    pub conversation_history: Vec<ConversationTurn>,
    /// Include the think-mode intent-analysis section. Unset means off for
    /// [`build_system_prompt`](super::PromptComposer::build_system_prompt)
    /// and on in think-optimized mode.
    pub requires_intent_analysis: Option<bool>,
    /// Include correlated-query planning (needs `selected_tools`). Unset
    /// defaults like `requires_intent_analysis`.
    pub enable_correlated_query: Option<bool>,
    pub user_query: String,
    /// Names of the tools pre-selected for this query.
    pub selected_tools: Vec<String>,
    /// Include the response-format guide. Unset defaults like
    /// `requires_intent_analysis`.
    pub enable_enhanced_response: Option<bool>,
    /// Include the flash-mode intent-recognition section.
    pub enable_flash_intent_analysis: bool,
    pub estimated_tool_count: Option<u32>,
    pub model_selection_reason: Option<String>,
}

impl PromptContext {
    /// Copy with the think-optimized defaults applied: intent analysis,
    /// correlated query and enhanced response are on unless explicitly
    /// disabled.
    pub fn with_think_defaults(&self) -> Self {
        Self {
            requires_intent_analysis: Some(self.requires_intent_analysis.unwrap_or(true)),
            enable_correlated_query: Some(self.enable_correlated_query.unwrap_or(true)),
            enable_enhanced_response: Some(self.enable_enhanced_response.unwrap_or(true)),
            ..self.clone()
        }
    }
}

/// One remembered fact about the user or organization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemorySnippet {
    pub content: String,
}

impl MemorySnippet {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct PageContext {
    pub current_page: Option<String>,
    pub available_actions: Vec<PageAction>,
}

/// An action the current page exposes (button, form, link).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PageAction {
    pub description: String,
    #[serde(rename = "type")]
    pub action_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    /// JSON Schema of the tool arguments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConversationTurn {
    /// `user`, `assistant` or `system`; other values are shown verbatim.
    pub role: String,
    pub content: String,
}

impl ConversationTurn {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_camel_case_with_defaults() {
        let json = r#"{
            "userRole": "principal",
            "memoryContext": [{"content": "likes blue"}],
            "pageContext": {
                "currentPage": "学生管理",
                "availableActions": [{"description": "新增学生", "type": "button"}]
            },
            "enableFlashIntentAnalysis": true,
            "estimatedToolCount": 2
        }"#;
        let ctx: PromptContext = serde_json::from_str(json).unwrap();
        assert_eq!(ctx.user_role, "principal");
        assert_eq!(ctx.memory_context[0].content, "likes blue");
        let page = ctx.page_context.unwrap();
        assert_eq!(page.available_actions[0].action_type, "button");
        assert!(ctx.enable_flash_intent_analysis);
        assert_eq!(ctx.requires_intent_analysis, None);
        assert_eq!(ctx.estimated_tool_count, Some(2));
        assert!(ctx.tools.is_empty());
    }

    #[test]
    fn think_defaults_fill_only_unset_flags() {
        let ctx = PromptContext {
            enable_correlated_query: Some(false),
            ..Default::default()
        }
        .with_think_defaults();
        assert_eq!(ctx.requires_intent_analysis, Some(true));
        assert_eq!(ctx.enable_correlated_query, Some(false));
        assert_eq!(ctx.enable_enhanced_response, Some(true));
    }

    #[test]
    fn schema_names_camel_case_fields() {
        let schema = crate::json_schema_for::<PromptContext>();
        let props = schema["properties"].as_object().unwrap();
        assert!(props.contains_key("memoryContext"));
        assert!(props.contains_key("enableCorrelatedQuery"));
    }
}
