//! Section renderers.
//!
//! Each renderer takes a narrow slice of [`PromptContext`](super::PromptContext)
//! and returns its fragment, or `None` when there is nothing to render.
//! Renderers never fail: absent or empty input simply yields no section.
//!
//! Section names double as the identifiers stored in
//! [`Section::name`](super::Section::name).

use super::context::{MemorySnippet, PageContext, ToolDescriptor};

pub const BASE: &str = "base";
pub const FLASH_INTENT: &str = "flash_intent_analysis";
pub const THINK_INTENT: &str = "think_intent_analysis";
pub const MEMORY: &str = "memory";
pub const PAGE_CONTEXT: &str = "page_context";
pub const TOOLS: &str = "tools";
pub const CORRELATED_QUERY: &str = "correlated_query";
pub const RESPONSE_FORMAT: &str = "response_format";
pub const ORGANIZATION_STATUS: &str = "organization_status";
pub const TOOL_SELECTION_TREE: &str = "tool_selection_tree";

pub const MEMORY_HEADER: &str = "## 🧠 用户记忆上下文";
pub const PAGE_CONTEXT_HEADER: &str = "## 📍 当前页面上下文";
pub const TOOLS_HEADER: &str = "## 🔧 可用工具";

/// Numbered list of memory snippet contents.
///
/// Snippets with blank content are skipped; `None` if nothing remains.
pub fn memory_section(memories: &[MemorySnippet]) -> Option<String> {
    let lines: Vec<String> = memories
        .iter()
        .map(|m| m.content.trim())
        .filter(|c| !c.is_empty())
        .enumerate()
        .map(|(i, c)| format!("{}. {c}", i + 1))
        .collect();
    if lines.is_empty() {
        return None;
    }
    Some(format!(
        "{MEMORY_HEADER}\n以下是与当前用户相关的历史记忆，回答时可作为参考：\n{}",
        lines.join("\n")
    ))
}

/// Current page name and a numbered list of `description(type)` actions.
pub fn page_context_section(page: Option<&PageContext>) -> Option<String> {
    let page = page?;
    let current = page
        .current_page
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());
    if current.is_none() && page.available_actions.is_empty() {
        return None;
    }

    let mut out = String::from(PAGE_CONTEXT_HEADER);
    if let Some(current) = current {
        out.push_str(&format!("\n当前页面：{current}"));
    }
    if !page.available_actions.is_empty() {
        out.push_str("\n页面可执行的操作：");
        for (i, action) in page.available_actions.iter().enumerate() {
            out.push_str(&format!(
                "\n{}. {}({})",
                i + 1,
                action.description,
                action.action_type
            ));
        }
    }
    Some(out)
}

/// Numbered `name: description` list with each tool's parameters as JSON.
///
/// A tool without a parameter schema is listed with `{}`.
pub fn tools_section(tools: &[ToolDescriptor]) -> Option<String> {
    if tools.is_empty() {
        return None;
    }
    let mut out = String::from(TOOLS_HEADER);
    for (i, tool) in tools.iter().enumerate() {
        let params = tool
            .parameters
            .as_ref()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "{}".to_string());
        out.push_str(&format!(
            "\n{}. {}: {}\n   参数：{params}",
            i + 1,
            tool.name,
            tool.description
        ));
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::context::PageAction;
    use serde_json::json;

    #[test]
    fn memory_section_numbers_contents() {
        let section = memory_section(&[
            MemorySnippet::new("likes blue"),
            MemorySnippet::new("  "),
            MemorySnippet::new("works in 大一班"),
        ])
        .unwrap();
        assert!(section.starts_with(MEMORY_HEADER));
        assert!(section.contains("1. likes blue"));
        assert!(section.contains("2. works in 大一班"));
        assert!(!section.contains("3."));
    }

    #[test]
    fn memory_section_absent_when_empty() {
        assert!(memory_section(&[]).is_none());
        assert!(memory_section(&[MemorySnippet::new("")]).is_none());
    }

    #[test]
    fn page_section_lists_actions() {
        let page = PageContext {
            current_page: Some("学生管理".into()),
            available_actions: vec![
                PageAction {
                    description: "新增学生".into(),
                    action_type: "button".into(),
                },
                PageAction {
                    description: "导出名单".into(),
                    action_type: "link".into(),
                },
            ],
        };
        let section = page_context_section(Some(&page)).unwrap();
        assert!(section.contains("当前页面：学生管理"));
        assert!(section.contains("1. 新增学生(button)"));
        assert!(section.contains("2. 导出名单(link)"));
    }

    #[test]
    fn page_section_without_page_name() {
        let page = PageContext {
            current_page: None,
            available_actions: vec![PageAction {
                description: "刷新".into(),
                action_type: "button".into(),
            }],
        };
        let section = page_context_section(Some(&page)).unwrap();
        assert!(!section.contains("当前页面："));
        assert!(section.contains("1. 刷新(button)"));
    }

    #[test]
    fn page_section_absent_when_empty() {
        assert!(page_context_section(None).is_none());
        assert!(page_context_section(Some(&PageContext::default())).is_none());
    }

    #[test]
    fn tools_section_includes_json_parameters() {
        let tools = vec![
            ToolDescriptor {
                name: "query_students".into(),
                description: "查询学生".into(),
                parameters: Some(json!({"type": "object"})),
            },
            ToolDescriptor {
                name: "navigate".into(),
                description: "页面跳转".into(),
                parameters: None,
            },
        ];
        let section = tools_section(&tools).unwrap();
        assert!(section.contains("1. query_students: 查询学生"));
        assert!(section.contains(r#"参数：{"type":"object"}"#));
        assert!(section.contains("2. navigate: 页面跳转\n   参数：{}"));
    }

    #[test]
    fn tools_section_absent_when_empty() {
        assert!(tools_section(&[]).is_none());
    }
}
