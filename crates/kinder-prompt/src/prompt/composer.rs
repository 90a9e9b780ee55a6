//! Prompt composers.
//!
//! [`PromptComposer`] borrows a [`TemplateRegistry`] and decides, per mode,
//! which sections apply and in what order. Template-backed steps whose
//! template is not registered are logged and skipped; the rest of the
//! prompt is still produced.

use super::builder::SystemPromptBuilder;
use super::context::{ConversationTurn, PromptContext};
use super::sections;
use super::{ComposedPrompt, Diagnostics};
use crate::config::PromptConfig;
use crate::template::builtin;
use crate::template::{TemplateRegistry, Variables, render};
use serde::{Deserialize, Serialize};
use std::error::Error;
use tracing::{debug, warn};

/// Outcome of one executed step, listed by
/// [`build_summary_prompt`](PromptComposer::build_summary_prompt).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    pub name: String,
    pub success: bool,
    pub detail: String,
}

impl StepResult {
    pub fn ok(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            success: true,
            detail: detail.into(),
        }
    }

    pub fn failed(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            success: false,
            detail: detail.into(),
        }
    }
}

/// Document formats with a generation template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Excel,
    Word,
    Ppt,
    Pdf,
}

impl DocumentKind {
    pub fn template_name(self) -> &'static str {
        match self {
            Self::Excel => builtin::DOCUMENT_EXCEL,
            Self::Word => builtin::DOCUMENT_WORD,
            Self::Ppt => builtin::DOCUMENT_PPT,
            Self::Pdf => builtin::DOCUMENT_PDF,
        }
    }
}

/// Assembles prompts from registry templates and a [`PromptContext`].
///
/// # Example
///
/// ```
/// use kinder_prompt::prompt::{MemorySnippet, PromptComposer, PromptContext};
/// use kinder_prompt::template::TemplateRegistry;
///
/// let registry = TemplateRegistry::with_builtins();
/// let composer = PromptComposer::new(&registry);
///
/// let ctx = PromptContext {
///     user_role: "园长".into(),
///     memory_context: vec![MemorySnippet::new("likes blue")],
///     ..Default::default()
/// };
/// let prompt = composer.build_system_prompt(&ctx);
///
/// assert!(prompt.text.contains("likes blue"));
/// assert!(prompt.diagnostics.is_clean());
/// ```
#[derive(Debug, Clone)]
pub struct PromptComposer<'a> {
    registry: &'a TemplateRegistry,
    config: PromptConfig,
}

impl<'a> PromptComposer<'a> {
    pub fn new(registry: &'a TemplateRegistry) -> Self {
        Self {
            registry,
            config: PromptConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PromptConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &PromptConfig {
        &self.config
    }

    pub fn registry(&self) -> &TemplateRegistry {
        self.registry
    }

    /// Render a registered template, or record it as missing.
    fn render_template(
        &self,
        name: &str,
        variables: &Variables,
        diagnostics: &mut Diagnostics,
    ) -> Option<String> {
        match self.registry.get(name) {
            Some(template) => Some(render(template, variables)),
            None => {
                warn!(template = name, "template not registered, skipping section");
                diagnostics.record_missing(name);
                None
            }
        }
    }

    fn finish(
        &self,
        kind: &str,
        builder: SystemPromptBuilder,
        diagnostics: Diagnostics,
    ) -> ComposedPrompt {
        let composed = ComposedPrompt::from_sections(builder.build(), diagnostics);
        debug!(
            kind,
            sections = composed.section_count,
            "{}",
            composed.stats().to_log_string()
        );
        composed
    }

    /// Build the think-optimized system prompt.
    ///
    /// Section order is fixed: base → flash intent → think intent → memory →
    /// page context → tools → correlated query → response format. Gated
    /// sections appear only when their flag is set; correlated-query
    /// planning additionally requires at least one selected tool.
    pub fn build_system_prompt(&self, ctx: &PromptContext) -> ComposedPrompt {
        let mut diagnostics = Diagnostics::default();
        let vars = Variables::new()
            .with("userRole", ctx.user_role.as_str())
            .with("userQuery", ctx.user_query.as_str())
            .with("selectedTools", ctx.selected_tools.join("、"))
            .with("estimatedToolCount", ctx.estimated_tool_count)
            .with("modelSelectionReason", ctx.model_selection_reason.clone());

        let mut builder = SystemPromptBuilder::new().fixed_opt(
            sections::BASE,
            self.render_template(builtin::BASE_SYSTEM, &vars, &mut diagnostics),
        );

        if ctx.enable_flash_intent_analysis {
            builder = builder.section_opt(
                sections::FLASH_INTENT,
                self.render_template(builtin::FLASH_INTENT_ANALYSIS, &vars, &mut diagnostics),
            );
        }
        if ctx.requires_intent_analysis.unwrap_or(false) {
            builder = builder.section_opt(
                sections::THINK_INTENT,
                self.render_template(builtin::THINK_INTENT_ANALYSIS, &vars, &mut diagnostics),
            );
        }

        builder = builder
            .section_opt(sections::MEMORY, sections::memory_section(&ctx.memory_context))
            .section_opt(
                sections::PAGE_CONTEXT,
                sections::page_context_section(ctx.page_context.as_ref()),
            )
            .section_opt(sections::TOOLS, sections::tools_section(&ctx.tools));

        if ctx.enable_correlated_query.unwrap_or(false) && !ctx.selected_tools.is_empty() {
            builder = builder.section_opt(
                sections::CORRELATED_QUERY,
                self.render_template(builtin::THINK_CORRELATED_QUERY, &vars, &mut diagnostics),
            );
        }
        if ctx.enable_enhanced_response.unwrap_or(false) {
            builder = builder.section_opt(
                sections::RESPONSE_FORMAT,
                self.render_template(builtin::RESPONSE_FORMAT_GUIDE, &vars, &mut diagnostics),
            );
        }

        self.finish("system", builder, diagnostics)
    }

    /// Build the full agent-mode prompt in ten fixed steps.
    ///
    /// base → organization status → tool-calling rules → tool-selection
    /// tree → database-query guide → UI-rendering guide → navigation guide →
    /// workflow guide → response-format guide → completion judgment. The
    /// navigation guide lists `user_pages` when given; otherwise it renders
    /// with the list line removed.
    pub fn build_agent_mode_prompt(
        &self,
        user_role: &str,
        organization_status: &str,
        tool_selection_tree: &str,
        user_pages: Option<&str>,
    ) -> ComposedPrompt {
        let mut diagnostics = Diagnostics::default();
        let vars = Variables::new()
            .with("userRole", user_role)
            .with("toolSelectionTree", tool_selection_tree);
        let navigation_vars = match user_pages {
            Some(pages) => {
                Variables::new().with("userPagesList", format!("用户可访问的页面：\n{pages}"))
            }
            None => Variables::new(),
        };
        let navigation = self
            .render_template(builtin::NAVIGATION_GUIDE, &navigation_vars, &mut diagnostics)
            .map(|text| match user_pages {
                Some(_) => text,
                None => drop_blank_lines(&text),
            });

        let builder = SystemPromptBuilder::new()
            .fixed_opt(
                sections::BASE,
                self.render_template(builtin::BASE_SYSTEM, &vars, &mut diagnostics),
            )
            .section(sections::ORGANIZATION_STATUS, organization_status.trim())
            .section_opt(
                builtin::TOOL_CALLING_RULES,
                self.render_template(builtin::TOOL_CALLING_RULES, &vars, &mut diagnostics),
            )
            .section(sections::TOOL_SELECTION_TREE, tool_selection_tree.trim())
            .section_opt(
                builtin::DATABASE_QUERY_GUIDE,
                self.render_template(builtin::DATABASE_QUERY_GUIDE, &vars, &mut diagnostics),
            )
            .section_opt(
                builtin::UI_RENDERING_GUIDE,
                self.render_template(builtin::UI_RENDERING_GUIDE, &vars, &mut diagnostics),
            )
            .section_opt(builtin::NAVIGATION_GUIDE, navigation)
            .section_opt(
                builtin::WORKFLOW_GUIDE,
                self.render_template(builtin::WORKFLOW_GUIDE, &vars, &mut diagnostics),
            )
            .section_opt(
                builtin::RESPONSE_FORMAT_GUIDE,
                self.render_template(builtin::RESPONSE_FORMAT_GUIDE, &vars, &mut diagnostics),
            )
            .section_opt(
                builtin::COMPLETION_JUDGMENT,
                self.render_template(builtin::COMPLETION_JUDGMENT, &vars, &mut diagnostics),
            );

        self.finish("agent", builder, diagnostics)
    }

    /// Build the single-template prompt for direct (non-agentic) mode.
    pub fn build_direct_mode_prompt(
        &self,
        organization_status: &str,
        tool_selection_tree: &str,
    ) -> ComposedPrompt {
        let mut diagnostics = Diagnostics::default();
        let vars = Variables::new()
            .with("organizationStatus", organization_status.trim())
            .with("toolSelectionTree", tool_selection_tree.trim());
        let builder = SystemPromptBuilder::new().section_opt(
            builtin::DIRECT_MODE_SYSTEM,
            self.render_template(builtin::DIRECT_MODE_SYSTEM, &vars, &mut diagnostics),
        );
        self.finish("direct", builder, diagnostics)
    }

    /// Render one of the document-generation templates.
    pub fn build_document_prompt(
        &self,
        kind: DocumentKind,
        variables: &Variables,
    ) -> ComposedPrompt {
        let mut diagnostics = Diagnostics::default();
        let name = kind.template_name();
        let builder = SystemPromptBuilder::new().section_opt(
            name,
            self.render_template(name, variables, &mut diagnostics),
        );
        self.finish("document", builder, diagnostics)
    }

    /// Prefix `content` with the most recent conversation turns.
    ///
    /// Uses the last `history_window` turns (default 5). Without a context
    /// or with an empty history, `content` is returned unchanged.
    pub fn build_user_prompt(&self, content: &str, ctx: Option<&PromptContext>) -> String {
        let history = match ctx {
            Some(ctx) if !ctx.conversation_history.is_empty() => &ctx.conversation_history,
            _ => return content.to_string(),
        };
        let start = history.len().saturating_sub(self.config.history_window);
        let turns: Vec<String> = history[start..].iter().map(format_turn).collect();
        format!(
            "## 最近对话\n{}\n\n## 当前问题\n{content}",
            turns.join("\n")
        )
    }

    /// Prompt for the next round of a multi-round tool loop.
    pub fn build_multi_round_prompt(
        &self,
        round: u32,
        max_rounds: u32,
        previous_results: &[String],
        user_query: &str,
    ) -> String {
        let mut out = format!("## 🔄 多轮执行（第 {round}/{max_rounds} 轮）\n原始问题：{user_query}");
        if !previous_results.is_empty() {
            out.push_str("\n\n## 已完成步骤的结果");
            for (i, result) in previous_results.iter().enumerate() {
                out.push_str(&format!("\n{}. {}", i + 1, result.trim()));
            }
        }
        out.push_str(
            "\n\n请根据以上结果判断是否还需要调用工具；信息已经足够时，直接给出最终回答。",
        );
        out
    }

    /// Prompt asking the model to explain a failure to the user.
    ///
    /// Includes the error's source chain, one line per cause.
    pub fn build_error_prompt(&self, error: &dyn Error, step: Option<&str>) -> String {
        let mut out = String::from("## ❌ 执行出错");
        if let Some(step) = step {
            out.push_str(&format!("\n出错步骤：{step}"));
        }
        out.push_str(&format!("\n错误信息：{error}"));
        let mut source = error.source();
        while let Some(cause) = source {
            out.push_str(&format!("\n原因：{cause}"));
            source = cause.source();
        }
        out.push_str("\n\n请向用户说明出错原因并给出可行的替代方案，不要重复执行同样失败的操作。");
        out
    }

    /// Prompt asking the model to summarize executed steps.
    pub fn build_summary_prompt(&self, results: &[StepResult]) -> String {
        let mut out = String::from("## 📋 执行结果汇总");
        if results.is_empty() {
            out.push_str("\n本次没有执行任何步骤。");
        } else {
            for (i, result) in results.iter().enumerate() {
                let mark = if result.success { "✅" } else { "❌" };
                out.push_str(&format!(
                    "\n{}. {mark} {}：{}",
                    i + 1,
                    result.name,
                    result.detail.trim()
                ));
            }
        }
        out.push_str("\n\n请基于以上结果，用简洁的语言向用户总结完成情况。");
        out
    }
}

fn drop_blank_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_turn(turn: &ConversationTurn) -> String {
    let speaker = match turn.role.as_str() {
        "user" => "用户",
        "assistant" => "助手",
        "system" => "系统",
        other => other,
    };
    format!("{speaker}：{}", turn.content.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::context::{MemorySnippet, PageAction, PageContext, ToolDescriptor};
    use crate::template::Template;

    fn full_context() -> PromptContext {
        PromptContext {
            user_role: "园长".into(),
            memory_context: vec![MemorySnippet::new("likes blue")],
            page_context: Some(PageContext {
                current_page: Some("学生管理".into()),
                available_actions: vec![PageAction {
                    description: "新增学生".into(),
                    action_type: "button".into(),
                }],
            }),
            tools: vec![ToolDescriptor {
                name: "query_students".into(),
                description: "查询学生".into(),
                parameters: None,
            }],
            requires_intent_analysis: Some(true),
            enable_correlated_query: Some(true),
            user_query: "大一班有多少学生".into(),
            selected_tools: vec!["query_students".into(), "query_classes".into()],
            enable_enhanced_response: Some(true),
            enable_flash_intent_analysis: true,
            estimated_tool_count: Some(2),
            model_selection_reason: Some("简单查询".into()),
            ..Default::default()
        }
    }

    #[test]
    fn system_prompt_orders_every_section() {
        let registry = TemplateRegistry::with_builtins();
        let prompt = PromptComposer::new(&registry).build_system_prompt(&full_context());
        assert_eq!(
            prompt.section_names(),
            vec![
                sections::BASE,
                sections::FLASH_INTENT,
                sections::THINK_INTENT,
                sections::MEMORY,
                sections::PAGE_CONTEXT,
                sections::TOOLS,
                sections::CORRELATED_QUERY,
                sections::RESPONSE_FORMAT,
            ]
        );
        assert!(prompt.diagnostics.is_clean(), "{:?}", prompt.diagnostics);
    }

    #[test]
    fn system_prompt_substitutes_context_values() {
        let registry = TemplateRegistry::with_builtins();
        let text = PromptComposer::new(&registry)
            .build_system_prompt(&full_context())
            .into_text();
        assert!(text.contains("当前服务的用户角色是：园长"));
        assert!(text.contains("预计需要的工具数量：2"));
        assert!(text.contains("query_students、query_classes"));
    }

    #[test]
    fn correlated_query_requires_selected_tools() {
        let registry = TemplateRegistry::with_builtins();
        let ctx = PromptContext {
            selected_tools: vec![],
            ..full_context()
        };
        let prompt = PromptComposer::new(&registry).build_system_prompt(&ctx);
        assert!(!prompt.section_names().contains(&sections::CORRELATED_QUERY));
    }

    #[test]
    fn disabled_flags_omit_gated_sections() {
        let registry = TemplateRegistry::with_builtins();
        let ctx = PromptContext {
            memory_context: vec![MemorySnippet::new("likes blue")],
            ..Default::default()
        };
        let prompt = PromptComposer::new(&registry).build_system_prompt(&ctx);
        assert_eq!(prompt.section_names(), vec![sections::BASE, sections::MEMORY]);
        assert!(!prompt.text.contains(sections::TOOLS_HEADER));
    }

    #[test]
    fn missing_template_skips_section_and_records_it() {
        let mut registry = TemplateRegistry::with_builtins();
        registry.delete(builtin::FLASH_INTENT_ANALYSIS);
        let prompt = PromptComposer::new(&registry).build_system_prompt(&full_context());
        assert!(!prompt.section_names().contains(&sections::FLASH_INTENT));
        assert!(prompt.section_names().contains(&sections::THINK_INTENT));
        assert_eq!(
            prompt.diagnostics.missing_templates,
            vec![builtin::FLASH_INTENT_ANALYSIS]
        );
    }

    #[test]
    fn agent_mode_has_ten_steps_in_order() {
        let registry = TemplateRegistry::with_builtins();
        let prompt = PromptComposer::new(&registry).build_agent_mode_prompt(
            "老师",
            "## 📊 机构现状\n在园幼儿 120 人",
            "## 决策树\n出勤 → query_attendance",
            Some("- 学生管理\n- 考勤管理"),
        );
        assert_eq!(
            prompt.section_names(),
            vec![
                sections::BASE,
                sections::ORGANIZATION_STATUS,
                builtin::TOOL_CALLING_RULES,
                sections::TOOL_SELECTION_TREE,
                builtin::DATABASE_QUERY_GUIDE,
                builtin::UI_RENDERING_GUIDE,
                builtin::NAVIGATION_GUIDE,
                builtin::WORKFLOW_GUIDE,
                builtin::RESPONSE_FORMAT_GUIDE,
                builtin::COMPLETION_JUDGMENT,
            ]
        );
        assert!(prompt.text.contains("用户可访问的页面：\n- 学生管理"));
        assert!(prompt.diagnostics.is_clean());
    }

    #[test]
    fn agent_mode_navigation_without_pages_has_no_placeholder() {
        let registry = TemplateRegistry::with_builtins();
        let prompt =
            PromptComposer::new(&registry).build_agent_mode_prompt("老师", "", "tree", None);
        assert!(!prompt.text.contains("{{userPagesList}}"));
        assert!(!prompt.text.contains("用户可访问的页面"));
        assert!(!prompt.section_names().contains(&sections::ORGANIZATION_STATUS));
        assert!(prompt.diagnostics.unresolved_placeholders.is_empty());
    }

    #[test]
    fn agent_mode_navigation_without_pages_has_no_gap() {
        let registry = TemplateRegistry::with_builtins();
        let prompt =
            PromptComposer::new(&registry).build_agent_mode_prompt("老师", "", "tree", None);
        let navigation = prompt
            .sections
            .iter()
            .find(|s| s.name == builtin::NAVIGATION_GUIDE)
            .unwrap();
        assert!(!navigation.text.contains("\n\n"));
        assert!(navigation.text.contains("navigate_to_page 工具跳转。\n- 只能跳转"));
    }

    #[test]
    fn agent_mode_degrades_with_missing_templates() {
        let mut registry = TemplateRegistry::new();
        registry.register(
            Template::new(builtin::BASE_SYSTEM, "## 基础\n角色：{{userRole}}")
                .with_variables(["userRole"]),
        );
        let prompt =
            PromptComposer::new(&registry).build_agent_mode_prompt("老师", "机构", "树", None);
        assert_eq!(
            prompt.section_names(),
            vec![
                sections::BASE,
                sections::ORGANIZATION_STATUS,
                sections::TOOL_SELECTION_TREE
            ]
        );
        assert_eq!(prompt.diagnostics.missing_templates.len(), 7);
    }

    #[test]
    fn direct_mode_renders_single_template() {
        let registry = TemplateRegistry::with_builtins();
        let prompt = PromptComposer::new(&registry)
            .build_direct_mode_prompt("在园 120 人", "考勤 → query");
        assert_eq!(prompt.section_count, 1);
        assert!(prompt.text.contains("在园 120 人"));
        assert!(prompt.text.contains("考勤 → query"));
    }

    #[test]
    fn document_prompt_renders_kind_template() {
        let registry = TemplateRegistry::with_builtins();
        let vars = Variables::new()
            .with("title", "三月考勤表")
            .with("requirements", "按班级汇总")
            .with("data", "[]");
        let prompt =
            PromptComposer::new(&registry).build_document_prompt(DocumentKind::Excel, &vars);
        assert!(prompt.text.contains("Excel"));
        assert!(prompt.text.contains("标题：三月考勤表"));
    }

    #[test]
    fn user_prompt_without_history_is_unchanged() {
        let registry = TemplateRegistry::new();
        let composer = PromptComposer::new(&registry);
        assert_eq!(composer.build_user_prompt("你好", None), "你好");
        assert_eq!(
            composer.build_user_prompt("你好", Some(&PromptContext::default())),
            "你好"
        );
    }

    #[test]
    fn user_prompt_keeps_last_five_turns() {
        let registry = TemplateRegistry::new();
        let composer = PromptComposer::new(&registry);
        let ctx = PromptContext {
            conversation_history: (1..=7)
                .map(|i| {
                    let role = if i % 2 == 1 { "user" } else { "assistant" };
                    ConversationTurn::new(role, format!("turn {i}"))
                })
                .collect(),
            ..Default::default()
        };
        let prompt = composer.build_user_prompt("现在呢？", Some(&ctx));
        assert!(!prompt.contains("turn 2"));
        assert!(prompt.contains("用户：turn 3"));
        assert!(prompt.contains("助手：turn 6"));
        assert!(prompt.contains("用户：turn 7"));
        assert!(prompt.ends_with("## 当前问题\n现在呢？"));
    }

    #[test]
    fn user_prompt_respects_configured_window() {
        let registry = TemplateRegistry::new();
        let composer =
            PromptComposer::new(&registry).with_config(PromptConfig::default().with_history_window(1));
        let ctx = PromptContext {
            conversation_history: vec![
                ConversationTurn::new("user", "first"),
                ConversationTurn::new("tool", "second"),
            ],
            ..Default::default()
        };
        let prompt = composer.build_user_prompt("q", Some(&ctx));
        assert!(!prompt.contains("first"));
        assert!(prompt.contains("tool：second"));
    }

    #[test]
    fn multi_round_prompt_lists_previous_results() {
        let registry = TemplateRegistry::new();
        let composer = PromptComposer::new(&registry);
        let prompt = composer.build_multi_round_prompt(
            2,
            5,
            &["查到 3 个班级".to_string(), "查到 86 名学生".to_string()],
            "各班人数",
        );
        assert!(prompt.contains("第 2/5 轮"));
        assert!(prompt.contains("1. 查到 3 个班级"));
        assert!(prompt.contains("2. 查到 86 名学生"));

        let first = composer.build_multi_round_prompt(1, 5, &[], "各班人数");
        assert!(!first.contains("已完成步骤的结果"));
    }

    #[derive(Debug)]
    struct Outer(std::io::Error);

    impl std::fmt::Display for Outer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "查询考勤失败")
        }
    }

    impl Error for Outer {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn error_prompt_includes_source_chain() {
        let registry = TemplateRegistry::new();
        let err = Outer(std::io::Error::other("连接超时"));
        let prompt =
            PromptComposer::new(&registry).build_error_prompt(&err, Some("query_attendance"));
        assert!(prompt.contains("出错步骤：query_attendance"));
        assert!(prompt.contains("错误信息：查询考勤失败"));
        assert!(prompt.contains("原因：连接超时"));
    }

    #[test]
    fn summary_prompt_marks_outcomes() {
        let registry = TemplateRegistry::new();
        let composer = PromptComposer::new(&registry);
        let prompt = composer.build_summary_prompt(&[
            StepResult::ok("query_students", "86 名学生"),
            StepResult::failed("export_excel", "权限不足"),
        ]);
        assert!(prompt.contains("1. ✅ query_students：86 名学生"));
        assert!(prompt.contains("2. ❌ export_excel：权限不足"));
        assert!(composer.build_summary_prompt(&[]).contains("没有执行任何步骤"));
    }
}
