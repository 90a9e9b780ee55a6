//! Content-rewriting compression rules.
//!
//! Every rule takes one section's text and returns the rewritten text.
//! Rules work on lines and blank-line separated paragraphs and never look
//! outside the section they are given.

use std::collections::HashSet;

pub const EXAMPLE_MARKER: &str = "[示例已压缩]";
pub const DESCRIPTION_MARKER: &str = "...[详细描述已压缩]";
pub const MERGED_RULES_MARKER: &str = "[重复规则已合并]";

/// Characters of a `描述：` tail kept by [`truncate_descriptions`].
pub const DESCRIPTION_KEEP: usize = 50;
/// List runs longer than this are collapsed by [`collapse_lists`].
pub const LIST_THRESHOLD: usize = 10;
/// Items kept from a collapsed list.
pub const LIST_KEEP: usize = 5;

const DESCRIPTION_LABEL: &str = "描述：";
const EXAMPLE_PREFIXES: &[&str] = &["示例", "例如", "举例", "Example", "example"];
const RULE_PREFIXES: &[&str] = &["规则", "注意", "重要", "必须", "禁止"];

/// Replace fenced code blocks and example paragraphs with [`EXAMPLE_MARKER`].
///
/// A paragraph is an example when its first line, after list and heading
/// markers, starts with `示例`, `例如`, `举例` or `Example`. Section headers
/// are never treated as examples. Adjacent markers are merged into one.
pub fn compress_examples(text: &str) -> String {
    let unfenced = replace_fenced_blocks(text);
    let mut out: Vec<&str> = Vec::new();
    for paragraph in unfenced.split("\n\n") {
        let replacement = if is_example(paragraph) {
            EXAMPLE_MARKER
        } else {
            paragraph
        };
        if replacement == EXAMPLE_MARKER && out.last() == Some(&EXAMPLE_MARKER) {
            continue;
        }
        out.push(replacement);
    }
    out.join("\n\n")
}

/// Shorten long `描述：` lines to [`DESCRIPTION_KEEP`] characters plus
/// [`DESCRIPTION_MARKER`].
///
/// Lines are only rewritten when the result is shorter.
pub fn truncate_descriptions(text: &str) -> String {
    let marker_len = DESCRIPTION_MARKER.chars().count();
    text.split('\n')
        .map(|line| {
            let Some((head, tail)) = line.split_once(DESCRIPTION_LABEL) else {
                return line.to_string();
            };
            if tail.chars().count() <= DESCRIPTION_KEEP + marker_len {
                return line.to_string();
            }
            let kept: String = tail.chars().take(DESCRIPTION_KEEP).collect();
            format!("{head}{DESCRIPTION_LABEL}{kept}{DESCRIPTION_MARKER}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapse runs of more than [`LIST_THRESHOLD`] consecutive list items to
/// the first [`LIST_KEEP`] items and a `[其余 N 项已压缩]` line.
pub fn collapse_lists(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut i = 0;
    while i < lines.len() {
        if !is_list_item(lines[i]) {
            out.push(lines[i].to_string());
            i += 1;
            continue;
        }
        let start = i;
        while i < lines.len() && is_list_item(lines[i]) {
            i += 1;
        }
        let run = &lines[start..i];
        if run.len() > LIST_THRESHOLD {
            out.extend(run.iter().take(LIST_KEEP).map(|l| l.to_string()));
            out.push(format!("[其余 {} 项已压缩]", run.len() - LIST_KEEP));
        } else {
            out.extend(run.iter().map(|l| l.to_string()));
        }
    }
    out.join("\n")
}

/// Merge repeated rule paragraphs into [`MERGED_RULES_MARKER`].
///
/// The first of a run of consecutive rule paragraphs is kept and the rest
/// of the run becomes a single marker. A paragraph identical to an earlier
/// one is replaced the same way.
pub fn merge_rules(text: &str) -> String {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out: Vec<&str> = Vec::new();
    let mut prev_rule = false;
    for paragraph in text.split("\n\n") {
        let rule = is_rule(paragraph);
        let duplicate = !paragraph.trim().is_empty() && !seen.insert(paragraph);
        if duplicate || (rule && prev_rule) {
            if out.last() != Some(&MERGED_RULES_MARKER) {
                out.push(MERGED_RULES_MARKER);
            }
        } else {
            out.push(paragraph);
        }
        prev_rule = rule;
    }
    out.join("\n\n")
}

fn replace_fenced_blocks(text: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut fence: Option<Vec<&str>> = None;
    for line in text.split('\n') {
        let is_fence = line.trim_start().starts_with("```");
        match fence.as_mut() {
            Some(block) => {
                block.push(line);
                if is_fence {
                    out.push(EXAMPLE_MARKER);
                    fence = None;
                }
            }
            None if is_fence => fence = Some(vec![line]),
            None => out.push(line),
        }
    }
    // Unterminated fence: keep it verbatim.
    if let Some(block) = fence {
        out.extend(block);
    }
    out.join("\n")
}

fn first_line_content(paragraph: &str) -> &str {
    paragraph
        .trim_start_matches('\n')
        .lines()
        .next()
        .unwrap_or_default()
        .trim_start_matches(['#', '*', '-', '>', ' ', '\t'])
}

fn is_section_header(paragraph: &str) -> bool {
    paragraph.trim_start_matches('\n').starts_with("## ")
}

fn is_example(paragraph: &str) -> bool {
    if is_section_header(paragraph) {
        return false;
    }
    let first = first_line_content(paragraph);
    EXAMPLE_PREFIXES.iter().any(|p| first.starts_with(p))
}

fn is_rule(paragraph: &str) -> bool {
    if is_section_header(paragraph) {
        return false;
    }
    let first = first_line_content(paragraph)
        .trim_start_matches(|c: char| c.is_ascii_digit() || c == '.')
        .trim_start();
    RULE_PREFIXES.iter().any(|p| first.starts_with(p))
}

fn is_list_item(line: &str) -> bool {
    let item = line.trim_start();
    if item.starts_with("- ") || item.starts_with("* ") {
        return true;
    }
    let rest = item.trim_start_matches(|c: char| c.is_ascii_digit());
    rest.len() < item.len() && (rest.starts_with(". ") || rest.starts_with('、'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn example_paragraph_is_replaced() {
        let text = "## 查询\n- 先查汇总\n\n示例：\n用户：本月出勤率？\n助手：98%";
        assert_eq!(compress_examples(text), "## 查询\n- 先查汇总\n\n[示例已压缩]");
    }

    #[test]
    fn fenced_block_is_replaced() {
        let text = "## 格式\n输出如下：\n```json\n{\"a\": 1}\n```\n结束";
        assert_eq!(compress_examples(text), "## 格式\n输出如下：\n[示例已压缩]\n结束");
    }

    #[test]
    fn unterminated_fence_is_kept() {
        let text = "前言\n```\n未闭合";
        assert_eq!(compress_examples(text), text);
    }

    #[test]
    fn adjacent_examples_merge_into_one_marker() {
        let text = "## 示例集\n说明\n\n示例一：a\n\n例如：b\n\n结尾";
        assert_eq!(
            compress_examples(text),
            "## 示例集\n说明\n\n[示例已压缩]\n\n结尾"
        );
    }

    #[test]
    fn section_header_named_example_survives() {
        let text = "## 示例\n内容";
        assert_eq!(compress_examples(text), text);
    }

    #[test]
    fn long_description_is_truncated() {
        let tail = "字".repeat(80);
        let text = format!("## 工具\n描述：{tail}");
        let out = truncate_descriptions(&text);
        let expected = format!("## 工具\n描述：{}{DESCRIPTION_MARKER}", "字".repeat(50));
        assert_eq!(out, expected);
        assert!(out.chars().count() < text.chars().count());
    }

    #[test]
    fn short_description_is_kept() {
        let text = format!("描述：{}", "字".repeat(55));
        assert_eq!(truncate_descriptions(&text), text);
    }

    #[test]
    fn long_list_is_collapsed() {
        let items: Vec<String> = (1..=12).map(|i| format!("- 项目{i}")).collect();
        let text = format!("## 列表\n{}\n结尾", items.join("\n"));
        let out = collapse_lists(&text);
        assert!(out.contains("- 项目5\n[其余 7 项已压缩]\n结尾"));
        assert!(!out.contains("项目6"));
    }

    #[test]
    fn numbered_lists_count_as_lists() {
        let items: Vec<String> = (1..=11).map(|i| format!("{i}. 第{i}项")).collect();
        let out = collapse_lists(&items.join("\n"));
        assert!(out.ends_with("[其余 6 项已压缩]"));
    }

    #[test]
    fn short_list_is_kept() {
        let items: Vec<String> = (1..=10).map(|i| format!("- {i}")).collect();
        let text = items.join("\n");
        assert_eq!(collapse_lists(&text), text);
    }

    #[test]
    fn consecutive_rule_paragraphs_merge() {
        let text = "## 规范\n总则\n\n规则1：先确认\n\n注意：不要编造\n\n禁止：暴露参数\n\n结尾";
        assert_eq!(
            merge_rules(text),
            "## 规范\n总则\n\n规则1：先确认\n\n[重复规则已合并]\n\n结尾"
        );
    }

    #[test]
    fn duplicate_paragraphs_merge() {
        let text = "## 规范\n\n保持礼貌\n\n其他\n\n保持礼貌";
        assert_eq!(
            merge_rules(text),
            "## 规范\n\n保持礼貌\n\n其他\n\n[重复规则已合并]"
        );
    }

    #[test]
    fn single_rule_paragraph_is_kept() {
        let text = "## 规范\n\n必须使用中文";
        assert_eq!(merge_rules(text), text);
    }
}
