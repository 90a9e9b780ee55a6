//! Whitespace cleanup and decorative-emoji stripping.
//!
//! Cleanup runs on every section at every level and is idempotent:
//! `clean(&clean(x)) == clean(x)`.

/// Emoji used as decoration in section headers and bullet lines.
pub const DECORATIVE_EMOJI: &[char] = &[
    '🎯', '⚠', '🔧', '📊', '🎨', '🧭', '🔄', '📝', '🧠', '✅', '❌', '🔗', '⚡', '📄', '📽',
    '📑', '📋', '📍', '🚀', '💡', '🔍', '⭐', '🏢', '📈', '✨', '👉', '❗', '🔥',
];

/// Variation selector that follows some emoji (`⚠️`).
const VARIATION_SELECTOR: char = '\u{FE0F}';

/// Collapse whitespace without touching content.
///
/// Strips trailing whitespace from every line, collapses runs of spaces
/// after the line's indentation to one space, and collapses three or more
/// consecutive newlines to two.
pub fn clean(text: &str) -> String {
    let lines: Vec<String> = text
        .split('\n')
        .map(|line| collapse_spaces(line.trim_end()))
        .collect();
    collapse_newlines(&lines.join("\n"))
}

/// Remove decorative emoji, together with the space that separated them
/// from the following text.
pub fn strip_emoji(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut skip_space = false;
    for c in text.chars() {
        if c == VARIATION_SELECTOR || DECORATIVE_EMOJI.contains(&c) {
            skip_space = out.is_empty() || out.ends_with(' ') || out.ends_with('\n');
            continue;
        }
        if skip_space && c == ' ' {
            skip_space = false;
            continue;
        }
        skip_space = false;
        out.push(c);
    }
    out
}

fn collapse_spaces(line: &str) -> String {
    let body = line.trim_start_matches([' ', '\t']);
    let indent_len = line.len() - body.len();
    let mut out = String::with_capacity(line.len());
    out.push_str(line.get(..indent_len).unwrap_or_default());
    let mut prev_space = false;
    for c in body.chars() {
        if c == ' ' {
            if prev_space {
                continue;
            }
            prev_space = true;
        } else {
            prev_space = false;
        }
        out.push(c);
    }
    out
}

fn collapse_newlines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run = 0;
    for c in text.chars() {
        if c == '\n' {
            run += 1;
            if run > 2 {
                continue;
            }
        } else {
            run = 0;
        }
        out.push(c);
    }
    out
}
