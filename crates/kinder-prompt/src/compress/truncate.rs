//! Length-bounded truncation that prefers whole sections.

use super::{Part, TRUNCATION_BUFFER, TRUNCATION_MARKER, join_parts, split_framed};
use crate::char_len;
use crate::prompt::SECTION_SEPARATOR;
use tracing::debug;

/// Cut `text` to fit within `max_length` characters.
///
/// Text that already fits is returned unchanged. Otherwise whole `## `
/// sections are kept in order while they fit in `max_length - 50`; if not
/// even the first section fits, whole paragraphs are kept instead, and as
/// a last resort the text is cut at a character boundary. The result ends
/// with [`TRUNCATION_MARKER`] and never exceeds `max_length`.
///
/// ```
/// use kinder_prompt::compress::{TRUNCATION_MARKER, intelligent_truncate};
///
/// let text = "a".repeat(20_000);
/// let out = intelligent_truncate(&text, 8000);
/// assert!(out.chars().count() <= 8000);
/// assert!(out.ends_with(TRUNCATION_MARKER));
/// ```
pub fn intelligent_truncate(text: &str, max_length: usize) -> String {
    if char_len(text) <= max_length {
        return text.to_string();
    }
    let parts: Vec<Part> = split_framed(text)
        .into_iter()
        .map(|(separator, s)| Part {
            separator,
            text: s.text.trim_matches('\n').to_string(),
        })
        .filter(|p| !p.text.is_empty())
        .collect();
    truncate_parts(&parts, max_length)
}

/// Truncate already-split sections. Callers guarantee the joined parts
/// exceed `max_length`.
pub(crate) fn truncate_parts(parts: &[Part], max_length: usize) -> String {
    let joined = join_parts(parts);
    let budget = max_length.saturating_sub(TRUNCATION_BUFFER);
    if budget == 0 {
        // No room for the marker.
        return hard_cut(&joined, max_length);
    }

    let sections = parts.iter().map(|p| (p.separator, p.text.as_str()));
    let mut kept = keep_whole(sections, budget);
    let mut unit = "section";
    if kept.is_empty() {
        let paragraphs = joined.split(SECTION_SEPARATOR).map(|p| (SECTION_SEPARATOR, p));
        kept = keep_whole(paragraphs, budget);
        unit = "paragraph";
    }
    if kept.is_empty() {
        kept = hard_cut(&joined, budget);
        unit = "char";
    }
    debug!(
        budget,
        kept = char_len(&kept),
        original = char_len(&joined),
        unit,
        "Prompt truncated"
    );
    format!("{kept}{SECTION_SEPARATOR}{TRUNCATION_MARKER}")
}

/// Join `(separator, piece)` pairs in order until the next one would
/// exceed `budget`. The first kept piece goes in without its separator.
fn keep_whole<'a>(pieces: impl Iterator<Item = (&'a str, &'a str)>, budget: usize) -> String {
    let mut out = String::new();
    let mut len = 0;
    for (separator, piece) in pieces {
        let piece = piece.trim_matches('\n');
        if piece.is_empty() {
            continue;
        }
        let separator = if out.is_empty() { "" } else { separator };
        let add = char_len(piece) + char_len(separator);
        if len + add > budget {
            break;
        }
        out.push_str(separator);
        out.push_str(piece);
        len += add;
    }
    out
}

fn hard_cut(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
