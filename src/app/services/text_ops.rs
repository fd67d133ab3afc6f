use std::sync::LazyLock;

use regex_lite::Regex;

use crate::app::domain::Selection;

static FENCED_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)```.*?```").unwrap());
static MARKDOWN_PUNCT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[#>*_`\-\[\]()!~]").unwrap());

/// Find next occurrence of search string in text
///
/// Returns the byte position of the match, or None if not found.
/// Searches from start_pos onwards; matching is exact and case sensitive.
pub fn find_in_text(text: &str, search: &str, start_pos: usize) -> Option<usize> {
    if search.is_empty() || start_pos >= text.len() || !text.is_char_boundary(start_pos) {
        return None;
    }
    text[start_pos..].find(search).map(|pos| start_pos + pos)
}

/// Replace all occurrences of search string with replacement
///
/// Returns (new_text, count_of_replacements)
pub fn replace_all_in_text(text: &str, search: &str, replace: &str) -> (String, usize) {
    if search.is_empty() {
        return (text.to_string(), 0);
    }

    let mut result = text.to_string();
    let mut count = 0;
    let mut pos = 0;

    while let Some(found_pos) = find_in_text(&result, search, pos) {
        result.replace_range(found_pos..found_pos + search.len(), replace);

        // Skip past the replacement so it is never matched again
        pos = found_pos + replace.len();
        count += 1;
    }

    (result, count)
}

/// Approximate character count of a note, ignoring code fences and markup
pub fn count_words(text: &str) -> usize {
    let plain = FENCED_CODE.replace_all(text, " ");
    let plain = MARKDOWN_PUNCT.replace_all(&plain, " ");
    plain.chars().filter(|c| !c.is_whitespace()).count()
}

/// Byte range of the line containing `pos`, excluding the trailing newline
pub fn line_bounds(text: &str, pos: usize) -> (usize, usize) {
    let pos = pos.min(text.len());
    let start = text[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let end = text[pos..].find('\n').map(|i| pos + i).unwrap_or(text.len());
    (start, end)
}

/// Expand a selection to whole lines.
///
/// A non-empty selection ending right after a newline does not pull in the
/// following line.
pub fn expand_to_lines(text: &str, sel: Selection) -> (usize, usize) {
    let (start, _) = line_bounds(text, sel.start);
    let last = if !sel.is_empty() && sel.end > 0 && text.as_bytes()[sel.end - 1] == b'\n' {
        sel.end - 1
    } else {
        sel.end
    };
    let (_, end) = line_bounds(text, last.max(sel.start));
    (start, end)
}

/// Select the next occurrence of the current selection, wrapping around.
///
/// An empty selection first grows to the whitespace-delimited word around
/// the caret. Returns None when there is nothing to select or no other
/// occurrence exists.
pub fn select_next_occurrence(text: &str, sel: Selection) -> Option<Selection> {
    let sel = sel.normalized(text);
    let (start, end) = if sel.is_empty() {
        let left = text[..sel.start]
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        let right = text[sel.end..]
            .char_indices()
            .find(|(_, c)| c.is_whitespace())
            .map(|(i, _)| sel.end + i)
            .unwrap_or(text.len());
        (left, right)
    } else {
        (sel.start, sel.end)
    };

    if start == end {
        return None;
    }
    let needle = &text[start..end];

    let next = find_in_text(text, needle, end).or_else(|| find_in_text(text, needle, 0))?;
    let next = if next == start {
        find_in_text(text, needle, start + needle.len())?
    } else {
        next
    };

    Some(Selection::new(next, next + needle.len()))
}
