use super::{TransformResult, splice};
use crate::app::domain::Selection;

/// Characters Markdown would otherwise read as emphasis or list markup inside formulas.
const ESCAPABLE: [char; 3] = ['_', '*', '-'];

fn has_unescaped(segment: &str) -> bool {
    let mut prev = None;
    for c in segment.chars() {
        if ESCAPABLE.contains(&c) && prev != Some('\\') {
            return true;
        }
        prev = Some(c);
    }
    false
}

fn escape_all(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len() + 8);
    let mut prev = None;
    for c in segment.chars() {
        if ESCAPABLE.contains(&c) && prev != Some('\\') {
            out.push('\\');
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

fn unescape_all(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut chars = segment.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek().is_some_and(|next| ESCAPABLE.contains(next)) {
            continue;
        }
        out.push(c);
    }
    out
}

/// Escape every unescaped `_`, `*` and `-` in the selection, or in the whole
/// document when nothing is selected. When all of them are already escaped,
/// remove the backslashes instead.
pub(super) fn toggle(text: &str, sel: Selection) -> TransformResult {
    let (start, end) = if sel.is_empty() { (0, text.len()) } else { (sel.start, sel.end) };
    let segment = &text[start..end];

    let replaced = if has_unescaped(segment) {
        escape_all(segment)
    } else {
        unescape_all(segment)
    };
    splice(text, start, end, &replaced, 0, replaced.len())
}
