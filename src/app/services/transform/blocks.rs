use std::sync::LazyLock;

use regex_lite::Regex;

use super::{TransformResult, splice};
use crate::app::domain::Selection;
use crate::app::services::text_ops::{expand_to_lines, line_bounds};

static HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([ \t]*)(#+)[ \t]+(.*)$").unwrap());
static BULLET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\s*)[-*+]\s+").unwrap());
static NUMBERED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\s*)\d+\.\s+").unwrap());
static QUOTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\s*)>\s?").unwrap());

const MAX_HEADING_LEVEL: usize = 6;
const HEADING_PLACEHOLDER: &str = "Heading";

/// Line prefix toggled by the block transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockMarker {
    /// `- item`
    Bullet,
    /// `1. item`, renumbered from 1 when added
    Numbered,
    /// `> text`
    Quote,
    /// `<!-- text -->`
    Comment,
}

impl BlockMarker {
    fn placeholder(&self) -> &'static str {
        match self {
            Self::Bullet | Self::Numbered => "list item",
            Self::Quote => "quote",
            Self::Comment => "comment",
        }
    }

    fn is_marked(&self, line: &str) -> bool {
        match self {
            Self::Bullet => BULLET.is_match(line),
            Self::Numbered => NUMBERED.is_match(line),
            Self::Quote => QUOTE.is_match(line),
            Self::Comment => comment_body(line.trim()).is_some(),
        }
    }

    fn strip(&self, line: &str) -> String {
        match self {
            Self::Bullet => BULLET.replace(line, "$1").into_owned(),
            Self::Numbered => NUMBERED.replace(line, "$1").into_owned(),
            Self::Quote => QUOTE.replace(line, "$1").into_owned(),
            Self::Comment => {
                let (indent, rest) = split_indent(line);
                match comment_body(rest.trim_end()) {
                    Some(body) => {
                        let body = body.strip_prefix(' ').unwrap_or(body);
                        let body = body.strip_suffix(' ').unwrap_or(body);
                        format!("{}{}", indent, body)
                    }
                    None => line.to_string(),
                }
            }
        }
    }

    fn add(&self, line: &str, number: usize) -> String {
        let (indent, rest) = split_indent(line);
        match self {
            Self::Bullet => format!("{}- {}", indent, rest),
            Self::Numbered => format!("{}{}. {}", indent, number, rest),
            Self::Quote => format!("{}> {}", indent, rest),
            Self::Comment => format!("{}<!-- {} -->", indent, rest),
        }
    }
}

fn split_indent(line: &str) -> (&str, &str) {
    let rest = line.trim_start();
    (&line[..line.len() - rest.len()], rest)
}

/// Inner text of `<!--...-->`, or None when `s` is not a complete comment.
fn comment_body(s: &str) -> Option<&str> {
    if s.len() < "<!---->".len() {
        return None;
    }
    s.strip_prefix("<!--")?.strip_suffix("-->")
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Add `marker` to every non-blank line in the selection, or strip it when all
/// of them already carry it.
pub(super) fn toggle_lines(text: &str, sel: Selection, marker: BlockMarker) -> TransformResult {
    let (start, end) = expand_to_lines(text, sel);
    let block = &text[start..end];
    let lines: Vec<&str> = block.split('\n').collect();

    if lines.iter().all(|l| is_blank(l)) {
        // Caret on a blank line starts a new item; selected blank lines stay as they are
        if sel.is_empty() {
            let insert = marker.add(marker.placeholder(), 1);
            return splice(text, start, end, &insert, 0, insert.len());
        }
        return splice(text, start, end, block, 0, block.len());
    }

    let all_marked = lines.iter().filter(|l| !is_blank(l)).all(|l| marker.is_marked(l));

    let mut number = 0;
    let new_lines: Vec<String> = lines
        .iter()
        .map(|l| {
            if is_blank(l) {
                l.to_string()
            } else if all_marked {
                marker.strip(l)
            } else {
                number += 1;
                marker.add(l, number)
            }
        })
        .collect();

    let replacement = new_lines.join("\n");
    splice(text, start, end, &replacement, 0, replacement.len())
}

/// Indent every non-blank line in the selection by two spaces.
pub(super) fn indent(text: &str, sel: Selection) -> TransformResult {
    let (start, end) = expand_to_lines(text, sel);
    let replacement = text[start..end]
        .split('\n')
        .map(|l| if is_blank(l) { l.to_string() } else { format!("  {}", l) })
        .collect::<Vec<_>>()
        .join("\n");
    splice(text, start, end, &replacement, 0, replacement.len())
}

/// Step the heading level of the caret's line: none, 1, 2, ... 6, none.
///
/// Indentation and a trailing `\r` survive every step, so seven steps give
/// back the original line.
pub(super) fn cycle_heading(text: &str, sel: Selection) -> TransformResult {
    let (line_start, line_end) = line_bounds(text, sel.start);
    let full = &text[line_start..line_end];
    let (line, cr) = match full.strip_suffix('\r') {
        Some(line) => (line, "\r"),
        None => (full, ""),
    };

    let (indent, level, body) = match HEADING.captures(line) {
        Some(caps) => (
            caps.get(1).map_or("", |m| m.as_str()),
            caps.get(2).map_or(0, |m| m.len()),
            caps.get(3).map_or("", |m| m.as_str()),
        ),
        None => {
            let (indent, rest) = split_indent(line);
            (indent, 0, rest)
        }
    };

    let next = if level >= MAX_HEADING_LEVEL { 0 } else { level + 1 };
    let body = if body.trim().is_empty() { HEADING_PLACEHOLDER } else { body };

    let prefix = if next == 0 {
        indent.to_string()
    } else {
        format!("{}{} ", indent, "#".repeat(next))
    };
    let new_line = format!("{}{}{}", prefix, body, cr);
    splice(
        text,
        line_start,
        line_end,
        &new_line,
        prefix.len(),
        prefix.len() + body.len(),
    )
}
