//! Markdown editing transforms.
//!
//! Each transform takes the full text and a selection and returns the new
//! text with the selection to show afterwards. Transforms never keep state.
//! The ones that detect existing markup undo themselves when applied again:
//! - heading level cycles through 0..=6
//! - list, quote and comment markers toggle per line
//! - escaping, formula delimiters and image representation toggle on what
//!   is currently present
//!
//! Plain wraps (bold, italic, ...) do not look for existing markup and nest
//! when repeated.

mod blocks;
mod escape;
mod formula;
mod image;
mod inline;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::app::domain::Selection;
use crate::app::infrastructure::error::{AppError, Result};

pub use blocks::BlockMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformOp {
    Heading,
    Bold,
    Italic,
    Strikethrough,
    Underline,
    UnorderedList,
    OrderedList,
    Quote,
    Comment,
    Indent,
    CodeBlock,
    InlineCode,
    Link,
    Image,
    Table,
    Rule,
    Formula,
    FormulaWrap,
    Escape,
    ImageToggle,
}

impl TransformOp {
    /// Canonical name accepted by [`FromStr`]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Heading => "heading",
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Strikethrough => "strikethrough",
            Self::Underline => "underline",
            Self::UnorderedList => "unordered-list",
            Self::OrderedList => "ordered-list",
            Self::Quote => "quote",
            Self::Comment => "comment",
            Self::Indent => "indent",
            Self::CodeBlock => "code-block",
            Self::InlineCode => "inline-code",
            Self::Link => "link",
            Self::Image => "image",
            Self::Table => "table",
            Self::Rule => "rule",
            Self::Formula => "formula",
            Self::FormulaWrap => "formula-wrap",
            Self::Escape => "escape",
            Self::ImageToggle => "image-toggle",
        }
    }

    pub fn all() -> &'static [TransformOp] {
        &[
            Self::Heading,
            Self::Bold,
            Self::Italic,
            Self::Strikethrough,
            Self::Underline,
            Self::UnorderedList,
            Self::OrderedList,
            Self::Quote,
            Self::Comment,
            Self::Indent,
            Self::CodeBlock,
            Self::InlineCode,
            Self::Link,
            Self::Image,
            Self::Table,
            Self::Rule,
            Self::Formula,
            Self::FormulaWrap,
            Self::Escape,
            Self::ImageToggle,
        ]
    }
}

impl fmt::Display for TransformOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TransformOp {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        if let Some(op) = Self::all().iter().find(|op| op.name() == lower) {
            return Ok(*op);
        }
        let op = match lower.as_str() {
            "strike" => Self::Strikethrough,
            "ul" => Self::UnorderedList,
            "ol" => Self::OrderedList,
            "hr" => Self::Rule,
            "code" => Self::CodeBlock,
            "inlinecode" => Self::InlineCode,
            "mathwrap" => Self::FormulaWrap,
            "mathesc" => Self::Escape,
            "imgtoggle" => Self::ImageToggle,
            _ => return Err(AppError::UnknownTransform(s.to_string())),
        };
        Ok(op)
    }
}

/// New text and the selection to show after a transform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformResult {
    pub text: String,
    pub selection: Selection,
}

/// Replace `range` of `text` with `insert`; the new selection is
/// `sel_start..sel_end` measured from the start of `insert`.
pub(crate) fn splice(text: &str, start: usize, end: usize, insert: &str, sel_start: usize, sel_end: usize) -> TransformResult {
    let mut out = String::with_capacity(text.len() - (end - start) + insert.len());
    out.push_str(&text[..start]);
    out.push_str(insert);
    out.push_str(&text[end..]);
    TransformResult {
        text: out,
        selection: Selection::new(start + sel_start, start + sel_end),
    }
}

/// Apply `op` to `text` with the given selection.
///
/// Fails only with [`AppError::NothingToConvert`] when the image toggle
/// finds nothing in range.
pub fn apply_transform(text: &str, selection: Selection, op: TransformOp) -> Result<TransformResult> {
    let sel = selection.normalized(text);
    let result = match op {
        TransformOp::Heading => blocks::cycle_heading(text, sel),
        TransformOp::UnorderedList => blocks::toggle_lines(text, sel, BlockMarker::Bullet),
        TransformOp::OrderedList => blocks::toggle_lines(text, sel, BlockMarker::Numbered),
        TransformOp::Quote => blocks::toggle_lines(text, sel, BlockMarker::Quote),
        TransformOp::Comment => blocks::toggle_lines(text, sel, BlockMarker::Comment),
        TransformOp::Indent => blocks::indent(text, sel),
        TransformOp::Bold => inline::wrap(text, sel, "**", "**", "bold text"),
        TransformOp::Italic => inline::wrap(text, sel, "*", "*", "italic text"),
        TransformOp::Strikethrough => inline::wrap(text, sel, "~~", "~~", "strikethrough"),
        TransformOp::Underline => inline::wrap(text, sel, "<u>", "</u>", "underlined text"),
        TransformOp::InlineCode => inline::wrap(text, sel, "`", "`", "code"),
        TransformOp::CodeBlock => inline::wrap(text, sel, "```\n", "\n```\n", "code here"),
        TransformOp::Link => inline::wrap(text, sel, "[", "](https://example.com)", "link text"),
        TransformOp::Image => inline::insert_template(text, sel, inline::IMAGE_TEMPLATE),
        TransformOp::Table => inline::insert_template(text, sel, inline::TABLE_TEMPLATE),
        TransformOp::Rule => inline::insert_template(text, sel, inline::RULE_TEMPLATE),
        TransformOp::Formula => inline::insert_template(text, sel, formula::BLOCK_TEMPLATE),
        TransformOp::FormulaWrap => formula::toggle(text, sel),
        TransformOp::Escape => escape::toggle(text, sel),
        TransformOp::ImageToggle => return image::toggle(text, sel),
    };
    Ok(result)
}

/// String-keyed entry point: `(text, start, end, name) -> (text, start, end)`.
pub fn apply_named(text: &str, start: usize, end: usize, name: &str) -> Result<TransformResult> {
    let op: TransformOp = name.parse()?;
    apply_transform(text, Selection::new(start, end), op)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names_and_aliases() {
        for op in TransformOp::all() {
            assert_eq!(op.name().parse::<TransformOp>().unwrap(), *op);
        }
        assert_eq!("UL".parse::<TransformOp>().unwrap(), TransformOp::UnorderedList);
        assert_eq!("mathwrap".parse::<TransformOp>().unwrap(), TransformOp::FormulaWrap);
        assert_eq!("imgtoggle".parse::<TransformOp>().unwrap(), TransformOp::ImageToggle);
        assert!(matches!(
            "sparkle".parse::<TransformOp>(),
            Err(AppError::UnknownTransform(_))
        ));
    }

    #[test]
    fn test_apply_named() {
        let r = apply_named("hello", 0, 5, "bold").unwrap();
        assert_eq!(r.text, "**hello**");
        assert_eq!(r.selection, Selection::new(2, 7));
    }

    #[test]
    fn test_reversed_and_out_of_range_selection() {
        let r = apply_named("hello", 99, 0, "italic").unwrap();
        assert_eq!(r.text, "*hello*");
        assert_eq!(r.selection, Selection::new(1, 6));
    }

    #[test]
    fn test_every_op_handles_empty_document() {
        for op in TransformOp::all() {
            let result = apply_transform("", Selection::caret(0), *op);
            match op {
                TransformOp::ImageToggle => assert!(matches!(result, Err(AppError::NothingToConvert))),
                _ => {
                    let r = result.unwrap();
                    assert!(r.selection.start <= r.selection.end);
                    assert!(r.selection.end <= r.text.len());
                }
            }
        }
    }

    #[test]
    fn test_every_op_handles_caret_at_end() {
        let text = "line one\nline two";
        for op in TransformOp::all() {
            if let Ok(r) = apply_transform(text, Selection::caret(text.len()), *op) {
                assert!(r.selection.end <= r.text.len());
                assert!(r.text.is_char_boundary(r.selection.start));
                assert!(r.text.is_char_boundary(r.selection.end));
            }
        }
    }

    #[test]
    fn test_result_serializes() {
        let r = apply_named("x", 0, 1, "bold").unwrap();
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, r#"{"text":"**x**","selection":{"start":2,"end":3}}"#);
    }
}
