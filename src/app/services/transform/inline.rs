use super::{TransformResult, splice};
use crate::app::domain::Selection;

/// Text inserted at the caret, with the part to select afterwards.
#[derive(Debug, Clone, Copy)]
pub(super) struct Template {
    pub text: &'static str,
    pub select_start: usize,
    pub select_end: usize,
}

pub(super) const IMAGE_TEMPLATE: Template = Template {
    text: "![image description](https://example.com/image.png \"title\")",
    select_start: 2,
    select_end: 19,
};

pub(super) const TABLE_TEMPLATE: Template = Template {
    text: "| Column 1 | Column 2 |\n| --- | --- |\n| Cell 1 | Cell 2 |\n",
    select_start: 2,
    select_end: 10,
};

pub(super) const RULE_TEMPLATE: Template = Template {
    text: "\n\n---\n\n",
    select_start: 7,
    select_end: 7,
};

/// Surround the selection with `open` and `close`. An empty selection gets
/// `placeholder` in between. The new selection covers the inner text.
pub(super) fn wrap(text: &str, sel: Selection, open: &str, close: &str, placeholder: &str) -> TransformResult {
    let inner = if sel.is_empty() { placeholder } else { &text[sel.start..sel.end] };
    let insert = format!("{}{}{}", open, inner, close);
    splice(text, sel.start, sel.end, &insert, open.len(), open.len() + inner.len())
}

/// Replace the selection with `template`.
pub(super) fn insert_template(text: &str, sel: Selection, template: Template) -> TransformResult {
    splice(
        text,
        sel.start,
        sel.end,
        template.text,
        template.select_start,
        template.select_end,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selected(r: &TransformResult) -> &str {
        &r.text[r.selection.start..r.selection.end]
    }

    #[test]
    fn test_wrap_selection() {
        let r = wrap("say hello now", Selection::new(4, 9), "**", "**", "bold text");
        assert_eq!(r.text, "say **hello** now");
        assert_eq!(selected(&r), "hello");
    }

    #[test]
    fn test_wrap_placeholder() {
        let r = wrap("ab", Selection::caret(1), "<u>", "</u>", "underlined text");
        assert_eq!(r.text, "a<u>underlined text</u>b");
        assert_eq!(selected(&r), "underlined text");
    }

    #[test]
    fn test_wrap_nests_when_repeated() {
        let r = wrap("x", Selection::new(0, 1), "*", "*", "italic text");
        let r = wrap(&r.text, r.selection, "*", "*", "italic text");
        assert_eq!(r.text, "**x**");
    }

    #[test]
    fn test_wrap_multibyte() {
        let r = wrap("日本", Selection::new(3, 6), "`", "`", "code");
        assert_eq!(r.text, "日`本`");
        assert_eq!(selected(&r), "本");
    }

    #[test]
    fn test_templates_select_their_placeholder() {
        let r = insert_template("", Selection::caret(0), IMAGE_TEMPLATE);
        assert_eq!(selected(&r), "image description");

        let r = insert_template("", Selection::caret(0), TABLE_TEMPLATE);
        assert_eq!(selected(&r), "Column 1");

        let r = insert_template("a", Selection::caret(1), RULE_TEMPLATE);
        assert_eq!(r.text, "a\n\n---\n\n");
        assert_eq!(r.selection, Selection::caret(8));
    }

    #[test]
    fn test_template_replaces_selection() {
        let r = insert_template("abc", Selection::new(1, 2), RULE_TEMPLATE);
        assert_eq!(r.text, "a\n\n---\n\nc");
    }
}
