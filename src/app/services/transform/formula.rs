use super::inline::Template;
use super::{TransformResult, splice};
use crate::app::domain::Selection;

pub(super) const BLOCK_TEMPLATE: Template = Template {
    text: "$$\nE = mc^2\n$$\n",
    select_start: 3,
    select_end: 11,
};

/// Cycle the math delimiters around the selection: plain, `$x$`, `$$x$$`, plain.
///
/// Only the characters directly outside the selection are inspected. An empty
/// selection inserts [`BLOCK_TEMPLATE`].
pub(super) fn toggle(text: &str, sel: Selection) -> TransformResult {
    if sel.is_empty() {
        return super::inline::insert_template(text, sel, BLOCK_TEMPLATE);
    }

    let bytes = text.as_bytes();
    let before = |n: usize| sel.start >= n && bytes[sel.start - n..sel.start].iter().all(|&b| b == b'$');
    let after = |n: usize| sel.end + n <= bytes.len() && bytes[sel.end..sel.end + n].iter().all(|&b| b == b'$');
    let inner = &text[sel.start..sel.end];

    if before(2) && after(2) {
        splice(text, sel.start - 2, sel.end + 2, inner, 0, inner.len())
    } else if before(1) && after(1) {
        let insert = format!("$${}$$", inner);
        splice(text, sel.start - 1, sel.end + 1, &insert, 2, 2 + inner.len())
    } else {
        let insert = format!("${}$", inner);
        splice(text, sel.start, sel.end, &insert, 1, 1 + inner.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selected(r: &TransformResult) -> &str {
        &r.text[r.selection.start..r.selection.end]
    }

    #[test]
    fn test_three_state_cycle() {
        let r = toggle("see x here", Selection::new(4, 5));
        assert_eq!(r.text, "see $x$ here");
        assert_eq!(selected(&r), "x");

        let r = toggle(&r.text, r.selection);
        assert_eq!(r.text, "see $$x$$ here");
        assert_eq!(selected(&r), "x");

        let r = toggle(&r.text, r.selection);
        assert_eq!(r.text, "see x here");
        assert_eq!(r.selection, Selection::new(4, 5));
    }

    #[test]
    fn test_empty_selection_inserts_block() {
        let r = toggle("ab", Selection::caret(1));
        assert_eq!(r.text, "a$$\nE = mc^2\n$$\nb");
        assert_eq!(selected(&r), "E = mc^2");
    }

    #[test]
    fn test_selection_at_document_edges() {
        let r = toggle("x", Selection::new(0, 1));
        assert_eq!(r.text, "$x$");
        let r = toggle("$x", Selection::new(1, 2));
        assert_eq!(r.text, "$$x$");
    }

    #[test]
    fn test_multibyte_neighbours() {
        let r = toggle("é$x$é", Selection::new(3, 4));
        assert_eq!(r.text, "é$$x$$é");
        assert_eq!(selected(&r), "x");
    }
}
