use std::sync::LazyLock;

use regex_lite::{Captures, Regex};

use super::{TransformResult, splice};
use crate::app::domain::Selection;
use crate::app::infrastructure::error::{AppError, Result};
use crate::app::services::render::{escape_html, unescape_html};

static MARKDOWN_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"!\[([^\]]*)\]\((\S+?)(?:\s+"([^"]*)")?\)"#).unwrap());
static CENTERED_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<div\s+style="text-align:\s*center;"\s*>\s*<img\s+([^>]*?)>\s*</div>"#).unwrap()
});
static SRC_ATTR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"(?i)(?:^|\s)src\s*=\s*"([^"]*)""#).unwrap());
static ALT_ATTR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"(?i)(?:^|\s)alt\s*=\s*"([^"]*)""#).unwrap());
static TITLE_ATTR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"(?i)(?:^|\s)title\s*=\s*"([^"]*)""#).unwrap());

fn group<'t>(caps: &Captures<'t>, i: usize) -> &'t str {
    caps.get(i).map_or("", |m| m.as_str())
}

fn attr<'t>(re: &Regex, attrs: &'t str) -> &'t str {
    re.captures(attrs)
        .and_then(|c| c.get(1))
        .map_or("", |m| m.as_str())
}

fn to_container(caps: &Captures) -> String {
    let alt = escape_html(group(caps, 1));
    let url = group(caps, 2);
    let title = escape_html(group(caps, 3));
    let title_attr = if title.is_empty() {
        String::new()
    } else {
        format!(" title=\"{}\"", title)
    };
    format!(
        "<div style=\"text-align: center;\">\n    <img src=\"{}\" alt=\"{}\"{} width=\"50%\">\n</div>",
        url, alt, title_attr
    )
}

/// Markdown for one centered container, or None when it has no `src`.
fn to_markdown(container: &str, attrs: &str) -> Option<String> {
    let src = attr(&SRC_ATTR, attrs);
    if src.is_empty() {
        log::debug!("Image container without src left as is: {}", container);
        return None;
    }
    let alt = unescape_html(attr(&ALT_ATTR, attrs)).replace(']', "\\]");
    let title = unescape_html(attr(&TITLE_ATTR, attrs)).replace('"', "\\\"");

    Some(if title.is_empty() {
        format!("![{}]({})", alt, src)
    } else {
        format!("![{}]({} \"{}\")", alt, src, title)
    })
}

/// Switch images between Markdown and a centered HTML container.
///
/// Works on the selection, or the whole document when nothing is selected.
/// Markdown images win: containers are only converted back when the range
/// holds no Markdown image.
pub(super) fn toggle(text: &str, sel: Selection) -> Result<TransformResult> {
    let (start, end) = if sel.is_empty() { (0, text.len()) } else { (sel.start, sel.end) };
    let segment = &text[start..end];

    if MARKDOWN_IMAGE.is_match(segment) {
        let converted = MARKDOWN_IMAGE.replace_all(segment, |caps: &Captures| to_container(caps));
        return Ok(splice(text, start, end, &converted, 0, converted.len()));
    }

    let mut converted = String::with_capacity(segment.len());
    let mut last = 0;
    let mut count = 0;
    for caps in CENTERED_IMAGE.captures_iter(segment) {
        let Some(whole) = caps.get(0) else { continue };
        converted.push_str(&segment[last..whole.start()]);
        match to_markdown(whole.as_str(), group(&caps, 1)) {
            Some(md) => {
                converted.push_str(&md);
                count += 1;
            }
            None => converted.push_str(whole.as_str()),
        }
        last = whole.end();
    }
    converted.push_str(&segment[last..]);

    if count == 0 {
        return Err(AppError::NothingToConvert);
    }
    Ok(splice(text, start, end, &converted, 0, converted.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn whole(text: &str) -> Result<TransformResult> {
        toggle(text, Selection::caret(0))
    }

    #[test]
    fn test_markdown_to_container() {
        let r = whole("![a & b](/uploads/x.png \"T\")").unwrap();
        assert_eq!(
            r.text,
            "<div style=\"text-align: center;\">\n    <img src=\"/uploads/x.png\" alt=\"a &amp; b\" title=\"T\" width=\"50%\">\n</div>"
        );
        assert_eq!(r.selection, Selection::new(0, r.text.len()));
    }

    #[test]
    fn test_toggle_twice_restores() {
        let text = "intro\n![cat](/uploads/cat.png)\nmiddle ![](/uploads/b.gif \"t\") end";
        let once = whole(text).unwrap();
        assert!(!once.text.contains("!["));
        let twice = whole(&once.text).unwrap();
        assert_eq!(twice.text, text);
    }

    #[test]
    fn test_escaped_attributes_round_trip() {
        let text = "![x < y](/u/a.png \"a & b\")";
        let once = whole(text).unwrap();
        assert!(once.text.contains("alt=\"x &lt; y\""));
        assert!(once.text.contains("title=\"a &amp; b\""));
        assert_eq!(whole(&once.text).unwrap().text, text);
    }

    #[test]
    fn test_container_title_quote_escaped() {
        let html = "<div style=\"text-align: center;\"><img src=\"/a.png\" alt=\"[x]\" title=\"&quot;q&quot;\"></div>";
        let r = whole(html).unwrap();
        assert_eq!(r.text, r#"![[x\]](/a.png "\"q\"")"#);
    }

    #[test]
    fn test_container_without_src_untouched() {
        let html = "<div style=\"text-align: center;\"><img alt=\"x\"></div>";
        assert!(matches!(whole(html), Err(AppError::NothingToConvert)));

        let mixed = format!("{}\n<div style=\"text-align: center;\"><img src=\"/b.png\"></div>", html);
        let r = whole(&mixed).unwrap();
        assert_eq!(r.text, format!("{}\n![](/b.png)", html));
    }

    #[test]
    fn test_container_ignores_prefixed_attributes() {
        let html = "<div style=\"text-align: center;\"><img data-src=\"/lazy.png\" src=\"/a.png\" data-alt=\"no\" alt=\"yes\"></div>";
        let r = whole(html).unwrap();
        assert_eq!(r.text, "![yes](/a.png)");
    }

    #[test]
    fn test_nothing_to_convert() {
        assert!(matches!(whole("plain text"), Err(AppError::NothingToConvert)));
        assert!(matches!(whole(""), Err(AppError::NothingToConvert)));
    }

    #[test]
    fn test_selection_limits_range() {
        let text = "![a](/a.png) ![b](/b.png)";
        let r = toggle(text, Selection::new(13, text.len())).unwrap();
        assert!(r.text.starts_with("![a](/a.png) <div"));
        assert_eq!(r.selection.start, 13);
        assert_eq!(r.selection.end, r.text.len());
    }
}
