//! Discovery of local asset references inside note text.
//!
//! Two shapes are recognised: markdown images `![alt](url)` and raw
//! `<img ... src="url">` tags. Matching never edits the text; each hit carries
//! the byte span of its URL so callers can rewrite exactly what was matched.

use std::ops::Range;
use std::sync::LazyLock;

use regex_lite::Regex;

use crate::app::domain::AssetRef;
use crate::app::services::asset_store::{AssetStore, public_prefix_dir};

static MARKDOWN_IMAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\(([^)]+)\)").unwrap());
static IMG_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<img\s+(?:[^>]*?\s)?src\s*=\s*(?:"([^"]*)"|'([^']*)')[^>]*>"#).unwrap());

/// Characters stripped from both ends of a captured URL.
const URL_TRIM: &[char] = &[' ', '\t', '\n', '\r', '\0', '\x0B', '"', '\''];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    MarkdownImage,
    ImgTag,
}

/// A URL found in an image position, before any validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetCandidate {
    pub kind: CandidateKind,
    /// Span of the whole image token.
    pub span: Range<usize>,
    /// Span of the URL inside the text.
    pub url_span: Range<usize>,
}

impl AssetCandidate {
    pub fn url<'t>(&self, text: &'t str) -> &'t str {
        &text[self.url_span.clone()]
    }
}

/// Every image URL in `text`, ordered by position.
pub fn find_candidates(text: &str) -> Vec<AssetCandidate> {
    let mut found = Vec::new();

    for caps in MARKDOWN_IMAGE.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        // `(url "title")`: the URL is the first whitespace-free run
        if let Some(url_span) = trimmed_span(text, inner.range(), true) {
            found.push(AssetCandidate {
                kind: CandidateKind::MarkdownImage,
                span: whole.range(),
                url_span,
            });
        }
    }

    for caps in IMG_TAG.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let Some(inner) = caps.get(1).or_else(|| caps.get(2)) else {
            continue;
        };
        if let Some(url_span) = trimmed_span(text, inner.range(), false) {
            found.push(AssetCandidate {
                kind: CandidateKind::ImgTag,
                span: whole.range(),
                url_span,
            });
        }
    }

    found.sort_by_key(|c| c.url_span.start);
    found
}

fn trimmed_span(text: &str, range: Range<usize>, first_word: bool) -> Option<Range<usize>> {
    let raw = &text[range.clone()];
    let lead = raw.len() - raw.trim_start_matches(URL_TRIM).len();
    let mut body = raw.trim_matches(URL_TRIM);
    if first_word {
        if let Some(ws) = body.find(char::is_whitespace) {
            body = body[..ws].trim_end_matches(URL_TRIM);
        }
    }
    if body.is_empty() {
        return None;
    }
    let start = range.start + lead;
    Some(start..start + body.len())
}

/// Map a URL to a store id, or None for anything that is not a local asset URL.
///
/// The id is returned unvalidated; callers must still check it against the store.
pub fn local_id_from_url<'u>(url: &'u str, subfolder: &str, public_prefix: Option<&str>) -> Option<&'u str> {
    if let Some(prefix) = public_prefix.filter(|p| !p.is_empty()) {
        if let Some(rest) = url.strip_prefix(public_prefix_dir(prefix).as_str()) {
            return Some(rest);
        }
    }

    let rel = url.strip_prefix('/').unwrap_or(url);
    rel.strip_prefix(subfolder)?.strip_prefix('/')
}

/// Collect the distinct local assets referenced by `text`, in first-seen order.
///
/// References that are external, malformed, attempt to leave the store or name
/// a missing file are skipped without error.
pub fn resolve_assets(text: &str, store: &AssetStore, public_prefix: Option<&str>) -> Vec<AssetRef> {
    let mut refs: Vec<AssetRef> = Vec::new();

    for candidate in find_candidates(text) {
        let token = candidate.url(text);
        let Some(id) = local_id_from_url(token, store.subfolder(), public_prefix) else {
            continue;
        };
        if !store.contains(id) {
            log::debug!("Skipping asset reference {:?}: not a stored asset", token);
            continue;
        }

        match refs.iter_mut().find(|r| r.local_id == id) {
            Some(existing) => existing.add_alias(token),
            None => {
                // contains() already validated the id, so path_for cannot fail here
                let Ok(source) = store.path_for(id) else { continue };
                refs.push(AssetRef::new(id, token, source));
            }
        }
    }

    refs
}
