use std::fmt;

use crate::app::infrastructure::error::{AppError, Result};

/// Extension every stored note carries.
pub const NOTE_EXTENSION: &str = ".md";

/// Validated note name, always ending in `.md`.
///
/// The name is used directly as a filename inside the notes directory, so
/// anything that could leave that directory is refused up front.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(String);

impl DocumentId {
    /// Normalise and validate a user supplied note name.
    ///
    /// Leading/trailing slashes are trimmed and a missing `.md` suffix is
    /// appended. Names containing `..`, `/` or `\` are rejected.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim_matches(|c| c == '/' || c == '\\');
        if trimmed.is_empty() {
            return Err(AppError::InvalidDocumentName(raw.to_string()));
        }

        let mut name = trimmed.to_string();
        if !name.to_lowercase().ends_with(NOTE_EXTENSION) {
            name.push_str(NOTE_EXTENSION);
        }

        if name.contains("..") || name.contains('/') || name.contains('\\') {
            return Err(AppError::InvalidDocumentName(raw.to_string()));
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name without the `.md` suffix, used for export filenames.
    pub fn base_name(&self) -> &str {
        let cut = self.0.len() - NOTE_EXTENSION.len();
        if self.0[cut..].eq_ignore_ascii_case(NOTE_EXTENSION) {
            &self.0[..cut]
        } else {
            &self.0
        }
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A note and its content as read from disk for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: DocumentId,
    pub content: String,
}

impl Document {
    pub fn new(id: DocumentId, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
        }
    }

    /// Starter content for a note that does not exist on disk yet.
    pub fn template(id: DocumentId) -> Self {
        let content = format!(
            "# New note: {}\n\nEdit Markdown on the left, then save.\n\n\
             Inline formula: $E = mc^2$\n\nBlock formula:\n\n$$\n\\int_0^1 x^2 \\, dx = \\frac{{1}}{{3}}\n$$",
            id
        );
        Self { id, content }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_appends_extension() {
        assert_eq!(DocumentId::parse("notes").unwrap().as_str(), "notes.md");
        assert_eq!(DocumentId::parse("notes.md").unwrap().as_str(), "notes.md");
        assert_eq!(DocumentId::parse("Notes.MD").unwrap().as_str(), "Notes.MD");
    }

    #[test]
    fn test_parse_trims_slashes() {
        assert_eq!(DocumentId::parse("/demo/").unwrap().as_str(), "demo.md");
        assert_eq!(DocumentId::parse("\\demo.md").unwrap().as_str(), "demo.md");
    }

    #[test]
    fn test_parse_rejects_traversal() {
        assert!(matches!(
            DocumentId::parse("../secret"),
            Err(AppError::InvalidDocumentName(_))
        ));
        assert!(DocumentId::parse("a/b.md").is_err());
        assert!(DocumentId::parse("a\\b.md").is_err());
        assert!(DocumentId::parse("..").is_err());
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(DocumentId::parse("").is_err());
        assert!(DocumentId::parse("//").is_err());
    }

    #[test]
    fn test_base_name() {
        assert_eq!(DocumentId::parse("note").unwrap().base_name(), "note");
        assert_eq!(DocumentId::parse("Report.MD").unwrap().base_name(), "Report");
        assert_eq!(DocumentId::parse("v1.2").unwrap().base_name(), "v1.2");
    }

    #[test]
    fn test_template_mentions_name() {
        let doc = Document::template(DocumentId::parse("ideas").unwrap());
        assert!(doc.content.starts_with("# New note: ideas.md"));
        assert!(doc.content.contains("$$\n\\int_0^1"));
    }
}
