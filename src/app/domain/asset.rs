use std::path::PathBuf;

/// Folder name assets live under inside an export archive.
pub const ARCHIVE_IMAGE_DIR: &str = "images";

/// A reference from document text to a file in the asset store.
///
/// Built fresh for every export and never persisted. `local_id` always names
/// an existing file directly inside the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    /// Store filename, free of separators and `..`.
    pub local_id: String,
    /// URL text exactly as first seen in the document.
    pub original_token: String,
    /// Other spellings of the same asset seen later in the document
    /// (e.g. the absolute public URL next to `/uploads/...`).
    pub aliases: Vec<String>,
    /// `images/<local_id>`
    pub archive_path: String,
    /// Backing file inside the store.
    pub source_path: PathBuf,
}

impl AssetRef {
    pub fn new(local_id: impl Into<String>, original_token: impl Into<String>, source_path: PathBuf) -> Self {
        let local_id = local_id.into();
        let archive_path = format!("{}/{}", ARCHIVE_IMAGE_DIR, local_id);
        Self {
            local_id,
            original_token: original_token.into(),
            aliases: Vec::new(),
            archive_path,
            source_path,
        }
    }

    /// Every distinct token that must be rewritten to `archive_path`.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.original_token.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Record another spelling; duplicates of known tokens are ignored.
    pub fn add_alias(&mut self, token: &str) {
        if self.tokens().all(|t| t != token) {
            self.aliases.push(token.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_path() {
        let r = AssetRef::new("a.png", "/uploads/a.png", PathBuf::from("/store/a.png"));
        assert_eq!(r.archive_path, "images/a.png");
    }

    #[test]
    fn test_aliases_are_distinct() {
        let mut r = AssetRef::new("a.png", "/uploads/a.png", PathBuf::from("/store/a.png"));
        r.add_alias("/uploads/a.png");
        r.add_alias("uploads/a.png");
        r.add_alias("uploads/a.png");
        let tokens: Vec<&str> = r.tokens().collect();
        assert_eq!(tokens, vec!["/uploads/a.png", "uploads/a.png"]);
    }
}
