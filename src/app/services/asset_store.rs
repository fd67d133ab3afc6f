use std::fs;
use std::path::{Path, PathBuf};

use rand::Rng;

use crate::app::domain::AppSettings;
use crate::app::infrastructure::error::{AppError, Result, UploadRejection};

/// Image MIME types accepted for upload and the extension they are stored with.
const ALLOWED_TYPES: &[(&str, &str)] = &[
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
    ("image/avif", "avif"),
    ("image/bmp", "bmp"),
    ("image/x-ms-bmp", "bmp"),
    ("image/svg+xml", "svg"),
    ("image/x-icon", "ico"),
    ("image/vnd.microsoft.icon", "ico"),
    ("image/heif", "heif"),
    ("image/heic", "heic"),
];

/// Extension for an accepted image MIME type.
pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
    let mime = mime.trim().to_ascii_lowercase();
    ALLOWED_TYPES.iter().find(|(m, _)| *m == mime).map(|(_, ext)| *ext)
}

/// MIME type for a file extension, for callers that only have a filename.
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    let ext = ext.trim_start_matches('.').to_ascii_lowercase();
    let ext = if ext == "jpeg" { "jpg".to_string() } else { ext };
    ALLOWED_TYPES.iter().find(|(_, e)| *e == ext).map(|(m, _)| *m)
}

/// Public URL prefix with exactly one trailing `/`, so `prefix + name` is the asset URL.
pub fn public_prefix_dir(prefix: &str) -> String {
    format!("{}/", prefix.trim_end_matches('/'))
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    pub name: String,
    pub url: String,
}

/// Flat directory of uploaded assets.
///
/// Ids are bare filenames; nothing here ever looks below the top level.
#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
    subfolder: String,
}

impl AssetStore {
    pub fn new(root: impl Into<PathBuf>, subfolder: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            subfolder: subfolder.into().trim_matches('/').to_string(),
        }
    }

    pub fn from_settings(settings: &AppSettings) -> Self {
        Self::new(settings.uploads_dir.clone(), settings.uploads_subfolder.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path segment assets are served under, without slashes (`uploads`).
    pub fn subfolder(&self) -> &str {
        &self.subfolder
    }

    /// An id is usable when it is non-empty and cannot name anything outside the store.
    pub fn is_valid_id(id: &str) -> bool {
        !id.is_empty() && !id.contains("..") && !id.contains('/') && !id.contains('\\')
    }

    pub fn path_for(&self, id: &str) -> Result<PathBuf> {
        if !Self::is_valid_id(id) {
            return Err(AppError::InvalidAssetName(id.to_string()));
        }
        Ok(self.root.join(id))
    }

    /// True when `id` is valid and names an existing regular file.
    pub fn contains(&self, id: &str) -> bool {
        self.path_for(id).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Copy the asset's bytes to `dest`, returning the number of bytes copied.
    pub fn copy_to(&self, id: &str, dest: &Path) -> Result<u64> {
        let src = self.path_for(id)?;
        Ok(fs::copy(src, dest)?)
    }

    /// Save uploaded bytes under a freshly generated name.
    ///
    /// Name format is `<YYYYmmdd_HHMMSS>_<8 hex>.<ext>`.
    pub fn store_upload(&self, bytes: &[u8], mime: &str, max_bytes: u64, public_prefix: Option<&str>) -> Result<StoredAsset> {
        if bytes.is_empty() {
            return Err(AppError::Upload(UploadRejection::Empty));
        }
        let size = bytes.len() as u64;
        if size > max_bytes {
            return Err(AppError::Upload(UploadRejection::TooLarge { size, limit: max_bytes }));
        }
        let ext = extension_for_mime(mime).ok_or_else(|| AppError::Upload(UploadRejection::BadType(mime.to_string())))?;

        fs::create_dir_all(&self.root)?;

        let name = generate_name(ext);
        let path = self.root.join(&name);
        fs::write(&path, bytes)?;
        log::debug!("Stored upload {} ({} bytes)", path.display(), size);

        let url = self.public_url(&name, public_prefix);
        Ok(StoredAsset { name, url })
    }

    /// URL under which the editor embeds the asset.
    pub fn public_url(&self, name: &str, public_prefix: Option<&str>) -> String {
        match public_prefix.filter(|p| !p.is_empty()) {
            Some(prefix) => format!("{}{}", public_prefix_dir(prefix), name),
            None => format!("/{}/{}", self.subfolder, name),
        }
    }
}

fn generate_name(ext: &str) -> String {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let suffix: u32 = rand::rng().random();
    format!("{}_{:08x}.{}", stamp, suffix, ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_ids() {
        assert!(AssetStore::is_valid_id("a.png"));
        assert!(AssetStore::is_valid_id("20250101_120000_deadbeef.jpg"));
        assert!(!AssetStore::is_valid_id(""));
        assert!(!AssetStore::is_valid_id("../a.png"));
        assert!(!AssetStore::is_valid_id("a..png"));
        assert!(!AssetStore::is_valid_id("sub/a.png"));
        assert!(!AssetStore::is_valid_id("sub\\a.png"));
    }

    #[test]
    fn test_contains_requires_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.png"), b"png").unwrap();
        fs::create_dir(dir.path().join("folder")).unwrap();
        let store = AssetStore::new(dir.path(), "uploads");

        assert!(store.contains("a.png"));
        assert!(!store.contains("b.png"));
        assert!(!store.contains("folder"));
        assert!(!store.contains("../a.png"));
    }

    #[test]
    fn test_path_for_rejects_traversal() {
        let store = AssetStore::new("/srv/uploads", "uploads");
        assert!(matches!(store.path_for("../etc/passwd"), Err(AppError::InvalidAssetName(_))));
        assert_eq!(store.path_for("a.png").unwrap(), PathBuf::from("/srv/uploads/a.png"));
    }

    #[test]
    fn test_copy_to() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.png"), b"\x89PNG").unwrap();
        let store = AssetStore::new(dir.path(), "uploads");
        let dest = dir.path().join("copy.png");
        assert_eq!(store.copy_to("a.png", &dest).unwrap(), 4);
        assert_eq!(fs::read(dest).unwrap(), b"\x89PNG");
        assert!(store.copy_to("missing.png", &dir.path().join("x")).is_err());
    }

    #[test]
    fn test_store_upload_generates_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = AssetStore::new(dir.path().join("uploads"), "uploads");
        let stored = store.store_upload(b"GIF89a", "image/gif", 1024, None).unwrap();

        assert!(stored.name.ends_with(".gif"));
        // YYYYmmdd_HHMMSS_xxxxxxxx.gif
        assert_eq!(stored.name.len(), 8 + 1 + 6 + 1 + 8 + 4);
        assert_eq!(stored.url, format!("/uploads/{}", stored.name));
        assert!(store.contains(&stored.name));
    }

    #[test]
    fn test_store_upload_public_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let store = AssetStore::new(dir.path(), "uploads");
        let stored = store
            .store_upload(b"png", "image/png", 1024, Some("https://notes.example/uploads/"))
            .unwrap();
        assert_eq!(stored.url, format!("https://notes.example/uploads/{}", stored.name));
    }

    #[test]
    fn test_public_url_prefix_without_slash() {
        let store = AssetStore::new("/srv/uploads", "uploads");
        assert_eq!(
            store.public_url("a.png", Some("https://notes.example/uploads")),
            "https://notes.example/uploads/a.png"
        );
        assert_eq!(
            store.public_url("a.png", Some("https://notes.example/uploads//")),
            "https://notes.example/uploads/a.png"
        );
        assert_eq!(store.public_url("a.png", Some("")), "/uploads/a.png");
    }

    #[test]
    fn test_store_upload_rejections() {
        let dir = tempfile::tempdir().unwrap();
        let store = AssetStore::new(dir.path(), "uploads");

        assert!(matches!(
            store.store_upload(b"", "image/png", 10, None),
            Err(AppError::Upload(UploadRejection::Empty))
        ));
        assert!(matches!(
            store.store_upload(&[0u8; 11], "image/png", 10, None),
            Err(AppError::Upload(UploadRejection::TooLarge { size: 11, limit: 10 }))
        ));
        assert!(matches!(
            store.store_upload(b"hi", "text/plain", 10, None),
            Err(AppError::Upload(UploadRejection::BadType(_)))
        ));
    }

    #[test]
    fn test_extension_for_mime() {
        assert_eq!(extension_for_mime("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for_mime("IMAGE/PNG"), Some("png"));
        assert_eq!(extension_for_mime("image/vnd.microsoft.icon"), Some("ico"));
        assert_eq!(extension_for_mime("application/pdf"), None);
    }

    #[test]
    fn test_mime_for_extension() {
        assert_eq!(mime_for_extension("JPEG"), Some("image/jpeg"));
        assert_eq!(mime_for_extension(".png"), Some("image/png"));
        assert_eq!(mime_for_extension("bmp"), Some("image/bmp"));
        assert_eq!(mime_for_extension("txt"), None);
    }
}
