//! Export bundles: a rewritten note plus its images, packed into one archive.
//!
//! Every export stages files in its own temporary directory. The directory and
//! the intermediate archive file are owned by RAII guards, so they are removed
//! on every return path, including early `?` returns and panics.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;

use crate::app::domain::{ARCHIVE_IMAGE_DIR, AssetRef};
use crate::app::infrastructure::error::Result;
use crate::app::services::text_ops::replace_all_in_text;

/// Document flavour written into an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Markdown,
    Html,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Html => "html",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Markdown => "text/markdown; charset=utf-8",
            Self::Html => "text/html; charset=utf-8",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "md" | "markdown" => Some(Self::Markdown),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// Archive with the document and its images.
    Archive,
    /// The document alone, unrewritten.
    Raw,
}

/// Bytes handed back to the caller together with download metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    pub kind: PayloadKind,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ExportPayload {
    pub fn raw(text: &str, base_name: &str, format: ExportFormat) -> Self {
        Self {
            kind: PayloadKind::Raw,
            file_name: format!("{}.{}", base_name, format.extension()),
            content_type: format.content_type().to_string(),
            bytes: text.as_bytes().to_vec(),
        }
    }
}

/// Serialises a staged directory into a single archive file.
pub trait Packager {
    /// Extension of produced archives, without the dot.
    fn extension(&self) -> &'static str;

    fn content_type(&self) -> &'static str;

    /// Pack the contents of `source_dir` (not the directory itself) into `destination`.
    fn package(&self, source_dir: &Path, destination: &Path) -> Result<()>;
}

/// Deflate-compressed ZIP with fixed timestamps, so equal inputs give equal bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipPackager;

impl Packager for ZipPackager {
    fn extension(&self) -> &'static str {
        "zip"
    }

    fn content_type(&self) -> &'static str {
        "application/zip"
    }

    fn package(&self, source_dir: &Path, destination: &Path) -> Result<()> {
        let file = fs::File::create(destination)?;
        let mut zip = zip::ZipWriter::new(file);
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .compression_level(Some(9))
            .last_modified_time(zip::DateTime::default());

        for entry in WalkDir::new(source_dir).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(io::Error::from)?;
            let relative = archive_name(source_dir, entry.path())?;

            if entry.file_type().is_dir() {
                zip.add_directory(relative, options)?;
            } else if entry.file_type().is_file() {
                zip.start_file(relative, options)?;
                let mut f = fs::File::open(entry.path())?;
                io::copy(&mut f, &mut zip)?;
            }
        }

        zip.finish()?;
        Ok(())
    }
}

/// `/`-separated path of `path` relative to `root`.
fn archive_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(root)
        .map_err(|e| io::Error::other(format!("{} outside staging root: {}", path.display(), e)))?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

/// Short-lived staging tree for one export.
///
/// Dropping the job deletes the tree.
pub struct ArchiveJob {
    staging: TempDir,
    entries: Vec<(String, PathBuf)>,
}

impl ArchiveJob {
    /// Create a uniquely named staging directory with an `images/` folder under `temp_root`.
    pub fn create(temp_root: &Path) -> Result<Self> {
        fs::create_dir_all(temp_root)?;
        let staging = tempfile::Builder::new().prefix("mdpack_dir_").tempdir_in(temp_root)?;
        fs::create_dir(staging.path().join(ARCHIVE_IMAGE_DIR))?;
        log::debug!("Staging export in {}", staging.path().display());
        Ok(Self {
            staging,
            entries: Vec::new(),
        })
    }

    pub fn staging_root(&self) -> &Path {
        self.staging.path()
    }

    /// Staged files as (archive path, source file) in the order they were added.
    pub fn entries(&self) -> &[(String, PathBuf)] {
        &self.entries
    }

    pub fn write_document(&mut self, file_name: &str, text: &str) -> Result<()> {
        let dest = self.staging.path().join(file_name);
        fs::write(&dest, text)?;
        self.entries.push((file_name.to_string(), dest));
        Ok(())
    }

    pub fn add_asset(&mut self, asset: &AssetRef) -> Result<()> {
        let dest = self.staging.path().join(ARCHIVE_IMAGE_DIR).join(&asset.local_id);
        fs::copy(&asset.source_path, dest)?;
        self.entries.push((asset.archive_path.clone(), asset.source_path.clone()));
        Ok(())
    }

    /// Remove the staging tree now, reporting failures instead of swallowing them on drop.
    pub fn close(self) -> Result<()> {
        self.staging.close()?;
        Ok(())
    }
}

/// Replace every token of every asset with its archive path.
///
/// Plain substring replacement: identical text outside an image position is
/// rewritten too. Longer tokens go first so a short spelling never clobbers
/// part of a longer one.
pub fn rewrite_document(text: &str, refs: &[AssetRef]) -> String {
    let mut pairs: Vec<(&str, &str)> = refs
        .iter()
        .flat_map(|r| r.tokens().map(move |t| (t, r.archive_path.as_str())))
        .collect();
    pairs.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut out = text.to_string();
    for (token, path) in pairs {
        out = replace_all_in_text(&out, token, path).0;
    }
    out
}

pub struct ArchiveBuilder {
    temp_root: PathBuf,
    packager: Box<dyn Packager>,
}

impl ArchiveBuilder {
    pub fn new(temp_root: impl Into<PathBuf>) -> Self {
        Self::with_packager(temp_root, Box::new(ZipPackager))
    }

    pub fn with_packager(temp_root: impl Into<PathBuf>, packager: Box<dyn Packager>) -> Self {
        Self {
            temp_root: temp_root.into(),
            packager,
        }
    }

    pub fn temp_root(&self) -> &Path {
        &self.temp_root
    }

    /// Bundle `text` and its assets.
    ///
    /// Never fails: without assets, or when staging/packing goes wrong, the
    /// unrewritten document is returned as a raw payload.
    pub fn build(&self, text: &str, base_name: &str, format: ExportFormat, refs: &[AssetRef]) -> ExportPayload {
        let base_name = if base_name.is_empty() || base_name.contains(['/', '\\']) || base_name.contains("..") {
            "document"
        } else {
            base_name
        };

        if refs.is_empty() {
            return ExportPayload::raw(text, base_name, format);
        }

        match self.try_build(text, base_name, format, refs) {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("Archive export of {} failed, sending plain document: {}", base_name, e);
                ExportPayload::raw(text, base_name, format)
            }
        }
    }

    fn try_build(&self, text: &str, base_name: &str, format: ExportFormat, refs: &[AssetRef]) -> Result<ExportPayload> {
        let mut job = ArchiveJob::create(&self.temp_root)?;

        let rewritten = rewrite_document(text, refs);
        job.write_document(&format!("{}.{}", base_name, format.extension()), &rewritten)?;

        for asset in refs {
            if let Err(e) = job.add_asset(asset) {
                log::warn!("Skipping asset {} in export: {}", asset.local_id, e);
            }
        }

        let archive_file = tempfile::Builder::new()
            .prefix("mdpack_")
            .suffix(&format!(".{}", self.packager.extension()))
            .tempfile_in(&self.temp_root)?;
        self.packager.package(job.staging_root(), archive_file.path())?;

        let bytes = fs::read(archive_file.path())?;
        if bytes.is_empty() {
            return Err(io::Error::other("packager produced an empty archive").into());
        }

        if let Err(e) = job.close() {
            log::warn!("Failed to remove export staging directory: {}", e);
        }

        Ok(ExportPayload {
            kind: PayloadKind::Archive,
            file_name: format!("{}.{}", base_name, self.packager.extension()),
            content_type: self.packager.content_type().to_string(),
            bytes,
        })
    }
}
