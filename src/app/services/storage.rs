use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::app::domain::{Document, DocumentId, NOTE_EXTENSION};
use crate::app::infrastructure::error::Result;

/// Notes kept as individual `.md` files in one directory.
///
/// Nothing is cached: every load reads the file again.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, id: &DocumentId) -> PathBuf {
        self.root.join(id.as_str())
    }

    pub fn exists(&self, id: &DocumentId) -> bool {
        self.path_of(id).is_file()
    }

    /// Read a note, or its starter template when it has never been saved.
    pub fn load(&self, id: &DocumentId) -> Result<Document> {
        let path = self.path_of(id);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Document::new(id.clone(), content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Document::template(id.clone())),
            Err(e) => Err(e.into()),
        }
    }

    /// Write `content` while holding an exclusive lock on the file.
    pub fn save(&self, id: &DocumentId, content: &str) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        let path = self.path_of(id);

        // No truncate on open: the length is reset only once the lock is held
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        FileExt::lock_exclusive(&file)?;

        let written = file
            .set_len(0)
            .and_then(|_| file.write_all(content.as_bytes()))
            .and_then(|_| file.sync_data());
        let unlocked = FileExt::unlock(&file);

        written?;
        unlocked?;
        log::debug!("Saved {} ({} bytes)", path.display(), content.len());
        Ok(())
    }

    /// Save under the old name, then move the file to the new name.
    ///
    /// A failed save leaves both names untouched. The two steps are not atomic
    /// together: a crash between them leaves the saved file under the old name.
    pub fn rename(&self, from: &DocumentId, to: &DocumentId, content: &str) -> Result<()> {
        self.save(from, content)?;
        if from != to {
            fs::rename(self.path_of(from), self.path_of(to))?;
        }
        Ok(())
    }

    /// Names of all stored notes, sorted.
    pub fn list(&self) -> Result<Vec<DocumentId>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !name.to_lowercase().ends_with(NOTE_EXTENSION) {
                continue;
            }
            if let Ok(id) = DocumentId::parse(name) {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }
}
