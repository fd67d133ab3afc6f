use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app::infrastructure::error::AppError;

/// Math typesetting library referenced by exported HTML pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MathRenderer {
    #[default]
    Katex,
    MathJax,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_notes_dir")]
    pub notes_dir: PathBuf,

    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: PathBuf,

    /// Conventional path segment under which assets are served, e.g. `/uploads/a.png`
    #[serde(default = "default_uploads_subfolder")]
    pub uploads_subfolder: String,

    /// Absolute URL prefix assets were handed out under, e.g. `https://host/uploads/`
    #[serde(default)]
    pub public_url_prefix: Option<String>,

    #[serde(default)]
    pub math_renderer: MathRenderer,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,

    /// Undo snapshots kept per editing session
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Where export staging directories are created (system temp dir when unset)
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
}

fn data_root() -> PathBuf {
    let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("mdpack");
    path
}

fn default_notes_dir() -> PathBuf {
    data_root().join("notes")
}

fn default_uploads_dir() -> PathBuf {
    data_root().join("uploads")
}

fn default_uploads_subfolder() -> String {
    "uploads".to_string()
}

fn default_max_upload_bytes() -> u64 {
    5 * 1024 * 1024
}

fn default_history_limit() -> usize {
    100
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            notes_dir: default_notes_dir(),
            uploads_dir: default_uploads_dir(),
            uploads_subfolder: default_uploads_subfolder(),
            public_url_prefix: None,
            math_renderer: MathRenderer::default(),
            max_upload_bytes: default_max_upload_bytes(),
            history_limit: default_history_limit(),
            temp_dir: None,
        }
    }
}

impl AppSettings {
    /// Load settings from the default config path, or defaults if missing
    pub fn load() -> Self {
        Self::load_from(&Self::get_config_path())
    }

    /// Load settings from `path`, falling back to defaults on a missing or corrupt file
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("Failed to parse settings {}: {}. Using defaults.", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Save settings to the default config path
    pub fn save(&self) -> Result<(), AppError> {
        self.save_to(&Self::get_config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), AppError> {
        self.validate()?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;

        Ok(())
    }

    /// Reject values the rest of the crate cannot work with
    pub fn validate(&self) -> Result<(), AppError> {
        let sub = self.uploads_subfolder.trim_matches('/');
        if sub.is_empty() || sub.contains("..") || sub.contains('\\') {
            return Err(AppError::Settings(format!(
                "invalid uploads subfolder {:?}",
                self.uploads_subfolder
            )));
        }
        if self.history_limit == 0 {
            return Err(AppError::Settings("history limit must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Staging area for exports
    pub fn temp_root(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Get config file path (cross-platform)
    pub fn get_config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("mdpack");
        path.push("settings.json");
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.uploads_subfolder, "uploads");
        assert_eq!(settings.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(settings.history_limit, 100);
        assert_eq!(settings.math_renderer, MathRenderer::Katex);
        assert!(settings.public_url_prefix.is_none());
        assert!(settings.temp_dir.is_none());
    }

    #[test]
    fn test_serialize_deserialize() {
        let settings = AppSettings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let loaded: AppSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(settings, loaded);
    }

    #[test]
    fn test_partial_config() {
        // Simulate old config missing new fields
        let json = r#"{"math_renderer": "MathJax", "public_url_prefix": "http://localhost/uploads/"}"#;
        let settings: AppSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.math_renderer, MathRenderer::MathJax);
        assert_eq!(settings.public_url_prefix.as_deref(), Some("http://localhost/uploads/"));
        assert_eq!(settings.history_limit, 100); // Should use default
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = AppSettings {
            history_limit: 7,
            temp_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(AppSettings::load_from(&path), settings);
    }

    #[test]
    fn test_corrupt_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(AppSettings::load_from(&path), AppSettings::default());
    }

    #[test]
    fn test_validate_rejects_bad_subfolder() {
        let settings = AppSettings {
            uploads_subfolder: "../up".to_string(),
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(AppError::Settings(_))));
    }

    #[test]
    fn test_temp_root_override() {
        let settings = AppSettings {
            temp_dir: Some(PathBuf::from("/var/tmp/mdpack")),
            ..Default::default()
        };
        assert_eq!(settings.temp_root(), PathBuf::from("/var/tmp/mdpack"));
    }
}
