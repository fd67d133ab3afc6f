use thiserror::Error;

/// Why an uploaded asset was refused by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadRejection {
    Empty,
    TooLarge { size: u64, limit: u64 },
    BadType(String),
}

impl std::fmt::Display for UploadRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "no_file"),
            Self::TooLarge { size, limit } => write!(f, "too_large ({} > {} bytes)", size, limit),
            Self::BadType(mime) => write!(f, "bad_type_{}", mime),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Invalid document name: {0:?}")]
    InvalidDocumentName(String),

    #[error("Invalid asset name: {0:?}")]
    InvalidAssetName(String),

    #[error("Upload rejected: {0}")]
    Upload(UploadRejection),

    #[error("Unknown transform: {0}")]
    UnknownTransform(String),

    #[error("Nothing to convert: no markdown image or image container in range")]
    NothingToConvert,

    #[error("Settings error: {0}")]
    Settings(String),
}

/// Convenience type alias for Results with AppError
pub type Result<T> = std::result::Result<T, AppError>;
