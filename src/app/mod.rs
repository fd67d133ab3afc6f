//! Application layer - organized by Clean Architecture principles.
//!
//! # Structure
//!
//! - `domain/` - Core data structures (Document, AssetRef, Selection, Settings)
//! - `services/` - Business operations (storage, resolver, archive, transforms)
//! - `infrastructure/` - Error types and logger setup

pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-exports for convenient external access
pub use domain::{AppSettings, AssetRef, Document, DocumentId, MathRenderer, Selection};
pub use infrastructure::error::{AppError, Result, UploadRejection};
pub use services::archive::{ArchiveBuilder, ExportFormat, ExportPayload, PayloadKind};
pub use services::asset_resolver::resolve_assets;
pub use services::asset_store::AssetStore;
pub use services::export::Exporter;
pub use services::history::EditHistory;
pub use services::storage::DocumentStore;
pub use services::transform::{TransformOp, TransformResult, apply_named, apply_transform};
