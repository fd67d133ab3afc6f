//! Domain layer - core data structures and types.
//!
//! This module contains the fundamental domain models:
//! - Document and DocumentId
//! - Asset references produced during export
//! - Selections passed to and returned from transforms
//! - Application settings

pub mod asset;
pub mod document;
pub mod selection;
pub mod settings;

pub use asset::{ARCHIVE_IMAGE_DIR, AssetRef};
pub use document::{Document, DocumentId, NOTE_EXTENSION};
pub use selection::Selection;
pub use settings::{AppSettings, MathRenderer};
