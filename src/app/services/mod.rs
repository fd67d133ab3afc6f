//! Services layer - business operations and utilities.
//!
//! This module contains business logic and operations:
//! - Note storage and uploaded asset storage
//! - Asset discovery and export bundling
//! - Markdown rendering for previews and HTML export
//! - Editing transforms, text helpers and undo history

pub mod archive;
pub mod asset_resolver;
pub mod asset_store;
pub mod export;
pub mod history;
pub mod render;
pub mod storage;
pub mod text_ops;
pub mod transform;
