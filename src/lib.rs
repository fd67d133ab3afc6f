//! Markdown notes with local images, exported as self-contained bundles.

pub mod app;
