use crate::app::domain::{AppSettings, Document, MathRenderer};
use crate::app::services::archive::{ArchiveBuilder, ExportFormat, ExportPayload};
use crate::app::services::asset_resolver::resolve_assets;
use crate::app::services::asset_store::AssetStore;
use crate::app::services::render::render_page;

/// Turns a note into a downloadable payload: a bundle when it references
/// local images, the plain document otherwise.
pub struct Exporter {
    store: AssetStore,
    builder: ArchiveBuilder,
    public_prefix: Option<String>,
    math: MathRenderer,
}

impl Exporter {
    pub fn new(store: AssetStore, builder: ArchiveBuilder, public_prefix: Option<String>, math: MathRenderer) -> Self {
        Self {
            store,
            builder,
            public_prefix,
            math,
        }
    }

    pub fn from_settings(settings: &AppSettings) -> Self {
        Self::new(
            AssetStore::from_settings(settings),
            ArchiveBuilder::new(settings.temp_root()),
            settings.public_url_prefix.clone(),
            settings.math_renderer,
        )
    }

    pub fn store(&self) -> &AssetStore {
        &self.store
    }

    pub fn export(&self, doc: &Document, format: ExportFormat) -> ExportPayload {
        self.export_text(&doc.content, doc.id.base_name(), format)
    }

    /// Export `content` under `base_name`.
    ///
    /// For HTML the rendered page is what gets bundled; assets are looked up in
    /// both the source and the page so raw `<img>` tags count as well.
    pub fn export_text(&self, content: &str, base_name: &str, format: ExportFormat) -> ExportPayload {
        let prefix = self.public_prefix.as_deref();
        match format {
            ExportFormat::Markdown => {
                let refs = resolve_assets(content, &self.store, prefix);
                log::debug!("Exporting {} as markdown with {} asset(s)", base_name, refs.len());
                self.builder.build(content, base_name, format, &refs)
            }
            ExportFormat::Html => {
                let page = render_page(base_name, content, self.math);
                let refs = resolve_assets(&format!("{}\n{}", content, page), &self.store, prefix);
                log::debug!("Exporting {} as html with {} asset(s)", base_name, refs.len());
                self.builder.build(&page, base_name, format, &refs)
            }
        }
    }
}
