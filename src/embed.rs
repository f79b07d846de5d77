//! Embedding: turn a directive into gallery markup.
//!
//! ## Pipeline
//!
//! ```text
//! DisplayOptions
//!   → active gallery        (missing / inactive / draft → "")
//!   → active images         (ordered, limited; none → "")
//!   → SourceResolver        (batch policy: skip or abort)
//!   → RendererResolver      (requested id, hook, default fallback)
//!   → GalleryRenderer::render
//! ```
//!
//! Errors never reach a page visitor. [`Embedder::render`] turns them into an
//! error box for administrators and into nothing for everyone else, logging a
//! warning either way.
//!
//! ## Assets
//!
//! Every renderer declares the style and script handles it needs. A
//! [`PageAssets`] collects them across all galleries on one page, once per
//! handle, and only for galleries that actually produced markup.

use crate::config::{AssetsConfig, BatchPolicy, GalleryConfig, generate_grid_css};
use crate::render::{RenderError, RendererResolver, RequiredAssets};
use crate::shortcode::{self, DisplayOptions, ShortcodeError};
use crate::sources::{ResolvedImage, SourceError, SourceResolver};
use crate::store::{DataFile, GalleryStore, ImageStore, MemoryStore, StoreError};
use crate::types::GalleryImage;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum EmbedError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Shortcode(#[from] ShortcodeError),
}

/// Who is looking at the page. Decides whether errors are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Viewer {
    #[default]
    Visitor,
    Administrator,
}

impl Viewer {
    /// Markup for a failed embed: an error box for administrators, nothing
    /// for visitors.
    pub fn error_markup(self, message: &str) -> String {
        match self {
            Viewer::Visitor => String::new(),
            Viewer::Administrator => html! {
                div.zul-gallery-error { (message) }
            }
            .into_string(),
        }
    }
}

/// Result of one successful embed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Embedded {
    /// Markup; empty when there was nothing to show.
    pub html: String,
    /// Handles the page needs for this markup. Empty when `html` is.
    pub assets: RequiredAssets,
    /// Images left out under [`BatchPolicy::Skip`].
    pub skipped: usize,
}

/// Style and script handles needed by one page, deduplicated, in first-use order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageAssets {
    styles: Vec<&'static str>,
    scripts: Vec<&'static str>,
}

impl PageAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, assets: &RequiredAssets) {
        for handle in &assets.styles {
            if !self.styles.contains(handle) {
                self.styles.push(handle);
            }
        }
        for handle in &assets.scripts {
            if !self.scripts.contains(handle) {
                self.scripts.push(handle);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty() && self.scripts.is_empty()
    }

    pub fn styles(&self) -> &[&'static str] {
        &self.styles
    }

    pub fn scripts(&self) -> &[&'static str] {
        &self.scripts
    }

    /// `<link>` tags for every style handle with a configured URL.
    pub fn style_tags(&self, urls: &AssetsConfig) -> Markup {
        html! {
            @for url in self.styles.iter().filter_map(|h| urls.style_url(h)) {
                link rel="stylesheet" href=(url);
            }
        }
    }

    /// `<script>` tags for every script handle with a configured URL.
    pub fn script_tags(&self, urls: &AssetsConfig) -> Markup {
        html! {
            @for url in self.scripts.iter().filter_map(|h| urls.script_url(h)) {
                script src=(url) {}
            }
        }
    }
}

/// A page body with every directive expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedPage {
    pub body: String,
    pub assets: PageAssets,
}

impl RenderedPage {
    /// Wrap the body in a standalone HTML document with asset tags and grid CSS.
    pub fn to_document(&self, title: &str, config: &GalleryConfig) -> String {
        let css = generate_grid_css(&config.theme);
        let markup = html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="UTF-8";
                    meta name="viewport" content="width=device-width, initial-scale=1.0";
                    title { (title) }
                    (self.assets.style_tags(&config.assets))
                    style { (css) }
                }
                body {
                    (PreEscaped(&self.body))
                    (self.assets.script_tags(&config.assets))
                }
            }
        };
        markup.into_string()
    }
}

/// Wires the store, both resolvers, and config into the embed pipeline.
pub struct Embedder<S> {
    store: S,
    sources: SourceResolver,
    renderers: RendererResolver,
    config: GalleryConfig,
}

impl Embedder<MemoryStore> {
    /// Build an embedder over a loaded data file with the built-in sources
    /// and renderers. A configured default renderer that is not registered is
    /// logged and ignored.
    pub fn from_data(data: DataFile, config: GalleryConfig) -> Result<Self, EmbedError> {
        let store = MemoryStore::from_records(data.galleries, data.images)?;
        let sources = SourceResolver::new(Arc::new(data.media));
        let mut renderers = RendererResolver::new();
        if let Err(err) = renderers.set_default(&config.renderer.default) {
            warn!("{err}; keeping default '{}'", renderers.default_id());
        }
        Ok(Self::new(store, sources, renderers, config))
    }
}

impl<S: GalleryStore + ImageStore> Embedder<S> {
    pub fn new(
        store: S,
        sources: SourceResolver,
        renderers: RendererResolver,
        config: GalleryConfig,
    ) -> Self {
        Self {
            store,
            sources,
            renderers,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn sources(&self) -> &SourceResolver {
        &self.sources
    }

    pub fn renderers(&self) -> &RendererResolver {
        &self.renderers
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    /// Display options for `gallery_id` from config defaults alone.
    pub fn default_options(&self, gallery_id: u64) -> DisplayOptions {
        DisplayOptions::for_gallery(gallery_id, &self.config.display)
    }

    /// Run the pipeline and report errors to the caller.
    pub fn try_render(&self, options: &DisplayOptions) -> Result<Embedded, EmbedError> {
        let Some(gallery) = self.store.find_active_gallery(options.gallery_id)? else {
            debug!(gallery_id = options.gallery_id, "gallery missing or not active");
            return Ok(Embedded::default());
        };

        let images = self.store.list_images(
            options.gallery_id,
            &options.image_filter(),
            options.limit,
            0,
        )?;
        if images.is_empty() {
            debug!(gallery_id = options.gallery_id, "gallery has no active images");
            return Ok(Embedded::default());
        }

        let (resolved, skipped) = self.resolve_batch(&images, options)?;
        if resolved.is_empty() {
            return Ok(Embedded {
                skipped,
                ..Embedded::default()
            });
        }

        let renderer = self.renderers.resolve(options.renderer.as_deref())?;
        debug!(
            gallery_id = options.gallery_id,
            requested = options.renderer.as_deref().unwrap_or("(default)"),
            renderer = renderer.id(),
            images = resolved.len(),
            "rendering gallery"
        );

        let html = renderer.render(&gallery, &resolved, &options.render_options());
        let assets = if html.is_empty() {
            RequiredAssets::default()
        } else {
            renderer.required_assets()
        };
        Ok(Embedded {
            html,
            assets,
            skipped,
        })
    }

    fn resolve_batch<'a>(
        &self,
        images: &'a [GalleryImage],
        options: &DisplayOptions,
    ) -> Result<(Vec<ResolvedImage<'a>>, usize), EmbedError> {
        match self.config.embed.batch {
            BatchPolicy::Abort => {
                let resolved =
                    self.sources
                        .resolve_many(images, &options.size, &options.thumbnail_size)?;
                Ok((resolved, 0))
            }
            BatchPolicy::Skip => {
                let mut resolved = Vec::with_capacity(images.len());
                let mut skipped = 0;
                for result in
                    self.sources
                        .resolve_each(images, &options.size, &options.thumbnail_size)
                {
                    match result {
                        Ok(item) => resolved.push(item),
                        Err(err) => {
                            warn!(gallery_id = options.gallery_id, "skipping image: {err}");
                            skipped += 1;
                        }
                    }
                }
                Ok((resolved, skipped))
            }
        }
    }

    /// Render one gallery for `viewer`, recording its assets on `page`.
    pub fn render(&self, options: &DisplayOptions, viewer: Viewer, page: &mut PageAssets) -> String {
        match self.try_render(options) {
            Ok(embedded) => {
                page.add(&embedded.assets);
                embedded.html
            }
            Err(err) => {
                warn!(gallery_id = options.gallery_id, "gallery embed failed: {err}");
                viewer.error_markup(&err.to_string())
            }
        }
    }

    /// Render a parsed directive for `viewer`.
    pub fn render_directive(
        &self,
        attributes: &BTreeMap<String, String>,
        viewer: Viewer,
        page: &mut PageAssets,
    ) -> String {
        match DisplayOptions::from_attributes(attributes, &self.config.display) {
            Ok(options) => self.render(&options, viewer, page),
            Err(err) => {
                warn!("invalid gallery directive: {err}");
                viewer.error_markup(&err.to_string())
            }
        }
    }

    /// Expand every directive in a page body.
    pub fn expand_page(&self, text: &str, viewer: Viewer) -> RenderedPage {
        let mut assets = PageAssets::new();
        let body = shortcode::expand(text, |directive| {
            self.render_directive(&directive.attributes, viewer, &mut assets)
        });
        RenderedPage { body, assets }
    }
}
