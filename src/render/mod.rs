//! Gallery renderers: turn a gallery and its resolved images into markup.
//!
//! Renderers are registered by id in a [`RendererResolver`]; one id is the
//! default. Every renderer is stateless and receives already-resolved image
//! data, so it never talks to the media library or the store.
//!
//! HTML is built with [Maud](https://maud.lambda.xyz/). Interpolated values
//! are escaped for their context by the macro; URLs additionally pass through
//! [`crate::metadata::safe_url`] before they reach an attribute.

pub mod fancybox;
pub mod resolver;

pub use fancybox::FancyboxRenderer;
pub use resolver::{RenderError, RendererHook, RendererResolver};

use crate::sources::ResolvedImage;
use crate::types::Gallery;
use serde::{Deserialize, Serialize};

/// Display options handed to a renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Requested grid columns. Renderers clamp to what they support.
    pub columns: i64,
    /// Extra CSS classes for the gallery container.
    pub css_class: String,
    pub show_captions: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            columns: 3,
            css_class: String::new(),
            show_captions: true,
        }
    }
}

/// Style and script handles a renderer needs on the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequiredAssets {
    pub styles: Vec<&'static str>,
    pub scripts: Vec<&'static str>,
}

/// A pluggable way of presenting a gallery.
pub trait GalleryRenderer: Send + Sync {
    /// Unique id used for registration and lookup.
    fn id(&self) -> &str;

    /// Markup for the gallery. An empty image list renders nothing at all.
    fn render(&self, gallery: &Gallery, images: &[ResolvedImage<'_>], options: &RenderOptions)
    -> String;

    /// Assets to load on any page that shows this renderer's output.
    fn required_assets(&self) -> RequiredAssets;
}
