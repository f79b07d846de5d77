//! # Zul Gallery
//!
//! Image-source resolution and rendering for embedded photo galleries.
//! A gallery's images may live in a host media library (addressed by asset
//! id and size token) or at external URLs; this crate turns either into
//! render-ready URLs and hands them to a pluggable renderer.
//!
//! # Architecture: Two Strategy Families
//!
//! ```text
//! GalleryImage ──► SourceResolver ──► ResolvedImage ──► RendererResolver ──► HTML
//!                  (first match wins)                    (by id, default fallback)
//! ```
//!
//! - **Image sources** ([`sources`]): each strategy claims a class of images.
//!   The media-library strategy is registered first, so an image with both an
//!   asset id and a URL resolves through the library.
//! - **Renderers** ([`render`]): looked up by id; an unknown id falls back to
//!   the default, and an override hook may redirect the choice.
//!
//! Neither resolver logs, stores, or caches anything. Everything around them,
//! from directive parsing to viewer-aware error display, lives in [`embed`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | Gallery and image records, status and source values |
//! | [`sources`] | Image-source strategies, host media contract, Source Resolver |
//! | [`render`] | Renderer contract, Fancybox renderer, Renderer Resolver |
//! | [`store`] | Gallery/image store traits and the JSON-backed in-memory store |
//! | [`shortcode`] | `[zul_gallery ...]` directive parsing into display options |
//! | [`embed`] | Directive → gallery → images → resolvers → markup; page assets |
//! | [`metadata`] | Text resolution chains, URL and class sanitizing |
//! | [`config`] | `config.toml` loading, defaults, merging, validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Empty URLs, Not Errors
//!
//! A managed asset that was deleted, or lacks the requested size, resolves to
//! an empty URL. One broken asset must not take down a gallery, so only an
//! image with no source at all is an error, and the embedding layer decides
//! whether that skips the image or fails the gallery (`[embed] batch`).
//!
//! ## Maud for Markup
//!
//! Renderers build HTML with [Maud](https://maud.lambda.xyz/). Every
//! interpolated title, caption, alt text, and class is escaped by the macro;
//! URLs also go through [`metadata::safe_url`], which blanks script schemes.

pub mod config;
pub mod embed;
pub mod metadata;
pub mod output;
pub mod render;
pub mod shortcode;
pub mod sources;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
