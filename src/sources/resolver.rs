//! Source resolution: pick the strategy that can serve an image and turn the
//! image into render-ready URLs.
//!
//! Strategies are scanned in registration order and the first one whose
//! `supports` accepts the image wins. [`SourceResolver::new`] registers the
//! built-ins as media library first, external URL second, so an image that
//! carries both an asset id and a URL always resolves through the library.
//!
//! ## Batches
//!
//! [`SourceResolver::resolve_many`] stops at the first unresolvable image and
//! returns its error. [`SourceResolver::resolve_each`] keeps going and reports
//! per image; the embedding layer picks between the two with its batch policy.

use super::external::ExternalUrlSource;
use super::media::MediaLibrary;
use super::media_library::MediaLibrarySource;
use super::ImageSource;
use crate::types::GalleryImage;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("No image source can serve image {}", describe_id(.image_id))]
    NoSourceFound { image_id: Option<u64> },
}

fn describe_id(id: &Option<u64>) -> String {
    match id {
        Some(id) => format!("#{id}"),
        None => "(unsaved)".to_string(),
    }
}

/// An image together with the URLs and label a renderer needs.
///
/// Produced fresh on every resolution and never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedImage<'a> {
    pub image: &'a GalleryImage,
    /// Full-size display URL. Empty when unavailable.
    pub url: String,
    /// Thumbnail URL. Empty when unavailable.
    pub thumbnail: String,
    pub alt: String,
    /// Responsive candidates for the thumbnail. Often empty.
    pub srcset: String,
}

/// Ordered registry of [`ImageSource`] strategies.
#[derive(Default)]
pub struct SourceResolver {
    sources: Vec<Box<dyn ImageSource>>,
}

impl SourceResolver {
    /// Resolver with the built-in strategies registered in priority order.
    pub fn new(media: Arc<dyn MediaLibrary>) -> Self {
        let mut resolver = Self::empty();
        resolver.register(MediaLibrarySource::new(media));
        resolver.register(ExternalUrlSource);
        resolver
    }

    /// Resolver with no strategies; everything fails until something is registered.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Append a strategy. Names are not deduplicated; only order matters.
    pub fn register(&mut self, source: impl ImageSource + 'static) {
        self.sources.push(Box::new(source));
    }

    /// Names of the registered strategies, in resolution order.
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// First registered strategy that supports `image`.
    pub fn resolve(&self, image: &GalleryImage) -> Result<&dyn ImageSource, SourceError> {
        self.sources
            .iter()
            .find(|source| source.supports(image))
            .map(|source| &**source)
            .ok_or(SourceError::NoSourceFound { image_id: image.id })
    }

    /// Resolve one image into display URL (at `size`), thumbnail URL (at
    /// `thumbnail_size`) and alt text.
    pub fn resolve_one<'a>(
        &self,
        image: &'a GalleryImage,
        size: &str,
        thumbnail_size: &str,
    ) -> Result<ResolvedImage<'a>, SourceError> {
        let source = self.resolve(image)?;
        Ok(ResolvedImage {
            image,
            url: source.image_url(image, size),
            thumbnail: source.thumbnail_url(image, thumbnail_size),
            alt: source.alt_text(image),
            srcset: source.srcset(image, thumbnail_size),
        })
    }

    /// Resolve every image in order, failing on the first unresolvable one.
    pub fn resolve_many<'a>(
        &self,
        images: &'a [GalleryImage],
        size: &str,
        thumbnail_size: &str,
    ) -> Result<Vec<ResolvedImage<'a>>, SourceError> {
        images
            .iter()
            .map(|image| self.resolve_one(image, size, thumbnail_size))
            .collect()
    }

    /// Resolve every image in order, reporting each outcome separately.
    pub fn resolve_each<'a>(
        &self,
        images: &'a [GalleryImage],
        size: &str,
        thumbnail_size: &str,
    ) -> Vec<Result<ResolvedImage<'a>, SourceError>> {
        images
            .iter()
            .map(|image| self.resolve_one(image, size, thumbnail_size))
            .collect()
    }
}
