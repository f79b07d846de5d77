use super::ImageSource;
use super::media::MediaLibrary;
use crate::metadata;
use crate::types::GalleryImage;
use std::sync::Arc;

/// Serves images backed by a managed asset in the host media library.
///
/// Claims every image with an `attachment_id`, even when an external URL is
/// also present. A deleted asset, or one without the requested size, yields
/// an empty URL so the rest of the gallery still renders.
pub struct MediaLibrarySource {
    media: Arc<dyn MediaLibrary>,
}

impl MediaLibrarySource {
    pub const NAME: &'static str = "media-library";

    pub fn new(media: Arc<dyn MediaLibrary>) -> Self {
        Self { media }
    }
}

impl ImageSource for MediaLibrarySource {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn supports(&self, image: &GalleryImage) -> bool {
        image.attachment_id.is_some()
    }

    fn image_url(&self, image: &GalleryImage, size: &str) -> String {
        image
            .attachment_id
            .and_then(|asset| self.media.image_url(asset, size))
            .unwrap_or_default()
    }

    fn alt_text(&self, image: &GalleryImage) -> String {
        let stored = image.attachment_id.and_then(|asset| self.media.alt_text(asset));
        metadata::resolve(&[stored.as_deref(), image.title.as_deref()]).unwrap_or_default()
    }

    fn srcset(&self, image: &GalleryImage, size: &str) -> String {
        image
            .attachment_id
            .and_then(|asset| self.media.srcset(asset, size))
            .unwrap_or_default()
    }
}
