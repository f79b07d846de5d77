use super::ImageSource;
use crate::metadata;
use crate::types::GalleryImage;

/// Serves images whose bytes live at an external URL.
///
/// There is no resizing service behind these URLs, so every size token maps
/// to the same address.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExternalUrlSource;

impl ExternalUrlSource {
    pub const NAME: &'static str = "external-url";
}

impl ImageSource for ExternalUrlSource {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn supports(&self, image: &GalleryImage) -> bool {
        image.attachment_id.is_none() && image.attachment_url.is_some()
    }

    fn image_url(&self, image: &GalleryImage, _size: &str) -> String {
        image.attachment_url.clone().unwrap_or_default()
    }

    fn alt_text(&self, image: &GalleryImage) -> String {
        metadata::resolve(&[image.title.as_deref()]).unwrap_or_default()
    }
}
