//! Image sources: where an image's bytes live and how to address them.
//!
//! | Strategy | Claims | URLs | Alt text |
//! |---|---|---|---|
//! | [`MediaLibrarySource`] | `attachment_id` set (wins ties) | host media library, per size token | stored alt → title → `""` |
//! | [`ExternalUrlSource`] | no `attachment_id`, `attachment_url` set | the URL verbatim, every size | title → `""` |
//!
//! The module is split into:
//! - **Media**: [`MediaLibrary`] trait for the host media system + [`MediaCatalog`]
//! - **Strategies**: [`ImageSource`] trait + the two built-in implementations
//! - **Resolver**: [`SourceResolver`], first-match-wins over registered strategies

mod external;
pub mod media;
mod media_library;
pub mod resolver;

pub use external::ExternalUrlSource;
pub use media::{MediaAsset, MediaCatalog, MediaLibrary};
pub use media_library::MediaLibrarySource;
pub use resolver::{ResolvedImage, SourceError, SourceResolver};

use crate::types::GalleryImage;

/// Size token for the full-size display URL when the caller does not choose one.
pub const DEFAULT_SIZE: &str = "full";
/// Size token for thumbnails when the caller does not choose one.
pub const DEFAULT_THUMBNAIL_SIZE: &str = "medium";

/// A strategy that knows how to address one class of image origin.
///
/// Implementations are stateless apart from handles to the systems they read
/// from. URL accessors never fail: a URL that cannot be produced is an empty
/// string, and callers treat empty as "unavailable".
pub trait ImageSource: Send + Sync {
    /// Stable identifier, used in diagnostics.
    fn name(&self) -> &str;

    /// Whether this strategy can serve `image`.
    fn supports(&self, image: &GalleryImage) -> bool;

    /// Display URL at the given size token.
    fn image_url(&self, image: &GalleryImage, size: &str) -> String;

    /// Thumbnail URL at the given size token.
    fn thumbnail_url(&self, image: &GalleryImage, size: &str) -> String {
        self.image_url(image, size)
    }

    /// Accessible text label.
    fn alt_text(&self, image: &GalleryImage) -> String;

    /// Responsive `srcset` candidates around the given size token. Empty
    /// when the origin has only one rendition.
    fn srcset(&self, _image: &GalleryImage, _size: &str) -> String {
        String::new()
    }
}
