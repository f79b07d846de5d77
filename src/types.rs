//! Gallery and image records shared by the store, the resolvers, and the renderers.
//!
//! These types are serialized to JSON in the data file and must round-trip
//! unchanged through every stage. The resolvers only read them; all mutation
//! goes through the `with_*` builders, which stamp `modified_dt`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status shared by galleries and images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Active,
    Inactive,
    Draft,
}

impl Status {
    /// Parse a status, falling back to `Active` for anything unrecognized.
    pub fn from_str_lossy(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "inactive" => Status::Inactive,
            "draft" => Status::Draft,
            _ => Status::Active,
        }
    }

    /// Stored value (`active`, `inactive`, `draft`).
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Inactive => "inactive",
            Status::Draft => "draft",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Active => "Active",
            Status::Inactive => "Inactive",
            Status::Draft => "Draft",
        }
    }

    /// Only active records are shown to visitors.
    pub fn is_public(self) -> bool {
        self == Status::Active
    }
}

/// Where a gallery's images are curated. Informational only: the source
/// resolver looks at each image, never at this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GallerySource {
    #[default]
    #[serde(rename = "WP")]
    Wp,
    #[serde(rename = "External")]
    External,
}

impl GallerySource {
    /// Parse a source label case-insensitively. `WP` and `WORDPRESS` map to
    /// [`GallerySource::Wp`]; unknown values also fall back to it.
    pub fn from_str_lossy(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "EXTERNAL" => GallerySource::External,
            _ => GallerySource::Wp,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GallerySource::Wp => "WP",
            GallerySource::External => "External",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GallerySource::Wp => "WordPress Media Library",
            GallerySource::External => "External Source",
        }
    }
}

/// A named collection of images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gallery {
    /// Absent until the gallery has been stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub created_by: u64,
    #[serde(default)]
    pub source: GallerySource,
    #[serde(default)]
    pub status: Status,
    #[serde(default = "Utc::now")]
    pub create_dt: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_dt: Option<DateTime<Utc>>,
}

impl Gallery {
    pub fn new(title: impl Into<String>, created_by: u64) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: None,
            created_by,
            source: GallerySource::default(),
            status: Status::default(),
            create_dt: Utc::now(),
            modified_dt: None,
        }
    }

    /// Assigning an id is persistence bookkeeping, not an edit, so
    /// `modified_dt` is left alone.
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self.touch()
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self.touch()
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self.touch()
    }

    pub fn with_source(mut self, source: GallerySource) -> Self {
        self.source = source;
        self.touch()
    }

    pub fn is_active(&self) -> bool {
        self.status.is_public()
    }

    pub fn is_wp_source(&self) -> bool {
        self.source == GallerySource::Wp
    }

    fn touch(mut self) -> Self {
        self.modified_dt = Some(Utc::now());
        self
    }
}

/// One image inside a gallery.
///
/// The pixel source is either a managed asset (`attachment_id`, an opaque id
/// into the host media library) or an external `attachment_url`. When both
/// are set the managed asset wins; when neither is set the image cannot be
/// resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryImage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub gallery_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub created_by: u64,
    #[serde(default)]
    pub status: Status,
    #[serde(default = "Utc::now")]
    pub create_dt: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_dt: Option<DateTime<Utc>>,
}

impl GalleryImage {
    pub fn new(gallery_id: u64, created_by: u64) -> Self {
        Self {
            id: None,
            gallery_id,
            title: None,
            attachment_id: None,
            attachment_url: None,
            description: None,
            created_by,
            status: Status::default(),
            create_dt: Utc::now(),
            modified_dt: None,
        }
    }

    /// Image backed by a managed asset in the host media library.
    pub fn from_attachment(gallery_id: u64, created_by: u64, attachment_id: u64) -> Self {
        Self {
            attachment_id: Some(attachment_id),
            ..Self::new(gallery_id, created_by)
        }
    }

    /// Image whose bytes live at an external URL.
    pub fn from_url(gallery_id: u64, created_by: u64, url: impl Into<String>) -> Self {
        Self {
            attachment_url: Some(url.into()),
            ..Self::new(gallery_id, created_by)
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self.touch()
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self.touch()
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self.touch()
    }

    pub fn is_active(&self) -> bool {
        self.status.is_public()
    }

    pub fn is_wp_attachment(&self) -> bool {
        self.attachment_id.is_some()
    }

    pub fn is_external_source(&self) -> bool {
        self.attachment_id.is_none() && self.attachment_url.is_some()
    }

    fn touch(mut self) -> Self {
        self.modified_dt = Some(Utc::now());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_lossy_parse_defaults_to_active() {
        assert_eq!(Status::from_str_lossy("INACTIVE"), Status::Inactive);
        assert_eq!(Status::from_str_lossy("draft"), Status::Draft);
        assert_eq!(Status::from_str_lossy("archived"), Status::Active);
    }

    #[test]
    fn only_active_status_is_public() {
        assert!(Status::Active.is_public());
        assert!(!Status::Inactive.is_public());
        assert!(!Status::Draft.is_public());
    }

    #[test]
    fn gallery_source_accepts_wordpress_alias() {
        assert_eq!(GallerySource::from_str_lossy("wordpress"), GallerySource::Wp);
        assert_eq!(GallerySource::from_str_lossy("external"), GallerySource::External);
        assert_eq!(GallerySource::from_str_lossy("ftp"), GallerySource::Wp);
        assert_eq!(GallerySource::External.label(), "External Source");
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&Status::Inactive).unwrap();
        assert_eq!(json, r#""inactive""#);
    }

    #[test]
    fn gallery_source_serializes_as_stored_label() {
        let json = serde_json::to_string(&GallerySource::Wp).unwrap();
        assert_eq!(json, r#""WP""#);
    }

    #[test]
    fn new_gallery_defaults() {
        let gallery = Gallery::new("Summer", 7);
        assert_eq!(gallery.id, None);
        assert!(gallery.is_active());
        assert!(gallery.is_wp_source());
        assert_eq!(gallery.modified_dt, None);
    }

    #[test]
    fn with_id_does_not_stamp_modified() {
        let gallery = Gallery::new("Summer", 7).with_id(3);
        assert_eq!(gallery.id, Some(3));
        assert_eq!(gallery.modified_dt, None);
    }

    #[test]
    fn edits_stamp_modified() {
        let gallery = Gallery::new("Summer", 7).with_status(Status::Draft);
        assert!(!gallery.is_active());
        assert!(gallery.modified_dt.is_some());
    }

    #[test]
    fn image_source_predicates() {
        let managed = GalleryImage::from_attachment(1, 1, 123);
        assert!(managed.is_wp_attachment());
        assert!(!managed.is_external_source());

        let external = GalleryImage::from_url(1, 1, "https://example.com/x.jpg");
        assert!(!external.is_wp_attachment());
        assert!(external.is_external_source());

        let mut both = GalleryImage::from_attachment(1, 1, 123);
        both.attachment_url = Some("https://example.com/x.jpg".into());
        assert!(both.is_wp_attachment());
        assert!(!both.is_external_source());
    }

    #[test]
    fn image_deserializes_with_defaults() {
        let image: GalleryImage =
            serde_json::from_str(r#"{"gallery_id": 4, "attachment_url": "https://e.com/a.png"}"#)
                .unwrap();
        assert_eq!(image.gallery_id, 4);
        assert_eq!(image.status, Status::Active);
        assert!(image.is_external_source());
    }
}
