//! Gallery and image persistence.
//!
//! The resolvers never touch storage; they receive records the embedding
//! layer loaded through these traits. [`MemoryStore`] implements both traits
//! over in-memory maps and persists to a single JSON data file:
//!
//! ```json
//! {
//!   "galleries": [{ "id": 1, "title": "Harbor", "status": "active" }],
//!   "images": [
//!     { "id": 1, "gallery_id": 1, "attachment_id": 123, "title": "Dawn" },
//!     { "id": 2, "gallery_id": 1, "attachment_url": "https://example.com/x.jpg" }
//!   ],
//!   "media": [{ "id": 123, "alt": "Dawn over the bay", "sizes": { "full": "..." } }]
//! }
//! ```
//!
//! ## Listing
//!
//! Lists are filtered, sorted, then paged (`limit` of `None` means all).
//! Sorting is stable with the record id as tie-breaker, so equal timestamps
//! still come back in a fixed order.

use crate::sources::{MediaCatalog, MediaLibrary};
use crate::types::{Gallery, GalleryImage, GallerySource, Status};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Gallery not found: {0}")]
    GalleryNotFound(u64),
    #[error("Image not found: {0}")]
    ImageNotFound(u64),
    #[error("Invalid record: {0}")]
    Invalid(String),
}

/// Column to order listings by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Id,
    Title,
    Status,
    /// Galleries only; images sort by `create_dt` instead.
    Source,
    #[default]
    CreateDt,
    ModifiedDt,
}

impl SortField {
    /// Parse a column name, falling back to `create_dt` for anything unknown.
    pub fn from_str_lossy(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "id" => SortField::Id,
            "title" => SortField::Title,
            "status" => SortField::Status,
            "source" => SortField::Source,
            "modified_dt" => SortField::ModifiedDt,
            _ => SortField::CreateDt,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Title => "title",
            SortField::Status => "status",
            SortField::Source => "source",
            SortField::CreateDt => "create_dt",
            SortField::ModifiedDt => "modified_dt",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Parse `ASC`/`DESC` case-insensitively, falling back to `fallback`.
    pub fn from_str_or(value: &str, fallback: SortOrder) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "ASC" => SortOrder::Asc,
            "DESC" => SortOrder::Desc,
            _ => fallback,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// Gallery listing filter. Defaults to newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryFilter {
    pub status: Option<Status>,
    pub source: Option<GallerySource>,
    pub created_by: Option<u64>,
    /// Case-insensitive substring match on title or description.
    pub search: Option<String>,
    pub sort: SortField,
    pub order: SortOrder,
}

impl Default for GalleryFilter {
    fn default() -> Self {
        Self {
            status: None,
            source: None,
            created_by: None,
            search: None,
            sort: SortField::CreateDt,
            order: SortOrder::Desc,
        }
    }
}

impl GalleryFilter {
    fn matches(&self, gallery: &Gallery) -> bool {
        if self.status.is_some_and(|s| s != gallery.status) {
            return false;
        }
        if self.source.is_some_and(|s| s != gallery.source) {
            return false;
        }
        if self.created_by.is_some_and(|u| u != gallery.created_by) {
            return false;
        }
        match self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(needle) => {
                let needle = needle.to_lowercase();
                gallery.title.to_lowercase().contains(&needle)
                    || gallery
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            }
            None => true,
        }
    }

    fn compare(&self, a: &Gallery, b: &Gallery) -> Ordering {
        let ordering = match self.sort {
            SortField::Id => a.id.cmp(&b.id),
            SortField::Title => a.title.cmp(&b.title),
            SortField::Status => a.status.as_str().cmp(b.status.as_str()),
            SortField::Source => a.source.as_str().cmp(b.source.as_str()),
            SortField::CreateDt => a.create_dt.cmp(&b.create_dt),
            SortField::ModifiedDt => a.modified_dt.cmp(&b.modified_dt),
        };
        self.order.apply(ordering.then_with(|| a.id.cmp(&b.id)))
    }
}

/// Image listing filter. Defaults to oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageFilter {
    pub status: Option<Status>,
    pub attachment_id: Option<u64>,
    pub sort: SortField,
    pub order: SortOrder,
}

impl ImageFilter {
    /// Active images only, in the given order.
    pub fn active(sort: SortField, order: SortOrder) -> Self {
        Self {
            status: Some(Status::Active),
            attachment_id: None,
            sort,
            order,
        }
    }

    fn matches(&self, image: &GalleryImage) -> bool {
        self.status.is_none_or(|s| s == image.status)
            && self
                .attachment_id
                .is_none_or(|id| image.attachment_id == Some(id))
    }

    fn compare(&self, a: &GalleryImage, b: &GalleryImage) -> Ordering {
        let ordering = match self.sort {
            SortField::Id => a.id.cmp(&b.id),
            SortField::Title => a.title.cmp(&b.title),
            SortField::Status => a.status.as_str().cmp(b.status.as_str()),
            SortField::Source | SortField::CreateDt => a.create_dt.cmp(&b.create_dt),
            SortField::ModifiedDt => a.modified_dt.cmp(&b.modified_dt),
        };
        self.order.apply(ordering.then_with(|| a.id.cmp(&b.id)))
    }
}

pub trait GalleryStore {
    fn find_gallery(&self, id: u64) -> Result<Option<Gallery>, StoreError>;

    /// Like [`find_gallery`](Self::find_gallery) but hides non-active galleries.
    fn find_active_gallery(&self, id: u64) -> Result<Option<Gallery>, StoreError> {
        Ok(self.find_gallery(id)?.filter(Gallery::is_active))
    }

    fn list_galleries(
        &self,
        filter: &GalleryFilter,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<Gallery>, StoreError>;

    fn count_galleries(&self, filter: &GalleryFilter) -> Result<usize, StoreError>;

    /// Store a new gallery and return its id.
    fn insert_gallery(&mut self, gallery: Gallery) -> Result<u64, StoreError>;

    fn update_gallery(&mut self, gallery: &Gallery) -> Result<(), StoreError>;

    /// Returns whether a gallery was removed.
    fn delete_gallery(&mut self, id: u64) -> Result<bool, StoreError>;
}

pub trait ImageStore {
    fn find_image(&self, id: u64) -> Result<Option<GalleryImage>, StoreError>;

    fn list_images(
        &self,
        gallery_id: u64,
        filter: &ImageFilter,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<GalleryImage>, StoreError>;

    fn count_images(&self, gallery_id: u64, filter: &ImageFilter) -> Result<usize, StoreError>;

    /// Store a new image and return its id.
    fn insert_image(&mut self, image: GalleryImage) -> Result<u64, StoreError>;

    fn update_image(&mut self, image: &GalleryImage) -> Result<(), StoreError>;

    /// Returns whether an image was removed.
    fn delete_image(&mut self, id: u64) -> Result<bool, StoreError>;

    /// Remove every image of a gallery, returning how many went.
    fn delete_images_by_gallery(&mut self, gallery_id: u64) -> Result<usize, StoreError>;
}

/// Check the source invariant for a new image: an asset id or an absolute
/// `http(s)` URL must be present.
pub fn validate_image_source(image: &GalleryImage) -> Result<(), StoreError> {
    let url = image
        .attachment_url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty());

    match (image.attachment_id, url) {
        (None, None) => Err(StoreError::Invalid(
            "either attachment_id or attachment_url is required".into(),
        )),
        (Some(0), _) => Err(StoreError::Invalid("invalid attachment id 0".into())),
        (_, Some(url)) if !is_absolute_http_url(url) => {
            Err(StoreError::Invalid(format!("invalid attachment URL: {url}")))
        }
        _ => Ok(()),
    }
}

/// Check that a managed image points at an image asset the library knows.
/// Images without an asset id pass.
pub fn validate_attachment(image: &GalleryImage, media: &dyn MediaLibrary) -> Result<(), StoreError> {
    match image.attachment_id {
        Some(asset) if !media.is_image(asset) => {
            Err(StoreError::Invalid(format!("invalid attachment id {asset}")))
        }
        _ => Ok(()),
    }
}

/// Insert an image after checking its asset against the media library.
pub fn add_image<S: ImageStore + ?Sized>(
    store: &mut S,
    media: &dyn MediaLibrary,
    image: GalleryImage,
) -> Result<u64, StoreError> {
    validate_image_source(&image)?;
    validate_attachment(&image, media)?;
    store.insert_image(image)
}

/// Add one active image per asset id, titled from the asset. Ids that are
/// zero, unknown, or not images are skipped. Returns the new image ids.
pub fn add_images_from_attachments<S: GalleryStore + ImageStore + ?Sized>(
    store: &mut S,
    media: &dyn MediaLibrary,
    gallery_id: u64,
    created_by: u64,
    assets: &[u64],
) -> Result<Vec<u64>, StoreError> {
    if store.find_gallery(gallery_id)?.is_none() {
        return Err(StoreError::GalleryNotFound(gallery_id));
    }
    let mut ids = Vec::new();
    for &asset in assets {
        if asset == 0 || !media.is_image(asset) {
            continue;
        }
        let image = GalleryImage::from_attachment(gallery_id, created_by, asset)
            .with_title(media.title(asset));
        ids.push(store.insert_image(image)?);
    }
    Ok(ids)
}

fn is_absolute_http_url(url: &str) -> bool {
    if url.contains(char::is_whitespace) {
        return false;
    }
    Url::parse(url).is_ok_and(|parsed| {
        matches!(parsed.scheme(), "http" | "https")
            && parsed.host_str().is_some_and(|host| !host.is_empty())
    })
}

fn next_free_id(ids: impl Iterator<Item = u64>, kind: &str) -> Result<u64, StoreError> {
    ids.max()
        .unwrap_or(0)
        .checked_add(1)
        .ok_or_else(|| StoreError::Invalid(format!("{kind} ids exhausted")))
}

fn page<T>(items: Vec<T>, limit: Option<usize>, offset: usize) -> Vec<T> {
    let iter = items.into_iter().skip(offset);
    match limit {
        Some(limit) => iter.take(limit).collect(),
        None => iter.collect(),
    }
}

/// On-disk shape of the data file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataFile {
    pub galleries: Vec<Gallery>,
    pub images: Vec<GalleryImage>,
    pub media: MediaCatalog,
}

impl DataFile {
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// In-memory store for galleries and images.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    galleries: BTreeMap<u64, Gallery>,
    images: BTreeMap<u64, GalleryImage>,
    next_gallery_id: u64,
    next_image_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_gallery_id: 1,
            next_image_id: 1,
            ..Self::default()
        }
    }

    /// Build a store from loaded records. Records without an id get the next
    /// free one; duplicate ids are rejected.
    pub fn from_records(
        galleries: Vec<Gallery>,
        images: Vec<GalleryImage>,
    ) -> Result<Self, StoreError> {
        let mut store = Self::new();
        store.next_gallery_id = next_free_id(galleries.iter().filter_map(|g| g.id), "gallery")?;
        store.next_image_id = next_free_id(images.iter().filter_map(|i| i.id), "image")?;

        for gallery in galleries {
            let id = match gallery.id {
                Some(id) => id,
                None => store.take_gallery_id()?,
            };
            if store.galleries.insert(id, gallery.with_id(id)).is_some() {
                return Err(StoreError::Invalid(format!("duplicate gallery id {id}")));
            }
        }
        for image in images {
            let id = match image.id {
                Some(id) => id,
                None => store.take_image_id()?,
            };
            if store.images.insert(id, image.with_id(id)).is_some() {
                return Err(StoreError::Invalid(format!("duplicate image id {id}")));
            }
        }
        Ok(store)
    }

    /// Records in id order, for saving.
    pub fn records(&self) -> (Vec<Gallery>, Vec<GalleryImage>) {
        (
            self.galleries.values().cloned().collect(),
            self.images.values().cloned().collect(),
        )
    }

    fn take_gallery_id(&mut self) -> Result<u64, StoreError> {
        let id = self.next_gallery_id;
        self.next_gallery_id = next_free_id(std::iter::once(id), "gallery")?;
        Ok(id)
    }

    fn take_image_id(&mut self) -> Result<u64, StoreError> {
        let id = self.next_image_id;
        self.next_image_id = next_free_id(std::iter::once(id), "image")?;
        Ok(id)
    }
}

impl GalleryStore for MemoryStore {
    fn find_gallery(&self, id: u64) -> Result<Option<Gallery>, StoreError> {
        Ok(self.galleries.get(&id).cloned())
    }

    fn list_galleries(
        &self,
        filter: &GalleryFilter,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<Gallery>, StoreError> {
        let mut galleries: Vec<Gallery> = self
            .galleries
            .values()
            .filter(|g| filter.matches(g))
            .cloned()
            .collect();
        galleries.sort_by(|a, b| filter.compare(a, b));
        Ok(page(galleries, limit, offset))
    }

    fn count_galleries(&self, filter: &GalleryFilter) -> Result<usize, StoreError> {
        Ok(self.galleries.values().filter(|g| filter.matches(g)).count())
    }

    fn insert_gallery(&mut self, gallery: Gallery) -> Result<u64, StoreError> {
        if gallery.title.trim().is_empty() {
            return Err(StoreError::Invalid("gallery title is required".into()));
        }
        let id = self.take_gallery_id()?;
        self.galleries.insert(id, gallery.with_id(id));
        Ok(id)
    }

    fn update_gallery(&mut self, gallery: &Gallery) -> Result<(), StoreError> {
        let id = gallery
            .id
            .ok_or_else(|| StoreError::Invalid("cannot update a gallery without id".into()))?;
        let slot = self
            .galleries
            .get_mut(&id)
            .ok_or(StoreError::GalleryNotFound(id))?;
        *slot = gallery.clone();
        slot.modified_dt = Some(Utc::now());
        Ok(())
    }

    fn delete_gallery(&mut self, id: u64) -> Result<bool, StoreError> {
        Ok(self.galleries.remove(&id).is_some())
    }
}

impl ImageStore for MemoryStore {
    fn find_image(&self, id: u64) -> Result<Option<GalleryImage>, StoreError> {
        Ok(self.images.get(&id).cloned())
    }

    fn list_images(
        &self,
        gallery_id: u64,
        filter: &ImageFilter,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<GalleryImage>, StoreError> {
        let mut images: Vec<GalleryImage> = self
            .images
            .values()
            .filter(|i| i.gallery_id == gallery_id && filter.matches(i))
            .cloned()
            .collect();
        images.sort_by(|a, b| filter.compare(a, b));
        Ok(page(images, limit, offset))
    }

    fn count_images(&self, gallery_id: u64, filter: &ImageFilter) -> Result<usize, StoreError> {
        Ok(self
            .images
            .values()
            .filter(|i| i.gallery_id == gallery_id && filter.matches(i))
            .count())
    }

    fn insert_image(&mut self, image: GalleryImage) -> Result<u64, StoreError> {
        if !self.galleries.contains_key(&image.gallery_id) {
            return Err(StoreError::GalleryNotFound(image.gallery_id));
        }
        validate_image_source(&image)?;
        let id = self.take_image_id()?;
        self.images.insert(id, image.with_id(id));
        Ok(id)
    }

    /// Only title, description and status are editable; the pixel source of
    /// a stored image is fixed.
    fn update_image(&mut self, image: &GalleryImage) -> Result<(), StoreError> {
        let id = image
            .id
            .ok_or_else(|| StoreError::Invalid("cannot update an image without id".into()))?;
        let slot = self
            .images
            .get_mut(&id)
            .ok_or(StoreError::ImageNotFound(id))?;
        slot.title = image.title.clone();
        slot.description = image.description.clone();
        slot.status = image.status;
        slot.modified_dt = Some(Utc::now());
        Ok(())
    }

    fn delete_image(&mut self, id: u64) -> Result<bool, StoreError> {
        Ok(self.images.remove(&id).is_some())
    }

    fn delete_images_by_gallery(&mut self, gallery_id: u64) -> Result<usize, StoreError> {
        let before = self.images.len();
        self.images.retain(|_, image| image.gallery_id != gallery_id);
        Ok(before - self.images.len())
    }
}
