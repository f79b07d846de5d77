//! Shared test utilities for the zul-gallery test suite.
//!
//! Provides record builders, a sample media catalog, and a small populated
//! data set that the store, resolver, and embedding tests share.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let resolver = SourceResolver::new(sample_media());
//! let resolved = resolver.resolve_one(&managed_image(1, 123), "full", "medium").unwrap();
//! assert_eq!(resolved.url, "https://site.test/uploads/dawn.jpg");
//! ```

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::{Arc, Mutex};

use crate::sources::{MediaAsset, MediaCatalog, MediaLibrary};
use crate::store::{DataFile, MemoryStore};
use crate::types::{Gallery, GalleryImage, Status};

// =========================================================================
// Media
// =========================================================================

/// Catalog with two assets:
///
/// - `123`: `full` and `medium` sizes with widths, no stored alt
/// - `124`: `full` only, alt `"Dusk, stored alt"`
pub fn sample_catalog() -> MediaCatalog {
    let mut catalog = MediaCatalog::new();
    catalog.insert(
        MediaAsset::new(123)
            .with_size("full", "https://site.test/uploads/dawn.jpg")
            .with_size("medium", "https://site.test/uploads/dawn-300x200.jpg")
            .with_width("full", 1600)
            .with_width("medium", 300),
    );
    catalog.insert(
        MediaAsset::new(124)
            .with_size("full", "https://site.test/uploads/dusk.jpg")
            .with_alt("Dusk, stored alt"),
    );
    catalog
}

pub fn sample_media() -> Arc<dyn MediaLibrary> {
    Arc::new(sample_catalog())
}

/// Media library that records every URL request before delegating.
pub struct RecordingMedia {
    inner: MediaCatalog,
    requests: Mutex<Vec<(u64, String)>>,
}

impl RecordingMedia {
    pub fn new(inner: MediaCatalog) -> Self {
        Self {
            inner,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// `(asset, size)` pairs in request order.
    pub fn requests(&self) -> Vec<(u64, String)> {
        self.requests.lock().unwrap().clone()
    }
}

impl MediaLibrary for RecordingMedia {
    fn image_url(&self, asset: u64, size: &str) -> Option<String> {
        self.requests
            .lock()
            .unwrap()
            .push((asset, size.to_string()));
        self.inner.image_url(asset, size)
    }

    fn alt_text(&self, asset: u64) -> Option<String> {
        self.inner.alt_text(asset)
    }

    fn is_image(&self, asset: u64) -> bool {
        self.inner.is_image(asset)
    }

    fn title(&self, asset: u64) -> Option<String> {
        self.inner.title(asset)
    }
}

// =========================================================================
// Records
// =========================================================================

/// Stored, active gallery.
pub fn gallery(id: u64, title: &str) -> Gallery {
    Gallery::new(title, 1).with_id(id)
}

/// Stored image in gallery 1 backed by media asset `asset`.
pub fn managed_image(id: u64, asset: u64) -> GalleryImage {
    GalleryImage::from_attachment(1, 1, asset).with_id(id)
}

/// Stored image in gallery 1 backed by an external URL.
pub fn external_image(id: u64, url: &str) -> GalleryImage {
    GalleryImage::from_url(1, 1, url).with_id(id)
}

/// Stored image in gallery 1 with neither source.
pub fn orphan_image(id: u64) -> GalleryImage {
    GalleryImage::new(1, 1).with_id(id)
}

/// Fixed base time so ordering tests are deterministic.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

/// Data set used across store and embedding tests:
///
/// | Gallery | Status | Images (id: source, status) |
/// |---|---|---|
/// | 1 Harbor | active | 1: asset 123 "Dawn", 2: external "Pier", 3: asset 124 draft |
/// | 2 Archive | inactive | 4: external |
/// | 3 Empty | active | none |
pub fn sample_data_file() -> DataFile {
    let galleries = vec![
        gallery(1, "Harbor").with_description(Some("Boats at first light".into())),
        gallery(2, "Archive").with_status(Status::Inactive),
        gallery(3, "Empty"),
    ];

    let mut images = vec![
        managed_image(1, 123).with_title(Some("Dawn".into())),
        external_image(2, "https://cdn.example.com/pier.jpg")
            .with_title(Some("Pier".into()))
            .with_description(Some("The old pier".into())),
        managed_image(3, 124).with_status(Status::Draft),
        GalleryImage::from_url(2, 1, "https://cdn.example.com/old.jpg").with_id(4),
    ];
    for (n, image) in images.iter_mut().enumerate() {
        image.create_dt = base_time() + Duration::minutes(n as i64);
    }

    DataFile {
        galleries,
        images,
        media: sample_catalog(),
    }
}

/// Store and catalog loaded from [`sample_data_file`].
pub fn sample_store() -> (MemoryStore, MediaCatalog) {
    let data = sample_data_file();
    let store = MemoryStore::from_records(data.galleries, data.images).unwrap();
    (store, data.media)
}
