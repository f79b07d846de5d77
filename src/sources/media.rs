//! Host media library contract and the in-memory catalog behind the CLI.
//!
//! The [`MediaLibrary`] trait is the only surface the media-library strategy
//! sees: given an asset id and a size token it hands back a URL or nothing,
//! and given an asset id it hands back stored alt text or nothing. Missing
//! assets are not errors at this level; the store checks [`MediaLibrary::is_image`]
//! before it accepts a managed image.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-size URL generation and alt-text lookup for managed assets.
pub trait MediaLibrary: Send + Sync {
    /// URL of `asset` rendered at `size`, or `None` if the asset is gone or
    /// has no such size.
    fn image_url(&self, asset: u64, size: &str) -> Option<String>;

    /// Stored alt text for `asset`.
    fn alt_text(&self, asset: u64) -> Option<String>;

    /// Whether `asset` exists and is an image.
    fn is_image(&self, asset: u64) -> bool;

    /// Stored title of `asset`.
    fn title(&self, _asset: u64) -> Option<String> {
        None
    }

    /// Responsive `srcset` for `asset` at `size`. Libraries that cannot
    /// produce one return `None`.
    fn srcset(&self, _asset: u64, _size: &str) -> Option<String> {
        None
    }
}

/// One managed asset: its generated sizes and stored alt text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MediaAsset {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Absent means the asset is taken to be an image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    /// Size token → URL, e.g. `"medium" → ".../dawn-300x200.jpg"`.
    #[serde(default)]
    pub sizes: BTreeMap<String, String>,
    /// Pixel width of each size, used to build `srcset`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub widths: BTreeMap<String, u32>,
}

impl MediaAsset {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn with_size(mut self, size: impl Into<String>, url: impl Into<String>) -> Self {
        self.sizes.insert(size.into(), url.into());
        self
    }

    pub fn with_width(mut self, size: impl Into<String>, width: u32) -> Self {
        self.widths.insert(size.into(), width);
        self
    }

    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn is_image(&self) -> bool {
        self.mime_type
            .as_deref()
            .is_none_or(|mime| mime.starts_with("image/"))
    }
}

/// In-memory [`MediaLibrary`], loaded from the `media` array of the data file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<MediaAsset>", into = "Vec<MediaAsset>")]
pub struct MediaCatalog {
    assets: BTreeMap<u64, MediaAsset>,
}

impl MediaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an asset.
    pub fn insert(&mut self, asset: MediaAsset) {
        self.assets.insert(asset.id, asset);
    }

    pub fn remove(&mut self, id: u64) -> Option<MediaAsset> {
        self.assets.remove(&id)
    }

    pub fn get(&self, id: u64) -> Option<&MediaAsset> {
        self.assets.get(&id)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl From<Vec<MediaAsset>> for MediaCatalog {
    fn from(assets: Vec<MediaAsset>) -> Self {
        Self {
            assets: assets.into_iter().map(|a| (a.id, a)).collect(),
        }
    }
}

impl From<MediaCatalog> for Vec<MediaAsset> {
    fn from(catalog: MediaCatalog) -> Self {
        catalog.assets.into_values().collect()
    }
}

impl MediaLibrary for MediaCatalog {
    fn image_url(&self, asset: u64, size: &str) -> Option<String> {
        self.assets
            .get(&asset)
            .and_then(|a| a.sizes.get(size))
            .filter(|url| !url.is_empty())
            .cloned()
    }

    fn alt_text(&self, asset: u64) -> Option<String> {
        self.assets.get(&asset).and_then(|a| a.alt.clone())
    }

    fn is_image(&self, asset: u64) -> bool {
        self.assets.get(&asset).is_some_and(MediaAsset::is_image)
    }

    fn title(&self, asset: u64) -> Option<String> {
        self.assets.get(&asset).and_then(|a| a.title.clone())
    }

    /// Every size with a known width, narrowest first. A single candidate is
    /// not worth a `srcset`, and `size` must itself be one of the candidates.
    fn srcset(&self, asset: u64, size: &str) -> Option<String> {
        let asset = self.assets.get(&asset)?;
        if !asset.widths.contains_key(size) {
            return None;
        }
        let mut candidates: Vec<(u32, &str)> = asset
            .widths
            .iter()
            .filter_map(|(token, width)| asset.sizes.get(token).map(|url| (*width, url.as_str())))
            .collect();
        if candidates.len() < 2 {
            return None;
        }
        candidates.sort_by_key(|(width, _)| *width);
        Some(
            candidates
                .iter()
                .map(|(width, url)| format!("{url} {width}w"))
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}
