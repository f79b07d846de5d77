//! CLI output formatting.
//!
//! # Entity Display Contract
//!
//! Every entity follows the same two-level pattern:
//!
//! 1. **Header line**: positional index + title (+ optional image count)
//! 2. **Context lines**: indented `Id:`, `Status:`, `Source:`, URLs, errors
//!
//! # Output Format
//!
//! ## List
//!
//! ```text
//! Galleries
//! 001 Harbor (2 images)
//!     Id: 1
//!     Status: Active
//!     Source: WordPress Media Library
//!     Description: Boats at first light
//! 002 Archive (1 image)
//!     Id: 2
//!     Status: Inactive
//!     Source: WordPress Media Library
//! ```
//!
//! ## Show
//!
//! ```text
//! Harbor
//!     Id: 1
//!     Status: Active
//! Images
//! 001 Dawn
//!     Status: Active
//!     Source: media-library (asset 123)
//!     Full: https://site.test/uploads/dawn.jpg
//!     Thumbnail: https://site.test/uploads/dawn-300x200.jpg
//!     Alt: Dawn
//! 002 (no source)
//!     Status: Active
//!     Error: No image source can serve image #7
//! ```
//!
//! ## Renderers
//!
//! ```text
//! Renderers
//!     fancybox (default)
//!     masonry
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure.

use crate::render::RendererResolver;
use crate::sources::{ResolvedImage, SourceError, SourceResolver};
use crate::types::{Gallery, GalleryImage};

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural_images(count: usize) -> String {
    match count {
        1 => "1 image".to_string(),
        n => format!("{n} images"),
    }
}

/// Format an entity header: positional index + title, with optional count.
///
/// ```text
/// 001 Harbor (2 images)
/// 001 Harbor
/// ```
fn entity_header(index: usize, title: &str, count: Option<usize>) -> String {
    match count {
        Some(n) => format!("{} {} ({})", format_index(index), title, plural_images(n)),
        None => format!("{} {}", format_index(index), title),
    }
}

/// Where an image's bytes come from, for display.
fn image_origin(image: &GalleryImage) -> String {
    match (image.attachment_id, image.attachment_url.as_deref()) {
        (Some(asset), _) => format!("asset {asset}"),
        (None, Some(url)) => url.to_string(),
        (None, None) => "no source".to_string(),
    }
}

/// Format an image line: titled images show the title, untitled show their
/// origin in parens.
///
/// ```text
/// 001 Dawn
/// 002 (https://cdn.example.com/pier.jpg)
/// ```
fn image_line(index: usize, image: &GalleryImage) -> String {
    match image.title.as_deref() {
        Some(t) if !t.trim().is_empty() => format!("{} {}", format_index(index), t),
        _ => format!("{} ({})", format_index(index), image_origin(image)),
    }
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}...")
    }
}

/// Display value for a URL that may be unavailable.
fn url_or_missing(url: &str) -> &str {
    if url.is_empty() { "(unavailable)" } else { url }
}

// ============================================================================
// List
// ============================================================================

/// Format the gallery list. Each entry pairs a gallery with its image count.
pub fn format_gallery_list(galleries: &[(Gallery, usize)]) -> Vec<String> {
    let mut lines = vec!["Galleries".to_string()];
    if galleries.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
        return lines;
    }

    for (i, (gallery, count)) in galleries.iter().enumerate() {
        lines.push(entity_header(i + 1, &gallery.title, Some(*count)));
        lines.push(format!("{}Id: {}", indent(1), gallery.id.unwrap_or_default()));
        lines.push(format!("{}Status: {}", indent(1), gallery.status.label()));
        lines.push(format!("{}Source: {}", indent(1), gallery.source.label()));
        if let Some(desc) = gallery.description.as_deref().filter(|d| !d.trim().is_empty()) {
            lines.push(format!("{}Description: {}", indent(1), truncate_desc(desc, 60)));
        }
    }
    lines
}

pub fn print_gallery_list(galleries: &[(Gallery, usize)]) {
    for line in format_gallery_list(galleries) {
        println!("{}", line);
    }
}

// ============================================================================
// Show
// ============================================================================

/// Format one gallery with every image and how it resolves.
pub fn format_gallery_detail(
    gallery: &Gallery,
    images: &[GalleryImage],
    resolver: &SourceResolver,
    size: &str,
    thumbnail_size: &str,
) -> Vec<String> {
    let mut lines = vec![gallery.title.clone()];
    lines.push(format!("{}Id: {}", indent(1), gallery.id.unwrap_or_default()));
    lines.push(format!("{}Status: {}", indent(1), gallery.status.label()));

    lines.push("Images".to_string());
    if images.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
        return lines;
    }

    for (i, image) in images.iter().enumerate() {
        lines.push(image_line(i + 1, image));
        lines.push(format!("{}Status: {}", indent(1), image.status.label()));
        let source = resolver.resolve(image).map(|s| s.name().to_string());
        let resolved = resolver.resolve_one(image, size, thumbnail_size);
        lines.extend(format_resolution(image, source, resolved));
    }
    lines
}

fn format_resolution(
    image: &GalleryImage,
    source: Result<String, SourceError>,
    resolved: Result<ResolvedImage<'_>, SourceError>,
) -> Vec<String> {
    match (source, resolved) {
        (Ok(name), Ok(resolved)) => {
            let mut lines = vec![format!("{}Source: {} ({})", indent(1), name, image_origin(image))];
            lines.push(format!("{}Full: {}", indent(1), url_or_missing(&resolved.url)));
            if resolved.thumbnail != resolved.url {
                lines.push(format!(
                    "{}Thumbnail: {}",
                    indent(1),
                    url_or_missing(&resolved.thumbnail)
                ));
            }
            if !resolved.alt.is_empty() {
                lines.push(format!("{}Alt: {}", indent(1), resolved.alt));
            }
            lines
        }
        (Err(err), _) | (_, Err(err)) => vec![format!("{}Error: {}", indent(1), err)],
    }
}

pub fn print_gallery_detail(
    gallery: &Gallery,
    images: &[GalleryImage],
    resolver: &SourceResolver,
    size: &str,
    thumbnail_size: &str,
) {
    for line in format_gallery_detail(gallery, images, resolver, size, thumbnail_size) {
        println!("{}", line);
    }
}

// ============================================================================
// Renderers
// ============================================================================

/// Format the registered renderer ids, marking the default.
pub fn format_renderers(renderers: &RendererResolver) -> Vec<String> {
    let mut lines = vec!["Renderers".to_string()];
    for id in renderers.list_available() {
        if id == renderers.default_id() {
            lines.push(format!("{}{} (default)", indent(1), id));
        } else {
            lines.push(format!("{}{}", indent(1), id));
        }
    }
    if !renderers.has_renderer(renderers.default_id()) {
        lines.push(format!(
            "{}Warning: default '{}' is not registered",
            indent(1),
            renderers.default_id()
        ));
    }
    lines
}

pub fn print_renderers(renderers: &RendererResolver) {
    for line in format_renderers(renderers) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
