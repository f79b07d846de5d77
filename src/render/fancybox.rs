//! Grid-of-links renderer for the Fancybox lightbox.
//!
//! ## Output
//!
//! ```html
//! <div id="zul-gallery-42" class="zul-gallery zul-gallery-columns-3 extra" data-gallery-id="42">
//!   <div class="zul-gallery-item">
//!     <a class="zul-gallery-link" href="FULL" data-fancybox="zul-gallery-42" data-caption="DESCRIPTION">
//!       <img class="zul-gallery-image" src="THUMB" srcset="SRCSET" alt="ALT" loading="lazy">
//!     </a>
//!     <span class="zul-gallery-caption">TITLE</span>   <!-- only with captions on -->
//!   </div>
//! </div>
//! ```
//!
//! `srcset` is present only when the image source offers candidates.
//!
//! The `data-fancybox` value groups every link of one gallery into a single
//! lightbox slideshow; two galleries on one page never bleed into each other.

use super::{GalleryRenderer, RenderOptions, RequiredAssets};
use crate::metadata::safe_url;
use crate::sources::ResolvedImage;
use crate::types::Gallery;
use maud::{Markup, html};

pub const MIN_COLUMNS: i64 = 1;
pub const MAX_COLUMNS: i64 = 6;

/// Style and script handle for the Fancybox library itself.
pub const FANCYBOX_HANDLE: &str = "fancybox";
/// Style and script handle for the gallery's own frontend files.
pub const FRONTEND_HANDLE: &str = "zul-gallery-frontend";

#[derive(Debug, Clone, Copy, Default)]
pub struct FancyboxRenderer;

impl FancyboxRenderer {
    pub const ID: &'static str = "fancybox";
}

/// Clamp a requested column count into `MIN_COLUMNS..=MAX_COLUMNS`.
pub fn clamp_columns(columns: i64) -> i64 {
    columns.clamp(MIN_COLUMNS, MAX_COLUMNS)
}

/// Lightbox group / container id for a gallery.
fn group_id(gallery: &Gallery) -> String {
    format!("zul-gallery-{}", gallery.id.unwrap_or_default())
}

fn container_class(columns: i64, css_class: &str) -> String {
    let mut class = format!("zul-gallery zul-gallery-columns-{columns}");
    let extra = css_class.trim();
    if !extra.is_empty() {
        class.push(' ');
        class.push_str(extra);
    }
    class
}

/// The `srcset` if every candidate URL survives [`safe_url`].
fn safe_srcset(srcset: &str) -> Option<String> {
    let srcset = srcset.trim();
    if srcset.is_empty() {
        return None;
    }
    srcset
        .split(',')
        .all(|candidate| {
            let url = candidate.split_whitespace().next().unwrap_or_default();
            !safe_url(url).is_empty()
        })
        .then(|| srcset.to_string())
}

fn render_item(item: &ResolvedImage<'_>, group: &str, show_captions: bool) -> Markup {
    let url = safe_url(&item.url);
    let thumbnail = match safe_url(&item.thumbnail) {
        t if t.is_empty() => url.clone(),
        t => t,
    };
    let srcset = safe_srcset(&item.srcset);
    let caption = item.image.description.as_deref().unwrap_or_default();
    let title = item.image.title.as_deref().unwrap_or_default();

    html! {
        div.zul-gallery-item {
            a.zul-gallery-link href=(url) data-fancybox=(group) data-caption=(caption) {
                img.zul-gallery-image src=(thumbnail) srcset=[srcset] alt=(item.alt) loading="lazy";
            }
            @if show_captions && !title.is_empty() {
                span.zul-gallery-caption { (title) }
            }
        }
    }
}

impl GalleryRenderer for FancyboxRenderer {
    fn id(&self) -> &str {
        Self::ID
    }

    fn render(
        &self,
        gallery: &Gallery,
        images: &[ResolvedImage<'_>],
        options: &RenderOptions,
    ) -> String {
        if images.is_empty() {
            return String::new();
        }

        let columns = clamp_columns(options.columns);
        let group = group_id(gallery);
        let markup = html! {
            div id=(group)
                class=(container_class(columns, &options.css_class))
                data-gallery-id=(gallery.id.unwrap_or_default()) {
                @for item in images {
                    (render_item(item, &group, options.show_captions))
                }
            }
        };
        markup.into_string()
    }

    fn required_assets(&self) -> RequiredAssets {
        RequiredAssets {
            styles: vec![FANCYBOX_HANDLE, FRONTEND_HANDLE],
            scripts: vec![FANCYBOX_HANDLE, FRONTEND_HANDLE],
        }
    }
}
