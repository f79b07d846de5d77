//! `[zul_gallery ...]` directives.
//!
//! A directive embeds one gallery in page text:
//!
//! ```text
//! [zul_gallery id=3 columns="4" class='wide dark' show_captions=no renderer=masonry]
//! ```
//!
//! Attribute values may be bare, single-quoted, or double-quoted. Names are
//! case-insensitive and unknown names are ignored. Anything left out takes its
//! value from the `[display]` config section. A doubled bracket
//! (`[[zul_gallery id=3]]`) escapes the directive and renders it literally.

use crate::config::DisplayConfig;
use crate::metadata::{sanitize_html_class, sanitize_text};
use crate::render::RenderOptions;
use crate::store::{ImageFilter, SortField, SortOrder};
use std::collections::BTreeMap;
use std::ops::Range;
use thiserror::Error;

/// Directive name.
pub const TAG: &str = "zul_gallery";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShortcodeError {
    #[error("Gallery ID is required.")]
    MissingGalleryId,
}

/// Typed display options for one embedded gallery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayOptions {
    pub gallery_id: u64,
    /// Requested columns; the renderer clamps.
    pub columns: i64,
    /// `None` shows every active image.
    pub limit: Option<usize>,
    pub class: String,
    pub orderby: SortField,
    pub order: SortOrder,
    pub size: String,
    pub thumbnail_size: String,
    pub show_captions: bool,
    /// Requested renderer id; `None` uses the default.
    pub renderer: Option<String>,
}

impl DisplayOptions {
    /// Options for `gallery_id` with every other value from config.
    pub fn for_gallery(gallery_id: u64, defaults: &DisplayConfig) -> Self {
        Self {
            gallery_id,
            columns: defaults.columns,
            limit: defaults.limit,
            class: sanitize_html_class(&defaults.class),
            orderby: defaults.orderby,
            order: defaults.order,
            size: defaults.size.clone(),
            thumbnail_size: defaults.thumbnail_size.clone(),
            show_captions: defaults.show_captions,
            renderer: None,
        }
    }

    /// Build options from parsed directive attributes.
    pub fn from_attributes(
        attributes: &BTreeMap<String, String>,
        defaults: &DisplayConfig,
    ) -> Result<Self, ShortcodeError> {
        let gallery_id = attributes.get("id").map(|v| absint(v)).unwrap_or(0);
        if gallery_id == 0 {
            return Err(ShortcodeError::MissingGalleryId);
        }

        let mut options = Self::for_gallery(gallery_id, defaults);
        if let Some(columns) = attributes.get("columns") {
            options.columns = i64::try_from(absint(columns)).unwrap_or(i64::MAX);
        }
        if let Some(limit) = attributes.get("limit") {
            options.limit = parse_limit(limit);
        }
        if let Some(class) = attributes.get("class") {
            options.class = sanitize_html_class(class);
        }
        if let Some(orderby) = attributes.get("orderby") {
            options.orderby = SortField::from_str_lossy(&sanitize_text(orderby));
        }
        if let Some(order) = attributes.get("order") {
            options.order = SortOrder::from_str_or(&sanitize_text(order), SortOrder::Asc);
        }
        if let Some(size) = non_empty_text(attributes.get("size")) {
            options.size = size;
        }
        if let Some(size) = non_empty_text(attributes.get("thumbnail_size")) {
            options.thumbnail_size = size;
        }
        if let Some(captions) = attributes.get("show_captions") {
            options.show_captions = captions.trim() == "yes";
        }
        options.renderer = non_empty_text(attributes.get("renderer"));
        Ok(options)
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            columns: self.columns,
            css_class: self.class.clone(),
            show_captions: self.show_captions,
        }
    }

    /// Filter selecting the images this gallery shows.
    pub fn image_filter(&self) -> ImageFilter {
        ImageFilter::active(self.orderby, self.order)
    }
}

/// Signed integer from the leading digits of `value`, saturating at the
/// `i64` bounds. No digits is 0.
fn leading_int(value: &str) -> i64 {
    let trimmed = value.trim();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |n, d| n.saturating_mul(10).saturating_add(i64::from(d - b'0')));
    if negative { -magnitude } else { magnitude }
}

/// Absolute integer value; anything unparseable is 0.
fn absint(value: &str) -> u64 {
    leading_int(value).unsigned_abs()
}

/// Positive limits cap the image count; zero, negative, or garbage means all.
fn parse_limit(value: &str) -> Option<usize> {
    match leading_int(value) {
        n if n > 0 => usize::try_from(n).ok(),
        _ => None,
    }
}

fn non_empty_text(value: Option<&String>) -> Option<String> {
    value.map(|v| sanitize_text(v)).filter(|v| !v.is_empty())
}

/// Parse the attribute part of a directive (`id=3 columns="4"`).
///
/// Bare words without `=` are ignored. Later duplicates win.
pub fn parse_attributes(input: &str) -> BTreeMap<String, String> {
    let mut attributes = BTreeMap::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        // Name
        let mut name_end = start;
        while let Some(&(i, c)) = chars.peek() {
            if c.is_whitespace() || c == '=' {
                break;
            }
            name_end = i + c.len_utf8();
            chars.next();
        }
        let name = input[start..name_end].to_ascii_lowercase();

        while chars.peek().is_some_and(|&(_, c)| c.is_whitespace()) {
            chars.next();
        }
        if chars.peek().is_none_or(|&(_, c)| c != '=') {
            continue;
        }
        chars.next();
        while chars.peek().is_some_and(|&(_, c)| c.is_whitespace()) {
            chars.next();
        }

        // Value
        let value = match chars.peek().copied() {
            Some((i, quote @ ('"' | '\''))) => {
                chars.next();
                let value_start = i + 1;
                let mut value_end = input.len();
                for (j, c) in chars.by_ref() {
                    if c == quote {
                        value_end = j;
                        break;
                    }
                }
                &input[value_start..value_end]
            }
            Some((i, _)) => {
                let mut value_end = input.len();
                while let Some(&(j, c)) = chars.peek() {
                    if c.is_whitespace() {
                        value_end = j;
                        break;
                    }
                    chars.next();
                }
                &input[i..value_end]
            }
            None => "",
        };

        if !name.is_empty() {
            attributes.insert(name, value.to_string());
        }
    }

    attributes
}

/// One directive found in page text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Byte range of the whole directive, brackets included.
    pub range: Range<usize>,
    pub attributes: BTreeMap<String, String>,
    /// Doubled-bracket form; renders as the literal inner directive.
    pub escaped: bool,
}

/// Find every directive in `text`, in order. Unterminated directives are left
/// alone.
pub fn find_directives(text: &str) -> Vec<Directive> {
    let opener = format!("[{TAG}");
    let mut directives = Vec::new();
    let mut cursor = 0;

    while let Some(found) = text[cursor..].find(&opener) {
        let start = cursor + found;
        let after_name = start + opener.len();
        let boundary = text[after_name..].chars().next();
        if !matches!(boundary, Some(c) if c.is_whitespace() || c == ']' || c == '/') {
            cursor = after_name;
            continue;
        }
        let Some(close) = text[after_name..].find(']') else {
            break;
        };
        let end = after_name + close + 1;
        let body = text[after_name..end - 1].trim_end();
        let body = body.strip_suffix('/').unwrap_or(body);

        let escaped = text[..start].ends_with('[') && text[end..].starts_with(']');
        let range = if escaped { start - 1..end + 1 } else { start..end };

        directives.push(Directive {
            range,
            attributes: parse_attributes(body),
            escaped,
        });
        cursor = end;
    }

    directives
}

/// Replace every directive in `text` with `render(directive)`.
///
/// Escaped directives become their literal single-bracket form without
/// calling `render`.
pub fn expand(text: &str, mut render: impl FnMut(&Directive) -> String) -> String {
    let mut output = String::with_capacity(text.len());
    let mut cursor = 0;

    for directive in find_directives(text) {
        output.push_str(&text[cursor..directive.range.start]);
        if directive.escaped {
            output.push_str(&text[directive.range.start + 1..directive.range.end - 1]);
        } else {
            output.push_str(&render(&directive));
        }
        cursor = directive.range.end;
    }
    output.push_str(&text[cursor..]);
    output
}
