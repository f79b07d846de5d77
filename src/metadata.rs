//! Text shaping shared by the source strategies, the renderers, and the
//! directive parser.
//!
//! ## Resolution priority
//!
//! Display text for an image is resolved from several optional sources. The
//! first non-empty value wins:
//!
//! - **Alt text** (managed asset): stored alt metadata → image title → `""`
//! - **Alt text** (external URL): image title → `""`
//!
//! ## Markup safety
//!
//! Maud escapes every interpolated value for its context (`&`, `<`, `>`, `"`),
//! which covers titles, descriptions, and class names. URLs need one more
//! step: a value can be perfectly escaped and still be a `javascript:` link.
//! [`safe_url`] drops any URL whose scheme is not on the allow list, so the
//! renderer emits an empty attribute instead.

use url::{ParseError, Url};

/// Resolve a text field from multiple sources.
///
/// Takes a list of optional values in priority order and returns the first
/// non-None, non-empty (after trimming) value.
///
/// ```text
/// alt: resolve(&[asset_alt, image_title])
/// ```
pub fn resolve(sources: &[Option<&str>]) -> Option<String> {
    sources
        .iter()
        .filter_map(|opt| {
            opt.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .next()
}

const ALLOWED_SCHEMES: &[&str] = &["http", "https", "ftp", "ftps", "mailto", "data"];

/// Filter a URL for use in an `href`/`src` attribute.
///
/// Relative URLs (`/uploads/a.jpg`, `a.jpg`, `//cdn/a.jpg`, `?p=1`, `#x`) pass
/// through. Absolute URLs pass only when their scheme is allowed; `data:` is
/// further limited to images. Anything else becomes an empty string.
pub fn safe_url(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        return String::new();
    }
    if url.chars().any(char::is_control) {
        return String::new();
    }

    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(ParseError::RelativeUrlWithoutBase) => return url.to_string(),
        Err(_) => return String::new(),
    };
    if !ALLOWED_SCHEMES.contains(&parsed.scheme()) {
        return String::new();
    }
    if parsed.scheme() == "data" && !parsed.path().to_ascii_lowercase().starts_with("image/") {
        return String::new();
    }
    url.to_string()
}

/// Sanitize a user-supplied CSS class list.
///
/// Each whitespace-separated token keeps only `A-Z a-z 0-9 _ -`; tokens that
/// end up empty are dropped. The result is space-joined.
pub fn sanitize_html_class(class: &str) -> String {
    class
        .split_whitespace()
        .map(|token| {
            token
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
                .collect::<String>()
        })
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Sanitize a single-line text field from a directive attribute.
///
/// Strips anything that looks like a tag, removes control characters, and
/// collapses runs of whitespace.
pub fn sanitize_text(value: &str) -> String {
    let mut stripped = String::with_capacity(value.len());
    let mut in_tag = false;
    for c in value.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if in_tag => {}
            c if c.is_control() => stripped.push(' '),
            c => stripped.push(c),
        }
    }
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // resolve() tests
    // =========================================================================

    #[test]
    fn resolve_picks_first_non_none() {
        assert_eq!(
            resolve(&[Some("Stored alt"), Some("Image title")]),
            Some("Stored alt".to_string())
        );
    }

    #[test]
    fn resolve_skips_none_and_blank() {
        assert_eq!(
            resolve(&[None, Some("   "), Some("Title")]),
            Some("Title".to_string())
        );
    }

    #[test]
    fn resolve_trims_winner() {
        assert_eq!(resolve(&[Some("  Dusk  ")]), Some("Dusk".to_string()));
    }

    #[test]
    fn resolve_all_empty_is_none() {
        assert_eq!(resolve(&[None, Some("")]), None);
        assert_eq!(resolve(&[]), None);
    }

    // =========================================================================
    // safe_url() tests
    // =========================================================================

    #[test]
    fn safe_url_keeps_http_and_https() {
        assert_eq!(safe_url("https://example.com/x.jpg"), "https://example.com/x.jpg");
        assert_eq!(safe_url("HTTP://example.com/x.jpg"), "HTTP://example.com/x.jpg");
    }

    #[test]
    fn safe_url_keeps_relative_urls() {
        assert_eq!(safe_url("/uploads/a.jpg"), "/uploads/a.jpg");
        assert_eq!(safe_url("//cdn.example.com/a.jpg"), "//cdn.example.com/a.jpg");
        assert_eq!(safe_url("a.jpg?v=1:2"), "a.jpg?v=1:2");
    }

    #[test]
    fn safe_url_rejects_script_schemes() {
        assert_eq!(safe_url("javascript:alert(1)"), "");
        assert_eq!(safe_url("  JavaScript:alert(1)"), "");
        assert_eq!(safe_url("vbscript:msgbox"), "");
    }

    #[test]
    fn safe_url_limits_data_to_images() {
        assert_eq!(safe_url("data:image/png;base64,AAAA"), "data:image/png;base64,AAAA");
        assert_eq!(safe_url("data:text/html,<script>"), "");
    }

    #[test]
    fn safe_url_drops_http_without_host() {
        assert_eq!(safe_url("http://@/x.jpg"), "");
        assert_eq!(safe_url("http://:80/x.jpg"), "");
        assert_eq!(safe_url("https://"), "");
    }

    #[test]
    fn safe_url_rejects_control_characters() {
        assert_eq!(safe_url("java\nscript:alert(1)"), "");
    }

    // =========================================================================
    // sanitize_html_class() / sanitize_text() tests
    // =========================================================================

    #[test]
    fn class_keeps_safe_tokens() {
        assert_eq!(sanitize_html_class("my-class  other_one"), "my-class other_one");
    }

    #[test]
    fn class_strips_quotes_and_markup() {
        assert_eq!(sanitize_html_class(r#"a"onclick=x b<c>"#), "aonclickx bc");
        assert_eq!(sanitize_html_class("!!! ok"), "ok");
    }

    #[test]
    fn text_strips_tags_and_collapses_whitespace() {
        assert_eq!(sanitize_text("  <b>create_dt</b>\t\n"), "create_dt");
        assert_eq!(sanitize_text("a   b"), "a b");
    }
}
