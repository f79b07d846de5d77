//! Gallery configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. User values are
//! merged on top of stock defaults, so a config file only needs the keys it
//! wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [display]
//! columns = 3               # Grid columns (1-6)
//! size = "full"             # Size token for the lightbox image
//! thumbnail_size = "medium" # Size token for the grid thumbnail
//! show_captions = true
//! orderby = "create_dt"     # id, title, status, create_dt, modified_dt
//! order = "ASC"             # ASC or DESC
//! # limit = 12              # Omit for all images
//! class = ""                # Extra CSS classes on the gallery container
//!
//! [renderer]
//! default = "fancybox"
//!
//! [assets]
//! fancybox_css = "https://cdn.jsdelivr.net/npm/@fancyapps/ui@5.0/dist/fancybox/fancybox.css"
//! fancybox_js = "https://cdn.jsdelivr.net/npm/@fancyapps/ui@5.0/dist/fancybox/fancybox.umd.js"
//! frontend_css = "assets/css/frontend-gallery.css"
//! frontend_js = "assets/js/frontend-gallery.js"
//!
//! [embed]
//! batch = "skip"            # skip or abort on an unresolvable image
//!
//! [theme]
//! gap = "1rem"              # Gap between grid items
//! caption_size = "0.875rem"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::render::fancybox::{FANCYBOX_HANDLE, FRONTEND_HANDLE, MAX_COLUMNS, MIN_COLUMNS};
use crate::sources::{DEFAULT_SIZE, DEFAULT_THUMBNAIL_SIZE};
use crate::store::{SortField, SortOrder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Gallery configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Display defaults for directives that leave an attribute out.
    pub display: DisplayConfig,
    /// Renderer selection.
    pub renderer: RendererConfig,
    /// URLs for the style and script handles renderers ask for.
    pub assets: AssetsConfig,
    /// Embedding behavior.
    pub embed: EmbedConfig,
    /// Grid styling for standalone pages.
    pub theme: ThemeConfig,
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_COLUMNS..=MAX_COLUMNS).contains(&self.display.columns) {
            return Err(ConfigError::Validation(format!(
                "display.columns must be {MIN_COLUMNS}-{MAX_COLUMNS}"
            )));
        }
        if self.display.orderby == SortField::Source {
            return Err(ConfigError::Validation(
                "display.orderby must be one of id, title, status, create_dt, modified_dt".into(),
            ));
        }
        if self.display.limit == Some(0) {
            return Err(ConfigError::Validation(
                "display.limit must be at least 1; omit it to show all images".into(),
            ));
        }
        if self.display.size.trim().is_empty() || self.display.thumbnail_size.trim().is_empty() {
            return Err(ConfigError::Validation(
                "display.size and display.thumbnail_size must not be empty".into(),
            ));
        }
        if self.renderer.default.trim().is_empty() {
            return Err(ConfigError::Validation(
                "renderer.default must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Display defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    pub columns: i64,
    /// Size token for the full-size (lightbox) image.
    pub size: String,
    /// Size token for the grid thumbnail.
    pub thumbnail_size: String,
    pub show_captions: bool,
    pub orderby: SortField,
    pub order: SortOrder,
    /// Maximum images per gallery. Absent means all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Extra CSS classes on the gallery container.
    pub class: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            columns: 3,
            size: DEFAULT_SIZE.to_string(),
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE.to_string(),
            show_captions: true,
            orderby: SortField::CreateDt,
            order: SortOrder::Asc,
            limit: None,
            class: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RendererConfig {
    /// Renderer id used when a directive names none (or an unknown one).
    pub default: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            default: "fancybox".to_string(),
        }
    }
}

/// Asset URLs keyed by the handles renderers declare.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetsConfig {
    pub fancybox_css: String,
    pub fancybox_js: String,
    pub frontend_css: String,
    pub frontend_js: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            fancybox_css:
                "https://cdn.jsdelivr.net/npm/@fancyapps/ui@5.0/dist/fancybox/fancybox.css"
                    .to_string(),
            fancybox_js:
                "https://cdn.jsdelivr.net/npm/@fancyapps/ui@5.0/dist/fancybox/fancybox.umd.js"
                    .to_string(),
            frontend_css: "assets/css/frontend-gallery.css".to_string(),
            frontend_js: "assets/js/frontend-gallery.js".to_string(),
        }
    }
}

impl AssetsConfig {
    /// Stylesheet URL for a handle, or `None` for an unknown handle.
    pub fn style_url(&self, handle: &str) -> Option<&str> {
        match handle {
            FANCYBOX_HANDLE => Some(&self.fancybox_css),
            FRONTEND_HANDLE => Some(&self.frontend_css),
            _ => None,
        }
    }

    /// Script URL for a handle, or `None` for an unknown handle.
    pub fn script_url(&self, handle: &str) -> Option<&str> {
        match handle {
            FANCYBOX_HANDLE => Some(&self.fancybox_js),
            FRONTEND_HANDLE => Some(&self.frontend_js),
            _ => None,
        }
    }
}

/// What to do when one image of a gallery cannot be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchPolicy {
    /// Leave the image out and render the rest.
    #[default]
    Skip,
    /// Fail the whole gallery.
    Abort,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmbedConfig {
    pub batch: BatchPolicy,
}

/// Grid styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    /// Gap between grid items (CSS value).
    pub gap: String,
    /// Caption font size (CSS value).
    pub caption_size: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            gap: "1rem".to_string(),
            caption_size: "0.875rem".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(GalleryConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<GalleryConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: GalleryConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from a `config.toml` path, falling back to stock defaults when
/// the file is missing.
pub fn load_config(path: &Path) -> Result<GalleryConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(path)?)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Zul Gallery Configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Display defaults (used when a directive leaves an attribute out)
# ---------------------------------------------------------------------------
[display]
# Grid columns, 1 to 6.
columns = 3

# Size token for the image opened in the lightbox.
size = "full"

# Size token for the grid thumbnail.
thumbnail_size = "medium"

# Show image titles under thumbnails.
show_captions = true

# Image order: id, title, status, create_dt, modified_dt.
orderby = "create_dt"

# ASC or DESC.
order = "ASC"

# Maximum images per gallery. Omit to show all.
# limit = 12

# Extra CSS classes on the gallery container.
class = ""

# ---------------------------------------------------------------------------
# Renderer
# ---------------------------------------------------------------------------
[renderer]
# Used when a directive names no renderer, or one that is not registered.
default = "fancybox"

# ---------------------------------------------------------------------------
# Asset URLs
# ---------------------------------------------------------------------------
[assets]
fancybox_css = "https://cdn.jsdelivr.net/npm/@fancyapps/ui@5.0/dist/fancybox/fancybox.css"
fancybox_js = "https://cdn.jsdelivr.net/npm/@fancyapps/ui@5.0/dist/fancybox/fancybox.umd.js"
frontend_css = "assets/css/frontend-gallery.css"
frontend_js = "assets/js/frontend-gallery.js"

# ---------------------------------------------------------------------------
# Embedding
# ---------------------------------------------------------------------------
[embed]
# What to do when an image has neither a media asset nor a URL:
#   "skip"  - leave it out and render the rest (logged as a warning)
#   "abort" - fail the whole gallery
batch = "skip"

# ---------------------------------------------------------------------------
# Theme (standalone pages)
# ---------------------------------------------------------------------------
[theme]
# Gap between grid items (CSS value).
gap = "1rem"

# Caption font size (CSS value).
caption_size = "0.875rem"
"##
}

/// Generate the grid CSS for standalone pages, one rule per column count.
pub fn generate_grid_css(theme: &ThemeConfig) -> String {
    let mut css = format!(
        r#".zul-gallery {{
    display: grid;
    gap: {gap};
}}
.zul-gallery-image {{
    display: block;
    width: 100%;
    height: auto;
}}
.zul-gallery-caption {{
    display: block;
    font-size: {caption_size};
}}"#,
        gap = theme.gap,
        caption_size = theme.caption_size,
    );
    for columns in MIN_COLUMNS..=MAX_COLUMNS {
        css.push_str(&format!(
            "\n.zul-gallery-columns-{columns} {{ grid-template-columns: repeat({columns}, 1fr); }}"
        ));
    }
    css
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_display() {
        let config = GalleryConfig::default();
        assert_eq!(config.display.columns, 3);
        assert_eq!(config.display.size, "full");
        assert_eq!(config.display.thumbnail_size, "medium");
        assert!(config.display.show_captions);
        assert_eq!(config.display.orderby, SortField::CreateDt);
        assert_eq!(config.display.order, SortOrder::Asc);
        assert_eq!(config.display.limit, None);
        assert_eq!(config.display.class, "");
    }

    #[test]
    fn default_config_renderer_and_batch() {
        let config = GalleryConfig::default();
        assert_eq!(config.renderer.default, "fancybox");
        assert_eq!(config.embed.batch, BatchPolicy::Skip);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[display]
columns = 4
"#;
        let config: GalleryConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.display.columns, 4);
        // Defaults preserved
        assert_eq!(config.display.thumbnail_size, "medium");
        assert_eq!(config.renderer.default, "fancybox");
    }

    #[test]
    fn parse_ordering_and_limit() {
        let toml = r#"
[display]
orderby = "title"
order = "DESC"
limit = 12
"#;
        let config: GalleryConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.display.orderby, SortField::Title);
        assert_eq!(config.display.order, SortOrder::Desc);
        assert_eq!(config.display.limit, Some(12));
    }

    #[test]
    fn parse_batch_policy() {
        let toml = r#"
[embed]
batch = "abort"
"#;
        let config: GalleryConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.embed.batch, BatchPolicy::Abort);
    }

    #[test]
    fn assets_map_handles_to_urls() {
        let assets = AssetsConfig::default();
        assert!(assets.style_url("fancybox").unwrap().ends_with("fancybox.css"));
        assert!(assets.script_url("fancybox").unwrap().ends_with("fancybox.umd.js"));
        assert_eq!(
            assets.style_url("zul-gallery-frontend"),
            Some("assets/css/frontend-gallery.css")
        );
        assert_eq!(assets.script_url("unknown"), None);
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("config.toml")).unwrap();
        assert_eq!(config, GalleryConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            r#"
[display]
columns = 5
class = "wide"

[renderer]
default = "masonry"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.display.columns, 5);
        assert_eq!(config.display.class, "wide");
        assert_eq!(config.renderer.default, "masonry");
        // Unspecified values should be defaults
        assert_eq!(config.display.size, "full");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "this is not valid toml [[[").unwrap();

        let result = load_config(&path);
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    // =========================================================================
    // CSS generation tests
    // =========================================================================

    #[test]
    fn generate_grid_css_uses_theme() {
        let theme = ThemeConfig {
            gap: "2px".to_string(),
            ..ThemeConfig::default()
        };
        let css = generate_grid_css(&theme);
        assert!(css.contains("gap: 2px"));
        assert!(css.contains("font-size: 0.875rem"));
    }

    #[test]
    fn generate_grid_css_covers_every_column_count() {
        let css = generate_grid_css(&ThemeConfig::default());
        for columns in 1..=6 {
            assert!(css.contains(&format!(
                ".zul-gallery-columns-{columns} {{ grid-template-columns: repeat({columns}, 1fr); }}"
            )));
        }
        assert!(!css.contains("zul-gallery-columns-7"));
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"columns = 3"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"columns = 5"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("columns").unwrap().as_integer(), Some(5));
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[display]
columns = 3
size = "full"
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[display]
columns = 2
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let display = merged.get("display").unwrap();
        assert_eq!(display.get("columns").unwrap().as_integer(), Some(2));
        // size preserved from base
        assert_eq!(display.get("size").unwrap().as_str(), Some("full"));
    }

    #[test]
    fn merge_toml_preserves_base_keys() {
        let base: toml::Value = toml::from_str(
            r#"
a = 1
b = 2
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(r#"a = 10"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("a").unwrap().as_integer(), Some(10));
        assert_eq!(merged.get("b").unwrap().as_integer(), Some(2));
    }

    #[test]
    fn merge_toml_adds_optional_key_missing_from_base() {
        let base = stock_defaults_value();
        assert!(base.get("display").unwrap().get("limit").is_none());
        let overlay: toml::Value = toml::from_str(
            r#"
[display]
limit = 4
"#,
        )
        .unwrap();
        let config = resolve_config(base, Some(overlay)).unwrap();
        assert_eq!(config.display.limit, Some(4));
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let toml_str = r#"
[display]
colums = 4
"#;
        let result: Result<GalleryConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let toml_str = r#"
[displays]
columns = 4
"#;
        let result: Result<GalleryConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_enum_value_rejected() {
        let toml_str = r#"
[embed]
batch = "retry"
"#;
        let result: Result<GalleryConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());

        let toml_str = r#"
[display]
order = "SIDEWAYS"
"#;
        let result: Result<GalleryConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(GalleryConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_limit() {
        let mut config = GalleryConfig::default();
        config.display.limit = Some(1);
        assert!(config.validate().is_ok());

        config.display.limit = Some(0);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("display.limit"));
    }

    #[test]
    fn validate_columns_boundaries() {
        let mut config = GalleryConfig::default();
        config.display.columns = 1;
        assert!(config.validate().is_ok());
        config.display.columns = 6;
        assert!(config.validate().is_ok());

        config.display.columns = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("columns"));

        config.display.columns = 7;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_gallery_only_sort_column() {
        let mut config = GalleryConfig::default();
        config.display.orderby = SortField::Source;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_empty_renderer() {
        let mut config = GalleryConfig::default();
        config.renderer.default = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_size_token() {
        let mut config = GalleryConfig::default();
        config.display.thumbnail_size = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            r#"
[display]
columns = 12
"#,
        )
        .unwrap();

        let result = load_config(&path);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // resolve_config / load_raw_config tests
    // =========================================================================

    #[test]
    fn load_raw_config_returns_none_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let result = load_raw_config(&tmp.path().join("config.toml")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn resolve_config_with_no_overlay() {
        let config = resolve_config(stock_defaults_value(), None).unwrap();
        assert_eq!(config, GalleryConfig::default());
    }

    #[test]
    fn resolve_config_rejects_invalid_values() {
        let overlay: toml::Value = toml::from_str(
            r#"
[display]
columns = 0
"#,
        )
        .unwrap();
        let result = resolve_config(stock_defaults_value(), Some(overlay));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_is_valid_toml() {
        let content = stock_config_toml();
        let _: toml::Value = toml::from_str(content).expect("stock config must be valid TOML");
    }

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: GalleryConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, GalleryConfig::default());
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        for section in ["[display]", "[renderer]", "[assets]", "[embed]", "[theme]"] {
            assert!(content.contains(section), "missing {section}");
        }
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        assert!(val.is_table());
        for section in ["display", "renderer", "assets", "embed", "theme"] {
            assert!(val.get(section).is_some(), "missing {section}");
        }
    }
}
