//! Renderer registry and per-request renderer choice.
//!
//! ## Resolution
//!
//! ```text
//! requested id ─┐
//!               ├─ (none) → default id
//!               ▼
//!          override hook        (identity unless installed)
//!               ▼
//!     registered? ── yes → that renderer
//!               │ no
//!               ▼
//!     default registered? ── yes → default renderer
//!               │ no
//!               ▼
//!      RenderError::NoRendererAvailable
//! ```
//!
//! An unknown requested id is never an error: the default stands in. Only a
//! missing default is, and that means the registry was misconfigured.

use super::fancybox::FancyboxRenderer;
use super::GalleryRenderer;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Renderer '{0}' not found")]
    UnknownRenderer(String),
    #[error("No renderer available: default renderer '{0}' is not registered")]
    NoRendererAvailable(String),
}

/// Override point for the renderer choice: receives the proposed id and
/// returns the id to look up.
pub type RendererHook = Box<dyn Fn(&str) -> String + Send + Sync>;

pub struct RendererResolver {
    renderers: BTreeMap<String, Box<dyn GalleryRenderer>>,
    default_id: String,
    hook: Option<RendererHook>,
}

impl Default for RendererResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RendererResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererResolver")
            .field("renderers", &self.renderers.keys().collect::<Vec<_>>())
            .field("default_id", &self.default_id)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

impl RendererResolver {
    /// Resolver with the Fancybox renderer registered as the default.
    pub fn new() -> Self {
        let mut resolver = Self::empty(FancyboxRenderer::ID);
        resolver.register(FancyboxRenderer);
        resolver
    }

    /// Resolver with nothing registered and `default_id` as the default.
    pub fn empty(default_id: impl Into<String>) -> Self {
        Self {
            renderers: BTreeMap::new(),
            default_id: default_id.into(),
            hook: None,
        }
    }

    /// Install the override hook, replacing any previous one.
    pub fn with_hook(mut self, hook: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    /// Store a renderer under its id, replacing any earlier one with that id.
    pub fn register(&mut self, renderer: impl GalleryRenderer + 'static) {
        self.renderers
            .insert(renderer.id().to_string(), Box::new(renderer));
    }

    /// Remove a renderer. Removing the default leaves the registry unable to
    /// fall back until a new default is set.
    pub fn unregister(&mut self, id: &str) -> Option<Box<dyn GalleryRenderer>> {
        self.renderers.remove(id)
    }

    pub fn set_default(&mut self, id: &str) -> Result<(), RenderError> {
        if !self.renderers.contains_key(id) {
            return Err(RenderError::UnknownRenderer(id.to_string()));
        }
        self.default_id = id.to_string();
        Ok(())
    }

    pub fn default_id(&self) -> &str {
        &self.default_id
    }

    /// Pick the renderer for a request.
    pub fn resolve(&self, requested: Option<&str>) -> Result<&dyn GalleryRenderer, RenderError> {
        let proposed = requested.unwrap_or(self.default_id.as_str());
        let chosen = match &self.hook {
            Some(hook) => hook(proposed),
            None => proposed.to_string(),
        };

        self.renderers
            .get(&chosen)
            .or_else(|| self.renderers.get(&self.default_id))
            .map(|renderer| &**renderer)
            .ok_or_else(|| RenderError::NoRendererAvailable(self.default_id.clone()))
    }

    pub fn has_renderer(&self, id: &str) -> bool {
        self.renderers.contains_key(id)
    }

    /// Registered ids, sorted.
    pub fn list_available(&self) -> Vec<&str> {
        self.renderers.keys().map(String::as_str).collect()
    }
}
