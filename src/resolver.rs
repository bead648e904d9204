//! Widget Resource Resolver
//!
//! Resolves widget template URIs (e.g. `ui://widget/board.html`) into
//! rendered markup through an [`AssetLoader`] collaborator. Resolution is
//! lazy and cached: the first request for a URI loads it, concurrent
//! requests for the same uncached URI coordinate on a single load, and
//! later requests are served byte-identical from cache until the entry is
//! invalidated by hand. A failed load is not cached, so a missing template
//! degrades only the requests that need it.

use {
    crate::error::{GatewayError, GatewayResult},
    async_trait::async_trait,
    dashmap::DashMap,
    serde_json::{Map, Value},
    std::{collections::HashMap, path::PathBuf, sync::Arc},
    tokio::sync::OnceCell,
    tracing::{debug, info},
};

/// Asset-loading collaborator: the bridge to whatever build pipeline
/// produces widget bundles. Implementations load raw markup bytes for a URI.
#[async_trait]
pub trait AssetLoader: Send + Sync {
    async fn load(&self, uri: &str) -> anyhow::Result<Vec<u8>>;
}

/// A resolved widget template. Immutable once loaded.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ResourceTemplate {
    pub uri: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub markup: String,
    #[serde(rename = "_meta", skip_serializing_if = "Map::is_empty")]
    pub meta: Map<String, Value>,
}

impl ResourceTemplate {
    pub fn new(uri: impl Into<String>, mime_type: impl Into<String>, markup: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            mime_type: mime_type.into(),
            markup: markup.into(),
            meta: Map::new(),
        }
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: Value) -> Self {
        self.meta.insert(key.into(), value);
        self
    }

    /// The rendered markup for this template
    pub fn markup(&self) -> &str {
        &self.markup
    }
}

/// Guess a MIME type from the URI's extension
fn mime_type_for(uri: &str) -> &'static str {
    match uri.rsplit('.').next() {
        Some("html") => "text/html",
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Caching resolver in front of an [`AssetLoader`].
pub struct ResourceResolver {
    loader: Arc<dyn AssetLoader>,
    // One cell per URI; the cell serializes concurrent first loads
    cache: DashMap<String, Arc<OnceCell<Arc<ResourceTemplate>>>>,
}

impl ResourceResolver {
    pub fn new(loader: Arc<dyn AssetLoader>) -> Self {
        Self {
            loader,
            cache: DashMap::new(),
        }
    }

    /// Resolve a template URI, loading it on first use.
    ///
    /// Repeated resolution of the same URI returns the same template without
    /// re-invoking the loader. Missing or unreadable assets surface as
    /// [`GatewayError::UnknownResource`] for this request only.
    pub async fn resolve(&self, uri: &str) -> GatewayResult<Arc<ResourceTemplate>> {
        let cell = self
            .cache
            .entry(uri.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .value()
            .clone();

        let template = cell
            .get_or_try_init(|| async {
                debug!(uri = %uri, "📦 Loading widget template");
                let bytes = self.loader.load(uri).await.map_err(|e| {
                    GatewayError::UnknownResource(format!("{uri}: {e}"))
                })?;
                let markup = String::from_utf8(bytes).map_err(|e| {
                    GatewayError::Internal(format!("template {uri} is not valid UTF-8: {e}"))
                })?;
                info!(uri = %uri, bytes = markup.len(), "📦 Widget template loaded");
                Ok::<_, GatewayError>(Arc::new(ResourceTemplate::new(
                    uri,
                    mime_type_for(uri),
                    markup,
                )))
            })
            .await?;

        Ok(template.clone())
    }

    /// Drop a cached template so the next resolution reloads it.
    /// Returns whether an entry was removed.
    pub fn invalidate(&self, uri: &str) -> bool {
        let removed = self.cache.remove(uri).is_some();
        if removed {
            info!(uri = %uri, "📦 Widget template cache invalidated");
        }
        removed
    }

    /// Whether a URI is currently cached
    pub fn is_cached(&self, uri: &str) -> bool {
        self.cache
            .get(uri)
            .map(|cell| cell.value().initialized())
            .unwrap_or(false)
    }
}

/// In-memory asset loader for demos and tests
#[derive(Default)]
pub struct StaticAssets {
    assets: HashMap<String, String>,
}

impl StaticAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_asset(mut self, uri: impl Into<String>, markup: impl Into<String>) -> Self {
        self.assets.insert(uri.into(), markup.into());
        self
    }
}

#[async_trait]
impl AssetLoader for StaticAssets {
    async fn load(&self, uri: &str) -> anyhow::Result<Vec<u8>> {
        self.assets
            .get(uri)
            .map(|markup| markup.clone().into_bytes())
            .ok_or_else(|| anyhow::anyhow!("no such asset: {uri}"))
    }
}

/// Loads assets from a directory, mapping `ui://widget/board.html` to
/// `<root>/widget/board.html`. Rejects paths escaping the root.
pub struct DirAssets {
    root: PathBuf,
}

impl DirAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn relative_path(uri: &str) -> GatewayResult<&str> {
        let path = uri.split_once("://").map(|(_, rest)| rest).unwrap_or(uri);
        let escapes = path.split('/').any(|part| part == "..") || path.starts_with('/');
        if escapes || path.is_empty() {
            return Err(GatewayError::InvalidPath(uri.to_string()));
        }
        Ok(path)
    }
}

#[async_trait]
impl AssetLoader for DirAssets {
    async fn load(&self, uri: &str) -> anyhow::Result<Vec<u8>> {
        let relative = Self::relative_path(uri)?;
        let full = self.root.join(relative);
        let bytes = tokio::fs::read(&full).await?;
        Ok(bytes)
    }
}
