//! Gateway assembly
//!
//! A [`Gateway`] owns the tool registry, the widget template resolver, the
//! session store, and its configuration behind one `Arc`: an explicit
//! context object rather than ambient globals, so a process can host any
//! number of isolated gateway instances (one per test, one per tenant).
//!
//! Built through [`GatewayBuilder`]:
//!
//! ```rust
//! use toolgate::{GatewayBuilder, InvocationResult, ToolContext};
//! use schemars::JsonSchema;
//! use serde::Deserialize;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! #[derive(JsonSchema, Deserialize)]
//! struct EchoInput {
//!     text: String,
//! }
//!
//! struct AppContext;
//!
//! # async fn build() -> anyhow::Result<()> {
//! let gateway = GatewayBuilder::new(AppContext, "demo-gateway", "1.0.0")
//!     .with_tool("echo", "Echo back the input text", |input: EchoInput, _ctx: Arc<AppContext>, _tool: ToolContext| async move {
//!         Ok(InvocationResult::text(input.text.clone())
//!             .with_structured(json!({ "echo": input.text })))
//!     })
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use {
    crate::{
        config::GatewayConfig,
        content::InvocationResult,
        dispatcher::ToolContext,
        error::{GatewayError, GatewayResult},
        health::HealthChecker,
        registry::{ToolDefinition, ToolFunction, ToolRegistry},
        resolver::{AssetLoader, ResourceResolver, ResourceTemplate},
        session::WidgetStateStore,
    },
    async_trait::async_trait,
    schemars::JsonSchema,
    serde::de::DeserializeOwned,
    serde_json::Value,
    std::{future::Future, sync::Arc},
    tokio::sync::Semaphore,
    tracing::info,
};

pub(crate) struct GatewayInner<C> {
    pub(crate) name: String,
    pub(crate) version: String,
    pub(crate) context: Arc<C>,
    pub(crate) registry: ToolRegistry<C>,
    pub(crate) resolver: ResourceResolver,
    pub(crate) sessions: Arc<WidgetStateStore>,
    pub(crate) config: GatewayConfig,
    pub(crate) invocation_gate: Option<Arc<Semaphore>>,
    pub(crate) health: HealthChecker,
}

/// One gateway instance. Cheap to clone; clones share the same state.
pub struct Gateway<C> {
    pub(crate) inner: Arc<GatewayInner<C>>,
}

impl<C> Clone for Gateway<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<C: Send + Sync + 'static> Gateway<C> {
    /// Start building a gateway with the given application context
    pub fn builder(context: C, name: &str, version: &str) -> GatewayBuilder<C> {
        GatewayBuilder::new(context, name, version)
    }

    /// Gateway name (used in handshakes and health reports)
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Gateway version
    pub fn version(&self) -> &str {
        &self.inner.version
    }

    /// The shared application context
    pub fn context(&self) -> &Arc<C> {
        &self.inner.context
    }

    /// List registered tool definitions in registration order
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.inner.registry.list().into_iter().cloned().collect()
    }

    /// Look up one tool's definition
    pub fn definition(&self, name: &str) -> GatewayResult<ToolDefinition> {
        self.inner.registry.definition(name).cloned()
    }

    /// Resolve a widget template URI through the cached resolver
    pub async fn resolve_template(&self, uri: &str) -> GatewayResult<Arc<ResourceTemplate>> {
        self.inner.resolver.resolve(uri).await
    }

    /// Drop a cached template so the next resolution reloads it
    pub fn invalidate_template(&self, uri: &str) -> bool {
        self.inner.resolver.invalidate(uri)
    }

    /// The widget state store
    pub fn sessions(&self) -> &Arc<WidgetStateStore> {
        &self.inner.sessions
    }

    /// Apply a client-reported widget state snapshot for a session
    pub async fn sync_widget_state(&self, session_id: &str, state: Value) -> GatewayResult<()> {
        self.inner.sessions.set(session_id, state).await
    }

    /// The active configuration
    pub fn config(&self) -> &GatewayConfig {
        &self.inner.config
    }

    /// Current health status as JSON
    pub fn health(&self) -> Value {
        self.inner
            .health
            .get_json_status(self.inner.registry.len(), self.inner.sessions.len())
    }
}

/// Convenience builder for assembling gateways with minimal boilerplate.
///
/// Registration errors (duplicate tool names, tool-count limit) are
/// collected and surfaced by [`GatewayBuilder::build`]; bad registrations
/// abort startup instead of shipping a half-wired gateway.
pub struct GatewayBuilder<C> {
    name: String,
    version: String,
    context: C,
    registry: ToolRegistry<C>,
    loader: Option<Arc<dyn AssetLoader>>,
    config: GatewayConfig,
    // First registration error, reported by build()
    error: Option<GatewayError>,
}

impl<C: Send + Sync + 'static> GatewayBuilder<C> {
    /// Create a new builder with the given application context
    pub fn new(context: C, name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            context,
            registry: ToolRegistry::new(),
            loader: None,
            config: GatewayConfig::default(),
            error: None,
        }
    }

    /// Replace the default configuration
    pub fn with_config(mut self, config: GatewayConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the asset loader backing the widget template resolver
    pub fn with_asset_loader(mut self, loader: Arc<dyn AssetLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Register a tool with automatic schema generation from its input type
    pub fn with_tool<I, F, Fut>(mut self, name: &str, description: &str, handler: F) -> Self
    where
        I: JsonSchema + DeserializeOwned + Send + 'static,
        F: Fn(I, Arc<C>, ToolContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<InvocationResult>> + Send + 'static,
    {
        let result = self.registry.register_tool(name, description, handler);
        self.record(result);
        self
    }

    /// Register a tool whose output is rendered by a widget template
    pub fn with_widget_tool<I, F, Fut>(
        mut self,
        name: &str,
        description: &str,
        template_uri: &str,
        handler: F,
    ) -> Self
    where
        I: JsonSchema + DeserializeOwned + Send + 'static,
        F: Fn(I, Arc<C>, ToolContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<InvocationResult>> + Send + 'static,
    {
        let def = ToolDefinition::from_schema::<I>(name, description).with_template(template_uri);
        let result = self.registry.register::<I, F, Fut>(def, handler);
        self.record(result);
        self
    }

    /// Register a tool from an explicit definition
    pub fn with_tool_def<I, F, Fut>(mut self, def: ToolDefinition, handler: F) -> Self
    where
        I: DeserializeOwned + Send + 'static,
        F: Fn(I, Arc<C>, ToolContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<InvocationResult>> + Send + 'static,
    {
        let result = self.registry.register::<I, F, Fut>(def, handler);
        self.record(result);
        self
    }

    /// Register a pre-wrapped handler working on raw JSON arguments
    pub fn with_raw_tool(mut self, def: ToolDefinition, func: ToolFunction<C>) -> Self {
        let result = self.registry.register_raw(def, func);
        self.record(result);
        self
    }

    /// Build the gateway. Fails if any registration failed or limits are
    /// exceeded. These are startup errors, not per-request errors.
    pub fn build(self) -> GatewayResult<Gateway<C>> {
        if let Some(error) = self.error {
            return Err(error);
        }
        if let Some(max) = self.config.max_tools {
            if self.registry.len() > max {
                return Err(GatewayError::TooManyTools(max));
            }
        }

        let loader = self.loader.unwrap_or_else(|| Arc::new(NoAssets));
        let invocation_gate = self
            .config
            .max_concurrent_invocations
            .map(|permits| Arc::new(Semaphore::new(permits)));

        info!(
            gateway = %self.name,
            tools = self.registry.len(),
            "🚀 Gateway assembled"
        );

        Ok(Gateway {
            inner: Arc::new(GatewayInner {
                health: HealthChecker::new(self.name.clone(), self.version.clone()),
                name: self.name,
                version: self.version,
                context: Arc::new(self.context),
                registry: self.registry,
                resolver: ResourceResolver::new(loader),
                sessions: Arc::new(WidgetStateStore::new(self.config.max_sessions)),
                invocation_gate,
                config: self.config,
            }),
        })
    }

    fn record(&mut self, result: GatewayResult<()>) {
        if let Err(error) = result {
            if self.error.is_none() {
                self.error = Some(error);
            }
        }
    }
}

/// Placeholder loader used when no asset pipeline is wired up; every
/// template resolution fails per-request.
struct NoAssets;

#[async_trait]
impl AssetLoader for NoAssets {
    async fn load(&self, uri: &str) -> anyhow::Result<Vec<u8>> {
        Err(anyhow::anyhow!("no asset loader configured for {uri}"))
    }
}
