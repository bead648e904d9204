//! Tool Registry
//!
//! Maps tool names to their definitions and handler functions. Registration
//! happens while the gateway is being built; afterwards the registry is
//! shared behind `Arc` and only read, so lookups and listings need no locks.

use {
    crate::{
        content::InvocationResult,
        dispatcher::ToolContext,
        error::{GatewayError, GatewayResult},
    },
    schemars::JsonSchema,
    serde::de::DeserializeOwned,
    serde_json::{json, Map, Value},
    std::{collections::HashMap, future::Future, pin::Pin, sync::Arc},
};

/// A tool's registered definition: everything a client needs to discover
/// and call it. Immutable after registration.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ToolDefinition {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
    /// URI of the widget template rendering this tool's output, if any.
    /// Attached to result metadata at dispatch time and resolved lazily by
    /// the client, never rendered during the invocation itself.
    #[serde(rename = "outputTemplateUri", skip_serializing_if = "Option::is_none")]
    pub output_template_uri: Option<String>,
    #[serde(rename = "_meta", skip_serializing_if = "Map::is_empty")]
    pub meta: Map<String, Value>,
}

impl ToolDefinition {
    /// Create a definition with an open object schema
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            description: description.into(),
            input_schema: json!({ "type": "object" }),
            output_template_uri: None,
            meta: Map::new(),
        }
    }

    /// Create a definition whose input schema is generated from a Rust type
    pub fn from_schema<I: JsonSchema>(
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let schema = schemars::schema_for!(I);
        let input_schema =
            serde_json::to_value(&schema).unwrap_or_else(|_| json!({ "type": "object" }));
        Self {
            input_schema,
            ..Self::new(name, description)
        }
    }

    /// Set a human-friendly display title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replace the input schema with an explicit one
    pub fn with_input_schema(mut self, schema: Value) -> Self {
        self.input_schema = schema;
        self
    }

    /// Declare the widget template that renders this tool's output
    pub fn with_template(mut self, uri: impl Into<String>) -> Self {
        self.output_template_uri = Some(uri.into());
        self
    }

    /// Attach an opaque metadata entry
    pub fn with_meta(mut self, key: impl Into<String>, value: Value) -> Self {
        self.meta.insert(key.into(), value);
        self
    }
}

/// A registered tool handler: boxed async closure taking the raw arguments,
/// the shared application context, and the per-invocation tool context.
pub type ToolFunction<C> = Box<
    dyn Fn(Value, Arc<C>, ToolContext) -> Pin<Box<dyn Future<Output = anyhow::Result<InvocationResult>> + Send>>
        + Send
        + Sync,
>;

/// Registry of tools for one gateway instance.
///
/// # Type Parameters
/// - `C`: The application context type shared across all registered handlers
pub struct ToolRegistry<C> {
    tools: HashMap<String, (ToolDefinition, ToolFunction<C>)>,
    // Listing order is registration order
    order: Vec<String>,
}

impl<C> Default for ToolRegistry<C> {
    fn default() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<C: Send + Sync + 'static> ToolRegistry<C> {
    /// Create a new, empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool with a typed input. The input schema comes from the
    /// definition (usually built via [`ToolDefinition::from_schema`]); the
    /// handler receives the deserialized input value.
    pub fn register<I, F, Fut>(&mut self, def: ToolDefinition, handler: F) -> GatewayResult<()>
    where
        I: DeserializeOwned + Send + 'static,
        F: Fn(I, Arc<C>, ToolContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<InvocationResult>> + Send + 'static,
    {
        let handler = Arc::new(handler);

        let wrapper: ToolFunction<C> = Box::new(move |args, context, tool_ctx| {
            let handler = Arc::clone(&handler);

            Box::pin(async move {
                // Arguments were validated against the schema by the
                // dispatcher; this recovers the typed input.
                let input: I = serde_json::from_value(args)?;
                handler(input, context, tool_ctx).await
            })
        });

        self.register_raw(def, wrapper)
    }

    /// Register a tool with schema generation from its input type
    pub fn register_tool<I, F, Fut>(
        &mut self,
        name: &str,
        description: &str,
        handler: F,
    ) -> GatewayResult<()>
    where
        I: JsonSchema + DeserializeOwned + Send + 'static,
        F: Fn(I, Arc<C>, ToolContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<InvocationResult>> + Send + 'static,
    {
        self.register::<I, F, Fut>(ToolDefinition::from_schema::<I>(name, description), handler)
    }

    /// Register a pre-wrapped handler working on raw JSON arguments
    pub fn register_raw(&mut self, def: ToolDefinition, func: ToolFunction<C>) -> GatewayResult<()> {
        if self.tools.contains_key(&def.name) {
            return Err(GatewayError::DuplicateTool(def.name));
        }
        self.order.push(def.name.clone());
        self.tools.insert(def.name.clone(), (def, func));
        Ok(())
    }

    /// Look up a tool's definition
    pub fn definition(&self, name: &str) -> GatewayResult<&ToolDefinition> {
        self.tools
            .get(name)
            .map(|(def, _)| def)
            .ok_or_else(|| GatewayError::UnknownTool(name.to_string()))
    }

    pub(crate) fn entry(&self, name: &str) -> Option<&(ToolDefinition, ToolFunction<C>)> {
        self.tools.get(name)
    }

    /// List all definitions in registration order
    pub fn list(&self) -> Vec<&ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name).map(|(def, _)| def))
            .collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
