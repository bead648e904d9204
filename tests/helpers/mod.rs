//! Shared Gateway Test Helpers
//!
//! Common utilities for integration tests that run a real HTTP server on a
//! dynamic port with proper lifecycle management.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use toolgate::{
    Gateway, GatewayBuilder, GatewayServer, InvocationResult, StaticAssets, ToolContext,
};

#[derive(JsonSchema, Deserialize)]
pub struct EchoInput {
    pub text: String,
}

/// Find an available port for testing
pub async fn find_available_port() -> Result<u16, Box<dyn std::error::Error + Send + Sync>> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    drop(listener);
    Ok(port)
}

/// Build the gateway used by the HTTP integration tests: an echo tool, a
/// session counter tool, and a widget-backed tool over static assets.
pub fn build_test_gateway() -> Gateway<()> {
    let assets = StaticAssets::new().with_asset(
        "ui://widget/board.html",
        "<div id=\"board\">static board</div>",
    );

    GatewayBuilder::new((), "test-gateway", "0.0.0")
        .with_asset_loader(Arc::new(assets))
        .with_tool(
            "echo",
            "Echo back the input text",
            |input: EchoInput, _ctx: Arc<()>, _tool: ToolContext| async move {
                Ok(InvocationResult::text(input.text.clone())
                    .with_structured(json!({ "echo": input.text })))
            },
        )
        .with_tool(
            "count",
            "Counts invocations per session",
            |_input: serde_json::Value, _ctx: Arc<()>, tool: ToolContext| async move {
                let state = tool
                    .update_widget_state(|state| {
                        let n = state.as_i64().unwrap_or(0);
                        *state = json!(n + 1);
                    })
                    .await?;
                Ok(InvocationResult::text(format!("count: {state}"))
                    .with_structured(json!({ "count": state })))
            },
        )
        .with_widget_tool(
            "board",
            "Widget-backed board tool",
            "ui://widget/board.html",
            |_input: serde_json::Value, _ctx: Arc<()>, _tool: ToolContext| async move {
                Ok(InvocationResult::text("board updated"))
            },
        )
        .build()
        .expect("test gateway builds")
}

/// Test server handle that manages a dynamic-port gateway server
pub struct GatewayTestServer {
    pub port: u16,
    pub server_handle: tokio::task::JoinHandle<()>,
}

impl GatewayTestServer {
    /// Start a gateway on a dynamic port
    pub async fn start(
        gateway: Gateway<()>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let port = find_available_port().await?;

        let server_handle = tokio::spawn(async move {
            if let Err(e) = GatewayServer::new(gateway).start(port).await {
                eprintln!("Test server error: {e}");
            }
        });

        // Wait a bit for the server to start
        tokio::time::sleep(Duration::from_millis(100)).await;

        Ok(Self {
            port,
            server_handle,
        })
    }

    /// Base HTTP URL for this server
    pub fn http_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Stop the server
    pub async fn stop(self) {
        self.server_handle.abort();
        let _ = self.server_handle.await;
    }
}
