//! Gateway Server Example
//!
//! Example application showing how to assemble and run a tool gateway.

use anyhow::Result;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use toolgate::{
    logging, GatewayBuilder, GatewayServer, InvocationResult, StaticAssets, ToolContext,
};

#[derive(JsonSchema, Deserialize)]
struct EchoInput {
    /// Text to echo back
    text: String,
}

#[derive(JsonSchema, Deserialize)]
struct AddTaskInput {
    /// Task to append to the board
    title: String,
}

struct AppContext;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured logging with tracing
    logging::init_tracing();

    let assets = StaticAssets::new().with_asset(
        "ui://widget/task-board.html",
        "<div id=\"task-board\"><ul data-bind=\"tasks\"></ul></div>",
    );

    let gateway = GatewayBuilder::new(AppContext, "toolgate-demo", env!("CARGO_PKG_VERSION"))
        .with_asset_loader(Arc::new(assets))
        .with_tool(
            "echo",
            "Echo back the input text",
            |input: EchoInput, _ctx: Arc<AppContext>, _tool: ToolContext| async move {
                Ok(InvocationResult::text(input.text.clone())
                    .with_structured(json!({ "echo": input.text })))
            },
        )
        .with_widget_tool(
            "add_task",
            "Append a task to the session's task board",
            "ui://widget/task-board.html",
            |input: AddTaskInput, _ctx: Arc<AppContext>, tool: ToolContext| async move {
                let state = tool
                    .update_widget_state(|state| {
                        if !state.is_array() {
                            *state = json!([]);
                        }
                        if let serde_json::Value::Array(tasks) = state {
                            tasks.push(json!({ "title": input.title }));
                        }
                    })
                    .await?;

                let count = state.as_array().map(|t| t.len()).unwrap_or(0);
                Ok(InvocationResult::text(format!("Board has {count} tasks"))
                    .with_structured(json!({ "tasks": state })))
            },
        )
        .build()?;

    // Start server on port 3000
    GatewayServer::new(gateway).start(3000).await?;

    Ok(())
}
