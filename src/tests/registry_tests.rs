//! Tool Registry Unit Tests
//!
//! Registration, lookup, listing order, and duplicate rejection.

use crate::{
    content::InvocationResult,
    dispatcher::ToolContext,
    error::GatewayError,
    gateway::GatewayBuilder,
    registry::{ToolDefinition, ToolRegistry},
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(JsonSchema, Deserialize)]
struct EchoInput {
    text: String,
}

async fn noop(_input: Value, _ctx: Arc<()>, _tool: ToolContext) -> anyhow::Result<InvocationResult> {
    Ok(InvocationResult::text("ok"))
}

#[test]
fn lookup_after_register_returns_identical_definition() {
    let mut registry: ToolRegistry<()> = ToolRegistry::new();
    let def = ToolDefinition::new("echo", "Echo back the input")
        .with_title("Echo")
        .with_template("ui://widget/echo.html")
        .with_meta("category", json!("demo"));
    let expected = serde_json::to_value(&def).unwrap();

    registry.register::<Value, _, _>(def, noop).unwrap();

    let found = registry.definition("echo").unwrap();
    assert_eq!(serde_json::to_value(found).unwrap(), expected);
}

#[test]
fn duplicate_names_are_rejected() {
    let mut registry: ToolRegistry<()> = ToolRegistry::new();
    registry
        .register::<Value, _, _>(ToolDefinition::new("echo", "first"), noop)
        .unwrap();

    let err = registry
        .register::<Value, _, _>(ToolDefinition::new("echo", "second"), noop)
        .unwrap_err();

    assert!(matches!(err, GatewayError::DuplicateTool(ref name) if name == "echo"));
    assert!(err.is_fatal());
    // The original registration is untouched
    assert_eq!(registry.definition("echo").unwrap().description, "first");
    assert_eq!(registry.len(), 1);
}

#[test]
fn unknown_lookup_fails() {
    let registry: ToolRegistry<()> = ToolRegistry::new();
    let err = registry.definition("missing").unwrap_err();
    assert!(matches!(err, GatewayError::UnknownTool(ref name) if name == "missing"));
}

#[test]
fn list_preserves_registration_order() {
    let mut registry: ToolRegistry<()> = ToolRegistry::new();
    for name in ["zeta", "alpha", "mid"] {
        registry
            .register::<Value, _, _>(ToolDefinition::new(name, "a tool"), noop)
            .unwrap();
    }

    let names: Vec<&str> = registry.list().iter().map(|def| def.name.as_str()).collect();
    assert_eq!(names, vec!["zeta", "alpha", "mid"]);
}

#[test]
fn schema_generation_marks_required_fields() {
    let def = ToolDefinition::from_schema::<EchoInput>("echo", "Echo back the input");

    let required = def.input_schema["required"]
        .as_array()
        .expect("generated schema has required list");
    assert!(required.contains(&json!("text")));
    assert_eq!(def.input_schema["properties"]["text"]["type"], "string");
}

#[test]
fn builder_surfaces_duplicate_at_build() {
    let result = GatewayBuilder::new((), "test-gateway", "0.0.0")
        .with_tool(
            "echo",
            "first",
            |input: EchoInput, _ctx: Arc<()>, _tool: ToolContext| async move {
                Ok(InvocationResult::text(input.text))
            },
        )
        .with_tool(
            "echo",
            "second",
            |input: EchoInput, _ctx: Arc<()>, _tool: ToolContext| async move {
                Ok(InvocationResult::text(input.text))
            },
        )
        .build();

    assert!(matches!(result, Err(GatewayError::DuplicateTool(_))));
}

#[test]
fn builder_enforces_tool_limit() {
    let mut config = crate::config::GatewayConfig::default();
    config.max_tools = Some(1);

    let result = GatewayBuilder::new((), "test-gateway", "0.0.0")
        .with_config(config)
        .with_tool(
            "one",
            "first",
            |_input: Value, _ctx: Arc<()>, _tool: ToolContext| async move {
                Ok(InvocationResult::text("one"))
            },
        )
        .with_tool(
            "two",
            "second",
            |_input: Value, _ctx: Arc<()>, _tool: ToolContext| async move {
                Ok(InvocationResult::text("two"))
            },
        )
        .build();

    assert!(matches!(result, Err(GatewayError::TooManyTools(1))));
}
