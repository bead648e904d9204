//! Tool Validation Error Cases
//!
//! Bad arguments are rejected with field-level detail before any handler
//! runs, across a range of malformed inputs.

use serde_json::{json, Value};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use toolgate::{
    Gateway, GatewayBuilder, InvocationRequest, InvocationResult, ToolContext, ToolDefinition,
};

fn validation_gateway(calls: Arc<AtomicUsize>) -> Gateway<()> {
    let schema = json!({
        "type": "object",
        "properties": {
            "title": { "type": "string" },
            "priority": { "type": "integer" },
            "tags": {
                "type": "array",
                "items": { "type": "string" }
            },
            "status": { "type": "string", "enum": ["open", "done"] }
        },
        "required": ["title"],
        "additionalProperties": false
    });

    let def = ToolDefinition::new("create_task", "Create a task").with_input_schema(schema);

    GatewayBuilder::new((), "validation-gateway", "0.0.0")
        .with_tool_def(
            def,
            move |_input: Value, _ctx: Arc<()>, _tool: ToolContext| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::Relaxed);
                    Ok(InvocationResult::text("created"))
                }
            },
        )
        .build()
        .unwrap()
}

async fn rejected_path(gateway: &Gateway<()>, arguments: Value) -> String {
    let result = gateway
        .invoke(InvocationRequest::new("create_task").with_arguments(arguments))
        .await;
    let structured = result.structured_content.expect("error envelope");
    assert_eq!(structured["error"], true);
    assert_eq!(structured["code"], "invalid_arguments");
    structured["path"].as_str().expect("field path").to_string()
}

#[tokio::test]
async fn missing_required_field() {
    let calls = Arc::new(AtomicUsize::new(0));
    let gateway = validation_gateway(calls.clone());

    let path = rejected_path(&gateway, json!({})).await;
    assert_eq!(path, "title");
    assert_eq!(calls.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn wrong_scalar_types() {
    let calls = Arc::new(AtomicUsize::new(0));
    let gateway = validation_gateway(calls.clone());

    assert_eq!(
        rejected_path(&gateway, json!({"title": 42})).await,
        "title"
    );
    assert_eq!(
        rejected_path(&gateway, json!({"title": "t", "priority": "high"})).await,
        "priority"
    );
    // A fractional number is not an integer
    assert_eq!(
        rejected_path(&gateway, json!({"title": "t", "priority": 1.5})).await,
        "priority"
    );
    assert_eq!(calls.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn bad_array_element_is_pinpointed() {
    let calls = Arc::new(AtomicUsize::new(0));
    let gateway = validation_gateway(calls.clone());

    let path = rejected_path(
        &gateway,
        json!({"title": "t", "tags": ["a", "b", 3]}),
    )
    .await;
    assert_eq!(path, "tags[2]");
    assert_eq!(calls.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn undeclared_field_rejected_by_closed_schema() {
    let calls = Arc::new(AtomicUsize::new(0));
    let gateway = validation_gateway(calls.clone());

    let path = rejected_path(&gateway, json!({"title": "t", "extra": true})).await;
    assert_eq!(path, "extra");
    assert_eq!(calls.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn enum_violation_rejected() {
    let calls = Arc::new(AtomicUsize::new(0));
    let gateway = validation_gateway(calls.clone());

    let path = rejected_path(&gateway, json!({"title": "t", "status": "stalled"})).await;
    assert_eq!(path, "status");
    assert_eq!(calls.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn valid_arguments_reach_the_handler() {
    let calls = Arc::new(AtomicUsize::new(0));
    let gateway = validation_gateway(calls.clone());

    let result = gateway
        .invoke(InvocationRequest::new("create_task").with_arguments(json!({
            "title": "write tests",
            "priority": 2,
            "tags": ["a", "b"],
            "status": "open"
        })))
        .await;

    assert!(!result.is_error());
    assert_eq!(calls.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn omitted_arguments_default_to_empty_object() {
    let calls = Arc::new(AtomicUsize::new(0));
    let gateway = validation_gateway(calls.clone());

    // No arguments key at all: deserializes to {} and fails on the
    // missing required field, not on a transport error
    let request: InvocationRequest =
        serde_json::from_value(json!({ "tool": "create_task" })).unwrap();
    assert_eq!(request.arguments, json!({}));

    let result = gateway.invoke(request).await;
    let structured = result.structured_content.unwrap();
    assert_eq!(structured["path"], "title");
    assert_eq!(calls.load(Ordering::Relaxed), 0);
}
