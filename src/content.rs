//! Type-safe content envelope for tool invocation results
//!
//! Every invocation, success or failure, is answered with an
//! [`InvocationResult`]: an ordered list of content blocks for display,
//! optional structured content for the calling model, and optional hidden
//! metadata that is never echoed into content. Building results through
//! these types keeps responses in the wire shape clients expect instead of
//! leaking raw JSON blobs.
//!
//! # Usage
//!
//! ```rust
//! use toolgate::content::InvocationResult;
//! use serde_json::json;
//!
//! # fn handler() -> anyhow::Result<InvocationResult> {
//! // Instead of returning raw data:
//! // Ok(json!({"echo": "hi"}))
//!
//! // Return a well-formed envelope:
//! Ok(InvocationResult::text("hi").with_structured(json!({"echo": "hi"})))
//! # }
//! ```

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A single block of displayable content in an invocation result.
///
/// Blocks are ordered; clients render them in sequence. The `type` tag on
/// the wire distinguishes the variants.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum ContentBlock {
    /// Plain text content
    #[serde(rename = "text")]
    Text { text: String },

    /// Image content (base64 encoded)
    #[serde(rename = "image")]
    Image {
        /// Base64 encoded image data
        data: String,
        /// MIME type (e.g., "image/png", "image/jpeg")
        #[serde(skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
    },

    /// Reference to a resource template by URI
    #[serde(rename = "resource")]
    Resource {
        /// Resource URI
        uri: String,
        /// Optional MIME type
        #[serde(skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
        /// Optional display text
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
}

impl ContentBlock {
    /// Create text content
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create image content
    pub fn image(data: impl Into<String>, mime_type: Option<String>) -> Self {
        Self::Image {
            data: data.into(),
            mime_type,
        }
    }

    /// Create a resource reference
    pub fn resource(uri: impl Into<String>, mime_type: Option<String>, text: Option<String>) -> Self {
        Self::Resource {
            uri: uri.into(),
            mime_type,
            text,
        }
    }
}

/// The complete result envelope for one tool invocation.
///
/// - `content`: ordered blocks for client display
/// - `structured_content` (`structuredContent` on the wire): machine-readable
///   data visible to the calling model. Contract: must not contain secrets.
/// - `meta` (`_meta` on the wire): model-invisible metadata such as the
///   output template reference; never echoed into content.
///
/// Error results carry `structured_content.error == true` alongside a
/// human-readable content block; errors are reported, never silently
/// dropped.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InvocationResult {
    /// Content array for client display
    pub content: Vec<ContentBlock>,

    /// Structured data for the calling model
    #[serde(rename = "structuredContent", skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,

    /// Hidden metadata for the client runtime
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl InvocationResult {
    /// Create a new result with the given content blocks
    pub fn new(content: Vec<ContentBlock>) -> Self {
        Self {
            content,
            structured_content: None,
            meta: None,
        }
    }

    /// Create a simple text result
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(vec![ContentBlock::text(text)])
    }

    /// Create a text result with structured content: the common pattern
    /// for tools that return both a summary and programmatic data.
    pub fn with_text_and_structured(text: impl Into<String>, structured: Value) -> Self {
        Self {
            content: vec![ContentBlock::text(text)],
            structured_content: Some(structured),
            meta: None,
        }
    }

    /// Create an error result. The structured envelope is marked with
    /// `error: true` so callers can detect failures programmatically.
    pub fn error(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            content: vec![ContentBlock::text(message.clone())],
            structured_content: Some(json!({ "error": true, "message": message })),
            meta: None,
        }
    }

    /// Replace the structured content of this result
    pub fn with_structured(mut self, structured: Value) -> Self {
        self.structured_content = Some(structured);
        self
    }

    /// Append a content block to this result
    pub fn with_content(mut self, block: ContentBlock) -> Self {
        self.content.push(block);
        self
    }

    /// Set a single entry in the hidden metadata object, creating it if
    /// absent. Non-object metadata is replaced.
    pub fn with_meta_entry(mut self, key: impl Into<String>, value: Value) -> Self {
        match self.meta {
            Some(Value::Object(ref mut map)) => {
                map.insert(key.into(), value);
            }
            _ => {
                let mut map = serde_json::Map::new();
                map.insert(key.into(), value);
                self.meta = Some(Value::Object(map));
            }
        }
        self
    }

    /// Whether this result reports an error
    pub fn is_error(&self) -> bool {
        self.structured_content
            .as_ref()
            .and_then(|s| s.get("error"))
            .and_then(|e| e.as_bool())
            .unwrap_or(false)
    }
}

/// Helper trait for converting common types into invocation results
pub trait IntoInvocationResult {
    /// Convert this value into an invocation result
    fn into_invocation_result(self) -> InvocationResult;
}

impl IntoInvocationResult for String {
    fn into_invocation_result(self) -> InvocationResult {
        InvocationResult::text(self)
    }
}

impl IntoInvocationResult for &str {
    fn into_invocation_result(self) -> InvocationResult {
        InvocationResult::text(self)
    }
}

impl IntoInvocationResult for Value {
    fn into_invocation_result(self) -> InvocationResult {
        // Try to extract a reasonable text summary from the JSON
        let text = if let Some(message) = self.get("message").and_then(|v| v.as_str()) {
            message.to_string()
        } else if let Some(status) = self.get("status").and_then(|v| v.as_str()) {
            status.to_string()
        } else {
            "Operation completed".to_string()
        };

        InvocationResult::with_text_and_structured(text, self)
    }
}

impl IntoInvocationResult for InvocationResult {
    fn into_invocation_result(self) -> InvocationResult {
        self
    }
}
