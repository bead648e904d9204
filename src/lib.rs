//! Tool Invocation Gateway Library
//!
//! A toolkit for building MCP tool-invocation gateways: schema-validated
//! tool dispatch with contained failures, lazily cached widget template
//! resolution, and per-session widget state.

// Re-export the main modules
pub mod config;
pub mod content;
pub mod dispatcher;
pub mod error;
pub mod gateway;
pub mod health;
pub mod http;
pub mod logging;
pub mod registry;
pub mod resolver;
pub mod server;
pub mod session;
pub mod validation;

// Test modules
#[cfg(test)]
pub mod tests;

// Re-export key types
pub use config::GatewayConfig;
pub use content::{ContentBlock, IntoInvocationResult, InvocationResult};
pub use dispatcher::{InvocationRequest, ToolContext};
pub use error::{GatewayError, GatewayResult};
pub use gateway::{Gateway, GatewayBuilder};
pub use registry::{ToolDefinition, ToolRegistry};
pub use resolver::{AssetLoader, DirAssets, ResourceResolver, ResourceTemplate, StaticAssets};
pub use server::GatewayServer;
pub use session::WidgetStateStore;
