//! Gateway Debug Logging Module
//!
//! Structured logging for the gateway using the tracing crate. Includes
//! invocation tracking, request IDs, and lifecycle events.

use {
    once_cell::sync::OnceCell,
    std::sync::atomic::{AtomicU64, Ordering},
    std::time::{Duration, SystemTime, UNIX_EPOCH},
    tracing::{debug, error, info, span, warn, Level, Span},
    tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter},
    uuid::Uuid,
};

static TRACING_INIT: OnceCell<()> = OnceCell::new();

/// Initialize the tracing subscriber with appropriate configuration.
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_tracing() {
    TRACING_INIT.get_or_init(|| {
        // Try to get log level from environment, default to info
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("toolgate=info,warp=info"));

        // Check if JSON format is requested
        let json_format = std::env::var("LOG_FORMAT")
            .map(|v| v.to_lowercase() == "json")
            .unwrap_or(false);

        if json_format {
            // JSON format for production/structured logging
            let fmt_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .init();
        } else {
            // Human-readable format for development
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_level(true)
                .with_ansi(true);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .init();
        }

        info!("Tracing initialized");
    });
}

/// Generate a unique request ID for tracking
static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(1);

pub fn generate_request_id() -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;

    let counter = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);

    format!("{:x}-{:04x}", timestamp, counter % 0x10000)
}

#[derive(Debug, Clone)]
pub struct GatewayConnectionId(pub String);

impl GatewayConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for GatewayConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GatewayConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Create a span for tracking one tool invocation
pub fn invocation_span(tool: &str, request_id: &str, session_id: Option<&str>) -> Span {
    span!(
        Level::INFO,
        "tool_invocation",
        tool = %tool,
        request_id = %request_id,
        session_id = session_id,
    )
}

/// Log invocation events
pub fn log_invocation_start(tool: &str, request_id: &str) {
    debug!(
        tool = %tool,
        request_id = %request_id,
        event = "invocation_start",
        "Dispatching tool invocation"
    );
}

pub fn log_invocation_success(tool: &str, duration: Duration) {
    info!(
        tool = %tool,
        duration_ms = duration.as_millis(),
        event = "invocation_success",
        "Tool invocation completed"
    );
}

pub fn log_invocation_error(tool: &str, code: &str, error: &str, duration: Duration) {
    error!(
        tool = %tool,
        code = %code,
        error = %error,
        duration_ms = duration.as_millis(),
        event = "invocation_error",
        "Tool invocation failed"
    );
}

pub fn log_unknown_tool(tool: &str) {
    warn!(
        tool = %tool,
        event = "unknown_tool",
        "Unknown tool requested"
    );
}

pub fn log_validation_failure(tool: &str, path: &str) {
    warn!(
        tool = %tool,
        path = %path,
        event = "validation_failure",
        "Arguments rejected before handler"
    );
}

/// Log template resolution events
pub fn log_template_resolved(uri: &str, cache_hit: bool) {
    debug!(
        uri = %uri,
        cache_hit = cache_hit,
        event = "template_resolved",
        "Widget template resolved"
    );
}

/// Server lifecycle logging
pub fn log_server_startup(port: u16) {
    info!(
        port = port,
        event = "server_startup",
        "Starting gateway server"
    );
}

pub fn log_server_ready(addr: &str) {
    info!(
        address = %addr,
        event = "server_ready",
        "Gateway server ready and listening"
    );
}

pub fn log_server_shutdown() {
    info!(event = "server_shutdown", "Gateway server shutting down");
}
