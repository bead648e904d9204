//! Health check functionality for gateway servers
//!
//! Provides a simple health check that monitoring systems can use to verify
//! the gateway is running and get basic status information.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Health check response structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Health status (always "healthy" if responding)
    pub status: String,

    /// Current timestamp in seconds since Unix epoch
    pub timestamp: u64,

    /// Gateway version
    pub version: String,

    /// Number of registered tools
    pub tool_count: usize,

    /// Number of sessions holding widget state
    pub session_count: usize,

    /// Server uptime in seconds
    pub uptime_seconds: u64,

    /// Additional metadata
    pub metadata: Option<serde_json::Value>,
}

/// Health check provider for gateway servers
#[derive(Debug, Clone)]
pub struct HealthChecker {
    start_time: SystemTime,
    version: String,
    gateway_name: String,
}

impl HealthChecker {
    /// Create a new health checker
    pub fn new(gateway_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            start_time: SystemTime::now(),
            version: version.into(),
            gateway_name: gateway_name.into(),
        }
    }

    /// Get current health status
    pub fn get_status(&self, tool_count: usize, session_count: usize) -> HealthStatus {
        let now = SystemTime::now();
        let timestamp = now.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();

        let uptime_seconds = now
            .duration_since(self.start_time)
            .unwrap_or_default()
            .as_secs();

        HealthStatus {
            status: "healthy".to_string(),
            timestamp,
            version: self.version.clone(),
            tool_count,
            session_count,
            uptime_seconds,
            metadata: Some(serde_json::json!({
                "gateway_name": self.gateway_name,
            })),
        }
    }

    /// Get a simple JSON health response
    pub fn get_json_status(&self, tool_count: usize, session_count: usize) -> serde_json::Value {
        serde_json::to_value(self.get_status(tool_count, session_count)).unwrap_or_else(|_| {
            serde_json::json!({
                "status": "error",
                "message": "Failed to serialize health status"
            })
        })
    }
}

impl Default for HealthChecker {
    fn default() -> Self {
        Self::new("toolgate", env!("CARGO_PKG_VERSION"))
    }
}
