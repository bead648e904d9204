//! Gateway configuration
//!
//! Configurable limits and timeouts to keep a gateway instance from being
//! exhausted by misbehaving clients or handlers.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a gateway instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Deadline for a single tool invocation, handler time included
    pub invocation_timeout: Duration,

    /// Maximum number of sessions holding widget state
    pub max_sessions: Option<usize>,

    /// Maximum number of tools that can be registered
    pub max_tools: Option<usize>,

    /// Maximum request body size in bytes (HTTP adapter)
    pub max_request_bytes: u64,

    /// Cap on invocations running at once; `None` means unlimited
    pub max_concurrent_invocations: Option<usize>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            invocation_timeout: Duration::from_secs(30),
            max_sessions: Some(10_000),
            max_tools: Some(1_000),
            max_request_bytes: 2 * 1024 * 1024, // 2MB
            max_concurrent_invocations: None,
        }
    }
}

impl GatewayConfig {
    /// Create an unlimited configuration (use with caution)
    pub fn unlimited() -> Self {
        Self {
            invocation_timeout: Duration::from_secs(300),
            max_sessions: None,
            max_tools: None,
            max_request_bytes: u64::MAX,
            max_concurrent_invocations: None,
        }
    }

    /// Create strict limits for testing or restricted environments
    pub fn strict() -> Self {
        Self {
            invocation_timeout: Duration::from_secs(5),
            max_sessions: Some(100),
            max_tools: Some(50),
            max_request_bytes: 256 * 1024, // 256KB
            max_concurrent_invocations: Some(32),
        }
    }

    /// Override the invocation timeout
    pub fn with_invocation_timeout(mut self, timeout: Duration) -> Self {
        self.invocation_timeout = timeout;
        self
    }
}
