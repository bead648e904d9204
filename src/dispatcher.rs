//! Invocation Dispatcher
//!
//! The request pipeline for one tool call: look the tool up, validate the
//! arguments against its input schema, run the handler under a deadline,
//! and normalize whatever happens into an [`InvocationResult`].
//!
//! Containment is the load-bearing property here: a handler failure
//! (error, panic, or timeout) is converted into an error result for that
//! request alone. It never crosses the transport boundary as a crash and
//! never disturbs sibling in-flight invocations.

use {
    crate::{
        content::InvocationResult,
        error::{GatewayError, GatewayResult},
        gateway::Gateway,
        logging,
        session::WidgetStateStore,
        validation::validate_arguments,
    },
    futures_util::FutureExt,
    serde::{Deserialize, Serialize},
    serde_json::{json, Value},
    std::{any::Any, panic::AssertUnwindSafe, sync::Arc, time::Instant},
    tokio::time::timeout,
    tracing::Instrument,
};

fn empty_arguments() -> Value {
    Value::Object(serde_json::Map::new())
}

/// One tool-call request as delivered by the transport layer, already
/// authenticated and deserialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationRequest {
    /// Name of the tool to invoke
    pub tool: String,

    /// Arguments object; absent means `{}`
    #[serde(default = "empty_arguments")]
    pub arguments: Value,

    /// Conversation-scoped session identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Client locale, passed through to handlers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl InvocationRequest {
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            arguments: empty_arguments(),
            session_id: None,
            locale: None,
        }
    }

    pub fn with_arguments(mut self, arguments: Value) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

/// Per-invocation context handed to tool handlers
#[derive(Clone)]
pub struct ToolContext {
    /// Session ID for this invocation, if the client sent one
    pub session_id: Option<String>,
    /// Client locale, if known
    pub locale: Option<String>,
    sessions: Arc<WidgetStateStore>,
}

impl ToolContext {
    pub(crate) fn new(
        session_id: Option<String>,
        locale: Option<String>,
        sessions: Arc<WidgetStateStore>,
    ) -> Self {
        Self {
            session_id,
            locale,
            sessions,
        }
    }

    /// Read this session's widget state; `Value::Null` when unset or when
    /// the invocation has no session.
    pub async fn widget_state(&self) -> Value {
        match &self.session_id {
            Some(id) => self.sessions.get(id).await,
            None => Value::Null,
        }
    }

    /// Replace this session's widget state
    pub async fn set_widget_state(&self, state: Value) -> GatewayResult<()> {
        let id = self.session_id.as_ref().ok_or(GatewayError::NoSession)?;
        self.sessions.set(id, state).await
    }

    /// Atomically read-modify-write this session's widget state
    pub async fn update_widget_state<F>(&self, f: F) -> GatewayResult<Value>
    where
        F: FnOnce(&mut Value),
    {
        let id = self.session_id.as_ref().ok_or(GatewayError::NoSession)?;
        self.sessions.update(id, f).await
    }
}

impl<C: Send + Sync + 'static> Gateway<C> {
    /// Invoke a tool. Never fails at this boundary: every error becomes a
    /// contained result with `structured_content.error == true`.
    pub async fn invoke(&self, request: InvocationRequest) -> InvocationResult {
        let request_id = logging::generate_request_id();
        let span =
            logging::invocation_span(&request.tool, &request_id, request.session_id.as_deref());

        async move {
            let start = Instant::now();
            logging::log_invocation_start(&request.tool, &request_id);

            // Optional gateway-wide concurrency gate; the permit is held
            // for the whole invocation.
            let _permit = match &self.inner.invocation_gate {
                Some(gate) => match gate.clone().acquire_owned().await {
                    Ok(permit) => Some(permit),
                    Err(_) => {
                        return GatewayError::Internal("invocation gate closed".to_string())
                            .into_result()
                    }
                },
                None => None,
            };

            match self.try_invoke(&request).await {
                Ok(result) => {
                    logging::log_invocation_success(&request.tool, start.elapsed());
                    result
                }
                Err(err) => {
                    logging::log_invocation_error(
                        &request.tool,
                        err.code(),
                        &err.to_string(),
                        start.elapsed(),
                    );
                    err.into_result()
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn try_invoke(&self, request: &InvocationRequest) -> GatewayResult<InvocationResult> {
        let (def, func) = self.inner.registry.entry(&request.tool).ok_or_else(|| {
            logging::log_unknown_tool(&request.tool);
            GatewayError::UnknownTool(request.tool.clone())
        })?;

        // Reject bad arguments before the handler ever runs
        if let Err(err) = validate_arguments(&def.input_schema, &request.arguments) {
            if let GatewayError::Validation { ref path, .. } = err {
                logging::log_validation_failure(&request.tool, path);
            }
            return Err(err);
        }

        let tool_ctx = ToolContext::new(
            request.session_id.clone(),
            request.locale.clone(),
            self.inner.sessions.clone(),
        );

        let handler_future = func(
            request.arguments.clone(),
            self.inner.context.clone(),
            tool_ctx,
        );

        // catch_unwind contains handler panics; timeout bounds handler
        // latency. Session locks are never held across this await.
        let guarded = AssertUnwindSafe(handler_future).catch_unwind();
        let deadline = self.inner.config.invocation_timeout;

        let mut result = match timeout(deadline, guarded).await {
            Err(_) => {
                return Err(GatewayError::Timeout {
                    tool: request.tool.clone(),
                    timeout_ms: deadline.as_millis() as u64,
                })
            }
            Ok(Err(panic)) => return Err(GatewayError::Handler(panic_message(panic))),
            Ok(Ok(Err(err))) => return Err(GatewayError::Handler(err.to_string())),
            Ok(Ok(Ok(result))) => result,
        };

        // Attach the template reference for the client to resolve lazily;
        // rendering never happens on the invocation path.
        if let Some(uri) = &def.output_template_uri {
            result = result.with_meta_entry("output_template", json!(uri));
        }

        Ok(result)
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("handler panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("handler panicked: {message}")
    } else {
        "handler panicked".to_string()
    }
}
