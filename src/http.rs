//! Gateway HTTP Adapter
//!
//! Thin transport in front of [`Gateway::invoke`]: it deserializes
//! invocation requests, pins a session identity to each caller, and hands
//! back the result envelope. Per-request failures are already contained in
//! the envelope, so `/invoke` always answers 200; transport-level errors
//! are reserved for malformed transport input.
//!
//! Routes:
//! - `POST /invoke` invokes a tool
//! - `GET  /tools` lists registered tool definitions
//! - `POST /templates/resolve` resolves a widget template URI
//! - `GET  /health` reports health status

use {
    crate::{dispatcher::InvocationRequest, gateway::Gateway},
    rand::Rng,
    serde::Deserialize,
    serde_json::json,
    std::convert::Infallible,
    tracing::debug,
    warp::{http::StatusCode, reply, Filter, Rejection, Reply},
};

const SESSION_COOKIE: &str = "gateway_session";

pub struct HttpGateway<C> {
    gateway: Gateway<C>,
}

impl<C: Send + Sync + 'static> HttpGateway<C> {
    pub fn new(gateway: Gateway<C>) -> Self {
        Self { gateway }
    }

    pub fn routes(&self) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
        let invoke_route = warp::path!("invoke")
            .and(warp::post())
            .and(warp::body::content_length_limit(
                self.gateway.config().max_request_bytes,
            ))
            .and(warp::body::json())
            .and(warp::header::optional::<String>("x-gateway-session"))
            .and(warp::header::optional::<String>("cookie"))
            .and(with_gateway(self.gateway.clone()))
            .and_then(handle_invoke);

        let tools_route = warp::path!("tools")
            .and(warp::get())
            .and(with_gateway(self.gateway.clone()))
            .and_then(handle_tools);

        let resolve_route = warp::path!("templates" / "resolve")
            .and(warp::post())
            .and(warp::body::json())
            .and(with_gateway(self.gateway.clone()))
            .and_then(handle_resolve);

        let health_route = warp::path!("health")
            .and(warp::get())
            .and(with_gateway(self.gateway.clone()))
            .and_then(handle_health);

        invoke_route.or(tools_route).or(resolve_route).or(health_route)
    }
}

fn with_gateway<C: Send + Sync + 'static>(
    gateway: Gateway<C>,
) -> impl Filter<Extract = (Gateway<C>,), Error = Infallible> + Clone {
    warp::any().map(move || gateway.clone())
}

async fn handle_invoke<C: Send + Sync + 'static>(
    mut request: InvocationRequest,
    session_header: Option<String>,
    cookie: Option<String>,
    gateway: Gateway<C>,
) -> Result<impl Reply, Rejection> {
    // Session identity: explicit request field, then header, then cookie,
    // then a fresh id echoed back to the client.
    let session_id = request
        .session_id
        .clone()
        .or(session_header)
        .or_else(|| extract_session_id_from_cookie(&cookie))
        .unwrap_or_else(generate_session_id);

    debug!(tool = %request.tool, session_id = %session_id, "HTTP invoke");
    request.session_id = Some(session_id.clone());

    let result = gateway.invoke(request).await;

    Ok(reply::with_header(
        reply::json(&result),
        "set-cookie",
        format!("{SESSION_COOKIE}={session_id}; Path=/; HttpOnly"),
    ))
}

async fn handle_tools<C: Send + Sync + 'static>(
    gateway: Gateway<C>,
) -> Result<impl Reply, Rejection> {
    Ok(reply::json(&json!({ "tools": gateway.list_tools() })))
}

#[derive(Debug, Deserialize)]
struct ResolveRequest {
    uri: String,
}

async fn handle_resolve<C: Send + Sync + 'static>(
    request: ResolveRequest,
    gateway: Gateway<C>,
) -> Result<impl Reply, Rejection> {
    match gateway.resolve_template(&request.uri).await {
        Ok(template) => Ok(reply::with_status(
            reply::json(&*template),
            StatusCode::OK,
        )),
        Err(err) => Ok(reply::with_status(
            reply::json(&json!({
                "error": true,
                "code": err.code(),
                "message": err.to_string(),
            })),
            StatusCode::NOT_FOUND,
        )),
    }
}

async fn handle_health<C: Send + Sync + 'static>(
    gateway: Gateway<C>,
) -> Result<impl Reply, Rejection> {
    Ok(reply::json(&gateway.health()))
}

pub(crate) fn extract_session_id_from_cookie(cookie: &Option<String>) -> Option<String> {
    let prefix = format!("{SESSION_COOKIE}=");
    cookie.as_ref().and_then(|cookie| {
        cookie.split(';').find_map(|part| {
            let part = part.trim();
            part.strip_prefix(prefix.as_str()).map(|id| id.to_string())
        })
    })
}

pub(crate) fn generate_session_id() -> String {
    rand::rng()
        .sample_iter(rand::distr::Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_parsing_finds_session() {
        let cookie = Some("theme=dark; gateway_session=abc123; lang=en".to_string());
        assert_eq!(
            extract_session_id_from_cookie(&cookie),
            Some("abc123".to_string())
        );
        assert_eq!(extract_session_id_from_cookie(&Some("theme=dark".into())), None);
        assert_eq!(extract_session_id_from_cookie(&None), None);
    }

    #[test]
    fn generated_session_ids_are_distinct() {
        let a = generate_session_id();
        let b = generate_session_id();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }
}
