use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get, post},
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::event::{InboundEvent, InvocationContext, OutboundResponse};
use crate::handler::ChatRelayHandler;

/// Header carrying a caller- or proxy-assigned correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Run the HTTP server
pub async fn run(
    handler: Arc<ChatRelayHandler>,
    bind_addr: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(handler);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Create the router with all routes
pub fn create_router(handler: Arc<ChatRelayHandler>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/chat", any(chat_handler))
        .route("/invoke", post(invoke_handler))
        .with_state(handler)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Health check handler
async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Plain HTTP entry point - any method on /chat
async fn chat_handler(
    State(handler): State<Arc<ChatRelayHandler>>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let ctx = context_from_headers(&headers);
    let body = match decode_body(body) {
        Ok(body) => body,
        // Only POST reads the body; other methods are answered regardless.
        Err(e) if method == Method::POST => {
            warn!(request_id = %ctx.request_id, "Rejected chat body: {}", e);
            return into_http_response(OutboundResponse::error(500, e.to_string()));
        }
        Err(_) => None,
    };
    let event = InboundEvent {
        http_method: Some(method.as_str().to_string()),
        headers: Some(flatten_headers(&headers)),
        body: body.map(Some),
        request_context: None,
    };

    let response = handler.handle(&event, &ctx).await;
    into_http_response(response)
}

/// Platform entry point - POST /invoke with a serialized event
async fn invoke_handler(
    State(handler): State<Arc<ChatRelayHandler>>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<OutboundResponse> {
    let event: InboundEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!("Invalid invocation event: {}", e);
            return Json(OutboundResponse::error(500, e.to_string()));
        }
    };

    let ctx = match event.request_id() {
        Some(request_id) => InvocationContext::new(request_id),
        None => context_from_headers(&headers),
    };

    Json(handler.handle(&event, &ctx).await)
}

/// An empty body is absent. Invalid UTF-8 is an error, never replaced.
fn decode_body(body: Bytes) -> Result<Option<String>, std::string::FromUtf8Error> {
    if body.is_empty() {
        return Ok(None);
    }
    String::from_utf8(body.to_vec()).map(Some)
}

fn context_from_headers(headers: &HeaderMap) -> InvocationContext {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(InvocationContext::new)
        .unwrap_or_else(InvocationContext::generate)
}

fn flatten_headers(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect()
}

fn into_http_response(response: OutboundResponse) -> Response {
    let mut builder = Response::builder().status(response.status_code);
    for (name, value) in &response.headers {
        builder = builder.header(name, value);
    }

    builder.body(Body::from(response.body)).unwrap_or_else(|e| {
        error!("Failed to build HTTP response: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    })
}
