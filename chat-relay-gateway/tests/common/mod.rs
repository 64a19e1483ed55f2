//! Shared helpers for integration tests: an in-process mock of the OpenAI
//! Chat Completions endpoint that records every request it receives.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use chat_relay_core::RelayProfile;
use chat_relay_gateway::ChatRelayHandler;
use chat_relay_gateway::providers::OpenAiClientFactory;

/// What the mock answers with.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Status(u16, Value),
}

/// A request seen by the mock.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct MockState {
    reply: MockReply,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

pub struct MockOpenAiServer {
    addr: SocketAddr,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl MockOpenAiServer {
    pub async fn start(reply: MockReply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let captured = Arc::new(Mutex::new(Vec::new()));

        let state = MockState {
            reply,
            captured: Arc::clone(&captured),
        };
        let app = Router::new()
            .route("/v1/chat/completions", post(mock_chat_completions))
            .with_state(state);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            captured,
            _handle: handle,
        }
    }

    pub async fn replying(text: &str) -> Self {
        Self::start(MockReply::Text(text.to_string())).await
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.captured.lock().unwrap().clone()
    }
}

async fn mock_chat_completions(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let model = body
        .get("model")
        .and_then(Value::as_str)
        .unwrap_or("gpt-4o")
        .to_string();

    state.captured.lock().unwrap().push(CapturedRequest {
        authorization,
        body,
    });

    match state.reply {
        MockReply::Text(text) => Json(json!({
            "id": "chatcmpl-mock",
            "object": "chat.completion",
            "created": 1677652288u64,
            "model": model,
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": text},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 9, "completion_tokens": 12, "total_tokens": 21}
        }))
        .into_response(),
        MockReply::Status(status, body) => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(body)).into_response()
        }
    }
}

/// Handler for `profile` pointed at `base_url`, with a test key.
pub fn handler_for(base_url: &str, profile: RelayProfile) -> ChatRelayHandler {
    ChatRelayHandler::new(
        profile,
        Some("sk-test".to_string()),
        Arc::new(OpenAiClientFactory::new(base_url)),
    )
}

/// An address nothing listens on.
pub async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
