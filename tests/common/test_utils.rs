use super::mocks::MockUpstreamClient;
use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use bytes::Bytes;
use futures::Stream;
use prompt_relay::{
    Result,
    config::{LogsConfig, ServerConfig, UpstreamConfig},
    relay::Relay,
    server::{self, handlers::AppState},
};
use serde_json::Value;
use std::sync::Arc;

pub const TEST_ORIGIN: &str = "http://localhost:5173";
pub const TEST_MAX_BODY_BYTES: usize = 64 * 1024;

pub fn create_test_upstream_config() -> UpstreamConfig {
    UpstreamConfig {
        base_url: "http://127.0.0.1:11434".to_string(),
        model: "test-model".to_string(),
        request_timeout_secs: 5,
    }
}

pub fn create_test_server_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 8080,
        allowed_origin: TEST_ORIGIN.to_string(),
        max_body_bytes: TEST_MAX_BODY_BYTES,
        logs: LogsConfig {
            level: "debug".to_string(),
        },
    }
}

pub fn create_test_relay(mock: Arc<MockUpstreamClient>) -> Relay {
    Relay::new(mock, &create_test_upstream_config())
}

pub fn create_test_app(mock: Arc<MockUpstreamClient>) -> Router {
    let state = AppState {
        relay: Arc::new(create_test_relay(mock)),
    };
    server::router(state, &create_test_server_config()).unwrap()
}

pub fn post_json(body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn read_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Synthetic transport stream delivering `chunks` in order
pub fn chunk_stream(chunks: Vec<Vec<u8>>) -> impl Stream<Item = Result<Bytes>> + Send + Unpin {
    futures::stream::iter(chunks.into_iter().map(|chunk| Ok(Bytes::from(chunk))))
}

/// Splits `input` at every offset in `cuts`
pub fn split_at(input: &str, cuts: &[usize]) -> Vec<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut chunks = Vec::new();
    let mut start = 0;
    for &cut in cuts {
        chunks.push(bytes[start..cut].to_vec());
        start = cut;
    }
    chunks.push(bytes[start..].to_vec());
    chunks
}

pub const SAMPLE_CONFIG_YAML: &str = r#"
server:
  host: "127.0.0.1"
  port: 9000
  allowed_origin: "http://localhost:5173"
  max_body_bytes: 1048576
  logs:
    level: "debug"

upstream:
  base_url: "http://ollama.internal:11434"
  model: "mistral"
  request_timeout_secs: 60
"#;

pub const PARTIAL_CONFIG_YAML: &str = r#"
upstream:
  model: "phi3"
"#;

pub const INVALID_CONFIG_YAML: &str = r#"
server:
  port: "not-a-number"
"#;
