//! Wire-level tests for the Ollama provider against a throwaway local HTTP server.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use provider::{EmbeddingProvider, OllamaProvider, ProviderConfig, ProviderError};
use serde_json::{json, Value};

#[derive(Clone)]
struct MockOllama {
    embed_reply: (StatusCode, Value),
    generate_reply: (StatusCode, Value),
    seen: Arc<Mutex<Vec<(String, Value)>>>,
}

impl MockOllama {
    fn new(embed_reply: (StatusCode, Value), generate_reply: (StatusCode, Value)) -> Self {
        Self {
            embed_reply,
            generate_reply,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn requests(&self) -> Vec<(String, Value)> {
        self.seen.lock().unwrap().clone()
    }
}

async fn embed_handler(State(mock): State<MockOllama>, Json(body): Json<Value>) -> Response {
    mock.seen.lock().unwrap().push(("/api/embed".into(), body));
    let (status, reply) = mock.embed_reply.clone();
    (status, Json(reply)).into_response()
}

async fn generate_handler(State(mock): State<MockOllama>, Json(body): Json<Value>) -> Response {
    mock.seen.lock().unwrap().push(("/api/generate".into(), body));
    let (status, reply) = mock.generate_reply.clone();
    (status, Json(reply)).into_response()
}

async fn spawn_mock(mock: MockOllama) -> SocketAddr {
    let app = Router::new()
        .route("/api/embed", post(embed_handler))
        .route("/api/generate", post(generate_handler))
        .with_state(mock);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn provider_for(addr: SocketAddr, dimension: usize) -> OllamaProvider {
    OllamaProvider::new(&ProviderConfig {
        base_url: format!("http://{addr}"),
        dimension,
        timeout_secs: 5,
        ..Default::default()
    })
    .unwrap()
}

fn ok(value: Value) -> (StatusCode, Value) {
    (StatusCode::OK, value)
}

#[tokio::test]
async fn embed_sends_model_and_input_and_returns_first_vector() {
    let mock = MockOllama::new(
        ok(json!({ "model": "nomic-embed-text", "embeddings": [[0.1, 0.2, 0.3, 0.4]] })),
        ok(json!({ "response": "unused" })),
    );
    let addr = spawn_mock(mock.clone()).await;
    let provider = provider_for(addr, 4);

    let vector = provider.embed("What is photosynthesis?", None).await.unwrap();
    assert_eq!(vector, vec![0.1, 0.2, 0.3, 0.4]);

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, "/api/embed");
    assert_eq!(
        requests[0].1,
        json!({ "model": "nomic-embed-text", "input": "What is photosynthesis?" })
    );
}

#[tokio::test]
async fn explicit_model_overrides_default() {
    let mock = MockOllama::new(
        ok(json!({ "embeddings": [[1.0, 0.0]] })),
        ok(json!({ "response": "hi" })),
    );
    let addr = spawn_mock(mock.clone()).await;
    let provider = provider_for(addr, 2);

    provider.embed("text", Some("mxbai-embed-large")).await.unwrap();
    provider.generate("prompt", Some("llama3.1:8b")).await.unwrap();

    let requests = mock.requests();
    assert_eq!(requests[0].1["model"], json!("mxbai-embed-large"));
    assert_eq!(requests[1].1["model"], json!("llama3.1:8b"));
}

#[tokio::test]
async fn generate_disables_streaming_and_returns_response() {
    let mock = MockOllama::new(
        ok(json!({ "embeddings": [] })),
        ok(json!({ "response": "Photosynthesis is the process...", "done": true })),
    );
    let addr = spawn_mock(mock.clone()).await;
    let provider = provider_for(addr, 4);

    let answer = provider.generate("Explain photosynthesis", None).await.unwrap();
    assert_eq!(answer, "Photosynthesis is the process...");

    let requests = mock.requests();
    assert_eq!(requests[0].0, "/api/generate");
    assert_eq!(requests[0].1["model"], json!("qwen2.5:14b"));
    assert_eq!(requests[0].1["stream"], json!(false));
}

#[tokio::test]
async fn non_success_status_is_upstream_error() {
    let mock = MockOllama::new(
        (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "model not loaded" })),
        (StatusCode::SERVICE_UNAVAILABLE, json!({ "error": "busy" })),
    );
    let addr = spawn_mock(mock).await;
    let provider = provider_for(addr, 4);

    let err = provider.embed("text", None).await.unwrap_err();
    assert!(err.is_upstream());
    assert!(matches!(err, ProviderError::Status { status: 500, .. }));
    assert!(err.to_string().contains("model not loaded"));

    let err = provider.generate("prompt", None).await.unwrap_err();
    assert!(matches!(err, ProviderError::Status { status: 503, .. }));
}

#[tokio::test]
async fn empty_embeddings_array_is_malformed_not_empty_vector() {
    let mock = MockOllama::new(
        ok(json!({ "embeddings": [] })),
        ok(json!({ "response": "unused" })),
    );
    let addr = spawn_mock(mock).await;
    let provider = provider_for(addr, 4);

    let err = provider.embed("text", None).await.unwrap_err();
    assert!(matches!(
        err,
        ProviderError::MalformedResponse { operation: "embed", .. }
    ));
}

#[tokio::test]
async fn unexpected_body_shape_is_malformed() {
    let mock = MockOllama::new(
        ok(json!({ "embeddings": "nope" })),
        ok(json!({ "text": "wrong field" })),
    );
    let addr = spawn_mock(mock).await;
    let provider = provider_for(addr, 4);

    assert!(matches!(
        provider.embed("text", None).await,
        Err(ProviderError::MalformedResponse { .. })
    ));
    assert!(matches!(
        provider.generate("prompt", None).await,
        Err(ProviderError::MalformedResponse { .. })
    ));
}

#[tokio::test]
async fn wrong_dimension_is_rejected() {
    let mock = MockOllama::new(
        ok(json!({ "embeddings": [[0.5, 0.5]] })),
        ok(json!({ "response": "unused" })),
    );
    let addr = spawn_mock(mock).await;
    let provider = provider_for(addr, 768);

    let err = provider.embed("text", None).await.unwrap_err();
    assert!(matches!(
        err,
        ProviderError::DimensionMismatch {
            expected: 768,
            actual: 2
        }
    ));
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let provider = provider_for(addr, 4);
    let err = provider.embed("text", None).await.unwrap_err();
    assert!(matches!(err, ProviderError::Transport { operation: "embed", .. }));
    assert!(err.is_upstream());
}
