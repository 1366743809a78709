//! Fake association backend for integration tests.
//!
//! Spins up a minimal `axum` HTTP server on a random TCP port bound to
//! 127.0.0.1. Serves `POST /query` with a canned status and body, optionally
//! after a delay, and records every request body it receives.
//!
//! # Example
//!
//! ```rust,no_run
//! # async fn demo() {
//! use common::fake_query_api::FakeQueryApi;
//!
//! let api = FakeQueryApi::start().await.unwrap();
//! api.respond(200, r#"[]"#).await;
//!
//! // Point the client at api.base_url()
//! let url = api.base_url();
//! # }
//! ```

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::post,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

struct ApiState {
    status: u16,
    body: String,
    delay: Duration,
    /// Raw bodies of every `POST /query`, oldest first.
    requests: Vec<serde_json::Value>,
    content_types: Vec<String>,
}

impl Default for ApiState {
    fn default() -> Self {
        Self {
            status: 200,
            body: "[]".to_string(),
            delay: Duration::ZERO,
            requests: Vec::new(),
            content_types: Vec::new(),
        }
    }
}

/// Handle to the running fake backend.
pub struct FakeQueryApi {
    addr: SocketAddr,
    state: Arc<Mutex<ApiState>>,
}

impl FakeQueryApi {
    /// Start the fake backend on a random port. Returns once the server is
    /// listening.
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(Mutex::new(ApiState::default()));

        let app = Router::new()
            .route("/query", post(query))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Ok(Self { addr, state })
    }

    /// Base URL for the API (e.g. `http://127.0.0.1:PORT`).
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Set the status and JSON body returned by `POST /query`.
    pub async fn respond(&self, status: u16, body: &str) {
        let mut state = self.state.lock().await;
        state.status = status;
        state.body = body.to_string();
    }

    /// Hold every response back by `delay`.
    pub async fn delay(&self, delay: Duration) {
        self.state.lock().await.delay = delay;
    }

    /// Request bodies received so far, parsed as JSON.
    pub async fn requests(&self) -> Vec<serde_json::Value> {
        self.state.lock().await.requests.clone()
    }

    /// `Content-Type` header of every request received so far.
    pub async fn content_types(&self) -> Vec<String> {
        self.state.lock().await.content_types.clone()
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

async fn query(
    State(state): State<Arc<Mutex<ApiState>>>,
    headers: axum::http::HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let (status, reply, delay) = {
        let mut state = state.lock().await;
        let parsed = serde_json::from_slice(&body)
            .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(&body).into()));
        state.requests.push(parsed);
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        state.content_types.push(content_type);
        (state.status, state.body.clone(), state.delay)
    };

    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, "application/json")], reply)
}
