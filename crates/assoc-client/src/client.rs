//! HTTP client for `POST /query`.
//!
//! One request per call. The whole exchange (connect, send, read body) is
//! bounded by [`ClientConfig::timeout`]; [`QueryClient::query_cancellable`]
//! additionally races it against a [`CancellationToken`].

use crate::error::ClientError;
use assoc_core::{config::ServerConfig, format_response, Query, QueryResult};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{
    header::{HeaderValue, CONTENT_TYPE},
    Method, Request, StatusCode, Uri,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Longest slice of an unexpected response body kept in [`ClientError::Status`].
const BODY_PREVIEW_CHARS: usize = 200;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, e.g. `http://127.0.0.1:5000`.
    pub base_url: String,
    pub timeout: Duration,
}

impl From<&ServerConfig> for ClientConfig {
    fn from(server: &ServerConfig) -> Self {
        Self {
            base_url: server.url.clone(),
            timeout: server.timeout(),
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// What the backend answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    Results(QueryResult),
    /// The backend's `{"error": ...}` message, to be shown as-is.
    ServerError(String),
}

impl QueryOutcome {
    /// Display text: formatted chains, or the backend error verbatim.
    pub fn render(&self) -> String {
        match self {
            QueryOutcome::Results(result) => format_response(result),
            QueryOutcome::ServerError(message) => message.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct QueryClient {
    endpoint: Uri,
    timeout: Duration,
    http: Client<HttpConnector, Full<Bytes>>,
}

impl QueryClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let url = format!("{}/query", config.base_url.trim_end_matches('/'));
        let endpoint = url.parse::<Uri>().map_err(|e| ClientError::InvalidUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            endpoint,
            timeout: config.timeout,
            http: Client::builder(TokioExecutor::new()).build_http(),
        })
    }

    pub fn endpoint(&self) -> &Uri {
        &self.endpoint
    }

    /// Send `query` and wait for the answer, up to the configured timeout.
    pub async fn query(&self, query: &Query) -> Result<QueryOutcome, ClientError> {
        tracing::info!(
            endpoint = %self.endpoint,
            terms = query.terms.len(),
            stages = ?query.stages,
            "sending query"
        );
        let outcome = tokio::time::timeout(self.timeout, self.send(query))
            .await
            .map_err(|_| ClientError::Timeout(self.timeout))?;

        match &outcome {
            Ok(QueryOutcome::Results(result)) => {
                tracing::info!(results = result.len(), "query finished")
            }
            Ok(QueryOutcome::ServerError(message)) => {
                tracing::warn!(%message, "backend reported an error")
            }
            Err(e) => tracing::warn!(error = %e, "query failed"),
        }
        outcome
    }

    /// Like [`query`](Self::query), but gives up with [`ClientError::Cancelled`]
    /// as soon as `token` is cancelled.
    pub async fn query_cancellable(
        &self,
        query: &Query,
        token: CancellationToken,
    ) -> Result<QueryOutcome, ClientError> {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::info!("query cancelled");
                Err(ClientError::Cancelled)
            }
            outcome = self.query(query) => outcome,
        }
    }

    async fn send(&self, query: &Query) -> Result<QueryOutcome, ClientError> {
        let body = serde_json::to_vec(query).map_err(ClientError::Encode)?;

        let mut request = Request::new(Full::new(Bytes::from(body)));
        *request.method_mut() = Method::POST;
        *request.uri_mut() = self.endpoint.clone();
        request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let response = self.http.request(request).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();
        tracing::debug!(%status, bytes = bytes.len(), "response received");

        decode_response(status, &bytes)
    }
}

/// Interpret a response body.
///
/// A `{"error": ...}` object wins regardless of status. Otherwise anything but
/// 200 is an error, and a 200 body must be a valid result array.
fn decode_response(status: StatusCode, body: &[u8]) -> Result<QueryOutcome, ClientError> {
    let value = match serde_json::from_slice::<Value>(body) {
        Ok(value) => value,
        Err(_) if status != StatusCode::OK => return Err(status_error(status, body)),
        Err(e) => return Err(ClientError::Decode(e)),
    };

    if let Some(message) = value.get("error").and_then(Value::as_str) {
        return Ok(QueryOutcome::ServerError(message.to_string()));
    }
    if status != StatusCode::OK {
        return Err(status_error(status, body));
    }

    serde_json::from_value::<QueryResult>(value)
        .map(QueryOutcome::Results)
        .map_err(ClientError::Decode)
}

fn status_error(status: StatusCode, body: &[u8]) -> ClientError {
    ClientError::Status {
        status: status.as_u16(),
        body: String::from_utf8_lossy(body).chars().take(BODY_PREVIEW_CHARS).collect(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> ClientConfig {
        ClientConfig {
            base_url: base_url.to_string(),
            timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn endpoint_appends_query_path() {
        let client = QueryClient::new(config("http://127.0.0.1:5000/")).unwrap();
        assert_eq!(client.endpoint().to_string(), "http://127.0.0.1:5000/query");
    }

    #[test]
    fn invalid_url_is_rejected() {
        let err = QueryClient::new(config("http://exa mple")).unwrap_err();
        assert!(matches!(err, ClientError::InvalidUrl { .. }), "{err}");
    }

    #[test]
    fn results_body_decodes() {
        let body = br#"[{"cord": ["Homophone","cord","","chord"]}]"#;
        let outcome = decode_response(StatusCode::OK, body).unwrap();
        assert_eq!(outcome.render(), "[chord]\n- cord sounds like chord");
    }

    #[test]
    fn error_object_wins_over_status() {
        for status in [StatusCode::OK, StatusCode::INTERNAL_SERVER_ERROR] {
            let outcome = decode_response(status, br#"{"error": "no stages given"}"#).unwrap();
            assert_eq!(outcome, QueryOutcome::ServerError("no stages given".to_string()));
        }
    }

    #[test]
    fn unexpected_status_is_an_error() {
        let err = decode_response(StatusCode::BAD_GATEWAY, b"<html>bad gateway</html>").unwrap_err();
        match err {
            ClientError::Status { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body, "<html>bad gateway</html>");
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[test]
    fn ragged_chain_fails_to_decode() {
        let err = decode_response(StatusCode::OK, br#"[{"cord": ["Homophone","cord"]}]"#)
            .unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)), "{err}");
    }

    #[test]
    fn non_json_ok_body_fails_to_decode() {
        let err = decode_response(StatusCode::OK, b"not json").unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }
}
