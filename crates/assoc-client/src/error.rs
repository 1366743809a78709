//! Error type for assoc-client.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("could not encode query: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("request failed: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),

    #[error("reading response failed: {0}")]
    Body(#[from] hyper::Error),

    /// Non-200 response whose body was not a backend `{"error": ...}` object.
    #[error("server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("no response within {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("query cancelled")]
    Cancelled,
}
