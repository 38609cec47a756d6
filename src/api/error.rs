use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by the remote project API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connection refused, timeout, TLS, ...).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The response body was not the JSON shape we expected.
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// A create response came back without a server-assigned id.
    #[error("create response did not carry a server-assigned id")]
    MissingId,

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

pub type ApiResult<T> = Result<T, ApiError>;
