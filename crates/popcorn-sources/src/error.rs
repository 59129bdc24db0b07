use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// The API answered but reported no match.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The API answered with nothing usable (no title, no id).
    #[error("empty response payload")]
    EmptyPayload,

    /// Superseded by a newer request. Never shown to the user.
    #[error("request cancelled")]
    Cancelled,
}
