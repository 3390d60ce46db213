//! Chat completion errors.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LlmError>;

#[derive(Debug, Error)]
pub enum LlmError {
    /// The request never got a response (connect, DNS, timeout)
    #[error("chat completion request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The endpoint answered with a non-2xx status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not a chat completion
    #[error("invalid chat completion body: {0}")]
    Decode(#[source] reqwest::Error),

    /// No choice carried message content
    #[error("chat completion has no message content")]
    EmptyResponse,
}

impl LlmError {
    /// The request hit the HTTP client's timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, LlmError::Request(e) if e.is_timeout())
    }
}
