//! Typed errors for the search pipeline.
//!
//! Blocked pages and malformed model answers are not errors at the pipeline
//! level: the fetcher reports a blocked page as `Ok(None)` and the judge
//! folds a [`JudgeError`] into a failed outcome. These types describe what
//! went wrong underneath.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while fetching a profile page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request exceeded the client timeout
    #[error("timeout fetching {url}")]
    Timeout { url: String },

    /// Connection, DNS or body read failure
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-success status other than 403
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl FetchError {
    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Request {
                url: url.to_string(),
                source: err,
            }
        }
    }
}

/// Errors raised while asking the model for a verdict.
#[derive(Debug, Error)]
pub enum JudgeError {
    /// The chat model call itself failed
    #[error("model call failed: {0}")]
    Model(String),

    /// The response lacks a complete `<answer>...</answer>` block
    #[error("response has no answer block: {excerpt:?}")]
    MalformedResponse { excerpt: String },
}

/// Errors raised while reading or writing the profile store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid profile JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for judge operations.
pub type JudgeResult<T> = std::result::Result<T, JudgeError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
