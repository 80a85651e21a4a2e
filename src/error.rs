// src/error.rs

//! Unified error handling for the graph builder.

use std::fmt;

use thiserror::Error;

/// Result type alias for graph builder operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client could not be constructed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Regex compilation failed
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// A request failed for good
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A channel could not be loaded even at the smallest page size
    #[error("Failed to load channel '{slug}' (per={per_page}): {source}")]
    ChannelLoad {
        slug: String,
        per_page: usize,
        #[source]
        source: FetchError,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a channel load error.
    pub fn channel_load(slug: impl Into<String>, per_page: usize, source: FetchError) -> Self {
        Self::ChannelLoad {
            slug: slug.into(),
            per_page,
            source,
        }
    }
}

/// Whether a failed request is worth repeating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Transient,
    Fatal,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorClass::Transient => f.write_str("transient"),
            ErrorClass::Fatal => f.write_str("fatal"),
        }
    }
}

/// Failure of a single API request.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// Timeout, connection reset, or any other transport-level failure
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The body was not the JSON we expected
    #[error("malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Retry budget spent on transient failures
    #[error("gave up on {url} after {attempts} attempts: {last}")]
    Exhausted {
        url: String,
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },
}

impl FetchError {
    /// Classify this error against the set of retryable HTTP statuses.
    pub fn class(&self, retryable_statuses: &[u16]) -> ErrorClass {
        match self {
            FetchError::Status { status, .. } if retryable_statuses.contains(status) => {
                ErrorClass::Transient
            }
            FetchError::Status { .. } => ErrorClass::Fatal,
            FetchError::Transport { .. } | FetchError::Decode { .. } => ErrorClass::Transient,
            FetchError::Exhausted { .. } => ErrorClass::Fatal,
        }
    }
}
