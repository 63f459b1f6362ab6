//! Error types returned at the probe boundary.

use std::io;
use std::string::FromUtf8Error;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Result type alias for probe operations.
pub type Result<T> = std::result::Result<T, ProbeError>;

/// Everything that can stop a probe before the stream ends on its own.
///
/// A non-200 response is not an error; see
/// [`ProbeOutcome::HttpStatus`](crate::http::response::ProbeOutcome::HttpStatus).
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Invalid URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request failed: {0}")]
    Connect(#[source] reqwest::Error),

    #[error("Timed out after {}s waiting for response headers", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("No data received for {}s", .0.as_secs_f64())]
    IdleTimeout(Duration),

    #[error("Stream exceeded maximum duration of {}s", .0.as_secs_f64())]
    DeadlineExceeded(Duration),

    #[error("Failed to read response: {0}")]
    Stream(#[source] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] LineError),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),
}

/// Errors raised while splitting the response body into lines.
#[derive(Error, Debug)]
pub enum LineError {
    #[error("line {line} is not valid UTF-8: {source}")]
    InvalidUtf8 {
        line: u64,
        #[source]
        source: FromUtf8Error,
    },

    #[error("line {line} exceeds {limit} bytes")]
    TooLong { line: u64, limit: usize },
}

/// Coarse classification of a [`ProbeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Config,
    Transport,
    Timeout,
    Decode,
    Cancelled,
    Output,
}

impl ProbeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProbeError::InvalidUrl { .. }
            | ProbeError::InvalidPayload(_)
            | ProbeError::InvalidHeader(_)
            | ProbeError::InvalidOption(_)
            | ProbeError::Client(_) => ErrorKind::Config,
            // reqwest reports its own connect timeout as a send error
            ProbeError::Connect(err) if err.is_timeout() => ErrorKind::Timeout,
            ProbeError::Connect(_) | ProbeError::Stream(_) => ErrorKind::Transport,
            ProbeError::Timeout(_)
            | ProbeError::IdleTimeout(_)
            | ProbeError::DeadlineExceeded(_) => ErrorKind::Timeout,
            ProbeError::Decode(_) => ErrorKind::Decode,
            ProbeError::Cancelled => ErrorKind::Cancelled,
            ProbeError::Output(_) => ErrorKind::Output,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind() == ErrorKind::Timeout
    }
}
