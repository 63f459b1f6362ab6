//! Probe configuration.

use std::time::Duration;

use reqwest::header::HeaderMap;
use serde_json::{Map, Value};

use crate::error::{ProbeError, Result};

pub const DEFAULT_URL: &str = "http://localhost:8081/api/chat/stream";
pub const DEFAULT_INPUT: &str = "Planning a trip to Tokyo";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;

/// JSON object sent as the request body.
pub type Payload = Map<String, Value>;

/// Everything a single probe run needs.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub url: String,
    pub payload: Payload,
    pub headers: HeaderMap,
    /// Bounds connection establishment and response headers, not the body.
    pub timeout: Duration,
    /// Maximum gap between two body chunks. `None` waits forever.
    pub idle_timeout: Option<Duration>,
    /// Overall deadline measured from the moment the request is sent.
    pub max_duration: Option<Duration>,
    pub max_line_bytes: usize,
}

impl ProbeConfig {
    pub fn new(url: impl Into<String>, payload: Payload) -> Self {
        Self {
            url: url.into(),
            payload,
            headers: HeaderMap::new(),
            timeout: DEFAULT_TIMEOUT,
            idle_timeout: None,
            max_duration: None,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = Some(idle_timeout);
        self
    }

    pub fn with_max_duration(mut self, max_duration: Duration) -> Self {
        self.max_duration = Some(max_duration);
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_max_line_bytes(mut self, max_line_bytes: usize) -> Self {
        self.max_line_bytes = max_line_bytes;
        self
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self::new(DEFAULT_URL, input_payload(DEFAULT_INPUT))
    }
}

/// Builds the `{"input": text}` body the chat stream endpoints expect.
pub fn input_payload(text: &str) -> Payload {
    let mut payload = Map::new();
    payload.insert("input".to_string(), Value::String(text.to_string()));
    payload
}

/// Parses a JSON document that must be an object.
pub fn parse_payload(raw: &str) -> Result<Payload> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| ProbeError::InvalidPayload(format!("not valid JSON: {e}")))?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(ProbeError::InvalidPayload(format!(
            "expected a JSON object, got {}",
            json_type_name(&other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
