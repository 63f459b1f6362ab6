use reqwest::Url;
use reqwest::header::HeaderMap;

use crate::config::{Payload, ProbeConfig};
use crate::error::{ProbeError, Result};

/// A validated, immutable POST request.
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    url: Url,
    payload: Payload,
    headers: HeaderMap,
}

impl ProbeRequest {
    pub fn new(url: &str, payload: Payload, headers: HeaderMap) -> Result<Self> {
        let url = parse_url(url)?;
        Ok(Self {
            url,
            payload,
            headers,
        })
    }

    pub fn from_config(config: &ProbeConfig) -> Result<Self> {
        Self::new(&config.url, config.payload.clone(), config.headers.clone())
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Compact JSON, as sent on the wire.
    pub fn body(&self) -> String {
        serde_json::Value::Object(self.payload.clone()).to_string()
    }
}

fn parse_url(raw: &str) -> Result<Url> {
    let invalid = |reason: String| ProbeError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme `{other}`"))),
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}
