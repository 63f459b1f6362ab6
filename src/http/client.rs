use std::time::Duration;

use reqwest::{Client, Response};

use super::request::ProbeRequest;
use crate::error::{ProbeError, Result};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Builds a client for a single probe.
///
/// Only the connect phase gets a client-level timeout. reqwest's request
/// timeout would also cover the body, which for a live stream is unbounded;
/// the header wait is bounded in [`send_request`] instead.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(timeout)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(ProbeError::Client)
}

/// POSTs the payload as JSON and waits at most `timeout` for response headers.
/// The returned response body has not been read.
pub async fn send_request(client: &Client, request: &ProbeRequest, timeout: Duration) -> Result<Response> {
    let builder = client
        .post(request.url().clone())
        .headers(request.headers().clone())
        .json(request.payload());

    match tokio::time::timeout(timeout, builder.send()).await {
        Ok(result) => result.map_err(ProbeError::Connect),
        Err(_) => Err(ProbeError::Timeout(timeout)),
    }
}
