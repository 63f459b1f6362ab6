//! The stream probe: one POST, one streamed response, printed line by line.

use std::io;
use std::time::Duration;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::time::Instant;

use crate::cancel::CancelToken;
use crate::config::ProbeConfig;
use crate::error::{ProbeError, Result};
use crate::http::client::{build_client, send_request};
use crate::http::lines::LineDecoder;
use crate::http::request::ProbeRequest;
use crate::http::response::ProbeOutcome;

/// Destination for received lines.
pub trait LineSink {
    fn line(&mut self, line: &str) -> io::Result<()>;
}

impl LineSink for Vec<String> {
    fn line(&mut self, line: &str) -> io::Result<()> {
        self.push(line.to_string());
        Ok(())
    }
}

/// Sends the configured request and feeds every non-empty response line to
/// `sink` in arrival order.
///
/// Returns once the server closes the stream, or with
/// [`ProbeOutcome::HttpStatus`] when the status is not 200. Transport
/// failures, timeouts and cancellation come back as [`ProbeError`].
pub async fn run_probe<S: LineSink + ?Sized>(
    config: &ProbeConfig,
    sink: &mut S,
    cancel: &mut CancelToken,
) -> Result<ProbeOutcome> {
    let request = ProbeRequest::from_config(config)?;
    let client = build_client(config.timeout)?;
    let started = Instant::now();
    let deadline = config.max_duration.map(|limit| started + limit);

    tracing::info!(url = %request.url(), timeout_secs = config.timeout.as_secs_f64(), "sending probe request");

    let response = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(ProbeError::Cancelled),
        _ = sleep_until(deadline) => return Err(deadline_exceeded(config)),
        result = send_request(&client, &request, config.timeout) => result?,
    };

    let status = response.status().as_u16();
    tracing::debug!(
        status,
        content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("<none>"),
        "response headers received"
    );

    if status != 200 {
        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ProbeError::Cancelled),
            _ = sleep_until(deadline) => return Err(deadline_exceeded(config)),
            body = response.text() => body.map_err(ProbeError::Stream)?,
        };
        tracing::warn!(status, body_len = body.len(), "non-success status, not streaming");
        return Ok(ProbeOutcome::HttpStatus { status, body });
    }

    let mut body = std::pin::pin!(response.bytes_stream());
    let mut decoder = LineDecoder::new(config.max_line_bytes);
    let mut lines = 0u64;
    let mut bytes = 0u64;

    loop {
        let chunk = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(lines, "probe cancelled mid-stream");
                return Err(ProbeError::Cancelled);
            }
            _ = sleep_until(deadline) => return Err(deadline_exceeded(config)),
            chunk = next_chunk(&mut body, config.idle_timeout) => chunk?,
        };

        let Some(chunk) = chunk else {
            break;
        };
        bytes += chunk.len() as u64;
        tracing::trace!(len = chunk.len(), "chunk received");

        decoder.push(&chunk, |line| {
            lines += emit(&mut *sink, &line)?;
            Ok::<_, ProbeError>(())
        })?;
    }

    if let Some(line) = decoder.finish()? {
        lines += emit(sink, &line)?;
    }

    let elapsed = started.elapsed();
    tracing::info!(lines, bytes, elapsed_ms = elapsed.as_millis() as u64, "stream closed by peer");

    Ok(ProbeOutcome::Streamed {
        status,
        lines,
        bytes,
        elapsed,
    })
}

fn emit<S: LineSink + ?Sized>(sink: &mut S, line: &str) -> Result<u64> {
    if line.is_empty() {
        return Ok(0);
    }
    sink.line(line)?;
    Ok(1)
}

async fn next_chunk<B>(body: &mut B, idle_timeout: Option<Duration>) -> Result<Option<Bytes>>
where
    B: Stream<Item = reqwest::Result<Bytes>> + Unpin,
{
    let next = match idle_timeout {
        Some(limit) => tokio::time::timeout(limit, body.next())
            .await
            .map_err(|_| ProbeError::IdleTimeout(limit))?,
        None => body.next().await,
    };
    next.transpose().map_err(ProbeError::Stream)
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn deadline_exceeded(config: &ProbeConfig) -> ProbeError {
    ProbeError::DeadlineExceeded(config.max_duration.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_skips_empty_lines() {
        let mut sink: Vec<String> = Vec::new();
        assert_eq!(emit(&mut sink, "").unwrap(), 0);
        assert_eq!(emit(&mut sink, " ").unwrap(), 1);
        assert_eq!(sink, vec![" "]);
    }
}
