//! # Command-line surface
//!
//! `getman-probe [URL] [OPTIONS]` sends one JSON POST and prints the streamed
//! reply. Exit codes are meant for CI: see [`exit_code`].

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{ArgGroup, Parser};

use crate::config::{
    DEFAULT_INPUT, DEFAULT_MAX_LINE_BYTES, DEFAULT_URL, ProbeConfig, input_payload, parse_payload,
};
use crate::error::{ErrorKind, ProbeError, Result};
use crate::http::headers::parse_header_lines;
use crate::http::response::ProbeOutcome;
use crate::report::OutputFormat;

/// POST a JSON payload to a streaming endpoint and print the response lines.
#[derive(Parser, Debug)]
#[command(name = "getman-probe")]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("body").args(["data", "data_file", "input"])))]
pub struct Args {
    /// Endpoint to POST to.
    #[arg(value_name = "URL", default_value = DEFAULT_URL)]
    pub url: String,

    /// Request body as a JSON object.
    #[arg(short, long, value_name = "JSON")]
    pub data: Option<String>,

    /// Read the JSON object body from a file.
    #[arg(long, value_name = "PATH")]
    pub data_file: Option<PathBuf>,

    /// Shorthand for a `{"input": TEXT}` body.
    #[arg(short, long, value_name = "TEXT")]
    pub input: Option<String>,

    /// Extra request header, `Key: Value`. Repeatable.
    #[arg(short = 'H', long = "header", value_name = "HEADER")]
    pub headers: Vec<String>,

    /// Seconds to wait for the connection and response headers.
    #[arg(short, long, value_name = "SECS", default_value = "60", value_parser = parse_seconds)]
    pub timeout: Duration,

    /// Abort when no data arrives for this many seconds.
    #[arg(long, value_name = "SECS", value_parser = parse_seconds)]
    pub idle_timeout: Option<Duration>,

    /// Abort the whole run after this many seconds.
    #[arg(long, value_name = "SECS", value_parser = parse_seconds)]
    pub max_duration: Option<Duration>,

    /// Longest line accepted from the stream.
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_LINE_BYTES)]
    pub max_line_bytes: usize,

    /// Print only the stream lines, without the request banner.
    #[arg(long)]
    pub raw: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Raise log verbosity on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn to_config(&self) -> Result<ProbeConfig> {
        let payload = if let Some(raw) = &self.data {
            parse_payload(raw)?
        } else if let Some(path) = &self.data_file {
            let raw = std::fs::read_to_string(path).map_err(|e| {
                ProbeError::InvalidOption(format!("failed to read `{}`: {e}", path.display()))
            })?;
            parse_payload(&raw)?
        } else {
            input_payload(self.input.as_deref().unwrap_or(DEFAULT_INPUT))
        };

        if self.max_line_bytes == 0 {
            return Err(ProbeError::InvalidOption(
                "--max-line-bytes must be greater than zero".to_string(),
            ));
        }

        let headers = parse_header_lines(self.headers.iter().map(String::as_str))?;

        let mut config = ProbeConfig::new(self.url.clone(), payload)
            .with_timeout(self.timeout)
            .with_headers(headers)
            .with_max_line_bytes(self.max_line_bytes);
        if let Some(idle) = self.idle_timeout {
            config = config.with_idle_timeout(idle);
        }
        if let Some(limit) = self.max_duration {
            config = config.with_max_duration(limit);
        }
        Ok(config)
    }

    /// Log filter used when `RUST_LOG` is unset.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// Seconds as a positive decimal, e.g. `60` or `0.5`.
fn parse_seconds(raw: &str) -> std::result::Result<Duration, String> {
    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("`{raw}` is not a number of seconds"))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(format!("`{raw}` must be greater than zero"));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| format!("`{raw}` is out of range: {e}"))
}

/// Maps a finished run to the process exit code.
///
/// `0` when the stream completed, `2` for bad options (as clap does for usage
/// errors), `130` when interrupted, `1` otherwise.
pub fn exit_code(result: &Result<ProbeOutcome>) -> ExitCode {
    match result {
        Ok(outcome) if outcome.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(err) if err.kind() == ErrorKind::Config => ExitCode::from(2),
        Err(err) if err.kind() == ErrorKind::Cancelled => ExitCode::from(130),
        Err(_) => ExitCode::from(1),
    }
}
