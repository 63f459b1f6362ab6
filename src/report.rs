//! Console output for a probe run.

use std::io::{self, Write};

use serde::Serialize;

use crate::error::{ErrorKind, ProbeError};
use crate::http::request::ProbeRequest;
use crate::http::response::ProbeOutcome;
use crate::probe::LineSink;

const RULE_WIDTH: usize = 60;

/// Output format selected on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable banner and messages.
    #[default]
    Text,
    /// Raw lines on stdout and one JSON summary record on stderr.
    Json,
}

/// Machine-readable record written once per run in [`OutputFormat::Json`].
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProbeSummary {
    Streamed {
        status: u16,
        lines: u64,
        bytes: u64,
        elapsed_ms: u64,
    },
    HttpStatus {
        status: u16,
        body: String,
    },
    Error {
        kind: ErrorKind,
        message: String,
    },
}

impl From<&ProbeOutcome> for ProbeSummary {
    fn from(outcome: &ProbeOutcome) -> Self {
        match outcome {
            ProbeOutcome::Streamed {
                status,
                lines,
                bytes,
                elapsed,
            } => ProbeSummary::Streamed {
                status: *status,
                lines: *lines,
                bytes: *bytes,
                elapsed_ms: elapsed.as_millis() as u64,
            },
            ProbeOutcome::HttpStatus { status, body } => ProbeSummary::HttpStatus {
                status: *status,
                body: body.clone(),
            },
        }
    }
}

impl From<&ProbeError> for ProbeSummary {
    fn from(err: &ProbeError) -> Self {
        ProbeSummary::Error {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Writes probe output: stream lines and status go to `out`, failures and
/// JSON summaries to `err`.
pub struct Reporter<O: Write, E: Write> {
    out: O,
    err: E,
    format: OutputFormat,
    banner: bool,
}

impl<O: Write, E: Write> Reporter<O, E> {
    pub fn new(out: O, err: E, format: OutputFormat, banner: bool) -> Self {
        Self {
            out,
            err,
            format,
            banner: banner && format == OutputFormat::Text,
        }
    }

    pub fn banner(&mut self, request: &ProbeRequest) -> io::Result<()> {
        if !self.banner {
            return Ok(());
        }
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(self.out, "Making POST request to: {}", request.url())?;
        writeln!(self.out, "Payload: {}", request.body())?;
        writeln!(self.out)?;
        writeln!(self.out, "{rule}")?;
        writeln!(self.out, "Streaming response:")?;
        writeln!(self.out, "{rule}")?;
        writeln!(self.out)?;
        self.out.flush()
    }

    pub fn outcome(&mut self, outcome: &ProbeOutcome) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => {
                if let ProbeOutcome::HttpStatus { status, body } = outcome {
                    writeln!(self.out, "Error: HTTP {status}")?;
                    writeln!(self.out, "{body}")?;
                }
                self.out.flush()
            }
            OutputFormat::Json => {
                if let ProbeOutcome::HttpStatus { body, .. } = outcome {
                    writeln!(self.out, "{body}")?;
                    self.out.flush()?;
                }
                self.summary(&ProbeSummary::from(outcome))
            }
        }
    }

    pub fn error(&mut self, err: &ProbeError) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => {
                writeln!(self.err, "Error: {err}")?;
                self.err.flush()
            }
            OutputFormat::Json => self.summary(&ProbeSummary::from(err)),
        }
    }

    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }

    fn summary(&mut self, summary: &ProbeSummary) -> io::Result<()> {
        serde_json::to_writer(&mut self.err, summary)?;
        writeln!(self.err)?;
        self.err.flush()
    }
}

impl<O: Write, E: Write> LineSink for Reporter<O, E> {
    fn line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.out, "{line}")?;
        self.out.flush()
    }
}
