//! Command-line probe for streaming HTTP endpoints.
//!
//! Sends one JSON POST and hands every non-empty line of the streamed
//! response to a [`LineSink`] as it arrives. The binary prints them.

pub mod cancel;
pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod probe;
pub mod report;

pub use cancel::{CancelToken, Canceller};
pub use config::{Payload, ProbeConfig};
pub use error::{ErrorKind, ProbeError, Result};
pub use http::response::ProbeOutcome;
pub use probe::{LineSink, run_probe};
