use std::time::Duration;

/// How a probe ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The server answered 200 and closed the stream.
    Streamed {
        status: u16,
        /// Non-empty lines handed to the sink.
        lines: u64,
        /// Body bytes received.
        bytes: u64,
        elapsed: Duration,
    },
    /// Any status other than 200. The body was read whole instead of streamed.
    HttpStatus { status: u16, body: String },
}

impl ProbeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Streamed { .. })
    }
}
