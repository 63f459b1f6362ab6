//! Incremental line framing for streamed response bodies.
//!
//! Chunks arrive with arbitrary boundaries, so a line (or a `\r\n` pair) may
//! be split across two chunks. [`LineDecoder`] keeps only the bytes of the
//! line currently being assembled.

use crate::error::LineError;

/// Splits a byte stream on `\n`, `\r\n` or a lone `\r`.
#[derive(Debug)]
pub struct LineDecoder {
    buf: Vec<u8>,
    /// The previous chunk ended on `\r`; a leading `\n` belongs to it.
    pending_cr: bool,
    max_line_bytes: usize,
    line_no: u64,
}

impl LineDecoder {
    pub fn new(max_line_bytes: usize) -> Self {
        Self {
            buf: Vec::new(),
            pending_cr: false,
            max_line_bytes,
            line_no: 0,
        }
    }

    /// Feeds one chunk, calling `on_line` for every line it completes, empty
    /// lines included, in order. Lines completed before an error have already
    /// been delivered when the error is returned.
    pub fn push<E, F>(&mut self, chunk: &[u8], mut on_line: F) -> Result<(), E>
    where
        E: From<LineError>,
        F: FnMut(String) -> Result<(), E>,
    {
        for &byte in chunk {
            if std::mem::take(&mut self.pending_cr) && byte == b'\n' {
                continue;
            }
            match byte {
                b'\n' => on_line(self.take_line()?)?,
                b'\r' => {
                    on_line(self.take_line()?)?;
                    self.pending_cr = true;
                }
                _ => {
                    if self.buf.len() >= self.max_line_bytes {
                        return Err(LineError::TooLong {
                            line: self.line_no + 1,
                            limit: self.max_line_bytes,
                        }
                        .into());
                    }
                    self.buf.push(byte);
                }
            }
        }
        Ok(())
    }

    /// Flushes an unterminated trailing line at end of stream.
    pub fn finish(mut self) -> Result<Option<String>, LineError> {
        if self.buf.is_empty() {
            return Ok(None);
        }
        self.take_line().map(Some)
    }

    fn take_line(&mut self) -> Result<String, LineError> {
        self.line_no += 1;
        let bytes = std::mem::take(&mut self.buf);
        String::from_utf8(bytes).map_err(|source| LineError::InvalidUtf8 {
            line: self.line_no,
            source,
        })
    }
}
