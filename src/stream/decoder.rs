use crate::Result;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use tracing::{trace, warn};

/// Longest line held while waiting for its terminator.
pub const MAX_LINE_BYTES: usize = 8 * 1024 * 1024;

/// One unit of decoder output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// A complete line, trimmed, never empty. Bytes are passed through
    /// undecoded; UTF-8 validity is checked when the record is parsed.
    Line(Vec<u8>),
    /// A line that outgrew the length cap and was dropped up to its terminator.
    Oversized(usize),
    /// Unterminated bytes left when the stream closed.
    Truncated(usize),
}

/// Incremental splitter for newline-delimited records.
#[derive(Debug)]
pub struct LineDecoder {
    pending: Vec<u8>,
    max_line_bytes: usize,
    discarding: bool,
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::with_max_line_bytes(MAX_LINE_BYTES)
    }

    pub fn with_max_line_bytes(max_line_bytes: usize) -> Self {
        Self {
            pending: Vec::new(),
            max_line_bytes,
            discarding: false,
        }
    }

    /// Appends `chunk` to the pending prefix and returns every line that is
    /// now terminated. Only the new bytes are scanned for terminators.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Decoded> {
        let mut out = Vec::new();
        let mut rest = chunk;

        if self.discarding {
            match rest.iter().position(|b| *b == b'\n') {
                Some(pos) => {
                    self.discarding = false;
                    rest = &rest[pos + 1..];
                }
                None => return out,
            }
        }

        match rest.iter().rposition(|b| *b == b'\n') {
            Some(last_newline) => {
                self.pending.extend_from_slice(&rest[..=last_newline]);
                let complete = std::mem::take(&mut self.pending);
                self.pending.extend_from_slice(&rest[last_newline + 1..]);

                for raw in complete.split(|b| *b == b'\n') {
                    let line = raw.trim_ascii();
                    if !line.is_empty() {
                        trace!("Decoded line of {} bytes", line.len());
                        out.push(Decoded::Line(line.to_vec()));
                    }
                }
            }
            None => self.pending.extend_from_slice(rest),
        }

        if self.pending.len() > self.max_line_bytes {
            warn!(
                "Dropping line exceeding {} bytes before its terminator",
                self.max_line_bytes
            );
            out.push(Decoded::Oversized(self.pending.len()));
            self.pending.clear();
            self.discarding = true;
        }

        out
    }

    /// Ends the stream. An unterminated remainder is an unfinished record and
    /// is discarded; returns how many non-whitespace bytes were thrown away.
    pub fn finish(self) -> usize {
        let remainder = self.pending.trim_ascii();
        if !remainder.is_empty() {
            warn!(
                "Discarding {} bytes of unterminated data at end of stream",
                remainder.len()
            );
        }
        remainder.len()
    }
}

/// Lazily turns a chunk stream into its sequence of decoded lines. A
/// discarded tail is reported as a final `Decoded::Truncated`.
pub fn decode_lines<S>(mut chunks: S) -> impl Stream<Item = Result<Decoded>> + Send
where
    S: Stream<Item = Result<Bytes>> + Send + Unpin,
{
    async_stream::stream! {
        let mut decoder = LineDecoder::new();
        while let Some(chunk) = chunks.next().await {
            match chunk {
                Ok(chunk) => {
                    for decoded in decoder.feed(&chunk) {
                        yield Ok(decoded);
                    }
                }
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }
        }
        let discarded = decoder.finish();
        if discarded > 0 {
            yield Ok(Decoded::Truncated(discarded));
        }
    }
}
