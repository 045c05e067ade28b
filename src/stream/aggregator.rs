use super::decoder::Decoded;
use crate::{Result, upstream::UpstreamRecord};
use futures::{Stream, StreamExt, pin_mut};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateResult {
    pub text: String,
    /// Records that parsed successfully.
    pub records: usize,
    /// Lines skipped because they were not valid UTF-8 JSON records, or were
    /// too long to hold.
    pub malformed: usize,
    /// Unterminated bytes discarded at end of stream.
    pub truncated_bytes: usize,
    /// Whether a `done: true` record was observed.
    pub completed: bool,
}

/// Folds upstream records into a single text, in arrival order.
#[derive(Debug, Default)]
pub struct Aggregator {
    text: String,
    records: usize,
    malformed: usize,
    truncated_bytes: usize,
    completed: bool,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, decoded: Decoded) {
        match decoded {
            Decoded::Line(line) => self.push_line(&line),
            Decoded::Oversized(len) => {
                self.malformed += 1;
                debug!("Counted oversized line of at least {} bytes as malformed", len);
            }
            Decoded::Truncated(len) => self.truncated_bytes += len,
        }
    }

    /// Parses one line. Invalid UTF-8 and invalid JSON are both rejected here.
    pub fn push_line(&mut self, line: &[u8]) {
        match serde_json::from_slice::<UpstreamRecord>(line) {
            Ok(record) => self.push_record(record),
            Err(e) => {
                self.malformed += 1;
                warn!("Skipping malformed upstream record: {}", e);
            }
        }
    }

    pub fn push_record(&mut self, record: UpstreamRecord) {
        self.records += 1;

        if let Some(error) = &record.error {
            warn!("Upstream reported an error in-stream: {}", error);
        }

        let fragment = record.fragment();

        // The accumulated text is frozen once completion is observed.
        if self.completed {
            if !fragment.is_empty() {
                debug!(
                    "Ignoring {} bytes received after completion",
                    fragment.len()
                );
            }
            return;
        }

        self.text.push_str(fragment);

        if record.done {
            self.completed = true;
            info!(
                model = record.model.as_deref().unwrap_or_default(),
                done_reason = record.done_reason.as_deref().unwrap_or_default(),
                eval_count = record.eval_count.unwrap_or_default(),
                total_duration = record.total_duration.unwrap_or_default(),
                "Upstream signalled completion after {} records",
                self.records
            );
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn finish(self) -> AggregateResult {
        if !self.completed {
            debug!("Stream closed without a done record");
        }
        AggregateResult {
            text: self.text,
            records: self.records,
            malformed: self.malformed,
            truncated_bytes: self.truncated_bytes,
            completed: self.completed,
        }
    }
}

/// Drains `lines` to end-of-stream and returns the aggregated result.
/// A transport error aborts; a malformed line does not.
pub async fn aggregate<S>(lines: S) -> Result<AggregateResult>
where
    S: Stream<Item = Result<Decoded>>,
{
    pin_mut!(lines);

    let mut aggregator = Aggregator::new();
    while let Some(decoded) = lines.next().await {
        aggregator.push(decoded?);
    }

    Ok(aggregator.finish())
}
