pub mod aggregator;
pub mod decoder;

pub use aggregator::{AggregateResult, Aggregator, aggregate};
pub use decoder::{Decoded, LineDecoder, decode_lines};

use crate::Result;
use bytes::Bytes;
use futures::Stream;

/// Decodes and aggregates a raw chunk stream until the transport closes.
pub async fn aggregate_chunks<S>(chunks: S) -> Result<AggregateResult>
where
    S: Stream<Item = Result<Bytes>> + Send + Unpin,
{
    aggregate(decode_lines(chunks)).await
}
