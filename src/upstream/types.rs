use crate::Result;
use bytes::Bytes;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

/// Raw transport chunks of an upstream body, in arrival order.
pub type ChunkStream = BoxStream<'static, Result<Bytes>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpstreamRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
}

impl UpstreamRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            stream: true,
        }
    }
}

/// One line of the upstream's newline-delimited JSON output. Only
/// `response` and `done` drive aggregation; the rest is kept for logging.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamRecord {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub done_reason: Option<String>,
    #[serde(default)]
    pub eval_count: Option<u64>,
    #[serde(default)]
    pub total_duration: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

impl UpstreamRecord {
    pub fn fragment(&self) -> &str {
        self.response.as_deref().unwrap_or_default()
    }
}

/// What the upstream handed back before any of the body was read.
pub struct UpstreamReply {
    pub status: u16,
    pub body: Option<ChunkStream>,
}

impl UpstreamReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl std::fmt::Debug for UpstreamReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamReply")
            .field("status", &self.status)
            .field("body", &self.body.as_ref().map(|_| "<stream>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_request_always_streams() {
        let request = UpstreamRequest::new("llama3", "Hi");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"model": "llama3", "prompt": "Hi", "stream": true})
        );
    }

    #[test]
    fn test_record_ignores_unknown_metadata() {
        let line = r#"{"model":"llama3","created_at":"2024-01-01T00:00:00Z","response":"He","done":false,"context":[1,2,3]}"#;
        let record: UpstreamRecord = serde_json::from_str(line).unwrap();
        assert_eq!(record.fragment(), "He");
        assert!(!record.done);
        assert_eq!(record.model.as_deref(), Some("llama3"));
    }

    #[test]
    fn test_record_null_response_is_empty_fragment() {
        let record: UpstreamRecord =
            serde_json::from_str(r#"{"response":null,"done":true,"done_reason":"stop"}"#).unwrap();
        assert_eq!(record.fragment(), "");
        assert!(record.done);
        assert_eq!(record.done_reason.as_deref(), Some("stop"));
    }

    #[test]
    fn test_reply_success_range() {
        let ok = UpstreamReply { status: 200, body: None };
        let unavailable = UpstreamReply { status: 503, body: None };
        assert!(ok.is_success());
        assert!(!unavailable.is_success());
    }
}
