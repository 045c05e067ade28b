use serde::Deserialize;

/// Inbound relay body. A missing `prompt` is treated like an empty one.
#[derive(Debug, Deserialize)]
pub struct InboundRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}
