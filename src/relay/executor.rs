use super::{
    fsm::{RelayEvent, RelayState, RelayStateMachine},
    types::InboundRequest,
};
use crate::{
    Error, Result,
    config::UpstreamConfig,
    stream::{self, AggregateResult},
    upstream::{ChunkStream, UpstreamClient, UpstreamRequest},
};
use axum::http::Method;
use futures::StreamExt;
use std::sync::Arc;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

/// Drives one inbound prompt through validation, the upstream call and
/// stream aggregation. Holds no per-request state, so a single instance is
/// shared across concurrent requests.
pub struct Relay {
    client: Arc<dyn UpstreamClient>,
    model: String,
}

/// Result of a relay cycle together with the state it ended in.
#[derive(Debug)]
pub struct RelayOutcome {
    pub state: RelayState,
    pub result: Result<AggregateResult>,
}

impl Relay {
    pub fn new(client: Arc<dyn UpstreamClient>, config: &UpstreamConfig) -> Self {
        info!("Relay forwarding prompts to model {}", config.model);
        Self {
            client,
            model: config.model.clone(),
        }
    }

    pub async fn handle(&self, method: &Method, body: &[u8]) -> RelayOutcome {
        let request_id = Uuid::new_v4();
        let span = info_span!("relay", %request_id);

        async {
            let mut fsm = RelayStateMachine::new();
            let result = self.drive(&mut fsm, method, body).await;
            if let Err(e) = &result {
                fsm.fail(e);
            }
            RelayOutcome {
                state: fsm.current_state(),
                result,
            }
        }
        .instrument(span)
        .await
    }

    async fn drive(
        &self,
        fsm: &mut RelayStateMachine,
        method: &Method,
        body: &[u8],
    ) -> Result<AggregateResult> {
        if *method != Method::POST {
            fsm.transition(RelayEvent::MethodRejected)?;
            return Err(Error::MethodNotAllowed);
        }
        fsm.transition(RelayEvent::RequestReceived)?;

        let request = self.validate(body)?;
        fsm.transition(RelayEvent::PromptAccepted)?;

        let reply = self.client.generate(&request).await?;

        if !reply.is_success() {
            let body = match reply.body {
                Some(body) => read_error_body(body).await,
                None => String::new(),
            };
            return Err(Error::Upstream {
                status: reply.status,
                body,
            });
        }

        let body = reply
            .body
            .ok_or_else(|| Error::internal("Upstream response body is not readable"))?;
        fsm.transition(RelayEvent::BodyOpened)?;

        let result = stream::aggregate_chunks(body).await?;
        info!(
            "Aggregated {} bytes from {} records ({} malformed, {} bytes truncated)",
            result.text.len(),
            result.records,
            result.malformed,
            result.truncated_bytes
        );

        fsm.complete()?;
        Ok(result)
    }

    fn validate(&self, body: &[u8]) -> Result<UpstreamRequest> {
        let inbound: InboundRequest = serde_json::from_slice(body)?;

        let prompt = inbound.prompt.unwrap_or_default();
        if prompt.trim().is_empty() {
            return Err(Error::bad_input("Prompt is required"));
        }

        debug!("Accepted prompt of {} bytes", prompt.len());
        Ok(UpstreamRequest::new(self.model.clone(), prompt))
    }
}

/// Collects an error body as text. A transport failure midway keeps
/// whatever arrived before it.
async fn read_error_body(mut body: ChunkStream) -> String {
    let mut bytes = Vec::new();
    while let Some(chunk) = body.next().await {
        match chunk {
            Ok(chunk) => bytes.extend_from_slice(&chunk),
            Err(e) => {
                warn!("Failed to read upstream error body: {}", e);
                break;
            }
        }
    }
    String::from_utf8_lossy(&bytes).trim().to_string()
}
