use super::types::*;
use crate::{Error, Result, config::UpstreamConfig};
use async_trait::async_trait;
use futures::StreamExt;
use tracing::debug;

#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Issues the generate call and returns as soon as the status line is in.
    /// The body is handed back unread.
    async fn generate(&self, request: &UpstreamRequest) -> Result<UpstreamReply>;
}

pub struct OllamaClient {
    client: reqwest::Client,
    url: String,
}

impl OllamaClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            url: config.generate_url(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl UpstreamClient for OllamaClient {
    async fn generate(&self, request: &UpstreamRequest) -> Result<UpstreamReply> {
        debug!(
            "Sending generate request to {} for model {}",
            self.url, request.model
        );

        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await?;

        let status = response.status().as_u16();
        debug!("Upstream responded with status {}", status);

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(Error::from))
            .boxed();

        Ok(UpstreamReply {
            status,
            body: Some(body),
        })
    }
}
