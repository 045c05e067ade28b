use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use prompt_relay::{
    Error, Result,
    upstream::{UpstreamClient, UpstreamReply, UpstreamRequest},
};
use std::sync::{Arc, Mutex};

/// Mock upstream that replays a scripted chunk sequence
#[derive(Debug)]
pub struct MockUpstreamClient {
    pub status: u16,
    pub chunks: Vec<Vec<u8>>,
    pub stream_error: Option<String>,
    pub connect_error: Option<String>,
    pub no_body: bool,
    pub requests: Arc<Mutex<Vec<UpstreamRequest>>>,
}

impl MockUpstreamClient {
    pub fn streaming(chunks: &[&str]) -> Self {
        Self::streaming_bytes(chunks.iter().map(|c| c.as_bytes().to_vec()).collect())
    }

    pub fn streaming_bytes(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            status: 200,
            chunks,
            stream_error: None,
            connect_error: None,
            no_body: false,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_stream_error(mut self, error: &str) -> Self {
        self.stream_error = Some(error.to_string());
        self
    }

    pub fn with_connect_error(mut self, error: &str) -> Self {
        self.connect_error = Some(error.to_string());
        self
    }

    pub fn without_body(mut self) -> Self {
        self.no_body = true;
        self
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn get_requests(&self) -> Vec<UpstreamRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpstreamClient for MockUpstreamClient {
    async fn generate(&self, request: &UpstreamRequest) -> Result<UpstreamReply> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(error) = &self.connect_error {
            return Err(Error::internal(error.clone()));
        }

        if self.no_body {
            return Ok(UpstreamReply {
                status: self.status,
                body: None,
            });
        }

        let mut items: Vec<Result<Bytes>> = self
            .chunks
            .iter()
            .map(|chunk| Ok(Bytes::from(chunk.clone())))
            .collect();
        if let Some(error) = &self.stream_error {
            items.push(Err(Error::internal(error.clone())));
        }

        Ok(UpstreamReply {
            status: self.status,
            body: Some(futures::stream::iter(items).boxed()),
        })
    }
}
