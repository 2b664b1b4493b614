//! HTTP transport for the generation service.
//!
//! The lifecycle only sees the [`Transport`] trait; [`HttpTransport`] is the reqwest
//! implementation used by the CLI.

use crate::config::ServerConfig;
use crate::error::GenerationError;
use crate::request::RequestDescriptor;
use crate::response::RawResponse;
use async_trait::async_trait;
use reqwest::header::{HeaderName, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

/// Issues one JSON POST and returns the raw response.
///
/// Any status code is a successful transport; only failures to complete the exchange
/// (connect, timeout, body read) are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &RequestDescriptor) -> Result<RawResponse, GenerationError>;
}

fn map_http_error(error: reqwest::Error) -> GenerationError {
    if error.is_timeout() {
        GenerationError::Transport(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        GenerationError::Transport(format!("Connection error: {}", error))
    } else {
        GenerationError::Transport(format!("HTTP error: {}", error))
    }
}

/// reqwest-backed transport
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &ServerConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .no_proxy()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| {
                GenerationError::Transport(format!("Failed to create HTTP client: {}", e))
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &RequestDescriptor) -> Result<RawResponse, GenerationError> {
        info!(endpoint = %request.endpoint, target = ?request.target, "Sending generation request");

        let response = self
            .client
            .post(&request.endpoint)
            .json(&request.payload)
            .send()
            .await
            .map_err(map_http_error)?;

        let status = response.status().as_u16();
        let header = |name: HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let content_type = header(CONTENT_TYPE);
        let content_disposition = header(CONTENT_DISPOSITION);

        let body = response.bytes().await.map_err(map_http_error)?.to_vec();
        debug!(status, bytes = body.len(), content_type = ?content_type, "Response received");

        Ok(RawResponse {
            status,
            content_type,
            content_disposition,
            body,
        })
    }
}
