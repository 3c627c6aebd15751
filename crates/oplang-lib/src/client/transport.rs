//! Request transport abstraction and its reqwest implementation

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, Client, Method};
use thiserror::Error;
use tracing::debug;

/// Errors raised while talking to the backend
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("response body is not JSON: {0}")]
    Body(#[source] serde_json::Error),
}

/// A request as handed to the host's request service
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: serde_json::Value,
}

/// Response envelope; `data` is the decoded JSON body
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub data: serde_json::Value,
}

/// Request-execution service supplied by the host
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// Transport over reqwest that injects the configured API key
pub struct HttpTransport {
    client: Client,
    api_key: Option<String>,
}

impl HttpTransport {
    pub fn new(timeout: Duration, api_key: Option<String>) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.filter(|key| !key.is_empty()),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(
        &self,
        request: TransportRequest,
    ) -> Result<TransportResponse, TransportError> {
        let url = url::Url::parse(&request.url).map_err(|source| TransportError::InvalidUrl {
            url: request.url.clone(),
            source,
        })?;

        let mut builder = self.client.request(request.method, url).json(&request.body);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(key) = &self.api_key {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", key));
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        debug!(status = status.as_u16(), bytes = bytes.len(), "Received backend response");
        let data = serde_json::from_slice(&bytes).map_err(TransportError::Body)?;

        Ok(TransportResponse {
            status: status.as_u16(),
            data,
        })
    }
}
