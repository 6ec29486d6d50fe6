// HTTP client for the chat backend

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error};

use super::types::{ChatRequest, ChatResponse, ReplyCompletion};
use super::ReplyBackend;
use crate::config::BackendConfig;
use crate::errors::TurnError;

pub struct ReplyClient {
    url: String,
    client: Client,
}

impl ReplyClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            url: config.url.clone(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

fn transport_error(e: reqwest::Error) -> TurnError {
    error!("Reply request failed: {}", e);
    if e.is_timeout() {
        error!("  → Error type: TIMEOUT");
    } else if e.is_connect() {
        error!("  → Error type: CONNECTION");
    } else if e.is_request() {
        error!("  → Error type: REQUEST");
    } else if e.is_body() {
        error!("  → Error type: BODY");
    } else {
        error!("  → Error type: OTHER");
    }
    TurnError::transport(e.to_string())
}

#[async_trait]
impl ReplyBackend for ReplyClient {
    async fn complete(&self, message: &str) -> Result<ReplyCompletion, TurnError> {
        debug!(url = %self.url, "Sending chat request");

        let response = self
            .client
            .post(&self.url)
            .json(&ChatRequest { message })
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ChatResponse>(&body)
                .ok()
                .and_then(|parsed| parsed.error_message());
            error!(status = %status, "Chat backend returned an error status");
            return Err(TurnError::server(match detail {
                Some(detail) => format!("HTTP {}: {}", status, detail),
                None => format!("HTTP {}", status),
            }));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| TurnError::malformed(format!("invalid JSON: {}", e)))?;

        parsed.into_completion()
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ReplyClient::new(&BackendConfig::default()).unwrap();
        assert_eq!(client.url(), crate::config::DEFAULT_BACKEND_URL);
        assert_eq!(client.name(), "http");
    }
}
