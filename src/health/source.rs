// src/health/source.rs
use super::{HealthResponse, PollError};
use crate::poller::HEALTH_PATH;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

/// Something that can be asked for the current health payload.
#[async_trait]
pub trait HealthSource: Send + Sync {
    async fn fetch(&self) -> Result<HealthResponse, PollError>;

    /// Human-readable target, used in log fields.
    fn describe(&self) -> String;
}

/// Plain `GET <base>/health` with default headers and no request timeout.
#[derive(Debug, Clone)]
pub struct HttpHealthSource {
    client: Client,
    url: Url,
}

impl HttpHealthSource {
    pub fn new(base_url: &Url) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: Client, base_url: &Url) -> Result<Self> {
        let url = base_url
            .join(HEALTH_PATH)
            .with_context(|| format!("Failed to resolve {} against {}", HEALTH_PATH, base_url))?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl HealthSource for HttpHealthSource {
    async fn fetch(&self) -> Result<HealthResponse, PollError> {
        let response = self.client.get(self.url.as_str()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PollError::HttpStatus(status));
        }

        let body = response.bytes().await?;
        debug!(bytes = body.len(), "health response received");

        HealthResponse::from_json(&body)
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}
