//! HTTPS transactional email provider client

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::dispatch::{
    errors::ProviderError,
    provider::{Provider, ProviderEmail, ProviderResponse},
};

/// Provider connection configuration
#[derive(Clone, Debug, Parser)]
pub struct ProviderConfig {
    /// The provider API base URL
    #[clap(long, env = "PROVIDER_BASE_URL")]
    pub base_url: String,

    /// The provider API key
    #[clap(long, env = "PROVIDER_API_KEY")]
    pub api_key: String,

    /// Per-call timeout in seconds
    #[clap(long, env = "PROVIDER_TIMEOUT_SECONDS", default_value = "10")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct SendResponseBody {
    id: Option<String>,
    error: Option<ErrorBody>,
}

/// HTTPS provider client.
///
/// Stateless apart from the connection pool; one instance is shared across
/// all concurrent top-level requests.
#[derive(Debug, Clone)]
pub struct HttpProvider {
    client: reqwest::Client,
    config: ProviderConfig,
}

impl HttpProvider {
    /// Create a new provider client
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/emails", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Provider for HttpProvider {
    async fn send(&self, email: &ProviderEmail) -> Result<ProviderResponse, ProviderError> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(email)
            .send()
            .await
            .map_err(|e| ProviderError::new(e.to_string()))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::new(e.to_string()))?;

        let parsed: SendResponseBody = serde_json::from_value(body.clone())
            .map_err(|e| ProviderError::new(e.to_string()))?;

        if let Some(error) = parsed.error {
            return Err(ProviderError::new(error.message));
        }

        if !status.is_success() {
            return Err(ProviderError::new(format!(
                "provider returned status {status}"
            )));
        }

        match parsed.id {
            Some(id) => Ok(ProviderResponse { id, data: body }),
            None => Err(ProviderError::new("provider response is missing an id")),
        }
    }
}
