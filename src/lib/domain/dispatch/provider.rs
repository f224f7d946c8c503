//! Outbound provider contract

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[cfg(test)]
use mockall::mock;

use crate::domain::dispatch::{errors::ProviderError, request::Attachment};

/// One provider send call: the batch's recipient slice substituted into the
/// otherwise shared message fields.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderEmail {
    /// The sender, as `Name <address>` or a bare address
    pub from: String,

    /// This batch's primary recipients
    pub to: Vec<String>,

    /// Carbon-copy recipients, identical for every batch
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub cc: Vec<String>,

    /// Blind-carbon-copy recipients, identical for every batch
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub bcc: Vec<String>,

    /// The subject line
    pub subject: String,

    /// The HTML body
    pub html: String,

    /// The plain text body
    pub text: String,

    /// The full deliverability header set
    pub headers: BTreeMap<String, String>,

    /// The Reply-To address
    pub reply_to: String,

    /// Attachments, identical for every batch
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub attachments: Vec<Attachment>,
}

/// A successful provider send
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ProviderResponse {
    /// The provider-assigned identifier
    pub id: String,

    /// The provider's full response payload
    pub data: Value,
}

/// The external transactional email delivery service.
///
/// Implementations must be safe for concurrent use across simultaneous
/// top-level requests; the pipeline holds one long-lived instance.
#[async_trait]
pub trait Provider: Clone + Send + Sync + 'static {
    /// Send one batch
    ///
    /// # Arguments
    /// * `email` - The [`ProviderEmail`] for this batch.
    ///
    /// # Returns
    /// A [`Result`] with the provider-assigned [`ProviderResponse`], or the
    /// [`ProviderError`] the provider reported.
    async fn send(&self, email: &ProviderEmail) -> Result<ProviderResponse, ProviderError>;
}

#[cfg(test)]
mock! {
    pub Provider {}

    impl Clone for Provider {
        fn clone(&self) -> Self;
    }

    #[async_trait]
    impl Provider for Provider {
        async fn send(&self, email: &ProviderEmail) -> Result<ProviderResponse, ProviderError>;
    }
}
