//! Dispatch service
//!
//! Orchestrates the pipeline: validation, content normalization, header
//! construction, then sequential rate-limited batch dispatch with
//! partial-failure aggregation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::warn;

#[cfg(test)]
use mockall::mock;

use crate::domain::dispatch::{
    batcher::{BatchPlan, Pacer},
    config::DispatchConfig,
    content::NormalizedContent,
    errors::{DispatchError, ProviderError},
    headers,
    provider::{Provider, ProviderEmail},
    request::SendRequest,
    result::{BatchOutcome, BatchResult, SendResult},
    validator,
};

/// Bulk send dispatch service
#[async_trait]
pub trait DispatchService: Clone + Send + Sync + 'static {
    /// Dispatch a bulk send request through the provider.
    ///
    /// # Arguments
    /// * `request` - The [`SendRequest`] produced by the presentation layer.
    ///
    /// # Returns
    /// A [`Result`] with the aggregate [`SendResult`], or a
    /// [`DispatchError`] when validation fails, a single-batch provider
    /// call fails, or an unexpected error occurs.
    async fn send(&self, request: SendRequest) -> Result<SendResult, DispatchError>;
}

#[cfg(test)]
mock! {
    pub DispatchService {}

    impl Clone for DispatchService {
        fn clone(&self) -> Self;
    }

    #[async_trait]
    impl DispatchService for DispatchService {
        async fn send(&self, request: SendRequest) -> Result<SendResult, DispatchError>;
    }
}

/// Dispatch service implementation
#[derive(Debug, Clone)]
pub struct DispatchServiceImpl<P>
where
    P: Provider,
{
    provider: Arc<P>,
    config: DispatchConfig,
}

impl<P> DispatchServiceImpl<P>
where
    P: Provider,
{
    /// Create a new dispatch service
    pub fn new(provider: Arc<P>, config: DispatchConfig) -> Self {
        Self { provider, config }
    }

    fn sender_line(&self, request: &SendRequest) -> String {
        match &request.from_name {
            Some(name) => format!("{name} <{}>", self.config.sender),
            None => self.config.sender.clone(),
        }
    }
}

#[async_trait]
impl<P> DispatchService for DispatchServiceImpl<P>
where
    P: Provider,
{
    async fn send(&self, request: SendRequest) -> Result<SendResult, DispatchError> {
        let recipients = validator::validate(&request)?;

        let content = NormalizedContent::new(
            request.html.as_deref(),
            request.text.as_deref(),
            recipients.primary(),
        );

        let headers = headers::build(&self.config, &request, Utc::now());
        let message_id = headers.message_id().to_string();

        let reply_to = request
            .reply_to
            .clone()
            .unwrap_or_else(|| self.config.sender.clone());

        // cc, bcc and attachments are not split across batches; every
        // batch carries them unchanged.
        let base = ProviderEmail {
            from: self.sender_line(&request),
            to: Vec::new(),
            cc: recipients.cc().iter().map(ToString::to_string).collect(),
            bcc: recipients.bcc().iter().map(ToString::to_string).collect(),
            subject: request.subject.clone(),
            html: content.html,
            text: content.text,
            headers: headers
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            reply_to,
            attachments: request.attachments.clone(),
        };

        let plan = BatchPlan::new(
            recipients.to(),
            self.config.batch_size,
            self.config.rate_limit,
        );
        let mut pacer = Pacer::new(plan.pace());
        let mut batches = Vec::with_capacity(plan.batches().len());

        for (index, batch) in plan.batches().iter().enumerate() {
            pacer.pace().await;

            let email = ProviderEmail {
                to: batch.iter().map(ToString::to_string).collect(),
                ..base.clone()
            };

            // No automatic retry; a failed batch is recorded and dispatch
            // proceeds with the remaining batches.
            let outcome = match self.provider.send(&email).await {
                Ok(response) => BatchOutcome::Delivered {
                    id: response.id,
                    data: response.data,
                },
                Err(error) => {
                    warn!(batch = index + 1, %error, "provider rejected batch");
                    BatchOutcome::Failed {
                        error: error.message,
                    }
                }
            };

            batches.push(BatchResult {
                batch: index + 1,
                recipients: batch.len(),
                outcome,
            });
        }

        // A single-batch send surfaces its provider failure as an upstream
        // fault; with multiple batches, per-batch failures are reported as
        // data in the aggregate result.
        if let [only] = batches.as_slice() {
            if let BatchOutcome::Failed { error } = &only.outcome {
                return Err(DispatchError::Provider(ProviderError::new(error.clone())));
            }
        }

        Ok(SendResult {
            message_id,
            batches,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use crate::domain::dispatch::{errors::ValidationError, provider::MockProvider};

    use super::*;

    fn request(recipients: usize) -> SendRequest {
        SendRequest {
            to: (0..recipients)
                .map(|i| format!("user{i}@example.com"))
                .collect(),
            subject: "Hello".to_string(),
            html: Some("<p>Hi</p>".to_string()),
            text: Some("Hi".to_string()),
            ..Default::default()
        }
    }

    fn response(id: &str) -> crate::domain::dispatch::provider::ProviderResponse {
        crate::domain::dispatch::provider::ProviderResponse {
            id: id.to_string(),
            data: json!({ "id": id }),
        }
    }

    fn service(provider: MockProvider) -> DispatchServiceImpl<MockProvider> {
        DispatchServiceImpl::new(Arc::new(provider), DispatchConfig::default())
    }

    #[tokio::test]
    async fn test_single_batch_send_success() -> TestResult {
        let mut provider = MockProvider::new();

        provider
            .expect_send()
            .times(1)
            .withf(|email| {
                email.to.len() == 3
                    && email.from == "sender@example.com"
                    && email.reply_to == "sender@example.com"
                    && email.headers.contains_key("Message-ID")
                    && email.headers.contains_key("List-Unsubscribe")
            })
            .returning(|_| Ok(response("id-1")));

        let result = service(provider).send(request(3)).await?;

        assert_eq!(result.batches.len(), 1);
        assert_eq!(result.batches[0].recipients, 3);
        assert!(!result.batches[0].is_failed());

        Ok(())
    }

    #[tokio::test]
    async fn test_from_name_and_reply_to_are_applied() -> TestResult {
        let mut provider = MockProvider::new();

        provider
            .expect_send()
            .times(1)
            .withf(|email| {
                email.from == "Sender Name <sender@example.com>"
                    && email.reply_to == "replies@example.com"
            })
            .returning(|_| Ok(response("id-1")));

        let mut request = request(1);
        request.from_name = Some("Sender Name".to_string());
        request.reply_to = Some("replies@example.com".to_string());

        service(provider).send(request).await?;

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_45_recipients_are_sent_in_three_batches() -> TestResult {
        let mut provider = MockProvider::new();

        for expected in [20usize, 20, 5] {
            provider
                .expect_send()
                .times(1)
                .withf(move |email| email.to.len() == expected)
                .returning(|_| Ok(response("id")));
        }

        let result = service(provider).send(request(45)).await?;

        let sizes: Vec<_> = result
            .batches
            .iter()
            .map(|batch| batch.recipients)
            .collect();

        assert_eq!(sizes, vec![20, 20, 5]);

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_cc_and_attachments_repeat_on_every_batch() -> TestResult {
        let mut provider = MockProvider::new();

        provider
            .expect_send()
            .times(3)
            .withf(|email| {
                email.cc == vec!["cc@example.com".to_string()] && email.attachments.len() == 1
            })
            .returning(|_| Ok(response("id")));

        let mut request = request(45);
        request.cc = vec!["cc@example.com".to_string()];
        request.attachments = vec![crate::domain::dispatch::request::Attachment {
            filename: "report.pdf".to_string(),
            content: "aGVsbG8=".to_string(),
            encoding: Some("base64".to_string()),
        }];

        service(provider).send(request).await?;

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_failure_is_reported_as_data() -> TestResult {
        // Documented policy, not assumed-correct behavior: the aggregate
        // result is a success whenever the pipeline completed, even though
        // batch 2 of 3 failed at the provider.
        let mut provider = MockProvider::new();
        let mut calls = 0usize;

        provider.expect_send().times(3).returning(move |_| {
            calls += 1;

            if calls == 2 {
                Err(ProviderError::new("mailbox quota exceeded"))
            } else {
                Ok(response("id"))
            }
        });

        let result = service(provider).send(request(45)).await?;

        assert!(!result.batches[0].is_failed());
        assert!(result.batches[1].is_failed());
        assert!(!result.batches[2].is_failed());
        assert_eq!(
            result.batches[1].outcome,
            BatchOutcome::Failed {
                error: "mailbox quota exceeded".to_string()
            }
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_single_batch_provider_failure_is_an_upstream_fault() {
        let mut provider = MockProvider::new();

        provider
            .expect_send()
            .times(1)
            .returning(|_| Err(ProviderError::new("provider down")));

        let result = service(provider).send(request(3)).await;

        assert!(matches!(result, Err(DispatchError::Provider(_))));
    }

    #[tokio::test]
    async fn test_validation_failure_makes_no_provider_call() {
        let provider = MockProvider::new();

        let result = service(provider).send(request(0)).await;

        assert!(matches!(
            result,
            Err(DispatchError::Validation(ValidationError::MissingRecipients))
        ));
    }

    #[tokio::test]
    async fn test_links_are_tagged_with_the_primary_recipient() -> TestResult {
        let mut provider = MockProvider::new();

        provider
            .expect_send()
            .times(1)
            .withf(|email| email.html.contains("https://a.com/x#user0@example.com"))
            .returning(|_| Ok(response("id")));

        let mut request = request(2);
        request.html = Some(r#"<a href="https://a.com/x">x</a>"#.to_string());
        request.text = Some("x".to_string());

        service(provider).send(request).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_caller_message_id_is_returned() -> TestResult {
        let mut provider = MockProvider::new();

        provider
            .expect_send()
            .times(1)
            .returning(|_| Ok(response("id")));

        let mut request = request(1);
        request.message_id = Some("<fixed@example.com>".to_string());

        let result = service(provider).send(request).await?;

        assert_eq!(result.message_id, "<fixed@example.com>");

        Ok(())
    }
}
