//! Dispatch pipeline errors

use std::fmt;

use thiserror::Error;

/// A fatal pre-send fault in the caller's request. Dispatch is aborted
/// before any provider call is made.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// No recipients were supplied at all
    #[error("`to`, `cc` or `bcc` recipients are required")]
    MissingRecipients,

    /// The subject is empty
    #[error("`subject` is required")]
    EmptySubject,

    /// Neither an HTML nor a plain text body was supplied
    #[error("`html` or `text` body is required")]
    MissingBody,

    /// Every `to` address failed the syntax check
    #[error("no valid recipient email addresses provided")]
    NoValidRecipients,
}

/// A structured error returned by the upstream provider for one batch.
///
/// Batch failures do not abort the remaining batches; they are recorded in
/// the aggregate result instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    /// The provider's error message
    pub message: String,
}

impl ProviderError {
    /// Create a new provider error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ProviderError {}

/// Errors raised by the dispatch pipeline
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The request failed validation before any provider call
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The provider call for a single-batch send failed
    #[error("email provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Unknown error
    #[error(transparent)]
    UnknownError(#[from] anyhow::Error),
}
