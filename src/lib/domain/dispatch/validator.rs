//! Request validation

use tracing::warn;

use crate::domain::dispatch::{
    errors::ValidationError, request::SendRequest, value_objects::EmailAddress,
};

/// The three recipient lists after syntax checking.
///
/// Invalid entries have been dropped; duplicates are kept (deduplication is
/// the caller's responsibility). `to` is never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedRecipients {
    to: Vec<EmailAddress>,
    cc: Vec<EmailAddress>,
    bcc: Vec<EmailAddress>,
}

impl ValidatedRecipients {
    /// The primary recipients
    pub fn to(&self) -> &[EmailAddress] {
        &self.to
    }

    /// The carbon-copy recipients; may be empty
    pub fn cc(&self) -> &[EmailAddress] {
        &self.cc
    }

    /// The blind-carbon-copy recipients; may be empty
    pub fn bcc(&self) -> &[EmailAddress] {
        &self.bcc
    }

    /// The first `to` address, used as the link tracking marker
    pub fn primary(&self) -> &EmailAddress {
        &self.to[0]
    }
}

/// Validate a send request and partition its recipients.
///
/// Fails when required fields are missing or when no syntactically valid
/// `to` address remains. Invalid individual addresses are dropped with a
/// diagnostic log entry, not surfaced as a request failure.
pub fn validate(request: &SendRequest) -> Result<ValidatedRecipients, ValidationError> {
    if request.to.is_empty() && request.cc.is_empty() && request.bcc.is_empty() {
        return Err(ValidationError::MissingRecipients);
    }

    if request.subject.trim().is_empty() {
        return Err(ValidationError::EmptySubject);
    }

    let has_html = request.html.as_deref().is_some_and(|html| !html.is_empty());
    let has_text = request.text.as_deref().is_some_and(|text| !text.is_empty());

    if !has_html && !has_text {
        return Err(ValidationError::MissingBody);
    }

    let to = filter_valid(&request.to, "to");
    let cc = filter_valid(&request.cc, "cc");
    let bcc = filter_valid(&request.bcc, "bcc");

    if to.is_empty() {
        return Err(ValidationError::NoValidRecipients);
    }

    Ok(ValidatedRecipients { to, cc, bcc })
}

fn filter_valid(addresses: &[String], list: &str) -> Vec<EmailAddress> {
    addresses
        .iter()
        .filter_map(|raw| match EmailAddress::new(raw) {
            Ok(address) => Some(address),
            Err(_) => {
                warn!(address = %raw, list, "invalid email address removed");
                None
            }
        })
        .collect()
}
