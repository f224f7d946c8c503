//! Send request model

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A file attached to every batch of a send
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// The attachment filename
    #[schema(example = "report.pdf")]
    pub filename: String,

    /// Base64-encoded file content
    pub content: String,

    /// The content transfer encoding, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

/// A bulk email send request as produced by the presentation layer.
///
/// Recipient lists are raw strings here; address syntax is checked by the
/// validator, which drops invalid entries rather than failing the request.
#[derive(Clone, Debug, Default)]
pub struct SendRequest {
    /// Primary recipients, batched for delivery
    pub to: Vec<String>,

    /// Carbon-copy recipients, repeated unchanged on every batch
    pub cc: Vec<String>,

    /// Blind-carbon-copy recipients, repeated unchanged on every batch
    pub bcc: Vec<String>,

    /// The subject line
    pub subject: String,

    /// The HTML body, if supplied
    pub html: Option<String>,

    /// The plain text body, if supplied
    pub text: Option<String>,

    /// Display name prepended to the configured sender address
    pub from_name: Option<String>,

    /// Reply-To address; defaults to the sender address
    pub reply_to: Option<String>,

    /// Caller-supplied message identifier, used verbatim when present
    pub message_id: Option<String>,

    /// Unsubscribe URL included in the `List-Unsubscribe` header
    pub unsubscribe_url: Option<String>,

    /// Custom header overrides, merged after the fixed deliverability set
    pub headers: BTreeMap<String, String>,

    /// Attachments delivered with every batch
    pub attachments: Vec<Attachment>,
}
