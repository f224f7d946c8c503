//! Bulk send handler

use std::collections::BTreeMap;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    domain::dispatch::{
        request::{Attachment, SendRequest},
        result::BatchResult,
        service::DispatchService,
    },
    infrastructure::http::{
        errors::{ApiError, ErrorResponse},
        state::AppState,
    },
};

/// A recipient field that accepts a single address or a list of addresses
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum Recipients {
    /// One address
    One(String),

    /// A list of addresses
    Many(Vec<String>),
}

impl From<Recipients> for Vec<String> {
    fn from(recipients: Recipients) -> Self {
        match recipients {
            Recipients::One(address) => vec![address],
            Recipients::Many(addresses) => addresses,
        }
    }
}

fn into_list(recipients: Option<Recipients>) -> Vec<String> {
    recipients.map(Vec::from).unwrap_or_default()
}

/// Bulk send request body
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendBody {
    /// Primary recipients
    #[serde(skip_serializing_if = "Option::is_none")]
    to: Option<Recipients>,

    /// Carbon-copy recipients
    #[serde(skip_serializing_if = "Option::is_none")]
    cc: Option<Recipients>,

    /// Blind-carbon-copy recipients
    #[serde(skip_serializing_if = "Option::is_none")]
    bcc: Option<Recipients>,

    /// The subject line
    #[serde(default)]
    #[schema(example = "Monthly newsletter")]
    subject: String,

    /// The HTML body
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<String>,

    /// The plain text body
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,

    /// Sender display name
    #[serde(skip_serializing_if = "Option::is_none")]
    from_name: Option<String>,

    /// Reply-To address
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<String>,

    /// Caller-supplied message identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    message_id: Option<String>,

    /// Unsubscribe URL for the `List-Unsubscribe` header
    #[serde(skip_serializing_if = "Option::is_none")]
    list_unsubscribe: Option<String>,

    /// Custom header overrides
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    custom_headers: BTreeMap<String, String>,

    /// Attachments
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<Attachment>,
}

impl From<SendBody> for SendRequest {
    fn from(body: SendBody) -> Self {
        Self {
            to: into_list(body.to),
            cc: into_list(body.cc),
            bcc: into_list(body.bcc),
            subject: body.subject,
            html: body.html,
            text: body.text,
            from_name: body.from_name,
            reply_to: body.reply_to,
            message_id: body.message_id,
            unsubscribe_url: body.list_unsubscribe,
            headers: body.custom_headers,
            attachments: body.attachments,
        }
    }
}

/// Bulk send response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    /// Whether the dispatch pipeline completed
    #[schema(example = true)]
    pub success: bool,

    /// The `Message-ID` used for the send
    #[schema(example = "<1714670000000.k2j9x4q8w1abc@example.com>")]
    pub message_id: String,

    /// Per-batch provider outcomes, in dispatch order. Individual batches
    /// may have failed even when the request was accepted.
    pub batches: Vec<BatchResult>,
}

/// Dispatch a bulk email send
#[utoipa::path(
    post,
    operation_id = "send",
    tag = "Dispatch",
    path = "/api/v1/send",
    request_body = SendBody,
    responses(
        (status = StatusCode::OK, description = "Request accepted and dispatched; inspect batches for per-batch provider outcomes", body = SendResponse),
        (status = StatusCode::BAD_REQUEST, description = "Request rejected before any provider call", body = ErrorResponse, example = json!({"error": "no valid recipient email addresses provided"})),
        (status = StatusCode::BAD_GATEWAY, description = "The provider call failed", body = ErrorResponse),
        (status = StatusCode::INTERNAL_SERVER_ERROR, description = "Unexpected failure", body = ErrorResponse),
    )
)]
pub async fn handler<D: DispatchService>(
    State(state): State<AppState<D>>,
    request: Result<Json<SendBody>, JsonRejection>,
) -> Result<Json<SendResponse>, ApiError> {
    let Json(body) = request?;

    let result = state.dispatcher.send(body.into()).await?;

    Ok(Json(SendResponse {
        success: true,
        message_id: result.message_id,
        batches: result.batches,
    }))
}
