//! OpenAPI module

use utoipa::OpenApi;

use crate::{
    domain::dispatch::{
        request::Attachment,
        result::{BatchOutcome, BatchResult, SendResult},
    },
    infrastructure::http::{errors::ErrorResponse, handlers::v1::*},
};

#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "Bulk Dispatch"),
    paths(send::handler, uptime::handler),
    components(schemas(
        send::SendBody,
        send::SendResponse,
        send::Recipients,
        uptime::UptimeResponse,
        Attachment,
        BatchOutcome,
        BatchResult,
        SendResult,
        ErrorResponse,
    ))
)]
pub struct ApiDocs;
