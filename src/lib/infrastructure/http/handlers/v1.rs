use axum::{
    routing::{get, post},
    Json, Router,
};
use utoipa::OpenApi;

use crate::{
    domain::dispatch::service::DispatchService,
    infrastructure::http::{open_api::ApiDocs, state::AppState},
};

pub mod send;
pub mod uptime;

pub fn router<D: DispatchService>() -> Router<AppState<D>> {
    Router::new()
        .route("/openapi.json", get(Json(ApiDocs::openapi())))
        .route("/uptime", get(uptime::handler))
        .route("/send", post(send::handler))
}
