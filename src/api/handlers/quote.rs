//! Public quote endpoints.

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::HeaderMap,
    response::IntoResponse,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use utoipa::ToSchema;

use super::{extract_client_ip, extract_token_header};
use crate::{
    api::error::ApiError,
    quote::{FieldErrors, QuoteIntake, QuoteRecord, validate::ROOT_FIELD},
};

#[derive(Debug, Serialize, ToSchema)]
pub struct QuoteList {
    pub items: Vec<QuoteRecord>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Ack {
    pub ok: bool,
}

#[utoipa::path(
    post,
    path = "/api/quote",
    request_body = crate::quote::QuoteRequest,
    responses(
        (status = 200, description = "Quote accepted", body = Ack),
        (status = 400, description = "Validation errors or anti-abuse rejection"),
        (status = 503, description = "Anti-abuse verification service unavailable"),
        (status = 500, description = "Unexpected failure")
    ),
    tag = "quote"
)]
pub async fn submit_quote(
    headers: HeaderMap,
    intake: Extension<Arc<QuoteIntake>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Ack>, ApiError> {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            debug!("quote payload rejected: {rejection}");
            let mut errors = FieldErrors::default();
            errors.push(ROOT_FIELD, "Expected a JSON object");
            return Err(ApiError::Validation(errors));
        }
    };

    let remote_ip = extract_client_ip(&headers);
    intake
        .submit(
            &payload,
            extract_token_header(&headers),
            remote_ip.as_deref(),
        )
        .await?;

    Ok(Json(Ack { ok: true }))
}

#[utoipa::path(
    get,
    path = "/api/quote",
    responses(
        (status = 200, description = "Accepted quotes in submission order", body = QuoteList)
    ),
    tag = "quote"
)]
pub async fn list_quotes(intake: Extension<Arc<QuoteIntake>>) -> impl IntoResponse {
    Json(QuoteList {
        items: intake.store().list_recent().await,
    })
}
