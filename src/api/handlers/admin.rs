//! Admin API: session status, logout, and the quote listing.
//!
//! Every response carries the cookie mutations made while resolving the
//! session, including the 401/403 refusals.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use super::quote::{Ack, QuoteList};
use crate::{
    quote::QuoteIntake,
    session::{AdminIdentity, AdminSessionAuthority, AdminStatus, SetCookies},
};

/// Resolve the caller and insist on an admin with a second factor.
///
/// # Errors
/// Returns the ready-made 401 or 403 response, cookies included.
pub async fn require_admin(
    sessions: &AdminSessionAuthority,
    headers: &HeaderMap,
) -> Result<(AdminIdentity, SetCookies), Response> {
    let outcome = sessions.identify(headers).await;
    let identity = outcome.value;

    if !identity.is_admin {
        debug!("admin route refused: not an admin");
        return Err((
            StatusCode::UNAUTHORIZED,
            outcome.cookies,
            Json(json!({ "error": "Unauthorized" })),
        )
            .into_response());
    }

    if !identity.mfa_active {
        debug!("admin route refused: second factor missing");
        return Err((
            StatusCode::FORBIDDEN,
            outcome.cookies,
            Json(json!({ "error": "Multi-factor authentication required" })),
        )
            .into_response());
    }

    Ok((identity, outcome.cookies))
}

#[utoipa::path(
    get,
    path = "/api/admin/quotes",
    responses(
        (status = 200, description = "Accepted quotes in submission order", body = QuoteList),
        (status = 401, description = "Caller is not an admin"),
        (status = 403, description = "Admin without a second factor")
    ),
    tag = "admin"
)]
pub async fn admin_quotes(
    headers: HeaderMap,
    sessions: Extension<Arc<AdminSessionAuthority>>,
    intake: Extension<Arc<QuoteIntake>>,
) -> Response {
    let (_identity, cookies) = match require_admin(&sessions, &headers).await {
        Ok(granted) => granted,
        Err(response) => return response,
    };

    let items = intake.store().list_recent().await;
    (cookies, Json(QuoteList { items })).into_response()
}

#[utoipa::path(
    get,
    path = "/api/admin/auth/status",
    responses(
        (status = 200, description = "Admin flags for the current session", body = AdminStatus)
    ),
    tag = "admin"
)]
pub async fn status(
    headers: HeaderMap,
    sessions: Extension<Arc<AdminSessionAuthority>>,
) -> impl IntoResponse {
    let outcome = sessions.status(&headers).await;
    (outcome.cookies, Json(outcome.value))
}

#[utoipa::path(
    post,
    path = "/api/admin/auth/logout",
    responses(
        (status = 200, description = "Session cleared", body = Ack)
    ),
    tag = "admin"
)]
pub async fn logout(
    headers: HeaderMap,
    sessions: Extension<Arc<AdminSessionAuthority>>,
) -> impl IntoResponse {
    let outcome = sessions.logout(&headers).await;
    (outcome.cookies, Json(Ack { ok: true }))
}
