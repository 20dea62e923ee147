use crate::{
    GIT_COMMIT_HASH, gate::GateConfig, quote::QuoteIntake, session::AdminSessionAuthority,
};
use axum::{
    body::Body,
    extract::Extension,
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    commit: String,
    name: String,
    version: String,
    /// `enabled` or `disabled`.
    admin_gate: String,
    /// `configured` or `unconfigured`.
    identity_backend: String,
    /// `configured` or `unconfigured`.
    antiabuse: String,
    quotes: usize,
}

fn configured(flag: bool) -> String {
    let status = if flag { "configured" } else { "unconfigured" };
    status.to_string()
}

#[utoipa::path(
    get,
    path= "/health",
    responses (
        (status = 200, description = "Service is up; reports which integrations are configured", body = Health)
    ),
    tag= "health"
)]
// axum handler for health
pub async fn health(
    method: Method,
    gate: Extension<Arc<GateConfig>>,
    sessions: Extension<Arc<AdminSessionAuthority>>,
    intake: Extension<Arc<QuoteIntake>>,
) -> impl IntoResponse {
    let health = Health {
        commit: GIT_COMMIT_HASH.to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        admin_gate: if gate.is_enabled() {
            "enabled".to_string()
        } else {
            "disabled".to_string()
        },
        identity_backend: configured(sessions.is_configured()),
        antiabuse: configured(intake.verifier().is_configured()),
        quotes: intake.store().len().await,
    };

    let body = if method == Method::GET {
        Json(&health).into_response()
    } else {
        Body::empty().into_response()
    };

    let short_hash = if health.commit.len() > 7 {
        &health.commit[0..7]
    } else {
        ""
    };

    let headers = format!("{}:{}:{}", health.name, health.version, short_hash)
        .parse::<HeaderValue>()
        .map(|x_app_header_value| {
            debug!("X-App header: {:?}", x_app_header_value);

            let mut headers = HeaderMap::new();

            headers.insert("X-App", x_app_header_value);

            headers
        })
        .map_err(|err| {
            error!("Failed to parse X-App header: {}", err);
        });

    let headers = headers.unwrap_or_else(|()| HeaderMap::new());

    (StatusCode::OK, headers, body)
}
