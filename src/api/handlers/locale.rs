use axum::{Json, extract::Query, response::IntoResponse};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::locale::{LocaleContext, resolve};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LocaleQuery {
    /// Site path to resolve, defaults to `/`.
    path: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/locale",
    params(LocaleQuery),
    responses(
        (status = 200, description = "Locale context for the path", body = LocaleContext)
    ),
    tag = "site"
)]
pub async fn locale(Query(query): Query<LocaleQuery>) -> impl IntoResponse {
    let path = query.path.as_deref().unwrap_or("/");
    Json(resolve(path))
}
