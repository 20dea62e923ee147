use axum::{Json, extract::Extension, response::IntoResponse};
use std::sync::Arc;

use crate::contact::{ContactResponse, ContactSettings};

#[utoipa::path(
    get,
    path = "/api/contact",
    responses(
        (status = 200, description = "Public contact details", body = ContactResponse)
    ),
    tag = "site"
)]
pub async fn contact(contact: Extension<Arc<ContactSettings>>) -> impl IntoResponse {
    Json(contact.to_response())
}
