//! Route handlers and small request helpers shared between them.

pub mod admin;
pub mod contact;
pub mod health;
pub mod locale;
pub mod quote;
pub mod root;

use axum::http::HeaderMap;

/// Header set by the challenge widget when the form posts the token outside the body.
pub const TOKEN_HEADER: &str = "cf-turnstile-response";

/// Client IP from common proxy headers, Cloudflare's first.
pub(crate) fn extract_client_ip(headers: &HeaderMap) -> Option<String> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    if let Some(ip) = header("cf-connecting-ip") {
        return Some(ip.to_string());
    }

    let forwarded = header("x-forwarded-for")
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if let Some(ip) = forwarded {
        return Some(ip.to_string());
    }

    header("x-real-ip").map(str::to_string)
}

pub(crate) fn extract_token_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
