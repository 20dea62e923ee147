//! Supabase GoTrue backend over HTTP.
//!
//! Flow Overview:
//! 1) The access and refresh tokens travel in two `HttpOnly` cookies.
//! 2) `current_user` calls `GET /auth/v1/user`; on 401 it exchanges the refresh
//!    token once, rotates both cookies, and uses the user returned by the exchange.
//! 3) `assurance_level` reads the `aal` claim of the (possibly rotated) access token.
//! 4) `sign_out` revokes the session upstream and always clears both cookies.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use base64ct::{Base64UrlUnpadded, Encoding};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{Instrument, debug, info_span, instrument, warn};
use url::Url;

use super::{
    backend::{AssuranceLevel, BackendError, IdentityBackend, IdentityUser},
    cookies::CookieJar,
};
use crate::APP_USER_AGENT;

pub const ACCESS_TOKEN_COOKIE: &str = "vitrine-access-token";
pub const REFRESH_TOKEN_COOKIE: &str = "vitrine-refresh-token";

/// Refresh tokens outlive access tokens; the backend revokes them server-side.
const REFRESH_COOKIE_MAX_AGE: u64 = 400 * 24 * 60 * 60;
const DEFAULT_ACCESS_MAX_AGE: u64 = 60 * 60;

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
    user: IdentityUser,
}

pub struct SupabaseBackend {
    base_url: Url,
    api_key: SecretString,
    client: Client,
}

impl std::fmt::Debug for SupabaseBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseBackend")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"***")
            .finish_non_exhaustive()
    }
}

impl SupabaseBackend {
    /// # Errors
    /// Returns an error if the URL is not absolute http(s) or the client cannot be built.
    pub fn new(base_url: &str, api_key: SecretString, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid identity backend URL: {base_url}"))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(anyhow!(
                "Identity backend URL must be http(s): {}",
                base_url.as_str()
            ));
        }

        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to build identity backend HTTP client")?;

        Ok(Self {
            base_url,
            api_key,
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.as_str().trim_end_matches('/'))
    }

    async fn fetch_user(&self, access_token: &str) -> Result<Option<IdentityUser>, BackendError> {
        let span = info_span!("identity.get_user");
        let response = self
            .client
            .get(self.endpoint("/auth/v1/user"))
            .header("apikey", self.api_key.expose_secret())
            .bearer_auth(access_token)
            .send()
            .instrument(span)
            .await
            .map_err(BackendError::Unavailable)?;

        match response.status() {
            status if status.is_success() => response
                .json::<IdentityUser>()
                .await
                .map(Some)
                .map_err(|err| BackendError::InvalidResponse(err.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status => Err(BackendError::Rejected(status)),
        }
    }

    /// Exchange the refresh token, rotating both cookies on success.
    async fn refresh(
        &self,
        jar: &mut CookieJar,
        refresh_token: &str,
    ) -> Result<Option<IdentityUser>, BackendError> {
        let span = info_span!("identity.refresh");
        let response = self
            .client
            .post(self.endpoint("/auth/v1/token?grant_type=refresh_token"))
            .header("apikey", self.api_key.expose_secret())
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .instrument(span)
            .await
            .map_err(BackendError::Unavailable)?;

        let status = response.status();
        if status.is_client_error() {
            debug!("refresh token rejected ({status}), clearing session cookies");
            clear_session(jar);
            return Ok(None);
        }
        if !status.is_success() {
            return Err(BackendError::Rejected(status));
        }

        let tokens: TokenResponse = response
            .json()
            .await
            .map_err(|err| BackendError::InvalidResponse(err.to_string()))?;

        jar.set(
            ACCESS_TOKEN_COOKIE,
            &tokens.access_token,
            Some(tokens.expires_in.unwrap_or(DEFAULT_ACCESS_MAX_AGE)),
        );
        jar.set(
            REFRESH_TOKEN_COOKIE,
            &tokens.refresh_token,
            Some(REFRESH_COOKIE_MAX_AGE),
        );

        Ok(Some(tokens.user))
    }
}

#[async_trait]
impl IdentityBackend for SupabaseBackend {
    #[instrument(skip_all)]
    async fn current_user(&self, jar: &mut CookieJar) -> Result<Option<IdentityUser>, BackendError> {
        let access_token = jar.get(ACCESS_TOKEN_COOKIE).map(str::to_string);
        let refresh_token = jar.get(REFRESH_TOKEN_COOKIE).map(str::to_string);

        let had_access_token = access_token.is_some();
        if let Some(access_token) = access_token {
            if let Some(user) = self.fetch_user(&access_token).await? {
                return Ok(Some(user));
            }
        }

        match refresh_token {
            Some(refresh_token) => self.refresh(jar, &refresh_token).await,
            None => {
                // A rejected access token with nothing to refresh it is dead.
                if had_access_token {
                    clear_session(jar);
                }
                Ok(None)
            }
        }
    }

    async fn assurance_level(&self, jar: &mut CookieJar) -> Result<AssuranceLevel, BackendError> {
        let token = jar
            .get(ACCESS_TOKEN_COOKIE)
            .ok_or(BackendError::MissingSession)?;
        let claims = decode_claims(token)?;

        Ok(claims
            .get("aal")
            .and_then(Value::as_str)
            .map_or(AssuranceLevel::Aal1, AssuranceLevel::from_claim))
    }

    #[instrument(skip_all)]
    async fn sign_out(&self, jar: &mut CookieJar) -> Result<(), BackendError> {
        let access_token = jar.get(ACCESS_TOKEN_COOKIE).map(str::to_string);

        // Cookies go regardless of what the backend says.
        clear_session(jar);

        let Some(access_token) = access_token else {
            return Ok(());
        };

        let span = info_span!("identity.logout");
        let response = self
            .client
            .post(self.endpoint("/auth/v1/logout"))
            .header("apikey", self.api_key.expose_secret())
            .bearer_auth(access_token)
            .send()
            .instrument(span)
            .await
            .map_err(BackendError::Unavailable)?;

        let status = response.status();
        if status.is_success() || status == StatusCode::UNAUTHORIZED {
            Ok(())
        } else {
            warn!("identity backend logout answered {status}");
            Err(BackendError::Rejected(status))
        }
    }
}

fn clear_session(jar: &mut CookieJar) {
    jar.remove(ACCESS_TOKEN_COOKIE);
    jar.remove(REFRESH_TOKEN_COOKIE);
}

/// Decode a JWT payload without verifying it; the backend already validated the token.
fn decode_claims(token: &str) -> Result<Value, BackendError> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| BackendError::InvalidResponse("malformed access token".to_string()))?;
    let bytes = Base64UrlUnpadded::decode_vec(payload.trim_end_matches('='))
        .map_err(|_| BackendError::InvalidResponse("invalid token encoding".to_string()))?;
    serde_json::from_slice(&bytes).map_err(|err| BackendError::InvalidResponse(err.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use crate::session::{AdminAllowList, AdminSessionAuthority, AdminStatus, CookieMutation};
    use axum::{
        Json, Router,
        http::{
            HeaderMap, HeaderValue, StatusCode as HttpStatus,
            header::{AUTHORIZATION, COOKIE, SET_COOKIE},
        },
        response::{IntoResponse, Response},
        routing::{get, post},
    };
    use std::sync::Arc;
    use tokio::net::TcpListener;

    pub(crate) fn jwt_with_claims(claims: &Value) -> String {
        let header = Base64UrlUnpadded::encode_string(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = Base64UrlUnpadded::encode_string(claims.to_string().as_bytes());
        format!("{header}.{payload}.signature")
    }

    fn backend() -> SupabaseBackend {
        SupabaseBackend::new(
            "http://127.0.0.1:9",
            SecretString::from("anon-key"),
            Duration::from_millis(200),
        )
        .unwrap()
    }

    fn session_headers(access: &str, refresh: Option<&str>) -> HeaderMap {
        let mut cookie = format!("{ACCESS_TOKEN_COOKIE}={access}");
        if let Some(refresh) = refresh {
            cookie.push_str(&format!("; {REFRESH_TOKEN_COOKIE}={refresh}"));
        }
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(&cookie).unwrap());
        headers
    }

    fn rotated_access_token() -> String {
        jwt_with_claims(&json!({ "aal": "aal2" }))
    }

    async fn user_endpoint(headers: HeaderMap) -> Response {
        let expected = format!("Bearer {}", rotated_access_token());
        let authorized = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value == expected);
        if authorized {
            Json(json!({ "id": "user-1", "email": "owner@vitrine.studio" })).into_response()
        } else {
            HttpStatus::UNAUTHORIZED.into_response()
        }
    }

    async fn token_endpoint(Json(body): Json<Value>) -> Response {
        if body["refresh_token"] != "good-refresh" {
            return (
                HttpStatus::BAD_REQUEST,
                Json(json!({ "error": "invalid_grant" })),
            )
                .into_response();
        }
        Json(json!({
            "access_token": rotated_access_token(),
            "refresh_token": "fresh-refresh",
            "expires_in": 1800,
            "user": { "id": "user-1", "email": "owner@vitrine.studio" },
        }))
        .into_response()
    }

    /// Identity server on a loopback port answering `/auth/v1/user` and `/auth/v1/token`.
    async fn identity_server() -> SupabaseBackend {
        let app = Router::new()
            .route("/auth/v1/user", get(user_endpoint))
            .route("/auth/v1/token", post(token_endpoint));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        SupabaseBackend::new(
            &format!("http://{addr}"),
            SecretString::from("anon-key"),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn jar_with(access: Option<&str>) -> CookieJar {
        let mut headers = HeaderMap::new();
        if let Some(access) = access {
            headers.insert(
                COOKIE,
                HeaderValue::from_str(&format!("{ACCESS_TOKEN_COOKIE}={access}")).unwrap(),
            );
        }
        CookieJar::from_headers(&headers, true)
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(
            SupabaseBackend::new("ftp://id.example", SecretString::from("k"), Duration::from_secs(1))
                .is_err()
        );
        assert!(
            SupabaseBackend::new("not a url", SecretString::from("k"), Duration::from_secs(1))
                .is_err()
        );
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let backend = SupabaseBackend::new(
            "https://project.supabase.co/",
            SecretString::from("k"),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(
            backend.endpoint("/auth/v1/user"),
            "https://project.supabase.co/auth/v1/user"
        );
    }

    #[tokio::test]
    async fn assurance_level_reads_aal_claim() {
        let backend = backend();

        let mut jar = jar_with(Some(&jwt_with_claims(&json!({ "aal": "aal2" }))));
        assert_eq!(
            backend.assurance_level(&mut jar).await.unwrap(),
            AssuranceLevel::Aal2
        );

        let mut jar = jar_with(Some(&jwt_with_claims(&json!({ "sub": "u1" }))));
        assert_eq!(
            backend.assurance_level(&mut jar).await.unwrap(),
            AssuranceLevel::Aal1
        );
    }

    #[tokio::test]
    async fn assurance_level_errors_without_valid_token() {
        let backend = backend();

        let mut jar = jar_with(None);
        assert!(matches!(
            backend.assurance_level(&mut jar).await,
            Err(BackendError::MissingSession)
        ));

        let mut jar = jar_with(Some("not-a-jwt"));
        assert!(matches!(
            backend.assurance_level(&mut jar).await,
            Err(BackendError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn no_cookies_means_no_user_without_network() {
        let backend = backend();
        let mut jar = jar_with(None);
        assert!(backend.current_user(&mut jar).await.unwrap().is_none());
        assert!(jar.mutations().is_empty());
    }

    #[tokio::test]
    async fn sign_out_clears_cookies_even_when_unreachable() {
        let backend = backend();
        let mut jar = jar_with(Some("token"));
        let result = backend.sign_out(&mut jar).await;
        assert!(matches!(result, Err(BackendError::Unavailable(_))));

        let removed: Vec<&str> = jar
            .mutations()
            .iter()
            .filter(|m| m.is_removal())
            .map(|m| m.name())
            .collect();
        assert_eq!(removed, vec![ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE]);
    }

    #[tokio::test]
    async fn expired_access_token_is_refreshed_and_rotated() {
        let backend = identity_server().await;
        let mut jar = CookieJar::from_headers(&session_headers("stale", Some("good-refresh")), true);

        let user = backend.current_user(&mut jar).await.unwrap().unwrap();
        assert_eq!(user.email.as_deref(), Some("owner@vitrine.studio"));

        let mutations = jar.mutations();
        assert_eq!(mutations.len(), 2);
        assert_eq!(mutations[0].name(), ACCESS_TOKEN_COOKIE);
        assert_eq!(mutations[0].value(), rotated_access_token());
        assert_eq!(mutations[1].name(), REFRESH_TOKEN_COOKIE);
        assert_eq!(mutations[1].value(), "fresh-refresh");
        assert!(mutations.iter().all(|mutation| !mutation.is_removal()));

        let rendered = mutations[0].to_header_value().unwrap();
        assert!(rendered.to_str().unwrap().contains("Max-Age=1800"));

        assert_eq!(
            jar.get(ACCESS_TOKEN_COOKIE),
            Some(rotated_access_token().as_str())
        );
        assert_eq!(
            backend.assurance_level(&mut jar).await.unwrap(),
            AssuranceLevel::Aal2
        );
    }

    #[tokio::test]
    async fn refreshed_session_reaches_admin_status_and_response_cookies() {
        let backend = identity_server().await;
        let authority = AdminSessionAuthority::new(
            Some(Arc::new(backend)),
            AdminAllowList::parse("owner@vitrine.studio"),
            true,
        );

        let outcome = authority
            .status(&session_headers("stale", Some("good-refresh")))
            .await;
        assert_eq!(
            outcome.value,
            AdminStatus {
                is_admin: true,
                mfa_active: true,
            }
        );

        let mut response_headers = HeaderMap::new();
        outcome.cookies.apply(&mut response_headers);
        let set_cookies: Vec<_> = response_headers
            .get_all(SET_COOKIE)
            .iter()
            .map(|value| value.to_str().unwrap().to_string())
            .collect();
        assert_eq!(set_cookies.len(), 2);
        assert!(set_cookies.iter().any(|cookie| cookie.contains("fresh-refresh")));
        assert!(set_cookies.iter().all(|cookie| cookie.contains("Secure")));
    }

    #[tokio::test]
    async fn revoked_refresh_token_clears_both_cookies() {
        let backend = identity_server().await;
        let mut jar = CookieJar::from_headers(&session_headers("stale", Some("revoked")), true);

        assert!(backend.current_user(&mut jar).await.unwrap().is_none());

        let mutations = jar.mutations();
        assert_eq!(mutations.len(), 2);
        assert!(mutations.iter().all(CookieMutation::is_removal));
        assert!(jar.get(ACCESS_TOKEN_COOKIE).is_none());
        assert!(jar.get(REFRESH_TOKEN_COOKIE).is_none());
    }

    #[tokio::test]
    async fn rejected_access_token_without_refresh_is_cleared() {
        let backend = identity_server().await;
        let mut jar = CookieJar::from_headers(&session_headers("stale", None), true);

        assert!(backend.current_user(&mut jar).await.unwrap().is_none());

        let removed: Vec<_> = jar
            .mutations()
            .iter()
            .filter(|mutation| mutation.is_removal())
            .map(CookieMutation::name)
            .collect();
        assert!(removed.contains(&ACCESS_TOKEN_COOKIE));
        assert!(jar.get(ACCESS_TOKEN_COOKIE).is_none());
    }

    #[tokio::test]
    async fn valid_access_token_needs_no_refresh() {
        let backend = identity_server().await;
        let mut jar = CookieJar::from_headers(
            &session_headers(&rotated_access_token(), Some("good-refresh")),
            true,
        );

        let user = backend.current_user(&mut jar).await.unwrap().unwrap();
        assert_eq!(user.id, "user-1");
        assert!(jar.mutations().is_empty());
    }
}
