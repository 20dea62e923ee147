//! Edge access gate for the admin area.
//!
//! Flow Overview: every request whose path falls under `/admin` or `/api/admin`
//! must present `Authorization: Basic` credentials equal to the configured
//! admin user and password. The gate runs before routing and knows nothing
//! about identity-backend sessions.
//!
//! Without configured credentials the gate is `Disabled` and lets everything
//! through. Deployments must set both values to actually protect the area.

use axum::{
    extract::{Request, State},
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{AUTHORIZATION, WWW_AUTHENTICATE},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64ct::{Base64, Encoding};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, warn};

pub const ADMIN_UI_PREFIX: &str = "/admin";
pub const ADMIN_API_PREFIX: &str = "/api/admin";
pub const REALM: &str = "vitrine admin";

#[derive(Clone)]
pub struct AdminCredentials {
    user: String,
    password: SecretString,
}

impl AdminCredentials {
    #[must_use]
    pub fn new(user: String, password: SecretString) -> Self {
        Self { user, password }
    }

    fn matches(&self, user: &str, password: &str) -> bool {
        // Evaluate both comparisons so a wrong user costs the same as a wrong password.
        let user_ok = constant_time_eq(self.user.as_bytes(), user.as_bytes());
        let password_ok =
            constant_time_eq(self.password.expose_secret().as_bytes(), password.as_bytes());
        user_ok & password_ok
    }
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// Gate activation, resolved once at startup.
#[derive(Clone, Debug)]
pub enum GateConfig {
    Disabled,
    Enabled(AdminCredentials),
}

impl GateConfig {
    /// Enabled only when both user and password are present and non-empty.
    #[must_use]
    pub fn from_options(user: Option<String>, password: Option<SecretString>) -> Self {
        match (user, password) {
            (Some(user), Some(password))
                if !user.is_empty() && !password.expose_secret().is_empty() =>
            {
                Self::Enabled(AdminCredentials::new(user, password))
            }
            _ => Self::Disabled,
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessVerdict {
    Allow,
    ChallengeRequired,
    Denied,
}

/// True for paths under the admin UI or admin API prefixes.
#[must_use]
pub fn is_gated(path: &str) -> bool {
    [ADMIN_UI_PREFIX, ADMIN_API_PREFIX].iter().any(|prefix| {
        path.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}

/// Decide the verdict for a gated request.
#[must_use]
pub fn evaluate(config: &GateConfig, authorization: Option<&HeaderValue>) -> AccessVerdict {
    let GateConfig::Enabled(credentials) = config else {
        return AccessVerdict::Allow;
    };

    let Some(header) = authorization else {
        return AccessVerdict::ChallengeRequired;
    };

    let Ok(value) = header.to_str() else {
        return AccessVerdict::Denied;
    };

    // Auth schemes are case-insensitive.
    let Some(encoded) = value
        .split_once(' ')
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("basic"))
        .map(|(_, encoded)| encoded)
    else {
        return AccessVerdict::ChallengeRequired;
    };

    match decode_basic(encoded.trim()) {
        Some((user, password)) if credentials.matches(&user, &password) => AccessVerdict::Allow,
        _ => AccessVerdict::ChallengeRequired,
    }
}

/// Decode `user:password` from a Basic credential, splitting at the first colon.
fn decode_basic(encoded: &str) -> Option<(String, String)> {
    let bytes = Base64::decode_vec(encoded).ok()?;
    let pair = String::from_utf8(bytes).ok()?;
    let (user, password) = pair.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

fn constant_time_eq(expected: &[u8], provided: &[u8]) -> bool {
    // Hash first so the comparison length never depends on the input.
    let expected = Sha256::digest(expected);
    let provided = Sha256::digest(provided);
    expected
        .iter()
        .zip(provided.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// 401 advertising the Basic scheme.
#[must_use]
pub fn challenge_response() -> Response {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&format!("Basic realm=\"{REALM}\", charset=\"UTF-8\"")) {
        headers.insert(WWW_AUTHENTICATE, value);
    }
    (StatusCode::UNAUTHORIZED, headers, "Authentication required").into_response()
}

/// axum middleware wrapping the whole router.
pub async fn middleware(
    State(config): State<Arc<GateConfig>>,
    request: Request,
    next: Next,
) -> Response {
    if !is_gated(request.uri().path()) {
        return next.run(request).await;
    }

    match evaluate(&config, request.headers().get(AUTHORIZATION)) {
        AccessVerdict::Allow => next.run(request).await,
        AccessVerdict::ChallengeRequired => {
            debug!(path = %request.uri().path(), "admin gate challenge");
            challenge_response()
        }
        AccessVerdict::Denied => {
            warn!(path = %request.uri().path(), "admin gate denied malformed credentials");
            (StatusCode::BAD_REQUEST, "Malformed authorization header").into_response()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn enabled() -> GateConfig {
        GateConfig::from_options(
            Some("admin".to_string()),
            Some(SecretString::from("s3cret:pass")),
        )
    }

    fn basic(user: &str, password: &str) -> HeaderValue {
        let encoded = Base64::encode_string(format!("{user}:{password}").as_bytes());
        HeaderValue::from_str(&format!("Basic {encoded}")).unwrap()
    }

    #[test]
    fn gated_paths() {
        assert!(is_gated("/admin"));
        assert!(is_gated("/admin/quotes"));
        assert!(is_gated("/api/admin"));
        assert!(is_gated("/api/admin/auth/status"));
        assert!(!is_gated("/administration"));
        assert!(!is_gated("/api/quote"));
        assert!(!is_gated("/"));
    }

    #[test]
    fn disabled_without_both_values() {
        assert!(!GateConfig::from_options(None, None).is_enabled());
        assert!(!GateConfig::from_options(Some("admin".to_string()), None).is_enabled());
        assert!(
            !GateConfig::from_options(Some(String::new()), Some(SecretString::from("x")))
                .is_enabled()
        );
        assert!(enabled().is_enabled());
    }

    #[test]
    fn disabled_gate_allows_everything() {
        let config = GateConfig::Disabled;
        assert_eq!(evaluate(&config, None), AccessVerdict::Allow);
        assert_eq!(
            evaluate(&config, Some(&basic("x", "y"))),
            AccessVerdict::Allow
        );
    }

    #[test]
    fn missing_or_foreign_scheme_challenges() {
        let config = enabled();
        assert_eq!(evaluate(&config, None), AccessVerdict::ChallengeRequired);
        assert_eq!(
            evaluate(&config, Some(&HeaderValue::from_static("Bearer abc"))),
            AccessVerdict::ChallengeRequired
        );
    }

    #[test]
    fn exact_match_allows_and_splits_on_first_colon() {
        let config = enabled();
        assert_eq!(
            evaluate(&config, Some(&basic("admin", "s3cret:pass"))),
            AccessVerdict::Allow
        );
    }

    #[test]
    fn scheme_is_case_insensitive() {
        let config = enabled();
        let encoded = Base64::encode_string(b"admin:s3cret:pass");
        for scheme in ["basic", "BASIC", "bAsIc"] {
            let header = HeaderValue::from_str(&format!("{scheme} {encoded}")).unwrap();
            assert_eq!(
                evaluate(&config, Some(&header)),
                AccessVerdict::Allow,
                "scheme {scheme}"
            );
        }

        let header = HeaderValue::from_str(&format!("Bearer {encoded}")).unwrap();
        assert_eq!(
            evaluate(&config, Some(&header)),
            AccessVerdict::ChallengeRequired
        );
    }

    #[test]
    fn comparison_is_case_and_whitespace_sensitive() {
        let config = enabled();
        for (user, password) in [
            ("Admin", "s3cret:pass"),
            ("admin", "S3cret:pass"),
            ("admin ", "s3cret:pass"),
            ("admin", " s3cret:pass"),
            ("admin", "s3cret"),
            ("", ""),
        ] {
            assert_eq!(
                evaluate(&config, Some(&basic(user, password))),
                AccessVerdict::ChallengeRequired,
                "user={user:?} password={password:?}"
            );
        }
    }

    #[test]
    fn undecodable_credentials_challenge() {
        let config = enabled();
        assert_eq!(
            evaluate(&config, Some(&HeaderValue::from_static("Basic !!!"))),
            AccessVerdict::ChallengeRequired
        );
        let no_colon = Base64::encode_string(b"admin");
        let header = HeaderValue::from_str(&format!("Basic {no_colon}")).unwrap();
        assert_eq!(
            evaluate(&config, Some(&header)),
            AccessVerdict::ChallengeRequired
        );
    }

    #[test]
    fn non_ascii_header_is_denied() {
        let config = enabled();
        let header = HeaderValue::from_bytes(b"Basic \xff\xfe").unwrap();
        assert_eq!(evaluate(&config, Some(&header)), AccessVerdict::Denied);
    }

    #[test]
    fn challenge_advertises_basic_realm() {
        let response = challenge_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let header = response
            .headers()
            .get(WWW_AUTHENTICATE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(header.starts_with("Basic realm=\"vitrine admin\""));
    }

    #[test]
    fn credentials_debug_hides_password() {
        let GateConfig::Enabled(credentials) = enabled() else {
            panic!("expected enabled gate");
        };
        let debug = format!("{credentials:?}");
        assert!(debug.contains("admin"));
        assert!(!debug.contains("s3cret"));
    }
}
