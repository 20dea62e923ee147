//! Anti-abuse token verification (Cloudflare Turnstile `siteverify`).
//!
//! The verifier fails closed: without a configured secret every token is
//! rejected with `missing-secret` and no request leaves the process.
//! An unreachable service is reported as [`AntiAbuseError::Unavailable`] so it
//! can be told apart from a verdict where the service said no.

use anyhow::{Context, Result};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{Instrument, debug, info_span, warn};

use crate::APP_USER_AGENT;

pub const DEFAULT_VERIFY_URL: &str = "https://challenges.cloudflare.com/turnstile/v0/siteverify";

pub const REASON_MISSING_SECRET: &str = "missing-secret";
pub const REASON_VERIFY_FAILED: &str = "verify-failed";
pub const REASON_MISSING_TOKEN: &str = "missing-input-response";

/// Verdict returned by the verification service, passed through as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AntiAbuseVerdict {
    pub success: bool,
    #[serde(rename = "error-codes", default)]
    pub error_codes: Vec<String>,
    /// Any other fields the service sends (`hostname`, `action`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AntiAbuseVerdict {
    #[must_use]
    pub fn failure(reason: &str) -> Self {
        Self {
            success: false,
            error_codes: vec![reason.to_string()],
            extra: Map::new(),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.success
    }
}

#[derive(Debug, Error)]
pub enum AntiAbuseError {
    #[error("anti-abuse service unavailable: {0}")]
    Unavailable(#[source] reqwest::Error),
}

#[derive(Serialize)]
struct VerifyForm<'a> {
    secret: &'a str,
    response: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    remoteip: Option<&'a str>,
}

#[derive(Clone)]
pub struct TurnstileVerifier {
    secret: Option<SecretString>,
    endpoint: String,
    client: Client,
}

impl std::fmt::Debug for TurnstileVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnstileVerifier")
            .field("secret", &self.secret.as_ref().map(|_| "***"))
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl TurnstileVerifier {
    /// Build a verifier with an explicit request timeout.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(secret: Option<SecretString>, endpoint: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to build anti-abuse HTTP client")?;

        let secret = secret.filter(|s| !s.expose_secret().is_empty());

        Ok(Self {
            secret,
            endpoint,
            client,
        })
    }

    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Redeem a client token.
    ///
    /// # Errors
    /// Returns [`AntiAbuseError::Unavailable`] when the service cannot be reached
    /// or answers with a body that is not a verdict.
    pub async fn verify(
        &self,
        token: &str,
        remote_ip: Option<&str>,
    ) -> Result<AntiAbuseVerdict, AntiAbuseError> {
        let Some(secret) = &self.secret else {
            warn!("anti-abuse secret not configured, rejecting token");
            return Ok(AntiAbuseVerdict::failure(REASON_MISSING_SECRET));
        };

        let form = VerifyForm {
            secret: secret.expose_secret(),
            response: token,
            remoteip: remote_ip,
        };

        let span = info_span!("antiabuse.verify", http.url = %self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .form(&form)
            .send()
            .instrument(span)
            .await
            .map_err(AntiAbuseError::Unavailable)?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "anti-abuse verification rejected by transport");
            return Ok(AntiAbuseVerdict::failure(REASON_VERIFY_FAILED));
        }

        let verdict: AntiAbuseVerdict = response
            .json()
            .await
            .map_err(AntiAbuseError::Unavailable)?;

        debug!(
            success = verdict.success,
            codes = ?verdict.error_codes,
            "anti-abuse verdict"
        );

        Ok(verdict)
    }
}
