//! Identity backend capability interface.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

use super::cookies::CookieJar;

/// User object as returned by the identity backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdentityUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Authenticator assurance level of the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssuranceLevel {
    /// Single factor (password, magic link, OAuth).
    Aal1,
    /// A second factor was verified in this session.
    Aal2,
}

impl AssuranceLevel {
    /// Parse the backend's `aal` claim; unknown values count as single factor.
    #[must_use]
    pub fn from_claim(claim: &str) -> Self {
        if claim.eq_ignore_ascii_case("aal2") {
            Self::Aal2
        } else {
            Self::Aal1
        }
    }

    #[must_use]
    pub const fn is_multi_factor(self) -> bool {
        matches!(self, Self::Aal2)
    }
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("identity backend unavailable: {0}")]
    Unavailable(#[source] reqwest::Error),
    #[error("identity backend rejected the request: {0}")]
    Rejected(StatusCode),
    #[error("identity backend returned an invalid response: {0}")]
    InvalidResponse(String),
    #[error("no active session")]
    MissingSession,
}

/// Operations the session authority needs from the identity provider.
///
/// Every call receives the request-bound cookie jar; any session refresh the
/// backend performs is written back through it.
#[async_trait]
pub trait IdentityBackend: Send + Sync + fmt::Debug {
    /// Current session user, `None` when there is no valid session.
    async fn current_user(&self, jar: &mut CookieJar) -> Result<Option<IdentityUser>, BackendError>;

    /// Assurance level of the current session.
    async fn assurance_level(&self, jar: &mut CookieJar) -> Result<AssuranceLevel, BackendError>;

    /// End the session and clear its cookies.
    async fn sign_out(&self, jar: &mut CookieJar) -> Result<(), BackendError>;
}
