//! Admin session authority.
//!
//! Flow Overview: bind a cookie jar to the request, ask the identity backend
//! for the current user, apply the admin rule, and only for admins query the
//! assurance level. The result always travels with the cookie mutations the
//! backend made, so callers can write them to the response.
//!
//! A missing backend configuration is not an error: nobody is an admin and
//! logout does nothing.

pub mod admin_rule;
pub mod backend;
pub mod cookies;
pub mod supabase;

pub use admin_rule::{ADMIN_RULE_VERSION, AdminAllowList, is_admin_v1};
pub use backend::{AssuranceLevel, BackendError, IdentityBackend, IdentityUser};
pub use cookies::{CookieJar, CookieMutation, SetCookies};
pub use supabase::SupabaseBackend;

use axum::http::HeaderMap;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};
use utoipa::ToSchema;

/// A result plus the cookie writes to merge into the outbound response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome<T> {
    pub value: T,
    pub cookies: SetCookies,
}

impl<T> SessionOutcome<T> {
    fn new(value: T, jar: CookieJar) -> Self {
        Self {
            value,
            cookies: SetCookies(jar.into_mutations()),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> SessionOutcome<U> {
        SessionOutcome {
            value: f(self.value),
            cookies: self.cookies,
        }
    }
}

/// Who the caller is, as far as the admin area is concerned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminIdentity {
    pub email: Option<String>,
    pub is_admin: bool,
    pub mfa_active: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatus {
    pub is_admin: bool,
    pub mfa_active: bool,
}

impl From<&AdminIdentity> for AdminStatus {
    fn from(identity: &AdminIdentity) -> Self {
        Self {
            is_admin: identity.is_admin,
            mfa_active: identity.mfa_active,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AdminSessionAuthority {
    backend: Option<Arc<dyn IdentityBackend>>,
    allow_list: AdminAllowList,
    cookie_secure: bool,
}

impl AdminSessionAuthority {
    #[must_use]
    pub fn new(
        backend: Option<Arc<dyn IdentityBackend>>,
        allow_list: AdminAllowList,
        cookie_secure: bool,
    ) -> Self {
        Self {
            backend,
            allow_list,
            cookie_secure,
        }
    }

    /// Authority without an identity backend.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self::new(None, AdminAllowList::default(), true)
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    /// Resolve the caller. Backend errors degrade to "not an admin".
    pub async fn identify(&self, headers: &HeaderMap) -> SessionOutcome<AdminIdentity> {
        let mut jar = CookieJar::from_headers(headers, self.cookie_secure);

        let Some(backend) = &self.backend else {
            return SessionOutcome::new(AdminIdentity::default(), jar);
        };

        let user = match backend.current_user(&mut jar).await {
            Ok(Some(user)) => user,
            Ok(None) => return SessionOutcome::new(AdminIdentity::default(), jar),
            Err(err) => {
                warn!("Failed to resolve session user: {err}");
                return SessionOutcome::new(AdminIdentity::default(), jar);
            }
        };

        if !is_admin_v1(&user, &self.allow_list) {
            debug!(user_id = %user.id, "session user is not an admin");
            let identity = AdminIdentity {
                email: user.email,
                ..AdminIdentity::default()
            };
            return SessionOutcome::new(identity, jar);
        }

        let mfa_active = match backend.assurance_level(&mut jar).await {
            Ok(level) => level.is_multi_factor(),
            Err(err) => {
                warn!("Failed to read assurance level: {err}");
                false
            }
        };

        SessionOutcome::new(
            AdminIdentity {
                email: user.email,
                is_admin: true,
                mfa_active,
            },
            jar,
        )
    }

    pub async fn status(&self, headers: &HeaderMap) -> SessionOutcome<AdminStatus> {
        self.identify(headers)
            .await
            .map(|identity| AdminStatus::from(&identity))
    }

    /// Sign out; the backend's own result is only logged.
    pub async fn logout(&self, headers: &HeaderMap) -> SessionOutcome<()> {
        let mut jar = CookieJar::from_headers(headers, self.cookie_secure);

        if let Some(backend) = &self.backend {
            if let Err(err) = backend.sign_out(&mut jar).await {
                warn!("Identity backend sign-out failed: {err}");
            }
        }

        SessionOutcome::new((), jar)
    }
}
