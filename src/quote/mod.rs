//! Public quote intake.
//!
//! Flow Overview: validate the raw payload, redeem the anti-abuse token, stamp
//! and store the record, then notify without waiting for delivery.

pub mod model;
pub mod notify;
pub mod store;
pub mod validate;

pub use model::{ClientType, Configurator, ProjectFocus, QuoteRecord, QuoteRequest};
pub use notify::{LogNotifier, Notifier, WebhookNotifier};
pub use store::SubmissionStore;
pub use validate::{FieldErrors, validate};

use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::antiabuse::{
    AntiAbuseError, AntiAbuseVerdict, REASON_MISSING_TOKEN, TurnstileVerifier,
};

/// Body field carrying the challenge widget token.
pub const TOKEN_FIELD: &str = "turnstileToken";

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("invalid quote payload: {0}")]
    Invalid(FieldErrors),
    #[error("anti-abuse verification rejected the submission")]
    Rejected(AntiAbuseVerdict),
    #[error(transparent)]
    AntiAbuse(#[from] AntiAbuseError),
}

/// Everything the quote endpoints need, shared by handlers.
#[derive(Clone, Debug)]
pub struct QuoteIntake {
    verifier: TurnstileVerifier,
    store: SubmissionStore,
    notifier: Arc<dyn Notifier>,
}

impl QuoteIntake {
    #[must_use]
    pub fn new(
        verifier: TurnstileVerifier,
        store: SubmissionStore,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            verifier,
            store,
            notifier,
        }
    }

    #[must_use]
    pub fn store(&self) -> &SubmissionStore {
        &self.store
    }

    #[must_use]
    pub fn verifier(&self) -> &TurnstileVerifier {
        &self.verifier
    }

    /// Run a payload through the whole pipeline.
    ///
    /// `header_token` is used when the body has no token field.
    ///
    /// # Errors
    /// Returns [`SubmitError`] when validation fails, the token is rejected, or
    /// the verification service cannot be reached.
    #[instrument(skip(self, payload, header_token))]
    pub async fn submit(
        &self,
        payload: &Value,
        header_token: Option<&str>,
        remote_ip: Option<&str>,
    ) -> Result<QuoteRecord, SubmitError> {
        let request = validate(payload).map_err(SubmitError::Invalid)?;

        let token = payload
            .get(TOKEN_FIELD)
            .and_then(Value::as_str)
            .or(header_token)
            .map(str::trim)
            .filter(|token| !token.is_empty());

        let verdict = match token {
            Some(token) => self.verifier.verify(token, remote_ip).await?,
            None => AntiAbuseVerdict::failure(REASON_MISSING_TOKEN),
        };

        if !verdict.is_success() {
            warn!(codes = ?verdict.error_codes, "quote rejected by anti-abuse check");
            return Err(SubmitError::Rejected(verdict));
        }

        let record = QuoteRecord::accept(request);
        self.store.append(record.clone()).await;
        info!(submitted_at = %record.submitted_at(), "quote accepted");

        notify::dispatch(self.notifier.clone(), record.clone());

        Ok(record)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::antiabuse::{DEFAULT_VERIFY_URL, REASON_MISSING_SECRET};
    use serde_json::json;
    use std::time::Duration;

    fn intake(secret: Option<&str>) -> QuoteIntake {
        let verifier = TurnstileVerifier::new(
            secret.map(secrecy::SecretString::from),
            DEFAULT_VERIFY_URL.to_string(),
            Duration::from_secs(1),
        )
        .unwrap();
        QuoteIntake::new(verifier, SubmissionStore::new(), Arc::new(LogNotifier))
    }

    fn payload() -> Value {
        json!({
            "name": "Jo",
            "email": "jo@example.com",
            "goal": "Refonte du site",
            "budget": "1k",
            "timeline": "soon",
            "projectType": "web",
            "turnstileToken": "token"
        })
    }

    #[tokio::test]
    async fn invalid_payload_is_reported_before_verification() {
        let intake = intake(None);
        let result = intake.submit(&json!({ "name": "J" }), None, None).await;
        let Err(SubmitError::Invalid(errors)) = result else {
            panic!("expected validation errors");
        };
        assert!(errors.get("name").is_some());
        assert!(intake.store().is_empty().await);
    }

    #[tokio::test]
    async fn missing_token_is_rejected() {
        let intake = intake(Some("secret"));
        let mut body = payload();
        if let Some(object) = body.as_object_mut() {
            object.remove(TOKEN_FIELD);
        }

        let result = intake.submit(&body, Some("   "), None).await;
        let Err(SubmitError::Rejected(verdict)) = result else {
            panic!("expected rejection");
        };
        assert_eq!(verdict.error_codes, vec![REASON_MISSING_TOKEN]);
        assert!(intake.store().is_empty().await);
    }

    #[tokio::test]
    async fn unconfigured_secret_fails_closed() {
        let intake = intake(None);
        let result = intake.submit(&payload(), None, None).await;
        let Err(SubmitError::Rejected(verdict)) = result else {
            panic!("expected rejection");
        };
        assert_eq!(verdict.error_codes, vec![REASON_MISSING_SECRET]);
    }
}
