use crate::{
    api::{self, AppContext},
    antiabuse::TurnstileVerifier,
    cli::telemetry,
    contact::ContactSettings,
    gate::GateConfig,
    quote::{LogNotifier, Notifier, QuoteIntake, SubmissionStore, WebhookNotifier},
    session::{ADMIN_RULE_VERSION, AdminAllowList, AdminSessionAuthority, IdentityBackend, SupabaseBackend},
};
use anyhow::Result;
use secrecy::SecretString;
use std::{sync::Arc, time::Duration};
use tracing::{info, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub site_url: String,
    pub http_timeout_seconds: u64,
    pub admin_user: Option<String>,
    pub admin_password: Option<SecretString>,
    pub admin_emails: Option<String>,
    pub identity_url: Option<String>,
    pub identity_key: Option<SecretString>,
    pub turnstile_secret: Option<SecretString>,
    pub turnstile_verify_url: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub notify_webhook_url: Option<String>,
}

/// Resolve every component from the arguments, once.
///
/// # Errors
/// Returns an error if an outbound URL is invalid or an HTTP client cannot be built.
pub fn build_context(args: &Args) -> Result<AppContext> {
    let timeout = Duration::from_secs(args.http_timeout_seconds);

    let gate = GateConfig::from_options(args.admin_user.clone(), args.admin_password.clone());
    if !gate.is_enabled() {
        warn!("Admin gate disabled: set VITRINE_ADMIN_USER and VITRINE_ADMIN_PASSWORD to enable it");
    }

    let backend: Option<Arc<dyn IdentityBackend>> =
        match (&args.identity_url, &args.identity_key) {
            (Some(url), Some(key)) => {
                Some(Arc::new(SupabaseBackend::new(url, key.clone(), timeout)?))
            }
            (None, None) => {
                warn!("Identity backend not configured: nobody is an admin");
                None
            }
            _ => {
                warn!("Identity backend needs both URL and key: nobody is an admin");
                None
            }
        };

    let allow_list = args
        .admin_emails
        .as_deref()
        .map(AdminAllowList::parse)
        .unwrap_or_default();
    if backend.is_some() && allow_list.is_empty() {
        warn!("Admin allow-list is empty: nobody is an admin");
    }

    let cookie_secure = args.site_url.starts_with("https://");
    let sessions = AdminSessionAuthority::new(backend, allow_list, cookie_secure);

    let verifier = TurnstileVerifier::new(
        args.turnstile_secret.clone(),
        args.turnstile_verify_url.clone(),
        timeout,
    )?;
    if !verifier.is_configured() {
        warn!("Turnstile secret not configured: every quote submission will be rejected");
    }

    let notifier: Arc<dyn Notifier> = match &args.notify_webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(url.clone(), timeout)?),
        None => Arc::new(LogNotifier),
    };

    let intake = QuoteIntake::new(verifier, SubmissionStore::new(), notifier);
    let contact = ContactSettings::new(args.contact_email.clone(), args.contact_phone.clone());

    Ok(AppContext {
        gate: Arc::new(gate),
        intake: Arc::new(intake),
        sessions: Arc::new(sessions),
        contact: Arc::new(contact),
    })
}

/// Execute the server action.
/// # Errors
/// Returns an error if the configuration is invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let ctx = build_context(&args)?;

    info!(
        gate = ctx.gate.is_enabled(),
        identity = ctx.sessions.is_configured(),
        antiabuse = ctx.intake.verifier().is_configured(),
        admin_rule = ADMIN_RULE_VERSION,
        "Starting vitrine"
    );

    let result = api::new(args.port, ctx, &args.site_url).await;

    telemetry::shutdown_tracer();

    result
}
