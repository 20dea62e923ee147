//! Maps parsed CLI arguments to the action to run.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{
    ARG_HTTP_TIMEOUT_SECONDS, ARG_PORT, ARG_SITE_URL, DEFAULT_SITE_URL, admin, contact, identity,
    notify, turnstile,
};
use anyhow::{Result, anyhow};
use url::Url;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if the site URL is not an absolute http(s) URL.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let http_timeout_seconds = matches
        .get_one::<u64>(ARG_HTTP_TIMEOUT_SECONDS)
        .copied()
        .unwrap_or(10);

    let site_url = matches
        .get_one::<String>(ARG_SITE_URL)
        .cloned()
        .unwrap_or_else(|| DEFAULT_SITE_URL.to_string());
    let parsed = Url::parse(&site_url).map_err(|e| anyhow!("invalid --{ARG_SITE_URL}: {e}"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(anyhow!("invalid --{ARG_SITE_URL}: must be http(s)"));
    }

    let admin_opts = admin::Options::parse(matches);
    let identity_opts = identity::Options::parse(matches);
    let turnstile_opts = turnstile::Options::parse(matches);
    let contact_opts = contact::Options::parse(matches);
    let notify_opts = notify::Options::parse(matches);

    Ok(Action::Server(Args {
        port,
        site_url,
        http_timeout_seconds,
        admin_user: admin_opts.user,
        admin_password: admin_opts.password,
        admin_emails: admin_opts.emails,
        identity_url: identity_opts.url,
        identity_key: identity_opts.key,
        turnstile_secret: turnstile_opts.secret,
        turnstile_verify_url: turnstile_opts.verify_url,
        contact_email: contact_opts.email,
        contact_phone: contact_opts.phone,
        notify_webhook_url: notify_opts.webhook_url,
    }))
}
