use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

use crate::antiabuse::DEFAULT_VERIFY_URL;

pub const ARG_TURNSTILE_SECRET: &str = "turnstile-secret";
pub const ARG_TURNSTILE_VERIFY_URL: &str = "turnstile-verify-url";

#[derive(Debug, Clone)]
pub struct Options {
    pub secret: Option<SecretString>,
    pub verify_url: String,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        let secret = matches
            .get_one::<String>(ARG_TURNSTILE_SECRET)
            .cloned()
            .filter(|v| !v.trim().is_empty())
            .map(SecretString::from);

        let verify_url = matches
            .get_one::<String>(ARG_TURNSTILE_VERIFY_URL)
            .cloned()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_VERIFY_URL.to_string());

        Self { secret, verify_url }
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_TURNSTILE_SECRET)
                .long(ARG_TURNSTILE_SECRET)
                .help("Turnstile secret key used to redeem quote tokens")
                .long_help(
                    "Turnstile secret key used to redeem quote tokens.\n\nWithout it every quote submission is rejected with `missing-secret`.",
                )
                .env("VITRINE_TURNSTILE_SECRET")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_TURNSTILE_VERIFY_URL)
                .long(ARG_TURNSTILE_VERIFY_URL)
                .help("Turnstile siteverify endpoint")
                .default_value(DEFAULT_VERIFY_URL)
                .env("VITRINE_TURNSTILE_VERIFY_URL"),
        )
}
