use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_IDENTITY_URL: &str = "identity-url";
pub const ARG_IDENTITY_KEY: &str = "identity-key";

#[derive(Debug, Clone)]
pub struct Options {
    pub url: Option<String>,
    pub key: Option<SecretString>,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        let get_non_empty = |id: &str| {
            matches
                .get_one::<String>(id)
                .cloned()
                .filter(|v| !v.trim().is_empty())
        };

        Self {
            url: get_non_empty(ARG_IDENTITY_URL),
            key: get_non_empty(ARG_IDENTITY_KEY).map(SecretString::from),
        }
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_IDENTITY_URL)
                .long(ARG_IDENTITY_URL)
                .help("Identity backend (Supabase) project URL")
                .long_help(
                    "Identity backend (Supabase) project URL.\n\nWithout a URL and key the admin API treats every caller as a visitor.",
                )
                .env("VITRINE_IDENTITY_URL"),
        )
        .arg(
            Arg::new(ARG_IDENTITY_KEY)
                .long(ARG_IDENTITY_KEY)
                .help("Identity backend public (anon) API key")
                .env("VITRINE_IDENTITY_KEY")
                .hide_env_values(true),
        )
}
