use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_ADMIN_USER: &str = "admin-user";
pub const ARG_ADMIN_PASSWORD: &str = "admin-password";
pub const ARG_ADMIN_EMAILS: &str = "admin-emails";

#[derive(Debug, Clone)]
pub struct Options {
    pub user: Option<String>,
    pub password: Option<SecretString>,
    /// Comma separated, normalized later by the allow-list.
    pub emails: Option<String>,
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
            user: get_non_empty(ARG_ADMIN_USER),
            password: get_non_empty(ARG_ADMIN_PASSWORD).map(SecretString::from),
            emails: get_non_empty(ARG_ADMIN_EMAILS),
        }
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_ADMIN_USER)
                .long(ARG_ADMIN_USER)
                .help("Basic auth user for the /admin gate")
                .long_help(
                    "Basic auth user for the /admin and /api/admin gate.\n\nThe gate stays disabled unless both the user and the password are set.",
                )
                .env("VITRINE_ADMIN_USER"),
        )
        .arg(
            Arg::new(ARG_ADMIN_PASSWORD)
                .long(ARG_ADMIN_PASSWORD)
                .help("Basic auth password for the /admin gate")
                .env("VITRINE_ADMIN_PASSWORD")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_ADMIN_EMAILS)
                .long(ARG_ADMIN_EMAILS)
                .help("Comma separated emails allowed into the admin API")
                .env("VITRINE_ADMIN_EMAILS"),
        )
}
