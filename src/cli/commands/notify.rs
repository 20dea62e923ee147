use clap::{Arg, ArgMatches, Command};

pub const ARG_NOTIFY_WEBHOOK_URL: &str = "notify-webhook-url";

#[derive(Debug, Clone)]
pub struct Options {
    pub webhook_url: Option<String>,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        Self {
            webhook_url: matches
                .get_one::<String>(ARG_NOTIFY_WEBHOOK_URL)
                .cloned()
                .filter(|v| !v.trim().is_empty()),
        }
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_NOTIFY_WEBHOOK_URL)
            .long(ARG_NOTIFY_WEBHOOK_URL)
            .help("Webhook receiving accepted quotes as JSON")
            .long_help(
                "Webhook receiving accepted quotes as JSON.\n\nWhen unset, accepted quotes are only written to the log.",
            )
            .env("VITRINE_NOTIFY_WEBHOOK_URL"),
    )
}
