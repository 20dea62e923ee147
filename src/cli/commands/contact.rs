use clap::{Arg, ArgMatches, Command};

pub const ARG_CONTACT_EMAIL: &str = "contact-email";
pub const ARG_CONTACT_PHONE: &str = "contact-phone";

#[derive(Debug, Clone)]
pub struct Options {
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        Self {
            email: matches.get_one::<String>(ARG_CONTACT_EMAIL).cloned(),
            phone: matches.get_one::<String>(ARG_CONTACT_PHONE).cloned(),
        }
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_CONTACT_EMAIL)
                .long(ARG_CONTACT_EMAIL)
                .help("Public contact email shown on the site")
                .env("VITRINE_CONTACT_EMAIL"),
        )
        .arg(
            Arg::new(ARG_CONTACT_PHONE)
                .long(ARG_CONTACT_PHONE)
                .help("Public contact phone, national or international format")
                .env("VITRINE_CONTACT_PHONE"),
        )
}
