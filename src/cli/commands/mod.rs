pub mod admin;
pub mod contact;
pub mod identity;
pub mod logging;
pub mod notify;
pub mod turnstile;

use clap::{
    Arg, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

pub const ARG_PORT: &str = "port";
pub const ARG_SITE_URL: &str = "site-url";
pub const ARG_HTTP_TIMEOUT_SECONDS: &str = "http-timeout-seconds";

pub const DEFAULT_SITE_URL: &str = "https://vitrine.studio";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("vitrine")
        .about("Admin gate, admin sessions and quote intake for the studio site")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long(ARG_PORT)
                .help("Port to listen on")
                .default_value("8080")
                .env("VITRINE_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_SITE_URL)
                .long(ARG_SITE_URL)
                .help("Public site URL")
                .long_help(
                    "Public site URL. Its origin is the only one allowed by CORS, and session cookies are marked Secure when it is https.",
                )
                .default_value(DEFAULT_SITE_URL)
                .env("VITRINE_SITE_URL"),
        )
        .arg(
            Arg::new(ARG_HTTP_TIMEOUT_SECONDS)
                .long(ARG_HTTP_TIMEOUT_SECONDS)
                .help("Timeout for outbound calls (identity backend, Turnstile, webhook)")
                .default_value("10")
                .env("VITRINE_HTTP_TIMEOUT_SECONDS")
                .value_parser(clap::value_parser!(u64).range(1..=300)),
        );

    let command = admin::with_args(command);
    let command = identity::with_args(command);
    let command = turnstile::with_args(command);
    let command = contact::with_args(command);
    let command = notify::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "vitrine");
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_defaults() {
        temp_env::with_vars(
            [
                ("VITRINE_PORT", None::<&str>),
                ("VITRINE_SITE_URL", None),
                ("VITRINE_HTTP_TIMEOUT_SECONDS", None),
                ("VITRINE_TURNSTILE_VERIFY_URL", None),
            ],
            || {
                let matches = new().get_matches_from(vec!["vitrine"]);
                assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(8080));
                assert_eq!(
                    matches.get_one::<String>(ARG_SITE_URL).cloned(),
                    Some(DEFAULT_SITE_URL.to_string())
                );
                assert_eq!(
                    matches.get_one::<u64>(ARG_HTTP_TIMEOUT_SECONDS).copied(),
                    Some(10)
                );
                assert_eq!(
                    matches
                        .get_one::<String>(turnstile::ARG_TURNSTILE_VERIFY_URL)
                        .cloned(),
                    Some(crate::antiabuse::DEFAULT_VERIFY_URL.to_string())
                );
            },
        );
    }

    #[test]
    fn test_check_args() {
        let matches = new().get_matches_from(vec![
            "vitrine",
            "--port",
            "9090",
            "--admin-user",
            "studio",
            "--admin-password",
            "s3cret",
            "--admin-emails",
            "owner@vitrine.studio",
            "--identity-url",
            "https://project.supabase.co",
            "--identity-key",
            "anon",
        ]);

        assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(9090));
        assert_eq!(
            matches.get_one::<String>(admin::ARG_ADMIN_USER).cloned(),
            Some("studio".to_string())
        );
        assert_eq!(
            matches.get_one::<String>(identity::ARG_IDENTITY_URL).cloned(),
            Some("https://project.supabase.co".to_string())
        );
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("VITRINE_PORT", Some("443")),
                ("VITRINE_ADMIN_USER", Some("studio")),
                ("VITRINE_ADMIN_PASSWORD", Some("s3cret")),
                ("VITRINE_TURNSTILE_SECRET", Some("0x000")),
                ("VITRINE_CONTACT_PHONE", Some("06 12 34 56 78")),
                ("VITRINE_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches = new().get_matches_from(vec!["vitrine"]);
                assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(443));
                assert_eq!(
                    matches.get_one::<String>(admin::ARG_ADMIN_PASSWORD).cloned(),
                    Some("s3cret".to_string())
                );
                assert_eq!(
                    matches
                        .get_one::<String>(turnstile::ARG_TURNSTILE_SECRET)
                        .cloned(),
                    Some("0x000".to_string())
                );
                assert_eq!(
                    matches.get_one::<String>(contact::ARG_CONTACT_PHONE).cloned(),
                    Some("06 12 34 56 78".to_string())
                );
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars([("VITRINE_LOG_LEVEL", Some(level))], || {
                let matches = new().get_matches_from(vec!["vitrine"]);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_timeout_range() {
        let result = new().try_get_matches_from(vec!["vitrine", "--http-timeout-seconds", "0"]);
        assert!(result.is_err());
    }
}
