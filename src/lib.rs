//! # Vitrine (marketing site request boundary)
//!
//! `vitrine` owns the parts of the studio site that carry real state: the
//! admin area and the public quote intake.
//!
//! ## Admin Area
//!
//! Two independent layers protect `/admin` and `/api/admin`:
//!
//! - **Edge gate:** a static Basic-credential challenge evaluated before routing.
//!   The gate is inert until both `VITRINE_ADMIN_USER` and `VITRINE_ADMIN_PASSWORD`
//!   are configured; enabling it is an operational responsibility.
//! - **Session authority:** admin API handlers resolve the caller through the
//!   identity backend, test the admin allow-list, and require a second factor.
//!   Session cookies rotated by the backend are returned as explicit mutations and
//!   written to every response.
//!
//! ## Quote Intake
//!
//! `POST /api/quote` validates the payload (all field errors reported at once),
//! redeems the anti-abuse token, stores the record in memory with a server-side
//! timestamp, and hands it to the notifier without waiting on delivery.
//!
//! Submissions live for the process lifetime only.

pub mod antiabuse;
pub mod api;
pub mod cli;
pub mod contact;
pub mod gate;
pub mod locale;
pub mod quote;
pub mod session;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
