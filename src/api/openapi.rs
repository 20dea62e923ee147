use super::handlers::{admin, contact, health, locale, quote};
use utoipa::openapi::{Contact, InfoBuilder, License, OpenApiBuilder, Tag};
use utoipa_axum::{router::OpenApiRouter, routes};

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let (_router, openapi) = api_router().split_for_parts();
    openapi
}

/// Router that also drives the `OpenAPI` document.
///
/// Register endpoints with `.routes(routes!(...))` so they are served and
/// documented at once. `/` and the fallback are added outside and stay undocumented.
pub(crate) fn api_router() -> OpenApiRouter {
    let mut health_tag = Tag::new("health");
    health_tag.description = Some("Service liveness and configuration".to_string());

    let mut quote_tag = Tag::new("quote");
    quote_tag.description = Some("Public quote intake".to_string());

    let mut admin_tag = Tag::new("admin");
    admin_tag.description = Some("Admin session and submissions".to_string());

    let mut site_tag = Tag::new("site");
    site_tag.description = Some("Locale and contact details for the site".to_string());

    let mut openapi = cargo_openapi();
    openapi.tags = Some(vec![health_tag, quote_tag, admin_tag, site_tag]);

    OpenApiRouter::with_openapi(openapi)
        .routes(routes!(health::health))
        .routes(routes!(quote::submit_quote, quote::list_quotes))
        .routes(routes!(admin::admin_quotes))
        .routes(routes!(admin::status))
        .routes(routes!(admin::logout))
        .routes(routes!(locale::locale))
        .routes(routes!(contact::contact))
}

fn cargo_openapi() -> utoipa::openapi::OpenApi {
    let mut info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(optional_str(env!("CARGO_PKG_DESCRIPTION")))
        .build();

    info.contact = cargo_contact();
    info.license = cargo_license();

    OpenApiBuilder::new().info(info).build()
}

fn cargo_contact() -> Option<Contact> {
    // Cargo authors are `;` separated and may include "Name <email>".
    let authors = env!("CARGO_PKG_AUTHORS");
    let primary = authors.split(';').next().map(str::trim)?;
    if primary.is_empty() {
        return None;
    }

    let (name, email) = parse_author(primary);
    if name.is_none() && email.is_none() {
        return None;
    }

    let mut contact = Contact::new();
    contact.name = name.map(str::to_string);
    contact.email = email.map(str::to_string);
    Some(contact)
}

fn cargo_license() -> Option<License> {
    let identifier = optional_str(env!("CARGO_PKG_LICENSE"))?;
    let mut license = License::new(identifier);
    license.identifier = Some(identifier.to_string());
    Some(license)
}

fn optional_str(value: &'static str) -> Option<&'static str> {
    Some(value.trim()).filter(|trimmed| !trimmed.is_empty())
}

fn parse_author(author: &str) -> (Option<&str>, Option<&str>) {
    let non_empty = |value: &str| !value.is_empty();
    match author.find('<') {
        Some(start) => {
            let name = author[..start].trim();
            let email = author[start + 1..].trim_end_matches('>').trim();
            (
                non_empty(name).then_some(name),
                non_empty(email).then_some(email),
            )
        }
        None => {
            let name = author.trim();
            (non_empty(name).then_some(name), None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_info_from_cargo() {
        let spec = openapi();
        assert_eq!(spec.info.title, env!("CARGO_PKG_NAME"));
        assert_eq!(spec.info.version, env!("CARGO_PKG_VERSION"));

        let contact = spec.info.contact;
        assert!(contact.is_some());
        if let Some(contact) = contact {
            assert_eq!(contact.name.as_deref(), Some("Team Vitrine"));
            assert_eq!(contact.email.as_deref(), Some("team@vitrine.studio"));
        }

        let license = spec.info.license;
        assert!(license.is_some());
        if let Some(license) = license {
            assert_eq!(license.identifier.as_deref(), Some("BSD-3-Clause"));
        }
    }

    #[test]
    fn openapi_tags_and_paths() {
        let spec = openapi();
        let tags = spec.tags.clone().unwrap_or_default();
        for name in ["health", "quote", "admin", "site"] {
            assert!(tags.iter().any(|tag| tag.name == name), "tag {name}");
        }
        for path in [
            "/health",
            "/api/quote",
            "/api/admin/quotes",
            "/api/admin/auth/status",
            "/api/admin/auth/logout",
            "/api/locale",
            "/api/contact",
        ] {
            assert!(spec.paths.paths.contains_key(path), "path {path}");
        }
    }

    #[test]
    fn health_documents_a_single_object() {
        let document = serde_json::to_value(openapi()).unwrap_or_default();
        let schema = &document["paths"]["/health"]["get"]["responses"]["200"]["content"]
            ["application/json"]["schema"];
        assert_eq!(schema["$ref"], "#/components/schemas/Health");
        assert!(schema.get("items").is_none());
    }

    #[test]
    fn parse_author_variants() {
        assert_eq!(
            parse_author("Team Vitrine <team@vitrine.studio>"),
            (Some("Team Vitrine"), Some("team@vitrine.studio"))
        );
        assert_eq!(parse_author("Solo"), (Some("Solo"), None));
        assert_eq!(parse_author("<a@b.c>"), (None, Some("a@b.c")));
    }
}
