//! Two-locale path resolution.
//!
//! French is served from the root (`/devis`), English lives under `/en`
//! (`/en/devis`). The mapping between the two is a fixed bijection.

use serde::Serialize;
use utoipa::ToSchema;

const EN_PREFIX: &str = "/en";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Fr,
    En,
}

impl Locale {
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Fr => "",
            Self::En => EN_PREFIX,
        }
    }

    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Fr => Self::En,
            Self::En => Self::Fr,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocaleContext {
    pub locale: Locale,
    pub prefix: String,
    pub alternate_locale: Locale,
    pub alternate_path: String,
}

/// True when the path belongs to the English tree.
#[must_use]
pub fn is_english(path: &str) -> bool {
    path == EN_PREFIX || path.starts_with("/en/")
}

#[must_use]
pub fn resolve(path: &str) -> LocaleContext {
    let locale = if is_english(path) {
        Locale::En
    } else {
        Locale::Fr
    };

    LocaleContext {
        locale,
        prefix: locale.prefix().to_string(),
        alternate_locale: locale.other(),
        alternate_path: alternate(path),
    }
}

/// Equivalent path in the other locale.
#[must_use]
pub fn alternate(path: &str) -> String {
    if is_english(path) {
        let stripped = &path[EN_PREFIX.len()..];
        if stripped.is_empty() {
            "/".to_string()
        } else {
            stripped.to_string()
        }
    } else if path.is_empty() || path == "/" {
        EN_PREFIX.to_string()
    } else if path.starts_with('/') {
        format!("{EN_PREFIX}{path}")
    } else {
        format!("{EN_PREFIX}/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_english_path() {
        let ctx = resolve("/en/devis");
        assert_eq!(ctx.locale, Locale::En);
        assert_eq!(ctx.prefix, "/en");
        assert_eq!(ctx.alternate_locale, Locale::Fr);
        assert_eq!(ctx.alternate_path, "/devis");
    }

    #[test]
    fn resolve_default_path() {
        let ctx = resolve("/devis");
        assert_eq!(ctx.locale, Locale::Fr);
        assert_eq!(ctx.prefix, "");
        assert_eq!(ctx.alternate_path, "/en/devis");
    }

    #[test]
    fn english_prefix_must_be_a_full_segment() {
        assert!(!is_english("/entreprise"));
        assert!(!is_english("/english"));
        assert!(is_english("/en"));
        assert!(is_english("/en/"));
    }

    #[test]
    fn alternate_maps_both_ways() {
        assert_eq!(alternate("/en/lexique"), "/lexique");
        assert_eq!(alternate("/lexique"), "/en/lexique");
        assert_eq!(alternate("/en"), "/");
        assert_eq!(alternate("/"), "/en");
        assert_eq!(alternate(""), "/en");
    }

    #[test]
    fn alternate_is_an_involution() {
        for path in ["/", "/en", "/devis", "/en/devis", "/a/b/c", "/en/a/b", "/entreprise"] {
            assert_eq!(alternate(&alternate(path)), path, "path: {path}");
        }
    }

    #[test]
    fn other_locale() {
        assert_eq!(Locale::Fr.other(), Locale::En);
        assert_eq!(Locale::En.other(), Locale::Fr);
    }
}
