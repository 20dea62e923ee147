//! Public contact settings shown across the site.

use serde::Serialize;
use utoipa::ToSchema;

const FRANCE_CALLING_CODE: &str = "+33";

#[derive(Clone, Debug, Default)]
pub struct ContactSettings {
    email: Option<String>,
    phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub phone_href: Option<String>,
}

impl ContactSettings {
    #[must_use]
    pub fn new(email: Option<String>, phone: Option<String>) -> Self {
        let clean = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            email: clean(email),
            phone: clean(phone),
        }
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    #[must_use]
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    /// `tel:` link for the configured phone, if it has any digits.
    #[must_use]
    pub fn phone_href(&self) -> Option<String> {
        let normalized = normalize_phone(self.phone.as_deref()?);
        if normalized.chars().any(|c| c.is_ascii_digit()) {
            Some(format!("tel:{normalized}"))
        } else {
            None
        }
    }

    #[must_use]
    pub fn to_response(&self) -> ContactResponse {
        ContactResponse {
            email: self.email.clone(),
            phone: self.phone.clone(),
            phone_href: self.phone_href(),
        }
    }
}

/// Keep digits only, preserving a leading `+`; a national leading `0` becomes `+33`.
#[must_use]
pub fn normalize_phone(raw: &str) -> String {
    let trimmed = raw.trim();
    let international = trimmed.starts_with('+');
    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();

    if international {
        format!("+{digits}")
    } else if let Some(national) = digits.strip_prefix('0') {
        format!("{FRANCE_CALLING_CODE}{national}")
    } else {
        digits
    }
}
