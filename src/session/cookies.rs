//! Cookie adapter handed to the identity backend.
//!
//! The jar reads the cookies of the current request and records every write as
//! a [`CookieMutation`]. Mutations are returned to the caller and turned into
//! `Set-Cookie` headers on the outbound response via [`SetCookies`].

use axum::{
    http::{
        HeaderMap, HeaderValue,
        header::{COOKIE, InvalidHeaderValue, SET_COOKIE},
    },
    response::{IntoResponseParts, ResponseParts},
};
use std::{collections::BTreeMap, convert::Infallible};
use tracing::error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieMutation {
    name: String,
    value: String,
    /// `Some(0)` removes the cookie on the client.
    max_age: Option<u64>,
    secure: bool,
}

impl CookieMutation {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub const fn is_removal(&self) -> bool {
        matches!(self.max_age, Some(0))
    }

    /// Render as a `Set-Cookie` header value.
    ///
    /// # Errors
    /// Returns an error if the value contains characters not allowed in headers.
    pub fn to_header_value(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            self.name, self.value
        );
        if let Some(max_age) = self.max_age {
            cookie.push_str(&format!("; Max-Age={max_age}"));
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    current: BTreeMap<String, String>,
    mutations: Vec<CookieMutation>,
    secure: bool,
}

impl CookieJar {
    /// Bind a jar to the request's `Cookie` headers.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap, secure: bool) -> Self {
        let mut current = BTreeMap::new();
        for header in headers.get_all(COOKIE) {
            let Ok(value) = header.to_str() else {
                continue;
            };
            for pair in value.split(';') {
                let mut parts = pair.trim().splitn(2, '=');
                let (Some(key), Some(val)) = (parts.next(), parts.next()) else {
                    continue;
                };
                let key = key.trim();
                if !key.is_empty() {
                    current.insert(key.to_string(), val.trim().to_string());
                }
            }
        }

        Self {
            current,
            mutations: Vec::new(),
            secure,
        }
    }

    /// Current value, including writes made through this jar.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.current
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn set(&mut self, name: &str, value: &str, max_age: Option<u64>) {
        self.current.insert(name.to_string(), value.to_string());
        self.mutations.push(CookieMutation {
            name: name.to_string(),
            value: value.to_string(),
            max_age,
            secure: self.secure,
        });
    }

    pub fn remove(&mut self, name: &str) {
        self.current.remove(name);
        self.mutations.push(CookieMutation {
            name: name.to_string(),
            value: String::new(),
            max_age: Some(0),
            secure: self.secure,
        });
    }

    #[must_use]
    pub fn mutations(&self) -> &[CookieMutation] {
        &self.mutations
    }

    #[must_use]
    pub fn into_mutations(self) -> Vec<CookieMutation> {
        self.mutations
    }
}

/// Response part that appends one `Set-Cookie` header per mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetCookies(pub Vec<CookieMutation>);

impl SetCookies {
    pub fn apply(&self, headers: &mut HeaderMap) {
        for mutation in &self.0 {
            match mutation.to_header_value() {
                Ok(value) => {
                    headers.append(SET_COOKIE, value);
                }
                Err(err) => error!("Failed to encode cookie {}: {err}", mutation.name),
            }
        }
    }
}

impl IntoResponseParts for SetCookies {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        self.apply(res.headers_mut());
        Ok(res)
    }
}
