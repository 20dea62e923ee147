//! Schema validation for incoming quote payloads.
//!
//! Every rule in the table is checked independently and all violations are
//! reported together, keyed by field path (`configurator.features`). Absent or
//! `null` optional fields are valid. Unknown fields are ignored.

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use utoipa::ToSchema;

use super::model::{ClientType, ProjectFocus, QuoteRequest};

pub const ROOT_FIELD: &str = "_root";

/// Field path -> messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            first = false;
            write!(f, "{field}: {}", messages.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

#[derive(Debug, Clone, Copy)]
enum Rule {
    /// Required string, at least `min` characters once trimmed.
    Text { min: usize },
    Email,
    OptionalText,
    OneOf(&'static [&'static str]),
    StringList,
}

#[derive(Debug, Clone, Copy)]
enum Presence {
    Required,
    Optional,
}

const QUOTE_RULES: &[(&str, Presence, Rule)] = &[
    ("name", Presence::Required, Rule::Text { min: 2 }),
    ("email", Presence::Required, Rule::Email),
    ("phone", Presence::Optional, Rule::OptionalText),
    ("projectType", Presence::Required, Rule::Text { min: 2 }),
    ("goal", Presence::Required, Rule::Text { min: 5 }),
    ("budget", Presence::Required, Rule::Text { min: 2 }),
    ("timeline", Presence::Required, Rule::Text { min: 2 }),
    ("message", Presence::Optional, Rule::OptionalText),
    ("clientType", Presence::Optional, Rule::OneOf(&ClientType::VALUES)),
    ("projectFocus", Presence::Optional, Rule::OneOf(&ProjectFocus::VALUES)),
];

const CONFIGURATOR_FIELD: &str = "configurator";

const CONFIGURATOR_RULES: &[(&str, Presence, Rule)] = &[
    ("siteType", Presence::Optional, Rule::OptionalText),
    ("strategy", Presence::Optional, Rule::OptionalText),
    ("mood", Presence::Optional, Rule::OptionalText),
    ("features", Presence::Optional, Rule::StringList),
    ("integrations", Presence::Optional, Rule::StringList),
];

/// Email shape check shared with the rest of the crate.
#[must_use]
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

/// Validate an arbitrary JSON payload into a [`QuoteRequest`].
///
/// # Errors
/// Returns every violation found, keyed by field path.
pub fn validate(payload: &Value) -> Result<QuoteRequest, FieldErrors> {
    let mut errors = FieldErrors::default();

    let Some(object) = payload.as_object() else {
        errors.push(ROOT_FIELD, "Expected a JSON object");
        return Err(errors);
    };

    check_rules(object, QUOTE_RULES, "", &mut errors);

    match object.get(CONFIGURATOR_FIELD) {
        None | Some(Value::Null) => {}
        Some(Value::Object(configurator)) => {
            check_rules(
                configurator,
                CONFIGURATOR_RULES,
                CONFIGURATOR_FIELD,
                &mut errors,
            );
        }
        Some(_) => errors.push(CONFIGURATOR_FIELD, "Expected an object"),
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    // Every field shape was checked above; this only fails on a rule table bug.
    serde_json::from_value(normalized(payload)).map_err(|err| {
        let mut errors = FieldErrors::default();
        errors.push(ROOT_FIELD, err.to_string());
        errors
    })
}

/// Copy of a checked payload as it is stored: `null` entries dropped so
/// defaults apply, strings trimmed the same way the length rules count them.
fn normalized(value: &Value) -> Value {
    match value {
        Value::Object(object) => Value::Object(
            object
                .iter()
                .filter(|(_, value)| !value.is_null())
                .map(|(key, value)| (key.clone(), normalized(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(normalized).collect()),
        Value::String(text) => Value::String(text.trim().to_string()),
        other => other.clone(),
    }
}

fn check_rules(
    object: &Map<String, Value>,
    rules: &[(&str, Presence, Rule)],
    parent: &str,
    errors: &mut FieldErrors,
) {
    for (field, presence, rule) in rules {
        let path = if parent.is_empty() {
            (*field).to_string()
        } else {
            format!("{parent}.{field}")
        };

        match (object.get(*field), presence) {
            (None | Some(Value::Null), Presence::Required) => errors.push(path, "Required"),
            (None | Some(Value::Null), Presence::Optional) => {}
            (Some(value), _) => {
                if let Err(message) = check_value(value, *rule) {
                    errors.push(path, message);
                }
            }
        }
    }
}

fn check_value(value: &Value, rule: Rule) -> Result<(), String> {
    match rule {
        Rule::Text { min } => {
            let text = value.as_str().ok_or("Expected a string")?;
            if text.trim().chars().count() < min {
                return Err(format!("Must be at least {min} characters"));
            }
            Ok(())
        }
        Rule::Email => {
            let text = value.as_str().ok_or("Expected a string")?;
            if valid_email(text.trim()) {
                Ok(())
            } else {
                Err("Invalid email address".to_string())
            }
        }
        Rule::OptionalText => value
            .as_str()
            .map(|_| ())
            .ok_or_else(|| "Expected a string".to_string()),
        Rule::OneOf(allowed) => {
            let text = value.as_str().ok_or("Expected a string")?;
            if allowed.contains(&text.trim()) {
                Ok(())
            } else {
                Err(format!("Must be one of: {}", allowed.join(", ")))
            }
        }
        Rule::StringList => {
            let items = value.as_array().ok_or("Expected a list of strings")?;
            if items.iter().all(Value::is_string) {
                Ok(())
            } else {
                Err("Expected a list of strings".to_string())
            }
        }
    }
}
