//! Quote request and record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ClientType {
    Business,
    Individual,
}

impl ClientType {
    pub const VALUES: [&'static str; 2] = ["business", "individual"];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProjectFocus {
    Web,
    Mobile,
}

impl ProjectFocus {
    pub const VALUES: [&'static str; 2] = ["web", "mobile"];
}

/// Answers collected by the site configurator widget.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Configurator {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub integrations: Vec<String>,
}

/// Lead submitted from the public quote form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub project_type: String,
    pub goal: String,
    pub budget: String,
    pub timeline: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configurator: Option<Configurator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_type: Option<ClientType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_focus: Option<ProjectFocus>,
}

/// An accepted quote. Fields are read-only once the record exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRecord {
    #[serde(flatten)]
    request: QuoteRequest,
    #[schema(value_type = String, format = DateTime)]
    submitted_at: DateTime<Utc>,
}

impl QuoteRecord {
    /// Stamp a validated request with the acceptance time.
    #[must_use]
    pub fn accept(request: QuoteRequest) -> Self {
        Self::accept_at(request, Utc::now())
    }

    #[must_use]
    pub fn accept_at(request: QuoteRequest, submitted_at: DateTime<Utc>) -> Self {
        Self {
            request,
            submitted_at,
        }
    }

    #[must_use]
    pub fn request(&self) -> &QuoteRequest {
        &self.request
    }

    #[must_use]
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }
}
