//! Best-effort notification of accepted quotes.
//!
//! Dispatch runs on a detached task: the submitter gets their answer whether or
//! not delivery succeeds, and failures only show up in the logs.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use std::{fmt, sync::Arc, time::Duration};
use tokio::task::JoinHandle;
use tracing::{Instrument, info, info_span, warn};

use super::model::QuoteRecord;
use crate::APP_USER_AGENT;

#[async_trait]
pub trait Notifier: Send + Sync + fmt::Debug {
    /// Deliver a record or return an error describing why it was not delivered.
    async fn notify(&self, record: &QuoteRecord) -> Result<()>;
}

/// Default notifier: one structured log line per quote.
#[derive(Clone, Debug)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, record: &QuoteRecord) -> Result<()> {
        let request = record.request();
        info!(
            name = %request.name,
            email = %request.email,
            project_type = %request.project_type,
            budget = %request.budget,
            submitted_at = %record.submitted_at(),
            "new quote request"
        );
        Ok(())
    }
}

/// POSTs the record as JSON to a webhook (Slack relay, mail bridge, CRM).
#[derive(Clone, Debug)]
pub struct WebhookNotifier {
    url: String,
    client: Client,
}

impl WebhookNotifier {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to build webhook HTTP client")?;
        Ok(Self { url, client })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, record: &QuoteRecord) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(record)
            .send()
            .await
            .with_context(|| format!("Failed to reach webhook {}", self.url))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(anyhow!("webhook {} answered {}", self.url, response.status()))
        }
    }
}

/// Fire-and-forget delivery.
pub fn dispatch(notifier: Arc<dyn Notifier>, record: QuoteRecord) -> JoinHandle<()> {
    let span = info_span!("quote.notify");
    tokio::spawn(
        async move {
            if let Err(err) = notifier.notify(&record).await {
                warn!("Quote notification failed: {err:#}");
            }
        }
        .instrument(span),
    )
}
