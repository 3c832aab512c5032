//! Webhook delivery.
//!
//! [`WebhookClient`] POSTs a [`WebhookMessage`] to a Discord webhook with
//! [`reqwest`]. [`DryRunSink`] prints the message instead, for local runs.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, info};

use crate::config::{redact_webhook_url, NotifierConfig};
use crate::error::{NotifierError, Result};
use crate::models::{Embed, WebhookMessage};

/// Destination for a finished report.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn deliver(&self, config: &NotifierConfig, message: &WebhookMessage) -> Result<()>;
}

// ---------------------------------------------------------------------------
// WebhookClient
// ---------------------------------------------------------------------------

/// HTTP client for Discord webhooks.
pub struct WebhookClient {
    http: Client,
}

impl WebhookClient {
    /// Create a client whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    /// Wrap an existing [`reqwest::Client`].
    pub fn with_client(http: Client) -> Self {
        Self { http }
    }

    /// Post plain text, an embed, or both.
    ///
    /// Fails with [`NotifierError::InvalidArgument`] if neither is given.
    pub async fn send(
        &self,
        config: &NotifierConfig,
        content: Option<String>,
        embed: Option<Embed>,
    ) -> Result<()> {
        let message = WebhookMessage::new(config, content, embed)?;
        self.deliver(config, &message).await
    }
}

#[async_trait]
impl MessageSink for WebhookClient {
    async fn deliver(&self, config: &NotifierConfig, message: &WebhookMessage) -> Result<()> {
        let webhook = redact_webhook_url(&config.endpoint);
        debug!(%webhook, embeds = message.embeds.len(), "posting webhook message");

        let resp = self
            .http
            .post(&config.endpoint)
            .json(message)
            .send()
            .await
            .map_err(|e| {
                error!(%webhook, error = %e, "unexpected error in Discord notification");
                NotifierError::from(e)
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".into());
            error!(status = status.as_u16(), %body, "Discord HTTP error");
            return Err(NotifierError::Delivery {
                status: status.as_u16(),
                body,
            });
        }

        info!(%webhook, status = status.as_u16(), "Discord notification sent");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// DryRunSink
// ---------------------------------------------------------------------------

/// Prints the JSON body to stdout instead of posting it.
#[derive(Debug, Default)]
pub struct DryRunSink;

#[async_trait]
impl MessageSink for DryRunSink {
    async fn deliver(&self, config: &NotifierConfig, message: &WebhookMessage) -> Result<()> {
        let body = serde_json::to_string_pretty(message)?;
        info!(webhook = %redact_webhook_url(&config.endpoint), "dry run, not posting");
        println!("{body}");
        Ok(())
    }
}
