//! WebhookSink - HTTP delivery with configurable payload format

use async_trait::async_trait;
use contracts::{AuditError, AuditEvent, AuditSink};
use reqwest::header::CONTENT_TYPE;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Payload format for webhook delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WebhookFormat {
    /// GET with the event summary as a URL parameter
    UrlParameterGet,
    /// POST with the event summary as a URL parameter, empty body
    UrlParameterPost,
    /// POST with a plain-text body
    #[default]
    Text,
    /// POST with the full event as JSON
    Json,
    /// POST with a Slack-compatible `{"text": ...}` body
    Slack,
}

impl WebhookFormat {
    /// Parse a configured format name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "url_parameter_get" => Some(Self::UrlParameterGet),
            "url_parameter_post" => Some(Self::UrlParameterPost),
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            "slack" => Some(Self::Slack),
            _ => None,
        }
    }
}

/// Configuration for WebhookSink
#[derive(Debug, Clone)]
pub struct WebhookSinkConfig {
    /// Target URL
    pub url: String,
    /// Payload format
    pub format: WebhookFormat,
    /// Per-request timeout
    pub timeout: Duration,
}

impl WebhookSinkConfig {
    /// Create config from params map
    ///
    /// A missing or unknown format falls back to plain text.
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let url = params
            .get("url")
            .ok_or_else(|| "missing 'url' parameter".to_string())?
            .clone();

        let format = match params.get("format") {
            None => WebhookFormat::default(),
            Some(name) => WebhookFormat::from_name(name).unwrap_or_else(|| {
                warn!(format = %name, "Unknown webhook format, using text");
                WebhookFormat::default()
            }),
        };

        let timeout_ms = params
            .get("timeout_ms")
            .and_then(|s| s.parse().ok())
            .unwrap_or(5000);

        Ok(Self {
            url,
            format,
            timeout: Duration::from_millis(timeout_ms),
        })
    }
}

/// Sink that delivers events to an HTTP webhook
pub struct WebhookSink {
    name: String,
    config: WebhookSinkConfig,
    client: reqwest::Client,
}

impl WebhookSink {
    /// Create a new WebhookSink
    pub fn new(name: impl Into<String>, config: WebhookSinkConfig) -> Result<Self, AuditError> {
        let name = name.into();
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AuditError::sink_connection(&name, e.to_string()))?;

        debug!(sink = %name, url = %config.url, format = ?config.format, "WebhookSink ready");

        Ok(Self {
            name,
            config,
            client,
        })
    }

    /// Create from params (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, AuditError> {
        let name = name.into();
        let config =
            WebhookSinkConfig::from_params(params).map_err(|e| AuditError::sink_connection(&name, e))?;
        Self::new(name, config)
    }

    /// One-line plain-text rendering used by the non-JSON formats
    fn text_line(event: &AuditEvent) -> String {
        format!(
            "{} {} {} user={} remote={}",
            event.timestamp.to_rfc3339(),
            event.category,
            event.origin,
            event.effective_user.as_deref().unwrap_or("-"),
            event.remote_address.as_deref().unwrap_or("-"),
        )
    }

    fn request(&self, event: &AuditEvent) -> reqwest::RequestBuilder {
        let url = &self.config.url;
        match self.config.format {
            WebhookFormat::Json => self.client.post(url).json(event),
            WebhookFormat::Slack => self
                .client
                .post(url)
                .json(&serde_json::json!({ "text": Self::text_line(event) })),
            WebhookFormat::Text => self
                .client
                .post(url)
                .header(CONTENT_TYPE, "text/plain")
                .body(Self::text_line(event)),
            WebhookFormat::UrlParameterPost => self
                .client
                .post(url)
                .query(&[("message", Self::text_line(event))]),
            WebhookFormat::UrlParameterGet => self
                .client
                .get(url)
                .query(&[("message", Self::text_line(event))]),
        }
    }
}

#[async_trait]
impl AuditSink for WebhookSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "webhook_sink_store",
        skip(self, event),
        fields(sink = %self.name, category = %event.category)
    )]
    async fn store(&self, event: &AuditEvent) -> Result<(), AuditError> {
        let response = self
            .request(event)
            .send()
            .await
            .map_err(|e| AuditError::sink_connection(&self.name, e.to_string()))?;

        response
            .error_for_status()
            .map_err(|e| AuditError::sink_store(&self.name, e.to_string()))?;

        Ok(())
    }

    #[instrument(name = "webhook_sink_close", skip(self))]
    async fn close(&self) -> Result<(), AuditError> {
        debug!(sink = %self.name, "WebhookSink closed");
        Ok(())
    }
}
