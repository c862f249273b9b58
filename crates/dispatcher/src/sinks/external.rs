//! ExternalIndexSink - ships events to a remote index over HTTP
//!
//! Each event becomes one document POSTed to the remote server under a dated
//! index, mirroring the rollover naming of the internal index sink.

use async_trait::async_trait;
use chrono::Utc;
use contracts::{AuditError, AuditEvent, AuditSink};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

/// Configuration for ExternalIndexSink
#[derive(Debug, Clone)]
pub struct ExternalIndexConfig {
    /// Remote server base URL
    pub server: String,
    /// Index name prefix
    pub index: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ExternalIndexConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let server = params
            .get("server")
            .ok_or_else(|| "missing 'server' parameter".to_string())?
            .trim_end_matches('/')
            .to_string();

        let index = params
            .get("index")
            .cloned()
            .unwrap_or_else(|| "auditlog".to_string());

        let timeout_ms = params
            .get("timeout_ms")
            .and_then(|s| s.parse().ok())
            .unwrap_or(5000);

        Ok(Self {
            server,
            index,
            timeout: Duration::from_millis(timeout_ms),
        })
    }
}

/// Sink that delivers events to a remote audit index
pub struct ExternalIndexSink {
    name: String,
    config: ExternalIndexConfig,
    client: reqwest::Client,
}

impl ExternalIndexSink {
    /// Create a new ExternalIndexSink
    pub fn new(name: impl Into<String>, config: ExternalIndexConfig) -> Result<Self, AuditError> {
        let name = name.into();
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AuditError::sink_connection(&name, e.to_string()))?;

        debug!(sink = %name, server = %config.server, "ExternalIndexSink ready");

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
        let config = ExternalIndexConfig::from_params(params)
            .map_err(|e| AuditError::sink_connection(&name, e))?;
        Self::new(name, config)
    }

    fn document_url(&self) -> String {
        let date = Utc::now().format("%Y.%m.%d");
        format!("{}/{}-{}/_doc", self.config.server, self.config.index, date)
    }
}

#[async_trait]
impl AuditSink for ExternalIndexSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "external_index_store",
        skip(self, event),
        fields(sink = %self.name, category = %event.category)
    )]
    async fn store(&self, event: &AuditEvent) -> Result<(), AuditError> {
        let url = self.document_url();
        let response = self
            .client
            .post(&url)
            .json(event)
            .send()
            .await
            .map_err(|e| AuditError::sink_connection(&self.name, e.to_string()))?;

        response
            .error_for_status()
            .map_err(|e| AuditError::sink_store(&self.name, e.to_string()))?;

        Ok(())
    }

    #[instrument(name = "external_index_close", skip(self))]
    async fn close(&self) -> Result<(), AuditError> {
        debug!(sink = %self.name, "ExternalIndexSink closed");
        Ok(())
    }
}
