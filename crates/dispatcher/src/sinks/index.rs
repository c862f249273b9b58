//! InternalIndexSink - appends events to a local dated index file
//!
//! One JSON line per event, written to `<base_path>/<index>-YYYY.MM.DD.ndjson`.
//! The date suffix follows the daily index rollover convention of the audit
//! index this sink feeds.

use async_trait::async_trait;
use chrono::Utc;
use contracts::{AuditError, AuditEvent, AuditSink};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, instrument};

/// Configuration for InternalIndexSink
#[derive(Debug, Clone)]
pub struct IndexSinkConfig {
    /// Base output directory
    pub base_path: PathBuf,
    /// Index name prefix
    pub index: String,
}

impl IndexSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let base_path = params
            .get("base_path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./auditlog"));
        let index = params
            .get("index")
            .cloned()
            .unwrap_or_else(|| "auditlog".to_string());

        Self { base_path, index }
    }
}

/// Sink that appends events to local index files
pub struct InternalIndexSink {
    name: String,
    config: IndexSinkConfig,
    // Serializes appends so concurrent pool workers never interleave lines
    write_lock: Mutex<()>,
}

impl InternalIndexSink {
    /// Create a new InternalIndexSink
    pub fn new(name: impl Into<String>, config: IndexSinkConfig) -> std::io::Result<Self> {
        fs::create_dir_all(&config.base_path)?;

        Ok(Self {
            name: name.into(),
            config,
            write_lock: Mutex::new(()),
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        let config = IndexSinkConfig::from_params(params);
        Self::new(name, config)
    }

    /// File receiving events today
    fn current_index_path(&self) -> PathBuf {
        let date = Utc::now().format("%Y.%m.%d");
        self.config
            .base_path
            .join(format!("{}-{}.ndjson", self.config.index, date))
    }

    fn append_line(&self, line: &str) -> std::io::Result<()> {
        let path = self.current_index_path();
        let _guard = match self.write_lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;
        Ok(())
    }
}

#[async_trait]
impl AuditSink for InternalIndexSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "index_sink_store",
        skip(self, event),
        fields(sink = %self.name, category = %event.category)
    )]
    async fn store(&self, event: &AuditEvent) -> Result<(), AuditError> {
        let line = serde_json::to_string(event)
            .map_err(|e| AuditError::sink_store(&self.name, e.to_string()))?;
        self.append_line(&line)
            .map_err(|e| AuditError::sink_store(&self.name, e.to_string()))?;
        Ok(())
    }

    #[instrument(name = "index_sink_close", skip(self))]
    async fn close(&self) -> Result<(), AuditError> {
        debug!(sink = %self.name, "InternalIndexSink closed");
        Ok(())
    }
}
