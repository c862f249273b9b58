//! DebugSink - logs the full serialized event via tracing
//!
//! Terminal last-resort sink; also substituted for endpoints that fail
//! resolution so the router always has a destination.

use async_trait::async_trait;
use contracts::{AuditError, AuditEvent, AuditSink};
use tracing::{debug, instrument};

/// Sink that logs complete events for debugging
pub struct DebugSink {
    name: String,
}

impl DebugSink {
    /// Create a new DebugSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl AuditSink for DebugSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "debug_sink_store", skip(self, event), fields(sink = %self.name))]
    async fn store(&self, event: &AuditEvent) -> Result<(), AuditError> {
        let body = serde_json::to_string(event)
            .unwrap_or_else(|e| format!("unserializable audit event: {e}"));
        debug!(sink = %self.name, category = %event.category, event = %body, "Audit event");
        Ok(())
    }
}
