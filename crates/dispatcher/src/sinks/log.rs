//! StructuredLogSink - one structured tracing record per event
//!
//! The write is an in-process log append, so this sink handles its own
//! backpressure and is invoked directly on the producer's task.

use async_trait::async_trait;
use contracts::{AuditError, AuditEvent, AuditSink};
use tracing::{info, instrument};

/// Sink that emits audit events to the structured log
pub struct StructuredLogSink {
    name: String,
}

impl StructuredLogSink {
    /// Create a new StructuredLogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_event(&self, event: &AuditEvent) {
        info!(
            sink = %self.name,
            category = %event.category,
            origin = %event.origin,
            timestamp = %event.timestamp.to_rfc3339(),
            effective_user = event.effective_user.as_deref().unwrap_or("-"),
            remote_address = event.remote_address.as_deref().unwrap_or("-"),
            request_type = event.request_type.as_deref().unwrap_or("-"),
            tenant = event.tenant.as_deref().unwrap_or("-"),
            compliance = event.compliance,
            "Audit event"
        );
    }
}

#[async_trait]
impl AuditSink for StructuredLogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "log_sink_store", skip(self, event), fields(sink = %self.name))]
    async fn store(&self, event: &AuditEvent) -> Result<(), AuditError> {
        self.log_event(event);
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&self) -> Result<(), AuditError> {
        info!(sink = %self.name, "StructuredLogSink closed");
        Ok(())
    }
}
