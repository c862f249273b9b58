//! NoopSink - accepts and discards every event

use async_trait::async_trait;
use contracts::{AuditError, AuditEvent, AuditSink};

/// Sink that discards events; used to disable a route without rewiring it
pub struct NoopSink {
    name: String,
}

impl NoopSink {
    /// Create a new NoopSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl AuditSink for NoopSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn store(&self, _event: &AuditEvent) -> Result<(), AuditError> {
        Ok(())
    }
}
