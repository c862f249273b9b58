//! AuditSink trait - backend delivery interface
//!
//! Defines the abstract interface for backend adapters.

use async_trait::async_trait;

use crate::{AuditError, AuditEvent};

/// Backend delivery trait
///
/// All backend adapters must implement this trait. Adapters are shared across
/// pool workers, so `store` takes `&self`; internal state must be synchronized
/// by the adapter.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Adapter name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Deliver one event to the backend
    ///
    /// # Errors
    /// Returns a backend-reported failure; the dispatcher treats any error as
    /// a trigger for fallback delegation, never as a producer-visible fault.
    async fn store(&self, event: &AuditEvent) -> Result<(), AuditError>;

    /// Release backend resources
    async fn close(&self) -> Result<(), AuditError> {
        Ok(())
    }
}
