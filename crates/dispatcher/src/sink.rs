//! Sink - backend wrapper with fallback chaining
//!
//! Wraps a backend adapter with the shared delivery contract: dispatch-mode
//! declaration, failure-to-fallback delegation, per-sink metrics.

use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

use contracts::{AuditEvent, AuditSink, DispatchMode, SinkKind};

use crate::metrics::SinkMetrics;

/// A named delivery target with an optional fallback sink
///
/// The fallback pointer is wired once at construction and never mutated; the
/// graph is acyclic by construction (fallbacks are built before the sinks that
/// reference them).
pub struct Sink {
    /// Endpoint name
    name: String,
    /// Resolved backend kind (Debug when substituted)
    kind: SinkKind,
    /// Dispatch strategy
    mode: DispatchMode,
    /// Backend adapter
    backend: Box<dyn AuditSink>,
    /// Next sink consulted on failure
    fallback: Option<Arc<Sink>>,
    /// Shared metrics
    metrics: Arc<SinkMetrics>,
}

impl Sink {
    /// Create a new Sink wrapping a backend adapter
    pub fn new(
        name: impl Into<String>,
        kind: SinkKind,
        mode: DispatchMode,
        backend: Box<dyn AuditSink>,
        fallback: Option<Arc<Sink>>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            mode,
            backend,
            fallback,
            metrics: Arc::new(SinkMetrics::new()),
        }
    }

    /// Endpoint name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolved backend kind
    pub fn kind(&self) -> SinkKind {
        self.kind
    }

    /// Dispatch strategy
    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    /// Whether this sink is invoked on the producer's task instead of the pool
    pub fn handles_own_backpressure(&self) -> bool {
        self.mode == DispatchMode::Direct
    }

    /// Fallback sink, if any
    pub fn fallback(&self) -> Option<&Arc<Sink>> {
        self.fallback.as_ref()
    }

    /// Current metrics
    pub fn metrics(&self) -> &Arc<SinkMetrics> {
        &self.metrics
    }

    /// Deliver an event, delegating along the fallback chain on failure
    ///
    /// The whole chain runs on the calling task; a backend failure steps to
    /// the next sink immediately, with no further queueing. Returns `true`
    /// once any sink in the chain accepts the event, `false` when the chain
    /// is exhausted (the event is dropped and logged, never surfaced to the
    /// producer).
    #[instrument(name = "sink_deliver", skip(self, event), fields(sink = %self.name))]
    pub async fn deliver(&self, event: &AuditEvent) -> bool {
        let mut current: &Sink = self;
        loop {
            if current.store_once(event).await {
                return true;
            }
            match current.fallback.as_deref() {
                Some(next) => {
                    current.metrics.inc_fallback_count();
                    debug!(
                        sink = %current.name,
                        fallback = %next.name,
                        "Delegating to fallback sink"
                    );
                    current = next;
                }
                None => {
                    current.metrics.inc_dropped_count();
                    error!(
                        sink = %current.name,
                        category = %event.category,
                        "Fallback chain exhausted, audit event dropped"
                    );
                    return false;
                }
            }
        }
    }

    /// Single store attempt against this sink's backend, no delegation
    async fn store_once(&self, event: &AuditEvent) -> bool {
        match self.backend.store(event).await {
            Ok(()) => {
                self.metrics.inc_stored_count();
                true
            }
            Err(e) => {
                self.metrics.inc_failed_count();
                warn!(
                    sink = %self.name,
                    category = %event.category,
                    error = %e,
                    "Backend store failed"
                );
                false
            }
        }
    }

    /// Close this sink's backend (fallback sinks are closed by the graph owner)
    pub async fn close(&self) {
        if let Err(e) = self.backend.close().await {
            error!(sink = %self.name, error = %e, "Close failed");
        }
    }
}

impl std::fmt::Debug for Sink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sink")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("mode", &self.mode)
            .field("fallback", &self.fallback.as_ref().map(|s| s.name()))
            .finish()
    }
}
