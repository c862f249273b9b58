//! # Dispatcher
//!
//! Audit-event delivery core.
//!
//! Responsibilities:
//! - Wrap backend adapters into fallback-chained [`Sink`]s
//! - Execute pooled deliveries off the producer task with bounded queueing
//! - Route events to sinks by category/compliance/tenant rules
//! - Build the sink graph from declarative configuration

pub mod error;
pub mod factory;
pub mod metrics;
pub mod pipeline;
pub mod pool;
pub mod router;
pub mod sink;
pub mod sinks;

pub use contracts::{AuditEvent, AuditSink};
pub use error::DispatcherError;
pub use factory::{SinkFactory, SinkGraph};
pub use metrics::{MetricsSnapshot, PoolMetrics, RouterMetrics, SinkMetrics};
pub use pipeline::AuditPipeline;
pub use pool::DispatchPool;
pub use router::{AuditRouter, RouterState};
pub use sink::Sink;
pub use sinks::{
    DebugSink, ExternalIndexSink, InternalIndexSink, NoopSink, StructuredLogSink, WebhookFormat,
    WebhookSink,
};
