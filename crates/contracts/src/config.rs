//! AuditBlueprint - Config Loader output
//!
//! Describes the complete delivery configuration: endpoints, routing rules,
//! dispatch pool sizing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

use crate::{AuditCategory, AuditEvent};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete delivery configuration blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Declared delivery endpoints
    pub endpoints: Vec<EndpointConfig>,

    /// Event routing configuration
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Dispatch pool sizing
    #[serde(default)]
    pub pool: PoolConfig,
}

/// One declared delivery endpoint
///
/// `kind` stays a plain string here: resolving it against the closed backend
/// registry happens at sink-construction time, so an unknown kind degrades to
/// the debug sink instead of failing the whole configuration load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Unique endpoint name
    pub name: String,

    /// Backend kind name (e.g. "debug", "log", "internal_index", "webhook")
    pub kind: String,

    /// Dispatch strategy; defaults per backend kind when omitted
    #[serde(default)]
    pub mode: Option<DispatchMode>,

    /// Backend-specific settings
    #[serde(default)]
    pub params: HashMap<String, String>,

    /// Name of the endpoint consulted when this one fails
    #[serde(default)]
    pub fallback: Option<String>,
}

/// Dispatch strategy for a sink
///
/// `Direct` sinks are invoked synchronously on the producer's task and handle
/// their own backpressure; `Pooled` sinks go through the bounded dispatch pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    Direct,
    Pooled,
}

/// Closed registry of built-in backend kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Debug,
    Noop,
    StructuredLog,
    InternalIndex,
    ExternalIndex,
    Webhook,
}

impl SinkKind {
    /// Resolve a configured kind name; `None` means the name is unknown and
    /// the endpoint must be substituted
    pub fn resolve(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "noop" => Some(Self::Noop),
            "log" => Some(Self::StructuredLog),
            "internal_index" => Some(Self::InternalIndex),
            "external_index" => Some(Self::ExternalIndex),
            "webhook" => Some(Self::Webhook),
            _ => None,
        }
    }

    /// Dispatch strategy used when the endpoint does not declare one
    ///
    /// Log-backed kinds are cheap or already asynchronous and skip the pool.
    pub fn default_mode(&self) -> DispatchMode {
        match self {
            Self::Debug | Self::Noop | Self::StructuredLog => DispatchMode::Direct,
            Self::InternalIndex | Self::ExternalIndex | Self::Webhook => DispatchMode::Pooled,
        }
    }
}

/// Event routing configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Endpoint receiving unmatched events; defaults to the first declared
    #[serde(default)]
    pub default_endpoint: Option<String>,

    /// Categories dropped before any sink is consulted
    #[serde(default)]
    pub disabled_categories: Vec<AuditCategory>,

    /// Ordered routing rules; first match wins
    #[serde(default)]
    pub rules: Vec<RouteRule>,
}

/// Predicate-to-endpoint mapping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRule {
    /// Matching categories; empty matches any
    #[serde(default)]
    pub categories: Vec<AuditCategory>,

    /// Required compliance flag; `None` matches either
    #[serde(default)]
    pub compliance: Option<bool>,

    /// Required tenant; `None` matches any
    #[serde(default)]
    pub tenant: Option<String>,

    /// Target endpoint name
    pub endpoint: String,
}

impl RouteRule {
    /// Evaluate this rule against an event
    pub fn matches(&self, event: &AuditEvent) -> bool {
        if !self.categories.is_empty() && !self.categories.contains(&event.category) {
            return false;
        }
        if let Some(compliance) = self.compliance {
            if compliance != event.compliance {
                return false;
            }
        }
        if let Some(tenant) = self.tenant.as_deref() {
            if event.tenant.as_deref() != Some(tenant) {
                return false;
            }
        }
        true
    }
}

/// Dispatch pool sizing
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PoolConfig {
    /// Number of pool workers
    #[serde(default = "default_worker_count")]
    #[validate(range(min = 1, max = 256))]
    pub worker_count: usize,

    /// Bounded task queue depth; a full queue rejects submissions synchronously
    #[serde(default = "default_max_queue_depth")]
    #[validate(range(min = 1))]
    pub max_queue_depth: usize,

    /// Grace period for draining queued deliveries on shutdown
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
}

fn default_worker_count() -> usize {
    10
}

fn default_max_queue_depth() -> usize {
    100_000
}

fn default_shutdown_grace_ms() -> u64 {
    10_000
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            max_queue_depth: default_max_queue_depth(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
        }
    }
}
