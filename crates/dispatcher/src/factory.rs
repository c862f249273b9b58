//! SinkFactory - builds the sink graph from declarative configuration
//!
//! Fallbacks are constructed depth-first so a sink's fallback always exists
//! before the sink itself. Any resolution failure (unknown backend kind,
//! dangling fallback reference, backend construction error) substitutes the
//! built-in debug sink so the router always has a terminal destination; the
//! process starts regardless.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use contracts::{AuditBlueprint, DispatchMode, EndpointConfig, SinkKind};

use crate::error::DispatcherError;
use crate::sink::Sink;
use crate::sinks::{
    DebugSink, ExternalIndexSink, InternalIndexSink, NoopSink, StructuredLogSink, WebhookSink,
};

/// Immutable, shareable set of ready sinks plus the designated default
pub struct SinkGraph {
    sinks: HashMap<String, Arc<Sink>>,
    default: Arc<Sink>,
}

impl SinkGraph {
    /// Create a graph from explicit parts (for testing)
    pub fn from_parts(sinks: HashMap<String, Arc<Sink>>, default: Arc<Sink>) -> Self {
        Self { sinks, default }
    }

    /// Look up a sink by endpoint name
    pub fn get(&self, name: &str) -> Option<&Arc<Sink>> {
        self.sinks.get(name)
    }

    /// The sink receiving unmatched events
    pub fn default_sink(&self) -> &Arc<Sink> {
        &self.default
    }

    /// All named sinks
    pub fn sinks(&self) -> impl Iterator<Item = &Arc<Sink>> {
        self.sinks.values()
    }

    /// Close every backend in the graph
    pub async fn close_all(&self) {
        for sink in self.sinks.values() {
            sink.close().await;
        }
        // The default may be a substitute that is not part of the named set
        if !self.sinks.contains_key(self.default.name()) {
            self.default.close().await;
        }
    }
}

impl std::fmt::Debug for SinkGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkGraph")
            .field("sinks", &self.sinks.keys().collect::<Vec<_>>())
            .field("default", &self.default.name())
            .finish()
    }
}

/// Sink graph builder
pub struct SinkFactory;

impl SinkFactory {
    /// Build the complete sink graph from a blueprint
    #[instrument(
        name = "sink_factory_build",
        skip(blueprint),
        fields(endpoint_count = blueprint.endpoints.len())
    )]
    pub fn build(blueprint: &AuditBlueprint) -> SinkGraph {
        let by_name: HashMap<&str, &EndpointConfig> = blueprint
            .endpoints
            .iter()
            .map(|e| (e.name.as_str(), e))
            .collect();

        let mut sinks: HashMap<String, Arc<Sink>> = HashMap::new();
        let mut in_progress: HashSet<String> = HashSet::new();

        for endpoint in &blueprint.endpoints {
            Self::build_endpoint(&endpoint.name, &by_name, &mut sinks, &mut in_progress);
        }

        let default = Self::designate_default(blueprint, &sinks);

        info!(
            sinks = sinks.len(),
            default = default.name(),
            "Sink graph ready"
        );

        SinkGraph { sinks, default }
    }

    /// Build one endpoint, constructing its fallback chain first
    fn build_endpoint(
        name: &str,
        by_name: &HashMap<&str, &EndpointConfig>,
        sinks: &mut HashMap<String, Arc<Sink>>,
        in_progress: &mut HashSet<String>,
    ) -> Arc<Sink> {
        if let Some(ready) = sinks.get(name) {
            return Arc::clone(ready);
        }

        let Some(endpoint) = by_name.get(name) else {
            error!(
                endpoint = %name,
                "Fallback references undeclared endpoint, substituting debug sink"
            );
            return Self::substitute(name);
        };

        // The loader rejects cycles; this guards direct factory callers
        if !in_progress.insert(name.to_string()) {
            error!(
                endpoint = %name,
                "Fallback cycle detected during construction, substituting debug sink"
            );
            return Self::substitute(name);
        }

        let fallback = endpoint
            .fallback
            .as_deref()
            .map(|fb| Self::build_endpoint(fb, by_name, sinks, in_progress));

        let sink = match Self::construct(endpoint, fallback) {
            Ok(sink) => Arc::new(sink),
            Err(e) => {
                error!(
                    endpoint = %name,
                    error = %e,
                    "Endpoint resolution failed, substituting debug sink"
                );
                Self::substitute(name)
            }
        };

        in_progress.remove(name);
        sinks.insert(name.to_string(), Arc::clone(&sink));
        sink
    }

    /// Resolve the backend kind and construct the wrapped sink
    fn construct(
        endpoint: &EndpointConfig,
        fallback: Option<Arc<Sink>>,
    ) -> Result<Sink, DispatcherError> {
        let kind = SinkKind::resolve(&endpoint.kind).ok_or_else(|| {
            DispatcherError::sink_creation(
                &endpoint.name,
                format!("unknown backend kind '{}'", endpoint.kind),
            )
        })?;

        let backend: Box<dyn contracts::AuditSink> = match kind {
            SinkKind::Debug => Box::new(DebugSink::new(&endpoint.name)),
            SinkKind::Noop => Box::new(NoopSink::new(&endpoint.name)),
            SinkKind::StructuredLog => Box::new(StructuredLogSink::new(&endpoint.name)),
            SinkKind::InternalIndex => Box::new(
                InternalIndexSink::from_params(&endpoint.name, &endpoint.params)
                    .map_err(|e| DispatcherError::sink_creation(&endpoint.name, e.to_string()))?,
            ),
            SinkKind::ExternalIndex => Box::new(
                ExternalIndexSink::from_params(&endpoint.name, &endpoint.params)
                    .map_err(|e| DispatcherError::sink_creation(&endpoint.name, e.to_string()))?,
            ),
            SinkKind::Webhook => Box::new(
                WebhookSink::from_params(&endpoint.name, &endpoint.params)
                    .map_err(|e| DispatcherError::sink_creation(&endpoint.name, e.to_string()))?,
            ),
        };

        let mode = endpoint.mode.unwrap_or_else(|| kind.default_mode());

        Ok(Sink::new(&endpoint.name, kind, mode, backend, fallback))
    }

    /// Built-in terminal substitute for anything that failed resolution
    fn substitute(name: &str) -> Arc<Sink> {
        Arc::new(Sink::new(
            name,
            SinkKind::Debug,
            DispatchMode::Direct,
            Box::new(DebugSink::new(name)),
            None,
        ))
    }

    /// Pick the default sink: the named endpoint, else the first declared,
    /// else a bare debug sink
    fn designate_default(
        blueprint: &AuditBlueprint,
        sinks: &HashMap<String, Arc<Sink>>,
    ) -> Arc<Sink> {
        if let Some(name) = blueprint.routing.default_endpoint.as_deref() {
            if let Some(sink) = sinks.get(name) {
                return Arc::clone(sink);
            }
            warn!(
                endpoint = %name,
                "Default endpoint not found, substituting debug sink"
            );
            return Self::substitute(name);
        }

        if let Some(first) = blueprint.endpoints.first() {
            if let Some(sink) = sinks.get(&first.name) {
                return Arc::clone(sink);
            }
        }

        warn!("No endpoints declared, default is the debug sink");
        Self::substitute("default")
    }
}
