//! AuditRouter - pipeline entry point
//!
//! Classifies incoming events, selects the destination sink, and dispatches
//! directly or through the pool. Fire-and-forget: producers never observe
//! delivery failures or drops.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use tracing::{debug, error, instrument, warn};

use contracts::{AuditBlueprint, AuditCategory, AuditEvent, RouteRule};

use crate::error::DispatcherError;
use crate::factory::SinkGraph;
use crate::metrics::RouterMetrics;
use crate::pool::DispatchPool;
use crate::sink::Sink;

/// A routing rule compiled against a ready sink graph
struct CompiledRule {
    rule: RouteRule,
    target: Arc<Sink>,
}

/// Immutable routing state; replaced wholesale on reload
pub struct RouterState {
    graph: SinkGraph,
    rules: Vec<CompiledRule>,
    disabled: HashSet<AuditCategory>,
}

impl RouterState {
    /// Compile blueprint routing against a built sink graph
    ///
    /// Rules naming an unknown endpoint are dropped with an error log; events
    /// they would have matched fall through to later rules or the default.
    pub fn compile(blueprint: &AuditBlueprint, graph: SinkGraph) -> Self {
        let rules = blueprint
            .routing
            .rules
            .iter()
            .filter_map(|rule| match graph.get(&rule.endpoint) {
                Some(target) => Some(CompiledRule {
                    rule: rule.clone(),
                    target: Arc::clone(target),
                }),
                None => {
                    error!(
                        endpoint = %rule.endpoint,
                        "Routing rule targets unknown endpoint, rule dropped"
                    );
                    None
                }
            })
            .collect();

        let disabled = blueprint
            .routing
            .disabled_categories
            .iter()
            .copied()
            .collect();

        Self {
            graph,
            rules,
            disabled,
        }
    }

    /// The underlying sink graph
    pub fn graph(&self) -> &SinkGraph {
        &self.graph
    }

    /// First matching rule target, else the default sink
    fn select(&self, event: &AuditEvent) -> &Arc<Sink> {
        self.rules
            .iter()
            .find(|compiled| compiled.rule.matches(event))
            .map(|compiled| &compiled.target)
            .unwrap_or_else(|| self.graph.default_sink())
    }
}

/// The pipeline entry point shared by all producer tasks
pub struct AuditRouter {
    state: RwLock<Arc<RouterState>>,
    pool: Arc<DispatchPool>,
    metrics: Arc<RouterMetrics>,
}

impl AuditRouter {
    /// Create a router over an initial state and a running pool
    pub fn new(state: Arc<RouterState>, pool: Arc<DispatchPool>) -> Self {
        Self {
            state: RwLock::new(state),
            pool,
            metrics: Arc::new(RouterMetrics::new()),
        }
    }

    /// Current routing state
    pub fn current(&self) -> Arc<RouterState> {
        match self.state.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Atomically replace the routing state, returning the previous one
    ///
    /// In-flight deliveries keep their references into the old graph and
    /// finish against it.
    pub fn swap(&self, next: Arc<RouterState>) -> Arc<RouterState> {
        let mut guard = match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::replace(&mut *guard, next)
    }

    /// Router metrics
    pub fn metrics(&self) -> &Arc<RouterMetrics> {
        &self.metrics
    }

    /// Pool used for non-self-handling sinks
    pub fn pool(&self) -> &Arc<DispatchPool> {
        &self.pool
    }

    /// Route one event
    ///
    /// Disabled categories are dropped before any sink is consulted. Direct
    /// sinks deliver on the calling task; pooled sinks are enqueued, and a
    /// full queue triggers synchronous delivery to the sink's fallback.
    #[instrument(name = "router_route", skip(self, event), fields(category = %event.category))]
    pub async fn route(&self, event: AuditEvent) {
        let state = self.current();

        if state.disabled.contains(&event.category) {
            self.metrics.inc_filtered_count();
            debug!(category = %event.category, "Category disabled, event dropped");
            return;
        }

        let sink = Arc::clone(state.select(&event));
        self.metrics.inc_routed_count();

        if sink.handles_own_backpressure() {
            sink.deliver(&event).await;
            return;
        }

        let event = Arc::new(event);
        match self.pool.submit(Arc::clone(&sink), Arc::clone(&event)) {
            Ok(()) => {}
            Err(DispatcherError::QueueFull { depth, .. }) => {
                warn!(
                    sink = %sink.name(),
                    queue_depth = depth,
                    "Dispatch queue full, delivering to fallback"
                );
                self.deliver_to_fallback(&sink, &event).await;
            }
            Err(e) => {
                warn!(sink = %sink.name(), error = %e, "Submission failed, delivering to fallback");
                self.deliver_to_fallback(&sink, &event).await;
            }
        }
    }

    /// Overflow path: skip the overloaded sink, hand the event to its fallback
    async fn deliver_to_fallback(&self, sink: &Arc<Sink>, event: &AuditEvent) {
        match sink.fallback() {
            Some(fallback) => {
                sink.metrics().inc_fallback_count();
                fallback.deliver(event).await;
            }
            None => {
                sink.metrics().inc_dropped_count();
                error!(
                    sink = %sink.name(),
                    category = %event.category,
                    "No fallback configured, audit event dropped"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use contracts::{AuditError, AuditSink, DispatchMode, Origin, PoolConfig, SinkKind};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio::time::{sleep, Duration};

    struct CountingBackend {
        name: String,
        store_count: Arc<AtomicU64>,
        fail: bool,
        delay_ms: u64,
    }

    #[async_trait]
    impl AuditSink for CountingBackend {
        fn name(&self) -> &str {
            &self.name
        }

        async fn store(&self, _event: &AuditEvent) -> Result<(), AuditError> {
            if self.delay_ms > 0 {
                sleep(Duration::from_millis(self.delay_ms)).await;
            }
            if self.fail {
                return Err(AuditError::sink_store(&self.name, "backend down"));
            }
            self.store_count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct TestSink {
        sink: Arc<Sink>,
        store_count: Arc<AtomicU64>,
    }

    fn test_sink(
        name: &str,
        mode: DispatchMode,
        fail: bool,
        delay_ms: u64,
        fallback: Option<Arc<Sink>>,
    ) -> TestSink {
        let store_count = Arc::new(AtomicU64::new(0));
        let backend = CountingBackend {
            name: name.to_string(),
            store_count: Arc::clone(&store_count),
            fail,
            delay_ms,
        };
        TestSink {
            sink: Arc::new(Sink::new(
                name,
                SinkKind::Noop,
                mode,
                Box::new(backend),
                fallback,
            )),
            store_count,
        }
    }

    /// Build a RouterState around explicit sinks without going through the factory
    fn state_with(
        sinks: Vec<Arc<Sink>>,
        default: Arc<Sink>,
        rules: Vec<RouteRule>,
        disabled: Vec<AuditCategory>,
    ) -> Arc<RouterState> {
        // Compile manually: the factory path is covered by its own tests
        let compiled = rules
            .into_iter()
            .map(|rule| {
                let target = sinks
                    .iter()
                    .find(|s| s.name() == rule.endpoint)
                    .cloned()
                    .unwrap_or_else(|| Arc::clone(&default));
                CompiledRule { rule, target }
            })
            .collect();

        let mut map = HashMap::new();
        for sink in sinks {
            map.insert(sink.name().to_string(), sink);
        }
        let graph = SinkGraph::from_parts(map, default);

        Arc::new(RouterState {
            graph,
            rules: compiled,
            disabled: disabled.into_iter().collect(),
        })
    }

    fn router(state: Arc<RouterState>, pool_config: PoolConfig) -> AuditRouter {
        AuditRouter::new(state, Arc::new(DispatchPool::new(&pool_config)))
    }

    fn small_pool() -> PoolConfig {
        PoolConfig {
            worker_count: 1,
            max_queue_depth: 4,
            shutdown_grace_ms: 1000,
        }
    }

    fn event(category: AuditCategory) -> AuditEvent {
        AuditEvent::new(category, Origin::Rest)
    }

    #[tokio::test]
    async fn test_disabled_category_never_reaches_a_sink() {
        let target = test_sink("t", DispatchMode::Direct, false, 0, None);
        let state = state_with(
            vec![Arc::clone(&target.sink)],
            Arc::clone(&target.sink),
            vec![],
            vec![AuditCategory::Authenticated],
        );
        let router = router(state, small_pool());

        router.route(event(AuditCategory::Authenticated)).await;

        assert_eq!(target.store_count.load(Ordering::SeqCst), 0);
        assert_eq!(router.metrics().filtered_count(), 1);
        assert_eq!(router.metrics().routed_count(), 0);
    }

    #[tokio::test]
    async fn test_direct_sink_delivers_on_calling_task() {
        let target = test_sink("direct", DispatchMode::Direct, false, 0, None);
        let state = state_with(
            vec![Arc::clone(&target.sink)],
            Arc::clone(&target.sink),
            vec![],
            vec![],
        );
        let router = router(state, small_pool());

        router.route(event(AuditCategory::FailedLogin)).await;

        // Counted before route returns: no pool hop happened
        assert_eq!(target.store_count.load(Ordering::SeqCst), 1);
        assert_eq!(router.pool().metrics().submitted_count(), 0);
    }

    #[tokio::test]
    async fn test_rule_routes_to_matching_sink() {
        let security = test_sink("security", DispatchMode::Direct, false, 0, None);
        let fallback_default = test_sink("default", DispatchMode::Direct, false, 0, None);
        let state = state_with(
            vec![Arc::clone(&security.sink), Arc::clone(&fallback_default.sink)],
            Arc::clone(&fallback_default.sink),
            vec![RouteRule {
                categories: vec![AuditCategory::FailedLogin],
                compliance: None,
                tenant: None,
                endpoint: "security".to_string(),
            }],
            vec![],
        );
        let router = router(state, small_pool());

        router.route(event(AuditCategory::FailedLogin)).await;
        router.route(event(AuditCategory::IndexWrite)).await;

        assert_eq!(security.store_count.load(Ordering::SeqCst), 1);
        assert_eq!(fallback_default.store_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_pooled_sink_goes_through_pool() {
        let target = test_sink("pooled", DispatchMode::Pooled, false, 0, None);
        let state = state_with(
            vec![Arc::clone(&target.sink)],
            Arc::clone(&target.sink),
            vec![],
            vec![],
        );
        let router = router(state, small_pool());

        router.route(event(AuditCategory::IndexWrite)).await;
        assert_eq!(router.pool().metrics().submitted_count(), 1);

        router.pool().shutdown().await;
        assert_eq!(target.store_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_overflow_delivers_to_fallback_synchronously() {
        let fallback = test_sink("fb", DispatchMode::Direct, false, 0, None);
        let slow = test_sink(
            "slow",
            DispatchMode::Pooled,
            false,
            5_000,
            Some(Arc::clone(&fallback.sink)),
        );
        let state = state_with(
            vec![Arc::clone(&slow.sink), Arc::clone(&fallback.sink)],
            Arc::clone(&slow.sink),
            vec![],
            vec![],
        );
        let router = router(
            state,
            PoolConfig {
                worker_count: 1,
                max_queue_depth: 1,
                shutdown_grace_ms: 100,
            },
        );

        // First occupies the worker, second fills the queue
        router.route(event(AuditCategory::IndexWrite)).await;
        sleep(Duration::from_millis(50)).await;
        router.route(event(AuditCategory::IndexWrite)).await;

        // Third overflows and must land at the fallback before route returns
        router.route(event(AuditCategory::IndexWrite)).await;

        assert_eq!(fallback.store_count.load(Ordering::SeqCst), 1);
        assert_eq!(router.pool().metrics().rejected_count(), 1);
        router.pool().shutdown().await;
    }

    #[tokio::test]
    async fn test_overflow_without_fallback_drops() {
        let slow = test_sink("slow", DispatchMode::Pooled, false, 5_000, None);
        let state = state_with(
            vec![Arc::clone(&slow.sink)],
            Arc::clone(&slow.sink),
            vec![],
            vec![],
        );
        let router = router(
            state,
            PoolConfig {
                worker_count: 1,
                max_queue_depth: 1,
                shutdown_grace_ms: 100,
            },
        );

        router.route(event(AuditCategory::IndexWrite)).await;
        sleep(Duration::from_millis(50)).await;
        router.route(event(AuditCategory::IndexWrite)).await;
        router.route(event(AuditCategory::IndexWrite)).await;

        assert_eq!(slow.sink.metrics().dropped_count(), 1);
        router.pool().shutdown().await;
    }

    #[tokio::test]
    async fn test_swap_replaces_routing_state() {
        let old = test_sink("old", DispatchMode::Direct, false, 0, None);
        let new = test_sink("new", DispatchMode::Direct, false, 0, None);

        let router = router(
            state_with(
                vec![Arc::clone(&old.sink)],
                Arc::clone(&old.sink),
                vec![],
                vec![],
            ),
            small_pool(),
        );

        router.route(event(AuditCategory::FailedLogin)).await;

        router.swap(state_with(
            vec![Arc::clone(&new.sink)],
            Arc::clone(&new.sink),
            vec![],
            vec![],
        ));

        router.route(event(AuditCategory::FailedLogin)).await;

        assert_eq!(old.store_count.load(Ordering::SeqCst), 1);
        assert_eq!(new.store_count.load(Ordering::SeqCst), 1);
    }
}
