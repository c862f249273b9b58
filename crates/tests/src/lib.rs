//! # Integration Tests
//!
//! End-to-end tests for the audit delivery pipeline.
//!
//! Covers:
//! - Config -> factory -> router -> sink flows against real backends
//! - Fallback-chain ordering and exhaustion
//! - Pool capacity rejection and shutdown draining
//! - Hot reload of the sink graph

#[cfg(test)]
mod support {
    use async_trait::async_trait;
    use contracts::{AuditError, AuditEvent, AuditSink, DispatchMode, SinkKind};
    use dispatcher::Sink;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};
    use std::thread::ThreadId;
    use tokio::time::{sleep, Duration};

    /// Test backend with scripted failures, optional delay, and
    /// thread-identity capture
    pub struct ProbeBackend {
        name: String,
        pub store_count: Arc<AtomicU64>,
        pub last_thread: Arc<Mutex<Option<ThreadId>>>,
        fail_first: u64,
        delay_ms: u64,
    }

    impl ProbeBackend {
        pub fn new(name: &str, fail_first: u64, delay_ms: u64) -> Self {
            Self {
                name: name.to_string(),
                store_count: Arc::new(AtomicU64::new(0)),
                last_thread: Arc::new(Mutex::new(None)),
                fail_first,
                delay_ms,
            }
        }
    }

    #[async_trait]
    impl AuditSink for ProbeBackend {
        fn name(&self) -> &str {
            &self.name
        }

        async fn store(&self, _event: &AuditEvent) -> Result<(), AuditError> {
            if self.delay_ms > 0 {
                sleep(Duration::from_millis(self.delay_ms)).await;
            }
            let seen = self.store_count.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut guard) = self.last_thread.lock() {
                *guard = Some(std::thread::current().id());
            }
            if seen < self.fail_first {
                return Err(AuditError::sink_store(&self.name, "probe failure"));
            }
            Ok(())
        }
    }

    /// Probe sink plus handles to its counters
    pub struct Probe {
        pub sink: Arc<Sink>,
        pub store_count: Arc<AtomicU64>,
        pub last_thread: Arc<Mutex<Option<ThreadId>>>,
    }

    pub fn probe(
        name: &str,
        mode: DispatchMode,
        fail_first: u64,
        delay_ms: u64,
        fallback: Option<Arc<Sink>>,
    ) -> Probe {
        let backend = ProbeBackend::new(name, fail_first, delay_ms);
        let store_count = Arc::clone(&backend.store_count);
        let last_thread = Arc::clone(&backend.last_thread);
        Probe {
            sink: Arc::new(Sink::new(
                name,
                SinkKind::Noop,
                mode,
                Box::new(backend),
                fallback,
            )),
            store_count,
            last_thread,
        }
    }
}

#[cfg(test)]
mod scenario_tests {
    use super::support::probe;
    use contracts::{
        AuditBlueprint, AuditCategory, AuditEvent, DispatchMode, Origin, PoolConfig, RoutingConfig,
    };
    use dispatcher::{AuditRouter, DispatchPool, RouterState, SinkGraph};
    use std::collections::HashMap;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use tokio::time::{sleep, Duration};

    fn routing_blueprint(routing: RoutingConfig) -> AuditBlueprint {
        AuditBlueprint {
            version: Default::default(),
            endpoints: vec![],
            routing,
            pool: PoolConfig::default(),
        }
    }

    fn router_over(
        sinks: Vec<Arc<dispatcher::Sink>>,
        default: Arc<dispatcher::Sink>,
        routing: RoutingConfig,
        pool: PoolConfig,
    ) -> AuditRouter {
        let mut map = HashMap::new();
        for sink in sinks {
            map.insert(sink.name().to_string(), sink);
        }
        let graph = SinkGraph::from_parts(map, default);
        let state = Arc::new(RouterState::compile(&routing_blueprint(routing), graph));
        AuditRouter::new(state, Arc::new(DispatchPool::new(&pool)))
    }

    fn event(category: AuditCategory) -> AuditEvent {
        AuditEvent::new(category, Origin::Rest).with_effective_user("worf")
    }

    /// sinkA(fails) -> sinkB(fails) -> sinkC(succeeds) as default: one event of
    /// category FAILED_LOGIN visits each sink exactly once, in order.
    #[tokio::test]
    async fn test_failing_chain_reaches_terminal_sink_once_each() {
        let c = probe("sink_c", DispatchMode::Direct, 0, 0, None);
        let b = probe(
            "sink_b",
            DispatchMode::Direct,
            u64::MAX,
            0,
            Some(Arc::clone(&c.sink)),
        );
        let a = probe(
            "sink_a",
            DispatchMode::Direct,
            u64::MAX,
            0,
            Some(Arc::clone(&b.sink)),
        );

        let router = router_over(
            vec![
                Arc::clone(&a.sink),
                Arc::clone(&b.sink),
                Arc::clone(&c.sink),
            ],
            Arc::clone(&a.sink),
            RoutingConfig::default(),
            PoolConfig::default(),
        );

        router.route(event(AuditCategory::FailedLogin)).await;

        assert_eq!(a.store_count.load(Ordering::SeqCst), 1);
        assert_eq!(b.store_count.load(Ordering::SeqCst), 1);
        assert_eq!(c.store_count.load(Ordering::SeqCst), 1);
        assert_eq!(c.sink.metrics().stored_count(), 1);
        router.pool().shutdown().await;
    }

    /// Disabled categories are filtered before any sink is consulted.
    #[tokio::test]
    async fn test_disabled_category_invokes_no_sink() {
        let target = probe("only", DispatchMode::Direct, 0, 0, None);
        let router = router_over(
            vec![Arc::clone(&target.sink)],
            Arc::clone(&target.sink),
            RoutingConfig {
                default_endpoint: None,
                disabled_categories: vec![
                    AuditCategory::Authenticated,
                    AuditCategory::GrantedPrivileges,
                ],
                rules: vec![],
            },
            PoolConfig::default(),
        );

        router.route(event(AuditCategory::Authenticated)).await;
        router.route(event(AuditCategory::GrantedPrivileges)).await;
        router.route(event(AuditCategory::FailedLogin)).await;

        assert_eq!(target.store_count.load(Ordering::SeqCst), 1);
        assert_eq!(router.metrics().filtered_count(), 2);
        router.pool().shutdown().await;
    }

    /// Direct sinks deliver on the calling thread.
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_direct_sink_runs_on_calling_thread() {
        let target = probe("direct", DispatchMode::Direct, 0, 0, None);
        let router = router_over(
            vec![Arc::clone(&target.sink)],
            Arc::clone(&target.sink),
            RoutingConfig::default(),
            PoolConfig::default(),
        );

        let caller = std::thread::current().id();
        router.route(event(AuditCategory::SslException)).await;

        let seen = target.last_thread.lock().unwrap().take();
        assert_eq!(seen, Some(caller));
        router.pool().shutdown().await;
    }

    /// workerCount=1, maxQueueDepth=1: the third long-running delivery is
    /// rejected synchronously and lands at the sink's declared fallback.
    #[tokio::test]
    async fn test_pool_capacity_rejection_hits_fallback() {
        let terminal = probe("terminal", DispatchMode::Direct, 0, 0, None);
        let slow = probe(
            "slow",
            DispatchMode::Pooled,
            0,
            2_000,
            Some(Arc::clone(&terminal.sink)),
        );

        let router = router_over(
            vec![Arc::clone(&slow.sink), Arc::clone(&terminal.sink)],
            Arc::clone(&slow.sink),
            RoutingConfig::default(),
            PoolConfig {
                worker_count: 1,
                max_queue_depth: 1,
                shutdown_grace_ms: 100,
            },
        );

        router.route(event(AuditCategory::IndexWrite)).await;
        sleep(Duration::from_millis(50)).await;
        router.route(event(AuditCategory::IndexWrite)).await;

        // Queue and worker are both busy now; this one overflows
        router.route(event(AuditCategory::IndexWrite)).await;

        assert_eq!(terminal.store_count.load(Ordering::SeqCst), 1);
        assert_eq!(router.pool().metrics().rejected_count(), 1);
        router.pool().shutdown().await;
    }

    /// Shutdown with a sufficient grace period completes all queued deliveries.
    #[tokio::test]
    async fn test_shutdown_completes_queued_deliveries() {
        let target = probe("pooled", DispatchMode::Pooled, 0, 20, None);
        let router = router_over(
            vec![Arc::clone(&target.sink)],
            Arc::clone(&target.sink),
            RoutingConfig::default(),
            PoolConfig {
                worker_count: 2,
                max_queue_depth: 64,
                shutdown_grace_ms: 5_000,
            },
        );

        for _ in 0..10 {
            router.route(event(AuditCategory::IndexWrite)).await;
        }

        router.pool().shutdown().await;
        assert_eq!(target.store_count.load(Ordering::SeqCst), 10);
    }

    /// Routing rules select sinks by category and compliance flag.
    #[tokio::test]
    async fn test_rules_route_by_category_and_compliance() {
        let compliance = probe("compliance", DispatchMode::Direct, 0, 0, None);
        let security = probe("security", DispatchMode::Direct, 0, 0, None);
        let default = probe("default", DispatchMode::Direct, 0, 0, None);

        let router = router_over(
            vec![
                Arc::clone(&compliance.sink),
                Arc::clone(&security.sink),
                Arc::clone(&default.sink),
            ],
            Arc::clone(&default.sink),
            RoutingConfig {
                default_endpoint: None,
                disabled_categories: vec![],
                rules: vec![
                    contracts::RouteRule {
                        categories: vec![],
                        compliance: Some(true),
                        tenant: None,
                        endpoint: "compliance".to_string(),
                    },
                    contracts::RouteRule {
                        categories: vec![
                            AuditCategory::FailedLogin,
                            AuditCategory::MissingPrivileges,
                        ],
                        compliance: None,
                        tenant: None,
                        endpoint: "security".to_string(),
                    },
                ],
            },
            PoolConfig::default(),
        );

        router.route(event(AuditCategory::ComplianceDocRead)).await;
        router.route(event(AuditCategory::FailedLogin)).await;
        router.route(event(AuditCategory::IndexWrite)).await;

        assert_eq!(compliance.store_count.load(Ordering::SeqCst), 1);
        assert_eq!(security.store_count.load(Ordering::SeqCst), 1);
        assert_eq!(default.store_count.load(Ordering::SeqCst), 1);
        router.pool().shutdown().await;
    }
}

#[cfg(test)]
mod e2e_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{AuditCategory, AuditEvent, Origin};
    use dispatcher::AuditPipeline;
    use tempfile::tempdir;

    fn index_config(base_path: &str) -> String {
        format!(
            r#"
[[endpoints]]
name = "audit_index"
kind = "internal_index"
fallback = "local_debug"

[endpoints.params]
base_path = "{base_path}"
index = "auditlog"

[[endpoints]]
name = "local_debug"
kind = "debug"

[routing]
default_endpoint = "audit_index"
disabled_categories = ["AUTHENTICATED"]

[pool]
worker_count = 2
max_queue_depth = 32
shutdown_grace_ms = 2000
"#
        )
    }

    /// Full flow: TOML config -> factory -> router -> pooled index sink ->
    /// NDJSON lines on disk.
    #[tokio::test]
    async fn test_e2e_config_to_index_file() {
        let dir = tempdir().unwrap();
        let config = index_config(&dir.path().display().to_string());
        let blueprint = ConfigLoader::load_from_str(&config, ConfigFormat::Toml).unwrap();

        let pipeline = AuditPipeline::start(&blueprint).unwrap();

        pipeline
            .route(
                AuditEvent::new(AuditCategory::FailedLogin, Origin::Rest)
                    .with_effective_user("quark")
                    .with_remote_address("198.51.100.7:443"),
            )
            .await;
        pipeline
            .route(AuditEvent::new(AuditCategory::MissingPrivileges, Origin::Transport))
            .await;
        // Filtered, must not reach the index
        pipeline
            .route(AuditEvent::new(AuditCategory::Authenticated, Origin::Rest))
            .await;

        pipeline.close().await;

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        let content = std::fs::read_to_string(entries[0].as_ref().unwrap().path()).unwrap();
        assert_eq!(content.lines().count(), 2);

        let first: AuditEvent = serde_json::from_str(content.lines().next().unwrap()).unwrap();
        assert!(matches!(
            first.category,
            AuditCategory::FailedLogin | AuditCategory::MissingPrivileges
        ));
    }

    /// Reload swaps the sink graph atomically; events route to the new graph
    /// afterwards.
    #[tokio::test]
    async fn test_e2e_reload_swaps_index_directory() {
        let dir_a = tempdir().unwrap();
        let dir_b = tempdir().unwrap();

        let blueprint_a = ConfigLoader::load_from_str(
            &index_config(&dir_a.path().display().to_string()),
            ConfigFormat::Toml,
        )
        .unwrap();
        let blueprint_b = ConfigLoader::load_from_str(
            &index_config(&dir_b.path().display().to_string()),
            ConfigFormat::Toml,
        )
        .unwrap();

        let pipeline = AuditPipeline::start(&blueprint_a).unwrap();
        pipeline
            .route(AuditEvent::new(AuditCategory::IndexWrite, Origin::Transport))
            .await;

        pipeline.reload(&blueprint_b);
        pipeline
            .route(AuditEvent::new(AuditCategory::IndexWrite, Origin::Transport))
            .await;

        pipeline.close().await;

        let count_lines = |dir: &std::path::Path| -> usize {
            std::fs::read_dir(dir)
                .unwrap()
                .map(|e| std::fs::read_to_string(e.unwrap().path()).unwrap())
                .map(|c| c.lines().count())
                .sum()
        };
        assert_eq!(count_lines(dir_a.path()), 1);
        assert_eq!(count_lines(dir_b.path()), 1);
    }

    /// An unknown backend kind degrades to the debug sink; the pipeline still
    /// starts and routes without error.
    #[tokio::test]
    async fn test_e2e_unknown_kind_still_starts() {
        let config = r#"
[[endpoints]]
name = "custom"
kind = "com.example.FancySink"
"#;
        let blueprint = ConfigLoader::load_from_str(config, ConfigFormat::Toml).unwrap();
        let pipeline = AuditPipeline::start(&blueprint).unwrap();

        pipeline
            .route(AuditEvent::new(AuditCategory::BadHeaders, Origin::Rest))
            .await;

        assert_eq!(pipeline.router().metrics().routed_count(), 1);
        pipeline.close().await;
    }
}
