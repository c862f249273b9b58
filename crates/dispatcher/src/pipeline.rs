//! AuditPipeline - lifecycle facade over pool, factory, and router
//!
//! `start` builds the pool and the first sink graph; `reload` swaps the graph
//! atomically while the pool keeps running; `close` drains the pool and closes
//! every backend. Pool sizing is fixed for the life of the process.

use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

use contracts::{AuditBlueprint, AuditEvent};

use crate::error::DispatcherError;
use crate::factory::SinkFactory;
use crate::pool::DispatchPool;
use crate::router::{AuditRouter, RouterState};

/// Running audit delivery pipeline
pub struct AuditPipeline {
    router: Arc<AuditRouter>,
    pool: Arc<DispatchPool>,
}

impl AuditPipeline {
    /// Build and start the pipeline from a blueprint
    #[instrument(name = "pipeline_start", skip(blueprint))]
    pub fn start(blueprint: &AuditBlueprint) -> Result<Self, DispatcherError> {
        blueprint.pool.validate().map_err(|e| {
            DispatcherError::Contract(contracts::AuditError::config_validation(
                "pool",
                e.to_string(),
            ))
        })?;

        let pool = Arc::new(DispatchPool::new(&blueprint.pool));
        let graph = SinkFactory::build(blueprint);
        let state = Arc::new(RouterState::compile(blueprint, graph));
        let router = Arc::new(AuditRouter::new(state, Arc::clone(&pool)));

        info!("Audit pipeline started");

        Ok(Self { router, pool })
    }

    /// Shared router handle for producers
    pub fn router(&self) -> &Arc<AuditRouter> {
        &self.router
    }

    /// Route one event (convenience delegate)
    pub async fn route(&self, event: AuditEvent) {
        self.router.route(event).await;
    }

    /// Rebuild the sink graph from new configuration and swap it in atomically
    ///
    /// In-flight deliveries finish against the old graph through the
    /// references they already hold. Pool sizing changes are ignored here;
    /// they require a restart.
    #[instrument(name = "pipeline_reload", skip(self, blueprint))]
    pub fn reload(&self, blueprint: &AuditBlueprint) {
        let graph = SinkFactory::build(blueprint);
        let state = Arc::new(RouterState::compile(blueprint, graph));
        self.router.swap(state);
        info!("Sink graph reloaded");
    }

    /// Drain the pool within its grace period, then close all backends
    #[instrument(name = "pipeline_close", skip(self))]
    pub async fn close(self) {
        self.pool.shutdown().await;
        self.router.current().graph().close_all().await;
        info!("Audit pipeline closed");
    }
}
