//! DispatchPool - bounded worker pool for pooled sink deliveries
//!
//! A fixed worker set consumes delivery tasks from one bounded queue shared by
//! all pooled sinks. Submission never blocks the producer: a full queue is an
//! immediate, synchronous rejection the router turns into fallback delivery.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::timeout_at;
use tracing::{debug, error, info, instrument, warn};

use contracts::{AuditEvent, PoolConfig};

use crate::error::DispatcherError;
use crate::metrics::PoolMetrics;
use crate::sink::Sink;

/// One queued delivery
struct DeliveryTask {
    sink: Arc<Sink>,
    event: Arc<AuditEvent>,
}

/// Bounded asynchronous dispatch pool
pub struct DispatchPool {
    /// Task queue entry
    tx: async_channel::Sender<DeliveryTask>,
    /// Worker task handles, taken out on shutdown
    workers: Mutex<Vec<JoinHandle<()>>>,
    /// Shared metrics
    metrics: Arc<PoolMetrics>,
    /// Shutdown grace period (applied to each of the two waits)
    grace: Duration,
}

impl DispatchPool {
    /// Create the pool and spawn its workers
    pub fn new(config: &PoolConfig) -> Self {
        let (tx, rx) = async_channel::bounded(config.max_queue_depth);
        let metrics = Arc::new(PoolMetrics::new());

        let workers = (0..config.worker_count)
            .map(|id| {
                let rx = rx.clone();
                let metrics = Arc::clone(&metrics);
                tokio::spawn(async move {
                    pool_worker(id, rx, metrics).await;
                })
            })
            .collect();

        info!(
            workers = config.worker_count,
            max_queue_depth = config.max_queue_depth,
            "Dispatch pool started"
        );

        Self {
            tx,
            workers: Mutex::new(workers),
            metrics,
            grace: Duration::from_millis(config.shutdown_grace_ms),
        }
    }

    /// Enqueue a delivery task (non-blocking)
    ///
    /// # Errors
    /// [`DispatcherError::QueueFull`] when the queue is at capacity; the
    /// caller delivers to the sink's fallback on the calling task instead.
    /// [`DispatcherError::PoolClosed`] once shutdown has begun.
    pub fn submit(&self, sink: Arc<Sink>, event: Arc<AuditEvent>) -> Result<(), DispatcherError> {
        match self.tx.try_send(DeliveryTask { sink, event }) {
            Ok(()) => {
                self.metrics.inc_submitted_count();
                self.metrics.set_queue_len(self.tx.len());
                Ok(())
            }
            Err(async_channel::TrySendError::Full(task)) => {
                self.metrics.inc_rejected_count();
                Err(DispatcherError::QueueFull {
                    sink_name: task.sink.name().to_string(),
                    depth: self.tx.len(),
                })
            }
            Err(async_channel::TrySendError::Closed(_)) => Err(DispatcherError::PoolClosed),
        }
    }

    /// Current queue length
    pub fn queue_len(&self) -> usize {
        self.tx.len()
    }

    /// Shared metrics
    pub fn metrics(&self) -> &Arc<PoolMetrics> {
        &self.metrics
    }

    /// Drain and stop the pool
    ///
    /// Stops accepting new tasks, waits up to the grace period for queued and
    /// in-flight deliveries, then aborts the workers and waits once more.
    /// Shutdown proceeds regardless of stragglers; it must never hang the
    /// host process.
    #[instrument(name = "dispatch_pool_shutdown", skip(self))]
    pub async fn shutdown(&self) {
        self.tx.close();

        let mut workers = match self.workers.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };
        if workers.is_empty() {
            return;
        }

        info!(queued = self.tx.len(), "Dispatch pool draining");

        if join_all(&mut workers, self.grace).await {
            debug!("Dispatch pool drained");
            return;
        }

        warn!(
            grace_ms = self.grace.as_millis() as u64,
            remaining = self.tx.len(),
            "Grace period expired, cancelling remaining deliveries"
        );
        for worker in &workers {
            worker.abort();
        }

        if !join_all(&mut workers, self.grace).await {
            error!("Pool workers still running after cancellation, proceeding with shutdown");
        }
    }
}

/// Await worker handles until done or the deadline passes
///
/// Completed handles are popped so a later call never polls a finished handle.
async fn join_all(workers: &mut Vec<JoinHandle<()>>, grace: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + grace;
    while let Some(handle) = workers.last_mut() {
        match timeout_at(deadline, handle).await {
            Ok(result) => {
                if let Err(e) = result {
                    if e.is_panic() {
                        error!(error = ?e, "Pool worker panicked");
                    }
                }
                workers.pop();
            }
            Err(_) => return false,
        }
    }
    true
}

/// Worker task consuming delivery tasks until the queue is closed and drained
async fn pool_worker(
    id: usize,
    rx: async_channel::Receiver<DeliveryTask>,
    metrics: Arc<PoolMetrics>,
) {
    debug!(worker = id, "Pool worker started");

    while let Ok(task) = rx.recv().await {
        metrics.set_queue_len(rx.len());
        // Outcome handling (fallback, drop logging) lives in Sink::deliver
        task.sink.deliver(&task.event).await;
    }

    debug!(worker = id, "Pool worker stopped");
}
