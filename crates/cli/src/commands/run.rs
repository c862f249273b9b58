//! `run` command implementation.
//!
//! Starts the pipeline, consumes NDJSON audit events from a file or stdin,
//! and routes each one. Malformed lines are skipped with a warning; the
//! stream is best-effort end to end.

use anyhow::{Context, Result};
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{info, warn};

use contracts::AuditEvent;
use dispatcher::AuditPipeline;

use crate::cli::RunArgs;
use crate::error::CliError;

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.dry_run {
        info!(config = %args.config.display(), "Configuration valid, dry run requested");
        return Ok(());
    }

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let pipeline = AuditPipeline::start(&blueprint)
        .map_err(|e| CliError::pipeline_execution(e.to_string()))?;

    let reader = open_event_source(args).await?;
    let outcome = consume_events(&pipeline, reader, args).await;

    publish_stats(&pipeline);
    pipeline.close().await;

    let (processed, malformed) = outcome?;
    info!(processed, malformed, "Event stream finished");
    Ok(())
}

/// Open the NDJSON source: a file when given, stdin otherwise
async fn open_event_source(args: &RunArgs) -> Result<Box<dyn AsyncBufRead + Unpin + Send>> {
    match &args.events {
        Some(path) => {
            let file = File::open(path).await.map_err(|e| {
                CliError::event_source(path.display().to_string(), e.to_string())
            })?;
            info!(events = %path.display(), "Reading events from file");
            Ok(Box::new(BufReader::new(file)))
        }
        None => {
            info!("Reading events from stdin");
            Ok(Box::new(BufReader::new(tokio::io::stdin())))
        }
    }
}

/// Main consumption loop: route lines until EOF, interrupt, or max-events
async fn consume_events(
    pipeline: &AuditPipeline,
    reader: Box<dyn AsyncBufRead + Unpin + Send>,
    args: &RunArgs,
) -> Result<(u64, u64)> {
    let mut lines = reader.lines();
    let mut processed: u64 = 0;
    let mut malformed: u64 = 0;

    let mut stats_tick = interval(Duration::from_secs(args.stats_interval.max(1)));
    stats_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick fires immediately; swallow it
    stats_tick.tick().await;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        if line.trim().is_empty() {
                            continue;
                        }
                        match serde_json::from_str::<AuditEvent>(&line) {
                            Ok(event) => {
                                pipeline.route(event).await;
                                processed += 1;
                                if args.max_events != 0 && processed >= args.max_events {
                                    info!(max_events = args.max_events, "Event limit reached");
                                    break;
                                }
                            }
                            Err(e) => {
                                malformed += 1;
                                warn!(error = %e, "Malformed event line skipped");
                            }
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        warn!(error = %e, "Event source read failed");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupt received, shutting down");
                break;
            }
            _ = stats_tick.tick(), if args.stats_interval > 0 => {
                publish_stats(pipeline);
            }
        }
    }

    Ok((processed, malformed))
}

/// Push current pipeline counters to the metrics exporter
fn publish_stats(pipeline: &AuditPipeline) {
    let router = pipeline.router();

    observability::record_router_stats(
        router.metrics().routed_count(),
        router.metrics().filtered_count(),
    );

    let pool = router.pool();
    observability::record_queue_depth(pool.queue_len());
    observability::record_pool_stats(
        pool.metrics().submitted_count(),
        pool.metrics().rejected_count(),
    );

    for sink in router.current().graph().sinks() {
        let snapshot = sink.metrics().snapshot();
        observability::record_sink_stats(
            sink.name(),
            snapshot.stored_count,
            snapshot.failed_count,
            snapshot.fallback_count,
            snapshot.dropped_count,
        );
    }
}
