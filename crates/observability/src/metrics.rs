//! Pipeline metric publication
//!
//! Thin helpers translating dispatcher snapshots into exported metrics.
//! Callers (the CLI stats loop) publish absolute values periodically.

use metrics::gauge;

/// Publish the dispatch pool queue depth
pub fn record_queue_depth(depth: usize) {
    gauge!("audit_dispatch_queue_depth").set(depth as f64);
}

/// Publish router entry-point totals
pub fn record_router_stats(routed: u64, filtered: u64) {
    gauge!("audit_events_routed_total").set(routed as f64);
    gauge!("audit_events_filtered_total").set(filtered as f64);
}

/// Publish pool submission totals
pub fn record_pool_stats(submitted: u64, rejected: u64) {
    gauge!("audit_pool_submitted_total").set(submitted as f64);
    gauge!("audit_pool_rejected_total").set(rejected as f64);
}

/// Publish per-sink delivery totals
pub fn record_sink_stats(sink: &str, stored: u64, failed: u64, fallback: u64, dropped: u64) {
    gauge!("audit_sink_stored_total", "sink" => sink.to_string()).set(stored as f64);
    gauge!("audit_sink_failed_total", "sink" => sink.to_string()).set(failed as f64);
    gauge!("audit_sink_fallback_total", "sink" => sink.to_string()).set(fallback as f64);
    gauge!("audit_sink_dropped_total", "sink" => sink.to_string()).set(dropped as f64);
}
