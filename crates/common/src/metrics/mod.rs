//! Metrics and observability utilities
//!
//! Prometheus metric descriptions and recording helpers with standardized naming.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all Papershelf metrics
pub const METRICS_PREFIX: &str = "papershelf";

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Ingestion metrics
    describe_counter!(
        format!("{}_ingestions_total", METRICS_PREFIX),
        Unit::Count,
        "Ingestion attempts by outcome"
    );

    describe_histogram!(
        format!("{}_ingestion_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Time from hashing to catalog write"
    );

    // Watcher metrics
    describe_counter!(
        format!("{}_watcher_events_total", METRICS_PREFIX),
        Unit::Count,
        "PDF files handed to the ingestion queue"
    );

    describe_gauge!(
        format!("{}_queue_depth", METRICS_PREFIX),
        Unit::Count,
        "Files waiting in the ingestion queue"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Outcome label for an ingestion attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcomeLabel {
    Ingested,
    Duplicate,
    Failed,
}

impl IngestOutcomeLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestOutcomeLabel::Ingested => "ingested",
            IngestOutcomeLabel::Duplicate => "duplicate",
            IngestOutcomeLabel::Failed => "failed",
        }
    }
}

/// Helper to record ingestion metrics
pub fn record_ingestion(outcome: IngestOutcomeLabel, duration_secs: f64) {
    counter!(
        format!("{}_ingestions_total", METRICS_PREFIX),
        "outcome" => outcome.as_str()
    )
    .increment(1);

    if outcome == IngestOutcomeLabel::Ingested {
        histogram!(format!("{}_ingestion_duration_seconds", METRICS_PREFIX)).record(duration_secs);
    }
}

/// Helper to record a file entering the ingestion queue
pub fn record_enqueued(source: &'static str) {
    counter!(
        format!("{}_watcher_events_total", METRICS_PREFIX),
        "source" => source
    )
    .increment(1);
}

/// Helper to publish the current queue depth
pub fn set_queue_depth(depth: usize) {
    gauge!(format!("{}_queue_depth", METRICS_PREFIX)).set(depth as f64);
}
