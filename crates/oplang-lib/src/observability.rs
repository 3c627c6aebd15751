//! Observability infrastructure for the adapter
//!
//! Provides:
//! - Prometheus metrics (execute latency, statements and failures per request kind,
//!   frames and events emitted)
//! - Structured logging with tracing

use std::fmt;
use std::sync::OnceLock;

use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Histogram, IntCounter,
    IntCounterVec,
};
use tracing::{info, warn};

/// Histogram buckets for execute round trips (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
];

/// Which orchestrator issued a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Query,
    Variable,
    Annotation,
    Health,
    Symbols,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Query => "query",
            RequestKind::Variable => "variable",
            RequestKind::Annotation => "annotation",
            RequestKind::Health => "health",
            RequestKind::Symbols => "symbols",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<AdapterMetricsInner> = OnceLock::new();

struct AdapterMetricsInner {
    execute_latency_seconds: Histogram,
    statements_total: IntCounterVec,
    request_errors_total: IntCounterVec,
    frames_emitted: IntCounter,
    events_emitted: IntCounter,
}

impl AdapterMetricsInner {
    fn new() -> Self {
        Self {
            execute_latency_seconds: register_histogram!(
                "oplang_execute_latency_seconds",
                "Round trip time of /v1/execute requests",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register execute_latency_seconds"),

            statements_total: register_int_counter_vec!(
                "oplang_statements_total",
                "Statements executed, by request kind",
                &["kind"]
            )
            .expect("Failed to register statements_total"),

            request_errors_total: register_int_counter_vec!(
                "oplang_request_errors_total",
                "Failed data source requests, by request kind",
                &["kind"]
            )
            .expect("Failed to register request_errors_total"),

            frames_emitted: register_int_counter!(
                "oplang_frames_emitted_total",
                "Frames returned to the host"
            )
            .expect("Failed to register frames_emitted"),

            events_emitted: register_int_counter!(
                "oplang_events_emitted_total",
                "Annotation events returned to the host"
            )
            .expect("Failed to register events_emitted"),
        }
    }
}

/// Handle to the process-wide adapter metrics
///
/// Clones share the same underlying collectors.
#[derive(Clone)]
pub struct AdapterMetrics {
    _private: (),
}

impl Default for AdapterMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl AdapterMetrics {
    /// Create a new metrics handle (registers the collectors on first call)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(AdapterMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &AdapterMetricsInner {
        GLOBAL_METRICS.get_or_init(AdapterMetricsInner::new)
    }

    pub fn observe_execute_latency(&self, duration_secs: f64) {
        self.inner().execute_latency_seconds.observe(duration_secs);
    }

    pub fn inc_statements(&self, kind: RequestKind, count: u64) {
        self.inner()
            .statements_total
            .with_label_values(&[kind.as_str()])
            .inc_by(count);
    }

    pub fn inc_request_errors(&self, kind: RequestKind) {
        self.inner()
            .request_errors_total
            .with_label_values(&[kind.as_str()])
            .inc();
    }

    pub fn add_frames(&self, count: usize) {
        self.inner().frames_emitted.inc_by(count as u64);
    }

    pub fn add_events(&self, count: usize) {
        self.inner().events_emitted.inc_by(count as u64);
    }
}

/// Structured logger for data source events
#[derive(Clone)]
pub struct StructuredLogger {
    datasource: String,
}

impl StructuredLogger {
    pub fn new(datasource: impl Into<String>) -> Self {
        Self {
            datasource: datasource.into(),
        }
    }

    /// Log a completed time-series query
    pub fn log_query(&self, targets: usize, frames: usize, elapsed_ms: u128) {
        info!(
            event = "query_completed",
            datasource = %self.datasource,
            targets = targets,
            frames = frames,
            elapsed_ms = elapsed_ms as u64,
            "Query completed"
        );
    }

    /// Log a variable lookup
    pub fn log_variable_query(&self, statement: &str, values: usize) {
        info!(
            event = "variable_query_completed",
            datasource = %self.datasource,
            statement = %statement,
            values = values,
            "Variable query completed"
        );
    }

    /// Log an annotation query
    pub fn log_annotations(&self, statement: &str, events: usize) {
        info!(
            event = "annotation_query_completed",
            datasource = %self.datasource,
            statement = %statement,
            events = events,
            "Annotation query completed"
        );
    }

    /// Log a failed request of any kind
    pub fn log_failure(&self, kind: RequestKind, error: &dyn std::error::Error) {
        warn!(
            event = "request_failed",
            datasource = %self.datasource,
            kind = %kind,
            error = %error,
            "Data source request failed"
        );
    }

    /// Log the outcome of a connectivity check
    pub fn log_health_check(&self, healthy: bool, message: &str) {
        if healthy {
            info!(
                event = "health_check",
                datasource = %self.datasource,
                healthy = true,
                "Backend reachable"
            );
        } else {
            warn!(
                event = "health_check",
                datasource = %self.datasource,
                healthy = false,
                message = %message,
                "Backend health check failed"
            );
        }
    }

    /// Log service startup
    pub fn log_startup(&self, version: &str, backend_url: &str) {
        info!(
            event = "gateway_started",
            datasource = %self.datasource,
            version = %version,
            backend_url = %backend_url,
            "OpLang gateway started"
        );
    }

    /// Log service shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "gateway_shutdown",
            datasource = %self.datasource,
            reason = %reason,
            "OpLang gateway shutting down"
        );
    }
}
