//! Prometheus metrics for the confidential telemetry ledger.
//!
//! All metrics follow the naming convention: `ct_ledger_<metric>_<unit>`.
//! None of them carry per-reporter labels.

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Gauge, Opts, Registry, TextEncoder};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Readings accepted into the encrypted store
    pub static ref READINGS_SUBMITTED: Counter = Counter::new(
        "ct_ledger_readings_submitted_total",
        "Total number of readings accepted into the encrypted store"
    ).expect("metric creation failed");

    /// Threshold alerts raised at submission time
    pub static ref ALERTS_RAISED: CounterVec = CounterVec::new(
        Opts::new("ct_ledger_alerts_raised_total", "Threshold alerts raised at submission"),
        &["kind"]
    ).expect("metric creation failed");

    /// Periods opened
    pub static ref PERIODS_STARTED: Counter = Counter::new(
        "ct_ledger_periods_started_total",
        "Total number of reporting periods opened"
    ).expect("metric creation failed");

    /// Decryption requests issued to the oracle
    pub static ref SUMMARIES_REQUESTED: Counter = Counter::new(
        "ct_ledger_summaries_requested_total",
        "Total number of aggregate decryption requests issued"
    ).expect("metric creation failed");

    /// Periods whose summary was finalized
    pub static ref SUMMARIES_FINALIZED: Counter = Counter::new(
        "ct_ledger_summaries_finalized_total",
        "Total number of periods finalized with an aggregate summary"
    ).expect("metric creation failed");

    /// Oracle callbacks rejected by proof verification
    pub static ref PROOF_FAILURES: Counter = Counter::new(
        "ct_ledger_proof_failures_total",
        "Total number of decryption callbacks rejected by proof verification"
    ).expect("metric creation failed");

    /// Rejected operations by error kind
    pub static ref OPERATIONS_REJECTED: CounterVec = CounterVec::new(
        Opts::new("ct_ledger_operations_rejected_total", "Rejected operations by error kind"),
        &["kind"]
    ).expect("metric creation failed");

    /// Outstanding decryption requests
    pub static ref PENDING_AGGREGATIONS: Gauge = Gauge::new(
        "ct_ledger_pending_aggregations",
        "Number of decryption requests awaiting an oracle callback"
    ).expect("metric creation failed");
}

/// Handle for the registered metrics
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(READINGS_SUBMITTED.clone()),
        Box::new(ALERTS_RAISED.clone()),
        Box::new(PERIODS_STARTED.clone()),
        Box::new(SUMMARIES_REQUESTED.clone()),
        Box::new(SUMMARIES_FINALIZED.clone()),
        Box::new(PROOF_FAILURES.clone()),
        Box::new(OPERATIONS_REJECTED.clone()),
        Box::new(PENDING_AGGREGATIONS.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
