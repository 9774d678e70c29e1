//! # CT Telemetry
//!
//! Logging and metrics for the confidential telemetry ledger.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ct_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CT_SERVICE_NAME` | `ct-ledger` | Service name attached to logs |
//! | `CT_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `CT_JSON_LOGS` | `false` | JSON formatted logs |
//! | `CT_CONSOLE_OUTPUT` | `true` | Emit logs to stdout |
//!
//! Plaintext readings must never reach a log line; only counts, ids and
//! alert kinds are recorded.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{encode_metrics, register_metrics, MetricsHandle};

use thiserror::Error;

/// Telemetry initialization errors.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Subscriber could not be installed (usually already installed).
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// Metric registration or encoding failed.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Initialize logging and metrics together.
///
/// The returned guard should be held for the lifetime of the process.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = register_metrics()?;
    init_logging(&config)?;

    tracing::info!(service = %config.service_name, "Telemetry initialized");

    Ok(TelemetryGuard { _metrics: metrics })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}

/// Log a period-scoped event with the standard fields.
///
/// ```rust,ignore
/// log_period_event!(info, period_id, "Period started", end = end);
/// ```
#[macro_export]
macro_rules! log_period_event {
    ($level:ident, $period_id:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = "ct-ledger",
            period_id = $period_id,
            $($($field)*,)?
            $msg
        )
    };
}
