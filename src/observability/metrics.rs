//! Metrics collection.
//!
//! # Metrics
//! - `recoverlog_records_total` (counter): records handed to a sink, by level
//! - `recoverlog_recovered_panics_total` (counter): panics absorbed by a
//!   recovery boundary, by kind (`checked`, `unexpected`)

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

use crate::facade::level::Level;

pub fn record_log(level: Level) {
    ::metrics::counter!("recoverlog_records_total", "level" => level.as_str()).increment(1);
}

pub fn record_recovered(checked: bool) {
    let kind = if checked { "checked" } else { "unexpected" };
    ::metrics::counter!("recoverlog_recovered_panics_total", "kind" => kind).increment(1);
}

/// Install the Prometheus recorder for the whole process.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}
