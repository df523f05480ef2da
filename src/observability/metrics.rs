//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dispatch_total` (counter): dispatches by mode and outcome
//! - `dispatch_chain_length` (histogram): filters per executed chain
//! - `registry_components` (gauge): registered handlers and filters
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Outcome labels come from `DispatchError::kind`

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::dispatch::DispatcherType;

/// Start the Prometheus scrape endpoint. Needs a running tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_dispatch(mode: DispatcherType, outcome: &'static str) {
    metrics::counter!("dispatch_total", "mode" => mode.as_str(), "outcome" => outcome).increment(1);
}

pub fn record_chain_length(len: usize) {
    metrics::histogram!("dispatch_chain_length").record(len as f64);
}

pub fn record_registry_size(kind: &'static str, count: usize) {
    metrics::gauge!("registry_components", "kind" => kind).set(count as f64);
}
