//! Process-local counters for the probe itself.
//!
//! These are separate from the delivery measurements written to the
//! time-series store: they describe how the monitor is behaving (markers
//! emitted, searches failing, store writes rejected). When an exporter
//! address is configured they are served in Prometheus text format.

use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::OnceCell;
use std::net::SocketAddr;
use tracing::info;

static EXPORTER_ADDR: OnceCell<SocketAddr> = OnceCell::new();

/// Install the Prometheus recorder with an HTTP listener on `addr`.
/// Must be called from within a Tokio runtime.
pub fn init(addr: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    if EXPORTER_ADDR.get().is_some() {
        return Ok(());
    }
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus recorder: {}", e))?;
    EXPORTER_ADDR.set(addr).ok();
    info!(%addr, "Metrics exporter listening");
    Ok(())
}

pub fn exporter_addr() -> Option<SocketAddr> {
    EXPORTER_ADDR.get().copied()
}

pub mod markers {
    use crate::types::Channel;

    pub fn emitted(channel: Channel) {
        ::metrics::counter!("log_monitor_markers_emitted_total", "channel" => channel.label())
            .increment(1);
    }

    pub fn resolved(channel: Channel, successful: bool, drift_secs: f64) {
        let outcome = if successful { "success" } else { "failure" };
        ::metrics::counter!(
            "log_monitor_markers_resolved_total",
            "channel" => channel.label(),
            "outcome" => outcome
        )
        .increment(1);
        ::metrics::histogram!("log_monitor_drift_seconds", "channel" => channel.label())
            .record(drift_secs);
    }
}

pub mod search {
    pub fn error() {
        ::metrics::counter!("log_monitor_search_errors_total").increment(1);
    }

    pub fn malformed() {
        ::metrics::counter!("log_monitor_search_malformed_total").increment(1);
    }

    pub fn events_fetched(count: usize) {
        ::metrics::histogram!("log_monitor_search_events").record(count as f64);
    }
}

pub mod store {
    pub fn write_error() {
        ::metrics::counter!("log_monitor_store_write_errors_total").increment(1);
    }
}

pub mod responder {
    pub fn request() {
        ::metrics::counter!("log_monitor_responder_requests_total").increment(1);
    }
}
