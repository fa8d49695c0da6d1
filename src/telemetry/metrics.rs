//! Prometheus metrics

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on the given port
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics exporter: {}", e))?;

    tracing::info!(port, "Prometheus metrics exporter listening");
    Ok(())
}

/// Count one started fetch cycle
pub fn record_cycle() {
    counter!("perpgap_cycles_total").increment(1);
}

/// Count one cycle that ended in an error
pub fn record_cycle_error() {
    counter!("perpgap_cycle_errors_total").increment(1);
}

/// Count one ticker handed to storage
pub fn record_ticker_stored(exchange: &str) {
    counter!("perpgap_tickers_stored_total", "exchange" => exchange.to_string()).increment(1);
}

/// Count one gap report produced
pub fn record_gap_report() {
    counter!("perpgap_gap_reports_total").increment(1);
}

/// Track how many common pairs discovery found
pub fn set_common_pairs(count: usize) {
    gauge!("perpgap_common_pairs").set(count as f64);
}
