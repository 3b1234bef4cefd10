use std::sync::OnceLock;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus exporter and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload.
///
/// The recorder is process-global, so later calls return the first handle.
pub fn init_metrics() -> PrometheusHandle {
    HANDLE
        .get_or_init(|| {
            let handle = match PrometheusBuilder::new().install_recorder() {
                Ok(handle) => handle,
                Err(e) => {
                    // Another recorder already owns the process; keep a detached one.
                    tracing::warn!(error = %e, "Prometheus recorder not installed");
                    PrometheusBuilder::new().build_recorder().handle()
                }
            };

            // Pre-register counters so they appear even before the first increment.
            counter!("portfolio_scans_total").absolute(0);
            counter!("analyses_total").absolute(0);
            counter!("ai_fallbacks_total").absolute(0);
            counter!("upstream_failures_total").absolute(0);
            counter!("strategies_published_total").absolute(0);

            // Histogram is lazily created on first record; force creation.
            histogram!("analysis_latency_seconds").record(0.0);

            handle
        })
        .clone()
}
