// src/metrics.rs
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

#[derive(Clone)]
pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the process-wide Prometheus recorder (first call) and describe
    /// the digest series. Later calls share the same handle.
    pub fn init() -> Self {
        static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();
        let handle = HANDLE
            .get_or_init(|| {
                let handle = match PrometheusBuilder::new().install_recorder() {
                    Ok(h) => h,
                    Err(e) => {
                        // Another recorder owns the process; expose an empty one.
                        tracing::warn!(error = %e, "prometheus recorder not installed");
                        PrometheusBuilder::new().build_recorder().handle()
                    }
                };
                describe();
                handle
            })
            .clone();
        Self { handle }
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

fn describe() {
    describe_counter!("digest_runs_total", "Digest runs by outcome.");
    describe_counter!(
        "digest_sources_failed_total",
        "Sources skipped because a fetch failed."
    );
    describe_counter!(
        "digest_items_summarized_total",
        "Items that went through the summarizer."
    );
    describe_counter!(
        "digest_retries_total",
        "Backoff retries of outbound calls, by operation."
    );
    describe_counter!(
        "digest_summary_fallback_total",
        "Summaries replaced by the placeholder, by reason."
    );
    describe_gauge!("digest_last_run_ts", "Unix ts when a digest run last finished.");
}
