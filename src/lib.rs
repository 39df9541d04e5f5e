// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod aggregate;
pub mod api;
pub mod config;
pub mod deliver;
pub mod metrics;
pub mod pipeline;
pub mod render;
pub mod retry;
pub mod runtime;
pub mod source;
pub mod summarize;
pub mod throttle;
pub mod types;

#[cfg(test)]
mod testing;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, router, AppState, CronAuth};
pub use crate::pipeline::{run_and_deliver, DigestPipeline, PipelineError, RunReport};
pub use crate::types::{DigestRun, DigestSection, Item, Reply, SourceResult, SummarizedItem};

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber. `RUST_LOG` wins over the default filter;
/// `LOG_FORMAT=json` switches to JSON lines. A second call is a no-op.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("reddit_digest=info,send_digest=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let res = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };
    if res.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Build the full HTTP app from the environment: cron endpoint, health, metrics.
pub async fn app() -> anyhow::Result<axum::Router> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    let cfg = config::AppConfig::from_env();
    let sections = config::load_sections_default().context("loading digest sections")?;
    tracing::info!(
        sections = sections.len(),
        dev_mode = cfg.dev_mode,
        secret_set = cfg.cron_secret.is_some(),
        "digest app configured"
    );

    let state = AppState {
        auth: CronAuth::from_config(&cfg),
        runner: Arc::new(runtime::EnvRunner::new(cfg, sections)),
    };
    let metrics = crate::metrics::Metrics::init();
    Ok(router(state, &metrics))
}
