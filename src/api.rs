// src/api.rs
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sha2::{Digest, Sha256};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::metrics::Metrics;
use crate::runtime::DigestRunner;

/// Bearer check for the cron endpoint.
#[derive(Debug, Clone, Default)]
pub struct CronAuth {
    pub secret: Option<String>,
    pub dev_mode: bool,
}

impl CronAuth {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            secret: cfg.cron_secret.clone(),
            dev_mode: cfg.dev_mode,
        }
    }

    /// Open in dev mode or when no secret is configured; otherwise the header
    /// must be exactly `Bearer <secret>`.
    pub fn allows(&self, authorization: Option<&str>) -> bool {
        if self.dev_mode {
            return true;
        }
        let Some(secret) = self.secret.as_deref() else {
            return true;
        };
        let expected = format!("Bearer {secret}");
        let given = authorization.unwrap_or_default();
        // compare digests so timing does not depend on the common prefix
        Sha256::digest(expected.as_bytes()) == Sha256::digest(given.as_bytes())
    }
}

#[derive(Clone)]
pub struct AppState {
    pub runner: Arc<dyn DigestRunner>,
    pub auth: CronAuth,
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
}

fn error_response(status: StatusCode, msg: impl Into<String>) -> Response {
    (status, Json(ErrorBody { error: msg.into() })).into_response()
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/cron/digest", get(cron_digest))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Router plus `/metrics`.
pub fn router(state: AppState, metrics: &Metrics) -> Router {
    create_router(state).merge(metrics.router())
}

async fn cron_digest(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let auth = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    if !state.auth.allows(auth) {
        tracing::warn!("cron digest request rejected: bad or missing bearer");
        return error_response(StatusCode::UNAUTHORIZED, "Unauthorized");
    }

    match state.runner.run_digest().await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_rules() {
        let open = CronAuth::default();
        assert!(open.allows(None));

        let locked = CronAuth {
            secret: Some("s3cret".into()),
            dev_mode: false,
        };
        assert!(locked.allows(Some("Bearer s3cret")));
        assert!(!locked.allows(Some("Bearer wrong")));
        assert!(!locked.allows(Some("s3cret")));
        assert!(!locked.allows(None));

        let dev = CronAuth {
            dev_mode: true,
            ..locked
        };
        assert!(dev.allows(None));
    }
}
