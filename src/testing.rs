// src/testing.rs
//! Local HTTP fixtures for client tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{http::StatusCode, Router};

/// Serve the scripted `(status, body)` replies in order on an ephemeral port,
/// repeating the last one once the script runs out. Returns the base URL.
pub async fn serve_script(script: Vec<(u16, &'static str)>) -> String {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new().fallback(move || {
        let hits = hits.clone();
        let script = script.clone();
        async move {
            let i = hits.fetch_add(1, Ordering::SeqCst);
            let (code, body) = script.get(i).or(script.last()).copied().unwrap_or((500, ""));
            let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, body)
        }
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fixture listener");
    let addr = listener.local_addr().expect("fixture addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}
