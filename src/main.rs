//! Reddit Digest server entrypoint.
//! Serves the cron-triggered digest endpoint on Shuttle.

use shuttle_axum::ShuttleAxum;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    reddit_digest::init_tracing();

    let router = reddit_digest::app()
        .await
        .map_err(shuttle_runtime::Error::Custom)?;

    Ok(router.into())
}
