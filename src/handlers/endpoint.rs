use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::error::Result;
use crate::tracker::SnapshotCache;

const METRICS_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Build the read-only metrics router. Only GET is served; HEAD is routed
/// explicitly so it does not fall through to the GET handlers.
pub fn router(cache: SnapshotCache) -> Router {
    Router::new()
        .route("/metrics", get(metrics).head(not_found).fallback(not_found))
        .route("/health", get(health).head(not_found).fallback(not_found))
        .fallback(not_found)
        .with_state(cache)
}

async fn metrics(State(cache): State<SnapshotCache>) -> Response {
    let snapshot = cache.load();
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, METRICS_CONTENT_TYPE)],
        snapshot.rendered_text.clone(),
    )
        .into_response()
}

async fn health() -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain")], "OK").into_response()
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Serve the router on `listener` until ctrl-c
pub async fn serve(listener: TcpListener, cache: SnapshotCache) -> Result<()> {
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(cache))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down..."),
        Err(e) => {
            error!("Failed to install ctrl-c handler, serving until killed: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
