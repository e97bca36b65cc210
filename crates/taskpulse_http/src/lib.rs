//! HTTP surface over `taskpulse_core`. Every handler runs its store or model
//! work on the blocking pool; mutating requests are serialized.

pub mod error;
mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::session::SESSION_HEADER;
pub use state::AppState;

use axum::routing::get;
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .merge(routes::tasks::routes())
        .merge(routes::users::routes())
        .merge(routes::meetings::routes())
        .merge(routes::directives::routes())
        .merge(routes::burndown::routes())
        .merge(routes::session::routes())
        .merge(routes::vision::routes())
        .merge(routes::ai::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Serves until `shutdown` resolves.
pub async fn serve<F>(
    listener: tokio::net::TcpListener,
    state: AppState,
    shutdown: F,
) -> std::io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, data_dir = %state.store.root().display(), "listening");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
