use crate::error::{ApiError, json_body};
use crate::state::AppState;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::{Json, Router};
use taskpulse_core::burndown::{self, BurndownEstimate};
use taskpulse_core::model::{BurndownPoint, Task};
use taskpulse_core::storage::json_store::Collection;
use time::OffsetDateTime;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/burndown", get(list_history).post(replace_history))
        .route("/api/burndown/snapshot", post(record_snapshot))
        .route("/api/burndown/estimate", get(estimate))
}

async fn list_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<BurndownPoint>>, ApiError> {
    state.read(burndown::list_history).await.map(Json)
}

async fn replace_history(
    State(state): State<AppState>,
    payload: Result<Json<Vec<BurndownPoint>>, JsonRejection>,
) -> Result<Json<Vec<BurndownPoint>>, ApiError> {
    let points = json_body(payload)?;
    state
        .write(move |store| burndown::replace_history(store, points))
        .await
        .map(Json)
}

async fn record_snapshot(State(state): State<AppState>) -> Result<Json<BurndownPoint>, ApiError> {
    let today = OffsetDateTime::now_utc().date();
    state
        .write(move |store| burndown::record_snapshot(store, today))
        .await
        .map(Json)
}

async fn estimate(State(state): State<AppState>) -> Result<Json<BurndownEstimate>, ApiError> {
    let today = OffsetDateTime::now_utc().date();
    state
        .read(move |store| {
            let tasks: Vec<Task> = store.load(Collection::Tasks)?;
            Ok(burndown::estimate_burndown(&tasks, today))
        })
        .await
        .map(Json)
}
