use crate::error::{ApiError, json_body};
use crate::state::AppState;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::get;
use axum::{Json, Router};
use taskpulse_core::model::ProjectVision;
use taskpulse_core::vision_api;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/vision", get(get_vision).post(save_vision))
}

async fn get_vision(State(state): State<AppState>) -> Result<Json<ProjectVision>, ApiError> {
    state.read(vision_api::get_vision).await.map(Json)
}

async fn save_vision(
    State(state): State<AppState>,
    payload: Result<Json<ProjectVision>, JsonRejection>,
) -> Result<Json<ProjectVision>, ApiError> {
    let vision = json_body(payload)?;
    state
        .write(move |store| vision_api::save_vision(store, vision))
        .await
        .map(Json)
}
