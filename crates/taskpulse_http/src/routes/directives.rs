use crate::error::{ApiError, json_body};
use crate::state::AppState;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::get;
use axum::{Json, Router};
use taskpulse_core::directive_api;
use taskpulse_core::model::AiDirective;

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/api/directives",
        get(list_directives).post(replace_directives),
    )
}

async fn list_directives(
    State(state): State<AppState>,
) -> Result<Json<Vec<AiDirective>>, ApiError> {
    state.read(directive_api::list_directives).await.map(Json)
}

async fn replace_directives(
    State(state): State<AppState>,
    payload: Result<Json<Vec<AiDirective>>, JsonRejection>,
) -> Result<Json<Vec<AiDirective>>, ApiError> {
    let directives = json_body(payload)?;
    state
        .write(move |store| directive_api::replace_directives(store, directives))
        .await
        .map(Json)
}
