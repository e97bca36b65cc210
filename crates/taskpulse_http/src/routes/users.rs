use super::Message;
use crate::error::{ApiError, json_body};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use taskpulse_core::model::{NewUser, User, UserPatch};
use taskpulse_core::user_api;
use time::OffsetDateTime;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/{id}", put(update_user).delete(delete_user))
}

async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    state.read(user_api::list_users).await.map(Json)
}

async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let new_user = json_body(payload)?;
    let now = OffsetDateTime::now_utc();
    let user = state
        .write(move |store| user_api::create_user(store, new_user, now))
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UserPatch>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let patch = json_body(payload)?;
    state
        .write(move |store| user_api::update_user(store, &id, patch))
        .await
        .map(Json)
}

async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Message>, ApiError> {
    let removed = state
        .write(move |store| user_api::delete_user(store, &id))
        .await?;
    state.sessions.end_user_sessions(&removed.id)?;
    Ok(Json(Message::new("User deleted successfully")))
}
