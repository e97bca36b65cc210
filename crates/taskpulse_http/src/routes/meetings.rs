use super::Message;
use crate::error::{ApiError, json_body};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use taskpulse_core::meeting_api;
use taskpulse_core::model::{Meeting, MeetingPatch, NewMeeting};
use time::OffsetDateTime;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/meetings", get(list_meetings).post(create_meeting))
        .route(
            "/api/meetings/{id}",
            get(get_meeting).put(update_meeting).delete(delete_meeting),
        )
}

async fn list_meetings(State(state): State<AppState>) -> Result<Json<Vec<Meeting>>, ApiError> {
    state.read(meeting_api::list_meetings).await.map(Json)
}

async fn get_meeting(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Meeting>, ApiError> {
    state
        .read(move |store| meeting_api::get_meeting(store, &id))
        .await
        .map(Json)
}

async fn create_meeting(
    State(state): State<AppState>,
    payload: Result<Json<NewMeeting>, JsonRejection>,
) -> Result<(StatusCode, Json<Meeting>), ApiError> {
    let new_meeting = json_body(payload)?;
    let now = OffsetDateTime::now_utc();
    let meeting = state
        .write(move |store| meeting_api::create_meeting(store, new_meeting, now))
        .await?;
    Ok((StatusCode::CREATED, Json(meeting)))
}

async fn update_meeting(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<MeetingPatch>, JsonRejection>,
) -> Result<Json<Meeting>, ApiError> {
    let patch = json_body(payload)?;
    state
        .write(move |store| meeting_api::update_meeting(store, &id, patch))
        .await
        .map(Json)
}

async fn delete_meeting(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Message>, ApiError> {
    state
        .write(move |store| meeting_api::delete_meeting(store, &id))
        .await?;
    Ok(Json(Message::new("Meeting deleted successfully")))
}
