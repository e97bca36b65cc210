//! Language model helpers. Failures map to 502 and never touch stored data.

use crate::error::{ApiError, json_body};
use crate::state::{AppState, run_blocking};
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use taskpulse_core::advisor::{
    self, BurndownSuggestion, MeetingPrep, Notification, ProjectSummary, RedactedNotes,
    SuggestedDescription, Transcript,
};
use taskpulse_core::model::{AiDirective, Meeting, Task};
use taskpulse_core::storage::json_store::Collection;
use time::OffsetDateTime;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/ai/notification", get(notification))
        .route("/api/ai/summary", get(summary))
        .route("/api/ai/redact-notes", post(redact_notes))
        .route("/api/ai/transcribe-audio", post(transcribe_audio))
        .route("/api/ai/meeting-prep", post(meeting_prep))
        .route("/api/ai/suggest-description", post(suggest_description))
        .route("/api/ai/suggest-burndown", post(suggest_burndown))
}

#[derive(Deserialize)]
struct RedactRequest {
    notes: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranscribeRequest {
    audio_data_uri: String,
    #[serde(default)]
    attendees: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MeetingPrepRequest {
    meeting_id: String,
    attendee_emails: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescriptionRequest {
    task_name: String,
}

async fn notification(State(state): State<AppState>) -> Result<Json<Notification>, ApiError> {
    let (model, language) = (state.model.clone(), state.language());
    state
        .read(move |store| {
            let tasks: Vec<Task> = store.load(Collection::Tasks)?;
            let directives: Vec<AiDirective> = store.load(Collection::Directives)?;
            advisor::notification(model.as_ref(), &tasks, &directives, &language)
        })
        .await
        .map(Json)
}

async fn summary(State(state): State<AppState>) -> Result<Json<ProjectSummary>, ApiError> {
    let (model, language) = (state.model.clone(), state.language());
    state
        .read(move |store| {
            let tasks: Vec<Task> = store.load(Collection::Tasks)?;
            let directives: Vec<AiDirective> = store.load(Collection::Directives)?;
            advisor::project_summary(model.as_ref(), &tasks, &directives, &language)
        })
        .await
        .map(Json)
}

async fn redact_notes(
    State(state): State<AppState>,
    payload: Result<Json<RedactRequest>, JsonRejection>,
) -> Result<Json<RedactedNotes>, ApiError> {
    let request = json_body(payload)?;
    let (model, language) = (state.model.clone(), state.language());
    run_blocking(move || advisor::redact_notes(model.as_ref(), &request.notes, &language))
        .await
        .map(Json)
}

async fn transcribe_audio(
    State(state): State<AppState>,
    payload: Result<Json<TranscribeRequest>, JsonRejection>,
) -> Result<Json<Transcript>, ApiError> {
    let request = json_body(payload)?;
    let (model, language) = (state.model.clone(), state.language());
    run_blocking(move || {
        advisor::transcribe_audio(
            model.as_ref(),
            &request.audio_data_uri,
            &request.attendees,
            &language,
        )
    })
    .await
    .map(Json)
}

async fn meeting_prep(
    State(state): State<AppState>,
    payload: Result<Json<MeetingPrepRequest>, JsonRejection>,
) -> Result<Json<MeetingPrep>, ApiError> {
    let request = json_body(payload)?;
    let (model, language) = (state.model.clone(), state.language());
    state
        .read(move |store| {
            let meetings: Vec<Meeting> = store.load(Collection::Meetings)?;
            let tasks: Vec<Task> = store.load(Collection::Tasks)?;
            let directives: Vec<AiDirective> = store.load(Collection::Directives)?;
            advisor::meeting_prep(
                model.as_ref(),
                &meetings,
                &tasks,
                &directives,
                &request.meeting_id,
                &request.attendee_emails,
                &language,
            )
        })
        .await
        .map(Json)
}

async fn suggest_description(
    State(state): State<AppState>,
    payload: Result<Json<DescriptionRequest>, JsonRejection>,
) -> Result<Json<SuggestedDescription>, ApiError> {
    let request = json_body(payload)?;
    let (model, language) = (state.model.clone(), state.language());
    run_blocking(move || advisor::suggest_description(model.as_ref(), &request.task_name, &language))
        .await
        .map(Json)
}

async fn suggest_burndown(
    State(state): State<AppState>,
) -> Result<Json<BurndownSuggestion>, ApiError> {
    let (model, language) = (state.model.clone(), state.language());
    let today = OffsetDateTime::now_utc().date();
    state
        .read(move |store| {
            let tasks: Vec<Task> = store.load(Collection::Tasks)?;
            advisor::suggest_burndown(model.as_ref(), &tasks, today, &language)
        })
        .await
        .map(Json)
}
