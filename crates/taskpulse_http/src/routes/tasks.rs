use crate::error::{ApiError, json_body};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use taskpulse_core::model::{NewTask, Task, TaskPatch};
use taskpulse_core::progress::TaskProgress;
use taskpulse_core::stats::{ProjectStats, project_stats};
use taskpulse_core::storage::json_store::Collection;
use taskpulse_core::task_api::{self, DeleteOutcome};
use time::OffsetDateTime;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/progress", get(task_progress))
        .route("/api/tasks/help-needed", get(help_needed))
        .route("/api/tasks/export", get(export_tasks))
        .route("/api/tasks/import", axum::routing::post(import_tasks))
        .route(
            "/api/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/api/stats", get(stats))
}

async fn list_tasks(State(state): State<AppState>) -> Result<Json<Vec<Task>>, ApiError> {
    state.read(task_api::list_tasks).await.map(Json)
}

async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    state
        .read(move |store| task_api::get_task(store, &id))
        .await
        .map(Json)
}

async fn task_progress(
    State(state): State<AppState>,
) -> Result<Json<Vec<TaskProgress>>, ApiError> {
    state.read(task_api::task_progress).await.map(Json)
}

async fn help_needed(State(state): State<AppState>) -> Result<Json<Vec<Task>>, ApiError> {
    state.read(task_api::help_needed_tasks).await.map(Json)
}

async fn create_task(
    State(state): State<AppState>,
    payload: Result<Json<NewTask>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let new_task = json_body(payload)?;
    let now = OffsetDateTime::now_utc();
    let task = state
        .write(move |store| task_api::create_task(store, new_task, now))
        .await?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TaskPatch>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let patch = json_body(payload)?;
    let strict = state.config.strict_completion;
    let now = OffsetDateTime::now_utc();
    state
        .write(move |store| task_api::update_task(store, &id, patch, strict, now))
        .await
        .map(Json)
}

async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteOutcome>, ApiError> {
    state
        .write(move |store| task_api::delete_task(store, &id))
        .await
        .map(Json)
}

#[derive(Serialize)]
struct ImportResult {
    message: String,
    count: usize,
}

async fn import_tasks(
    State(state): State<AppState>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<ImportResult>, ApiError> {
    let value = json_body(payload)?;
    let count = state
        .write(move |store| task_api::import_tasks(store, value))
        .await?;
    Ok(Json(ImportResult {
        message: "Tasks imported successfully".to_string(),
        count,
    }))
}

async fn export_tasks(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let body = state.read(task_api::export_tasks).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"tasks.json\"",
            ),
        ],
        body,
    ))
}

async fn stats(State(state): State<AppState>) -> Result<Json<ProjectStats>, ApiError> {
    state
        .read(|store| {
            let tasks: Vec<Task> = store.load(Collection::Tasks)?;
            let users = store.load(Collection::Users)?;
            Ok(project_stats(&tasks, &users))
        })
        .await
        .map(Json)
}
