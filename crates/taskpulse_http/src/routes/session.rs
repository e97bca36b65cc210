use crate::error::{ApiError, json_body};
use crate::state::AppState;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{post, put};
use axum::{Json, Router};
use serde::Deserialize;
use taskpulse_core::error::AppError;
use taskpulse_core::session::Session;
use taskpulse_core::user_api;
use time::OffsetDateTime;

pub const SESSION_HEADER: &str = "x-session-token";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/session",
            post(login).get(current_session).delete(logout),
        )
        .route("/api/session/zen-mode", put(set_zen_mode))
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
}

#[derive(Deserialize)]
struct ZenModeRequest {
    enabled: bool,
}

fn session_token(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError(AppError::invalid_input(format!("{SESSION_HEADER} header is required"))))
}

async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Session>), ApiError> {
    let request = json_body(payload)?;
    let users = state.read(user_api::list_users).await?;
    let session = state
        .sessions
        .login(&users, &request.email, OffsetDateTime::now_utc())?;
    Ok((StatusCode::CREATED, Json(session)))
}

async fn current_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Session>, ApiError> {
    let token = session_token(&headers)?;
    Ok(Json(state.sessions.get(&token)?))
}

async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let token = session_token(&headers)?;
    state.sessions.logout(&token)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn set_zen_mode(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ZenModeRequest>, JsonRejection>,
) -> Result<Json<Session>, ApiError> {
    let token = session_token(&headers)?;
    let request = json_body(payload)?;
    Ok(Json(state.sessions.set_zen_mode(&token, request.enabled)?))
}
