//! Axum route handlers for interactive sessions and the job search.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::accounts::verify_credentials;
use crate::errors::AppError;
use crate::models::job::SavedJobRow;
use crate::session::registry::SharedSession;
use crate::session::saved::{save_job, saved_jobs};
use crate::session::ListingStep;
use crate::state::AppState;
use crate::summary::WordBudget;

/// Word budget of a posting summary.
pub const JOB_SUMMARY_BUDGET: WordBudget = WordBudget::at_most(100);

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SessionOpened {
    pub session_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub user_name: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub location: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
    pub cached: bool,
}

#[derive(Debug, Serialize)]
pub struct SavedJobResponse {
    pub job_id: i64,
}

/// Looks up a live session or fails with `NotFound`.
pub fn lookup_session(state: &AppState, id: Uuid) -> Result<SharedSession, AppError> {
    state
        .sessions
        .get(id)
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}

// ────────────────────────────────────────────────────────────────────────────
// Session lifecycle
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_open_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionOpened>) {
    let session_id = state.sessions.open();
    (StatusCode::CREATED, Json(SessionOpened { session_id }))
}

/// POST /api/v1/sessions/:id/login
pub async fn handle_login(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let session = lookup_session(&state, id)?;
    let user_id = verify_credentials(&state.db, &req.user_name, &req.password).await?;

    let mut session = session.lock().await;
    if session.user_id.is_some_and(|current| current != user_id) {
        session.logout().await?;
    }
    session.user_id = Some(user_id);
    info!("Session {id} logged in as {user_id}");
    Ok(Json(LoginResponse { user_id }))
}

/// POST /api/v1/sessions/:id/logout
pub async fn handle_logout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let session = lookup_session(&state, id)?;
    session.lock().await.logout().await?;
    info!("Session {id} logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_teardown_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.teardown(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Session {id} not found")))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Job search
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions/:id/jobs/search
pub async fn handle_search(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<ListingStep>, AppError> {
    if req.query.trim().is_empty() {
        return Err(AppError::Validation("query cannot be blank".to_string()));
    }
    let session = lookup_session(&state, id)?;
    let step = session
        .lock()
        .await
        .jobs
        .start(req.query.trim(), req.location.trim())
        .await?;
    Ok(Json(step))
}

/// POST /api/v1/sessions/:id/jobs/next
pub async fn handle_next(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ListingStep>, AppError> {
    let session = lookup_session(&state, id)?;
    let step = session.lock().await.jobs.advance().await?;
    Ok(Json(step))
}

/// DELETE /api/v1/sessions/:id/jobs
pub async fn handle_close_search(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let session = lookup_session(&state, id)?;
    session.lock().await.jobs.close().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:id/jobs/summary
pub async fn handle_summarize_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SummaryResponse>, AppError> {
    let session = lookup_session(&state, id)?;
    let mut session = session.lock().await;

    if let Some(summary) = session.jobs.cached_summary() {
        return Ok(Json(SummaryResponse {
            summary: summary.to_string(),
            cached: true,
        }));
    }
    let description = session
        .jobs
        .current()
        .map(|job| job.job_description.clone())
        .ok_or(AppError::PreconditionFailed(
            "no job posting is displayed".to_string(),
        ))?;

    let summary = state
        .summarizer
        .summarize(&description, JOB_SUMMARY_BUDGET)
        .await?;
    session.jobs.cache_summary(summary.clone());
    Ok(Json(SummaryResponse {
        summary,
        cached: false,
    }))
}

/// POST /api/v1/sessions/:id/jobs/save
pub async fn handle_save_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<SavedJobResponse>), AppError> {
    let session = lookup_session(&state, id)?;
    let session = session.lock().await;
    let user_id = session.require_login()?;
    let record = session.jobs.current().ok_or(AppError::PreconditionFailed(
        "no job posting is displayed".to_string(),
    ))?;

    let job_id = save_job(&state.db, user_id, record).await?;
    Ok((StatusCode::CREATED, Json(SavedJobResponse { job_id })))
}

/// GET /api/v1/sessions/:id/jobs/saved
pub async fn handle_saved_jobs(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<SavedJobRow>>, AppError> {
    let session = lookup_session(&state, id)?;
    let user_id = session.lock().await.require_login()?;
    Ok(Json(saved_jobs(&state.db, user_id).await?))
}
