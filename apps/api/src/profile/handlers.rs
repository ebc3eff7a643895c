//! Axum route handlers for profile drafts, skills and the persisted profile.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::DraftEntry;
use crate::profile::drafts::{Draft, DraftId};
use crate::profile::skills::SkillSet;
use crate::profile::store::{commit_drafts, load_profile, ProfileSnapshot};
use crate::session::handlers::lookup_session;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DraftAdded {
    pub draft_id: DraftId,
}

#[derive(Debug, Serialize)]
pub struct DraftList<'a> {
    pub drafts: Vec<Draft<'a, DraftEntry>>,
}

#[derive(Debug, Serialize)]
pub struct CommitResponse {
    pub committed: usize,
}

#[derive(Debug, Deserialize)]
pub struct SkillsRequest {
    pub skills: Vec<String>,
}

/// POST /api/v1/sessions/:id/drafts
pub async fn handle_add_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(entry): Json<DraftEntry>,
) -> Result<(StatusCode, Json<DraftAdded>), AppError> {
    entry.validate().map_err(AppError::Validation)?;
    let session = lookup_session(&state, id)?;
    let draft_id = session.lock().await.drafts.add(entry);
    Ok((StatusCode::CREATED, Json(DraftAdded { draft_id })))
}

/// GET /api/v1/sessions/:id/drafts
pub async fn handle_list_drafts(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let session = lookup_session(&state, id)?;
    let session = session.lock().await;
    let list = DraftList {
        drafts: session.drafts.iter().collect(),
    };
    Ok(Json(serde_json::to_value(&list).map_err(anyhow::Error::from)?))
}

/// DELETE /api/v1/sessions/:id/drafts/:draft_id
pub async fn handle_remove_draft(
    State(state): State<AppState>,
    Path((id, draft_id)): Path<(Uuid, DraftId)>,
) -> Result<StatusCode, AppError> {
    let session = lookup_session(&state, id)?;
    let removed = session.lock().await.drafts.remove(draft_id);
    match removed {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(AppError::NotFound(format!("Draft {draft_id} not found"))),
    }
}

/// POST /api/v1/sessions/:id/drafts/commit
pub async fn handle_commit_drafts(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CommitResponse>, AppError> {
    let session = lookup_session(&state, id)?;
    let mut session = session.lock().await;
    let user_id = session.require_login()?;
    let committed = commit_drafts(state.profiles.as_ref(), user_id, &mut session.drafts).await?;
    Ok(Json(CommitResponse { committed }))
}

/// PUT /api/v1/sessions/:id/skills
pub async fn handle_replace_skills(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SkillsRequest>,
) -> Result<Json<SkillSet>, AppError> {
    let session = lookup_session(&state, id)?;
    let user_id = session.lock().await.require_login()?;
    let skills = SkillSet::parse(req.skills, state.config.max_skills)?;
    state.profiles.replace_skills(user_id, &skills).await?;
    Ok(Json(skills))
}

/// GET /api/v1/sessions/:id/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProfileSnapshot>, AppError> {
    let session = lookup_session(&state, id)?;
    let user_id = session.lock().await.require_login()?;
    let snapshot = load_profile(state.profiles.as_ref(), user_id, state.config.max_skills).await?;
    Ok(Json(snapshot))
}
