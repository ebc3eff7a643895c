use axum::{extract::State, http::StatusCode, Json};

use crate::accounts::{create_account, NewAccount};
use crate::errors::AppError;
use crate::models::user::User;
use crate::state::AppState;

/// POST /api/v1/accounts
pub async fn handle_create_account(
    State(state): State<AppState>,
    Json(req): Json<NewAccount>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = create_account(&state.db, &req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}
