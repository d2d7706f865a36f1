//! Branch API Handlers

use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};
use shared::error::{AppError, ErrorCode};
use shared::models::{Branch, BranchCreate, BranchList, BranchUpdate};

use crate::api::extract::{ApiJson, IdPath};
use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;
use crate::util::non_blank;

/// GET /branches
pub async fn list(State(state): State<AppState>) -> ServiceResult<Json<BranchList>> {
    let branches = db::branches::list(&state.pool).await?;
    Ok(Json(BranchList { branches }))
}

/// POST /branches
pub async fn create(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<BranchCreate>,
) -> ServiceResult<(StatusCode, Json<Branch>)> {
    let name = non_blank(payload.name).ok_or_else(|| AppError::new(ErrorCode::BranchNameRequired))?;
    let code = non_blank(payload.code);

    let branch = db::branches::create(&state.pool, &name, code.as_deref()).await?;
    tracing::info!(branch_id = branch.id, name = %branch.name, "Branch created");
    Ok((StatusCode::CREATED, Json(branch)))
}

/// PUT /branches/:id
pub async fn update(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ApiJson(payload): ApiJson<BranchUpdate>,
) -> ServiceResult<Json<Branch>> {
    let name = non_blank(payload.name);
    let code = non_blank(payload.code);

    let branch = db::branches::update(&state.pool, id, name.as_deref(), code.as_deref())
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::BranchNotFound))?;
    Ok(Json(branch))
}

/// DELETE /branches/:id
pub async fn delete(State(state): State<AppState>, IdPath(id): IdPath) -> ServiceResult<Json<Value>> {
    let deleted = db::branches::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::new(ErrorCode::BranchNotFound).into());
    }
    tracing::info!(branch_id = id, "Branch deleted");
    Ok(Json(json!({ "message": "Branch deleted" })))
}
