use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::{
    db,
    error::AppResult,
    models::{Branch, BranchId, BranchPayload},
    AppState,
};

pub async fn list_branches(State(state): State<AppState>) -> AppResult<(StatusCode, Json<Vec<Branch>>)> {
    let branches = db::fetch_all_branches(&state.db).await?;
    info!(count = branches.len(), "Listed branches");
    Ok((StatusCode::OK, Json(branches)))
}

pub async fn get_branch(
    State(state): State<AppState>,
    Path(id): Path<BranchId>,
) -> AppResult<(StatusCode, Json<Branch>)> {
    let branch = db::fetch_branch_by_id(&state.db, id).await?;
    Ok((StatusCode::OK, Json(branch)))
}

pub async fn create_branch(
    State(state): State<AppState>,
    Json(payload): Json<BranchPayload>,
) -> AppResult<(StatusCode, Json<Branch>)> {
    let (name, address) = payload.validated()?;
    let branch = db::insert_branch(&state.db, &name, &address).await?;
    info!(id = %branch.id, name = %branch.name, "Created branch");
    Ok((StatusCode::CREATED, Json(branch)))
}

pub async fn update_branch(
    State(state): State<AppState>,
    Path(id): Path<BranchId>,
    Json(payload): Json<BranchPayload>,
) -> AppResult<(StatusCode, Json<Branch>)> {
    let (name, address) = payload.validated()?;
    let branch = db::update_branch(&state.db, id, &name, &address).await?;
    info!(id = %id, "Updated branch");
    Ok((StatusCode::OK, Json(branch)))
}

pub async fn delete_branch(State(state): State<AppState>, Path(id): Path<BranchId>) -> AppResult<StatusCode> {
    db::delete_branch(&state.db, id).await?;
    info!(id = %id, "Deleted branch");
    Ok(StatusCode::NO_CONTENT)
}
