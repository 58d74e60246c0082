use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::{
    db,
    error::AppResult,
    models::{CreateLotBranch, LotBranch, LotBranchId},
    AppState,
};

pub async fn list_lot_branches(State(state): State<AppState>) -> AppResult<(StatusCode, Json<Vec<LotBranch>>)> {
    let rows = db::fetch_all_lot_branches(&state.db).await?;
    info!(count = rows.len(), "Listed lot assignments");
    Ok((StatusCode::OK, Json(rows)))
}

pub async fn create_lot_branch(
    State(state): State<AppState>,
    Json(payload): Json<CreateLotBranch>,
) -> AppResult<(StatusCode, Json<LotBranch>)> {
    let row = payload.validate()?;
    tokio::try_join!(
        db::fetch_lot_by_id(&state.db, row.lot_id),
        db::fetch_branch_by_id(&state.db, row.branch_id),
    )?;

    let row = db::insert_lot_branch(&state.db, &row).await?;
    info!(
        id = %row.id,
        lot_id = %row.lot_id,
        branch_id = %row.branch_id,
        quantity = row.quantity,
        "Assigned lot to branch"
    );

    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn delete_lot_branch(
    State(state): State<AppState>,
    Path(id): Path<LotBranchId>,
) -> AppResult<StatusCode> {
    db::delete_lot_branch(&state.db, id).await?;
    info!(id = %id, "Deleted lot assignment");
    Ok(StatusCode::NO_CONTENT)
}
