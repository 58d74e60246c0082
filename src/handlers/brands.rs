use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::{
    db,
    error::AppResult,
    models::{Brand, BrandId, BrandPayload},
    AppState,
};

pub async fn list_brands(State(state): State<AppState>) -> AppResult<(StatusCode, Json<Vec<Brand>>)> {
    let brands = db::fetch_all_brands(&state.db).await?;
    info!(count = brands.len(), "Listed brands");
    Ok((StatusCode::OK, Json(brands)))
}

pub async fn get_brand(
    State(state): State<AppState>,
    Path(id): Path<BrandId>,
) -> AppResult<(StatusCode, Json<Brand>)> {
    let brand = db::fetch_brand_by_id(&state.db, id).await?;
    Ok((StatusCode::OK, Json(brand)))
}

pub async fn create_brand(
    State(state): State<AppState>,
    Json(payload): Json<BrandPayload>,
) -> AppResult<(StatusCode, Json<Brand>)> {
    let name = payload.validated_name()?;
    let brand = db::insert_brand(&state.db, &name).await?;
    info!(id = %brand.id, name = %brand.name, "Created brand");
    Ok((StatusCode::CREATED, Json(brand)))
}

pub async fn update_brand(
    State(state): State<AppState>,
    Path(id): Path<BrandId>,
    Json(payload): Json<BrandPayload>,
) -> AppResult<(StatusCode, Json<Brand>)> {
    let name = payload.validated_name()?;
    let brand = db::update_brand(&state.db, id, &name).await?;
    info!(id = %id, "Updated brand");
    Ok((StatusCode::OK, Json(brand)))
}

pub async fn delete_brand(State(state): State<AppState>, Path(id): Path<BrandId>) -> AppResult<StatusCode> {
    db::delete_brand(&state.db, id).await?;
    info!(id = %id, "Deleted brand");
    Ok(StatusCode::NO_CONTENT)
}
