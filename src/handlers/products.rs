use std::time::Instant;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::{
    db,
    error::AppResult,
    models::{Product, ProductId, ProductPayload},
    AppState,
};

// ── List ──────────────────────────────────────────────────────────────────────

pub async fn list_products(State(state): State<AppState>) -> AppResult<(StatusCode, Json<Vec<Product>>)> {
    let start = Instant::now();
    let products = db::fetch_all_products(&state.db).await?;

    info!(
        count = products.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "Listed products"
    );

    Ok((StatusCode::OK, Json(products)))
}

// ── Create ────────────────────────────────────────────────────────────────────

pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<ProductPayload>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let product = payload.validate()?;
    // 404 for an unknown brand instead of a foreign-key error
    db::fetch_brand_by_id(&state.db, product.brand_id).await?;

    let product = db::insert_product(&state.db, &product).await?;
    info!(id = %product.id, name = %product.name, brand_id = %product.brand_id, "Created product");

    Ok((StatusCode::CREATED, Json(product)))
}

// ── Get by ID ─────────────────────────────────────────────────────────────────

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let product = db::fetch_product_by_id(&state.db, id).await?;
    info!(id = %id, "Fetched product");
    Ok((StatusCode::OK, Json(product)))
}

// ── Update ────────────────────────────────────────────────────────────────────

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(payload): Json<ProductPayload>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let product = payload.validate()?;
    db::fetch_brand_by_id(&state.db, product.brand_id).await?;

    let product = db::update_product(&state.db, id, &product).await?;
    info!(id = %id, "Updated product");

    Ok((StatusCode::OK, Json(product)))
}

// ── Delete ────────────────────────────────────────────────────────────────────

pub async fn delete_product(State(state): State<AppState>, Path(id): Path<ProductId>) -> AppResult<StatusCode> {
    db::delete_product(&state.db, id).await?;
    info!(id = %id, "Deleted product");
    Ok(StatusCode::NO_CONTENT)
}
