use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::{
    db,
    error::{AppError, AppResult},
    lookup::{branches_by_id, products_by_id},
    models::{CreateMovement, Movement, MovementFilters, MovementKind, NewMovement, ProductId},
    report::{self, MovementView},
    AppState,
};

// ── List ──────────────────────────────────────────────────────────────────────

pub async fn list_movements(
    State(state): State<AppState>,
    Query(filters): Query<MovementFilters>,
) -> AppResult<(StatusCode, Json<Vec<MovementView>>)> {
    let (movements, products, branches) = tokio::try_join!(
        db::fetch_movements(&state.db, &filters),
        db::fetch_all_products(&state.db),
        db::fetch_all_branches(&state.db),
    )?;

    let views = report::describe_movements(movements, &products_by_id(products), &branches_by_id(branches));

    info!(
        count = views.len(),
        product_id = ?filters.product_id,
        tipo = ?filters.kind,
        "Listed movements"
    );

    Ok((StatusCode::OK, Json(views)))
}

/// Movement types present in the history, for the type filter.
pub async fn list_movement_kinds(State(state): State<AppState>) -> AppResult<(StatusCode, Json<Vec<MovementKind>>)> {
    let raw = db::fetch_movement_kinds(&state.db).await?;
    Ok((StatusCode::OK, Json(report::movement_kinds(raw.as_slice()))))
}

// ── Create ────────────────────────────────────────────────────────────────────

pub async fn create_movement(
    State(state): State<AppState>,
    Json(payload): Json<CreateMovement>,
) -> AppResult<(StatusCode, Json<Movement>)> {
    let movement = NewMovement::from(payload);
    movement.validate()?;

    let product_id = resolve_product(&state, &movement).await?;

    let recorded = if movement.is_transfer() {
        db::record_transfer(&state.db, &movement, product_id).await?
    } else {
        db::record_movement(&state.db, &movement, product_id).await?
    };

    info!(
        id = %recorded.id,
        tipo = %recorded.kind,
        product_id = %recorded.product_id,
        quantity = recorded.quantity,
        "Recorded movement"
    );

    Ok((StatusCode::CREATED, Json(recorded)))
}

/// The movement's product: taken from its lot when one is given, otherwise
/// the product id in the payload, which must exist.
async fn resolve_product(state: &AppState, movement: &NewMovement) -> AppResult<ProductId> {
    if let Some(lot_id) = movement.lot_id {
        let lot = db::fetch_lot_by_id(&state.db, lot_id).await?;
        if let Some(given) = movement.product_id.filter(|&p| p != lot.product_id) {
            return Err(AppError::BadRequest(format!(
                "Lot {} belongs to product {}, not {}",
                lot_id, lot.product_id, given
            )));
        }
        return Ok(lot.product_id);
    }

    let product_id = movement
        .product_id
        .ok_or_else(|| AppError::BadRequest("productoId or loteId is required".to_string()))?;
    db::fetch_product_by_id(&state.db, product_id).await?;
    Ok(product_id)
}
