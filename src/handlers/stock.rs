use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::info;

use crate::{
    db,
    error::{AppError, AppResult},
    lookup::products_by_id,
    models::{BranchId, StockRow},
    report::{self, BranchStock, CountAdjustment, CountRequest},
    AppState,
};

#[derive(Debug, Serialize)]
pub struct CountResult {
    #[serde(rename = "sucursalId")]
    pub branch_id: BranchId,
    #[serde(rename = "ajustes")]
    pub adjustments: Vec<CountAdjustment>,
}

pub async fn list_stock(State(state): State<AppState>) -> AppResult<(StatusCode, Json<Vec<StockRow>>)> {
    let rows = db::fetch_stock(&state.db).await?;
    info!(count = rows.len(), "Listed stock");
    Ok((StatusCode::OK, Json(rows)))
}

pub async fn stock_report(State(state): State<AppState>) -> AppResult<(StatusCode, Json<Vec<BranchStock>>)> {
    let (branches, stock, products) = tokio::try_join!(
        db::fetch_all_branches(&state.db),
        db::fetch_stock(&state.db),
        db::fetch_all_products(&state.db),
    )?;

    let products = products_by_id(products);
    let report = report::stock_by_branch(&branches, &stock, &products);
    info!(
        branches = report.len(),
        products = products.len(),
        rows = stock.len(),
        "Built stock report"
    );

    Ok((StatusCode::OK, Json(report)))
}

/// Compares a manual count against recorded stock. Nothing is written.
pub async fn reconcile_count(
    State(state): State<AppState>,
    Json(request): Json<CountRequest>,
) -> AppResult<(StatusCode, Json<CountResult>)> {
    if let Some(bad) = request.counts.iter().find(|c| c.counted < 0) {
        return Err(AppError::BadRequest(format!(
            "contado for product {} must be >= 0",
            bad.product_id
        )));
    }

    let (_, products, stock) = tokio::try_join!(
        db::fetch_branch_by_id(&state.db, request.branch_id),
        db::fetch_all_products(&state.db),
        db::fetch_stock(&state.db),
    )?;

    let adjustments = report::reconcile_counts(request.branch_id, &products_by_id(products), &stock, &request.counts);
    info!(
        branch_id = %request.branch_id,
        counted = request.counts.len(),
        differences = adjustments.iter().filter(|a| a.diferencia != 0).count(),
        "Reconciled manual count"
    );

    Ok((
        StatusCode::OK,
        Json(CountResult {
            branch_id: request.branch_id,
            adjustments,
        }),
    ))
}
