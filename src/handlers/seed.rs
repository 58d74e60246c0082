use std::time::Instant;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::{db, error::AppResult, expiry, seed, AppState};

#[derive(Debug, Deserialize)]
pub struct SeedQuery {
    /// Number of products to create (default: 40, max: 1 000)
    pub count: Option<usize>,
}

// ── POST /api/seed ────────────────────────────────────────────────────────────

pub async fn seed_data(
    State(state): State<AppState>,
    Query(query): Query<SeedQuery>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let params = seed::SeedParams {
        products: query.count.unwrap_or(40).min(1_000),
    };

    let start = Instant::now();
    let seeded = seed::seed_demo(&state.db, params, expiry::today_local()).await?;
    let elapsed = start.elapsed();

    let totals = db::count_rows(&state.db).await?;

    info!(
        products = seeded.products,
        lots = seeded.lots,
        seed_ms = elapsed.as_millis(),
        "Seeded demo data"
    );

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "seeded": seeded,
            "totals": totals,
            "seed_time_ms": elapsed.as_secs_f64() * 1000.0,
        })),
    ))
}
