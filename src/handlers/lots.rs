use std::time::Instant;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    db,
    error::AppResult,
    expiry::{self, ExpiryStatus, Severity},
    models::{CreateLot, LotFilters, LotId, LotView, SetFlag, StatusQuery},
    AppState,
};

#[derive(Debug, Serialize)]
pub struct AlertList {
    pub data: Vec<LotView>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct StatusPreview {
    #[serde(rename = "fechaVencimiento")]
    pub expiration_date: Option<NaiveDate>,
    #[serde(rename = "diasRestantes")]
    pub days_remaining: Option<i64>,
    #[serde(rename = "estado")]
    pub status: ExpiryStatus,
    #[serde(rename = "severidad")]
    pub severity: Severity,
}

// ── List ──────────────────────────────────────────────────────────────────────

pub async fn list_lots(
    State(state): State<AppState>,
    Query(filters): Query<LotFilters>,
) -> AppResult<(StatusCode, Json<Vec<LotView>>)> {
    let start = Instant::now();
    let lots = db::fetch_lots(&state.db, &filters).await?;
    let today = expiry::today_local();

    let views: Vec<LotView> = lots
        .into_iter()
        .map(|lot| expiry::annotate(lot, today, state.policy))
        .filter(|view| filters.status.map_or(true, |s| view.status == s))
        .collect();

    info!(
        count = views.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "Listed lots"
    );

    Ok((StatusCode::OK, Json(views)))
}

// ── Create ────────────────────────────────────────────────────────────────────

pub async fn create_lot(
    State(state): State<AppState>,
    Json(payload): Json<CreateLot>,
) -> AppResult<(StatusCode, Json<LotView>)> {
    let lot = payload.validate()?;
    db::fetch_product_by_id(&state.db, lot.product_id).await?;

    let lot = db::insert_lot(&state.db, &lot).await?;
    let view = expiry::annotate(lot, expiry::today_local(), state.policy);

    if view.status.is_alerting() {
        warn!(
            id = %view.lot.id,
            estado = view.status.label(),
            dias = ?view.days_remaining,
            "Created lot that is already expired or close to expiry"
        );
    } else {
        info!(id = %view.lot.id, product_id = %view.lot.product_id, "Created lot");
    }

    Ok((StatusCode::CREATED, Json(view)))
}

// ── Get / delete ──────────────────────────────────────────────────────────────

pub async fn get_lot(State(state): State<AppState>, Path(id): Path<LotId>) -> AppResult<(StatusCode, Json<LotView>)> {
    let lot = db::fetch_lot_by_id(&state.db, id).await?;
    Ok((StatusCode::OK, Json(expiry::annotate(lot, expiry::today_local(), state.policy))))
}

pub async fn delete_lot(State(state): State<AppState>, Path(id): Path<LotId>) -> AppResult<StatusCode> {
    db::delete_lot(&state.db, id).await?;
    info!(id = %id, "Deleted lot");
    Ok(StatusCode::NO_CONTENT)
}

// ── Flags ─────────────────────────────────────────────────────────────────────

pub async fn set_notification(
    State(state): State<AppState>,
    Path(id): Path<LotId>,
    Json(flag): Json<SetFlag>,
) -> AppResult<(StatusCode, Json<LotView>)> {
    let lot = db::set_lot_notification(&state.db, id, flag.value).await?;
    info!(id = %id, enabled = flag.value, "Toggled lot notifications");
    Ok((StatusCode::OK, Json(expiry::annotate(lot, expiry::today_local(), state.policy))))
}

pub async fn set_discarded(
    State(state): State<AppState>,
    Path(id): Path<LotId>,
    Json(flag): Json<SetFlag>,
) -> AppResult<(StatusCode, Json<LotView>)> {
    let lot = db::set_lot_discarded(&state.db, id, flag.value).await?;
    info!(id = %id, discarded = flag.value, "Toggled lot discard");
    Ok((StatusCode::OK, Json(expiry::annotate(lot, expiry::today_local(), state.policy))))
}

// ── Alerts ────────────────────────────────────────────────────────────────────

/// Runs over the whole lot collection; only the notification flag mutes a lot.
pub async fn list_alerts(State(state): State<AppState>) -> AppResult<(StatusCode, Json<AlertList>)> {
    let lots = db::fetch_lots(&state.db, &LotFilters::everything()).await?;
    let today = expiry::today_local();

    let data: Vec<LotView> = expiry::compute_alerts(&lots, today, state.policy)
        .into_iter()
        .map(|lot| expiry::annotate(lot.clone(), today, state.policy))
        .collect();

    info!(count = data.len(), scanned = lots.len(), "Computed expiry alerts");

    let count = data.len();
    Ok((StatusCode::OK, Json(AlertList { data, count })))
}

pub async fn list_expired(State(state): State<AppState>) -> AppResult<(StatusCode, Json<Vec<LotView>>)> {
    let lots = db::fetch_lots(&state.db, &LotFilters::default()).await?;
    let today = expiry::today_local();

    let expired: Vec<LotView> = expiry::expired_lots(&lots, today)
        .into_iter()
        .map(|lot| expiry::annotate(lot.clone(), today, state.policy))
        .collect();

    info!(count = expired.len(), "Listed expired lots");
    Ok((StatusCode::OK, Json(expired)))
}

// ── Status preview ────────────────────────────────────────────────────────────

/// Classifies a date typed into the lot form before it is saved.
pub async fn preview_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> (StatusCode, Json<StatusPreview>) {
    let expiration_date = query.date.as_deref().and_then(expiry::parse_expiration);
    let days_remaining = expiry::days_until(expiration_date, expiry::today_local());
    let status = expiry::status_from_days(days_remaining, state.policy);

    (
        StatusCode::OK,
        Json(StatusPreview {
            expiration_date,
            days_remaining,
            status,
            severity: status.severity(),
        }),
    )
}
