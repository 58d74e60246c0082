pub mod branches;
pub mod brands;
pub mod chat;
pub mod lot_branches;
pub mod lots;
pub mod movements;
pub mod products;
pub mod seed;
pub mod stock;

use axum::{http::StatusCode, Json};
use serde_json::json;

pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok", "service": "supermarket-inventory" })))
}
