use serde::{Deserialize, Serialize};

use super::{BranchId, ProductId, StockId};

/// Quantity of a product held at a branch, summed over its lots.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StockRow {
    pub id: StockId,
    #[serde(rename = "productoId")]
    pub product_id: ProductId,
    #[serde(rename = "sucursalId")]
    pub branch_id: BranchId,
    #[serde(rename = "cantidad")]
    pub quantity: i32,
}
