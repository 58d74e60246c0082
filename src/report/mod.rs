//! Read-side views assembled from already-loaded collections: stock per
//! branch, manual count reconciliation and the movement listing.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::lookup::{BranchMap, Named, ProductMap};
use crate::models::{
    Branch, BranchId, BrandId, Movement, MovementKind, ProductId, StockRow,
};

// ── Stock per branch ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct StockLine {
    #[serde(rename = "productoId")]
    pub product_id: ProductId,
    #[serde(rename = "productoNombre")]
    pub product_name: String,
    #[serde(rename = "marcaId")]
    pub brand_id: Option<BrandId>,
    #[serde(rename = "cantidad")]
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct BranchStock {
    #[serde(rename = "sucursalId")]
    pub branch_id: BranchId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "direccion")]
    pub address: String,
    pub items: Vec<StockLine>,
    pub total: i64,
}

/// One group per branch in branch order. Branches without stock still get a
/// (empty) group; stock rows pointing at unknown branches are dropped.
pub fn stock_by_branch(branches: &[Branch], stock: &[StockRow], products: &ProductMap) -> Vec<BranchStock> {
    let mut groups: IndexMap<BranchId, BranchStock> = branches
        .iter()
        .map(|b| {
            (
                b.id,
                BranchStock {
                    branch_id: b.id,
                    name: b.name.clone(),
                    address: b.address.clone(),
                    items: Vec::new(),
                    total: 0,
                },
            )
        })
        .collect();

    for row in stock {
        let Some(group) = groups.get_mut(&row.branch_id) else {
            continue;
        };
        group.total += i64::from(row.quantity);
        group.items.push(StockLine {
            product_id: row.product_id,
            product_name: products.name_or(row.product_id, "Producto"),
            brand_id: products.get(&row.product_id).map(|p| p.brand_id),
            quantity: row.quantity,
        });
    }

    groups.into_values().collect()
}

// ── Manual count ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct CountEntry {
    #[serde(rename = "productoId")]
    pub product_id: ProductId,
    #[serde(rename = "contado")]
    pub counted: i64,
}

#[derive(Debug, Deserialize)]
pub struct CountRequest {
    #[serde(rename = "sucursalId")]
    pub branch_id: BranchId,
    #[serde(rename = "conteos", default)]
    pub counts: Vec<CountEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountAdjustment {
    #[serde(rename = "productoId")]
    pub product_id: ProductId,
    #[serde(rename = "productoNombre")]
    pub product_name: String,
    pub actual: i64,
    pub contado: i64,
    pub diferencia: i64,
}

/// Compares counted quantities with recorded stock at one branch.
///
/// Walks the catalogue in order; products that were not counted are
/// skipped, counted products with no stock row have `actual = 0`. Counts for
/// products missing from the catalogue are ignored.
pub fn reconcile_counts(
    branch_id: BranchId,
    products: &ProductMap,
    stock: &[StockRow],
    counts: &[CountEntry],
) -> Vec<CountAdjustment> {
    let on_hand: HashMap<ProductId, i64> = stock
        .iter()
        .filter(|s| s.branch_id == branch_id)
        .fold(HashMap::new(), |mut acc, s| {
            *acc.entry(s.product_id).or_insert(0) += i64::from(s.quantity);
            acc
        });
    // Last count for a product wins.
    let counted: HashMap<ProductId, i64> = counts.iter().map(|c| (c.product_id, c.counted)).collect();

    products
        .values()
        .filter_map(|p| {
            let contado = *counted.get(&p.id)?;
            let actual = on_hand.get(&p.id).copied().unwrap_or(0);
            Some(CountAdjustment {
                product_id: p.id,
                product_name: p.display_name().to_string(),
                actual,
                contado,
                diferencia: contado - actual,
            })
        })
        .collect()
}

// ── Movements ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct MovementView {
    #[serde(flatten)]
    pub movement: Movement,
    #[serde(rename = "productoNombre")]
    pub product_name: String,
    #[serde(rename = "origenNombre")]
    pub origin_name: Option<String>,
    #[serde(rename = "destinoNombre")]
    pub destination_name: Option<String>,
}

pub fn describe_movements(movements: Vec<Movement>, products: &ProductMap, branches: &BranchMap) -> Vec<MovementView> {
    movements
        .into_iter()
        .map(|m| MovementView {
            product_name: products.name_or(m.product_id, "Producto"),
            origin_name: m.origin_id.map(|id| branches.name_or(id, "Sucursal")),
            destination_name: m.destination_id.map(|id| branches.name_or(id, "Sucursal")),
            movement: m,
        })
        .collect()
}

/// Distinct movement types from raw `kind` values, in declaration order.
/// Values that are not a known type are skipped.
pub fn movement_kinds<S: AsRef<str>>(raw: &[S]) -> Vec<MovementKind> {
    let mut kinds: Vec<MovementKind> = raw.iter().filter_map(|k| k.as_ref().parse().ok()).collect();
    kinds.sort();
    kinds.dedup();
    kinds
}
