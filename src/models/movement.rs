use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{BranchId, IdRef, LotId, MovementId, ProductId};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementKind {
    Entrada,
    Salida,
    Transferencia,
    Ajuste,
}

impl MovementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MovementKind::Entrada => "ENTRADA",
            MovementKind::Salida => "SALIDA",
            MovementKind::Transferencia => "TRANSFERENCIA",
            MovementKind::Ajuste => "AJUSTE",
        }
    }
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown movement type: {0}")]
pub struct UnknownMovementKind(pub String);

impl FromStr for MovementKind {
    type Err = UnknownMovementKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ENTRADA" => Ok(MovementKind::Entrada),
            "SALIDA" => Ok(MovementKind::Salida),
            "TRANSFERENCIA" => Ok(MovementKind::Transferencia),
            "AJUSTE" => Ok(MovementKind::Ajuste),
            _ => Err(UnknownMovementKind(s.to_string())),
        }
    }
}

impl TryFrom<String> for MovementKind {
    type Error = UnknownMovementKind;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Movement {
    pub id: MovementId,
    #[serde(rename = "tipo")]
    #[sqlx(try_from = "String")]
    pub kind: MovementKind,
    #[serde(rename = "productoId")]
    pub product_id: ProductId,
    #[serde(rename = "loteId")]
    pub lot_id: Option<LotId>,
    #[serde(rename = "origenId")]
    pub origin_id: Option<BranchId>,
    #[serde(rename = "destinoId")]
    pub destination_id: Option<BranchId>,
    #[serde(rename = "cantidad")]
    pub quantity: i32,
    #[serde(rename = "motivo")]
    pub reason: Option<String>,
    #[serde(rename = "fechaMovimiento")]
    pub moved_at: DateTime<Utc>,
}

// ── Request payloads ─────────────────────────────────────────────────────────

/// The transfer form posts nested `lote` / `producto` / `origen` / `destino`
/// records and `tipoMovimiento`; flat ids and `tipo` are accepted as well.
#[derive(Debug, Deserialize)]
pub struct CreateMovement {
    #[serde(rename = "tipo", alias = "tipoMovimiento")]
    pub kind: MovementKind,
    #[serde(rename = "productoId", default)]
    pub product_id: Option<ProductId>,
    #[serde(rename = "producto", default)]
    pub product: Option<IdRef<ProductId>>,
    #[serde(rename = "loteId", default)]
    pub lot_id: Option<LotId>,
    #[serde(rename = "lote", default)]
    pub lot: Option<IdRef<LotId>>,
    #[serde(rename = "origenId", default)]
    pub origin_id: Option<BranchId>,
    #[serde(rename = "origen", default)]
    pub origin: Option<IdRef<BranchId>>,
    #[serde(rename = "destinoId", default)]
    pub destination_id: Option<BranchId>,
    #[serde(rename = "destino", default)]
    pub destination: Option<IdRef<BranchId>>,
    #[serde(rename = "cantidad")]
    pub quantity: i32,
    #[serde(rename = "motivo", default)]
    pub reason: Option<String>,
    #[serde(rename = "fechaMovimiento", default)]
    pub moved_at: Option<DateTime<Utc>>,
}

/// A movement with every reference resolved to a flat id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMovement {
    pub kind: MovementKind,
    pub product_id: Option<ProductId>,
    pub lot_id: Option<LotId>,
    pub origin_id: Option<BranchId>,
    pub destination_id: Option<BranchId>,
    pub quantity: i32,
    pub reason: Option<String>,
    pub moved_at: Option<DateTime<Utc>>,
}

impl From<CreateMovement> for NewMovement {
    fn from(c: CreateMovement) -> Self {
        Self {
            kind: c.kind,
            product_id: c.product_id.or(c.product.map(|r| r.id)),
            lot_id: c.lot_id.or(c.lot.map(|r| r.id)),
            origin_id: c.origin_id.or(c.origin.map(|r| r.id)),
            destination_id: c.destination_id.or(c.destination.map(|r| r.id)),
            quantity: c.quantity,
            reason: c.reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty()),
            moved_at: c.moved_at,
        }
    }
}

impl NewMovement {
    pub fn is_transfer(&self) -> bool {
        self.kind == MovementKind::Transferencia
    }

    /// Transfers need a lot and two distinct branches; every other type
    /// needs a product or a lot to attribute the movement to.
    pub fn validate(&self) -> AppResult<()> {
        if self.quantity <= 0 {
            return Err(AppError::BadRequest("cantidad must be > 0".to_string()));
        }

        if self.is_transfer() {
            if self.lot_id.is_none() {
                return Err(AppError::BadRequest("a transfer requires loteId".to_string()));
            }
            let (Some(origin), Some(destination)) = (self.origin_id, self.destination_id) else {
                return Err(AppError::BadRequest(
                    "a transfer requires origenId and destinoId".to_string(),
                ));
            };
            if origin == destination {
                return Err(AppError::BadRequest(
                    "origin and destination branches must differ".to_string(),
                ));
            }
        } else if self.product_id.is_none() && self.lot_id.is_none() {
            return Err(AppError::BadRequest("productoId or loteId is required".to_string()));
        }

        Ok(())
    }
}

/// Stock check for a transfer out of one branch. A lot with no row at the
/// origin branch holds nothing there.
pub fn check_available(available: Option<i32>, requested: i32) -> AppResult<()> {
    let available = available.unwrap_or(0);
    if requested > available {
        return Err(AppError::BadRequest(format!(
            "origin branch holds {} units of the lot, cannot transfer {}",
            available, requested
        )));
    }
    Ok(())
}

// ── Query parameters ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct MovementFilters {
    #[serde(rename = "productoId")]
    pub product_id: Option<ProductId>,
    #[serde(rename = "tipo")]
    pub kind: Option<MovementKind>,
}

impl MovementFilters {
    /// The type filter as stored in the `kind` column.
    pub fn kind_label(&self) -> Option<&'static str> {
        self.kind.map(MovementKind::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("transferencia".parse::<MovementKind>().unwrap(), MovementKind::Transferencia);
        assert_eq!(" AJUSTE ".parse::<MovementKind>().unwrap(), MovementKind::Ajuste);
        assert!("DEVOLUCION".parse::<MovementKind>().is_err());
    }

    #[test]
    fn kind_round_trips_through_its_text_form() {
        for kind in [
            MovementKind::Entrada,
            MovementKind::Salida,
            MovementKind::Transferencia,
            MovementKind::Ajuste,
        ] {
            assert_eq!(MovementKind::try_from(kind.as_str().to_string()).unwrap(), kind);
        }
    }

    #[test]
    fn transfer_form_payload_flattens() {
        let c: CreateMovement = serde_json::from_str(
            r#"{
                "id": 0,
                "lote": {"id": 11, "codigoLote": "A1", "cantidad": 40},
                "producto": {"id": 3, "nombre": "Leche"},
                "origen": {"id": 1, "nombre": "Centro", "direccion": "x"},
                "destino": {"id": 2, "nombre": "Sur", "direccion": "y"},
                "cantidad": 5,
                "fechaMovimiento": "2025-01-01T10:00:00Z",
                "tipoMovimiento": "TRANSFERENCIA",
                "motivo": "Transferencia entre sucursales"
            }"#,
        )
        .unwrap();
        let m = NewMovement::from(c);
        assert_eq!(m.kind, MovementKind::Transferencia);
        assert_eq!(m.product_id, Some(ProductId(3)));
        assert_eq!(m.lot_id, Some(LotId(11)));
        assert_eq!(m.origin_id, Some(BranchId(1)));
        assert_eq!(m.destination_id, Some(BranchId(2)));
        assert_eq!(m.reason.as_deref(), Some("Transferencia entre sucursales"));
    }

    fn transfer(origin: Option<i64>, destination: Option<i64>, qty: i32) -> NewMovement {
        NewMovement {
            kind: MovementKind::Transferencia,
            product_id: None,
            lot_id: Some(LotId(1)),
            origin_id: origin.map(BranchId),
            destination_id: destination.map(BranchId),
            quantity: qty,
            reason: None,
            moved_at: None,
        }
    }

    #[test]
    fn transfer_validation() {
        assert!(transfer(Some(1), Some(2), 5).validate().is_ok());
        assert_eq!(
            transfer(Some(1), Some(1), 5).validate().unwrap_err().to_string(),
            "origin and destination branches must differ"
        );
        assert!(transfer(None, Some(2), 5).validate().is_err());
        assert_eq!(
            transfer(Some(1), Some(2), 0).validate().unwrap_err().to_string(),
            "cantidad must be > 0"
        );

        let mut no_lot = transfer(Some(1), Some(2), 5);
        no_lot.lot_id = None;
        assert_eq!(no_lot.validate().unwrap_err().to_string(), "a transfer requires loteId");
    }

    #[test]
    fn transfer_may_take_everything_at_the_origin() {
        assert!(check_available(Some(12), 12).is_ok());
        assert!(check_available(Some(12), 1).is_ok());
    }

    #[test]
    fn transfer_over_origin_stock_is_rejected() {
        let err = check_available(Some(12), 13).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(err.to_string(), "origin branch holds 12 units of the lot, cannot transfer 13");
    }

    #[test]
    fn transfer_from_branch_without_the_lot_is_rejected() {
        let err = check_available(None, 1).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(err.to_string().starts_with("origin branch holds 0 units"));
    }

    #[test]
    fn filters_expose_the_stored_kind_label() {
        let filters: MovementFilters = serde_json::from_str(r#"{"tipo": "TRANSFERENCIA"}"#).unwrap();
        assert_eq!(filters.kind_label(), Some("TRANSFERENCIA"));
        assert_eq!(MovementFilters::default().kind_label(), None);
    }

    #[test]
    fn other_movements_need_product_or_lot() {
        let mut m = transfer(None, None, 3);
        m.kind = MovementKind::Salida;
        assert!(m.validate().is_ok(), "a lot alone is enough");

        m.lot_id = None;
        assert!(m.validate().is_err());

        m.product_id = Some(ProductId(4));
        assert!(m.validate().is_ok());
    }

    #[test]
    fn blank_reason_becomes_none() {
        let c: CreateMovement = serde_json::from_str(
            r#"{"tipo": "ENTRADA", "productoId": 1, "cantidad": 2, "motivo": "   "}"#,
        )
        .unwrap();
        assert_eq!(NewMovement::from(c).reason, None);
    }
}
