use serde::{Deserialize, Serialize};

use super::{BranchId, IdRef, LotBranchId, LotId};
use crate::error::{AppError, AppResult};

/// Quantity of one lot held at one branch.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LotBranch {
    pub id: LotBranchId,
    #[serde(rename = "loteId")]
    pub lot_id: LotId,
    #[serde(rename = "sucursalId")]
    pub branch_id: BranchId,
    #[serde(rename = "cantidad")]
    pub quantity: i32,
}

/// Accepts flat ids (`loteId`, `sucursalId`) or nested `lote` / `sucursal`
/// objects as posted by the assignment form.
#[derive(Debug, Deserialize)]
pub struct CreateLotBranch {
    #[serde(rename = "loteId", default)]
    pub lot_id: Option<LotId>,
    #[serde(rename = "lote", default)]
    pub lot: Option<IdRef<LotId>>,
    #[serde(rename = "sucursalId", default)]
    pub branch_id: Option<BranchId>,
    #[serde(rename = "sucursal", default)]
    pub branch: Option<IdRef<BranchId>>,
    #[serde(rename = "cantidad")]
    pub quantity: i32,
}

impl CreateLotBranch {
    pub fn resolved_lot_id(&self) -> Option<LotId> {
        self.lot_id.or(self.lot.map(|l| l.id))
    }

    pub fn resolved_branch_id(&self) -> Option<BranchId> {
        self.branch_id.or(self.branch.map(|b| b.id))
    }

    pub fn validate(&self) -> AppResult<NewLotBranch> {
        let lot_id = self
            .resolved_lot_id()
            .ok_or_else(|| AppError::BadRequest("loteId is required".to_string()))?;
        let branch_id = self
            .resolved_branch_id()
            .ok_or_else(|| AppError::BadRequest("sucursalId is required".to_string()))?;
        if self.quantity <= 0 {
            return Err(AppError::BadRequest("cantidad must be > 0".to_string()));
        }
        Ok(NewLotBranch {
            lot_id,
            branch_id,
            quantity: self.quantity,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewLotBranch {
    pub lot_id: LotId,
    pub branch_id: BranchId,
    pub quantity: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_form_payload_resolves_ids() {
        let c: CreateLotBranch = serde_json::from_str(
            r#"{"id": 0,
                "lote": {"id": 4, "codigoLote": "A1", "producto": {"id": 1}},
                "sucursal": {"id": 2, "nombre": "Centro", "direccion": "Calle 1"},
                "cantidad": 12}"#,
        )
        .unwrap();
        assert_eq!(c.resolved_lot_id(), Some(LotId(4)));
        assert_eq!(c.resolved_branch_id(), Some(BranchId(2)));
        assert_eq!(c.quantity, 12);
    }

    #[test]
    fn missing_ids_resolve_to_none() {
        let c: CreateLotBranch = serde_json::from_str(r#"{"cantidad": 1}"#).unwrap();
        assert_eq!(c.resolved_lot_id(), None);
        assert_eq!(c.resolved_branch_id(), None);
        assert_eq!(c.validate().unwrap_err().to_string(), "loteId is required");
    }

    #[test]
    fn validate_requires_positive_quantity() {
        let c: CreateLotBranch =
            serde_json::from_str(r#"{"loteId": 1, "sucursalId": 2, "cantidad": -4}"#).unwrap();
        assert_eq!(c.validate().unwrap_err().to_string(), "cantidad must be > 0");

        let c: CreateLotBranch =
            serde_json::from_str(r#"{"loteId": 1, "sucursalId": 2, "cantidad": 4}"#).unwrap();
        assert_eq!(
            c.validate().unwrap(),
            NewLotBranch {
                lot_id: LotId(1),
                branch_id: BranchId(2),
                quantity: 4,
            }
        );
    }
}
