use serde::{Deserialize, Serialize};

use super::BranchId;
use crate::error::{AppError, AppResult};

/// A physical store location holding its own stock.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Branch {
    pub id: BranchId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "direccion")]
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct BranchPayload {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "direccion")]
    pub address: String,
}

impl BranchPayload {
    /// Trimmed name and address, both required.
    pub fn validated(&self) -> AppResult<(String, String)> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("nombre must not be empty".to_string()));
        }
        let address = self.address.trim();
        if address.is_empty() {
            return Err(AppError::BadRequest("direccion must not be empty".to_string()));
        }
        Ok((name.to_string(), address.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_is_required() {
        let p = BranchPayload {
            name: "Centro".into(),
            address: " ".into(),
        };
        let err = p.validated().unwrap_err();
        assert_eq!(err.to_string(), "direccion must not be empty");
    }

    #[test]
    fn valid_branch_is_trimmed() {
        let p = BranchPayload {
            name: " Centro ".into(),
            address: "Av. Arce 2150 ".into(),
        };
        assert_eq!(
            p.validated().unwrap(),
            ("Centro".to_string(), "Av. Arce 2150".to_string())
        );
    }
}
