use serde::{Deserialize, Serialize};

use super::{BrandId, IdRef, ProductId};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "marcaId")]
    pub brand_id: BrandId,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "activo", default = "default_active")]
    pub active: bool,
}

impl Product {
    /// Case-insensitive substring match over name and description.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }
}

fn default_active() -> bool {
    true
}

// ── Request payloads ─────────────────────────────────────────────────────────

/// Body for both create and full update. The brand may arrive either as
/// `marcaId` or as a nested `marca` object.
#[derive(Debug, Deserialize)]
pub struct ProductPayload {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "marcaId", default)]
    pub brand_id: Option<BrandId>,
    #[serde(rename = "marca", default)]
    pub brand: Option<IdRef<BrandId>>,
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
    #[serde(rename = "activo", default)]
    pub active: Option<bool>,
}

/// A product payload that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub brand_id: BrandId,
    pub description: String,
    pub active: bool,
}

impl ProductPayload {
    pub fn resolved_brand_id(&self) -> Option<BrandId> {
        self.brand_id.or(self.brand.map(|b| b.id))
    }

    pub fn validate(&self) -> AppResult<NewProduct> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("nombre must not be empty".to_string()));
        }
        let brand_id = self
            .resolved_brand_id()
            .ok_or_else(|| AppError::BadRequest("marcaId is required".to_string()))?;

        Ok(NewProduct {
            name: name.to_string(),
            brand_id,
            description: self.description.as_deref().unwrap_or("").trim().to_string(),
            active: self.active.unwrap_or(true),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make(name: &str, description: &str) -> Product {
        Product {
            id: ProductId(1),
            name: name.to_string(),
            brand_id: BrandId(1),
            description: description.to_string(),
            active: true,
        }
    }

    #[test]
    fn matches_name_case_insensitively() {
        assert!(make("Leche Entera PIL", "").matches("leche"));
        assert!(!make("Leche Entera PIL", "").matches("yogurt"));
    }

    #[test]
    fn matches_description() {
        assert!(make("Galletas", "rellenas de chocolate").matches("Chocolate"));
    }

    #[test]
    fn payload_accepts_flat_brand_id() {
        let p: ProductPayload =
            serde_json::from_str(r#"{"nombre": "Arroz", "marcaId": 4}"#).unwrap();
        assert_eq!(p.resolved_brand_id(), Some(BrandId(4)));
        assert_eq!(p.active, None);
    }

    #[test]
    fn payload_accepts_nested_brand() {
        let p: ProductPayload =
            serde_json::from_str(r#"{"nombre": "Arroz", "marca": {"id": 9, "nombre": "Grano de Oro"}}"#)
                .unwrap();
        assert_eq!(p.resolved_brand_id(), Some(BrandId(9)));
    }

    #[test]
    fn validate_requires_brand() {
        let p: ProductPayload = serde_json::from_str(r#"{"nombre": "Arroz"}"#).unwrap();
        assert_eq!(p.validate().unwrap_err().to_string(), "marcaId is required");
    }

    #[test]
    fn validate_fills_defaults() {
        let p: ProductPayload =
            serde_json::from_str(r#"{"nombre": " Arroz ", "marcaId": 2}"#).unwrap();
        assert_eq!(
            p.validate().unwrap(),
            NewProduct {
                name: "Arroz".into(),
                brand_id: BrandId(2),
                description: String::new(),
                active: true,
            }
        );
    }

    #[test]
    fn product_activo_defaults_true_when_missing() {
        let p: Product =
            serde_json::from_str(r#"{"id": 1, "nombre": "Arroz", "marcaId": 2}"#).unwrap();
        assert!(p.active);
        assert_eq!(p.description, "");
    }
}
