use serde::{Deserialize, Serialize};

use super::BrandId;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Brand {
    pub id: BrandId,
    #[serde(rename = "nombre")]
    pub name: String,
}

/// Body for both create and full update.
#[derive(Debug, Deserialize)]
pub struct BrandPayload {
    #[serde(rename = "nombre")]
    pub name: String,
}

impl BrandPayload {
    /// Trimmed, non-empty brand name.
    pub fn validated_name(&self) -> AppResult<String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("nombre must not be empty".to_string()));
        }
        Ok(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_trimmed() {
        let p = BrandPayload { name: "  Pil Andina ".into() };
        assert_eq!(p.validated_name().unwrap(), "Pil Andina");
    }

    #[test]
    fn blank_name_is_rejected() {
        let p = BrandPayload { name: "   ".into() };
        assert!(matches!(p.validated_name(), Err(AppError::BadRequest(_))));
    }
}
