use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{IdRef, LotId, ProductId};
use crate::error::{AppError, AppResult};
use crate::expiry::{parse_expiration, ExpiryStatus, Severity};

/// A batch of a product with its own expiration date and quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Lot {
    pub id: LotId,
    #[serde(rename = "productoId")]
    pub product_id: ProductId,
    #[serde(rename = "codigoLote")]
    pub batch_code: String,
    /// Calendar date only, serialized as `YYYY-MM-DD`.
    #[serde(rename = "fechaVencimiento")]
    pub expiration_date: NaiveDate,
    #[serde(rename = "cantidad")]
    pub quantity: i32,
    /// Missing in older payloads; absent means enabled.
    #[serde(rename = "notificacionActiva", default = "default_notify")]
    pub notification_enabled: bool,
    #[serde(rename = "dadoDeBaja", default)]
    pub discarded: bool,
}

fn default_notify() -> bool {
    true
}

/// A lot annotated with its expiry classification for list display.
#[derive(Debug, Clone, Serialize)]
pub struct LotView {
    #[serde(flatten)]
    pub lot: Lot,
    #[serde(rename = "diasRestantes")]
    pub days_remaining: Option<i64>,
    #[serde(rename = "estado")]
    pub status: ExpiryStatus,
    #[serde(rename = "severidad")]
    pub severity: Severity,
}

// ── Request payloads ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateLot {
    #[serde(rename = "productoId", default)]
    pub product_id: Option<ProductId>,
    #[serde(rename = "producto", default)]
    pub product: Option<IdRef<ProductId>>,
    #[serde(rename = "codigoLote")]
    pub batch_code: String,
    /// Kept as text so an unparseable date is reported as a validation
    /// error rather than a generic JSON rejection.
    #[serde(rename = "fechaVencimiento")]
    pub expiration_date: String,
    #[serde(rename = "cantidad")]
    pub quantity: i32,
    #[serde(rename = "notificacionActiva", default)]
    pub notification_enabled: Option<bool>,
}

impl CreateLot {
    pub fn resolved_product_id(&self) -> Option<ProductId> {
        self.product_id.or(self.product.map(|p| p.id))
    }

    /// Required-field checks. Lots that are already expired or close to
    /// expiry are accepted; the caller reports their status.
    pub fn validate(&self) -> AppResult<NewLot> {
        let product_id = self
            .resolved_product_id()
            .ok_or_else(|| AppError::BadRequest("productoId is required".to_string()))?;
        let batch_code = self.batch_code.trim();
        if batch_code.is_empty() {
            return Err(AppError::BadRequest("codigoLote must not be empty".to_string()));
        }
        let expiration_date = parse_expiration(&self.expiration_date).ok_or_else(|| {
            AppError::BadRequest("fechaVencimiento must be a date (YYYY-MM-DD)".to_string())
        })?;
        if self.quantity <= 0 {
            return Err(AppError::BadRequest("cantidad must be > 0".to_string()));
        }

        Ok(NewLot {
            product_id,
            batch_code: batch_code.to_string(),
            expiration_date,
            quantity: self.quantity,
            notification_enabled: self.notification_enabled.unwrap_or(true),
        })
    }
}

/// A lot whose fields passed validation and is ready to insert.
#[derive(Debug, Clone)]
pub struct NewLot {
    pub product_id: ProductId,
    pub batch_code: String,
    pub expiration_date: NaiveDate,
    pub quantity: i32,
    pub notification_enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetFlag {
    #[serde(alias = "notificacionActiva", alias = "dadoDeBaja")]
    pub value: bool,
}

#[derive(Debug, Deserialize, Default)]
pub struct LotFilters {
    #[serde(rename = "productoId")]
    pub product_id: Option<ProductId>,
    /// Restrict to one status label (`expired`, `near-expiry`, `ok`).
    #[serde(rename = "estado")]
    pub status: Option<ExpiryStatus>,
    #[serde(rename = "incluirBaja", default)]
    pub include_discarded: bool,
}

impl LotFilters {
    /// Every lot, discarded ones included.
    pub fn everything() -> Self {
        Self {
            include_discarded: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    #[serde(rename = "fecha", default)]
    pub date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_flags_take_their_defaults() {
        let lot: Lot = serde_json::from_str(
            r#"{"id": 1, "productoId": 2, "codigoLote": "sbGNKeaK",
                "fechaVencimiento": "2025-01-15", "cantidad": 10}"#,
        )
        .unwrap();
        assert!(lot.notification_enabled);
        assert!(!lot.discarded);
        assert_eq!(lot.expiration_date, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
    }

    #[test]
    fn serializes_with_wire_names() {
        let lot = Lot {
            id: LotId(5),
            product_id: ProductId(2),
            batch_code: "L-01".into(),
            expiration_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            quantity: 3,
            notification_enabled: false,
            discarded: false,
        };
        let v = serde_json::to_value(&lot).unwrap();
        assert_eq!(v["fechaVencimiento"], "2025-06-01");
        assert_eq!(v["notificacionActiva"], false);
        assert_eq!(v["productoId"], 2);
    }

    #[test]
    fn create_lot_accepts_nested_product() {
        let c: CreateLot = serde_json::from_str(
            r#"{"producto": {"id": 8}, "codigoLote": "X", "fechaVencimiento": "2025-10-30", "cantidad": 1}"#,
        )
        .unwrap();
        assert_eq!(c.resolved_product_id(), Some(ProductId(8)));
        assert_eq!(c.notification_enabled, None);
    }

    fn create(body: &str) -> CreateLot {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn validate_builds_new_lot() {
        let lot = create(
            r#"{"productoId": 3, "codigoLote": " A-17 ", "fechaVencimiento": "2025-02-01", "cantidad": 12}"#,
        )
        .validate()
        .unwrap();
        assert_eq!(lot.product_id, ProductId(3));
        assert_eq!(lot.batch_code, "A-17");
        assert_eq!(lot.expiration_date, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        assert!(lot.notification_enabled);
    }

    #[test]
    fn validate_rejects_missing_fields() {
        let err = create(r#"{"codigoLote": "A", "fechaVencimiento": "2025-02-01", "cantidad": 1}"#)
            .validate()
            .unwrap_err();
        assert_eq!(err.to_string(), "productoId is required");

        let err = create(r#"{"productoId": 1, "codigoLote": "  ", "fechaVencimiento": "2025-02-01", "cantidad": 1}"#)
            .validate()
            .unwrap_err();
        assert_eq!(err.to_string(), "codigoLote must not be empty");

        let err = create(r#"{"productoId": 1, "codigoLote": "A", "fechaVencimiento": "", "cantidad": 1}"#)
            .validate()
            .unwrap_err();
        assert!(err.to_string().starts_with("fechaVencimiento"));

        let err = create(r#"{"productoId": 1, "codigoLote": "A", "fechaVencimiento": "2025-02-01", "cantidad": 0}"#)
            .validate()
            .unwrap_err();
        assert_eq!(err.to_string(), "cantidad must be > 0");
    }

    #[test]
    fn validate_keeps_explicit_mute() {
        let lot = create(
            r#"{"productoId": 1, "codigoLote": "A", "fechaVencimiento": "2020-01-01",
                "cantidad": 1, "notificacionActiva": false}"#,
        )
        .validate()
        .unwrap();
        assert!(!lot.notification_enabled);
    }

    #[test]
    fn everything_keeps_discarded_lots() {
        let all = LotFilters::everything();
        assert!(all.include_discarded);
        assert_eq!(all.product_id, None);
        assert_eq!(all.status, None);
        assert!(!LotFilters::default().include_discarded);
    }

    #[test]
    fn set_flag_accepts_field_names() {
        let f: SetFlag = serde_json::from_str(r#"{"notificacionActiva": false}"#).unwrap();
        assert!(!f.value);
        let f: SetFlag = serde_json::from_str(r#"{"value": true}"#).unwrap();
        assert!(f.value);
    }
}
