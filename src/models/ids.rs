use std::fmt;

use serde::{Deserialize, Serialize};

/// Declares an `i64` primary-key newtype that serializes as a bare number
/// and binds/decodes as `BIGINT`.
macro_rules! typed_id {
    ($($(#[$meta:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(
                Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
                Serialize, Deserialize, sqlx::Type,
            )]
            #[serde(transparent)]
            #[sqlx(transparent)]
            pub struct $name(pub i64);

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    self.0.fmt(f)
                }
            }

            impl From<i64> for $name {
                fn from(raw: i64) -> Self {
                    Self(raw)
                }
            }
        )+
    };
}

typed_id! {
    BrandId,
    ProductId,
    BranchId,
    LotId,
    LotBranchId,
    MovementId,
    /// Stock rows are a derived view; the id is the lowest contributing
    /// lot-branch id and is only stable while that row exists.
    StockId,
}

/// `{"id": 3, ...}` reference as sent by clients that post nested records
/// instead of bare foreign keys. Extra fields are ignored.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct IdRef<T> {
    pub id: T,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_plain_numbers() {
        assert_eq!(serde_json::to_string(&LotId(42)).unwrap(), "42");
        let id: ProductId = serde_json::from_str("7").unwrap();
        assert_eq!(id, ProductId(7));
    }

    #[test]
    fn display_matches_raw_value() {
        assert_eq!(BranchId(12).to_string(), "12");
    }

    #[test]
    fn id_ref_ignores_extra_fields() {
        let r: IdRef<BranchId> =
            serde_json::from_str(r#"{"id": 3, "nombre": "Centro", "direccion": "Av. 6 de Agosto"}"#)
                .unwrap();
        assert_eq!(r.id, BranchId(3));
    }
}
