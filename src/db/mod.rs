use chrono::Utc;
use sqlx::{PgConnection, PgPool};

use crate::error::{AppError, AppResult};
use crate::models::*;

// ── Brands ────────────────────────────────────────────────────────────────────

pub async fn fetch_all_brands(pool: &PgPool) -> AppResult<Vec<Brand>> {
    let brands = sqlx::query_as::<_, Brand>("SELECT id, name FROM brands ORDER BY name ASC")
        .fetch_all(pool)
        .await?;
    Ok(brands)
}

pub async fn fetch_brand_by_id(pool: &PgPool, id: BrandId) -> AppResult<Brand> {
    sqlx::query_as::<_, Brand>("SELECT id, name FROM brands WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Brand {} not found", id)))
}

pub async fn insert_brand(pool: &PgPool, name: &str) -> AppResult<Brand> {
    sqlx::query_as::<_, Brand>("INSERT INTO brands (name) VALUES ($1) RETURNING id, name")
        .bind(name)
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::from_constraint(e, "Brand"))
}

pub async fn update_brand(pool: &PgPool, id: BrandId, name: &str) -> AppResult<Brand> {
    sqlx::query_as::<_, Brand>("UPDATE brands SET name = $1 WHERE id = $2 RETURNING id, name")
        .bind(name)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::from_constraint(e, "Brand"))?
        .ok_or_else(|| AppError::NotFound(format!("Brand {} not found", id)))
}

/// Fails with 400 while products still reference the brand.
pub async fn delete_brand(pool: &PgPool, id: BrandId) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM brands WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| AppError::from_constraint(e, "Brand"))?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Brand {} not found", id)));
    }
    Ok(())
}

// ── Products ──────────────────────────────────────────────────────────────────

const PRODUCT_COLUMNS: &str = "id, name, brand_id, description, active";

pub async fn fetch_all_products(pool: &PgPool) -> AppResult<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name ASC, id ASC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(products)
}

pub async fn fetch_product_by_id(pool: &PgPool, id: ProductId) -> AppResult<Product> {
    sqlx::query_as::<_, Product>(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))
}

pub async fn insert_product(pool: &PgPool, product: &NewProduct) -> AppResult<Product> {
    sqlx::query_as::<_, Product>(&format!(
        r#"
        INSERT INTO products (name, brand_id, description, active)
        VALUES ($1, $2, $3, $4)
        RETURNING {PRODUCT_COLUMNS}
        "#
    ))
    .bind(&product.name)
    .bind(product.brand_id)
    .bind(&product.description)
    .bind(product.active)
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::from_constraint(e, "Product"))
}

pub async fn update_product(pool: &PgPool, id: ProductId, product: &NewProduct) -> AppResult<Product> {
    sqlx::query_as::<_, Product>(&format!(
        r#"
        UPDATE products
        SET name        = $1,
            brand_id    = $2,
            description = $3,
            active      = $4,
            updated_at  = $5
        WHERE id = $6
        RETURNING {PRODUCT_COLUMNS}
        "#
    ))
    .bind(&product.name)
    .bind(product.brand_id)
    .bind(&product.description)
    .bind(product.active)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::from_constraint(e, "Product"))?
    .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))
}

/// Removes the product together with its lots, assignments and movements.
pub async fn delete_product(pool: &PgPool, id: ProductId) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Product {} not found", id)));
    }
    Ok(())
}

// ── Branches ──────────────────────────────────────────────────────────────────

pub async fn fetch_all_branches(pool: &PgPool) -> AppResult<Vec<Branch>> {
    let branches = sqlx::query_as::<_, Branch>("SELECT id, name, address FROM branches ORDER BY id ASC")
        .fetch_all(pool)
        .await?;
    Ok(branches)
}

pub async fn fetch_branch_by_id(pool: &PgPool, id: BranchId) -> AppResult<Branch> {
    sqlx::query_as::<_, Branch>("SELECT id, name, address FROM branches WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Branch {} not found", id)))
}

pub async fn insert_branch(pool: &PgPool, name: &str, address: &str) -> AppResult<Branch> {
    let branch = sqlx::query_as::<_, Branch>(
        "INSERT INTO branches (name, address) VALUES ($1, $2) RETURNING id, name, address",
    )
    .bind(name)
    .bind(address)
    .fetch_one(pool)
    .await?;
    Ok(branch)
}

pub async fn update_branch(pool: &PgPool, id: BranchId, name: &str, address: &str) -> AppResult<Branch> {
    sqlx::query_as::<_, Branch>(
        "UPDATE branches SET name = $1, address = $2 WHERE id = $3 RETURNING id, name, address",
    )
    .bind(name)
    .bind(address)
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Branch {} not found", id)))
}

pub async fn delete_branch(pool: &PgPool, id: BranchId) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM branches WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Branch {} not found", id)));
    }
    Ok(())
}

// ── Lots ──────────────────────────────────────────────────────────────────────

const LOT_COLUMNS: &str =
    "id, product_id, batch_code, expiration_date, quantity, notification_enabled, discarded";

/// Lots ordered by expiration date, soonest first. Status filtering depends
/// on "today" and happens after classification.
pub async fn fetch_lots(pool: &PgPool, filters: &LotFilters) -> AppResult<Vec<Lot>> {
    let lots = sqlx::query_as::<_, Lot>(&format!(
        r#"
        SELECT {LOT_COLUMNS}
        FROM lots
        WHERE ($1::bigint IS NULL OR product_id = $1)
          AND ($2::boolean OR NOT discarded)
        ORDER BY expiration_date ASC, id ASC
        "#
    ))
    .bind(filters.product_id)
    .bind(filters.include_discarded)
    .fetch_all(pool)
    .await?;
    Ok(lots)
}

pub async fn fetch_lot_by_id(pool: &PgPool, id: LotId) -> AppResult<Lot> {
    sqlx::query_as::<_, Lot>(&format!("SELECT {LOT_COLUMNS} FROM lots WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Lot {} not found", id)))
}

pub async fn insert_lot(pool: &PgPool, lot: &NewLot) -> AppResult<Lot> {
    sqlx::query_as::<_, Lot>(&format!(
        r#"
        INSERT INTO lots (product_id, batch_code, expiration_date, quantity, notification_enabled)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {LOT_COLUMNS}
        "#
    ))
    .bind(lot.product_id)
    .bind(&lot.batch_code)
    .bind(lot.expiration_date)
    .bind(lot.quantity)
    .bind(lot.notification_enabled)
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::from_constraint(e, "Lot"))
}

pub async fn set_lot_notification(pool: &PgPool, id: LotId, enabled: bool) -> AppResult<Lot> {
    sqlx::query_as::<_, Lot>(&format!(
        "UPDATE lots SET notification_enabled = $1 WHERE id = $2 RETURNING {LOT_COLUMNS}"
    ))
    .bind(enabled)
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Lot {} not found", id)))
}

pub async fn set_lot_discarded(pool: &PgPool, id: LotId, discarded: bool) -> AppResult<Lot> {
    sqlx::query_as::<_, Lot>(&format!(
        "UPDATE lots SET discarded = $1 WHERE id = $2 RETURNING {LOT_COLUMNS}"
    ))
    .bind(discarded)
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Lot {} not found", id)))
}

pub async fn delete_lot(pool: &PgPool, id: LotId) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM lots WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Lot {} not found", id)));
    }
    Ok(())
}

// ── Lot ↔ branch assignments ──────────────────────────────────────────────────

pub async fn fetch_all_lot_branches(pool: &PgPool) -> AppResult<Vec<LotBranch>> {
    let rows = sqlx::query_as::<_, LotBranch>(
        "SELECT id, lot_id, branch_id, quantity FROM lot_branches ORDER BY lot_id ASC, branch_id ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn insert_lot_branch(pool: &PgPool, row: &NewLotBranch) -> AppResult<LotBranch> {
    sqlx::query_as::<_, LotBranch>(
        r#"
        INSERT INTO lot_branches (lot_id, branch_id, quantity)
        VALUES ($1, $2, $3)
        RETURNING id, lot_id, branch_id, quantity
        "#,
    )
    .bind(row.lot_id)
    .bind(row.branch_id)
    .bind(row.quantity)
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::from_constraint(e, "Lot assignment"))
}

pub async fn delete_lot_branch(pool: &PgPool, id: LotBranchId) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM lot_branches WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Lot assignment {} not found", id)));
    }
    Ok(())
}

// ── Stock ─────────────────────────────────────────────────────────────────────

pub async fn fetch_stock(pool: &PgPool) -> AppResult<Vec<StockRow>> {
    let rows = sqlx::query_as::<_, StockRow>(
        "SELECT id, product_id, branch_id, quantity FROM stock ORDER BY branch_id ASC, product_id ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

// ── Movements ─────────────────────────────────────────────────────────────────

const MOVEMENT_COLUMNS: &str =
    "id, kind, product_id, lot_id, origin_id, destination_id, quantity, reason, moved_at";

/// Full movement history matching the optional product / type filters,
/// newest first.
pub async fn fetch_movements(pool: &PgPool, filters: &MovementFilters) -> AppResult<Vec<Movement>> {
    let movements = sqlx::query_as::<_, Movement>(&format!(
        r#"
        SELECT {MOVEMENT_COLUMNS}
        FROM movements
        WHERE ($1::bigint IS NULL OR product_id = $1)
          AND ($2::text IS NULL OR kind = $2)
        ORDER BY moved_at DESC, id DESC
        "#
    ))
    .bind(filters.product_id)
    .bind(filters.kind_label())
    .fetch_all(pool)
    .await?;
    Ok(movements)
}

/// Raw `kind` values present anywhere in the history.
pub async fn fetch_movement_kinds(pool: &PgPool) -> AppResult<Vec<String>> {
    let kinds = sqlx::query_scalar::<_, String>("SELECT DISTINCT kind FROM movements")
        .fetch_all(pool)
        .await?;
    Ok(kinds)
}

async fn insert_movement(
    conn: &mut PgConnection,
    movement: &NewMovement,
    product_id: ProductId,
) -> AppResult<Movement> {
    sqlx::query_as::<_, Movement>(&format!(
        r#"
        INSERT INTO movements (kind, product_id, lot_id, origin_id, destination_id, quantity, reason, moved_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {MOVEMENT_COLUMNS}
        "#
    ))
    .bind(movement.kind.as_str())
    .bind(product_id)
    .bind(movement.lot_id)
    .bind(movement.origin_id)
    .bind(movement.destination_id)
    .bind(movement.quantity)
    .bind(&movement.reason)
    .bind(movement.moved_at.unwrap_or_else(Utc::now))
    .fetch_one(conn)
    .await
    .map_err(|e| AppError::from_constraint(e, "Movement"))
}

/// Records a non-transfer movement without touching stock.
pub async fn record_movement(pool: &PgPool, movement: &NewMovement, product_id: ProductId) -> AppResult<Movement> {
    let mut conn = pool.acquire().await?;
    insert_movement(&mut *conn, movement, product_id).await
}

/// Moves lot quantity from the origin branch to the destination branch and
/// records the movement, all in one transaction.
pub async fn record_transfer(pool: &PgPool, movement: &NewMovement, product_id: ProductId) -> AppResult<Movement> {
    let (Some(lot_id), Some(origin), Some(destination)) =
        (movement.lot_id, movement.origin_id, movement.destination_id)
    else {
        return Err(AppError::BadRequest(
            "a transfer requires loteId, origenId and destinoId".to_string(),
        ));
    };

    let mut tx = pool.begin().await?;

    let available: Option<i32> = sqlx::query_scalar(
        "SELECT quantity FROM lot_branches WHERE lot_id = $1 AND branch_id = $2 FOR UPDATE",
    )
    .bind(lot_id)
    .bind(origin)
    .fetch_optional(&mut *tx)
    .await?;
    check_available(available, movement.quantity)?;

    sqlx::query("UPDATE lot_branches SET quantity = quantity - $1 WHERE lot_id = $2 AND branch_id = $3")
        .bind(movement.quantity)
        .bind(lot_id)
        .bind(origin)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO lot_branches (lot_id, branch_id, quantity)
        VALUES ($1, $2, $3)
        ON CONFLICT (lot_id, branch_id)
        DO UPDATE SET quantity = lot_branches.quantity + EXCLUDED.quantity
        "#,
    )
    .bind(lot_id)
    .bind(destination)
    .bind(movement.quantity)
    .execute(&mut *tx)
    .await
    .map_err(|e| AppError::from_constraint(e, "Destination branch"))?;

    let recorded = insert_movement(&mut *tx, movement, product_id).await?;
    tx.commit().await?;

    Ok(recorded)
}

// ── Counts ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, serde::Serialize, sqlx::FromRow)]
pub struct TableCounts {
    pub brands: i64,
    pub products: i64,
    pub branches: i64,
    pub lots: i64,
    pub assignments: i64,
}

pub async fn count_rows(pool: &PgPool) -> AppResult<TableCounts> {
    let counts = sqlx::query_as::<_, TableCounts>(
        r#"
        SELECT (SELECT COUNT(*) FROM brands)       AS brands,
               (SELECT COUNT(*) FROM products)     AS products,
               (SELECT COUNT(*) FROM branches)     AS branches,
               (SELECT COUNT(*) FROM lots)         AS lots,
               (SELECT COUNT(*) FROM lot_branches) AS assignments
        "#,
    )
    .fetch_one(pool)
    .await?;
    Ok(counts)
}
