use chrono::{Duration, NaiveDate};
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use tracing::info;

use crate::error::AppResult;
use crate::models::{Branch, Brand, Lot, Product};

static BRANDS: &[&str] = &[
    "La Serenísima",
    "Arcor",
    "Molto",
    "Marolio",
    "Sancor",
    "Natura",
    "Knorr",
    "Bimbo",
    "Coca-Cola",
    "Ledesma",
];

static BRANCHES: &[(&str, &str)] = &[
    ("Sucursal Centro", "Av. Rivadavia 1200"),
    ("Sucursal Norte", "Av. Cabildo 2450"),
    ("Sucursal Sur", "Av. Mitre 780"),
];

static PRODUCTS: &[(&str, &str)] = &[
    ("Leche entera", "Sachet 1 L"),
    ("Yogur bebible", "Frutilla 900 g"),
    ("Queso cremoso", "Horma 500 g"),
    ("Manteca", "Pan 200 g"),
    ("Fideos tirabuzón", "Paquete 500 g"),
    ("Arroz largo fino", "Paquete 1 kg"),
    ("Aceite de girasol", "Botella 1,5 L"),
    ("Pan lactal", "Bolsa 390 g"),
    ("Galletitas de agua", "Paquete 3 x 100 g"),
    ("Azúcar", "Paquete 1 kg"),
    ("Caldo de verdura", "Caja 12 cubos"),
    ("Gaseosa cola", "Botella 2,25 L"),
    ("Dulce de leche", "Pote 400 g"),
    ("Puré de tomate", "Caja 520 g"),
];

#[derive(Debug, Clone, Copy)]
pub struct SeedParams {
    pub products: usize,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SeedSummary {
    pub brands: usize,
    pub branches: usize,
    pub products: usize,
    pub lots: usize,
    pub assignments: usize,
}

fn random_batch_code(rng: &mut impl Rng) -> String {
    rng.sample_iter(&Alphanumeric).take(8).map(char::from).collect()
}

/// Expirations spread from three weeks ago to four months ahead so every
/// status shows up in a fresh demo.
fn random_expiration(rng: &mut impl Rng, today: NaiveDate) -> NaiveDate {
    today + Duration::days(rng.gen_range(-21..=120))
}

/// Populates the catalogue with demo data in a single transaction.
///
/// Brands are upserted by name and the demo branches are only created when
/// no branch exists yet, so seeding twice adds products and lots but does
/// not duplicate the reference data.
pub async fn seed_demo(pool: &PgPool, params: SeedParams, today: NaiveDate) -> AppResult<SeedSummary> {
    info!("Seeding {} demo products...", params.products);

    // StdRng is Send, so it can be held across await points
    let mut rng = StdRng::from_entropy();
    let mut tx = pool.begin().await?;

    let brands = seed_brands(&mut *tx).await?;
    let branches = seed_branches(&mut *tx).await?;
    let products = seed_products(&mut *tx, &mut rng, &brands, params.products).await?;
    let lots = seed_lots(&mut *tx, &mut rng, &products, today).await?;
    let assignments = seed_assignments(&mut *tx, &mut rng, &lots, &branches).await?;

    tx.commit().await?;

    let summary = SeedSummary {
        brands: brands.len(),
        branches: branches.len(),
        products: products.len(),
        lots: lots.len(),
        assignments,
    };
    info!(?summary, "Seeding complete");
    Ok(summary)
}

async fn seed_brands(conn: &mut PgConnection) -> AppResult<Vec<Brand>> {
    let names: Vec<String> = BRANDS.iter().map(|b| b.to_string()).collect();
    let brands = sqlx::query_as::<_, Brand>(
        r#"
        INSERT INTO brands (name)
        SELECT * FROM UNNEST($1::text[])
        ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
        RETURNING id, name
        "#,
    )
    .bind(&names)
    .fetch_all(conn)
    .await?;
    Ok(brands)
}

async fn seed_branches(conn: &mut PgConnection) -> AppResult<Vec<Branch>> {
    let existing = sqlx::query_as::<_, Branch>("SELECT id, name, address FROM branches ORDER BY id ASC")
        .fetch_all(&mut *conn)
        .await?;
    if !existing.is_empty() {
        return Ok(existing);
    }

    let (names, addresses): (Vec<String>, Vec<String>) =
        BRANCHES.iter().map(|(n, a)| (n.to_string(), a.to_string())).unzip();
    let branches = sqlx::query_as::<_, Branch>(
        r#"
        INSERT INTO branches (name, address)
        SELECT * FROM UNNEST($1::text[], $2::text[])
        RETURNING id, name, address
        "#,
    )
    .bind(&names)
    .bind(&addresses)
    .fetch_all(conn)
    .await?;
    Ok(branches)
}

async fn seed_products(
    conn: &mut PgConnection,
    rng: &mut StdRng,
    brands: &[Brand],
    count: usize,
) -> AppResult<Vec<Product>> {
    if brands.is_empty() || count == 0 {
        return Ok(Vec::new());
    }

    let mut names = Vec::with_capacity(count);
    let mut brand_ids = Vec::with_capacity(count);
    let mut descriptions = Vec::with_capacity(count);

    for i in 0..count {
        let (name, description) = PRODUCTS[i % PRODUCTS.len()];
        let Some(brand) = brands.choose(rng) else { break };
        // Later rounds through the name list get a numbered variant
        let round = i / PRODUCTS.len();
        names.push(if round == 0 {
            name.to_string()
        } else {
            format!("{} {}", name, round + 1)
        });
        brand_ids.push(brand.id.0);
        descriptions.push(description.to_string());
    }

    let products = sqlx::query_as::<_, Product>(
        r#"
        INSERT INTO products (name, brand_id, description)
        SELECT * FROM UNNEST($1::text[], $2::bigint[], $3::text[])
        RETURNING id, name, brand_id, description, active
        "#,
    )
    .bind(&names)
    .bind(&brand_ids)
    .bind(&descriptions)
    .fetch_all(conn)
    .await?;
    Ok(products)
}

async fn seed_lots(
    conn: &mut PgConnection,
    rng: &mut StdRng,
    products: &[Product],
    today: NaiveDate,
) -> AppResult<Vec<Lot>> {
    let mut product_ids = Vec::new();
    let mut codes = Vec::new();
    let mut expirations = Vec::new();
    let mut quantities: Vec<i32> = Vec::new();
    let mut notify = Vec::new();

    for product in products {
        for _ in 0..rng.gen_range(1..=3) {
            product_ids.push(product.id.0);
            codes.push(random_batch_code(rng));
            expirations.push(random_expiration(rng, today));
            quantities.push(rng.gen_range(10..=200));
            notify.push(rng.gen_bool(0.85));
        }
    }

    if product_ids.is_empty() {
        return Ok(Vec::new());
    }

    let lots = sqlx::query_as::<_, Lot>(
        r#"
        INSERT INTO lots (product_id, batch_code, expiration_date, quantity, notification_enabled)
        SELECT * FROM UNNEST($1::bigint[], $2::text[], $3::date[], $4::int[], $5::boolean[])
        RETURNING id, product_id, batch_code, expiration_date, quantity, notification_enabled, discarded
        "#,
    )
    .bind(&product_ids)
    .bind(&codes)
    .bind(&expirations)
    .bind(&quantities)
    .bind(&notify)
    .fetch_all(conn)
    .await?;
    Ok(lots)
}

/// Splits each lot's quantity between one or two random branches.
async fn seed_assignments(
    conn: &mut PgConnection,
    rng: &mut StdRng,
    lots: &[Lot],
    branches: &[Branch],
) -> AppResult<usize> {
    let mut lot_ids = Vec::new();
    let mut branch_ids = Vec::new();
    let mut quantities: Vec<i32> = Vec::new();

    for lot in lots {
        let spread = rng.gen_range(1..=2).min(branches.len());
        let chosen: Vec<&Branch> = branches.choose_multiple(rng, spread).collect();
        let [first, rest @ ..] = chosen.as_slice() else { continue };

        let mut remaining = lot.quantity;
        for branch in rest {
            let share = remaining / 2;
            if share == 0 {
                continue;
            }
            lot_ids.push(lot.id.0);
            branch_ids.push(branch.id.0);
            quantities.push(share);
            remaining -= share;
        }
        lot_ids.push(lot.id.0);
        branch_ids.push(first.id.0);
        quantities.push(remaining);
    }

    if lot_ids.is_empty() {
        return Ok(0);
    }

    let result = sqlx::query(
        r#"
        INSERT INTO lot_branches (lot_id, branch_id, quantity)
        SELECT * FROM UNNEST($1::bigint[], $2::bigint[], $3::int[])
        ON CONFLICT (lot_id, branch_id) DO NOTHING
        "#,
    )
    .bind(&lot_ids)
    .bind(&branch_ids)
    .bind(&quantities)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn batch_codes_are_eight_alphanumerics() {
        let mut rng = rng();
        for _ in 0..20 {
            let code = random_batch_code(&mut rng);
            assert_eq!(code.len(), 8);
            assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn expirations_stay_in_the_demo_window() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let mut rng = rng();
        for _ in 0..200 {
            let d = random_expiration(&mut rng, today);
            let offset = (d - today).num_days();
            assert!((-21..=120).contains(&offset), "offset {offset} out of range");
        }
    }

    #[test]
    fn demo_tables_are_non_empty() {
        assert!(!BRANDS.is_empty());
        assert!(!BRANCHES.is_empty());
        assert!(PRODUCTS.iter().all(|(n, d)| !n.is_empty() && !d.is_empty()));
    }
}
