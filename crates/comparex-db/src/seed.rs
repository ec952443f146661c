//! Catalog seeding from `config/catalog.yaml`.

use comparex_core::NewProduct;
use sqlx::PgPool;

use crate::products::{bind_product, UPDATE_ASSIGNMENTS, WRITABLE_COLUMNS};
use crate::DbError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub inserted: usize,
    pub updated: usize,
}

/// Upserts every product, matching existing rows by case-insensitive name.
///
/// All rows are written in a single transaction.
///
/// # Errors
///
/// Returns `DbError` on database query failure; the transaction is rolled
/// back and nothing is written.
pub async fn seed_products(pool: &PgPool, products: &[NewProduct]) -> Result<SeedSummary, DbError> {
    let update_sql = format!(
        "UPDATE products SET {UPDATE_ASSIGNMENTS} \
         WHERE LOWER(name) = LOWER($1) \
         RETURNING id"
    );
    let insert_sql = format!(
        "INSERT INTO products ({WRITABLE_COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, \
                 $10, $11, $12, $13, $14, $15, $16, $17, $18) \
         RETURNING id"
    );

    let mut tx = pool.begin().await?;
    let mut summary = SeedSummary::default();

    for product in products {
        let updated: Option<(i64,)> =
            bind_product(sqlx::query_as::<_, (i64,)>(&update_sql), product)
                .fetch_optional(&mut *tx)
                .await?;

        if updated.is_some() {
            summary.updated += 1;
            continue;
        }

        bind_product(sqlx::query_as::<_, (i64,)>(&insert_sql), product)
            .fetch_one(&mut *tx)
            .await?;
        summary.inserted += 1;
    }

    tx.commit().await?;
    Ok(summary)
}
