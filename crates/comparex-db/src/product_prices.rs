//! Cached retailer offers in `product_prices`.

use chrono::{DateTime, Utc};
use comparex_core::PriceOffer;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `product_prices` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PriceOfferRow {
    pub platform: String,
    pub price: i64,
    pub url: String,
    pub in_stock: bool,
    pub delivery: String,
    pub rating: Decimal,
    pub captured_at: DateTime<Utc>,
}

impl From<PriceOfferRow> for PriceOffer {
    fn from(row: PriceOfferRow) -> Self {
        PriceOffer {
            platform: row.platform,
            price: row.price,
            url: row.url,
            in_stock: row.in_stock,
            delivery: row.delivery,
            rating: row.rating,
        }
    }
}

/// Cached offers for `product_id`, cheapest first. Empty when nothing has
/// been cached for the product.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_product_prices(
    pool: &PgPool,
    product_id: i64,
) -> Result<Vec<PriceOfferRow>, DbError> {
    let rows = sqlx::query_as::<_, PriceOfferRow>(
        "SELECT platform, price, url, in_stock, delivery, rating, captured_at \
         FROM product_prices \
         WHERE product_id = $1 \
         ORDER BY price ASC, platform ASC",
    )
    .bind(product_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Replaces the cached offer set for `product_id` with `offers`.
///
/// Runs in one transaction so readers never see a half-written set.
/// Returns the number of rows written.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails; nothing is written.
pub async fn replace_product_prices(
    pool: &PgPool,
    product_id: i64,
    offers: &[PriceOffer],
) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM product_prices WHERE product_id = $1")
        .bind(product_id)
        .execute(&mut *tx)
        .await?;

    for offer in offers {
        sqlx::query(
            "INSERT INTO product_prices \
                 (product_id, platform, price, url, in_stock, delivery, rating) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(product_id)
        .bind(&offer.platform)
        .bind(offer.price)
        .bind(&offer.url)
        .bind(offer.in_stock)
        .bind(&offer.delivery)
        .bind(offer.rating)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(offers.len())
}
