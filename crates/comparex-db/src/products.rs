//! Database operations for the `products` table.

use chrono::{DateTime, Utc};
use comparex_core::{Category, NewProduct, Product, ProductSpecs, SortKey};
use rust_decimal::Decimal;
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::{PgPool, Postgres};

use crate::DbError;

/// Maximum number of rows returned by [`list_trending_products`].
pub const TRENDING_LIMIT: i64 = 10;

const PRODUCT_COLUMNS: &str = "id, name, brand, category, price, original_price, rating, \
     ram, storage, display, battery, processor, camera, gpu, \
     image_url, trending, description, stock, discount, created_at, updated_at";

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `products` table.
///
/// `category` is kept as text here; [`ProductRow::into_product`] checks it
/// against the canonical enumeration.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub brand: Option<String>,
    pub category: String,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub rating: Option<Decimal>,
    pub ram: Option<String>,
    pub storage: Option<String>,
    pub display: Option<String>,
    pub battery: Option<String>,
    pub processor: Option<String>,
    pub camera: Option<String>,
    pub gpu: Option<String>,
    pub image_url: Option<String>,
    pub trending: bool,
    pub description: Option<String>,
    pub stock: i32,
    pub discount: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductRow {
    /// Converts the row into the API product type.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlx`] wrapping a column decode error when the
    /// stored category is not one of the canonical values.
    pub fn into_product(self) -> Result<Product, DbError> {
        let category = self
            .category
            .parse::<Category>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "category".to_string(),
                source: Box::new(e),
            })?;

        Ok(Product {
            id: self.id,
            name: self.name,
            brand: self.brand,
            category,
            price: self.price.into(),
            original_price: self.original_price,
            rating: self.rating,
            specs: ProductSpecs {
                ram: self.ram,
                storage: self.storage,
                display: self.display,
                battery: self.battery,
                processor: self.processor,
                camera: self.camera,
                gpu: self.gpu,
            },
            image_url: self.image_url,
            trending: self.trending,
            description: self.description,
            stock: self.stock,
            discount: self.discount,
        })
    }
}

fn into_products(rows: Vec<ProductRow>) -> Result<Vec<Product>, DbError> {
    rows.into_iter().map(ProductRow::into_product).collect()
}

/// Server-side list filters. Every field is optional; `None` means "no
/// constraint". `sort: None` keeps insertion order (`id ASC`).
#[derive(Debug, Clone, Default)]
pub struct ProductListFilters<'a> {
    pub category: Option<Category>,
    pub search: Option<&'a str>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort: Option<SortKey>,
}

/// `ORDER BY` body for a sort key. Only these fixed strings are ever
/// interpolated into SQL.
fn order_clause(sort: Option<SortKey>) -> &'static str {
    match sort {
        None => "id ASC",
        Some(SortKey::Name) => "LOWER(name) ASC, id ASC",
        Some(SortKey::PriceLow) => "price ASC, id ASC",
        Some(SortKey::PriceHigh) => "price DESC, id ASC",
        Some(SortKey::Rating) => "rating DESC NULLS LAST, id ASC",
    }
}

/// Escapes `LIKE` wildcards so user text matches literally.
fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for ch in search.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// Binds the eighteen writable columns of `product` as `$1..$18`, in
/// `INSERT` column order.
pub(crate) fn bind_product<'q, O>(
    query: QueryAs<'q, Postgres, O, PgArguments>,
    product: &'q NewProduct,
) -> QueryAs<'q, Postgres, O, PgArguments> {
    query
        .bind(&product.name)
        .bind(product.brand.as_deref())
        .bind(product.category.as_str())
        .bind(product.price)
        .bind(product.original_price)
        .bind(product.rating)
        .bind(product.specs.ram.as_deref())
        .bind(product.specs.storage.as_deref())
        .bind(product.specs.display.as_deref())
        .bind(product.specs.battery.as_deref())
        .bind(product.specs.processor.as_deref())
        .bind(product.specs.camera.as_deref())
        .bind(product.specs.gpu.as_deref())
        .bind(product.image_url.as_deref())
        .bind(product.trending)
        .bind(product.description.as_deref())
        .bind(product.stock)
        .bind(product.discount)
}

pub(crate) const WRITABLE_COLUMNS: &str = "name, brand, category, price, original_price, rating, \
     ram, storage, display, battery, processor, camera, gpu, \
     image_url, trending, description, stock, discount";

pub(crate) const UPDATE_ASSIGNMENTS: &str = "name = $1, brand = $2, category = $3, price = $4, \
     original_price = $5, rating = $6, ram = $7, storage = $8, display = $9, \
     battery = $10, processor = $11, camera = $12, gpu = $13, image_url = $14, \
     trending = $15, description = $16, stock = $17, discount = $18, updated_at = NOW()";

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Lists products matching `filters`.
///
/// Search is a case-insensitive substring match on name or brand; the price
/// bounds are inclusive.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails or a row cannot be decoded.
pub async fn list_products(
    pool: &PgPool,
    filters: ProductListFilters<'_>,
) -> Result<Vec<Product>, DbError> {
    let search = filters
        .search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(like_pattern);

    let sql = format!(
        "SELECT {PRODUCT_COLUMNS} FROM products \
         WHERE ($1::TEXT IS NULL OR category = $1) \
           AND ($2::TEXT IS NULL OR name ILIKE $2 OR brand ILIKE $2) \
           AND ($3::NUMERIC IS NULL OR price >= $3) \
           AND ($4::NUMERIC IS NULL OR price <= $4) \
         ORDER BY {}",
        order_clause(filters.sort)
    );

    let rows = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(filters.category.map(Category::as_str))
        .bind(search)
        .bind(filters.min_price)
        .bind(filters.max_price)
        .fetch_all(pool)
        .await?;

    into_products(rows)
}

/// Fetches one product by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row has `id`, or [`DbError::Sqlx`]
/// if the query fails.
pub async fn get_product(pool: &PgPool, id: i64) -> Result<Product, DbError> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
    let row = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)?;

    row.into_product()
}

/// Fetches the products whose ids appear in `ids`, in the order the ids
/// were given. Unknown ids are skipped; repeated ids yield one row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_products_by_ids(pool: &PgPool, ids: &[i64]) -> Result<Vec<Product>, DbError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let sql = format!(
        "SELECT {PRODUCT_COLUMNS} FROM products \
         WHERE id = ANY($1::BIGINT[]) \
         ORDER BY array_position($1::BIGINT[], id)"
    );
    let rows = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(ids)
        .fetch_all(pool)
        .await?;

    into_products(rows)
}

/// Distinct categories present in the catalog, ascending.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_categories(pool: &PgPool) -> Result<Vec<String>, DbError> {
    let categories = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT category FROM products ORDER BY category ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(categories)
}

/// Up to [`TRENDING_LIMIT`] trending products, best rated first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_trending_products(pool: &PgPool) -> Result<Vec<Product>, DbError> {
    let sql = format!(
        "SELECT {PRODUCT_COLUMNS} FROM products \
         WHERE trending \
         ORDER BY rating DESC NULLS LAST, id ASC \
         LIMIT $1"
    );
    let rows = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(TRENDING_LIMIT)
        .fetch_all(pool)
        .await?;

    into_products(rows)
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Inserts a validated product and returns it with its new id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_product(pool: &PgPool, product: &NewProduct) -> Result<Product, DbError> {
    let sql = format!(
        "INSERT INTO products ({WRITABLE_COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, \
                 $10, $11, $12, $13, $14, $15, $16, $17, $18) \
         RETURNING {PRODUCT_COLUMNS}"
    );
    let row = bind_product(sqlx::query_as::<_, ProductRow>(&sql), product)
        .fetch_one(pool)
        .await?;

    row.into_product()
}

/// Replaces every writable column of product `id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row has `id`, or [`DbError::Sqlx`]
/// if the update fails.
pub async fn update_product(
    pool: &PgPool,
    id: i64,
    product: &NewProduct,
) -> Result<Product, DbError> {
    let sql = format!(
        "UPDATE products SET {UPDATE_ASSIGNMENTS} \
         WHERE id = $19 \
         RETURNING {PRODUCT_COLUMNS}"
    );
    let row = bind_product(sqlx::query_as::<_, ProductRow>(&sql), product)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)?;

    row.into_product()
}

/// Deletes product `id` and returns the removed record. Cached offers go
/// with it (`ON DELETE CASCADE`).
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row has `id`, or [`DbError::Sqlx`]
/// if the delete fails.
pub async fn delete_product(pool: &PgPool, id: i64) -> Result<Product, DbError> {
    let sql = format!("DELETE FROM products WHERE id = $1 RETURNING {PRODUCT_COLUMNS}");
    let row = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)?;

    row.into_product()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(category: &str) -> ProductRow {
        ProductRow {
            id: 3,
            name: "Galaxy Tab S9".to_string(),
            brand: Some("Samsung".to_string()),
            category: category.to_string(),
            price: Decimal::from(72_999),
            original_price: Some(Decimal::from(85_999)),
            rating: Some(Decimal::new(45, 1)),
            ram: Some("12GB".to_string()),
            storage: Some("256GB".to_string()),
            display: None,
            battery: Some("8400mAh".to_string()),
            processor: None,
            camera: None,
            gpu: None,
            image_url: None,
            trending: true,
            description: None,
            stock: 12,
            discount: 15,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn row_converts_to_product() {
        let product = row("Tablet").into_product().expect("canonical category");
        assert_eq!(product.category, Category::Tablet);
        assert_eq!(product.specs.battery.as_deref(), Some("8400mAh"));
        assert_eq!(product.stock, 12);
        assert!(product.trending);
    }

    #[test]
    fn row_with_unknown_category_is_a_decode_error() {
        let err = row("tablets").into_product().unwrap_err();
        assert!(
            matches!(err, DbError::Sqlx(sqlx::Error::ColumnDecode { ref index, .. }) if index == "category"),
            "got: {err:?}"
        );
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("galaxy"), "%galaxy%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn default_order_is_insertion_order() {
        assert_eq!(order_clause(None), "id ASC");
        assert_eq!(
            order_clause(Some(SortKey::Rating)),
            "rating DESC NULLS LAST, id ASC"
        );
    }
}
