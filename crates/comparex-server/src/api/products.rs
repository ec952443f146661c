//! Catalog handlers.
//!
//! - `GET    /api/products`           filtered, sorted list
//! - `POST   /api/products`           create
//! - `GET    /api/products/trending`  top-rated trending products
//! - `GET    /api/products/{id}`      one product
//! - `PUT    /api/products/{id}`      full replace
//! - `DELETE /api/products/{id}`      delete
//! - `GET    /api/compare?ids=`       products by id, in request order
//! - `GET    /api/categories`         distinct categories

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use comparex_core::{CategoryFilter, Product, ProductInput, SortKey};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{
    map_core_error, map_db_error, map_product_error, parse_product_id, ApiError, ApiResponse,
    AppState, ResponseMeta,
};

#[derive(Debug, Default, Deserialize)]
pub(super) struct ProductQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    #[serde(rename = "minPrice", alias = "min_price")]
    pub min_price: Option<String>,
    #[serde(rename = "maxPrice", alias = "max_price")]
    pub max_price: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CompareQuery {
    pub ids: Option<String>,
}

/// Blank means "no bound"; anything else must be a decimal.
pub(super) fn parse_price_bound(
    request_id: &str,
    name: &str,
    raw: Option<&str>,
) -> Result<Option<Decimal>, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    raw.parse::<Decimal>().map(Some).map_err(|_| {
        ApiError::new(
            request_id,
            "validation_error",
            format!("{name} must be a number, got '{raw}'"),
        )
    })
}

pub(super) fn parse_category(
    request_id: &str,
    raw: Option<&str>,
) -> Result<CategoryFilter, ApiError> {
    raw.unwrap_or_default()
        .parse::<CategoryFilter>()
        .map_err(|e| ApiError::new(request_id, "validation_error", e.to_string()))
}

/// Unknown sort keys fall back to insertion order.
pub(super) fn parse_sort(raw: Option<&str>) -> Option<SortKey> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    let parsed = SortKey::parse(raw);
    if parsed.is_none() {
        tracing::debug!(sort = raw, "ignoring unknown sort key");
    }
    parsed
}

/// Integer tokens from a comma-separated id list. Malformed tokens are
/// skipped; repeats keep their first position.
pub(super) fn parse_id_list(raw: &str) -> Vec<i64> {
    let mut ids = Vec::new();
    for id in raw
        .split(',')
        .filter_map(|token| token.trim().parse::<i64>().ok())
    {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

fn validated_input(
    request_id: &str,
    body: Result<Json<ProductInput>, JsonRejection>,
) -> Result<comparex_core::NewProduct, ApiError> {
    let Json(input) = body.map_err(|rejection| {
        ApiError::new(request_id, "validation_error", rejection.body_text())
    })?;
    input
        .validate()
        .map_err(|e| map_core_error(request_id.to_owned(), &e))
}

pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ApiResponse<Vec<Product>>>, ApiError> {
    let rid = &req_id.0;
    let category = parse_category(rid, query.category.as_deref())?;
    let min_price = parse_price_bound(rid, "minPrice", query.min_price.as_deref())?;
    let max_price = parse_price_bound(rid, "maxPrice", query.max_price.as_deref())?;

    let data = comparex_db::list_products(
        &state.pool,
        comparex_db::ProductListFilters {
            category: category.as_category(),
            search: query.search.as_deref(),
            min_price,
            max_price,
            sort: parse_sort(query.sort.as_deref()),
        },
    )
    .await
    .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(raw_id): Path<String>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    let rid = &req_id.0;
    let id = parse_product_id(rid, &raw_id)?;

    let data = comparex_db::get_product(&state.pool, id)
        .await
        .map_err(|e| map_product_error(rid.clone(), id, &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn create_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<ProductInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Product>>), ApiError> {
    let rid = &req_id.0;
    let product = validated_input(rid, body)?;

    let created = comparex_db::create_product(&state.pool, &product)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    tracing::info!(product_id = created.id, name = %created.name, "product created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: created,
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

pub(super) async fn update_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(raw_id): Path<String>,
    body: Result<Json<ProductInput>, JsonRejection>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    let rid = &req_id.0;
    let id = parse_product_id(rid, &raw_id)?;
    let product = validated_input(rid, body)?;

    let updated = comparex_db::update_product(&state.pool, id, &product)
        .await
        .map_err(|e| map_product_error(rid.clone(), id, &e))?;

    Ok(Json(ApiResponse {
        data: updated,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn delete_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(raw_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;
    let id = parse_product_id(rid, &raw_id)?;

    let deleted = comparex_db::delete_product(&state.pool, id)
        .await
        .map_err(|e| map_product_error(rid.clone(), id, &e))?;
    tracing::info!(product_id = id, "product deleted");

    Ok(Json(ApiResponse {
        data: serde_json::json!({ "deleted": true, "product": deleted }),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_trending(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<Product>>>, ApiError> {
    let data = comparex_db::list_trending_products(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn compare_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<CompareQuery>,
) -> Result<Json<ApiResponse<Vec<Product>>>, ApiError> {
    let rid = &req_id.0;
    let ids = query.ids.as_deref().map(parse_id_list).unwrap_or_default();
    if ids.is_empty() {
        return Err(ApiError::new(
            rid,
            "bad_request",
            "ids query parameter is required, e.g. ?ids=1,2,3",
        ));
    }

    let data = comparex_db::list_products_by_ids(&state.pool, &ids)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_categories(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let data = comparex_db::list_categories(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
