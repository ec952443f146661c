//! `GET /api/products/{id}/price-comparison`.
//!
//! Offers are simulated, not fetched from retailers. A cached set in
//! `product_prices` wins over generation; otherwise a fresh set is drawn
//! from the fixed retailer table and, when `price_cache_write` is on,
//! written back for later requests.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;
use comparex_core::{
    pricing::{simulate_comparison, thread_draw},
    OfferSource, PriceComparison, PriceOffer, Product, RETAILERS,
};

use crate::middleware::RequestId;

use super::{
    map_core_error, map_db_error, map_product_error, parse_product_id, ApiError, ApiResponse,
    AppState, ResponseMeta,
};

pub(super) async fn price_comparison(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(raw_id): Path<String>,
) -> Result<Json<ApiResponse<PriceComparison>>, ApiError> {
    let rid = &req_id.0;
    let id = parse_product_id(rid, &raw_id)?;

    let product = comparex_db::get_product(&state.pool, id)
        .await
        .map_err(|e| map_product_error(rid.clone(), id, &e))?;

    let cached = comparex_db::list_product_prices(&state.pool, id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    let comparison = if cached.is_empty() {
        let generated = generate(&product).map_err(|e| map_core_error(rid.clone(), &e))?;
        if state.price_cache_write {
            write_through(&state, id, &generated.prices).await;
        }
        generated
    } else {
        let offers: Vec<PriceOffer> = cached.into_iter().map(PriceOffer::from).collect();
        PriceComparison::assemble(&product, offers, OfferSource::Cached, Utc::now())
            .map_err(|e| map_core_error(rid.clone(), &e))?
    };

    tracing::info!(
        product_id = id,
        source = ?comparison.source,
        best_platform = %comparison.best_price.platform,
        best_price = comparison.best_price.price,
        savings = comparison.savings,
        "price comparison served"
    );

    Ok(Json(ApiResponse {
        data: comparison,
        meta: ResponseMeta::new(req_id.0),
    }))
}

// The thread-local RNG is not `Send`, so it must not live across an await.
fn generate(product: &Product) -> Result<PriceComparison, comparex_core::CoreError> {
    let mut draw = thread_draw();
    simulate_comparison(product, &RETAILERS, &mut draw, Utc::now())
}

/// Cache failures are logged; the caller still gets the generated set.
async fn write_through(state: &AppState, product_id: i64, offers: &[PriceOffer]) {
    match comparex_db::replace_product_prices(&state.pool, product_id, offers).await {
        Ok(written) => tracing::debug!(product_id, written, "cached generated offers"),
        Err(e) => tracing::warn!(product_id, error = %e, "failed to cache generated offers"),
    }
}
