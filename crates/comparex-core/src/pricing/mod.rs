//! Simulated multi-retailer price comparison.
//!
//! Nothing here talks to a real retailer. Quotes are synthesised from the
//! product's base price by drawing a random percentage offset from each
//! retailer's configured interval, then nudging the result to a plausible
//! shelf price (`…00`, `…90`, `…99`). Responses carry `simulated: true` so
//! callers can tell them apart from a live feed.
//!
//! The random draw sits behind [`PriceDraw`] so tests can pin it.

mod retailers;

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::products::Product;
use crate::CoreError;

pub use retailers::{RetailerConfig, RETAILERS};

/// Source of randomness for offer generation.
pub trait PriceDraw {
    /// A percentage in `min..=max`.
    fn percent(&mut self, min: f64, max: f64) -> f64;
    /// A Bernoulli trial succeeding with `probability`.
    fn in_stock(&mut self, probability: f64) -> bool;
}

/// [`PriceDraw`] backed by any [`rand::Rng`].
#[derive(Debug)]
pub struct RngDraw<R>(pub R);

impl<R: Rng> PriceDraw for RngDraw<R> {
    fn percent(&mut self, min: f64, max: f64) -> f64 {
        if min >= max {
            return min;
        }
        self.0.random_range(min..=max)
    }

    fn in_stock(&mut self, probability: f64) -> bool {
        self.0.random_bool(probability.clamp(0.0, 1.0))
    }
}

/// Draw from the thread-local generator.
#[must_use]
pub fn thread_draw() -> RngDraw<rand::rngs::ThreadRng> {
    RngDraw(rand::rng())
}

/// One retailer's quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceOffer {
    pub platform: String,
    pub price: i64,
    pub url: String,
    pub in_stock: bool,
    pub delivery: String,
    pub rating: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferSource {
    /// Read back from the `product_prices` cache table.
    Cached,
    /// Synthesised for this request.
    Generated,
}

/// Ranked offers for one product.
///
/// `prices` is ascending by price, `best_price` is its first element and
/// `savings` is the spread between the last and first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceComparison {
    pub product_id: i64,
    pub product_name: String,
    pub product_brand: Option<String>,
    pub product_image: Option<String>,
    pub base_price: Decimal,
    pub prices: Vec<PriceOffer>,
    pub best_price: PriceOffer,
    pub savings: i64,
    pub source: OfferSource,
    pub simulated: bool,
    pub timestamp: DateTime<Utc>,
}

impl PriceComparison {
    /// Ranks `offers` and wraps them with the product summary.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyRetailerTable`] when `offers` is empty, so
    /// a comparison is either complete or not produced at all, and
    /// [`CoreError::InvalidProduct`] when the product price is not a number.
    pub fn assemble(
        product: &Product,
        mut offers: Vec<PriceOffer>,
        source: OfferSource,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        let base_price = product.base_price()?;
        offers.sort_by_key(|o| o.price);
        let (Some(best), Some(highest)) = (offers.first(), offers.last()) else {
            return Err(CoreError::EmptyRetailerTable);
        };
        let best_price = best.clone();
        let savings = highest.price - best.price;

        Ok(Self {
            product_id: product.id,
            product_name: product.name.clone(),
            product_brand: product.brand.clone(),
            product_image: product.image_url.clone(),
            base_price,
            prices: offers,
            best_price,
            savings,
            source,
            simulated: true,
            timestamp,
        })
    }
}

/// Rounds a computed price to something a shop would print.
///
/// Looks at the last two digits: 1–10 drop to the hundred below, 91–98 go
/// up to …99, 85–90 go up to …90. Anything else is left alone.
#[must_use]
pub fn humanize_price(price: i64) -> i64 {
    let last_two = price.rem_euclid(100);
    match last_two {
        1..=10 => price - last_two,
        91..=98 => price + (100 - last_two) - 1,
        85..=90 => price + (90 - last_two),
        _ => price,
    }
}

/// `base` shifted by `percent`, rounded half away from zero to whole units.
///
/// # Errors
///
/// Returns [`CoreError::PriceGeneration`] if the result does not fit an `i64`.
pub fn apply_offset(base: Decimal, percent: f64) -> Result<i64, CoreError> {
    let base = base
        .to_f64()
        .ok_or_else(|| CoreError::PriceGeneration(format!("base price {base} is not representable")))?;
    let shifted = (base * (1.0 + percent / 100.0)).round();
    #[allow(clippy::cast_precision_loss)]
    let in_range = shifted.is_finite() && shifted.abs() < i64::MAX as f64;
    if !in_range {
        return Err(CoreError::PriceGeneration(format!(
            "offset {percent}% on {base} overflows"
        )));
    }
    #[allow(clippy::cast_possible_truncation)]
    Ok(shifted as i64)
}

/// Synthesises one offer per retailer in `retailers`, in table order.
///
/// # Errors
///
/// Returns [`CoreError::EmptyRetailerTable`] for an empty table,
/// [`CoreError::InvalidProduct`] for a negative base price, or
/// [`CoreError::PriceGeneration`] if any single quote cannot be computed.
/// No partial list is ever returned.
pub fn generate_offers(
    product_name: &str,
    base_price: Decimal,
    retailers: &[RetailerConfig],
    draw: &mut impl PriceDraw,
) -> Result<Vec<PriceOffer>, CoreError> {
    if retailers.is_empty() {
        return Err(CoreError::EmptyRetailerTable);
    }
    if base_price.is_sign_negative() && !base_price.is_zero() {
        return Err(CoreError::InvalidProduct(format!(
            "base price {base_price} is negative"
        )));
    }

    retailers
        .iter()
        .map(|retailer| {
            let percent = draw.percent(retailer.min_percent, retailer.max_percent);
            let price = humanize_price(apply_offset(base_price, percent)?);
            Ok(PriceOffer {
                platform: retailer.name.to_string(),
                price,
                url: retailer.search_url_for(product_name),
                in_stock: draw.in_stock(retailer.stock_probability),
                delivery: retailer.delivery.to_string(),
                rating: retailer.rating(),
            })
        })
        .collect()
}

/// Generates and ranks a fresh comparison for `product`.
///
/// # Errors
///
/// Returns [`CoreError::InvalidProduct`] when the product price is not a
/// number; otherwise see [`generate_offers`].
pub fn simulate_comparison(
    product: &Product,
    retailers: &[RetailerConfig],
    draw: &mut impl PriceDraw,
    timestamp: DateTime<Utc>,
) -> Result<PriceComparison, CoreError> {
    let offers = generate_offers(&product.name, product.base_price()?, retailers, draw)?;
    PriceComparison::assemble(product, offers, OfferSource::Generated, timestamp)
}

#[cfg(test)]
#[path = "pricing_test.rs"]
mod tests;
