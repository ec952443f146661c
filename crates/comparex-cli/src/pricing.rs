//! `best-price` command.

use comparex_client::{ApiClient, ClientError};
use comparex_core::{OfferSource, PriceComparison};

pub(crate) async fn run_best_price(client: &ApiClient, id: i64) -> anyhow::Result<()> {
    let comparison = match client.price_comparison(id).await {
        Ok(c) => c,
        Err(ClientError::NotFound(_)) => anyhow::bail!("product {id} not found"),
        Err(e) => return Err(e.into()),
    };
    for line in render_comparison(&comparison) {
        println!("{line}");
    }
    Ok(())
}

pub(crate) fn render_comparison(comparison: &PriceComparison) -> Vec<String> {
    let mut lines = Vec::with_capacity(comparison.prices.len() + 6);
    let brand = comparison.product_brand.as_deref().unwrap_or("\u{2014}");
    lines.push(format!("{} ({brand})", comparison.product_name));
    lines.push(format!(
        "Listed at {}",
        super::fmt_price(comparison.base_price)
    ));
    lines.push(String::new());
    lines.push(format!(
        "{:<20}{:>12}  {:<16}{:<8}STOCK",
        "RETAILER", "PRICE", "DELIVERY", "RATING"
    ));

    for offer in &comparison.prices {
        let marker = if offer.platform == comparison.best_price.platform {
            "  <- best"
        } else {
            ""
        };
        let stock = if offer.in_stock { "yes" } else { "no" };
        lines.push(format!(
            "{:<20}{:>12}  {:<16}{:<8}{stock}{marker}",
            offer.platform,
            super::fmt_rupees(offer.price),
            offer.delivery,
            offer.rating.to_string(),
        ));
    }

    lines.push(String::new());
    lines.push(format!(
        "Save up to {} by buying from {}",
        super::fmt_rupees(comparison.savings),
        comparison.best_price.platform
    ));
    let source = match comparison.source {
        OfferSource::Cached => "cached",
        OfferSource::Generated => "generated",
    };
    if comparison.simulated {
        lines.push(format!(
            "Prices are simulated ({source}), not live retailer quotes."
        ));
    }
    lines
}
