//! Catalog browsing commands.
//!
//! The full catalog is fetched once and narrowed locally, so repeated
//! filter changes never round-trip to the server.

use clap::Args;
use comparex_client::{ApiClient, CatalogFeed, ListParams, ReloadOutcome};
use comparex_core::{CatalogQuery, CategoryFilter, Product, SortKey};
use rust_decimal::Decimal;

#[derive(Debug, Args)]
pub struct CatalogArgs {
    /// Category to show, or "All"
    #[arg(long)]
    pub category: Option<String>,
    /// Case-insensitive match against name or brand
    #[arg(long)]
    pub search: Option<String>,
    /// Lowest price to include
    #[arg(long)]
    pub min_price: Option<Decimal>,
    /// Highest price to include
    #[arg(long)]
    pub max_price: Option<Decimal>,
    /// One of name, price-low, price-high, rating
    #[arg(long)]
    pub sort: Option<String>,
}

/// Turns command-line flags into a [`CatalogQuery`].
///
/// # Errors
///
/// Returns an error for a category outside the fixed set.
pub(crate) fn catalog_query(args: &CatalogArgs) -> anyhow::Result<CatalogQuery> {
    let category = args
        .category
        .as_deref()
        .unwrap_or_default()
        .parse::<CategoryFilter>()?;
    let sort = args.sort.as_deref().map(str::trim);
    if let Some(raw) = sort.filter(|s| SortKey::parse(s).is_none()) {
        eprintln!("warning: unknown sort '{raw}', sorting by name");
    }

    Ok(CatalogQuery {
        category,
        search: args.search.clone(),
        min_price: args.min_price,
        max_price: args.max_price,
        sort: SortKey::parse_or_default(sort),
    })
}

pub(crate) async fn run_catalog(client: ApiClient, args: &CatalogArgs) -> anyhow::Result<()> {
    let query = catalog_query(args)?;
    let feed = CatalogFeed::new(client);

    match feed.reload(&ListParams::default()).await? {
        ReloadOutcome::Applied { count } => tracing::debug!(count, "catalog loaded"),
        ReloadOutcome::Stale => tracing::debug!("catalog reload superseded"),
    }
    let products = feed.products().unwrap_or_default();
    let shown = query.apply(&products);

    if shown.is_empty() {
        println!("no products match the current filters");
        return Ok(());
    }
    print_products(&shown);
    println!();
    println!("{} of {} products", shown.len(), products.len());
    Ok(())
}

pub(crate) async fn run_trending(client: &ApiClient) -> anyhow::Result<()> {
    let products = client.trending().await?;
    if products.is_empty() {
        println!("no trending products");
        return Ok(());
    }
    print_products(&products);
    Ok(())
}

pub(crate) async fn run_categories(client: &ApiClient) -> anyhow::Result<()> {
    for category in client.categories().await? {
        println!("{category}");
    }
    Ok(())
}

pub(crate) fn print_products(products: &[Product]) {
    println!(
        "{:<6}{:<36}{:<12}{:>12}  RATING",
        "ID", "NAME", "CATEGORY", "PRICE"
    );
    for product in products {
        let rating = product
            .rating
            .map_or_else(|| "\u{2014}".to_string(), |r| r.to_string());
        println!(
            "{:<6}{:<36}{:<12}{:>12}  {}",
            product.id,
            super::truncate(&product.name, 32),
            product.category,
            super::fmt_product_price(&product.price),
            rating
        );
    }
}
