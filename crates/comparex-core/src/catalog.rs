//! Client-side catalog filtering and ordering.
//!
//! [`CatalogQuery::apply`] narrows an in-memory product list by category,
//! free text and price interval (all criteria AND together) and then orders
//! the survivors by a single [`SortKey`]. Nothing here fails: an empty
//! catalog yields an empty result and malformed prices sort as zero.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::products::{Category, Product};

static NON_NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9.\-]+").expect("static regex is valid"));

/// Category criterion: either the `"All"` wildcard or one exact category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    #[must_use]
    pub fn matches(self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => c == category,
        }
    }

    #[must_use]
    pub fn as_category(self) -> Option<Category> {
        match self {
            CategoryFilter::All => None,
            CategoryFilter::Only(c) => Some(c),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = crate::CoreError;

    /// `""` and `"All"` (any case) mean no category restriction.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(CategoryFilter::All);
        }
        trimmed.parse::<Category>().map(CategoryFilter::Only)
    }
}

/// Ordering applied after filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "price-low")]
    PriceLow,
    #[serde(rename = "price-high")]
    PriceHigh,
    #[serde(rename = "rating")]
    Rating,
}

impl SortKey {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::PriceLow => "price-low",
            SortKey::PriceHigh => "price-high",
            SortKey::Rating => "rating",
        }
    }

    /// Parses a sort key, returning `None` for anything unrecognised.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "name" => Some(SortKey::Name),
            "price-low" => Some(SortKey::PriceLow),
            "price-high" => Some(SortKey::PriceHigh),
            "rating" => Some(SortKey::Rating),
            _ => None,
        }
    }

    /// Like [`SortKey::parse`] but unknown or missing keys fall back to `Name`.
    #[must_use]
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        raw.and_then(SortKey::parse).unwrap_or_default()
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter and sort criteria for one catalog view.
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    pub category: CategoryFilter,
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort: SortKey,
}

impl CatalogQuery {
    /// Returns `true` when `product` satisfies every criterion.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.category.matches(product.category)
            && self.matches_search(product)
            && self.matches_price(product)
    }

    /// A product whose price has no numeric reading never satisfies an
    /// active bound; with no bounds set it always passes.
    fn matches_price(&self, product: &Product) -> bool {
        if self.min_price.is_none() && self.max_price.is_none() {
            return true;
        }
        let Some(price) = product.price.value() else {
            return false;
        };
        self.min_price.is_none_or(|min| price >= min)
            && self.max_price.is_none_or(|max| price <= max)
    }

    fn matches_search(&self, product: &Product) -> bool {
        let Some(needle) = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        else {
            return true;
        };
        let needle = needle.to_lowercase();

        product.name.to_lowercase().contains(&needle)
            || product
                .brand
                .as_deref()
                .is_some_and(|b| b.to_lowercase().contains(&needle))
    }

    /// Filters `products` and returns the survivors in sorted order.
    ///
    /// The input slice is never modified.
    #[must_use]
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        let mut result: Vec<Product> = products
            .iter()
            .filter(|p| self.matches(p))
            .cloned()
            .collect();
        sort_products(&mut result, self.sort);
        result
    }
}

/// Stable in-place sort by `key`.
///
/// Unrated products sort as rating 0 and always land after rated ones that
/// tie with them.
pub fn sort_products(products: &mut [Product], key: SortKey) {
    match key {
        SortKey::Name => products.sort_by(compare_names),
        SortKey::PriceLow => products.sort_by_key(|p| p.price.sort_value()),
        SortKey::PriceHigh => {
            products.sort_by(|a, b| b.price.sort_value().cmp(&a.price.sort_value()));
        }
        SortKey::Rating => products.sort_by(|a, b| {
            let ra = a.rating.unwrap_or(Decimal::ZERO);
            let rb = b.rating.unwrap_or(Decimal::ZERO);
            rb.cmp(&ra)
                .then_with(|| a.rating.is_none().cmp(&b.rating.is_none()))
        }),
    }
}

fn compare_names(a: &Product, b: &Product) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
}

/// Parses a display price such as `"₹46,999"` or `"$1,299.00"`.
///
/// Every character other than digits, `.` and `-` is stripped first.
/// Returns `None` when what remains is not a number.
#[must_use]
pub fn parse_display_price(raw: &str) -> Option<Decimal> {
    let cleaned = NON_NUMERIC.replace_all(raw, "");
    cleaned.parse::<Decimal>().ok()
}
