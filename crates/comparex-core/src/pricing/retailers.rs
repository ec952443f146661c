use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use rust_decimal::Decimal;

/// Pricing profile for one simulated retailer.
///
/// `min_percent..=max_percent` is the offset from the base price that a
/// quote is drawn from; negative means typically cheaper than base.
#[derive(Debug, Clone, PartialEq)]
pub struct RetailerConfig {
    pub name: &'static str,
    pub min_percent: f64,
    pub max_percent: f64,
    pub delivery: &'static str,
    /// Nominal rating in tenths (`45` = 4.5).
    pub rating_tenths: u8,
    pub stock_probability: f64,
    /// Search URL; `{query}` is replaced with the percent-encoded product name.
    pub search_url: &'static str,
}

impl RetailerConfig {
    #[must_use]
    pub fn rating(&self) -> Decimal {
        Decimal::new(i64::from(self.rating_tenths), 1)
    }

    #[must_use]
    pub fn search_url_for(&self, product_name: &str) -> String {
        let encoded = utf8_percent_encode(product_name, NON_ALPHANUMERIC).to_string();
        self.search_url.replace("{query}", &encoded)
    }
}

/// The retailers every generated comparison quotes, in table order.
pub const RETAILERS: [RetailerConfig; 6] = [
    RetailerConfig {
        name: "Amazon India",
        min_percent: -7.0,
        max_percent: -3.0,
        delivery: "Free Delivery",
        rating_tenths: 45,
        stock_probability: 0.95,
        search_url: "https://www.amazon.in/s?k={query}",
    },
    RetailerConfig {
        name: "Flipkart",
        min_percent: -12.0,
        max_percent: -5.0,
        delivery: "Free Delivery",
        rating_tenths: 44,
        stock_probability: 0.92,
        search_url: "https://www.flipkart.com/search?q={query}",
    },
    RetailerConfig {
        name: "Croma",
        min_percent: 2.0,
        max_percent: 8.0,
        delivery: "₹50 Delivery",
        rating_tenths: 42,
        stock_probability: 0.85,
        search_url: "https://www.croma.com/search?q={query}",
    },
    RetailerConfig {
        name: "Reliance Digital",
        min_percent: -2.0,
        max_percent: 3.0,
        delivery: "Free Delivery",
        rating_tenths: 43,
        stock_probability: 0.88,
        search_url: "https://www.reliancedigital.in/search?q={query}",
    },
    RetailerConfig {
        name: "Vijay Sales",
        min_percent: -8.0,
        max_percent: -4.0,
        delivery: "₹40 Delivery",
        rating_tenths: 41,
        stock_probability: 0.80,
        search_url: "https://www.vijaysales.com/search/{query}",
    },
    RetailerConfig {
        name: "Tata CLiQ",
        min_percent: -6.0,
        max_percent: -3.0,
        delivery: "Free Delivery",
        rating_tenths: 43,
        stock_probability: 0.87,
        search_url: "https://www.tatacliq.com/search/?searchText={query}",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_interval_is_ordered() {
        for retailer in &RETAILERS {
            assert!(
                retailer.min_percent <= retailer.max_percent,
                "{} has an inverted interval",
                retailer.name
            );
            assert!((0.0..=1.0).contains(&retailer.stock_probability));
        }
    }

    #[test]
    fn search_url_encodes_product_name() {
        let url = RETAILERS[0].search_url_for("iPhone 15 Pro");
        assert_eq!(url, "https://www.amazon.in/s?k=iPhone%2015%20Pro");
    }

    #[test]
    fn rating_is_one_decimal_place() {
        assert_eq!(RETAILERS[1].rating(), Decimal::new(44, 1));
    }
}
