use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::catalog::parse_display_price;
use crate::CoreError;

/// Default stock level applied when a create payload omits `stock`.
pub const DEFAULT_STOCK: i32 = 50;

/// Canonical product category.
///
/// Serialized exactly as displayed (`"Mobile"`, `"Laptop"`, ...). The same
/// enumeration drives catalog filters and compare-set homogeneity checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Mobile,
    Laptop,
    Tablet,
    Smartwatch,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Mobile,
        Category::Laptop,
        Category::Tablet,
        Category::Smartwatch,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Mobile => "Mobile",
            Category::Laptop => "Laptop",
            Category::Tablet => "Tablet",
            Category::Smartwatch => "Smartwatch",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CoreError;

    /// Parses a category name, ignoring ASCII case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| CoreError::UnknownCategory(trimmed.to_string()))
    }
}

/// Free-text spec attributes shown in the comparison table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSpecs {
    #[serde(default)]
    pub ram: Option<String>,
    #[serde(default)]
    pub storage: Option<String>,
    #[serde(default)]
    pub display: Option<String>,
    #[serde(default)]
    pub battery: Option<String>,
    #[serde(default)]
    pub processor: Option<String>,
    #[serde(default)]
    pub camera: Option<String>,
    #[serde(default)]
    pub gpu: Option<String>,
}

/// Spec attribute keys, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecKey {
    Ram,
    Storage,
    Display,
    Battery,
    Processor,
    Camera,
    Gpu,
}

impl SpecKey {
    pub const ALL: [SpecKey; 7] = [
        SpecKey::Ram,
        SpecKey::Storage,
        SpecKey::Display,
        SpecKey::Battery,
        SpecKey::Processor,
        SpecKey::Camera,
        SpecKey::Gpu,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SpecKey::Ram => "RAM",
            SpecKey::Storage => "Storage",
            SpecKey::Display => "Display",
            SpecKey::Battery => "Battery",
            SpecKey::Processor => "Processor",
            SpecKey::Camera => "Camera",
            SpecKey::Gpu => "GPU",
        }
    }
}

impl ProductSpecs {
    #[must_use]
    pub fn get(&self, key: SpecKey) -> Option<&str> {
        let value = match key {
            SpecKey::Ram => &self.ram,
            SpecKey::Storage => &self.storage,
            SpecKey::Display => &self.display,
            SpecKey::Battery => &self.battery,
            SpecKey::Processor => &self.processor,
            SpecKey::Camera => &self.camera,
            SpecKey::Gpu => &self.gpu,
        };
        value.as_deref()
    }
}

/// A product price as received, kept verbatim.
///
/// The API sends decimals, but locally persisted or hand-edited records may
/// carry display strings such as `"₹46,999"` or junk like `"TBA"`. Those are
/// held as [`Price::Raw`] and written back unchanged; only sorting and
/// filtering look at their numeric reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Price {
    Amount(Decimal),
    Raw(serde_json::Value),
}

impl Price {
    /// Numeric reading: the amount itself, or a display string with its
    /// formatting stripped. `None` when there is no number to read.
    #[must_use]
    pub fn value(&self) -> Option<Decimal> {
        match self {
            Price::Amount(amount) => Some(*amount),
            Price::Raw(serde_json::Value::String(s)) => parse_display_price(s),
            Price::Raw(_) => None,
        }
    }

    /// Ordering key: unreadable prices sort as zero.
    #[must_use]
    pub fn sort_value(&self) -> Decimal {
        self.value().unwrap_or(Decimal::ZERO)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Price::Amount(amount)
    }
}

impl PartialEq<Decimal> for Price {
    fn eq(&self, other: &Decimal) -> bool {
        matches!(self, Price::Amount(amount) if amount == other)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Price::Amount(amount) => write!(f, "{amount}"),
            Price::Raw(serde_json::Value::String(s)) => f.write_str(s),
            Price::Raw(other) => write!(f, "{other}"),
        }
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Price::Amount(amount) => Serialize::serialize(amount, serializer),
            Price::Raw(raw) => raw.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        let amount = match &raw {
            serde_json::Value::Number(n) => n.to_string().parse::<Decimal>().ok(),
            serde_json::Value::String(s) => s.parse::<Decimal>().ok(),
            _ => None,
        };
        Ok(amount.map_or_else(
            || {
                tracing::debug!(%raw, "non-decimal price kept as received");
                Price::Raw(raw)
            },
            Price::Amount,
        ))
    }
}

/// A catalog record as served by the API.
///
/// `price` is lenient on the way in (see [`Price`]). Write paths go through
/// [`ProductInput`], which is strict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    pub category: Category,
    pub price: Price,
    #[serde(default)]
    pub original_price: Option<Decimal>,
    #[serde(default)]
    pub rating: Option<Decimal>,
    #[serde(flatten)]
    pub specs: ProductSpecs,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub trending: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_stock")]
    pub stock: i32,
    #[serde(default)]
    pub discount: i32,
}

fn default_stock() -> i32 {
    DEFAULT_STOCK
}

impl Product {
    /// The price as a number, for computations that cannot guess.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidProduct`] when the price has no numeric
    /// reading.
    pub fn base_price(&self) -> Result<Decimal, CoreError> {
        self.price.value().ok_or_else(|| {
            CoreError::InvalidProduct(format!(
                "product {} has no numeric price ({})",
                self.id, self.price
            ))
        })
    }
}

/// Create/update payload accepted at the API edge.
///
/// Loosely typed on purpose: `category` stays a string until
/// [`ProductInput::validate`] checks it against [`Category`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    pub price: Decimal,
    #[serde(default, alias = "originalPrice")]
    pub original_price: Option<Decimal>,
    pub category: String,
    #[serde(default, alias = "image")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub rating: Option<Decimal>,
    #[serde(flatten)]
    pub specs: ProductSpecs,
    #[serde(default)]
    pub trending: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stock: Option<i32>,
    #[serde(default)]
    pub discount: Option<i32>,
}

/// A validated product without an identifier, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub brand: Option<String>,
    pub category: Category,
    pub price: Decimal,
    pub original_price: Decimal,
    pub rating: Decimal,
    pub specs: ProductSpecs,
    pub image_url: Option<String>,
    pub trending: bool,
    pub description: Option<String>,
    pub stock: i32,
    pub discount: i32,
}

impl ProductInput {
    /// Checks the payload and fills in create defaults.
    ///
    /// Defaults: `original_price` = `price`, `rating` = 4.0, `trending` =
    /// false, `stock` = 50, `discount` = 0.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidProduct`] for an empty name, a price that
    /// is negative, reaches 10^10 or carries more than two decimals, a
    /// rating outside 0–5 or finer than one decimal, or a negative
    /// stock/discount, and
    /// [`CoreError::UnknownCategory`] when `category` is not canonical.
    pub fn validate(self) -> Result<NewProduct, CoreError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(CoreError::InvalidProduct("name must not be empty".into()));
        }
        check_amount("price", self.price)?;
        if let Some(original) = self.original_price {
            check_amount("original_price", original)?;
        }
        let rating = self.rating.unwrap_or_else(|| Decimal::new(40, 1));
        if rating < Decimal::ZERO || rating > Decimal::from(5) {
            return Err(CoreError::InvalidProduct(format!(
                "rating {rating} is outside 0-5"
            )));
        }
        if rating.normalize().scale() > RATING_SCALE {
            return Err(CoreError::InvalidProduct(format!(
                "rating {rating} has more than {RATING_SCALE} decimal place"
            )));
        }
        let stock = self.stock.unwrap_or(DEFAULT_STOCK);
        let discount = self.discount.unwrap_or(0);
        if stock < 0 || discount < 0 {
            return Err(CoreError::InvalidProduct(
                "stock and discount must not be negative".into(),
            ));
        }
        let category = self.category.parse::<Category>()?;
        let brand = self
            .brand
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty());

        Ok(NewProduct {
            name,
            brand,
            category,
            price: self.price,
            original_price: self.original_price.unwrap_or(self.price),
            rating,
            specs: self.specs,
            image_url: self.image_url,
            trending: self.trending.unwrap_or(false),
            description: self.description,
            stock,
            discount,
        })
    }
}

/// Column limits for `products.price` / `original_price` (`NUMERIC(12,2)`).
const PRICE_SCALE: u32 = 2;
const PRICE_LIMIT: i64 = 10_000_000_000;
/// `products.rating` is `NUMERIC(2,1)`.
const RATING_SCALE: u32 = 1;

fn check_amount(field: &str, amount: Decimal) -> Result<(), CoreError> {
    if amount.is_sign_negative() {
        return Err(CoreError::InvalidProduct(format!(
            "{field} must not be negative"
        )));
    }
    if amount >= Decimal::from(PRICE_LIMIT) {
        return Err(CoreError::InvalidProduct(format!(
            "{field} {amount} must be below {PRICE_LIMIT}"
        )));
    }
    if amount.normalize().scale() > PRICE_SCALE {
        return Err(CoreError::InvalidProduct(format!(
            "{field} {amount} has more than {PRICE_SCALE} decimal places"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> ProductInput {
        ProductInput {
            name: "iPhone 15".to_string(),
            brand: Some("Apple".to_string()),
            price: Decimal::from(46_999),
            category: "Mobile".to_string(),
            ..ProductInput::default()
        }
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("laptop".parse::<Category>().unwrap(), Category::Laptop);
        assert_eq!(" Smartwatch ".parse::<Category>().unwrap(), Category::Smartwatch);
    }

    #[test]
    fn category_rejects_mock_taxonomy() {
        let err = "smartphones".parse::<Category>().unwrap_err();
        assert!(matches!(err, CoreError::UnknownCategory(ref c) if c == "smartphones"));
    }

    #[test]
    fn validate_applies_create_defaults() {
        let product = input().validate().expect("valid input");
        assert_eq!(product.original_price, Decimal::from(46_999));
        assert_eq!(product.rating, Decimal::new(40, 1));
        assert_eq!(product.stock, DEFAULT_STOCK);
        assert_eq!(product.discount, 0);
        assert!(!product.trending);
        assert_eq!(product.category, Category::Mobile);
    }

    #[test]
    fn validate_rejects_blank_name() {
        let mut bad = input();
        bad.name = "   ".to_string();
        assert!(matches!(bad.validate(), Err(CoreError::InvalidProduct(_))));
    }

    #[test]
    fn validate_rejects_rating_above_five() {
        let mut bad = input();
        bad.rating = Some(Decimal::new(51, 1));
        assert!(matches!(bad.validate(), Err(CoreError::InvalidProduct(_))));
    }

    #[test]
    fn validate_rejects_prices_the_column_cannot_hold() {
        let mut too_large = input();
        too_large.price = Decimal::from(PRICE_LIMIT);
        assert!(matches!(too_large.validate(), Err(CoreError::InvalidProduct(_))));

        let mut too_fine = input();
        too_fine.price = Decimal::new(46_999_999, 3);
        assert!(matches!(too_fine.validate(), Err(CoreError::InvalidProduct(_))));

        let mut bad_original = input();
        bad_original.original_price = Some(Decimal::new(-1, 0));
        assert!(matches!(bad_original.validate(), Err(CoreError::InvalidProduct(_))));
    }

    #[test]
    fn validate_accepts_column_edge_values() {
        let mut edge = input();
        edge.price = Decimal::new(999_999_999_999, 2);
        edge.original_price = Some(Decimal::new(46_999_000, 3));
        edge.rating = Some(Decimal::new(4_500, 3));
        let product = edge.validate().expect("fits the columns");
        assert_eq!(product.price, Decimal::new(999_999_999_999, 2));
        assert_eq!(product.rating, Decimal::new(45, 1));
    }

    #[test]
    fn validate_rejects_rating_finer_than_one_decimal() {
        let mut bad = input();
        bad.rating = Some(Decimal::new(455, 2));
        assert!(matches!(bad.validate(), Err(CoreError::InvalidProduct(_))));
    }

    #[test]
    fn validate_drops_blank_brand() {
        let mut i = input();
        i.brand = Some("  ".to_string());
        assert!(i.validate().unwrap().brand.is_none());
    }

    #[test]
    fn product_deserializes_with_flattened_specs_and_defaults() {
        let json = serde_json::json!({
            "id": 1,
            "name": "Galaxy S24",
            "category": "Mobile",
            "price": "48999.00",
            "ram": "12GB",
            "battery": "4000mAh"
        });
        let product: Product = serde_json::from_value(json).expect("deserialize");
        assert_eq!(product.specs.get(SpecKey::Ram), Some("12GB"));
        assert_eq!(product.specs.get(SpecKey::Gpu), None);
        assert_eq!(product.stock, DEFAULT_STOCK);
        assert!(product.brand.is_none());
        assert!(!product.trending);
    }

    #[test]
    fn product_input_accepts_camel_case_original_price() {
        let json = serde_json::json!({
            "name": "Pixel 9a",
            "price": 45999,
            "originalPrice": 49999,
            "category": "Mobile"
        });
        let input: ProductInput = serde_json::from_value(json).expect("deserialize");
        assert_eq!(input.original_price, Some(Decimal::from(49_999)));
    }
}
