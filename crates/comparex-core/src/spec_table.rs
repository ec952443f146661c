//! Side-by-side spec rows for the products in a compare-set.

use serde::Serialize;

use crate::products::{Product, SpecKey};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecColumn {
    pub product_id: i64,
    pub name: String,
}

/// One spec attribute across every compared product.
///
/// `values[i]` and `best[i]` refer to `SpecTable::columns[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecRow {
    pub key: SpecKey,
    pub label: &'static str,
    pub values: Vec<Option<String>>,
    pub best: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecTable {
    pub columns: Vec<SpecColumn>,
    pub rows: Vec<SpecRow>,
}

impl SpecTable {
    /// Builds rows for every spec key that at least one product carries.
    #[must_use]
    pub fn build(products: &[Product]) -> Self {
        let columns = products
            .iter()
            .map(|p| SpecColumn {
                product_id: p.id,
                name: p.name.clone(),
            })
            .collect();

        let rows = SpecKey::ALL
            .into_iter()
            .filter(|key| products.iter().any(|p| p.specs.get(*key).is_some()))
            .map(|key| {
                let values: Vec<Option<String>> = products
                    .iter()
                    .map(|p| p.specs.get(key).map(str::to_string))
                    .collect();
                let best = best_value_flags(&values);
                SpecRow {
                    key,
                    label: key.label(),
                    values,
                    best,
                }
            })
            .collect();

        Self { columns, rows }
    }
}

/// Scores a spec value for "best value" highlighting.
///
/// Only capacity-style values (`"12GB"`, `"5000mAh"`) score; the score is
/// the digits of the string read as one number. Everything else is 0.
#[must_use]
pub fn spec_score(value: &str) -> u64 {
    if !(value.contains("GB") || value.contains("mAh")) {
        return 0;
    }
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

/// Flags every cell holding the row maximum, provided that maximum is > 0.
#[must_use]
pub fn best_value_flags(values: &[Option<String>]) -> Vec<bool> {
    let scores: Vec<u64> = values
        .iter()
        .map(|v| v.as_deref().map_or(0, spec_score))
        .collect();
    let max = scores.iter().copied().max().unwrap_or(0);
    scores.iter().map(|&s| max > 0 && s == max).collect()
}
