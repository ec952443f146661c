use std::collections::VecDeque;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;

use super::*;
use crate::products::{Category, Price, ProductSpecs};

/// Replays fixed percentages; stock draws always return `in_stock`.
struct FixedDraw {
    percents: VecDeque<f64>,
    in_stock: bool,
}

impl FixedDraw {
    fn new(percents: &[f64]) -> Self {
        Self {
            percents: percents.iter().copied().collect(),
            in_stock: true,
        }
    }
}

impl PriceDraw for FixedDraw {
    fn percent(&mut self, min: f64, _max: f64) -> f64 {
        self.percents.pop_front().unwrap_or(min)
    }

    fn in_stock(&mut self, _probability: f64) -> bool {
        self.in_stock
    }
}

fn product(id: i64, price: i64) -> Product {
    Product {
        id,
        name: "Galaxy S24".to_string(),
        brand: Some("Samsung".to_string()),
        category: Category::Mobile,
        price: Decimal::from(price).into(),
        original_price: None,
        rating: Some(Decimal::new(47, 1)),
        specs: ProductSpecs::default(),
        image_url: Some("https://img.example.com/s24.jpg".to_string()),
        trending: true,
        description: None,
        stock: 50,
        discount: 0,
    }
}

fn single(min: f64, max: f64) -> RetailerConfig {
    RetailerConfig {
        name: "Only Shop",
        min_percent: min,
        max_percent: max,
        delivery: "Free Delivery",
        rating_tenths: 40,
        stock_probability: 1.0,
        search_url: "https://shop.example.com/?q={query}",
    }
}

#[test]
fn humanize_rounds_low_tail_down_to_hundred() {
    assert_eq!(humanize_price(47_501), 47_500);
    assert_eq!(humanize_price(47_510), 47_500);
}

#[test]
fn humanize_rounds_high_tail_up_to_99() {
    assert_eq!(humanize_price(47_591), 47_599);
    assert_eq!(humanize_price(47_598), 47_599);
}

#[test]
fn humanize_rounds_mid_tail_up_to_90() {
    assert_eq!(humanize_price(47_585), 47_590);
    assert_eq!(humanize_price(47_590), 47_590);
}

#[test]
fn humanize_leaves_other_tails_alone() {
    for price in [47_500, 47_511, 47_550, 47_584, 47_599] {
        assert_eq!(humanize_price(price), price);
    }
}

#[test]
fn apply_offset_rounds_half_away_from_zero() {
    assert_eq!(apply_offset(Decimal::from(1_000), -5.0).unwrap(), 950);
    assert_eq!(apply_offset(Decimal::from(10), 5.0).unwrap(), 11);
}

#[test]
fn fixed_draw_gives_exact_offers() {
    // 50000 * 0.97 = 48500; * 0.90 = 45000; * 1.0517 = 52585 -> 52590
    let mut draw = FixedDraw::new(&[-3.0, -10.0, 5.17]);
    let offers = generate_offers(
        "Galaxy S24",
        Decimal::from(50_000),
        &RETAILERS[..3],
        &mut draw,
    )
    .unwrap();

    let prices: Vec<i64> = offers.iter().map(|o| o.price).collect();
    assert_eq!(prices, vec![48_500, 45_000, 52_590]);
    assert_eq!(offers[0].platform, "Amazon India");
    assert_eq!(offers[2].delivery, "₹50 Delivery");
    assert!(offers.iter().all(|o| o.in_stock));
}

#[test]
fn assemble_ranks_and_computes_savings() {
    let mut draw = FixedDraw::new(&[-3.0, -10.0, 5.17]);
    let p = product(7, 50_000);
    let comparison = simulate_comparison(&p, &RETAILERS[..3], &mut draw, Utc::now()).unwrap();

    assert_eq!(comparison.best_price.platform, "Flipkart");
    assert_eq!(comparison.best_price.price, 45_000);
    assert_eq!(comparison.savings, 52_590 - 45_000);
    assert_eq!(comparison.product_id, 7);
    assert_eq!(comparison.product_brand.as_deref(), Some("Samsung"));
    assert_eq!(comparison.base_price, Decimal::from(50_000));
    assert_eq!(comparison.source, OfferSource::Generated);
    assert!(comparison.simulated);
}

#[test]
fn best_price_is_minimum_and_savings_non_negative_for_many_bases() {
    let mut draw = RngDraw(StdRng::seed_from_u64(42));
    for base in [0_i64, 1, 99, 2_999, 46_999, 50_000, 129_900, 1_000_000] {
        let p = product(1, base);
        let comparison = simulate_comparison(&p, &RETAILERS, &mut draw, Utc::now()).unwrap();
        assert_eq!(comparison.prices.len(), RETAILERS.len());
        assert!(comparison
            .prices
            .iter()
            .all(|o| comparison.best_price.price <= o.price));
        assert!(comparison.prices.windows(2).all(|w| w[0].price <= w[1].price));
        let max = comparison.prices.iter().map(|o| o.price).max().unwrap();
        let min = comparison.prices.iter().map(|o| o.price).min().unwrap();
        assert_eq!(comparison.savings, max - min);
        assert!(comparison.savings >= 0);
    }
}

#[test]
fn entirely_negative_interval_always_undercuts_base() {
    let flipkart = RETAILERS
        .iter()
        .find(|r| r.name == "Flipkart")
        .expect("flipkart configured");
    assert!((flipkart.min_percent - -12.0).abs() < f64::EPSILON);
    assert!((flipkart.max_percent - -5.0).abs() < f64::EPSILON);

    let mut draw = RngDraw(StdRng::seed_from_u64(7));
    for _ in 0..500 {
        let offers = generate_offers(
            "Product 7",
            Decimal::from(50_000),
            std::slice::from_ref(flipkart),
            &mut draw,
        )
        .unwrap();
        assert!(offers[0].price < 50_000, "got {}", offers[0].price);
    }

    // Interval edges too.
    for pct in [-12.0, -5.0] {
        let mut edge = FixedDraw::new(&[pct]);
        let offers = generate_offers(
            "Product 7",
            Decimal::from(50_000),
            std::slice::from_ref(flipkart),
            &mut edge,
        )
        .unwrap();
        assert!(offers[0].price < 50_000);
    }
}

#[test]
fn single_retailer_has_zero_savings() {
    let mut draw = FixedDraw::new(&[0.0]);
    let comparison =
        simulate_comparison(&product(1, 1_234), &[single(0.0, 0.0)], &mut draw, Utc::now())
            .unwrap();
    assert_eq!(comparison.savings, 0);
    assert_eq!(comparison.best_price.price, 1_234);
}

#[test]
fn empty_retailer_table_is_an_error() {
    let mut draw = FixedDraw::new(&[]);
    let err = simulate_comparison(&product(1, 1_000), &[], &mut draw, Utc::now()).unwrap_err();
    assert!(matches!(err, CoreError::EmptyRetailerTable));
}

#[test]
fn assemble_rejects_empty_offer_list() {
    let err = PriceComparison::assemble(&product(1, 1), Vec::new(), OfferSource::Cached, Utc::now())
        .unwrap_err();
    assert!(matches!(err, CoreError::EmptyRetailerTable));
}

#[test]
fn degenerate_interval_returns_its_single_value() {
    let mut draw = RngDraw(StdRng::seed_from_u64(1));
    assert!((draw.percent(3.0, 3.0) - 3.0).abs() < f64::EPSILON);
}

#[test]
fn stock_draw_respects_certainties() {
    let mut draw = RngDraw(StdRng::seed_from_u64(3));
    assert!(draw.in_stock(1.0));
    assert!(!draw.in_stock(0.0));
}

#[test]
fn unreadable_base_price_produces_no_offers() {
    let mut unpriced = product(4, 0);
    unpriced.price = Price::Raw(serde_json::json!("TBA"));
    let mut draw = FixedDraw::new(&[-5.0]);
    let err = simulate_comparison(&unpriced, &[single(-5.0, -5.0)], &mut draw, Utc::now())
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidProduct(_)));
}
