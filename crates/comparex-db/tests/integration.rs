//! Offline unit tests for comparex-db pool configuration and row types.
//! These tests do not require a live database connection.

use comparex_core::{AppConfig, Category, Environment, PriceOffer};
use comparex_db::{connect_pool_from_config, DbError, PoolConfig, PriceOfferRow, ProductRow};
use rust_decimal::Decimal;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

fn app_config(database_url: &str) -> AppConfig {
    AppConfig {
        database_url: database_url.to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 5001),
        log_level: "info".to_string(),
        catalog_path: PathBuf::from("./config/catalog.yaml"),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        price_cache_write: false,
    }
}

#[tokio::test]
async fn blank_database_url_is_reported_before_connecting() {
    let err = connect_pool_from_config(&app_config("   "))
        .await
        .expect_err("blank url must not connect");
    assert!(matches!(err, DbError::MissingDatabaseUrl));
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = app_config("postgres://example");

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn product_row_maps_spec_columns() {
    use chrono::Utc;

    let row = ProductRow {
        id: 42_i64,
        name: "MacBook Air M3".to_string(),
        brand: Some("Apple".to_string()),
        category: "Laptop".to_string(),
        price: Decimal::from(114_900),
        original_price: None,
        rating: None,
        ram: Some("16GB".to_string()),
        storage: Some("512GB".to_string()),
        display: Some("13.6\" Liquid Retina".to_string()),
        battery: None,
        processor: Some("Apple M3".to_string()),
        camera: None,
        gpu: Some("10-core".to_string()),
        image_url: None,
        trending: false,
        description: None,
        stock: 50,
        discount: 0,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    let product = row.into_product().expect("valid row");
    assert_eq!(product.id, 42);
    assert_eq!(product.category, Category::Laptop);
    assert_eq!(product.specs.ram.as_deref(), Some("16GB"));
    assert_eq!(product.specs.gpu.as_deref(), Some("10-core"));
    assert!(product.rating.is_none());
}

#[test]
fn price_offer_row_converts_to_offer() {
    let row = PriceOfferRow {
        platform: "Croma".to_string(),
        price: 52_590,
        url: "https://www.croma.com/searchB?q=Pixel%208".to_string(),
        in_stock: false,
        delivery: "₹50 Delivery".to_string(),
        rating: Decimal::new(42, 1),
        captured_at: chrono::Utc::now(),
    };

    let offer = PriceOffer::from(row);
    assert_eq!(offer.platform, "Croma");
    assert_eq!(offer.price, 52_590);
    assert!(!offer.in_stock);
    assert_eq!(offer.rating, Decimal::new(42, 1));
}
