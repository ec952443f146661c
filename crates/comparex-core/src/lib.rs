//! Domain logic for the CompareX storefront: catalog records, client-side
//! filtering, the compare-set and wishlist stores, spec tables, simulated
//! retailer pricing, and configuration loading.

pub mod app_config;
pub mod catalog;
pub mod catalog_file;
pub mod compare_set;
pub mod config;
pub mod preselect;
pub mod pricing;
pub mod products;
pub mod spec_table;
pub mod store;
pub mod wishlist;

use thiserror::Error;

pub use app_config::{AppConfig, ClientConfig, Environment};
pub use catalog::{CatalogQuery, CategoryFilter, SortKey};
pub use catalog_file::{load_catalog, CatalogFile};
pub use compare_set::{AddOutcome, CompareSet, CompareState};
pub use config::{load_app_config, load_app_config_from_env, load_client_config};
pub use preselect::PendingPreselect;
pub use pricing::{OfferSource, PriceComparison, PriceDraw, PriceOffer, RetailerConfig, RETAILERS};
pub use products::{Category, NewProduct, Price, Product, ProductInput, ProductSpecs, SpecKey};
pub use spec_table::SpecTable;
pub use store::{FileStore, LocalStore, MemoryStore, StoreError};
pub use wishlist::Wishlist;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("compare list holds {active} products; cannot add a {attempted} product")]
    CategoryMismatch {
        active: Category,
        attempted: Category,
    },
    #[error("unknown category: {0}")]
    UnknownCategory(String),
    #[error("invalid product: {0}")]
    InvalidProduct(String),
    #[error("no retailers configured for price comparison")]
    EmptyRetailerTable,
    #[error("price generation failed: {0}")]
    PriceGeneration(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
    #[error("failed to read catalog file {path}: {source}")]
    CatalogFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog file: {0}")]
    CatalogFileParse(#[from] serde_yaml::Error),
    #[error("catalog validation failed: {0}")]
    CatalogValidation(String),
}
