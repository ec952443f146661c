mod catalog;
mod compare;
mod db;
mod pricing;
mod wishlist;

use clap::{Parser, Subcommand};
use comparex_client::ApiClient;
use comparex_core::{ClientConfig, FileStore, Price};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

use crate::catalog::CatalogArgs;
use crate::compare::{CompareCommands, PreselectCommands};
use crate::db::DbCommands;
use crate::wishlist::WishlistCommands;

#[derive(Debug, Parser)]
#[command(name = "comparex-cli")]
#[command(about = "CompareX command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database administration
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Browse the catalog with local filtering and sorting
    Catalog(CatalogArgs),
    /// Top-rated trending products
    Trending,
    /// Categories present in the catalog
    Categories,
    /// Manage the local compare list
    Compare {
        #[command(subcommand)]
        command: CompareCommands,
    },
    /// Manage the local wishlist
    Wishlist {
        #[command(subcommand)]
        command: WishlistCommands,
    },
    /// Hold a product to be compared after sign-in
    Preselect {
        #[command(subcommand)]
        command: PreselectCommands,
    },
    /// Show simulated retailer offers for a product
    BestPrice {
        /// Product id
        id: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    let client_config = comparex_core::load_client_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(client_config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Db { command }) => {
            let config = comparex_core::load_app_config()?;
            let pool = comparex_db::connect_pool_from_config(&config).await?;
            match command {
                DbCommands::Ping => db::run_db_ping(&pool).await?,
                DbCommands::Migrate => db::run_db_migrate(&pool).await?,
                DbCommands::Seed { file } => {
                    let path = file.unwrap_or_else(|| config.catalog_path.clone());
                    db::run_db_seed(&pool, &path).await?;
                }
            }
        }
        Some(Commands::Catalog(args)) => {
            let client = api_client(&client_config)?;
            catalog::run_catalog(client, &args).await?;
        }
        Some(Commands::Trending) => {
            catalog::run_trending(&api_client(&client_config)?).await?;
        }
        Some(Commands::Categories) => {
            catalog::run_categories(&api_client(&client_config)?).await?;
        }
        Some(Commands::Compare { command }) => {
            let store = local_store(&client_config);
            match command {
                CompareCommands::Add { id } => {
                    compare::run_compare_add(&api_client(&client_config)?, store, id).await?;
                }
                CompareCommands::Remove { id } => compare::run_compare_remove(store, id)?,
                CompareCommands::Clear => compare::run_compare_clear(store)?,
                CompareCommands::Show => compare::run_compare_show(store),
            }
        }
        Some(Commands::Wishlist { command }) => {
            let store = local_store(&client_config);
            match command {
                WishlistCommands::Toggle { id } => {
                    wishlist::run_wishlist_toggle(&api_client(&client_config)?, store, id).await?;
                }
                WishlistCommands::List => wishlist::run_wishlist_list(store),
                WishlistCommands::Clear => wishlist::run_wishlist_clear(store)?,
            }
        }
        Some(Commands::Preselect { command }) => {
            let store = local_store(&client_config);
            match command {
                PreselectCommands::Set { id } => compare::run_preselect_set(store, id)?,
                PreselectCommands::Take => {
                    compare::run_preselect_take(&api_client(&client_config)?, store).await?;
                }
            }
        }
        Some(Commands::BestPrice { id }) => {
            pricing::run_best_price(&api_client(&client_config)?, id).await?;
        }
        None => println!("comparex-cli ready; run with --help for commands"),
    }

    Ok(())
}

fn api_client(config: &ClientConfig) -> anyhow::Result<ApiClient> {
    Ok(ApiClient::new(config)?)
}

fn local_store(config: &ClientConfig) -> FileStore {
    tracing::debug!(dir = %config.state_dir.display(), "using local state directory");
    FileStore::new(config.state_dir.clone())
}

/// Whole-rupee amount with thousands separators: `129999` -> `₹129,999`.
fn fmt_rupees(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-\u{20b9}{grouped}")
    } else {
        format!("\u{20b9}{grouped}")
    }
}

/// Catalog prices are whole rupees in practice; fractions are rounded away
/// for display only.
fn fmt_price(price: Decimal) -> String {
    use rust_decimal::prelude::ToPrimitive;
    price
        .round()
        .to_i64()
        .map_or_else(|| format!("\u{20b9}{price}"), fmt_rupees)
}

/// Product prices that never parsed as a number print as received.
fn fmt_product_price(price: &Price) -> String {
    match price {
        Price::Amount(amount) => fmt_price(*amount),
        other => other.to_string(),
    }
}

/// Truncates to `max` characters, appending `...` when cut.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max).collect::<String>())
    } else {
        text.to_string()
    }
}
