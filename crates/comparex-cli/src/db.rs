//! Database administration commands.

use std::path::{Path, PathBuf};

use clap::Subcommand;

/// Sub-commands available under `db`.
#[derive(Debug, Subcommand)]
pub enum DbCommands {
    /// Check that the database answers
    Ping,
    /// Apply pending migrations
    Migrate,
    /// Upsert the catalog seed file into `products`
    Seed {
        /// Seed file to load (defaults to `COMPAREX_CATALOG_PATH`)
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

pub(crate) async fn run_db_ping(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    comparex_db::ping(pool).await?;
    println!("database ok");
    Ok(())
}

pub(crate) async fn run_db_migrate(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let applied = comparex_db::run_migrations(pool).await?;
    println!("applied {applied} pending migration(s)");
    Ok(())
}

/// Loads and validates the seed file, then upserts every entry by name in
/// a single transaction.
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails validation, or if
/// the upsert fails. Nothing is written in either case.
pub(crate) async fn run_db_seed(pool: &sqlx::PgPool, path: &Path) -> anyhow::Result<()> {
    let products = comparex_core::load_catalog(path)
        .map_err(|e| anyhow::anyhow!("{}: {e}", path.display()))?;
    tracing::info!(path = %path.display(), count = products.len(), "loaded catalog seed");

    let summary = comparex_db::seed_products(pool, &products).await?;
    println!(
        "seeded {} products ({} inserted, {} updated)",
        products.len(),
        summary.inserted,
        summary.updated
    );
    Ok(())
}
