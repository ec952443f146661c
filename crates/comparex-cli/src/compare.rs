//! Compare-list and pending-preselect commands.
//!
//! Both live in the local state directory; only `add` and `preselect take`
//! reach the API, to fetch the product being added.

use clap::Subcommand;
use comparex_client::{ApiClient, ClientError};
use comparex_core::{
    AddOutcome, CompareSet, CompareState, CoreError, LocalStore, PendingPreselect, Product,
    SpecTable,
};

/// Sub-commands available under `compare`.
#[derive(Debug, Subcommand)]
pub enum CompareCommands {
    /// Add a product to the compare list
    Add {
        /// Product id
        id: i64,
    },
    /// Remove a product from the compare list
    Remove {
        /// Product id
        id: i64,
    },
    /// Empty the compare list
    Clear,
    /// Print the spec table for the compare list
    Show,
}

/// Sub-commands available under `preselect`.
#[derive(Debug, Subcommand)]
pub enum PreselectCommands {
    /// Remember a product to compare after sign-in
    Set {
        /// Product id
        id: i64,
    },
    /// Consume the pending product and add it to the compare list
    Take,
}

pub(crate) async fn fetch_product(client: &ApiClient, id: i64) -> anyhow::Result<Product> {
    match client.get_product(id).await {
        Ok(product) => Ok(product),
        Err(ClientError::NotFound(_)) => Err(anyhow::anyhow!("product {id} not found")),
        Err(e) => Err(e.into()),
    }
}

/// Adds `product`, reporting a category mismatch as a warning rather than
/// an error. Returns the outcome when the set accepted or already held it.
///
/// # Errors
///
/// Returns an error only when the compare list cannot be persisted.
pub(crate) fn add_to_compare<S: LocalStore>(
    set: &mut CompareSet<S>,
    product: Product,
) -> anyhow::Result<Option<AddOutcome>> {
    let name = product.name.clone();
    match set.add(product) {
        Ok(AddOutcome::Added) => {
            println!("added {name} to the compare list ({} total)", set.len());
            Ok(Some(AddOutcome::Added))
        }
        Ok(AddOutcome::AlreadyPresent) => {
            println!("{name} is already in the compare list");
            Ok(Some(AddOutcome::AlreadyPresent))
        }
        Err(e @ CoreError::CategoryMismatch { .. }) => {
            eprintln!("warning: {e}; clear the list to compare another category");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

pub(crate) async fn run_compare_add<S: LocalStore>(
    client: &ApiClient,
    store: S,
    id: i64,
) -> anyhow::Result<()> {
    let product = fetch_product(client, id).await?;
    let mut set = CompareSet::load(store);
    add_to_compare(&mut set, product)?;
    Ok(())
}

pub(crate) fn run_compare_remove<S: LocalStore>(store: S, id: i64) -> anyhow::Result<()> {
    let mut set = CompareSet::load(store);
    if set.remove(id)? {
        println!("removed product {id} ({} left)", set.len());
    } else {
        println!("product {id} is not in the compare list");
    }
    Ok(())
}

pub(crate) fn run_compare_clear<S: LocalStore>(store: S) -> anyhow::Result<()> {
    let mut set = CompareSet::load(store);
    set.clear()?;
    println!("compare list cleared");
    Ok(())
}

pub(crate) fn run_compare_show<S: LocalStore>(store: S) {
    let set = CompareSet::load(store);
    let CompareState::Homogeneous { category, len } = set.state() else {
        println!("compare list is empty; add products with `compare add <id>`");
        return;
    };

    println!("Comparing {len} {category} products");
    println!();
    for line in render_spec_table(set.members()) {
        println!("{line}");
    }
}

const SPEC_WIDTH: usize = 24;

/// Rows of the side-by-side table. Price comes first, then every spec any
/// member carries; the best value in a row is marked with `*`.
pub(crate) fn render_spec_table(products: &[Product]) -> Vec<String> {
    let table = SpecTable::build(products);
    let mut lines = Vec::with_capacity(table.rows.len() + 2);

    let mut header = format!("{:<12}", "");
    for column in &table.columns {
        header.push_str(&format!(
            "{:<SPEC_WIDTH$}",
            super::truncate(&column.name, SPEC_WIDTH - 4)
        ));
    }
    lines.push(header.trim_end().to_string());

    let mut price_line = format!("{:<12}", "Price");
    for product in products {
        price_line.push_str(&format!(
            "{:<SPEC_WIDTH$}",
            super::fmt_product_price(&product.price)
        ));
    }
    lines.push(price_line.trim_end().to_string());

    for row in &table.rows {
        let mut line = format!("{:<12}", row.label);
        for (value, best) in row.values.iter().zip(&row.best) {
            let cell = match value {
                Some(v) if *best => format!("{} *", super::truncate(v, SPEC_WIDTH - 6)),
                Some(v) => super::truncate(v, SPEC_WIDTH - 4),
                None => "\u{2014}".to_string(),
            };
            line.push_str(&format!("{cell:<SPEC_WIDTH$}"));
        }
        lines.push(line.trim_end().to_string());
    }
    lines
}

pub(crate) fn run_preselect_set<S: LocalStore>(store: S, id: i64) -> anyhow::Result<()> {
    PendingPreselect::new(store).set(id)?;
    println!("product {id} will be added to the compare list after sign-in");
    Ok(())
}

pub(crate) async fn run_preselect_take<S: LocalStore + Clone>(
    client: &ApiClient,
    store: S,
) -> anyhow::Result<()> {
    let pending = PendingPreselect::new(store.clone());
    let Some(id) = pending.peek() else {
        println!("no pending product");
        return Ok(());
    };

    let product = fetch_product(client, id).await?;
    apply_preselect(store, product)
}

/// Adds the fetched pending product, then clears the slot. A failed fetch
/// never reaches here, so the id stays pending for the next attempt.
pub(crate) fn apply_preselect<S: LocalStore + Clone>(
    store: S,
    product: Product,
) -> anyhow::Result<()> {
    let mut set = CompareSet::load(store.clone());
    add_to_compare(&mut set, product)?;
    PendingPreselect::new(store).take()?;
    Ok(())
}
