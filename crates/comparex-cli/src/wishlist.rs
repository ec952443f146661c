//! Wishlist commands.

use clap::Subcommand;
use comparex_client::ApiClient;
use comparex_core::{LocalStore, Wishlist};

/// Sub-commands available under `wishlist`.
#[derive(Debug, Subcommand)]
pub enum WishlistCommands {
    /// Add the product if absent, remove it if present
    Toggle {
        /// Product id
        id: i64,
    },
    /// List wishlisted products
    List,
    /// Empty the wishlist
    Clear,
}

/// Removal needs no network; only adding fetches the product.
pub(crate) async fn run_wishlist_toggle<S: LocalStore>(
    client: &ApiClient,
    store: S,
    id: i64,
) -> anyhow::Result<()> {
    let wishlist = Wishlist::new(store);
    if wishlist.remove(id)? {
        println!("removed product {id} from the wishlist");
        return Ok(());
    }

    let product = crate::compare::fetch_product(client, id).await?;
    let name = product.name.clone();
    if wishlist.toggle(product)? {
        println!("added {name} to the wishlist");
    } else {
        println!("removed {name} from the wishlist");
    }
    Ok(())
}

pub(crate) fn run_wishlist_list<S: LocalStore>(store: S) {
    let items = Wishlist::new(store).list();
    if items.is_empty() {
        println!("wishlist is empty");
        return;
    }
    crate::catalog::print_products(&items);
}

pub(crate) fn run_wishlist_clear<S: LocalStore>(store: S) -> anyhow::Result<()> {
    Wishlist::new(store).clear()?;
    println!("wishlist cleared");
    Ok(())
}
