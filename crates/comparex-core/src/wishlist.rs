//! Favorited products, keyed by product id.

use crate::products::Product;
use crate::store::{load_collection, save_collection, LocalStore, StoreError, WISHLIST_KEY};

/// Id-unique wishlist persisted under [`WISHLIST_KEY`].
///
/// Holds no in-memory copy: every read goes back to storage, so two
/// handles over the same store never disagree.
#[derive(Debug)]
pub struct Wishlist<S> {
    store: S,
}

impl<S: LocalStore> Wishlist<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Removes `product` if present, adds it otherwise.
    ///
    /// Returns `true` if the product is in the wishlist afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the updated list cannot be written.
    pub fn toggle(&self, product: Product) -> Result<bool, StoreError> {
        let mut items = self.list();
        let now_present = if let Some(index) = items.iter().position(|p| p.id == product.id) {
            items.remove(index);
            false
        } else {
            items.push(product);
            true
        };
        save_collection(&self.store, WISHLIST_KEY, &items)?;
        Ok(now_present)
    }

    /// Removes the entry with `id`. Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the updated list cannot be written.
    pub fn remove(&self, id: i64) -> Result<bool, StoreError> {
        let mut items = self.list();
        let before = items.len();
        items.retain(|p| p.id != id);
        if items.len() == before {
            return Ok(false);
        }
        save_collection(&self.store, WISHLIST_KEY, &items)?;
        Ok(true)
    }

    /// Current entries, read fresh from storage. Duplicate ids left by an
    /// older writer are collapsed to their first occurrence.
    #[must_use]
    pub fn list(&self) -> Vec<Product> {
        let mut items: Vec<Product> = load_collection(&self.store, WISHLIST_KEY);
        let mut seen = std::collections::HashSet::new();
        items.retain(|p| seen.insert(p.id));
        items
    }

    #[must_use]
    pub fn contains(&self, id: i64) -> bool {
        self.list().iter().any(|p| p.id == id)
    }

    /// # Errors
    ///
    /// Returns [`StoreError`] if the empty list cannot be written.
    pub fn clear(&self) -> Result<(), StoreError> {
        save_collection::<Product, _>(&self.store, WISHLIST_KEY, &[])
    }
}
