//! Category-homogeneous selection of products for side-by-side comparison.

use crate::products::{Category, Product};
use crate::store::{load_collection, save_collection, LocalStore, COMPARE_LIST_KEY};
use crate::CoreError;

/// Observable state of a [`CompareSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareState {
    Empty,
    Homogeneous { category: Category, len: usize },
}

/// What [`CompareSet::add`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
}

/// Ordered, id-unique set of products sharing one category.
///
/// The first product added fixes the category; it can only change after
/// the set becomes empty again. Every mutation rewrites the whole set to
/// the backing [`LocalStore`] under [`COMPARE_LIST_KEY`].
#[derive(Debug)]
pub struct CompareSet<S> {
    store: S,
    members: Vec<Product>,
}

impl<S: LocalStore> CompareSet<S> {
    /// Rehydrates the set from storage.
    ///
    /// Corrupt or missing storage gives an empty set. A persisted list that
    /// somehow mixes categories (hand-edited, older writer) is cut back to
    /// the members matching the first entry's category.
    pub fn load(store: S) -> Self {
        let mut members: Vec<Product> = load_collection(&store, COMPARE_LIST_KEY);
        if let Some(category) = members.first().map(|p| p.category) {
            let before = members.len();
            members.retain(|p| p.category == category);
            let mut seen = std::collections::HashSet::new();
            members.retain(|p| seen.insert(p.id));
            if members.len() != before {
                tracing::warn!(
                    dropped = before - members.len(),
                    "discarded inconsistent compare-set entries from storage"
                );
            }
        }
        Self { store, members }
    }

    /// Adds `product` unless already present.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CategoryMismatch`] when the set is non-empty and
    /// `product` belongs to another category; the set is left unchanged.
    /// Returns [`CoreError::Store`] if persisting fails, in which case the
    /// in-memory set is rolled back too.
    pub fn add(&mut self, product: Product) -> Result<AddOutcome, CoreError> {
        if self.contains(product.id) {
            return Ok(AddOutcome::AlreadyPresent);
        }
        if let Some(active) = self.category() {
            if active != product.category {
                return Err(CoreError::CategoryMismatch {
                    active,
                    attempted: product.category,
                });
            }
        }

        self.members.push(product);
        if let Err(e) = self.persist() {
            self.members.pop();
            return Err(e);
        }
        Ok(AddOutcome::Added)
    }

    /// Removes the member with `id`. Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Store`] if persisting fails.
    pub fn remove(&mut self, id: i64) -> Result<bool, CoreError> {
        let Some(index) = self.members.iter().position(|p| p.id == id) else {
            return Ok(false);
        };
        let removed = self.members.remove(index);
        if let Err(e) = self.persist() {
            self.members.insert(index, removed);
            return Err(e);
        }
        Ok(true)
    }

    /// Empties the set.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Store`] if persisting fails.
    pub fn clear(&mut self) -> Result<(), CoreError> {
        let previous = std::mem::take(&mut self.members);
        if let Err(e) = self.persist() {
            self.members = previous;
            return Err(e);
        }
        Ok(())
    }

    #[must_use]
    pub fn members(&self) -> &[Product] {
        &self.members
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: i64) -> bool {
        self.members.iter().any(|p| p.id == id)
    }

    /// The category every member shares, or `None` when empty.
    #[must_use]
    pub fn category(&self) -> Option<Category> {
        self.members.first().map(|p| p.category)
    }

    #[must_use]
    pub fn state(&self) -> CompareState {
        match self.category() {
            None => CompareState::Empty,
            Some(category) => CompareState::Homogeneous {
                category,
                len: self.members.len(),
            },
        }
    }

    /// Member ids in insertion order, as used by `GET /api/compare?ids=`.
    #[must_use]
    pub fn ids(&self) -> Vec<i64> {
        self.members.iter().map(|p| p.id).collect()
    }

    fn persist(&self) -> Result<(), CoreError> {
        save_collection(&self.store, COMPARE_LIST_KEY, &self.members)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::products::ProductSpecs;
    use crate::store::{MemoryStore, StoreError};

    fn product(id: i64, category: Category) -> Product {
        Product {
            id,
            name: format!("Product {id}"),
            brand: Some("Brand".to_string()),
            category,
            price: Decimal::from(46_999).into(),
            original_price: None,
            rating: None,
            specs: ProductSpecs::default(),
            image_url: None,
            trending: false,
            description: None,
            stock: 50,
            discount: 0,
        }
    }

    struct ReadOnlyStore;

    impl LocalStore for ReadOnlyStore {
        fn read(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }

        fn write(&self, key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Io {
                key: key.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }

        fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[test]
    fn starts_empty_without_storage() {
        let store = MemoryStore::new();
        let set = CompareSet::load(&store);
        assert_eq!(set.state(), CompareState::Empty);
    }

    #[test]
    fn first_add_sets_category() {
        let store = MemoryStore::new();
        let mut set = CompareSet::load(&store);
        assert_eq!(set.add(product(1, Category::Laptop)).unwrap(), AddOutcome::Added);
        assert_eq!(
            set.state(),
            CompareState::Homogeneous {
                category: Category::Laptop,
                len: 1
            }
        );
    }

    #[test]
    fn mismatched_category_is_rejected_and_set_unchanged() {
        let store = MemoryStore::new();
        let mut set = CompareSet::load(&store);
        set.add(product(1, Category::Mobile)).unwrap();

        let err = set.add(product(2, Category::Laptop)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::CategoryMismatch {
                active: Category::Mobile,
                attempted: Category::Laptop
            }
        ));
        assert_eq!(set.ids(), vec![1]);
        assert_eq!(set.category(), Some(Category::Mobile));
    }

    #[test]
    fn duplicate_add_is_noop() {
        let store = MemoryStore::new();
        let mut set = CompareSet::load(&store);
        set.add(product(1, Category::Tablet)).unwrap();
        assert_eq!(
            set.add(product(1, Category::Tablet)).unwrap(),
            AddOutcome::AlreadyPresent
        );
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn duplicate_id_with_other_category_is_still_noop() {
        let store = MemoryStore::new();
        let mut set = CompareSet::load(&store);
        set.add(product(1, Category::Tablet)).unwrap();
        assert_eq!(
            set.add(product(1, Category::Mobile)).unwrap(),
            AddOutcome::AlreadyPresent
        );
    }

    #[test]
    fn removing_last_member_returns_to_empty_and_frees_category() {
        let store = MemoryStore::new();
        let mut set = CompareSet::load(&store);
        set.add(product(1, Category::Mobile)).unwrap();
        assert!(set.remove(1).unwrap());
        assert_eq!(set.state(), CompareState::Empty);

        set.add(product(2, Category::Laptop)).unwrap();
        assert_eq!(set.category(), Some(Category::Laptop));
    }

    #[test]
    fn remove_unknown_id_is_noop() {
        let store = MemoryStore::new();
        let mut set = CompareSet::load(&store);
        set.add(product(1, Category::Mobile)).unwrap();
        assert!(!set.remove(99).unwrap());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn clear_then_add_gives_singleton_of_new_category() {
        let store = MemoryStore::new();
        let mut set = CompareSet::load(&store);
        set.add(product(1, Category::Mobile)).unwrap();
        set.add(product(2, Category::Mobile)).unwrap();
        set.clear().unwrap();

        for category in Category::ALL {
            set.clear().unwrap();
            set.add(product(10, category)).unwrap();
            assert_eq!(
                set.state(),
                CompareState::Homogeneous { category, len: 1 }
            );
        }
    }

    #[test]
    fn survives_reload() {
        let store = MemoryStore::new();
        {
            let mut set = CompareSet::load(&store);
            set.add(product(1, Category::Smartwatch)).unwrap();
            set.add(product(2, Category::Smartwatch)).unwrap();
        }
        let reloaded = CompareSet::load(&store);
        assert_eq!(reloaded.ids(), vec![1, 2]);
        assert_eq!(reloaded.category(), Some(Category::Smartwatch));
    }

    #[test]
    fn corrupt_storage_loads_empty() {
        let store = MemoryStore::new();
        store.write(COMPARE_LIST_KEY, "[{\"id\": ").unwrap();
        assert!(CompareSet::load(&store).is_empty());
    }

    #[test]
    fn mixed_category_storage_is_trimmed_on_load() {
        let store = MemoryStore::new();
        save_collection(
            &store,
            COMPARE_LIST_KEY,
            &[
                product(1, Category::Mobile),
                product(2, Category::Laptop),
                product(3, Category::Mobile),
                product(1, Category::Mobile),
            ],
        )
        .unwrap();
        let set = CompareSet::load(&store);
        assert_eq!(set.ids(), vec![1, 3]);
    }

    #[test]
    fn failed_persist_rolls_back_add() {
        let mut set = CompareSet::load(ReadOnlyStore);
        let err = set.add(product(1, Category::Mobile)).unwrap_err();
        assert!(matches!(err, CoreError::Store(_)));
        assert!(set.is_empty());
    }

    #[test]
    fn mobile_then_laptop_scenario() {
        let store = MemoryStore::new();
        let mut set = CompareSet::load(&store);
        let p1 = product(1, Category::Mobile);
        let mut p2 = product(2, Category::Laptop);
        p2.price = Decimal::from(89_999).into();

        set.add(p1).unwrap();
        assert!(set.add(p2).is_err());
        assert_eq!(set.ids(), vec![1]);
        assert_eq!(set.members()[0].price, Decimal::from(46_999));

        let persisted = CompareSet::load(&store);
        assert_eq!(persisted.ids(), vec![1]);
    }
}
