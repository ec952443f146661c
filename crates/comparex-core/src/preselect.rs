//! One-shot "compare this after sign-in" slot.

use crate::store::{load_collection, save_collection, LocalStore, StoreError, PENDING_PRESELECT_KEY};

/// Remembers a product id chosen by an anonymous user so it can be
/// preselected once they sign in. Stored as a one-element JSON array.
#[derive(Debug)]
pub struct PendingPreselect<S> {
    store: S,
}

impl<S: LocalStore> PendingPreselect<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Records `product_id`, replacing any earlier pending value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the value cannot be written.
    pub fn set(&self, product_id: i64) -> Result<(), StoreError> {
        save_collection(&self.store, PENDING_PRESELECT_KEY, &[product_id])
    }

    #[must_use]
    pub fn peek(&self) -> Option<i64> {
        load_collection::<i64, _>(&self.store, PENDING_PRESELECT_KEY)
            .first()
            .copied()
    }

    /// Returns the pending id and clears the slot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the slot cannot be cleared.
    pub fn take(&self) -> Result<Option<i64>, StoreError> {
        let pending = self.peek();
        self.store.remove(PENDING_PRESELECT_KEY)?;
        Ok(pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn take_consumes_pending_value() {
        let store = MemoryStore::new();
        let slot = PendingPreselect::new(&store);
        slot.set(2).unwrap();
        assert_eq!(slot.peek(), Some(2));
        assert_eq!(slot.take().unwrap(), Some(2));
        assert_eq!(slot.take().unwrap(), None);
    }

    #[test]
    fn set_replaces_previous_value() {
        let store = MemoryStore::new();
        let slot = PendingPreselect::new(&store);
        slot.set(1).unwrap();
        slot.set(3).unwrap();
        assert_eq!(slot.peek(), Some(3));
    }

    #[test]
    fn corrupt_value_reads_as_none() {
        let store = MemoryStore::new();
        store.write(PENDING_PRESELECT_KEY, "\"abc\"").unwrap();
        let slot = PendingPreselect::new(&store);
        assert_eq!(slot.peek(), None);
    }
}
