//! Last-initiated-wins handling for overlapping requests.
//!
//! Catalog reloads can complete out of order. Each request takes a
//! [`Ticket`] before it is sent; when it completes, its result is applied
//! only if no newer ticket has been issued since. Older results are dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use comparex_core::Product;

use crate::client::{ApiClient, ListParams};
use crate::error::ClientError;

/// Generation number handed out by [`LatestResult::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Holds the result of the most recently started request.
#[derive(Debug)]
pub struct LatestResult<T> {
    issued: AtomicU64,
    slot: Mutex<Option<T>>,
}

impl<T> Default for LatestResult<T> {
    fn default() -> Self {
        Self {
            issued: AtomicU64::new(0),
            slot: Mutex::new(None),
        }
    }
}

impl<T: Clone> LatestResult<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new generation; every earlier ticket becomes stale.
    #[must_use]
    pub fn begin(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    #[must_use]
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }

    /// Stores `value` if `ticket` is still the newest. Returns whether it
    /// was applied.
    pub fn complete(&self, ticket: Ticket, value: T) -> bool {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        // Checked under the lock so a stale writer cannot land after a newer one.
        if !self.is_current(ticket) {
            return false;
        }
        *slot = Some(value);
        true
    }

    #[must_use]
    pub fn current(&self) -> Option<T> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// This reload was the newest; the catalog now holds `count` products.
    Applied { count: usize },
    /// A newer reload was started while this one was in flight.
    Stale,
}

/// A catalog snapshot fed by [`ApiClient::list_products`].
#[derive(Debug)]
pub struct CatalogFeed {
    client: ApiClient,
    latest: LatestResult<Vec<Product>>,
}

impl CatalogFeed {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            latest: LatestResult::new(),
        }
    }

    /// Fetches the catalog and applies it unless a newer reload has begun.
    ///
    /// Errors from a stale request are dropped along with its data.
    ///
    /// # Errors
    ///
    /// Returns the request's [`ClientError`] when it is still the newest.
    pub async fn reload(&self, params: &ListParams) -> Result<ReloadOutcome, ClientError> {
        let ticket = self.latest.begin();
        let result = self.client.list_products(params).await;

        if !self.latest.is_current(ticket) {
            tracing::debug!(?ticket, "discarding stale catalog response");
            return Ok(ReloadOutcome::Stale);
        }

        let products = result?;
        let count = products.len();
        if self.latest.complete(ticket, products) {
            Ok(ReloadOutcome::Applied { count })
        } else {
            tracing::debug!(?ticket, "discarding stale catalog response");
            Ok(ReloadOutcome::Stale)
        }
    }

    /// The last applied catalog, if any reload has succeeded.
    #[must_use]
    pub fn products(&self) -> Option<Vec<Product>> {
        self.latest.current()
    }
}
