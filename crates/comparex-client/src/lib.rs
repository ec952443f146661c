//! Typed HTTP client for the CompareX API, plus the last-request-wins guard
//! used when several catalog reloads are in flight at once.

mod client;
mod error;
pub mod generation;

pub use client::{ApiClient, HealthStatus, ListParams};
pub use error::ClientError;
pub use generation::{CatalogFeed, LatestResult, ReloadOutcome, Ticket};
