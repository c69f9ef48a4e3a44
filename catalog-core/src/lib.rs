//! # Catalog Core Library
//!
//! Scheduler-side plumbing around a [`catalog::CatalogServiceClient`].
//!
//! ## Modules
//! - `hooks`: Task lifecycle hooks that register and deregister services.
//! - `health`: Allocation health derived from the catalog's registrations.
//! - `testing`: Recording mock client and its operation ledger (`test-utils` feature).

pub mod health;
pub mod hooks;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
