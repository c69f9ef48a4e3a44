//! Test doubles for code that talks to a catalog.
//!
//! Only compiled with the `test-utils` feature.

pub mod ledger;
pub mod mock;

pub use ledger::{MockCatalogOp, OpKind, OpLedger, UnknownOpKind};
pub use mock::{AllocRegistrationsFn, MockCatalogServiceClient};
