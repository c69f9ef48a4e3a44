//! # Catalog Simulator
//!
//! Replays scripted allocation lifecycles through the task services hooks
//! against a recording catalog client, and reports the resulting ledger.

pub mod args;
pub mod error;
pub mod runner;
pub mod scenario;

pub use error::SimError;
pub use runner::{run, SimReport};
pub use scenario::Scenario;
