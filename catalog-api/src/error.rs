use thiserror::Error;

/// Errors a catalog client can surface to the scheduler.
///
/// Only the fallible operations of [`crate::CatalogServiceClient`] return it;
/// deregistration is best-effort and reports nothing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The catalog agent could not be reached or refused the request.
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    /// The request reached the catalog but failed in transit.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The catalog holds no record of the allocation.
    #[error("No registrations for allocation {0}")]
    AllocNotFound(String),
}

impl CatalogError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }
}
