use crate::error::CatalogError;
use crate::model::{registration::AllocRegistration, task::TaskServices};

/// The catalog operations a scheduler issues on behalf of its tasks.
///
/// Implement this for a real catalog agent, or use the recording mock from
/// `catalog_core::testing` in tests. Implementations are shared between the
/// threads handling different allocations, hence `Send + Sync` and `&self`.
pub trait CatalogServiceClient: Send + Sync {
    /// Registers every service of a task.
    ///
    /// # Arguments
    ///
    /// * `task` - The task and the services it declares.
    ///
    /// # Returns
    ///
    /// * `Err(CatalogError)` if the catalog rejected or never received the registration.
    fn register_task(&self, task: &TaskServices) -> Result<(), CatalogError>;

    /// Replaces the registrations of `old` with those of `new`.
    fn update_task(&self, old: &TaskServices, new: &TaskServices) -> Result<(), CatalogError>;

    /// Deregisters every service of a task.
    ///
    /// Best-effort: failures are the implementation's to log, never the caller's to handle.
    fn remove_task(&self, task: &TaskServices);

    /// Looks up what the catalog currently holds for an allocation.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` if the catalog holds nothing for the allocation.
    /// * `Ok(Some(registration))` with the per-task registrations otherwise.
    fn alloc_registrations(&self, alloc_id: &str)
    -> Result<Option<AllocRegistration>, CatalogError>;
}
