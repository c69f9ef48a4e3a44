//! Recording implementation of [`CatalogServiceClient`].
//!
//! [`MockCatalogServiceClient`] never talks to a catalog. It appends one
//! [`MockCatalogOp`] per call to its [`OpLedger`] so tests can assert on what
//! the scheduler asked for, and lets tests script the answer of the one read
//! path, [`CatalogServiceClient::alloc_registrations`].
//!
//! # Example
//!
//! ```
//! use catalog::{CatalogServiceClient, TaskServices};
//! use catalog_core::testing::{MockCatalogServiceClient, OpKind};
//!
//! let client = MockCatalogServiceClient::new();
//! client.register_task(&TaskServices::new("a1", "web")).unwrap();
//!
//! let ops = client.ops();
//! assert_eq!(ops.len(), 1);
//! assert_eq!(ops[0].op(), OpKind::Add);
//! ```

use super::ledger::{MockCatalogOp, OpKind, OpLedger};
use catalog::{AllocRegistration, CatalogError, CatalogServiceClient, TaskServices};
use log::debug;
use std::sync::Arc;

/// Scripted answer for [`CatalogServiceClient::alloc_registrations`].
pub type AllocRegistrationsFn =
    Box<dyn Fn(&str) -> Result<Option<AllocRegistration>, CatalogError> + Send + Sync>;

/// A catalog client that records every call instead of performing it.
///
/// Register and update always succeed, remove has nothing to report, and the
/// registrations query answers `Ok(None)` unless an override was installed.
///
/// # Thread Safety
///
/// All ledger mutation goes through one mutex, and the override runs while
/// that mutex is held, so every call is a single atomic step. The override is
/// installed either through the builder or through `&mut self`, which rules
/// out replacing it once the client is shared between threads.
pub struct MockCatalogServiceClient {
    ledger: Arc<OpLedger>,
    alloc_registrations_fn: Option<AllocRegistrationsFn>,
}

impl Default for MockCatalogServiceClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCatalogServiceClient {
    /// Creates a client with its own empty ledger and no override.
    pub fn new() -> Self {
        Self::with_ledger(Arc::new(OpLedger::new()))
    }

    /// Creates a client that records into an existing ledger.
    ///
    /// Several clients can share one ledger to observe a global call order.
    pub fn with_ledger(ledger: Arc<OpLedger>) -> Self {
        Self {
            ledger,
            alloc_registrations_fn: None,
        }
    }

    /// Installs the answer of [`CatalogServiceClient::alloc_registrations`].
    ///
    /// # Example
    ///
    /// ```
    /// use catalog::{CatalogError, CatalogServiceClient};
    /// use catalog_core::testing::MockCatalogServiceClient;
    ///
    /// let client = MockCatalogServiceClient::new()
    ///     .with_alloc_registrations_fn(|id| Err(CatalogError::AllocNotFound(id.to_string())));
    /// assert!(client.alloc_registrations("a1").is_err());
    /// ```
    pub fn with_alloc_registrations_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Result<Option<AllocRegistration>, CatalogError> + Send + Sync + 'static,
    {
        self.set_alloc_registrations_fn(f);
        self
    }

    pub fn set_alloc_registrations_fn<F>(&mut self, f: F)
    where
        F: Fn(&str) -> Result<Option<AllocRegistration>, CatalogError> + Send + Sync + 'static,
    {
        self.alloc_registrations_fn = Some(Box::new(f));
    }

    pub fn clear_alloc_registrations_fn(&mut self) {
        self.alloc_registrations_fn = None;
    }

    pub fn ledger(&self) -> Arc<OpLedger> {
        self.ledger.clone()
    }

    /// Returns every recorded op, in call order.
    pub fn ops(&self) -> Vec<MockCatalogOp> {
        self.ledger.snapshot()
    }

    /// Returns the recorded ops concerning one allocation, in call order.
    pub fn ops_for_alloc(&self, alloc_id: &str) -> Vec<MockCatalogOp> {
        self.ledger
            .snapshot()
            .into_iter()
            .filter(|op| op.alloc_id() == alloc_id)
            .collect()
    }
}

impl CatalogServiceClient for MockCatalogServiceClient {
    fn register_task(&self, task: &TaskServices) -> Result<(), CatalogError> {
        debug!(
            "mock_catalog: RegisterTask alloc_id={} task_name={}",
            task.alloc_id, task.name
        );
        self.ledger.record(MockCatalogOp::from_kind(
            OpKind::Add,
            task.alloc_id.as_str(),
            task.name.as_str(),
        ));
        Ok(())
    }

    fn update_task(&self, _old: &TaskServices, new: &TaskServices) -> Result<(), CatalogError> {
        debug!(
            "mock_catalog: UpdateTask alloc_id={} task_name={}",
            new.alloc_id, new.name
        );
        self.ledger.record(MockCatalogOp::from_kind(
            OpKind::Update,
            new.alloc_id.as_str(),
            new.name.as_str(),
        ));
        Ok(())
    }

    fn remove_task(&self, task: &TaskServices) {
        debug!(
            "mock_catalog: RemoveTask alloc_id={} task_name={}",
            task.alloc_id, task.name
        );
        self.ledger.record(MockCatalogOp::from_kind(
            OpKind::Remove,
            task.alloc_id.as_str(),
            task.name.as_str(),
        ));
    }

    fn alloc_registrations(
        &self,
        alloc_id: &str,
    ) -> Result<Option<AllocRegistration>, CatalogError> {
        debug!("mock_catalog: AllocRegistrations alloc_id={}", alloc_id);
        let op = MockCatalogOp::from_kind(OpKind::AllocRegistrations, alloc_id, "");
        self.ledger
            .record_then(op, || match &self.alloc_registrations_fn {
                Some(f) => f(alloc_id),
                None => Ok(None),
            })
    }
}
