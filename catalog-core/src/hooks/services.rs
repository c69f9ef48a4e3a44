//! Keeps a task's services in the catalog for as long as the task runs.
//!
//! The scheduler calls into [`TaskServicesHook`] from whichever thread handles
//! the lifecycle event. The hook turns those events into at most one
//! registration and at most one deregistration per run of the task.

use catalog::{CatalogError, CatalogServiceClient, TaskServices};
use log::{debug, info, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

struct HookState {
    task: TaskServices,
    registered: bool,
}

/// Drives one task's catalog registrations.
///
/// The state lock is held across the client call, so calls for a given task
/// reach the client in the order the hook observed them, even when events
/// race on different threads.
pub struct TaskServicesHook {
    client: Arc<dyn CatalogServiceClient>,
    state: Mutex<HookState>,
}

impl TaskServicesHook {
    /// Creates a hook for a task that is not yet registered.
    ///
    /// # Arguments
    ///
    /// * `client` - The catalog client shared by every hook of the node.
    /// * `task` - The task and the services it declares.
    pub fn new(client: Arc<dyn CatalogServiceClient>, task: TaskServices) -> Self {
        Self {
            client,
            state: Mutex::new(HookState {
                task,
                registered: false,
            }),
        }
    }

    /// Registers the task's services once the task has started.
    ///
    /// Calling it again while registered does nothing. On error the task
    /// stays unregistered and a later call retries.
    pub fn poststart(&self) -> Result<(), CatalogError> {
        let mut state = self.lock();
        if state.registered {
            debug!(
                "Hook: Task '{}' of alloc '{}' already registered",
                state.task.name, state.task.alloc_id
            );
            return Ok(());
        }

        match self.client.register_task(&state.task) {
            Ok(()) => {
                info!(
                    "Hook: Registered {} service(s) for task '{}' of alloc '{}'",
                    state.task.services.len(),
                    state.task.name,
                    state.task.alloc_id
                );
                state.registered = true;
                Ok(())
            }
            Err(e) => {
                warn!(
                    "Hook: Failed to register task '{}' of alloc '{}': {}",
                    state.task.name, state.task.alloc_id, e
                );
                Err(e)
            }
        }
    }

    /// Applies a new service definition to the task.
    ///
    /// While registered, the catalog is updated and `new` is adopted only if
    /// the update succeeds. While unregistered, `new` is adopted silently and
    /// published by the next [`poststart`](Self::poststart).
    pub fn update(&self, new: TaskServices) -> Result<(), CatalogError> {
        let mut state = self.lock();
        if !state.registered {
            state.task = new;
            return Ok(());
        }

        if let Err(e) = self.client.update_task(&state.task, &new) {
            warn!(
                "Hook: Failed to update task '{}' of alloc '{}': {}",
                new.name, new.alloc_id, e
            );
            return Err(e);
        }
        state.task = new;
        Ok(())
    }

    /// Deregisters before the task is killed.
    pub fn pre_kill(&self) {
        self.deregister();
    }

    /// Deregisters after the task has exited.
    ///
    /// After [`pre_kill`](Self::pre_kill) this is a no-op.
    pub fn exited(&self) {
        self.deregister();
    }

    pub fn is_registered(&self) -> bool {
        self.lock().registered
    }

    /// Returns the service definition the hook currently holds.
    pub fn task(&self) -> TaskServices {
        self.lock().task.clone()
    }

    fn deregister(&self) {
        let mut state = self.lock();
        if !state.registered {
            return;
        }
        // Best-effort: the client logs its own failures.
        self.client.remove_task(&state.task);
        state.registered = false;
        info!(
            "Hook: Deregistered task '{}' of alloc '{}'",
            state.task.name, state.task.alloc_id
        );
    }

    fn lock(&self) -> MutexGuard<'_, HookState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
