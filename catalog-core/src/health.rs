//! Allocation health as seen from the catalog.
//!
//! An allocation is healthy once every service its tasks declare is
//! registered and every registered check passes.

use catalog::{CatalogError, CatalogServiceClient, CheckState, TaskServices};
use log::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocHealth {
    Healthy,
    /// Not there yet: registrations missing or checks still warming up.
    Pending { reason: String },
    /// A registered check is critical.
    Unhealthy { reason: String },
}

impl AllocHealth {
    pub fn is_healthy(&self) -> bool {
        matches!(self, AllocHealth::Healthy)
    }

    fn pending(reason: impl Into<String>) -> Self {
        Self::Pending {
            reason: reason.into(),
        }
    }

    fn unhealthy(reason: impl Into<String>) -> Self {
        Self::Unhealthy {
            reason: reason.into(),
        }
    }
}

/// Evaluates an allocation against the catalog's view of it.
///
/// Issues exactly one [`CatalogServiceClient::alloc_registrations`] query.
/// Tasks declaring no services are ignored.
///
/// # Arguments
///
/// * `client` - The catalog client.
/// * `alloc_id` - The allocation to evaluate.
/// * `tasks` - The services each task of the allocation declares.
///
/// # Returns
///
/// * `Ok(AllocHealth)` with the verdict.
/// * `Err(CatalogError)` if the query itself failed.
pub fn evaluate(
    client: &dyn CatalogServiceClient,
    alloc_id: &str,
    tasks: &[TaskServices],
) -> Result<AllocHealth, CatalogError> {
    let registrations = client.alloc_registrations(alloc_id)?;

    let expected: Vec<&TaskServices> = tasks.iter().filter(|t| t.has_services()).collect();
    if expected.is_empty() {
        return Ok(AllocHealth::Healthy);
    }

    let Some(registrations) = registrations else {
        return Ok(AllocHealth::pending(format!(
            "no registrations for alloc {}",
            alloc_id
        )));
    };

    let mut verdict = AllocHealth::Healthy;
    for task in expected {
        let registered = registrations.task(&task.name);
        let count = registered.map(|r| r.services.len()).unwrap_or(0);
        if count < task.services.len() {
            debug!(
                "Health: Task '{}' has {}/{} services registered",
                task.name,
                count,
                task.services.len()
            );
            verdict = AllocHealth::pending(format!(
                "task {} has {} of {} services registered",
                task.name,
                count,
                task.services.len()
            ));
            continue;
        }

        for check in registered.into_iter().flat_map(|r| r.checks()) {
            match check.state {
                CheckState::Critical => {
                    return Ok(AllocHealth::unhealthy(format!(
                        "check {} of task {} is critical",
                        check.name, task.name
                    )));
                }
                CheckState::Warning if verdict.is_healthy() => {
                    verdict = AllocHealth::pending(format!(
                        "check {} of task {} is warning",
                        check.name, task.name
                    ));
                }
                _ => {}
            }
        }
    }

    Ok(verdict)
}
