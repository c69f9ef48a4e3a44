//! What the catalog reports back as registered for an allocation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Health state of a single catalog check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckState {
    Passing,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckStatus {
    pub name: String,
    pub state: CheckState,
}

impl CheckStatus {
    pub fn new(name: impl Into<String>, state: CheckState) -> Self {
        Self {
            name: name.into(),
            state,
        }
    }
}

/// A service as the catalog currently holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRegistration {
    /// Catalog-assigned identifier of the service instance.
    pub service_id: String,
    pub service_name: String,
    #[serde(default)]
    pub checks: Vec<CheckStatus>,
}

impl ServiceRegistration {
    pub fn new(service_id: impl Into<String>, service_name: impl Into<String>) -> Self {
        Self {
            service_id: service_id.into(),
            service_name: service_name.into(),
            checks: Vec::new(),
        }
    }

    pub fn with_check(mut self, check: CheckStatus) -> Self {
        self.checks.push(check);
        self
    }
}

/// Registered services of one task, keyed by service id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRegistrations {
    pub services: HashMap<String, ServiceRegistration>,
}

impl ServiceRegistrations {
    pub fn insert(&mut self, registration: ServiceRegistration) {
        self.services
            .insert(registration.service_id.clone(), registration);
    }

    pub fn checks(&self) -> impl Iterator<Item = &CheckStatus> {
        self.services.values().flat_map(|s| s.checks.iter())
    }
}

/// Registrations of every task of an allocation, keyed by task name.
///
/// Returned by [`crate::CatalogServiceClient::alloc_registrations`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocRegistration {
    pub tasks: HashMap<String, ServiceRegistrations>,
}

impl AllocRegistration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a service registration under `task`, creating the task entry if needed.
    pub fn insert(&mut self, task: impl Into<String>, registration: ServiceRegistration) {
        self.tasks.entry(task.into()).or_default().insert(registration);
    }

    pub fn task(&self, name: &str) -> Option<&ServiceRegistrations> {
        self.tasks.get(name)
    }

    /// Total number of services registered across all tasks.
    pub fn num_services(&self) -> usize {
        self.tasks.values().map(|t| t.services.len()).sum()
    }

    /// Total number of checks registered across all tasks.
    pub fn num_checks(&self) -> usize {
        self.tasks.values().map(|t| t.checks().count()).sum()
    }
}
